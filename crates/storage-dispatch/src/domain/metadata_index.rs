//! # Metadata Index
//!
//! Lookup table from hashed storage addresses to storage metadata.
//!
//! Built once from the remote schema and never mutated afterwards, so it is
//! shared between dispatcher invocations without locking.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::{debug, info};

use super::entities::{SchemaModule, StorageMetadataEntry};
use super::invariants::address_key;
use crate::ports::AddressHasher;

/// Hashed address → storage metadata.
#[derive(Clone, Debug, Default)]
pub struct MetadataIndex {
    /// Hex width of one address hash segment.
    segment_width: usize,
    /// hash(module) → module name.
    modules: HashMap<String, String>,
    /// hash(module) ++ hash(item) → entry.
    items: HashMap<String, StorageMetadataEntry>,
    /// `module.item` → item hash key.
    by_name: HashMap<String, String>,
    /// `module.item` that lost a hash collision → address of the winner.
    shadowed: HashMap<String, String>,
}

impl MetadataIndex {
    /// Build the index from schema modules.
    ///
    /// Modules without storage items are skipped. When two items hash to the
    /// same key the first one wins and later ones are ignored.
    pub fn build(schema: &[SchemaModule], hasher: &dyn AddressHasher) -> Self {
        let mut index = Self {
            segment_width: hasher.segment_width(),
            ..Self::default()
        };

        for module in schema.iter().filter(|m| !m.storage.is_empty()) {
            let module_hash = hasher.hash_name(&module.name);
            index
                .modules
                .entry(module_hash.clone())
                .or_insert_with(|| module.name.clone());

            for item in &module.storage {
                let item_key = format!("{}{}", module_hash, hasher.hash_name(&item.name));
                let address = address_key(&module.name, &item.name);

                match index.items.entry(item_key.clone()) {
                    Entry::Occupied(existing) => {
                        let winner = existing.get().address();
                        if winner != address {
                            debug!(
                                "[lw-dispatch] Ignoring {}: hash already taken by {}",
                                address, winner
                            );
                            index.shadowed.entry(address).or_insert(winner);
                        }
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(StorageMetadataEntry {
                            module_name: module.name.clone(),
                            display_name: item.name.clone(),
                            shape: item.shape,
                            key1_hasher: item.key1_hasher.clone(),
                            key2_hasher: item.key2_hasher.clone(),
                        });
                        index.by_name.entry(address).or_insert(item_key);
                    }
                }
            }
        }

        info!(
            "[lw-dispatch] Metadata index built: {} modules, {} storage items",
            index.modules.len(),
            index.items.len()
        );
        index
    }

    /// Module name for a module address hash.
    pub fn resolve_module(&self, hash: &str) -> Option<&str> {
        self.modules.get(hash).map(String::as_str)
    }

    /// Metadata for a module ++ item address hash.
    pub fn resolve_item(&self, hash: &str) -> Option<&StorageMetadataEntry> {
        self.items.get(hash)
    }

    /// Metadata by display names.
    pub fn entry_by_name(&self, module: &str, item: &str) -> Option<&StorageMetadataEntry> {
        self.by_name
            .get(&address_key(module, item))
            .and_then(|key| self.items.get(key))
    }

    /// Address of the item that won the hash collision `module.item` lost.
    pub fn shadowed_by(&self, module: &str, item: &str) -> Option<&str> {
        self.shadowed
            .get(&address_key(module, item))
            .map(String::as_str)
    }

    /// Iterate over all entries.
    pub fn entries(&self) -> impl Iterator<Item = &StorageMetadataEntry> {
        self.items.values()
    }

    /// Hex width of one address hash segment.
    pub fn segment_width(&self) -> usize {
        self.segment_width
    }

    /// Number of indexed modules.
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Number of indexed storage items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::Sha256AddressHasher;
    use crate::domain::{HasherKind, SchemaItem, StorageShape};

    /// Hasher that maps every name to the same digest.
    struct ConstantHasher;

    impl AddressHasher for ConstantHasher {
        fn segment_width(&self) -> usize {
            4
        }

        fn hash_name(&self, _name: &str) -> String {
            "abcd".to_string()
        }
    }

    fn game_schema() -> Vec<SchemaModule> {
        vec![
            SchemaModule::new(
                "Game",
                vec![
                    SchemaItem::plain("Round"),
                    SchemaItem::map("Score", HasherKind::Blake2_128Concat),
                ],
            ),
            SchemaModule::new("Empty", vec![]),
        ]
    }

    #[test]
    fn test_build_and_resolve() {
        let hasher = Sha256AddressHasher::default();
        let index = MetadataIndex::build(&game_schema(), &hasher);

        assert_eq!(index.module_count(), 1);
        assert_eq!(index.item_count(), 2);

        let module_hash = hasher.hash_name("Game");
        assert_eq!(index.resolve_module(&module_hash), Some("Game"));

        let item_hash = format!("{}{}", module_hash, hasher.hash_name("Score"));
        let entry = index.resolve_item(&item_hash).unwrap();
        assert_eq!(entry.display_name, "Score");
        assert_eq!(entry.shape, StorageShape::Map);
        assert_eq!(entry.key1_hasher, HasherKind::Blake2_128Concat);
    }

    #[test]
    fn test_module_without_storage_skipped() {
        let hasher = Sha256AddressHasher::default();
        let index = MetadataIndex::build(&game_schema(), &hasher);
        assert!(index.resolve_module(&hasher.hash_name("Empty")).is_none());
    }

    #[test]
    fn test_first_duplicate_wins() {
        let schema = vec![SchemaModule::new(
            "M",
            vec![SchemaItem::plain("First"), SchemaItem::plain("Second")],
        )];
        let index = MetadataIndex::build(&schema, &ConstantHasher);

        assert_eq!(index.item_count(), 1);
        assert_eq!(index.resolve_item("abcdabcd").unwrap().display_name, "First");
        assert!(index.entry_by_name("M", "Second").is_none());
        assert_eq!(index.shadowed_by("M", "Second"), Some("M.First"));
        assert!(index.shadowed_by("M", "First").is_none());
    }

    #[test]
    fn test_repeated_item_not_shadowed() {
        let schema = vec![SchemaModule::new(
            "M",
            vec![SchemaItem::plain("First"), SchemaItem::plain("First")],
        )];
        let index = MetadataIndex::build(&schema, &ConstantHasher);
        assert!(index.shadowed_by("M", "First").is_none());
        assert!(index.entry_by_name("M", "First").is_some());
    }

    #[test]
    fn test_entry_by_name() {
        let hasher = Sha256AddressHasher::default();
        let index = MetadataIndex::build(&game_schema(), &hasher);
        assert_eq!(
            index.entry_by_name("Game", "Round").unwrap().shape,
            StorageShape::Plain
        );
        assert!(index.entry_by_name("Game", "Missing").is_none());
    }

    #[test]
    fn test_unknown_hash_absent() {
        let index = MetadataIndex::build(&game_schema(), &Sha256AddressHasher::default());
        assert!(index.resolve_module("0000000000000000").is_none());
        assert!(index.resolve_item("00000000000000000000000000000000").is_none());
    }
}
