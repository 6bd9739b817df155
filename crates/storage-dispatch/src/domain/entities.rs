//! # Domain Entities
//!
//! Storage metadata, schema input and change types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Algorithm used to encode one storage key slot.
///
/// Classified into non-recoverable fixed-width digests and recoverable
/// "hash + concat" encodings whose original key bytes follow the prefix.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HasherKind {
    /// 128-bit Blake2 digest.
    Blake2_128,
    /// 256-bit Blake2 digest.
    Blake2_256,
    /// 128-bit Blake2 digest followed by the original key.
    Blake2_128Concat,
    /// 128-bit xxHash digest.
    Twox128,
    /// 256-bit xxHash digest.
    Twox256,
    /// 64-bit xxHash digest followed by the original key.
    Twox64Concat,
    /// Original key, no hash prefix.
    Identity,
    /// Any hasher name this decoder does not know, or a slot the schema
    /// left undeclared.
    Unknown(String),
}

/// Name carried by a key slot the schema does not declare.
pub const UNDECLARED_HASHER: &str = "<undeclared>";

impl HasherKind {
    /// Hasher of a slot the schema does not declare; it has no width.
    pub fn undeclared() -> Self {
        Self::Unknown(UNDECLARED_HASHER.to_string())
    }

    /// Width of the hash prefix in hex characters, `None` if unknown.
    pub fn prefix_width(&self) -> Option<usize> {
        match self {
            Self::Blake2_128 | Self::Twox128 | Self::Blake2_128Concat => Some(32),
            Self::Blake2_256 | Self::Twox256 => Some(64),
            Self::Twox64Concat => Some(16),
            Self::Identity => Some(0),
            Self::Unknown(_) => None,
        }
    }

    /// Whether the original key bytes follow the hash prefix.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Blake2_128Concat | Self::Twox64Concat | Self::Identity
        )
    }

    /// Canonical hasher name.
    pub fn name(&self) -> &str {
        match self {
            Self::Blake2_128 => "Blake2_128",
            Self::Blake2_256 => "Blake2_256",
            Self::Blake2_128Concat => "Blake2_128Concat",
            Self::Twox128 => "Twox128",
            Self::Twox256 => "Twox256",
            Self::Twox64Concat => "Twox64Concat",
            Self::Identity => "Identity",
            Self::Unknown(name) => name,
        }
    }
}

impl From<String> for HasherKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "Blake2_128" => Self::Blake2_128,
            "Blake2_256" => Self::Blake2_256,
            "Blake2_128Concat" => Self::Blake2_128Concat,
            "Twox128" => Self::Twox128,
            "Twox256" => Self::Twox256,
            "Twox64Concat" => Self::Twox64Concat,
            "Identity" => Self::Identity,
            _ => Self::Unknown(name),
        }
    }
}

impl From<HasherKind> for String {
    fn from(kind: HasherKind) -> Self {
        kind.name().to_string()
    }
}

impl fmt::Display for HasherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Storage item key arity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StorageShape {
    /// Single value, no keys.
    Plain,
    /// One key.
    Map,
    /// Two keys.
    DoubleMap,
    /// A shape the decoder does not recognize.
    Unsupported,
}

impl StorageShape {
    /// Number of key parts this shape produces.
    pub fn arity(&self) -> Option<usize> {
        match self {
            Self::Plain => Some(0),
            Self::Map => Some(1),
            Self::DoubleMap => Some(2),
            Self::Unsupported => None,
        }
    }
}

impl From<String> for StorageShape {
    fn from(name: String) -> Self {
        match name.as_str() {
            "Plain" => Self::Plain,
            "Map" => Self::Map,
            "DoubleMap" => Self::DoubleMap,
            _ => Self::Unsupported,
        }
    }
}

impl From<StorageShape> for String {
    fn from(shape: StorageShape) -> Self {
        format!("{:?}", shape)
    }
}

/// Metadata for one storage item, keyed by its address hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageMetadataEntry {
    /// Owning module name.
    pub module_name: String,
    /// Storage item display name.
    pub display_name: String,
    /// Key arity.
    pub shape: StorageShape,
    /// Hasher of the first key slot.
    pub key1_hasher: HasherKind,
    /// Hasher of the second key slot.
    pub key2_hasher: HasherKind,
}

impl StorageMetadataEntry {
    /// `module.item` address of this entry.
    pub fn address(&self) -> String {
        format!("{}.{}", self.module_name, self.display_name)
    }

    /// Hashers of the key slots in declared order, `None` for unsupported shapes.
    pub fn key_hashers(&self) -> Option<Vec<&HasherKind>> {
        match self.shape {
            StorageShape::Plain => Some(Vec::new()),
            StorageShape::Map => Some(vec![&self.key1_hasher]),
            StorageShape::DoubleMap => Some(vec![&self.key1_hasher, &self.key2_hasher]),
            StorageShape::Unsupported => None,
        }
    }
}

/// Storage item as declared by the remote schema.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaItem {
    /// Item name.
    pub name: String,
    /// Key arity.
    pub shape: StorageShape,
    /// First key hasher (ignored for `Plain`).
    #[serde(default = "HasherKind::undeclared")]
    pub key1_hasher: HasherKind,
    /// Second key hasher (only used by `DoubleMap`).
    #[serde(default = "HasherKind::undeclared")]
    pub key2_hasher: HasherKind,
}

impl SchemaItem {
    /// Plain storage item.
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape: StorageShape::Plain,
            key1_hasher: HasherKind::undeclared(),
            key2_hasher: HasherKind::undeclared(),
        }
    }

    /// Single-key map.
    pub fn map(name: impl Into<String>, hasher: HasherKind) -> Self {
        Self {
            name: name.into(),
            shape: StorageShape::Map,
            key1_hasher: hasher,
            key2_hasher: HasherKind::undeclared(),
        }
    }

    /// Double-key map.
    pub fn double_map(name: impl Into<String>, key1: HasherKind, key2: HasherKind) -> Self {
        Self {
            name: name.into(),
            shape: StorageShape::DoubleMap,
            key1_hasher: key1,
            key2_hasher: key2,
        }
    }
}

/// Module as declared by the remote schema.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaModule {
    /// Module name.
    pub name: String,
    /// Storage items, possibly empty.
    #[serde(default)]
    pub storage: Vec<SchemaItem>,
}

impl SchemaModule {
    /// Create a module with its storage items.
    pub fn new(name: impl Into<String>, storage: Vec<SchemaItem>) -> Self {
        Self {
            name: name.into(),
            storage,
        }
    }
}

/// Raw change notification from the subscription feed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Hex-encoded storage key, `0x` prefixed.
    pub key: String,
    /// Hex-encoded value; `None` or empty means deletion.
    #[serde(default)]
    pub value: Option<String>,
}

impl ChangeEvent {
    /// Value update.
    pub fn update(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }

    /// Deletion.
    pub fn deletion(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }

    /// Raw value, `None` when the change is a deletion.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref().filter(|v| !v.is_empty())
    }

    /// Whether the change removes the storage entry.
    pub fn is_deletion(&self) -> bool {
        self.value().is_none()
    }
}

/// A change resolved to its storage address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedChange {
    /// Module name.
    pub module_name: String,
    /// Storage item name.
    pub item_name: String,
    /// Recovered key parts, one per key slot.
    pub key_parts: Vec<String>,
    /// Raw value, `None` for deletion.
    pub value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hasher_widths() {
        assert_eq!(HasherKind::Blake2_128.prefix_width(), Some(32));
        assert_eq!(HasherKind::Blake2_256.prefix_width(), Some(64));
        assert_eq!(HasherKind::Twox64Concat.prefix_width(), Some(16));
        assert_eq!(HasherKind::Identity.prefix_width(), Some(0));
        assert_eq!(HasherKind::Unknown("Keccak".into()).prefix_width(), None);
    }

    #[test]
    fn test_hasher_recoverable() {
        assert!(HasherKind::Blake2_128Concat.is_recoverable());
        assert!(HasherKind::Identity.is_recoverable());
        assert!(!HasherKind::Twox128.is_recoverable());
        assert!(!HasherKind::Unknown("x".into()).is_recoverable());
    }

    #[test]
    fn test_hasher_from_json_name() {
        let kind: HasherKind = serde_json::from_str("\"Twox64Concat\"").unwrap();
        assert_eq!(kind, HasherKind::Twox64Concat);

        let unknown: HasherKind = serde_json::from_str("\"Keccak256\"").unwrap();
        assert_eq!(unknown, HasherKind::Unknown("Keccak256".into()));
        assert_eq!(serde_json::to_string(&unknown).unwrap(), "\"Keccak256\"");
    }

    #[test]
    fn test_shape_arity() {
        assert_eq!(StorageShape::Plain.arity(), Some(0));
        assert_eq!(StorageShape::Map.arity(), Some(1));
        assert_eq!(StorageShape::DoubleMap.arity(), Some(2));
        assert_eq!(StorageShape::Unsupported.arity(), None);
    }

    #[test]
    fn test_unknown_shape_deserializes_unsupported() {
        let shape: StorageShape = serde_json::from_str("\"NMap\"").unwrap();
        assert_eq!(shape, StorageShape::Unsupported);
    }

    #[test]
    fn test_schema_item_defaults() {
        let item: SchemaItem =
            serde_json::from_str(r#"{"name":"Number","shape":"Plain"}"#).unwrap();
        assert_eq!(item, SchemaItem::plain("Number"));
    }

    #[test]
    fn test_omitted_hasher_is_undeclared() {
        let item: SchemaItem = serde_json::from_str(
            r#"{"name":"Board","shape":"DoubleMap","key2_hasher":"Identity"}"#,
        )
        .unwrap();
        assert_eq!(item.key1_hasher, HasherKind::undeclared());
        assert_eq!(item.key1_hasher.prefix_width(), None);
        assert_eq!(item.key2_hasher, HasherKind::Identity);
    }

    #[test]
    fn test_change_event_deletion() {
        assert!(ChangeEvent::deletion("0x00").is_deletion());
        assert!(ChangeEvent::update("0x00", "").is_deletion());
        assert!(!ChangeEvent::update("0x00", "0x2a").is_deletion());
        assert_eq!(ChangeEvent::update("0x00", "0x2a").value(), Some("0x2a"));
    }

    #[test]
    fn test_entry_key_hashers() {
        let entry = StorageMetadataEntry {
            module_name: "Game".into(),
            display_name: "Board".into(),
            shape: StorageShape::DoubleMap,
            key1_hasher: HasherKind::Twox128,
            key2_hasher: HasherKind::Identity,
        };
        assert_eq!(entry.address(), "Game.Board");
        assert_eq!(entry.key_hashers().unwrap().len(), 2);
    }
}
