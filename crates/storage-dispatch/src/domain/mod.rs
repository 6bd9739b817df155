//! # Domain Module
//!
//! Core types: storage metadata, the metadata index, listener registry,
//! routing outcomes and errors.

pub mod entities;
pub mod errors;
pub mod invariants;
pub mod metadata_index;
pub mod registry;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use metadata_index::MetadataIndex;
pub use registry::*;
pub use value_objects::*;
