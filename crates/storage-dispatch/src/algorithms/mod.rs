//! # Algorithms Module
//!
//! Raw key splitting and key slot decoding.

pub mod address;
pub mod key_decoder;

pub use address::{split_key, SplitKey};
pub use key_decoder::decode_key;
