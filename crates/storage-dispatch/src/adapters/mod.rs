//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements outbound port traits: address hashing, change feeds, snapshot
//! sources and typed value decoding.

mod address_hasher;
mod channel_feed;
mod json;
mod typed;

pub use address_hasher::Sha256AddressHasher;
pub use channel_feed::{ChangeFeedSender, ChannelChangeFeed, StreamChangeFeed};
pub use json::{load_schema, parse_schema, JsonFileSnapshot, JsonLinesFeed};
pub use typed::{
    decode_value_hex, typed_double_map, typed_map, typed_plain, JsonDecoder, LeU128Decoder,
    LeU64Decoder, RawBytesDecoder, Utf8Decoder,
};
