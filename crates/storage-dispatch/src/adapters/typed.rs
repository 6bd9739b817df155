//! Typed Storage Bindings
//!
//! Convenience wrappers that turn the raw hex value of a change into a typed
//! object through a `ValueDecoder` before calling the application.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use crate::domain::{HandlerError, HandlerResult, ListenerBinding};
use crate::ports::ValueDecoder;

/// Decode a `0x`-prefixed (or bare) hex value into bytes.
pub fn decode_value_hex(value: &str) -> Result<Vec<u8>, HandlerError> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    Ok(hex::decode(digits)?)
}

fn decode_optional<T, D>(decoder: &D, value: Option<&str>) -> Result<Option<T>, HandlerError>
where
    D: ValueDecoder<T>,
{
    value
        .map(|v| decode_value_hex(v).and_then(|bytes| decoder.decode(&bytes)))
        .transpose()
}

/// Bind a typed `Plain` handler; `None` means the value was deleted.
pub fn typed_plain<T, D, F>(
    module: impl Into<String>,
    item: impl Into<String>,
    decoder: D,
    f: F,
) -> ListenerBinding
where
    T: 'static,
    D: ValueDecoder<T> + 'static,
    F: Fn(Option<T>) -> HandlerResult + Send + Sync + 'static,
{
    ListenerBinding::plain(module, item, move |value| {
        f(decode_optional(&decoder, value)?)
    })
}

/// Bind a typed `Map` handler.
pub fn typed_map<T, D, F>(
    module: impl Into<String>,
    item: impl Into<String>,
    decoder: D,
    f: F,
) -> ListenerBinding
where
    T: 'static,
    D: ValueDecoder<T> + 'static,
    F: Fn(&str, Option<T>) -> HandlerResult + Send + Sync + 'static,
{
    ListenerBinding::map(module, item, move |key, value| {
        f(key, decode_optional(&decoder, value)?)
    })
}

/// Bind a typed `DoubleMap` handler.
pub fn typed_double_map<T, D, F>(
    module: impl Into<String>,
    item: impl Into<String>,
    decoder: D,
    f: F,
) -> ListenerBinding
where
    T: 'static,
    D: ValueDecoder<T> + 'static,
    F: Fn(&str, &str, Option<T>) -> HandlerResult + Send + Sync + 'static,
{
    ListenerBinding::double_map(module, item, move |key1, key2, value| {
        f(key1, key2, decode_optional(&decoder, value)?)
    })
}

/// Raw value bytes.
#[derive(Clone, Copy, Debug, Default)]
pub struct RawBytesDecoder;

impl ValueDecoder<Vec<u8>> for RawBytesDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Vec<u8>, HandlerError> {
        Ok(bytes.to_vec())
    }
}

/// Little-endian `u64`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LeU64Decoder;

impl ValueDecoder<u64> for LeU64Decoder {
    fn decode(&self, bytes: &[u8]) -> Result<u64, HandlerError> {
        let raw: [u8; 8] = bytes
            .try_into()
            .map_err(|_| format!("expected 8 bytes, got {}", bytes.len()))?;
        Ok(u64::from_le_bytes(raw))
    }
}

/// Little-endian `u128`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LeU128Decoder;

impl ValueDecoder<u128> for LeU128Decoder {
    fn decode(&self, bytes: &[u8]) -> Result<u128, HandlerError> {
        let raw: [u8; 16] = bytes
            .try_into()
            .map_err(|_| format!("expected 16 bytes, got {}", bytes.len()))?;
        Ok(u128::from_le_bytes(raw))
    }
}

/// UTF-8 text.
#[derive(Clone, Copy, Debug, Default)]
pub struct Utf8Decoder;

impl ValueDecoder<String> for Utf8Decoder {
    fn decode(&self, bytes: &[u8]) -> Result<String, HandlerError> {
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}

/// JSON document carried in the value bytes.
pub struct JsonDecoder<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonDecoder<T> {
    /// Create a decoder for `T`.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> ValueDecoder<T> for JsonDecoder<T> {
    fn decode(&self, bytes: &[u8]) -> Result<T, HandlerError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
