//! Output encoders for formats other than JSON.

pub mod cbor;
pub mod toml;
pub mod yaml;
