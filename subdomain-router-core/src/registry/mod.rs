//! Durable registry file format

mod codec;

pub use codec::{DecodedSite, decode_registry, encode_registry};
