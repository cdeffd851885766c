//! Authentication utilities

mod token;

pub use token::{canonical_service, Claims, TokenDecoder};
