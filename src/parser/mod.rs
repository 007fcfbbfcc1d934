//! Email decoding: header framing, encoded-words, charsets, transfer
//! encodings and MIME body extraction.

pub mod charset;
pub mod eml;
pub mod header;
pub mod mime;
pub mod transfer;

pub use eml::{decode_message, read_message};
