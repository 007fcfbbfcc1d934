//! `eml2pdf` — batch conversion of `.eml` email files to PDF.
//!
//! The library decodes RFC 5322 / MIME messages (encoded-word headers,
//! multipart bodies, Japanese legacy charsets) into a [`MessageRecord`],
//! lays them out on fixed A4 pages and writes PDF files with `lopdf`. The
//! command-line and terminal front ends are thin callers of [`export::batch`].
//!
//! [`MessageRecord`]: model::message::MessageRecord

pub mod config;
pub mod error;
pub mod export;
pub mod i18n;
pub mod model;
pub mod parser;
pub mod tui;
