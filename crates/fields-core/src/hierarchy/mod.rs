//! Master-list hierarchy construction.
//!
//! `parser` turns flat spreadsheet rows into the forward tree and the
//! per-leaf reversed chains; `ingest` validates an uploaded sheet against the
//! caller's level metadata before any parsing happens.

pub mod ingest;
pub mod parser;

pub use ingest::{IngestError, LevelMeta, UploadPolicy, ValidatedSheet};
pub use parser::{parse_hierarchy, ParsedHierarchy};
