//! Input/output helpers.
//!
//! - TSV table reading + row validation (`tsv`)
//! - catalog and observation loaders (`catalog`, `prices`)
//! - `(path, mtime)` memoization of loaded tables (`cache`)
//! - result exports (CSV) (`export`)
//! - report JSON read/write (`report_json`)

pub mod cache;
pub mod catalog;
pub mod export;
pub mod prices;
pub mod report_json;
pub mod tsv;

pub use cache::*;
pub use catalog::*;
pub use export::*;
pub use prices::*;
pub use report_json::*;
pub use tsv::{RowError, Table};
