//! Directory loader: selects, validates, normalizes and merges SVDS files.
//!
//! Only files named in `fixed_file_names.json` are read, in lexicographic
//! order. Each is validated; accepted documents are reshaped into a
//! `{Family: {Class: data}}` fragment and deep-merged into one tree, which is
//! returned as an [`AttrTree`](crate::tree::AttrTree). Rejected or unreadable
//! files are reported and skipped without aborting the walk.

mod core;
mod error;
mod export;
mod merge;
mod normalize;

#[cfg(test)]
mod tests;

pub use self::core::{LoadOutcome, Loaded, SvdsLoader};
pub use self::error::{LoadError, LoadResult, LoadStatus, Result};
pub use self::export::{read_export, SoftwareExport};
pub use self::merge::{merge, update, AggregateTree};
pub use self::normalize::{normalize, normalize_record, transpose, Fragment};
