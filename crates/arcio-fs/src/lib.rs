//! Filesystem helpers shared by the arcio crates.
//!
//! - [`expand_paths`] turns a mix of files and directories into the ordered,
//!   deduplicated list of entries an archive writer consumes.
//! - [`relative_name`] computes the `/`-separated name an entry gets inside an archive.
//! - [`ScopedTempDir`] owns a staging directory that is removed when it goes out of scope.

mod error;
mod paths;
mod temp;

pub use error::{Error, Result};
pub use paths::{EntryKind, StagedEntry, expand_paths, relative_name};
pub use temp::ScopedTempDir;
