//! Save files to, and load files from, compressed archives through one interface.
//!
//! # Architecture
//!
//! - `format.rs` - Extension registry and compression codecs
//! - `archive.rs` - [`Archive`]: target + format, `save` and `load`
//! - `write/` - Streaming writer sessions per format
//! - `extract/` - Per-format entry sources and the extraction pipeline
//! - `sanitize.rs` - Path sanitization (zip-slip prevention)
//! - `transform.rs` - Save/load transformers around file-producing and
//!   file-consuming functions
//!
//! Recognized suffixes, most specific first: `.zip`, `.tar.gz`, `.tar.bz2`, `.tar`.
//!
//! # Example
//!
//! ```no_run
//! use arcio::{LoadOptions, SaveOptions, load_path, save_path};
//!
//! # fn main() -> Result<(), arcio::Error> {
//! save_path("report.txt.tar.gz", &SaveOptions::new(), |path| {
//!     std::fs::write(path, "contents").map_err(arcio::Error::from)
//! })?;
//!
//! let text = load_path("report.txt.tar.gz", &LoadOptions::new(), |path| {
//!     std::fs::read_to_string(path).map_err(arcio::Error::from)
//! })?;
//! assert_eq!(text, "contents");
//! # Ok(())
//! # }
//! ```

pub use archive::{Archive, Extracted, Target};
pub use error::{Error, Exhausted, FormatError, Result};
pub use format::{ArchiveFormat, Compression, EXTENSION_PACKS, ExtensionPack, extensions};
pub use transform::{
    LoadOptions, SaveOptions, Saved, load, load_or_else, load_path, save, save_path, select_candidates,
};
pub use write::NEUTRAL_OWNER;

mod archive;
mod error;
pub mod extract;
pub mod format;
mod sanitize;
mod transform;
pub mod write;
