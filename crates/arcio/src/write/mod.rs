//! Streaming archive writers.
//!
//! A session is opened once, fed entries in call order and finished once.
//! Tar and zip both write headers incrementally, so entries are never
//! buffered or reopened per file.

use std::io::{Seek, Write};

use arcio_fs::StagedEntry;

use crate::error::Result;
use crate::format::ArchiveFormat;

mod tar;
mod zip;

pub use self::tar::{NEUTRAL_OWNER, TarSession};
pub use self::zip::ZipSession;

pub enum ArchiveWriter<W: Write + Seek> {
    Zip(ZipSession<W>),
    Tar(TarSession<W>),
}

impl<W: Write + Seek> ArchiveWriter<W> {
    pub fn open(format: ArchiveFormat, writer: W) -> Self {
        match format {
            ArchiveFormat::Zip => Self::Zip(ZipSession::new(writer)),
            ArchiveFormat::Tar(compression) => Self::Tar(TarSession::new(writer, compression)),
        }
    }

    pub fn add(&mut self, entry: &StagedEntry) -> Result<()> {
        tracing::trace!(name = %entry.name, kind = ?entry.kind, "adding entry");
        match self {
            Self::Zip(session) => session.add(entry),
            Self::Tar(session) => session.add(entry),
        }
    }

    /// Write trailers and return the underlying writer.
    pub fn finish(self) -> Result<W> {
        match self {
            Self::Zip(session) => session.finish(),
            Self::Tar(session) => session.finish(),
        }
    }
}
