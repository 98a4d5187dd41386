use std::io::Read;

use crate::error::{Error, Result};
use crate::extract::{EntrySource, PendingEntry, PendingKind};
use crate::format::{ArchiveFormat, Compression, Decoder};

pub struct TarSource<R: Read> {
    archive: tar::Archive<Decoder<R>>,
    codec:   Compression,
}

impl<R: Read> TarSource<R> {
    pub fn new(reader: R, codec: Compression) -> Self {
        Self {
            archive: tar::Archive::new(codec.decoder(reader)),
            codec,
        }
    }
}

impl<R: Read> EntrySource for TarSource<R> {
    fn visit(&mut self, visitor: &mut dyn FnMut(PendingEntry<'_>) -> Result<()>) -> Result<()> {
        for entry in self.archive.entries()? {
            let mut entry = entry?;
            let original_path = entry.path()?.into_owned();
            let mode = entry.header().mode().ok();
            let entry_type = entry.header().entry_type();

            let kind = if entry_type.is_dir() {
                PendingKind::Directory
            } else if entry_type.is_symlink() {
                let target = entry
                    .link_name()?
                    .ok_or_else(|| Error::InvalidPath(original_path.display().to_string()))?
                    .into_owned();
                PendingKind::Symlink { target }
            } else if entry_type.is_file() {
                PendingKind::File(&mut entry)
            } else {
                tracing::debug!(entry = %original_path.display(), ?entry_type, "skipping unsupported tar entry");
                continue;
            };

            visitor(PendingEntry {
                original_path,
                mode,
                kind,
            })?;
        }
        Ok(())
    }

    fn format(&self) -> ArchiveFormat { ArchiveFormat::Tar(self.codec) }
}
