use std::io::{Read, Seek};

use crate::error::{Error, Result};
use crate::extract::{EntrySource, PendingEntry, PendingKind};
use crate::format::ArchiveFormat;

pub struct ZipSource<R: Read + Seek> {
    archive: zip::ZipArchive<R>,
}

impl<R: Read + Seek> ZipSource<R> {
    pub fn new(reader: R) -> Result<Self> {
        let archive = zip::ZipArchive::new(reader)?;
        Ok(Self { archive })
    }
}

impl<R: Read + Seek> EntrySource for ZipSource<R> {
    fn visit(&mut self, visitor: &mut dyn FnMut(PendingEntry<'_>) -> Result<()>) -> Result<()> {
        for index in 0..self.archive.len() {
            let mut file = self.archive.by_index(index)?;
            let original_path = file
                .enclosed_name()
                .ok_or_else(|| Error::InvalidPath(file.name().to_string()))?
                .to_path_buf();
            let mode = file.unix_mode();

            let kind = if file.is_dir() {
                PendingKind::Directory
            } else {
                PendingKind::File(&mut file)
            };

            visitor(PendingEntry {
                original_path,
                mode,
                kind,
            })?;
        }
        Ok(())
    }

    fn format(&self) -> ArchiveFormat { ArchiveFormat::Zip }
}
