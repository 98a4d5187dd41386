use std::fs::File;
use std::io::{self, Seek, Write};
use std::path::Path;

use arcio_fs::{EntryKind, StagedEntry};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Error, Result};

const ZIP64_THRESHOLD: u64 = 0xFFFF_FFFF;

pub struct ZipSession<W: Write + Seek> {
    writer: ZipWriter<W>,
}

impl<W: Write + Seek> ZipSession<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: ZipWriter::new(writer),
        }
    }

    /// Symlinks are followed: zip stores the content they point to.
    pub fn add(&mut self, entry: &StagedEntry) -> Result<()> {
        let append_failed = |source: io::Error| Error::AppendFailed {
            path: entry.source.clone(),
            source,
        };
        let options = entry_options(&entry.source).map_err(append_failed)?;

        match entry.kind {
            EntryKind::Directory => {
                self.writer.add_directory(entry.name.clone(), options)?;
            }
            EntryKind::File | EntryKind::Symlink => {
                let mut file = File::open(&entry.source).map_err(append_failed)?;
                self.writer.start_file(entry.name.clone(), options)?;
                io::copy(&mut file, &mut self.writer).map_err(append_failed)?;
            }
        }
        Ok(())
    }

    pub fn finish(self) -> Result<W> { Ok(self.writer.finish()?) }
}

fn entry_options(path: &Path) -> io::Result<SimpleFileOptions> {
    let metadata = std::fs::metadata(path)?;
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(metadata.len() >= ZIP64_THRESHOLD);

    #[cfg(unix)]
    let options = {
        use std::os::unix::fs::PermissionsExt;
        options.unix_permissions(metadata.permissions().mode() & 0o7777)
    };

    Ok(options)
}
