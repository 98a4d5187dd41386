use std::fs::File;
use std::io::{self, Write};

use arcio_fs::{EntryKind, StagedEntry};
use tar::{Builder, Header, HeaderMode};

use crate::error::{Error, Result};
use crate::format::{Compression, Encoder};

/// Owner recorded for every tar entry, independent of the creating user.
pub const NEUTRAL_OWNER: &str = "root";

pub struct TarSession<W: Write> {
    builder: Builder<Encoder<W>>,
}

impl<W: Write> TarSession<W> {
    pub fn new(writer: W, compression: Compression) -> Self {
        Self {
            builder: Builder::new(compression.encoder(writer)),
        }
    }

    pub fn add(&mut self, entry: &StagedEntry) -> Result<()> {
        let append_failed = |source: io::Error| Error::AppendFailed {
            path: entry.source.clone(),
            source,
        };

        let metadata = std::fs::symlink_metadata(&entry.source).map_err(append_failed)?;
        let mut header = Header::new_gnu();
        header.set_metadata_in_mode(&metadata, HeaderMode::Complete);
        neutralize_owner(&mut header).map_err(append_failed)?;

        let appended = match entry.kind {
            EntryKind::File => {
                let file = File::open(&entry.source).map_err(append_failed)?;
                self.builder.append_data(&mut header, &entry.name, file)
            }
            EntryKind::Directory => self.builder.append_data(&mut header, &entry.name, io::empty()),
            EntryKind::Symlink => {
                let target = std::fs::read_link(&entry.source).map_err(append_failed)?;
                self.builder.append_link(&mut header, &entry.name, target)
            }
        };
        appended.map_err(append_failed)
    }

    pub fn finish(self) -> Result<W> {
        let encoder = self.builder.into_inner()?;
        Ok(encoder.finish()?)
    }
}

/// Reset ownership so archives do not depend on the machine that built them.
fn neutralize_owner(header: &mut Header) -> io::Result<()> {
    header.set_uid(0);
    header.set_gid(0);
    header.set_username(NEUTRAL_OWNER)?;
    header.set_groupname(NEUTRAL_OWNER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::tempdir;

    #[test]
    fn entries_carry_neutral_owner() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "alpha").unwrap();
        std::fs::create_dir(dir.path().join("empty")).unwrap();
        let entries = arcio_fs::expand_paths([dir.path()], Some(dir.path())).unwrap();

        let mut session = TarSession::new(Vec::new(), Compression::None);
        for entry in &entries {
            session.add(entry).unwrap();
        }
        let bytes = session.finish().unwrap();

        let mut archive = tar::Archive::new(&bytes[..]);
        let mut seen = Vec::new();
        for entry in archive.entries().unwrap() {
            let mut entry = entry.unwrap();
            let header = entry.header();
            assert_eq!(header.uid().unwrap(), 0);
            assert_eq!(header.gid().unwrap(), 0);
            assert_eq!(header.username().unwrap(), Some("root"));
            assert_eq!(header.groupname().unwrap(), Some("root"));
            let path = entry.path().unwrap().to_string_lossy().into_owned();
            let mut content = String::new();
            entry.read_to_string(&mut content).unwrap();
            seen.push((path, content));
        }
        assert_eq!(
            seen,
            [("a.txt".to_string(), "alpha".to_string()), ("empty".to_string(), String::new())]
        );
    }

    #[test]
    fn missing_source_names_the_path() {
        let dir = tempdir().unwrap();
        let entry = StagedEntry {
            source: dir.path().join("gone.txt"),
            name:   "gone.txt".into(),
            kind:   EntryKind::File,
        };
        let mut session = TarSession::new(Vec::new(), Compression::Gzip);
        let err = session.add(&entry).unwrap_err();
        assert!(matches!(err, Error::AppendFailed { ref path, .. } if path.ends_with("gone.txt")));
    }
}
