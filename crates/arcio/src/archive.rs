use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, FormatError, Result};
use crate::extract::{self, TarSource, ZipSource};
use crate::format::{self, ArchiveFormat, ExtensionPack};
use crate::write::ArchiveWriter;

/// Where archive data lives.
///
/// A path target can have its format sniffed from its suffix; a stream target
/// always needs an explicit extension.
#[derive(Debug)]
pub enum Target<S> {
    Path(PathBuf),
    Stream(S),
}

impl Target<File> {
    pub fn path(path: impl Into<PathBuf>) -> Self { Self::Path(path.into()) }
}

impl<S> Target<S> {
    pub fn stream(stream: S) -> Self { Self::Stream(stream) }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Self::Path(path) => Some(path),
            Self::Stream(_) => None,
        }
    }

    pub fn into_stream(self) -> Option<S> {
        match self {
            Self::Path(_) => None,
            Self::Stream(stream) => Some(stream),
        }
    }

    /// Human readable name used in log events and error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Stream(_) => "<stream>".to_string(),
        }
    }
}

/// Resolve the format for `target`, preferring an explicit extension.
pub(crate) fn resolve_pack<S>(
    target: &Target<S>,
    extension: Option<&str>,
) -> std::result::Result<&'static ExtensionPack, FormatError> {
    match (extension, target) {
        (Some(extension), _) => format::pack_for_extension(extension),
        (None, Target::Path(path)) => format::pack_for_path(path),
        (None, Target::Stream(_)) => Err(FormatError::MissingExtension),
    }
}

/// A single archive, bound to its target and resolved format.
///
/// Archives are cheap, single-use values: build one per save or load call.
#[derive(Debug)]
pub struct Archive<S = File> {
    target: Target<S>,
    pack:   &'static ExtensionPack,
}

impl Archive<File> {
    /// Archive at `path`, format sniffed from its suffix.
    pub fn from_path(path: impl Into<PathBuf>) -> std::result::Result<Self, FormatError> {
        Self::new(Target::Path(path.into()), None)
    }
}

impl<S> Archive<S> {
    pub fn new(target: Target<S>, extension: Option<&str>) -> std::result::Result<Self, FormatError> {
        let pack = resolve_pack(&target, extension)?;
        Ok(Self::with_pack(target, pack))
    }

    pub fn from_stream(stream: S, extension: &str) -> std::result::Result<Self, FormatError> {
        Self::new(Target::Stream(stream), Some(extension))
    }

    pub(crate) fn with_pack(target: Target<S>, pack: &'static ExtensionPack) -> Self {
        Self { target, pack }
    }

    /// The resolved format tag, e.g. `".tar.gz"`.
    pub fn extension(&self) -> &'static str { self.pack.extension }

    pub fn format(&self) -> ArchiveFormat { self.pack.format }

    pub fn target(&self) -> &Target<S> { &self.target }

    pub fn into_target(self) -> Target<S> { self.target }

    /// File name of a path target with the archive suffix removed.
    ///
    /// `"out/sample.txt.zip"` yields `"sample.txt"`. Stream targets have no name.
    pub fn member_name(&self) -> Option<String> {
        let file_name = self.target.as_path()?.file_name()?.to_string_lossy();
        let extension = self.pack.extension;
        let name = if file_name.to_ascii_lowercase().ends_with(extension) {
            &file_name[..file_name.len() - extension.len()]
        } else {
            &file_name[..]
        };
        (!name.is_empty()).then(|| name.to_string())
    }
}

impl<S: Write + Seek> Archive<S> {
    /// Write `paths` into the archive in a single writer session.
    ///
    /// Directories are expanded recursively and names are taken relative to
    /// `base`. A stream target is rewound before writing and again afterwards
    /// so it can be read back immediately.
    pub fn save<I, P>(&mut self, paths: I, base: Option<&Path>) -> Result<&Target<S>>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let entries = arcio_fs::expand_paths(paths, base)?;
        let format = self.pack.format;
        tracing::debug!(
            archive = %self.target.describe(),
            extension = self.pack.extension,
            entries = entries.len(),
            "saving archive"
        );

        match &mut self.target {
            Target::Path(path) => {
                let file = File::create(&*path).map_err(|source| Error::Open {
                    path: path.clone(),
                    source,
                })?;
                let mut writer = write_entries(format, BufWriter::new(file), &entries)?;
                writer.flush()?;
            }
            Target::Stream(stream) => {
                stream.rewind()?;
                let writer = write_entries(format, &mut *stream, &entries)?;
                writer.flush()?;
                stream.rewind()?;
            }
        }

        Ok(&self.target)
    }
}

fn write_entries<W: Write + Seek>(
    format: ArchiveFormat,
    writer: W,
    entries: &[arcio_fs::StagedEntry],
) -> Result<W> {
    let mut session = ArchiveWriter::open(format, writer);
    for entry in entries {
        session.add(entry)?;
    }
    session.finish()
}

impl<S: Read + Seek> Archive<S> {
    /// Extract the whole archive into `destination` and return the extracted
    /// paths in archive order.
    ///
    /// A stream target is rewound first, so one stream supports repeated loads.
    pub fn load(&mut self, destination: impl AsRef<Path>) -> Result<Extracted> {
        let destination = destination.as_ref();
        let format = self.pack.format;
        tracing::debug!(
            archive = %self.target.describe(),
            extension = self.pack.extension,
            destination = %destination.display(),
            "loading archive"
        );

        let paths = match &mut self.target {
            Target::Path(path) => {
                let file = File::open(&*path).map_err(|source| Error::Open {
                    path: path.clone(),
                    source,
                })?;
                read_entries(format, BufReader::new(file), destination)?
            }
            Target::Stream(stream) => {
                stream.rewind()?;
                read_entries(format, &mut *stream, destination)?
            }
        };

        Ok(Extracted {
            paths: paths.into_iter(),
        })
    }
}

fn read_entries<R: Read + Seek>(
    format: ArchiveFormat,
    reader: R,
    destination: &Path,
) -> Result<Vec<PathBuf>> {
    match format {
        ArchiveFormat::Zip => extract::extract(&mut ZipSource::new(reader)?, destination),
        ArchiveFormat::Tar(codec) => extract::extract(&mut TarSource::new(reader, codec), destination),
    }
}

/// Paths produced by [`Archive::load`], in archive order.
///
/// Extraction has already happened when this is returned; iterating only
/// hands out the paths. It cannot be restarted.
#[derive(Debug)]
pub struct Extracted {
    paths: std::vec::IntoIter<PathBuf>,
}

impl Iterator for Extracted {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> { self.paths.next() }

    fn size_hint(&self) -> (usize, Option<usize>) { self.paths.size_hint() }
}

impl ExactSizeIterator for Extracted {}
