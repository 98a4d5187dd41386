use std::io::{self, Read, Write};
use std::path::Path;

use crate::error::FormatError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Tar(Compression),
}

/// Compression codec wrapped around a tar stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Bzip2,
}

/// A recognized archive suffix and the format it selects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtensionPack {
    pub extension: &'static str,
    pub format:    ArchiveFormat,
}

/// Registered suffixes, most specific first.
///
/// `.tar.gz` and `.tar.bz2` must precede `.tar` so suffix matching picks the
/// compressed variant.
pub const EXTENSION_PACKS: &[ExtensionPack] = &[
    ExtensionPack {
        extension: ".zip",
        format:    ArchiveFormat::Zip,
    },
    ExtensionPack {
        extension: ".tar.gz",
        format:    ArchiveFormat::Tar(Compression::Gzip),
    },
    ExtensionPack {
        extension: ".tar.bz2",
        format:    ArchiveFormat::Tar(Compression::Bzip2),
    },
    ExtensionPack {
        extension: ".tar",
        format:    ArchiveFormat::Tar(Compression::None),
    },
];

/// Registered extensions in priority order.
pub fn extensions() -> impl Iterator<Item = &'static str> {
    EXTENSION_PACKS.iter().map(|pack| pack.extension)
}

/// Resolve a path by testing its lowercased form against each registered suffix.
pub fn pack_for_path(path: &Path) -> Result<&'static ExtensionPack, FormatError> {
    let lower = path.to_string_lossy().to_ascii_lowercase();
    EXTENSION_PACKS
        .iter()
        .find(|pack| lower.ends_with(pack.extension))
        .ok_or_else(|| FormatError::Unsupported(path.display().to_string()))
}

/// Resolve an explicit extension, case-insensitively, with or without its leading dot.
pub fn pack_for_extension(extension: &str) -> Result<&'static ExtensionPack, FormatError> {
    let lower = extension.trim().to_ascii_lowercase();
    let wanted = lower.strip_prefix('.').unwrap_or(&lower);
    EXTENSION_PACKS
        .iter()
        .find(|pack| &pack.extension[1..] == wanted)
        .ok_or_else(|| FormatError::Unsupported(extension.to_string()))
}

impl ArchiveFormat {
    pub fn extension(self) -> &'static str {
        EXTENSION_PACKS
            .iter()
            .find(|pack| pack.format == self)
            .map(|pack| pack.extension)
            .unwrap_or_default()
    }
}

impl Compression {
    pub fn decoder<R: Read>(self, reader: R) -> Decoder<R> {
        match self {
            Self::None => Decoder::Passthrough(reader),
            Self::Gzip => Decoder::Gzip(Box::new(flate2::read::GzDecoder::new(reader))),
            Self::Bzip2 => Decoder::Bzip2(Box::new(bzip2::read::BzDecoder::new(reader))),
        }
    }

    pub fn encoder<W: Write>(self, writer: W) -> Encoder<W> {
        match self {
            Self::None => Encoder::Passthrough(writer),
            Self::Gzip => Encoder::Gzip(Box::new(flate2::write::GzEncoder::new(
                writer,
                flate2::Compression::default(),
            ))),
            Self::Bzip2 => Encoder::Bzip2(Box::new(bzip2::write::BzEncoder::new(
                writer,
                bzip2::Compression::default(),
            ))),
        }
    }
}

/// Decoder wrapper for tar decompression.
pub enum Decoder<R: Read> {
    Passthrough(R),
    Gzip(Box<flate2::read::GzDecoder<R>>),
    Bzip2(Box<bzip2::read::BzDecoder<R>>),
}

impl<R: Read> Read for Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Passthrough(r) => r.read(buf),
            Self::Gzip(d) => d.read(buf),
            Self::Bzip2(d) => d.read(buf),
        }
    }
}

/// Encoder wrapper for tar compression.
pub enum Encoder<W: Write> {
    Passthrough(W),
    Gzip(Box<flate2::write::GzEncoder<W>>),
    Bzip2(Box<bzip2::write::BzEncoder<W>>),
}

impl<W: Write> Encoder<W> {
    /// Flush the codec trailer and hand back the underlying writer.
    pub fn finish(self) -> io::Result<W> {
        match self {
            Self::Passthrough(mut w) => {
                w.flush()?;
                Ok(w)
            }
            Self::Gzip(e) => e.finish(),
            Self::Bzip2(e) => e.finish(),
        }
    }
}

impl<W: Write> Write for Encoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Passthrough(w) => w.write(buf),
            Self::Gzip(e) => e.write(buf),
            Self::Bzip2(e) => e.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Passthrough(w) => w.flush(),
            Self::Gzip(e) => e.flush(),
            Self::Bzip2(e) => e.flush(),
        }
    }
}
