//! Save and load transformers.
//!
//! [`save`] lets a function that writes files to a path target an archive
//! instead: the function writes into a staging directory whose contents are
//! then archived. [`load`] lets a function that reads one file accept an
//! archive: the archive is extracted and the function is tried on each
//! extracted file until one attempt succeeds.
//!
//! Both fall through to calling the function directly when the target does
//! not name a recognized archive format.

use std::fmt::Display;
use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};

use arcio_fs::ScopedTempDir;

use crate::archive::{Archive, Target, resolve_pack};
use crate::error::{Error, Exhausted, FormatError, Result};
use crate::sanitize::sanitize_path;

#[derive(Clone, Debug, Default)]
pub struct SaveOptions {
    pub target_extension: Option<String>,
    pub target_name: Option<String>,
    pub staging_prefix: Option<String>,
}

impl SaveOptions {
    pub fn new() -> Self { Self::default() }

    /// Archive format, overriding the target's suffix. Required for streams.
    pub fn target_extension(mut self, extension: impl Into<String>) -> Self {
        self.target_extension = Some(extension.into());
        self
    }

    /// Name handed to the producer inside the staging directory. Required for streams.
    pub fn target_name(mut self, name: impl Into<String>) -> Self {
        self.target_name = Some(name.into());
        self
    }

    pub fn staging_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.staging_prefix = Some(prefix.into());
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub extensions: Vec<String>,
    pub source_extension: Option<String>,
    pub staging_prefix: Option<String>,
}

impl LoadOptions {
    pub fn new() -> Self { Self::default() }

    /// Only try files ending with one of `extensions`, in this priority order.
    pub fn extensions<I, E>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Archive format, overriding the source's suffix. Required for streams.
    pub fn source_extension(mut self, extension: impl Into<String>) -> Self {
        self.source_extension = Some(extension.into());
        self
    }

    pub fn staging_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.staging_prefix = Some(prefix.into());
        self
    }
}

/// Outcome of [`save`].
#[derive(Debug)]
pub enum Saved<S, T> {
    /// The producer's output was archived into this target.
    Archived(Target<S>),
    /// The target was not an archive; the producer ran on it directly.
    Direct(T),
}

impl<S, T> Saved<S, T> {
    pub fn is_archived(&self) -> bool { matches!(self, Self::Archived(_)) }

    pub fn archived(self) -> Option<Target<S>> {
        match self {
            Self::Archived(target) => Some(target),
            Self::Direct(_) => None,
        }
    }

    pub fn direct(self) -> Option<T> {
        match self {
            Self::Archived(_) => None,
            Self::Direct(value) => Some(value),
        }
    }
}

fn staging_dir(prefix: Option<&str>) -> Result<ScopedTempDir> {
    let dir = match prefix {
        Some(prefix) => ScopedTempDir::with_prefix(prefix)?,
        None => ScopedTempDir::new()?,
    };
    Ok(dir)
}

/// Run `producer` against `target`, archiving whatever it writes.
///
/// When `target` names an archive, `producer` receives a path inside a fresh
/// staging directory: `options.target_name`, or the target's file name with the
/// archive suffix stripped. Everything under the staging directory is then
/// saved at archive root. The staging directory is removed on every exit path.
///
/// A path target with an unrecognized suffix is handed to `producer` as is.
/// Stream targets cannot fall through and report [`FormatError`] instead.
///
/// The member name must stay inside the staging directory: absolute names and
/// names climbing out through `..` fail with [`Error::ZipSlip`]. An empty name,
/// as derived from a target called just `".zip"`, fails with
/// [`FormatError::MissingName`] instead of handing `producer` the staging
/// directory itself.
pub fn save<S, F, T, E>(target: Target<S>, options: &SaveOptions, producer: F) -> std::result::Result<Saved<S, T>, E>
where
    S: Write + Seek,
    F: FnOnce(&Path) -> std::result::Result<T, E>,
    E: From<Error>,
{
    let pack = match resolve_pack(&target, options.target_extension.as_deref()) {
        Ok(pack) => pack,
        Err(e) => {
            return match target {
                Target::Path(path) => {
                    tracing::debug!(path = %path.display(), reason = %e, "not an archive, saving directly");
                    producer(path.as_path()).map(Saved::Direct)
                }
                Target::Stream(_) => Err(Error::from(e).into()),
            };
        }
    };

    let mut archive = Archive::with_pack(target, pack);
    let name = match options.target_name.clone().or_else(|| archive.member_name()) {
        Some(name) => name,
        None => return Err(Error::from(FormatError::MissingName).into()),
    };

    let staging = staging_dir(options.staging_prefix.as_deref())?;
    let member = sanitize_path(&name, staging.path())?;
    if member.as_path() == staging.path() {
        return Err(Error::from(FormatError::MissingName).into());
    }
    tracing::debug!(
        archive = %archive.target().describe(),
        member = %member.display(),
        "staging archive contents"
    );

    producer(&member)?;
    archive.save([staging.path()], Some(staging.path()))?;
    staging.close().map_err(Error::from)?;

    Ok(Saved::Archived(archive.into_target()))
}

/// [`save`] for a filesystem path.
pub fn save_path<F, T, E>(path: impl Into<PathBuf>, options: &SaveOptions, producer: F) -> std::result::Result<Saved<File, T>, E>
where
    F: FnOnce(&Path) -> std::result::Result<T, E>,
    E: From<Error>,
{
    save(Target::path(path), options, producer)
}

/// Run `consumer` on `source`, trying every file inside it when it is an archive.
///
/// The first candidate for which `consumer` succeeds wins; no later candidate
/// is tried. When all fail, the error is [`Error::CandidatesExhausted`] with
/// every attempt's message in attempt order. An archive holding no candidate
/// files fails with [`Error::NoCandidates`].
pub fn load<S, F, T, E>(source: Target<S>, options: &LoadOptions, consumer: F) -> std::result::Result<T, E>
where
    S: Read + Seek,
    F: FnMut(&Path) -> std::result::Result<T, E>,
    E: From<Error> + Display,
{
    load_or_else(source, options, consumer, |exhausted| {
        Error::CandidatesExhausted(exhausted).into()
    })
}

/// [`load`] for a filesystem path.
pub fn load_path<F, T, E>(path: impl Into<PathBuf>, options: &LoadOptions, consumer: F) -> std::result::Result<T, E>
where
    F: FnMut(&Path) -> std::result::Result<T, E>,
    E: From<Error> + Display,
{
    load(Target::path(path), options, consumer)
}

/// [`load`] with a caller-chosen error for the all-candidates-failed case.
pub fn load_or_else<S, F, T, E, G>(
    source: Target<S>,
    options: &LoadOptions,
    mut consumer: F,
    on_exhausted: G,
) -> std::result::Result<T, E>
where
    S: Read + Seek,
    F: FnMut(&Path) -> std::result::Result<T, E>,
    E: From<Error> + Display,
    G: FnOnce(Exhausted) -> E,
{
    let pack = match resolve_pack(&source, options.source_extension.as_deref()) {
        Ok(pack) => pack,
        Err(e) => {
            return match source {
                Target::Path(path) => {
                    tracing::debug!(path = %path.display(), reason = %e, "not an archive, loading directly");
                    consumer(path.as_path())
                }
                Target::Stream(_) => Err(Error::from(e).into()),
            };
        }
    };

    let mut archive = Archive::with_pack(source, pack);
    let name = archive.target().describe();
    let staging = staging_dir(options.staging_prefix.as_deref())?;

    let extracted: Vec<PathBuf> = archive.load(staging.path())?.filter(|path| !path.is_dir()).collect();
    let candidates = select_candidates(extracted, &options.extensions);
    if candidates.is_empty() {
        return Err(Error::NoCandidates { archive: name }.into());
    }

    let mut messages = Vec::with_capacity(candidates.len());
    for candidate in &candidates {
        match consumer(candidate.as_path()) {
            Ok(value) => {
                tracing::debug!(archive = %name, candidate = %candidate.display(), "candidate accepted");
                return Ok(value);
            }
            Err(e) => {
                tracing::debug!(archive = %name, candidate = %candidate.display(), error = %e, "candidate rejected");
                messages.push(e.to_string());
            }
        }
    }

    Err(on_exhausted(Exhausted {
        archive: name,
        messages,
    }))
}

/// Filter and order `paths` by extension preference.
///
/// Paths ending with the first preference come first, then those ending with
/// the second, and so on; relative order within a group is preserved and
/// paths matching no preference are dropped. A path is placed under the first
/// preference it matches. With no preferences every path is kept as is.
pub fn select_candidates<P, X>(paths: impl IntoIterator<Item = P>, preferences: &[X]) -> Vec<P>
where
    P: AsRef<Path>,
    X: AsRef<str>,
{
    if preferences.is_empty() {
        return paths.into_iter().collect();
    }

    let preferences: Vec<String> = preferences
        .iter()
        .map(|extension| extension.as_ref().to_ascii_lowercase())
        .collect();

    let mut ranked: Vec<(usize, P)> = paths
        .into_iter()
        .filter_map(|path| {
            let lower = path.as_ref().to_string_lossy().to_ascii_lowercase();
            preferences
                .iter()
                .position(|extension| lower.ends_with(extension.as_str()))
                .map(|rank| (rank, path))
        })
        .collect();
    ranked.sort_by_key(|(rank, _)| *rank);
    ranked.into_iter().map(|(_, path)| path).collect()
}
