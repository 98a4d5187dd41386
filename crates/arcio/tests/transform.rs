use std::cell::RefCell;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use arcio::{
    Archive, Error, FormatError, LoadOptions, SaveOptions, Target, extensions, load, load_or_else, load_path,
    save, save_path,
};
use tempfile::tempdir;

const SAMPLE_NAME: &str = "sample.txt";
const SAMPLE_TEXT: &str = "0123456789";

#[derive(Debug, thiserror::Error)]
enum ConsumerError {
    #[error("rejected {0}")]
    Rejected(String),

    #[error("exhausted after {0} attempts")]
    Exhausted(usize),

    #[error(transparent)]
    Archive(#[from] Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn file_name(path: &Path) -> String { path.file_name().unwrap().to_string_lossy().into_owned() }

/// Writes the sample plus a backup copy next to it.
fn write_sample(target: &Path) -> Result<(), ConsumerError> {
    assert_eq!(file_name(target), SAMPLE_NAME);
    std::fs::write(target, SAMPLE_TEXT)?;
    std::fs::write(target.with_file_name("backup.txt"), SAMPLE_TEXT)?;
    Ok(())
}

/// Refuses the backup copy and checks the sample against it.
fn read_sample(source: &Path) -> Result<String, ConsumerError> {
    let content = std::fs::read_to_string(source)?;
    if file_name(source) == "backup.txt" {
        return Err(ConsumerError::Rejected(file_name(source)));
    }
    let backup = std::fs::read_to_string(source.with_file_name("backup.txt"))?;
    assert_eq!(backup, content);
    Ok(content)
}

#[test]
fn save_and_load_every_extension_and_plain_files() {
    let dir = tempdir().unwrap();
    let suffixes = std::iter::once("").chain(extensions());

    for suffix in suffixes {
        let archive_path = dir.path().join(format!("{SAMPLE_NAME}{suffix}"));
        let saved = save_path(&archive_path, &SaveOptions::new(), write_sample).unwrap();
        assert_eq!(saved.is_archived(), !suffix.is_empty(), "{suffix:?}");

        let content = load_path(&archive_path, &LoadOptions::new(), read_sample).unwrap();
        assert_eq!(content, SAMPLE_TEXT, "{suffix:?}");
    }
}

#[test]
fn save_returns_the_archive_target() {
    let dir = tempdir().unwrap();
    let archive_path = dir.path().join("sample.txt.zip");
    let saved = save_path(&archive_path, &SaveOptions::new(), write_sample).unwrap();

    let target = saved.archived().unwrap();
    assert_eq!(target.as_path(), Some(archive_path.as_path()));
}

#[test]
fn staging_directory_is_removed_after_save() {
    let dir = tempdir().unwrap();
    let staged = RefCell::new(PathBuf::new());

    save_path(dir.path().join("sample.txt.tar"), &SaveOptions::new(), |path| {
        *staged.borrow_mut() = path.to_path_buf();
        write_sample(path)
    })
    .unwrap();

    let staged = staged.into_inner();
    assert_eq!(file_name(&staged), SAMPLE_NAME);
    assert!(!staged.parent().unwrap().exists());
}

#[test]
fn staging_directory_is_removed_when_producer_fails() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("broken.tar.gz");
    let mut staged = PathBuf::new();

    let result = save_path(&target, &SaveOptions::new(), |path| -> Result<(), ConsumerError> {
        staged = path.to_path_buf();
        std::fs::write(path, "partial")?;
        Err(ConsumerError::Rejected("producer".into()))
    });

    assert!(matches!(result, Err(ConsumerError::Rejected(_))));
    assert_eq!(file_name(&staged), "broken");
    assert!(!staged.parent().unwrap().exists());
    assert!(!target.exists());
}

#[test]
fn plain_paths_pass_through_untouched() {
    let dir = tempdir().unwrap();
    let plain = dir.path().join("notes.xyz");

    let seen = save_path(&plain, &SaveOptions::new(), |path| -> Result<PathBuf, ConsumerError> {
        std::fs::write(path, "direct")?;
        Ok(path.to_path_buf())
    })
    .unwrap()
    .direct()
    .unwrap();
    assert_eq!(seen, plain);

    let loaded = load_path(&plain, &LoadOptions::new(), |path| -> Result<_, ConsumerError> {
        assert_eq!(path, plain);
        Ok(std::fs::read_to_string(path)?)
    })
    .unwrap();
    assert_eq!(loaded, "direct");
}

#[test]
fn stream_targets_need_extension_and_name() {
    let no_extension = save(Target::stream(Cursor::new(Vec::<u8>::new())), &SaveOptions::new(), |_| {
        Ok::<_, Error>(())
    });
    assert!(matches!(no_extension, Err(Error::Format(FormatError::MissingExtension))));

    let options = SaveOptions::new().target_extension(".zip");
    let no_name = save(Target::stream(Cursor::new(Vec::<u8>::new())), &options, |_| Ok::<_, Error>(()));
    assert!(matches!(no_name, Err(Error::Format(FormatError::MissingName))));
}

#[test]
fn stream_round_trip_through_transformers() {
    let options = SaveOptions::new().target_extension("tar.bz2").target_name(SAMPLE_NAME);
    let saved = save(Target::stream(Cursor::new(Vec::<u8>::new())), &options, write_sample).unwrap();
    let stream = saved.archived().unwrap().into_stream().unwrap();

    let options = LoadOptions::new().source_extension(".tar.bz2");
    let content = load(Target::stream(stream), &options, read_sample).unwrap();
    assert_eq!(content, SAMPLE_TEXT);
}

/// Stream archive holding `files` (name, content) at its root.
fn archive_of(extension: &str, files: &[(&str, &str)]) -> Cursor<Vec<u8>> {
    let dir = tempdir().unwrap();
    let paths: Vec<_> = files
        .iter()
        .map(|(name, content)| {
            let path = dir.path().join(name);
            std::fs::write(&path, content).unwrap();
            path
        })
        .collect();

    let mut archive = Archive::from_stream(Cursor::new(Vec::<u8>::new()), extension).unwrap();
    archive.save(&paths, Some(dir.path())).unwrap();
    archive.into_target().into_stream().unwrap()
}

#[test]
fn first_successful_candidate_wins() {
    for extension in extensions() {
        let stream = archive_of(extension, &[("a.ini", "ini"), ("b.txt", "text"), ("c.txt", "later")]);
        let mut attempts = Vec::new();

        let options = LoadOptions::new().source_extension(extension);
        let content = load(Target::stream(stream), &options, |path| {
            attempts.push(file_name(path));
            if path.extension().is_some_and(|ext| ext == "ini") {
                return Err(ConsumerError::Rejected(file_name(path)));
            }
            Ok(std::fs::read_to_string(path)?)
        })
        .unwrap();

        assert_eq!(content, "text", "{extension}");
        assert_eq!(attempts, ["a.ini", "b.txt"], "{extension}");
    }
}

#[test]
fn all_failures_are_aggregated_in_attempt_order() {
    let stream = archive_of(".zip", &[("one.txt", "1"), ("two.txt", "2"), ("three.txt", "3")]);
    let options = LoadOptions::new().source_extension("zip");

    let err = load(Target::stream(stream), &options, |path| -> Result<(), ConsumerError> {
        Err(ConsumerError::Rejected(file_name(path)))
    })
    .unwrap_err();

    let exhausted = match err {
        ConsumerError::Archive(Error::CandidatesExhausted(exhausted)) => exhausted,
        other => panic!("expected aggregated failure, got {other:?}"),
    };
    assert_eq!(exhausted.messages, ["rejected one.txt", "rejected two.txt", "rejected three.txt"]);
    assert!(exhausted.to_string().contains("rejected two.txt"));
}

#[test]
fn custom_failure_kind_replaces_default() {
    let stream = archive_of(".tar", &[("x.txt", "x"), ("y.txt", "y")]);
    let options = LoadOptions::new().source_extension("tar");

    let err = load_or_else(
        Target::stream(stream),
        &options,
        |path| -> Result<(), ConsumerError> { Err(ConsumerError::Rejected(file_name(path))) },
        |exhausted| ConsumerError::Exhausted(exhausted.messages.len()),
    )
    .unwrap_err();

    assert!(matches!(err, ConsumerError::Exhausted(2)));
}

#[test]
fn extension_preference_orders_and_filters_candidates() {
    let stream = archive_of(
        ".tar.gz",
        &[("a.csv", "a"), ("a.txt", "a"), ("b.csv", "b"), ("b.txt", "b"), ("readme.md", "r")],
    );
    let options = LoadOptions::new().source_extension(".tar.gz").extensions([".csv", ".txt"]);
    let mut attempts = Vec::new();

    let _ = load(Target::stream(stream), &options, |path| -> Result<(), ConsumerError> {
        attempts.push(file_name(path));
        Err(ConsumerError::Rejected(file_name(path)))
    });

    assert_eq!(attempts, ["a.csv", "b.csv", "a.txt", "b.txt"]);
}

#[test]
fn archive_without_candidates_fails_immediately() {
    let dir = tempdir().unwrap();
    std::fs::create_dir(dir.path().join("only-a-directory")).unwrap();
    let mut archive = Archive::from_stream(Cursor::new(Vec::<u8>::new()), ".tar").unwrap();
    archive.save([dir.path()], Some(dir.path())).unwrap();
    let stream = archive.into_target().into_stream().unwrap();

    let mut called = false;
    let err = load(Target::stream(stream), &LoadOptions::new().source_extension("tar"), |_| {
        called = true;
        Ok::<_, Error>(())
    })
    .unwrap_err();

    assert!(matches!(err, Error::NoCandidates { .. }));
    assert!(!called);
}

#[test]
fn corrupt_archive_is_not_retried() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("corrupt.tar.gz");
    std::fs::write(&path, b"definitely not gzip").unwrap();

    let mut called = false;
    let result = load_path(&path, &LoadOptions::new(), |_| {
        called = true;
        Ok::<_, Error>(())
    });

    assert!(matches!(result, Err(ref e) if !e.is_format()));
    assert!(!called);
}

#[test]
fn anyhow_errors_plug_in_directly() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("report.csv.tar.gz");

    save_path(&path, &SaveOptions::new(), |target| -> anyhow::Result<()> {
        std::fs::write(target, "a,b\n1,2\n")?;
        Ok(())
    })
    .unwrap();

    let rows = load_path(&path, &LoadOptions::new().extensions([".csv"]), |source| -> anyhow::Result<usize> {
        Ok(std::fs::read_to_string(source)?.lines().count())
    })
    .unwrap();
    assert_eq!(rows, 2);
}

#[test]
fn member_name_must_stay_inside_staging() {
    let dir = tempdir().unwrap();
    let outside = dir.path().join("outside.txt");
    let absolute = outside.to_string_lossy().into_owned();

    for name in ["../../../../../../outside.txt", absolute.as_str()] {
        let mut called = false;
        let options = SaveOptions::new().target_name(name);
        let result = save_path(dir.path().join("bundle.zip"), &options, |path| {
            called = true;
            std::fs::write(path, "stray").map_err(Error::from)
        });

        assert!(matches!(result, Err(Error::ZipSlip { .. })), "{name}");
        assert!(!called, "{name}");
    }
    assert!(!outside.exists());
}

#[test]
fn inner_parent_components_in_member_name_are_resolved() {
    let options = SaveOptions::new().target_extension("tar").target_name("draft/../sample.txt");
    let mut seen = PathBuf::new();

    save(Target::stream(Cursor::new(Vec::<u8>::new())), &options, |path| {
        seen = path.to_path_buf();
        std::fs::write(path, SAMPLE_TEXT).map_err(Error::from)
    })
    .unwrap();

    assert_eq!(file_name(&seen), SAMPLE_NAME);
    assert!(!seen.to_string_lossy().contains(".."));
}

#[test]
fn suffix_only_target_has_no_member_name() {
    let dir = tempdir().unwrap();
    let mut called = false;

    let result = save_path(dir.path().join(".zip"), &SaveOptions::new(), |_| {
        called = true;
        Ok::<_, Error>(())
    });

    assert!(matches!(result, Err(Error::Format(FormatError::MissingName))));
    assert!(!called);
}
