//! End-to-end tests: create archives from real trees, extract them again.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use carch_core::ArchiveError;
use carch_core::ExtractionConfig;
use carch_core::Format;
use carch_core::create_archive;
use carch_core::creation::ArchiveCreator;
use carch_core::creation::CollisionPolicy;
use carch_core::creation::ContainerKind;
use carch_core::creation::CreationConfig;
use carch_core::creation::FilterRules;
use carch_core::extract_archive;
use carch_core::formats::Compression;
use carch_core::formats::detect_bytes;
use carch_core::formats::detect_path;
use tempfile::TempDir;

const TEST_FILES: [(&str, &str); 4] = [
    ("test/test1.txt", "some content\n"),
    ("test/test2.txt", "some more content\n"),
    ("test/dir/test1.txt", "different content\n"),
    ("test/dir/test2.txt", "might be different content\n"),
];

fn fixture() -> TempDir {
    let temp = TempDir::new().unwrap();
    for (name, content) in TEST_FILES {
        let path = temp.path().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    temp
}

/// Relative path -> content for every regular file below `root`.
fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    walkdir::WalkDir::new(root)
        .into_iter()
        .map(Result::unwrap)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(root).unwrap().to_path_buf();
            (rel, fs::read(e.path()).unwrap())
        })
        .collect()
}

fn expected_four_files() -> BTreeMap<PathBuf, Vec<u8>> {
    TEST_FILES
        .iter()
        .map(|(name, content)| (PathBuf::from(name), content.as_bytes().to_vec()))
        .collect()
}

#[test]
fn test_gzip_tar_four_file_roundtrip() {
    let temp = fixture();
    let dest = temp.path().join("test.tar.gz");

    let report = create_archive(&dest, &[temp.path().join("test")], &CreationConfig::default()).unwrap();

    assert_eq!(report.files_added, 4);
    assert_eq!(report.bytes_written, 76);
    assert_eq!(report.directories_skipped, 1);
    assert_eq!(report.bytes_compressed, fs::metadata(&dest).unwrap().len());
    assert_eq!(detect_path(&dest).unwrap(), Format::Gzip);

    let out = temp.path().join("extracted");
    let extracted = extract_archive(&dest, &out, &ExtractionConfig::default()).unwrap();
    assert_eq!(extracted.files_extracted, 4);
    assert_eq!(extracted.bytes_written, 76);
    assert_eq!(snapshot(&out), expected_four_files());
}

#[test]
fn test_every_writable_flavour_roundtrips() {
    let flavours = [
        (ContainerKind::Tar, Compression::None, "t.tar", Format::Tar),
        (ContainerKind::Tar, Compression::Gzip, "t.tgz", Format::Gzip),
        (ContainerKind::Tar, Compression::Lz4, "t.tar.lz4", Format::Lz4),
        (ContainerKind::Zip, Compression::Gzip, "t.zip", Format::Zip),
        (ContainerKind::Zip, Compression::None, "stored.zip", Format::Zip),
    ];

    for (container, compression, name, format) in flavours {
        let temp = fixture();
        let dest = temp.path().join(name);
        let config = CreationConfig::default()
            .with_container(container)
            .with_compression(compression);

        let report = create_archive(&dest, &[temp.path().join("test")], &config).unwrap();
        assert_eq!(report.files_added, 4, "{name}");
        assert_eq!(detect_path(&dest).unwrap(), format, "{name}");

        let out = temp.path().join("out");
        extract_archive(&dest, &out, &ExtractionConfig::default()).unwrap();
        assert_eq!(snapshot(&out), expected_four_files(), "{name}");
    }
}

#[test]
fn test_bzip2_tar_extracts_but_cannot_be_created() {
    let temp = fixture();

    let config = CreationConfig::default().with_compression(Compression::Bzip2);
    let err = create_archive(temp.path().join("a.tar.bz2"), &[temp.path().join("test")], &config).unwrap_err();
    assert!(err.is_configuration_error());

    let plain = temp.path().join("plain.tar");
    let config = CreationConfig::default().with_compression(Compression::None);
    create_archive(&plain, &[temp.path().join("test")], &config).unwrap();

    let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::best());
    std::io::copy(&mut fs::File::open(&plain).unwrap(), &mut encoder).unwrap();
    let bz = temp.path().join("a.tar.bz2");
    fs::write(&bz, encoder.finish().unwrap()).unwrap();

    let out = temp.path().join("out");
    let report = extract_archive(&bz, &out, &ExtractionConfig::default()).unwrap();
    assert_eq!(report.format, Some(Format::Bzip2));
    assert_eq!(snapshot(&out), expected_four_files());
}

#[test]
fn test_include_and_exclude_extensions() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("logs");
    fs::create_dir_all(&src).unwrap();
    for name in ["a.txt", "a.log", "a.log.txt", "b.md"] {
        fs::write(src.join(name), name).unwrap();
    }

    let dest = temp.path().join("logs.tar");
    let config = CreationConfig::default()
        .with_compression(Compression::None)
        .with_include(FilterRules::default().with_extensions(["txt"]))
        .with_exclude(FilterRules::default().with_extensions(["log"]));
    let report = create_archive(&dest, &[&src], &config).unwrap();
    assert_eq!(report.files_added, 2);

    let out = temp.path().join("out");
    extract_archive(&dest, &out, &ExtractionConfig::default()).unwrap();
    let names: Vec<_> = snapshot(&out).into_keys().collect();
    assert_eq!(
        names,
        vec![PathBuf::from("logs/a.log.txt"), PathBuf::from("logs/a.txt")]
    );
}

#[test]
fn test_glob_and_name_exclusion() {
    let temp = fixture();
    let dest = temp.path().join("t.tar");
    let config = CreationConfig::default()
        .with_compression(Compression::None)
        .with_exclude(FilterRules::default().with_glob("**/dir/*"));

    let report = create_archive(&dest, &[temp.path().join("test")], &config).unwrap();
    assert_eq!(report.files_added, 2);

    let dest = temp.path().join("n.tar");
    let config = CreationConfig::default()
        .with_compression(Compression::None)
        .with_exclude(FilterRules::default().with_names(["test1.txt"]));
    let report = create_archive(&dest, &[temp.path().join("test")], &config).unwrap();
    assert_eq!(report.files_added, 2);
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_never_archived() {
    let temp = fixture();
    std::os::unix::fs::symlink(
        temp.path().join("test/test1.txt"),
        temp.path().join("test/link.txt"),
    )
    .unwrap();
    std::os::unix::fs::symlink(temp.path().join("test/dir"), temp.path().join("test/dirlink")).unwrap();

    let dest = temp.path().join("t.tar");
    let config = CreationConfig::default().with_compression(Compression::None);
    let report = create_archive(&dest, &[temp.path().join("test")], &config).unwrap();
    assert_eq!(report.files_added, 4);

    let mut archive = tar::Archive::new(fs::File::open(&dest).unwrap());
    for entry in archive.entries().unwrap() {
        let entry = entry.unwrap();
        let path = entry.path().unwrap().into_owned();
        assert!(!path.to_string_lossy().contains("link"), "{}", path.display());
    }
}

#[test]
fn test_archiving_twice_is_identical() {
    let temp = fixture();
    let flavours = [
        ("tar", CreationConfig::default().with_compression(Compression::None)),
        ("tar.gz", CreationConfig::default()),
        ("tar.lz4", CreationConfig::default().with_compression(Compression::Lz4)),
        ("zip", CreationConfig::default().with_container(ContainerKind::Zip)),
    ];

    for (ext, config) in flavours {
        let one = temp.path().join(format!("one.{ext}"));
        let two = temp.path().join(format!("two.{ext}"));
        create_archive(&one, &[temp.path().join("test")], &config).unwrap();
        create_archive(&two, &[temp.path().join("test")], &config).unwrap();
        assert!(fs::read(&one).unwrap() == fs::read(&two).unwrap(), "{ext} archives differ");
    }
}

#[test]
fn test_archiving_many_roots_twice_is_identical() {
    let temp = TempDir::new().unwrap();
    let roots: Vec<PathBuf> = (0..4)
        .map(|r| {
            let root = temp.path().join(format!("root{r}"));
            fs::create_dir_all(root.join("nested")).unwrap();
            for i in 0..100 {
                fs::write(root.join(format!("f{i}.txt")), format!("{r}:{i}")).unwrap();
                fs::write(root.join(format!("nested/n{i}.txt")), format!("nested {r}:{i}")).unwrap();
            }
            root
        })
        .collect();
    let config = CreationConfig::default()
        .with_compression(Compression::None)
        .with_queue_capacity(1);

    let archives: Vec<Vec<u8>> = (0..4)
        .map(|run| {
            let dest = temp.path().join(format!("run{run}.tar"));
            let report = create_archive(&dest, &roots, &config).unwrap();
            assert_eq!(report.files_added, 800);
            fs::read(dest).unwrap()
        })
        .collect();
    for pair in archives.windows(2) {
        assert!(pair[0] == pair[1], "archives of the same roots differ");
    }

    let mut archive = tar::Archive::new(&archives[0][..]);
    let names: Vec<PathBuf> = archive
        .entries()
        .unwrap()
        .map(|e| e.unwrap().path().unwrap().into_owned())
        .collect();
    assert_eq!(names.first().unwrap(), Path::new("root0/f0.txt"));
    assert_eq!(names.last().unwrap(), Path::new("root3/nested/n99.txt"));
    let first_of_each: Vec<usize> = (0..4)
        .map(|r| names.iter().position(|n| n.starts_with(format!("root{r}"))).unwrap())
        .collect();
    assert_eq!(first_of_each, vec![0, 200, 400, 600]);
}

#[test]
fn test_destination_inside_source_is_not_archived() {
    let temp = fixture();
    let root = temp.path().join("test");
    let dest = root.join("self.tar");

    let config = CreationConfig::default().with_compression(Compression::None);
    let report = create_archive(&dest, &[root.clone()], &config).unwrap();
    assert_eq!(report.files_added, 4);

    let out = temp.path().join("out");
    extract_archive(&dest, &out, &ExtractionConfig::default()).unwrap();
    assert_eq!(snapshot(&out), expected_four_files());
}

#[test]
fn test_delete_sources_keeps_archive_inside_source() {
    let temp = fixture();
    let root = temp.path().join("test");
    let dest = root.join("backup.tar.gz");

    let config = CreationConfig::default().with_delete_sources(true);
    let report = create_archive(&dest, &[root.clone()], &config).unwrap();

    assert_eq!(report.files_added, 4);
    assert_eq!(report.sources_deleted, 4);
    assert!(dest.exists());
    assert!(!root.join("test1.txt").exists());

    let out = temp.path().join("out");
    let extracted = extract_archive(&dest, &out, &ExtractionConfig::default()).unwrap();
    assert_eq!(extracted.files_extracted, 4);
    assert_eq!(snapshot(&out), expected_four_files());
}

#[test]
fn test_multiple_roots_in_one_archive() {
    let temp = fixture();
    fs::create_dir_all(temp.path().join("other")).unwrap();
    fs::write(temp.path().join("other/x.txt"), "x").unwrap();
    fs::write(temp.path().join("single.txt"), "single").unwrap();

    let dest = temp.path().join("multi.zip");
    let config = CreationConfig::default().with_container(ContainerKind::Zip);
    let report = create_archive(
        &dest,
        &[
            temp.path().join("test"),
            temp.path().join("other"),
            temp.path().join("single.txt"),
        ],
        &config,
    )
    .unwrap();
    assert_eq!(report.files_added, 6);

    let out = temp.path().join("out");
    extract_archive(&dest, &out, &ExtractionConfig::default()).unwrap();
    assert_eq!(fs::read_to_string(out.join("other/x.txt")).unwrap(), "x");
    assert_eq!(fs::read_to_string(out.join("single.txt")).unwrap(), "single");
    assert!(out.join("test/dir/test2.txt").is_file());
}

#[test]
fn test_owner_and_mode_overrides() {
    let temp = fixture();
    let dest = temp.path().join("o.tar");
    let config = CreationConfig::default()
        .with_compression(Compression::None)
        .with_owner(4242)
        .with_group(4343)
        .with_mode(0o600);
    create_archive(&dest, &[temp.path().join("test")], &config).unwrap();

    let mut archive = tar::Archive::new(fs::File::open(&dest).unwrap());
    for entry in archive.entries().unwrap() {
        let entry = entry.unwrap();
        assert_eq!(entry.header().uid().unwrap(), 4242);
        assert_eq!(entry.header().gid().unwrap(), 4343);
        assert_eq!(entry.header().mode().unwrap(), 0o600);
    }
}

#[test]
fn test_collision_policies() {
    let temp = fixture();
    let dest = temp.path().join("b.tar.gz");
    let sources = [temp.path().join("test")];
    create_archive(&dest, &sources, &CreationConfig::default()).unwrap();

    let err = create_archive(&dest, &sources, &CreationConfig::default()).unwrap_err();
    assert!(matches!(err, ArchiveError::DestinationExists { .. }));

    let config = CreationConfig::default().with_collision(CollisionPolicy::AppendRandom {
        separator: "_".to_string(),
        max: 1,
    });
    let report = create_archive(&dest, &sources, &config).unwrap();
    assert_eq!(report.output_path, temp.path().join("b.tar_0.gz"));

    let config = CreationConfig::default().with_collision(CollisionPolicy::Overwrite);
    let report = create_archive(&dest, &sources, &config).unwrap();
    assert_eq!(report.output_path, dest);
}

#[test]
fn test_delete_sources_after_archiving() {
    let temp = fixture();
    let report = ArchiveCreator::new()
        .output(temp.path().join("moved.tar.gz"))
        .add_source(temp.path().join("test"))
        .delete_sources(true)
        .create()
        .unwrap();

    assert_eq!(report.sources_deleted, 4);
    for (name, _) in TEST_FILES {
        assert!(!temp.path().join(name).exists(), "{name}");
    }
    assert!(temp.path().join("test/dir").is_dir());
}

#[test]
fn test_missing_source_creates_nothing() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("a.tar.gz");
    let err = create_archive(&dest, &[temp.path().join("nope")], &CreationConfig::default()).unwrap_err();
    assert!(matches!(err, ArchiveError::SourceNotFound { .. }));
    assert!(!dest.exists());
}

#[test]
fn test_empty_zip_signature_message() {
    let err = detect_bytes(&[0x50, 0x4B, 0x05, 0x06], &[]).unwrap_err();
    assert_eq!(err.to_string(), "empty zip archive not supported");
}

#[test]
fn test_full_path_names() {
    let temp = fixture();
    let dest = temp.path().join("full.tar");
    let config = CreationConfig::default()
        .with_compression(Compression::None)
        .with_full_path(true);
    create_archive(&dest, &[temp.path().join("test")], &config).unwrap();

    let expected = std::path::absolute(temp.path().join("test/dir/test1.txt")).unwrap();
    let expected: PathBuf = expected
        .components()
        .filter(|c| matches!(c, std::path::Component::Normal(_)))
        .collect();

    let mut archive = tar::Archive::new(fs::File::open(&dest).unwrap());
    let names: Vec<PathBuf> = archive
        .entries()
        .unwrap()
        .map(|e| e.unwrap().path().unwrap().into_owned())
        .collect();
    assert!(names.contains(&expected), "{names:?}");
}
