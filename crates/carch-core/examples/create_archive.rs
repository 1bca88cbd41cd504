//! Example: archive a small tree, then restore it by sniffing the format.
//!
//! Run with: `cargo run --example create_archive`

use carch_core::ExtractionConfig;
use carch_core::create_archive;
use carch_core::creation::ArchiveCreator;
use carch_core::creation::CreationConfig;
use carch_core::creation::FilterRules;
use carch_core::extract_archive;
use carch_core::formats::Compression;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let workdir = tempfile::tempdir()?;
    let source = workdir.path().join("notes");
    std::fs::create_dir_all(source.join("drafts"))?;
    std::fs::write(source.join("todo.txt"), "buy milk\n")?;
    std::fs::write(source.join("drafts/idea.txt"), "carch all the things\n")?;
    std::fs::write(source.join("debug.log"), "noise\n")?;

    println!("Example 1: gzip tar, logs excluded");
    let config = CreationConfig::default()
        .with_exclude(FilterRules::default().with_extensions(["log"]));
    let archive = workdir.path().join("notes.tar.gz");
    let report = create_archive(&archive, &[&source], &config)?;
    println!("  {}", report.summary());

    println!("\nExample 2: lz4 tar through the builder");
    let lz4 = workdir.path().join("notes.tar.lz4");
    let report = ArchiveCreator::new()
        .output(&lz4)
        .add_source(&source)
        .compression(Compression::Lz4)
        .create()?;
    println!("  Created {} with {} files", report.output_path.display(), report.files_added);

    println!("\nExample 3: extract by content");
    let restored = workdir.path().join("restored");
    let extracted = extract_archive(&lz4, &restored, &ExtractionConfig::default())?;
    println!(
        "  {:?} archive, {} files, {} bytes",
        extracted.format, extracted.files_extracted, extracted.bytes_written
    );

    Ok(())
}
