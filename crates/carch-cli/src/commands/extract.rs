//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use crate::progress::CliSpinner;
use anyhow::Context;
use anyhow::Result;
use carch_core::ExtractionConfig;
use carch_core::Format;
use carch_core::extract_archive;
use std::env;

pub fn execute(args: &ExtractArgs, formatter: &dyn OutputFormatter, quiet: bool, json: bool) -> Result<()> {
    let output_dir = match &args.output_dir {
        Some(dir) => dir.clone(),
        None => env::current_dir().context("failed to get current directory")?,
    };

    let mut config = ExtractionConfig::new().with_create_dir(args.create_dir);
    if let Some(name) = &args.format {
        let format: Format = add_archive_context(name.parse(), &args.archive)?;
        config = config.with_format(format);
    }

    tracing::debug!(archive = %args.archive.display(), output = %output_dir.display(), ?config, "extracting archive");
    let spinner = CliSpinner::maybe("Extracting", quiet, json);
    let report = add_archive_context(extract_archive(&args.archive, &output_dir, &config), &args.archive)?;
    drop(spinner);

    formatter.format_extraction_result(&report)?;

    Ok(())
}
