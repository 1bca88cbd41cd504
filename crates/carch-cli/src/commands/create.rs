//! Create command implementation.

use crate::cli::CreateArgs;
use crate::cli::OnCollision;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use crate::progress::CliSpinner;
use anyhow::Context;
use anyhow::Result;
use carch_core::create_archive;
use carch_core::creation::CollisionPolicy;
use carch_core::creation::CreationConfig;
use carch_core::creation::FilterRules;

pub fn execute(args: &CreateArgs, formatter: &dyn OutputFormatter, quiet: bool, json: bool) -> Result<()> {
    let config = build_config(args)?;
    tracing::debug!(output = %args.output.display(), sources = args.sources.len(), ?config, "creating archive");

    let spinner = CliSpinner::maybe("Creating", quiet, json);
    let report = add_archive_context(create_archive(&args.output, &args.sources, &config), &args.output)?;
    drop(spinner);

    formatter.format_creation_result(&report)?;
    Ok(())
}

/// Maps the command-line flags onto a [`CreationConfig`].
fn build_config(args: &CreateArgs) -> Result<CreationConfig> {
    let mut config = add_archive_context(
        CreationConfig::default().with_target(&args.archive_type),
        &args.output,
    )?;

    let mut include = FilterRules::default()
        .with_extensions(args.include_ext.iter())
        .with_names(args.include_name.iter());
    include.glob.clone_from(&args.include_glob);
    include.anchored.clone_from(&args.include_anchored);

    let mut exclude = FilterRules::default()
        .with_extensions(args.exclude_ext.iter())
        .with_names(args.exclude_name.iter());
    exclude.glob.clone_from(&args.exclude_glob);
    exclude.anchored.clone_from(&args.exclude_anchored);

    config = config
        .with_include(include)
        .with_exclude(exclude)
        .with_full_path(args.full_path)
        .with_delete_sources(args.delete_sources)
        .with_queue_capacity(args.queue_capacity)
        .with_collision(collision_policy(args));

    if let Some(level) = args.compression_level {
        config = config.with_compression_level(level);
    }
    if let Some(owner) = args.owner {
        config = config.with_owner(owner);
    }
    if let Some(group) = args.group {
        config = config.with_group(group);
    }
    if let Some(mode) = args.mode {
        config = config.with_mode(mode);
    }
    if let Some(reference) = &args.newer_than {
        let cutoff = std::fs::metadata(reference)
            .and_then(|m| m.modified())
            .with_context(|| format!("failed to read modification time of '{}'", reference.display()))?;
        config = config.with_newer_than(Some(cutoff));
    }

    Ok(config)
}

fn collision_policy(args: &CreateArgs) -> CollisionPolicy {
    if args.force {
        return CollisionPolicy::Overwrite;
    }
    match args.on_collision {
        OnCollision::Fail => CollisionPolicy::Fail,
        OnCollision::Overwrite => CollisionPolicy::Overwrite,
        OnCollision::Date => CollisionPolicy::append_date(),
        OnCollision::Random => CollisionPolicy::append_random(),
    }
}
