//! Detect command implementation.

use crate::cli::DetectArgs;
use crate::output::OutputFormatter;
use anyhow::Result;
use anyhow::bail;
use carch_core::formats::detect_path;

pub fn execute(args: &DetectArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let detections: Vec<_> = args
        .files
        .iter()
        .map(|path| (path.clone(), detect_path(path)))
        .collect();

    formatter.format_detections(&detections)?;

    let failed = detections.iter().filter(|(_, r)| r.is_err()).count();
    if failed > 0 {
        bail!("{failed} file(s) could not be identified");
    }
    Ok(())
}
