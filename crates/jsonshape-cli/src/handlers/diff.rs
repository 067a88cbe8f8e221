//! Diff command handler

use super::utils::{load_document, load_schema};
use crate::cli::DiffArgs;
use crate::config::Config;
use crate::error::Result;
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use jsonshape_core::{compare, CompareOptions};
use tracing::{info, instrument};

/// Handle the diff command
#[instrument(skip(config, output), fields(schema = %args.schema.display()))]
pub fn handle_diff(args: DiffArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details(
        "diff_command",
        &format!("{} -> {}", args.src.display(), args.dst.display()),
    );

    let options = CompareOptions::new()
        .with_src_partial(args.src_partial || config.diff.src_partial)
        .with_dst_partial(args.dst_partial || config.diff.dst_partial);

    let schema = load_schema(&args.schema, config)?;
    let src = load_document(&args.src)?;
    let dst = load_document(&args.dst)?;

    let diff = compare(src.as_ref(), dst.as_ref(), &schema, &options);
    info!(
        changes = diff.as_ref().map(|diff| diff.paths().len()).unwrap_or(0),
        "Comparison finished"
    );

    output.diff(diff.as_ref(), args.flat)
}
