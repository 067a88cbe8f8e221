//! Assert command handler

use super::utils::{load_document, load_schema};
use crate::cli::AssertArgs;
use crate::config::Config;
use crate::error::Result;
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use jsonshape_core::{assert, AssertOptions};
use tracing::instrument;

/// Handle the assert command
///
/// Prints the checked value (with fallbacks applied) or fails with the
/// aggregated assertion message.
#[instrument(skip(config, output), fields(schema = %args.schema.display(), document = %args.document.display()))]
pub fn handle_assert(args: AssertArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::new("assert_command");

    let mut options = AssertOptions::new()
        .with_partial(args.partial || config.validation.partial)
        .with_fallback(args.fallback || config.validation.fallback);
    if let Some(description) = args.description {
        options = options.with_description(description);
    }

    let schema = load_schema(&args.schema, config)?;
    let document = load_document(&args.document)?;

    let value = assert(document, &schema, &options).map_err(jsonshape_core::Error::from)?;
    output.data(&value)
}
