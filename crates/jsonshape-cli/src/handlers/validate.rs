//! Validation command handler

use super::utils::{load_document, load_schema, save_document};
use crate::cli::ValidateArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use jsonshape_core::{validate, ValidateOptions};
use tracing::{info, instrument, warn};

/// Handle the validate command
#[instrument(skip(config, output), fields(schema = %args.schema.display(), document = %args.document.display()))]
pub fn handle_validate(args: ValidateArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("validate_command", &format!("file: {}", args.document.display()));

    let options = ValidateOptions::new()
        .with_partial(args.partial || config.validation.partial)
        .with_fallback(args.fallback || config.validation.fallback);
    if args.write.is_some() && !options.fallback {
        return Err(Error::invalid_args("--write requires --fallback"));
    }

    output.info(&format!("Validating {} against {}", args.document.display(), args.schema.display()))?;
    let schema = load_schema(&args.schema, config)?;
    let mut document = load_document(&args.document)?;

    let issues = validate(&mut document, &schema, &options);
    info!(issues = issues.len(), "Validation finished");
    output.issues(&issues)?;

    if let Some(path) = &args.write {
        save_document(path, document.as_ref())?;
        output.info(&format!("Wrote {}", path.display()))?;
    }

    if issues.is_empty() {
        Ok(())
    } else {
        warn!(count = issues.len(), "Document does not satisfy its schema");
        Err(Error::ValidationFailed { count: issues.len() })
    }
}
