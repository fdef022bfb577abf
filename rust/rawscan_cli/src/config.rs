use rawscan::ImportConfig;
use tracing::info;

use crate::cli::ImportOptions;
use crate::error::CliError;

/// Loads the configuration file (if any) and applies the command line
/// overrides on top of it.
pub fn resolve_import_config(options: &ImportOptions) -> Result<ImportConfig, CliError> {
    let mut config = match &options.config {
        Some(path) => {
            info!("Loading import configuration from {}", path.display());
            ImportConfig::load(path)?
        }
        None => ImportConfig::default(),
    };

    if let Some(format) = options.format {
        config.format = format.into();
    }
    if options.skip_empty {
        config.skip_empty_spectra = true;
    }
    if let Some(threads) = options.threads {
        config.num_threads = Some(threads);
    }
    if options.no_progress {
        config.show_progress = false;
    }
    config.validate()?;
    Ok(config)
}
