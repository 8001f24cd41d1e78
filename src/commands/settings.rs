//! Settings command - inspect and initialise the settings file

use crate::cli::SettingsCommands;
use crate::config::PickerSettings;
use crate::output::OutputWriter;
use crate::MediapickError;
use std::path::Path;

type Result<T> = std::result::Result<T, MediapickError>;

/// Execute the settings command against the default settings location
///
/// # Errors
/// Returns an error if the settings path cannot be determined, the settings
/// cannot be serialized, or the file cannot be written.
pub fn execute(
    command: &SettingsCommands,
    settings: &PickerSettings,
    output: &dyn OutputWriter,
    json: bool,
) -> Result<()> {
    let path = PickerSettings::config_path()?;
    execute_at(command, settings, &path, output, json)
}

/// Execute the settings command against an explicit settings file
///
/// # Errors
/// See [`execute`].
pub fn execute_at(
    command: &SettingsCommands,
    settings: &PickerSettings,
    path: &Path,
    output: &dyn OutputWriter,
    json: bool,
) -> Result<()> {
    match command {
        SettingsCommands::Show => show(settings, output, json),
        SettingsCommands::Path => {
            output.write(&path.display().to_string());
            Ok(())
        }
        SettingsCommands::Init { force } => init(path, *force, output),
    }
}

fn show(settings: &PickerSettings, output: &dyn OutputWriter, json: bool) -> Result<()> {
    let rendered = if json {
        serde_json::to_string_pretty(settings)?
    } else {
        toml::to_string_pretty(settings).map_err(|e| {
            ::config::ConfigError::Message(format!("Failed to serialize config: {e}"))
        })?
    };
    output.write(rendered.trim_end());
    Ok(())
}

fn init(path: &Path, force: bool, output: &dyn OutputWriter) -> Result<()> {
    if path.exists() && !force {
        output.warning(&format!(
            "Settings already exist at {} (use --force to overwrite)",
            path.display()
        ));
        return Ok(());
    }

    PickerSettings::default().save_to(path)?;
    output.success(&format!("Wrote default settings to {}", path.display()));
    Ok(())
}
