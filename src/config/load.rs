use super::{ConfigError, Settings, StatePaths};

/// Loads `config.yaml` under the state root. A missing file yields defaults.
pub fn load_settings(paths: &StatePaths) -> Result<Settings, ConfigError> {
    let path = paths.settings_file();
    let settings = if path.exists() {
        Settings::from_path(&path)?
    } else {
        Settings::default()
    };
    settings.validate()?;
    Ok(settings)
}
