use crate::app::command_support::state_paths;
use crate::config::{save_settings, Settings};

pub fn cmd_setup() -> Result<String, String> {
    let paths = state_paths()?;
    let path = paths.settings_file();
    if path.exists() {
        return Ok(format!("config={}\ncreated=false", path.display()));
    }

    let written = save_settings(&paths, &Settings::default()).map_err(|e| e.to_string())?;
    Ok(format!("config={}\ncreated=true", written.display()))
}
