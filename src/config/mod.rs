pub mod error;
pub mod load;
pub mod paths;
pub mod save;
pub mod settings;

pub use error::ConfigError;
pub use load::load_settings;
pub use paths::{
    default_state_root_path, StatePaths, SETTINGS_FILE_NAME, STATE_ROOT_DIR, TRANSCRIPT_FILE_NAME,
};
pub use save::save_settings;
pub use settings::{
    InferenceSettings, Settings, DEFAULT_API_KEY_ENV, DEFAULT_MODEL_ID, DEFAULT_REGION,
};
