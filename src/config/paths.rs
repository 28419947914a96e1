use std::fs;
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

const APP_DIR: &str = "webmail";

#[derive(Debug, Clone)]
pub struct AppPaths {
    profiles_dir: PathBuf,
}

impl AppPaths {
    pub fn discover() -> AppResult<Self> {
        let config_root = dirs::config_dir()
            .ok_or_else(|| AppError::Config("unable to resolve config directory".to_string()))?;

        let profiles_dir = config_root.join(APP_DIR).join("profiles");

        fs::create_dir_all(&profiles_dir)?;

        Ok(Self { profiles_dir })
    }

    pub fn settings_file(&self, profile: &str) -> PathBuf {
        self.profiles_dir.join(format!("{profile}.json"))
    }
}
