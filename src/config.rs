use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::constants::constants;

#[derive(Serialize, Deserialize, Default, Debug, PartialEq)]
pub struct Config {
  /// Backend root, e.g. `http://localhost:8000`.
  pub base_url: Option<String>,
  pub page_size: Option<u32>,
  pub theme_name: Option<String>,
  pub display_mode: Option<String>,
  pub request_timeout_secs: Option<u64>,
}

impl Config {
  pub fn load() -> Self {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "kfs") {
      let config_file = proj_dirs.config_dir().join("prefs.toml");
      if let Ok(content) = std::fs::read_to_string(config_file)
        && let Ok(config) = toml::from_str(&content)
      {
        return config;
      }
    }
    Self::default()
  }

  pub fn save(&self) {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "kfs") {
      let config_dir = proj_dirs.config_dir();
      if std::fs::create_dir_all(config_dir).is_ok() {
        let config_file = config_dir.join("prefs.toml");
        if let Ok(content) = toml::to_string(self) {
          let _ = std::fs::write(config_file, content);
        }
      }
    }
  }

  pub fn base_url(&self) -> String {
    self.base_url.clone().unwrap_or_else(|| constants().default_base_url.clone())
  }

  pub fn request_timeout(&self) -> std::time::Duration {
    std::time::Duration::from_secs(self.request_timeout_secs.unwrap_or(constants().request_timeout_secs))
  }
}
