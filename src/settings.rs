use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment override for the collaborator base URL.
pub const API_URL_ENV: &str = "VECINAL_API_URL";

const DEFAULT_API_URL: &str = "http://localhost:8000";

/// The community a workflow call operates on. Passed explicitly into the
/// generation and chatbot entry points; there is no ambient "active
/// community" global.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommunityContext {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the generation/chatbot backend.
    pub api_base_url: String,
    /// Name stamped into `createdBy`/`signedBy`.
    pub user_name: String,
    pub community_id: String,
    pub community_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            user_name: String::new(),
            community_id: String::new(),
            community_name: String::new(),
        }
    }
}

impl Settings {
    /// Location of the settings file, if a config directory exists.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("vecinal").join("settings.json"))
    }

    /// Load settings: file values first, then the env override for the base
    /// URL. Missing or unreadable files fall back to defaults.
    pub fn load() -> Self {
        let settings = Self::config_path()
            .and_then(|path| std::fs::read_to_string(path).ok())
            .and_then(|raw| match serde_json::from_str::<Settings>(&raw) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    log::warn!("Ignoring malformed settings file: {}", e);
                    None
                }
            })
            .unwrap_or_default();
        settings.apply_env_override()
    }

    fn apply_env_override(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_base_url = url.trim().trim_end_matches('/').to_string();
            }
        }
        self
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    pub fn community(&self) -> CommunityContext {
        CommunityContext {
            id: self.community_id.clone(),
            name: self.community_name.clone(),
        }
    }
}
