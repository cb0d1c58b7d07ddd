use crate::backend::BackendClient;
use crate::config::Settings;
use anyhow::Result;

/// Application context shared by every command: validated settings plus the
/// backend client built from them.
pub struct AppContext {
    settings: Settings,
}

impl AppContext {
    pub fn initialize() -> Result<Self> {
        let settings = Settings::from_env()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn backend(&self) -> Result<BackendClient> {
        BackendClient::new(&self.settings.backend_url, self.settings.api_timeout)
    }
}
