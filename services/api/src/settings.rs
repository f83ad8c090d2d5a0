//! Service settings
//!
//! Defaults, overridden by an optional `yatube.toml` next to the binary and
//! then by `YATUBE__SECTION__KEY` environment variables
//! (e.g. `YATUBE__SERVER__PORT=9000`).

use std::path::Path;

use config::ConfigError;
use serde::Deserialize;

use crate::pagination::Pagination;

pub const DEFAULT_CONFIG_FILE: &str = "yatube.toml";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Settings {
    pub server: ServerSettings,
    pub pagination: PaginationSettings,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PaginationSettings {
    /// Page size when `limit` is absent or invalid
    pub page_size: u32,
    /// Upper bound for a client-supplied `limit`
    pub max_page_size: u32,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("pagination.page_size", 10)?
            .set_default("pagination.max_page_size", 100)?;

        if Path::new(path).exists() {
            builder = builder.add_source(config::File::with_name(path));
        }

        let settings: Settings = builder
            .add_source(
                config::Environment::with_prefix("YATUBE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let PaginationSettings {
            page_size,
            max_page_size,
        } = self.pagination;

        if page_size == 0 {
            return Err(ConfigError::Message(
                "pagination.page_size must be positive".to_string(),
            ));
        }
        if page_size > max_page_size {
            return Err(ConfigError::Message(format!(
                "pagination.page_size ({}) cannot exceed pagination.max_page_size ({})",
                page_size, max_page_size
            )));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl PaginationSettings {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page_size, self.max_page_size)
    }
}
