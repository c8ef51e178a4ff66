//! Storecast configuration.
//!
//! Loaded from `~/.storecast/config.toml`, with environment variables taking
//! precedence over the file. Each setting resolves through a chain:
//!
//! 1. Environment variable (a `.env` file in the working directory is loaded
//!    into the environment at startup)
//! 2. `~/.storecast/config.toml`
//! 3. Built-in default, for the settings that have one
//!
//! The Staffbase connection settings have no default and must come from one
//! of the first two sources.

use std::{env, fs, io, path::PathBuf};

use serde::{Deserialize, Serialize};

/// Storecast configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// API root, e.g. `https://app.staffbase.com/api`.
    pub base_url: String,

    /// Sent verbatim as the `Authorization` header.
    pub token: String,

    /// Space that holds the news channels and store projects.
    pub space_id: String,

    /// Profile attribute that carries the ids used in uploads.
    pub hidden_attribute_key: String,

    pub page_size: usize,

    /// Plugin tag of news channel installations.
    pub news_plugin: String,

    /// Store projects are titled `{store-title-prefix}{storeId}`.
    pub store_title_prefix: String,

    pub task_list_color: String,

    /// Installation holding task lists referenced by legacy labels.
    pub legacy_tasks_installation: Option<String>,

    /// Departments a post may be filed under.
    pub departments: Vec<String>,

    /// How many recent requests `storecast debug` can show.
    pub request_log_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token: String::new(),
            space_id: String::new(),
            hidden_attribute_key: String::new(),
            page_size: 100,
            news_plugin: "news".into(),
            store_title_prefix: "Store ".into(),
            task_list_color: "#007bff".into(),
            legacy_tasks_installation: None,
            departments: ["Operations", "Marketing", "Sales", "HR", "IT", "Logistics"]
                .map(String::from)
                .to_vec(),
            request_log_capacity: 32,
        }
    }
}

impl Config {
    /// Load config from the environment and `~/.storecast/config.toml`.
    ///
    /// A missing file is fine as long as the environment supplies the
    /// required settings.
    pub fn load() -> Result<Self, String> {
        let contents = match Self::path() {
            Some(path) => match fs::read_to_string(&path) {
                Ok(contents) => Some(contents),
                Err(e) if e.kind() == io::ErrorKind::NotFound => None,
                Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
            },
            None => None,
        };

        Self::resolve(contents.as_deref(), |key| {
            env::var(key).ok().filter(|v| !v.is_empty())
        })
    }

    /// Resolve config from file contents and an environment lookup.
    pub fn resolve(
        file: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, String> {
        let mut config: Self = match file {
            Some(contents) => {
                toml::from_str(contents).map_err(|e| format!("invalid config: {e}"))?
            }
            None => Self::default(),
        };

        let overrides: [(&str, &mut String); 4] = [
            ("STAFFBASE_BASE_URL", &mut config.base_url),
            ("STAFFBASE_TOKEN", &mut config.token),
            ("STAFFBASE_SPACE_ID", &mut config.space_id),
            ("HIDDEN_ATTRIBUTE_KEY", &mut config.hidden_attribute_key),
        ];
        for (key, field) in overrides {
            if let Some(value) = env(key) {
                *field = value;
            }
        }
        if let Some(value) = env("STAFFBASE_TASKS_INSTALLATION") {
            config.legacy_tasks_installation = Some(value);
        }

        config.validate()?;
        Ok(config)
    }

    /// Whether `department` is one of the configured departments.
    pub fn is_department(&self, department: &str) -> bool {
        self.departments.iter().any(|d| d == department)
    }

    /// The config file path: `~/.storecast/config.toml`.
    pub fn path() -> Option<PathBuf> {
        Self::home().map(|h| h.join("config.toml"))
    }

    /// The storecast home directory: `~/.storecast/`.
    pub fn home() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".storecast"))
    }

    fn validate(&self) -> Result<(), String> {
        let required = [
            ("base-url", "STAFFBASE_BASE_URL", &self.base_url),
            ("token", "STAFFBASE_TOKEN", &self.token),
            ("space-id", "STAFFBASE_SPACE_ID", &self.space_id),
            (
                "hidden-attribute-key",
                "HIDDEN_ATTRIBUTE_KEY",
                &self.hidden_attribute_key,
            ),
        ];
        let missing: Vec<String> = required
            .iter()
            .filter(|(_, _, value)| value.is_empty())
            .map(|(key, var, _)| format!("{key} (or {var})"))
            .collect();
        if !missing.is_empty() {
            return Err(format!(
                "missing required settings: {}\n\
                 Set them in the environment or in ~/.storecast/config.toml.",
                missing.join(", ")
            ));
        }

        if self.page_size == 0 {
            return Err("page-size must be at least 1".to_string());
        }

        if let Some(bad) = self
            .departments
            .iter()
            .find(|d| d.is_empty() || d.contains(|c: char| c == ':' || c == '-' || c.is_whitespace()))
        {
            return Err(format!(
                "department {bad:?} cannot be written into a channel label: \
                 use a single word without ':' or '-'"
            ));
        }

        Ok(())
    }
}
