//! Configuration
//!
//! Loaded from TOML. Every section is optional; missing values fall back to
//! the defaults below.
//!
//! ```toml
//! output_dir = "site/data/daily_events"
//! log_level = "info"
//!
//! [events]
//! report = ["Birth", "Death", "Marriage"]
//!
//! [labels]
//! unknown_location = "an unknown place"
//!
//! [templates.birth]
//! male = "{name} kom till världen {year} i {place}."
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HistoryError, Result};

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "onthisday.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output_dir: PathBuf,
    /// tracing level name; the CLI `-v` flags take precedence
    pub log_level: Option<String>,
    pub events: EventsConfig,
    pub labels: Labels,
    /// Template overrides keyed like the built-in table (`birth`, `marriage0`, ...)
    pub templates: BTreeMap<String, TemplateOverride>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("daily_events"),
            log_level: None,
            events: EventsConfig::default(),
            labels: Labels::default(),
            templates: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Event types exported
    pub report: Vec<String>,
    /// Event types never exported, even when listed in `report`
    pub unsupported: Vec<String>,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            report: to_strings(&[
                "Adopted",
                "Adult Christening",
                "Birth",
                "Death",
                "Elected",
                "Emigration",
                "Graduation",
                "Immigration",
                "Marriage",
                "Military Service",
                "Naturalization",
                "Nobility Title",
                "Ordination",
                "Retirement",
                "Burial",
                "Cremation",
            ]),
            unsupported: to_strings(&[
                "Alternate Parentage",
                "Cause Of Death",
                "Education",
                "Medical Information",
                "Number of Marriages",
                "Occupation",
                "Property",
                "Religion",
                "Residence",
                "Will",
                "Year",
            ]),
        }
    }
}

/// Words inserted into records and messages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub unknown_location: String,
    pub unknown_year: String,
    pub person: String,
    pub family: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            unknown_location: "unknown location".into(),
            unknown_year: "unknown".into(),
            person: "Person".into(),
            family: "Family".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateOverride {
    pub male: Option<String>,
    pub female: Option<String>,
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl Config {
    /// Explicit path (must exist), else `./onthisday.toml` when present, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let local = Path::new(DEFAULT_CONFIG_FILE);
                if local.is_file() {
                    Self::from_file(local)
                } else {
                    debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| HistoryError::io(path, e))?;
        let config = Self::from_toml(&content)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(HistoryError::Config("output_dir must not be empty".into()));
        }
        for (key, template) in &self.templates {
            if template.male.is_none() && template.female.is_none() {
                return Err(HistoryError::Config(format!(
                    "template '{}' sets neither male nor female text",
                    key
                )));
            }
        }
        Ok(())
    }
}
