use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Notetaker scheduling settings
    #[serde(default)]
    pub notetaker: NotetakerConfig,

    /// Calendar lookup settings
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Recall.ai API settings
    #[serde(default)]
    pub recall: RecallConfig,
}

/// Notetaker scheduling settings.
///
/// The lead time is the interval before a meeting's start at which the bot
/// should ideally join. It feeds the join planner; validation of the value
/// happens here, at the configuration boundary, so the planner itself stays
/// unconditional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotetakerConfig {
    /// Desired lead time before meeting start, in minutes (fractional allowed)
    #[serde(default = "default_lead_minutes")]
    pub lead_minutes: f64,

    /// Display name the bot joins meetings with
    #[serde(default = "default_bot_name")]
    pub bot_name: String,
}

fn default_lead_minutes() -> f64 {
    5.0
}

fn default_bot_name() -> String {
    "MeetingPost Notetaker".to_string()
}

impl Default for NotetakerConfig {
    fn default() -> Self {
        Self {
            lead_minutes: default_lead_minutes(),
            bot_name: default_bot_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// How many days ahead to fetch events (default: 14)
    #[serde(default = "default_lookahead_days")]
    pub lookahead_days: u32,

    /// Whether to include all-day events (they carry no join link)
    #[serde(default)]
    pub include_all_day: bool,
}

fn default_lookahead_days() -> u32 {
    14
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            lookahead_days: default_lookahead_days(),
            include_all_day: false,
        }
    }
}

/// Recall.ai API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecallConfig {
    /// Recall.ai region the account lives in (e.g. us-west-2)
    #[serde(default = "default_recall_region")]
    pub region: String,

    /// API key (optional in the file, can be set via RECALL_API_KEY)
    pub api_key: Option<String>,
}

fn default_recall_region() -> String {
    "us-west-2".to_string()
}

impl Default for RecallConfig {
    fn default() -> Self {
        Self {
            region: default_recall_region(),
            api_key: std::env::var("RECALL_API_KEY").ok(),
        }
    }
}

impl RecallConfig {
    /// Check if the API key is configured (file or environment)
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Base URL of the regional Recall API
    pub fn api_base(&self) -> String {
        format!("https://{}.recall.ai/api/v1", self.region)
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("meetingpost");

        Self {
            config_dir,
            notetaker: NotetakerConfig::default(),
            calendar: CalendarConfig::default(),
            recall: RecallConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        if !validation.warnings.is_empty() {
            for warning in &validation.warnings {
                tracing::warn!("Config warning: {}", warning);
            }
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        // Lead minutes must be a finite, non-negative number
        if !self.notetaker.lead_minutes.is_finite() {
            result.add_error("notetaker.lead_minutes", "Lead minutes must be a finite number");
        } else if self.notetaker.lead_minutes < 0.0 {
            result.add_error("notetaker.lead_minutes", "Lead minutes cannot be negative");
        } else if self.notetaker.lead_minutes > 120.0 {
            result.add_warning(
                "notetaker.lead_minutes",
                "Lead time is more than 2 hours before the meeting",
            );
        }

        if self.notetaker.bot_name.trim().is_empty() {
            result.add_error("notetaker.bot_name", "Bot name cannot be empty");
        }

        if self.calendar.lookahead_days == 0 {
            result.add_warning(
                "calendar.lookahead_days",
                "Event lookup disabled (0 days ahead)",
            );
        } else if self.calendar.lookahead_days > 90 {
            result.add_warning(
                "calendar.lookahead_days",
                "Lookahead window is unusually large (>90 days)",
            );
        }

        if self.recall.region.trim().is_empty() {
            result.add_error("recall.region", "Recall region cannot be empty");
        } else if self.recall.region.contains('/') || self.recall.region.contains('.') {
            result.add_error(
                "recall.region",
                "Recall region must be a bare region name (e.g. us-west-2)",
            );
        }

        // Missing key is a warning: scheduling can still be planned offline
        if !self.recall.is_configured() {
            result.add_warning(
                "recall.api_key",
                "Recall API key not configured - bots cannot be created",
            );
        }

        result
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        // Ensure config directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("meetingpost");

        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        assert!(
            result.is_valid(),
            "Default config should be valid: {:?}",
            result.errors
        );
    }

    #[test]
    fn test_negative_lead_minutes_is_error() {
        let mut config = Config::default();
        config.notetaker.lead_minutes = -1.0;
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result
            .errors
            .iter()
            .any(|e| e.field == "notetaker.lead_minutes"));
    }

    #[test]
    fn test_non_finite_lead_minutes_is_error() {
        let mut config = Config::default();
        config.notetaker.lead_minutes = f64::NAN;
        let result = config.validate();
        assert!(!result.is_valid());

        config.notetaker.lead_minutes = f64::INFINITY;
        assert!(!config.validate().is_valid());
    }

    #[test]
    fn test_fractional_lead_minutes_is_valid() {
        let mut config = Config::default();
        config.notetaker.lead_minutes = 2.5;
        assert!(config.validate().is_valid());
    }

    #[test]
    fn test_zero_lead_minutes_is_valid() {
        let mut config = Config::default();
        config.notetaker.lead_minutes = 0.0;
        assert!(config.validate().is_valid());
    }

    #[test]
    fn test_empty_bot_name_is_error() {
        let mut config = Config::default();
        config.notetaker.bot_name = "  ".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "notetaker.bot_name"));
    }

    #[test]
    fn test_bad_region_is_error() {
        let mut config = Config::default();
        config.recall.region = "us-west-2.recall.ai/api".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "recall.region"));
    }

    #[test]
    fn test_missing_api_key_is_warning() {
        let mut config = Config::default();
        config.recall.api_key = None;
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "recall.api_key"));
    }

    #[test]
    fn test_api_base_uses_region() {
        let mut config = Config::default();
        config.recall.region = "eu-central-1".to_string();
        assert_eq!(
            config.recall.api_base(),
            "https://eu-central-1.recall.ai/api/v1"
        );
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }

    #[test]
    fn test_config_roundtrip_through_toml() {
        let mut config = Config::default();
        config.notetaker.lead_minutes = 7.5;
        config.calendar.lookahead_days = 30;

        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();

        assert_eq!(parsed.notetaker.lead_minutes, 7.5);
        assert_eq!(parsed.calendar.lookahead_days, 30);
    }
}
