//! Configuration structures for the sales-insight system.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Main configuration for the analysis engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial view state for record queries.
    pub query: QueryConfig,
    /// Aggregation configuration.
    pub analytics: AnalyticsConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse a JSON document and validate it. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        self.analytics.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Initial view state: search term, region filter and sort key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Free-text search term (empty matches everything).
    pub search: String,
    /// Region filter value; `"all"` disables the filter.
    pub region: String,
    /// Sort key as `field[:asc|:desc]`.
    pub sort: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            search: String::new(),
            region: "all".to_string(),
            sort: "date:desc".to_string(),
        }
    }
}

/// Aggregation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Target profit margin in percent, applied to the normalized price.
    pub profit_margin_pct: f64,
    /// Number of sellers kept in the leaderboard.
    pub top_sellers: usize,
    /// Number of regions kept in the average-price ranking.
    pub top_regions: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            profit_margin_pct: 30.0,
            top_sellers: 10,
            top_regions: 8,
        }
    }
}

impl AnalyticsConfig {
    fn validate(&self) -> Result<()> {
        if !self.profit_margin_pct.is_finite() || self.profit_margin_pct < 0.0 {
            return Err(Error::config(format!(
                "profit_margin_pct must be a non-negative number, got {}",
                self.profit_margin_pct
            )));
        }
        if self.top_sellers == 0 {
            return Err(Error::config("top_sellers cannot be 0"));
        }
        if self.top_regions == 0 {
            return Err(Error::config("top_regions cannot be 0"));
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace, off).
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    const LEVELS: [&'static str; 6] = ["error", "warn", "info", "debug", "trace", "off"];

    fn validate(&self) -> Result<()> {
        if !Self::LEVELS.contains(&self.level.as_str()) {
            return Err(Error::config(format!("Invalid log level: {}", self.level)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.analytics.profit_margin_pct, 30.0);
        assert_eq!(config.analytics.top_sellers, 10);
        assert_eq!(config.analytics.top_regions, 8);
        assert_eq!(config.query.region, "all");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = Config::from_json_str(r#"{"analytics": {"top_sellers": 5}}"#).unwrap();
        assert_eq!(config.analytics.top_sellers, 5);
        assert_eq!(config.analytics.top_regions, 8);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.analytics.profit_margin_pct = -1.0;
        assert!(config.validate().is_err());

        config.analytics.profit_margin_pct = f64::NAN;
        assert!(config.validate().is_err());

        config.analytics.profit_margin_pct = 25.0;
        config.analytics.top_regions = 0;
        assert!(config.validate().is_err());

        config.analytics.top_regions = 8;
        config.logging.level = "verbose".to_string();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(Config::from_json_str("{"), Err(Error::Json(_))));
    }
}
