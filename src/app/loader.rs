//! Configuration loading
//!
//! Handles loading configuration from embedded defaults, files, and environment.

use super::config::AppConfig;
use anyhow::{Context, Result};
use config::{Config, ConfigBuilder, Environment, File, FileFormat};

/// Embedded default configuration (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

type Builder = ConfigBuilder<config::builder::DefaultState>;

fn defaults() -> Builder {
    Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
}

fn finish(builder: Builder) -> Result<AppConfig> {
    let config: AppConfig = builder
        .build()
        .context("Failed to build configuration")?
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    config.validate()?;
    Ok(config)
}

/// Load configuration from files and environment
pub fn load_config() -> Result<AppConfig> {
    let builder = defaults()
        // External overrides (optional)
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            File::with_name(&format!(
                "config/{}",
                std::env::var("TOKENMETER_ENV").unwrap_or_else(|_| "development".to_string())
            ))
            .required(false),
        )
        .add_source(File::with_name("config/local").required(false))
        // Environment variables (highest priority)
        // prefix_separator("_") lets TOKENMETER_DEMO__PAUSE_SECS map to demo.pause_secs
        .add_source(
            Environment::with_prefix("TOKENMETER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    finish(builder)
}

/// Load the embedded defaults with a TOML override layered on top
#[cfg(test)]
fn load_with_override(toml: &str) -> Result<AppConfig> {
    finish(defaults().add_source(File::from_str(toml, FileFormat::Toml)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokenmeter_llm::Encoding;

    #[test]
    fn test_embedded_defaults_parse() {
        let config = finish(defaults()).unwrap();

        assert!(config.pricing.include_defaults);
        assert!(config.pricing.models.is_empty());
        assert!(config.cache.max_entries_per_model.is_none());
        assert_eq!(config.demo.pause_secs, 0);
    }

    #[test]
    fn test_override_adds_model() {
        let config = load_with_override(
            r#"
            [cache]
            max_entries_per_model = 50

            [[pricing.models]]
            model = "Local Llama"
            query_cost_per_million = 0.1
            response_cost_per_million = 0.2
            retrieval_cost_per_million = 0.01
            encoding = "cl100k_base"
            "#,
        )
        .unwrap();

        assert_eq!(config.cache.max_entries_per_model.map(|n| n.get()), Some(50));
        assert_eq!(config.pricing.models.len(), 1);

        let entry = &config.pricing.models[0];
        assert_eq!(entry.provider, "custom");
        assert_eq!(entry.encoding, Encoding::Cl100kBase);
        assert!(config.pricing_table().unwrap().contains("localllama"));
    }

    #[test]
    fn test_bad_encoding_is_rejected() {
        let result = load_with_override(
            r#"
            [[pricing.models]]
            model = "x"
            query_cost_per_million = 1.0
            response_cost_per_million = 1.0
            retrieval_cost_per_million = 1.0
            encoding = "p50k_base"
            "#,
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_negative_rate_is_rejected() {
        let result = load_with_override(
            r#"
            [[pricing.models]]
            model = "neg"
            query_cost_per_million = 1.0
            response_cost_per_million = 1.0
            retrieval_cost_per_million = -1000000.0
            encoding = "cl100k_base"
            "#,
        );

        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("retrieval_cost_per_million"));
    }

    #[test]
    fn test_zero_cache_limit_is_rejected() {
        let result = load_with_override(
            r#"
            [cache]
            max_entries_per_model = 0
            "#,
        );

        assert!(result.is_err());
    }
}
