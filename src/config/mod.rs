pub mod toml_config;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Default)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub pipeline: PipelineSettings,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Report MUSHBOOH ingredients as NOT_HALAL_UNVERIFIED when evaluating
    /// single ingredients. Scans are always strict.
    #[serde(default = "default_strict_mode")]
    pub strict_mode: bool,
    /// Directory of lexicon YAML files overriding the embedded copies.
    pub lexicon_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    #[serde(default = "default_min_ocr_tokens")]
    pub min_ocr_tokens: usize,
    #[serde(default = "default_min_ingredients")]
    pub min_ingredients: usize,
    #[serde(default = "default_min_unverified_zone_chars")]
    pub min_unverified_zone_chars: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
}

fn default_strict_mode() -> bool {
    true
}

fn default_min_ocr_tokens() -> usize {
    3
}

fn default_min_ingredients() -> usize {
    2
}

fn default_min_unverified_zone_chars() -> usize {
    10
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            strict_mode: default_strict_mode(),
            lexicon_dir: None,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            min_ocr_tokens: default_min_ocr_tokens(),
            min_ingredients: default_min_ingredients(),
            min_unverified_zone_chars: default_min_unverified_zone_chars(),
        }
    }
}

impl Config {
    /// Default configuration written by `--generate-config`.
    pub fn sample() -> Self {
        Self {
            logging: Some(LoggingConfig {
                level: "info".to_string(),
            }),
            ..Self::default()
        }
    }

    pub fn log_level(&self) -> log::LevelFilter {
        let level = self
            .logging
            .as_ref()
            .map(|l| l.level.as_str())
            .unwrap_or("info");

        match level.to_lowercase().as_str() {
            "error" => log::LevelFilter::Error,
            "warn" | "warning" => log::LevelFilter::Warn,
            "debug" => log::LevelFilter::Debug,
            "trace" => log::LevelFilter::Trace,
            "off" => log::LevelFilter::Off,
            _ => log::LevelFilter::Info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.engine.strict_mode);
        assert_eq!(config.engine.lexicon_dir, None);
        assert_eq!(config.pipeline.min_ocr_tokens, 3);
        assert_eq!(config.pipeline.min_ingredients, 2);
        assert_eq!(config.pipeline.min_unverified_zone_chars, 10);
        assert_eq!(config.log_level(), log::LevelFilter::Info);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
[engine]
strict_mode = false

[logging]
level = "debug"
"#,
        )
        .unwrap();

        assert!(!config.engine.strict_mode);
        assert_eq!(config.pipeline, PipelineSettings::default());
        assert_eq!(config.log_level(), log::LevelFilter::Debug);
    }
}
