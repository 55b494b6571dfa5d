//! Configuration loading and parsing

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use speed_advisor::AdvisorConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub advisor: AdvisorConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InputConfig {
    /// Recorded position/velocity sentences (stdin when absent)
    pub gps: Option<PathBuf>,
    /// Recorded signal broadcasts (no signals known when absent)
    pub broadcast: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Advisory output file (stdout when absent)
    pub file: Option<PathBuf>,
    pub max_iterations: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Txt,
    Json,
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate(&config).with_context(|| format!("Invalid config file: {:?}", path))?;

    Ok(config)
}

fn validate(config: &AppConfig) -> Result<()> {
    let advisor = &config.advisor;
    anyhow::ensure!(advisor.catalog_capacity > 0, "advisor.catalog_capacity must be at least 1");
    anyhow::ensure!(
        advisor.position_tolerance_deg.is_finite() && advisor.position_tolerance_deg >= 0.0,
        "advisor.position_tolerance_deg must be a non-negative number"
    );
    anyhow::ensure!(
        advisor.maintain_tolerance.is_finite() && advisor.maintain_tolerance >= 0.0,
        "advisor.maintain_tolerance must be a non-negative number"
    );
    anyhow::ensure!(advisor.read_max_bytes > 0, "advisor.read_max_bytes must be at least 1");
    for (name, tag) in [
        ("position_tag", &advisor.position_tag),
        ("velocity_tag", &advisor.velocity_tag),
        ("broadcast_tag", &advisor.broadcast_tag),
    ] {
        anyhow::ensure!(!tag.is_empty(), "advisor.{} must not be empty", name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use speed_advisor::{Comparison, NoSignalPolicy};
    use std::io::Write;

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            [input]
            gps = "drive.nmea"
            broadcast = "signals.txt"

            [advisor]
            catalog_capacity = 4
            comparison = "arrival_time"
            on_no_signal = "maintain"

            [output]
            format = "json"
            max_iterations = 100
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.input.gps, Some(PathBuf::from("drive.nmea")));
        assert_eq!(config.advisor.catalog_capacity, 4);
        assert_eq!(config.advisor.comparison, Comparison::ArrivalTime);
        assert_eq!(config.advisor.on_no_signal, NoSignalPolicy::Maintain);
        // Untouched advisor fields keep their defaults
        assert_eq!(config.advisor.position_tag, "GPGGA");
        assert!(config.advisor.verify_checksums);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.output.max_iterations, Some(100));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert!(config.input.gps.is_none());
        assert_eq!(config.advisor, AdvisorConfig::default());
        assert_eq!(config.output.format, OutputFormat::Txt);
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[advisor]\nmaintain_tolerance = 0.5").unwrap();
        file.flush().unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.advisor.maintain_tolerance, 0.5);
    }

    #[test]
    fn test_load_config_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[advisor]\ncatalog_capacity = 0").unwrap();
        file.flush().unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("catalog_capacity"));
    }

    #[test]
    fn test_load_config_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[output]\nformat = \"html\"").unwrap();
        file.flush().unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/advisor.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
