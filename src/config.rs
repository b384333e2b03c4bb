//! Configuration loader — merges config.toml, .env file, env vars and CLI flags.

use common::{Error, FetcherConfig};
use std::path::Path;

/// Values given on the command line; highest priority.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub base_url: Option<String>,
    pub output: Option<String>,
    pub timeout_secs: Option<u64>,
}

fn parse_positive_u64(raw: &str, env_name: &str) -> Result<u64, Error> {
    let parsed = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer > 0")))?;
    if parsed == 0 {
        return Err(Error::Config(format!("{env_name} must be an integer > 0")));
    }
    Ok(parsed)
}

fn validate_config(config: &FetcherConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    let base_url = config.base_url.trim();
    if base_url.is_empty() {
        issues.push("base_url must not be empty".into());
    } else if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        issues.push("base_url must start with http:// or https://".into());
    }
    if config.output_path.trim().is_empty() {
        issues.push("output_path must not be empty".into());
    }
    if config.request_timeout_secs == 0 {
        issues.push("request_timeout_secs must be > 0".into());
    }
    if config.progress_every == 0 {
        issues.push("progress_every must be > 0".into());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

fn apply_env<F>(config: &mut FetcherConfig, lookup: F) -> Result<(), Error>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("OUTLOOKS_BASE_URL") {
        config.base_url = url.trim().to_string();
    }
    if let Some(path) = lookup("OUTLOOKS_OUTPUT_PATH") {
        config.output_path = path.trim().to_string();
    }
    if let Some(raw) = lookup("OUTLOOKS_REQUEST_TIMEOUT_SECS") {
        config.request_timeout_secs = parse_positive_u64(&raw, "OUTLOOKS_REQUEST_TIMEOUT_SECS")?;
    }
    if let Some(raw) = lookup("OUTLOOKS_PROGRESS_EVERY") {
        config.progress_every = parse_positive_u64(&raw, "OUTLOOKS_PROGRESS_EVERY")? as usize;
    }
    Ok(())
}

fn apply_cli(config: &mut FetcherConfig, cli: &CliOverrides) {
    if let Some(url) = &cli.base_url {
        config.base_url = url.clone();
    }
    if let Some(output) = &cli.output {
        config.output_path = output.clone();
    }
    if let Some(timeout) = cli.timeout_secs {
        config.request_timeout_secs = timeout;
    }
}

fn read_config_file(path: &Path) -> Result<FetcherConfig, Error> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    toml::from_str(&contents)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Load configuration: defaults, then `config_path` (if present), then
/// environment, then CLI flags.
pub fn load_config(config_path: &Path, cli: &CliOverrides) -> Result<FetcherConfig, Error> {
    // 1. Load .env file from project root or parent directories.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults, or config.toml if it exists.
    let mut config = if config_path.exists() {
        read_config_file(config_path)?
    } else {
        FetcherConfig::default()
    };

    // 3. Environment variables.
    apply_env(&mut config, |name| std::env::var(name).ok())?;

    // 4. Command line.
    apply_cli(&mut config, cli);

    validate_config(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&FetcherConfig::default()).is_ok());
    }

    #[test]
    fn test_env_overrides_defaults() {
        let mut config = FetcherConfig::default();
        apply_env(
            &mut config,
            env(&[
                ("OUTLOOKS_BASE_URL", "http://localhost:8080/outlooks"),
                ("OUTLOOKS_REQUEST_TIMEOUT_SECS", " 3 "),
            ]),
        )
        .expect("env applies");

        assert_eq!(config.base_url, "http://localhost:8080/outlooks");
        assert_eq!(config.request_timeout_secs, 3);
        assert_eq!(config.output_path, "outlooks_data.json");
    }

    #[test]
    fn test_bad_timeout_env_rejected() {
        let mut config = FetcherConfig::default();
        let err = apply_env(&mut config, env(&[("OUTLOOKS_REQUEST_TIMEOUT_SECS", "0")]))
            .expect_err("zero timeout rejected");
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_cli_beats_env() {
        let mut config = FetcherConfig::default();
        apply_env(&mut config, env(&[("OUTLOOKS_OUTPUT_PATH", "from-env.json")]))
            .expect("env applies");
        apply_cli(
            &mut config,
            &CliOverrides {
                output: Some("from-cli.json".into()),
                ..Default::default()
            },
        );
        assert_eq!(config.output_path, "from-cli.json");
    }

    #[test]
    fn test_validation_collects_all_issues() {
        let config = FetcherConfig {
            base_url: "ftp://example".into(),
            output_path: " ".into(),
            request_timeout_secs: 0,
            progress_every: 0,
        };
        let Err(Error::Config(msg)) = validate_config(&config) else {
            panic!("expected config error");
        };
        assert!(msg.contains("base_url"));
        assert!(msg.contains("output_path"));
        assert!(msg.contains("request_timeout_secs"));
        assert!(msg.contains("progress_every"));
    }

    #[test]
    fn test_toml_file_is_read() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "output_path = \"snap.json\"\nprogress_every = 5\n")
            .expect("write config");

        let config = read_config_file(&path).expect("parses");
        assert_eq!(config.output_path, "snap.json");
        assert_eq!(config.progress_every, 5);
        assert_eq!(config.request_timeout_secs, 10);
    }
}
