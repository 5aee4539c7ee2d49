//! Configuration module for the service provider registry.
//!
//! The configuration lists the providers to register explicitly, in order,
//! and optionally selects a discovery implementation that contributes further
//! providers. Values may reference environment variables with `${VAR}` or
//! `${VAR:-default}`.
//!
//! ```toml
//! [registry]
//! id = "app"
//!
//! [[providers]]
//! class = "greeting"
//! args = ["World"]
//!
//! [discovery]
//! primary = "manifest"
//! [discovery.implementations.manifest]
//! path = "discovery.toml"
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message only; the full error embeds the whole input.
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Registry identity.
	pub registry: RegistryConfig,
	/// Explicitly registered providers, in key order.
	#[serde(default)]
	pub providers: Vec<ProviderConfig>,
	/// Discovery implementation contributing further providers.
	pub discovery: Option<DiscoveryConfig>,
}

/// Registry identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistryConfig {
	/// Identifier used in logs.
	pub id: String,
}

/// One explicitly registered provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
	/// Provider class name, as registered in the provider catalog.
	pub class: String,
	/// Constructor arguments, passed in order.
	#[serde(default)]
	pub args: Vec<toml::Value>,
}

/// Configuration for provider discovery.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DiscoveryConfig {
	/// Which implementation to use.
	pub primary: String,
	/// Map of discovery implementation names to their configurations.
	/// Each implementation has its own configuration format stored as raw TOML values.
	pub implementations: HashMap<String, toml::Value>,
}

impl DiscoveryConfig {
	/// Configuration table of the primary implementation.
	pub fn primary_config(&self) -> Option<&toml::Value> {
		self.implementations.get(&self.primary)
	}
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last_end = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};

		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match cap.get(2) {
				Some(default) => default.as_str().to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)));
				},
			},
		};

		result.push_str(&input[last_end..full_match.start()]);
		result.push_str(&value);
		last_end = full_match.end();
	}
	result.push_str(&input[last_end..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a file.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let content = tokio::fs::read_to_string(path).await.map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				e.kind(),
				format!("Cannot read {}: {}", path.display(), e),
			))
		})?;
		content.parse()
	}

	/// Validates the configuration.
	///
	/// - Registry ID must not be empty
	/// - Every provider must name a class
	/// - The primary discovery implementation must be configured and be a table
	fn validate(&self) -> Result<(), ConfigError> {
		if self.registry.id.trim().is_empty() {
			return Err(ConfigError::Validation("Registry ID cannot be empty".into()));
		}

		for (index, provider) in self.providers.iter().enumerate() {
			if provider.class.trim().is_empty() {
				return Err(ConfigError::Validation(format!(
					"Provider {} must have a class",
					index
				)));
			}
		}

		if let Some(discovery) = &self.discovery {
			if discovery.primary.is_empty() {
				return Err(ConfigError::Validation(
					"Discovery primary implementation cannot be empty".into(),
				));
			}
			match discovery.primary_config() {
				None => {
					return Err(ConfigError::Validation(format!(
						"Primary discovery '{}' not found in implementations",
						discovery.primary
					)));
				},
				Some(value) if !value.is_table() => {
					return Err(ConfigError::Validation(format!(
						"Discovery implementation '{}' must be a table",
						discovery.primary
					)));
				},
				Some(_) => {},
			}
		}

		Ok(())
	}
}

/// Parses configuration from a TOML string.
///
/// Environment variables are resolved first and the result is validated.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use tempfile::TempDir;

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("PROVIDER_TEST_HOST", "localhost");
		std::env::set_var("PROVIDER_TEST_PORT", "5432");

		let input = "host = \"${PROVIDER_TEST_HOST}:${PROVIDER_TEST_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "host = \"localhost:5432\"");

		std::env::remove_var("PROVIDER_TEST_HOST");
		std::env::remove_var("PROVIDER_TEST_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${PROVIDER_MISSING_VAR:-default_value}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"default_value\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let input = "value = \"${PROVIDER_MISSING_VAR}\"";
		let result = resolve_env_vars(input);
		assert!(result.is_err());
		assert!(result.unwrap_err().to_string().contains("PROVIDER_MISSING_VAR"));
	}

	#[test]
	fn test_parse_full_config() {
		std::env::set_var("PROVIDER_TEST_GREETING", "World");

		let config: Config = r#"
[registry]
id = "app"

[[providers]]
class = "greeting"
args = ["${PROVIDER_TEST_GREETING}"]

[[providers]]
class = "settings"

[discovery]
primary = "static"
[discovery.implementations.static]
providers = ["settings"]
"#
		.parse()
		.unwrap();

		assert_eq!(config.registry.id, "app");
		assert_eq!(config.providers.len(), 2);
		assert_eq!(config.providers[0].class, "greeting");
		assert_eq!(
			config.providers[0].args,
			vec![toml::Value::String("World".into())]
		);
		assert!(config.providers[1].args.is_empty());

		let discovery = config.discovery.unwrap();
		assert_eq!(discovery.primary, "static");
		assert!(discovery.primary_config().unwrap().get("providers").is_some());

		std::env::remove_var("PROVIDER_TEST_GREETING");
	}

	#[test]
	fn test_validation_errors() {
		let result: Result<Config, _> = "[registry]\nid = \"\"".parse();
		assert!(matches!(result, Err(ConfigError::Validation(msg)) if msg.contains("Registry ID")));

		let result: Result<Config, _> = r#"
[registry]
id = "app"
[[providers]]
class = " "
"#
		.parse();
		assert!(matches!(result, Err(ConfigError::Validation(msg)) if msg.contains("Provider 0")));

		let result: Result<Config, _> = r#"
[registry]
id = "app"
[discovery]
primary = "manifest"
[discovery.implementations.static]
providers = []
"#
		.parse();
		assert!(matches!(result, Err(ConfigError::Validation(msg)) if msg.contains("'manifest' not found")));
	}

	#[test]
	fn test_parse_error_keeps_message_only() {
		let result: Result<Config, _> = "[registry\nid = 1".parse();
		assert!(matches!(result, Err(ConfigError::Parse(_))));
	}

	#[tokio::test]
	async fn test_from_file() {
		let temp_dir = TempDir::new().unwrap();
		let config_path = temp_dir.path().join("registry.toml");
		fs::write(
			&config_path,
			r#"
[registry]
id = "from-file"

[[providers]]
class = "greeting"
args = ["File"]
"#,
		)
		.unwrap();

		let config = Config::from_file(&config_path).await.unwrap();
		assert_eq!(config.registry.id, "from-file");
		assert!(config.discovery.is_none());

		let missing = Config::from_file(temp_dir.path().join("absent.toml")).await;
		assert!(matches!(missing, Err(ConfigError::Io(_))));
	}
}
