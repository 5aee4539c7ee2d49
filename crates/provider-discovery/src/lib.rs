//! Provider discovery module for the service provider registry.
//!
//! Discovery mechanisms publish lists of provider class names per asset type.
//! The registry queries one of them, at most once, to find providers that were
//! not registered explicitly.

use provider_types::{ImplementationRegistry, ValidationError};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod manifest;
	pub mod static_list;
}

/// Errors that can occur during provider discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
	/// Error that occurs when the implementation configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
	/// Error that occurs when reading a discovery source fails.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when a discovery source cannot be parsed.
	#[error("Parse error: {0}")]
	ParseError(String),
}

impl From<ValidationError> for DiscoveryError {
	fn from(err: ValidationError) -> Self {
		DiscoveryError::Configuration(err.to_string())
	}
}

/// Trait defining the interface for discovery implementations.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait DiscoveryInterface: Send + Sync {
	/// Returns the identifiers published for `asset_type`, in order.
	///
	/// Unknown asset types yield an empty list rather than an error.
	fn get(&self, asset_type: &str) -> Result<Vec<String>, DiscoveryError>;
}

/// Type alias for discovery factory functions.
pub type DiscoveryFactory = fn(&toml::Value) -> Result<Box<dyn DiscoveryInterface>, DiscoveryError>;

/// Registry trait for discovery implementations.
pub trait DiscoveryRegistry: ImplementationRegistry<Factory = DiscoveryFactory> {}

/// Get all registered discovery implementations.
///
/// Returns (name, factory) tuples so callers can pick an implementation by the
/// name used in configuration.
pub fn get_all_implementations() -> Vec<(&'static str, DiscoveryFactory)> {
	use implementations::{manifest, static_list};

	vec![
		(manifest::Registry::NAME, manifest::Registry::factory()),
		(static_list::Registry::NAME, static_list::Registry::factory()),
	]
}

/// Builds the discovery implementation registered under `name`.
pub fn create_discovery(
	name: &str,
	config: &toml::Value,
) -> Result<Box<dyn DiscoveryInterface>, DiscoveryError> {
	let implementations = get_all_implementations();
	let factory = implementations
		.iter()
		.find(|(implementation, _)| *implementation == name)
		.map(|(_, factory)| *factory)
		.ok_or_else(|| {
			let available: Vec<_> = implementations.iter().map(|(n, _)| *n).collect();
			DiscoveryError::Configuration(format!(
				"Unknown discovery implementation '{}'. Available: [{}]",
				name,
				available.join(", ")
			))
		})?;

	tracing::debug!(implementation = %name, "Creating discovery implementation");
	factory(config)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_all_implementations_registered() {
		let names: Vec<_> = get_all_implementations()
			.into_iter()
			.map(|(name, _)| name)
			.collect();
		assert_eq!(names, vec!["manifest", "static"]);
	}

	#[test]
	fn test_create_unknown_implementation() {
		let config = toml::Value::Table(toml::Table::new());
		let result = create_discovery("composer", &config);
		assert!(matches!(
			result,
			Err(DiscoveryError::Configuration(msg)) if msg.contains("Available: [manifest, static]")
		));
	}

	#[test]
	fn test_create_static_implementation() {
		let config: toml::Value = toml::from_str("providers = [\"greeting\"]").unwrap();
		let discovery = create_discovery("static", &config).unwrap();
		assert_eq!(
			discovery
				.get(provider_types::SERVICE_PROVIDER_ASSET)
				.unwrap(),
			vec!["greeting".to_string()]
		);
	}

	#[test]
	fn test_schema_checked_before_construction() {
		// An empty manifest path must fail validation instead of reaching the filesystem.
		let config: toml::Value = toml::from_str("path = \"\"").unwrap();
		assert!(matches!(
			create_discovery("manifest", &config),
			Err(DiscoveryError::Configuration(msg)) if msg.contains("path")
		));

		let config: toml::Value = toml::from_str("providers = [1]").unwrap();
		assert!(matches!(
			create_discovery("static", &config),
			Err(DiscoveryError::Configuration(msg)) if msg.contains("providers[0]")
		));
	}
}
