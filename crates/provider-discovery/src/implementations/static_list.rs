//! Static discovery implementation.
//!
//! Publishes a fixed list of provider class names taken directly from the
//! configuration table. Useful when the set of discoverable providers is known
//! at deploy time but should stay separate from the explicit provider list.

use crate::{DiscoveryError, DiscoveryInterface};
use provider_types::{ConfigSchema, Field, FieldType, Schema, ValidationError, SERVICE_PROVIDER_ASSET};

/// Discovery backed by a list from configuration.
pub struct StaticDiscovery {
	/// Asset type the list is published under.
	asset_type: String,
	/// Published provider class names.
	providers: Vec<String>,
}

impl StaticDiscovery {
	/// Creates a discovery publishing `providers` under the service provider
	/// asset type.
	pub fn new(providers: Vec<String>) -> Self {
		Self {
			asset_type: SERVICE_PROVIDER_ASSET.to_string(),
			providers,
		}
	}

	/// Publishes the list under a different asset type.
	pub fn with_asset_type(mut self, asset_type: impl Into<String>) -> Self {
		self.asset_type = asset_type.into();
		self
	}
}

impl DiscoveryInterface for StaticDiscovery {
	fn get(&self, asset_type: &str) -> Result<Vec<String>, DiscoveryError> {
		if asset_type != self.asset_type {
			return Ok(Vec::new());
		}
		Ok(self.providers.clone())
	}
}

/// Configuration schema for StaticDiscovery.
pub struct StaticDiscoverySchema;

impl ConfigSchema for StaticDiscoverySchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![Field::new(
				"providers",
				FieldType::Array(Box::new(FieldType::String)),
			)],
			vec![Field::new("asset_type", FieldType::String)],
		);
		schema.validate(config)
	}
}

/// Factory function to create a static discovery from configuration.
///
/// Configuration parameters:
/// - `providers`: array of provider class names
/// - `asset_type` (optional): asset type to publish under, defaults to
///   `"service-provider"`
pub fn create_discovery(config: &toml::Value) -> Result<Box<dyn DiscoveryInterface>, DiscoveryError> {
	StaticDiscoverySchema.validate(config)?;

	let providers = config
		.get("providers")
		.and_then(|v| v.as_array())
		.map(|items| {
			items
				.iter()
				.filter_map(|item| item.as_str().map(str::to_string))
				.collect()
		})
		.unwrap_or_default();

	let mut discovery = StaticDiscovery::new(providers);
	if let Some(asset_type) = config.get("asset_type").and_then(|v| v.as_str()) {
		discovery = discovery.with_asset_type(asset_type);
	}

	Ok(Box::new(discovery))
}

/// Registry for the static discovery implementation.
pub struct Registry;

impl provider_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "static";
	type Factory = crate::DiscoveryFactory;

	fn factory() -> Self::Factory {
		create_discovery
	}
}

impl crate::DiscoveryRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_returns_list_for_matching_asset_type() {
		let discovery = StaticDiscovery::new(vec!["a".into(), "b".into()]);
		assert_eq!(
			discovery.get(SERVICE_PROVIDER_ASSET).unwrap(),
			vec!["a".to_string(), "b".to_string()]
		);
		assert!(discovery.get("middleware").unwrap().is_empty());
	}

	#[test]
	fn test_factory_reads_asset_type() {
		let config: toml::Value = toml::from_str(
			r#"
providers = ["auth"]
asset_type = "middleware"
"#,
		)
		.unwrap();
		let discovery = create_discovery(&config).unwrap();
		assert_eq!(discovery.get("middleware").unwrap(), vec!["auth".to_string()]);
		assert!(discovery.get(SERVICE_PROVIDER_ASSET).unwrap().is_empty());
	}

	#[test]
	fn test_factory_rejects_invalid_config() {
		let config: toml::Value = toml::from_str("providers = \"auth\"").unwrap();
		assert!(matches!(
			create_discovery(&config),
			Err(DiscoveryError::Configuration(_))
		));
	}
}
