//! Manifest file discovery implementation.
//!
//! Reads a TOML manifest in which packages publish their assets by type:
//!
//! ```toml
//! [assets]
//! service-provider = ["greeting", "settings"]
//! ```
//!
//! The manifest is read once when the implementation is created.

use crate::{DiscoveryError, DiscoveryInterface};
use provider_types::{ConfigSchema, Field, FieldType, Schema, ValidationError};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// On-disk manifest format.
#[derive(Debug, Default, Deserialize)]
struct Manifest {
	#[serde(default)]
	assets: HashMap<String, Vec<String>>,
}

/// Discovery backed by a manifest file.
#[derive(Debug)]
pub struct ManifestDiscovery {
	/// Where the manifest was loaded from, kept for diagnostics.
	path: PathBuf,
	assets: HashMap<String, Vec<String>>,
}

impl ManifestDiscovery {
	/// Loads the manifest at `path`.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, DiscoveryError> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path)?;
		let manifest: Manifest = toml::from_str(&content).map_err(|e| {
			DiscoveryError::ParseError(format!("{}: {}", path.display(), e.message()))
		})?;

		tracing::debug!(
			path = %path.display(),
			asset_types = manifest.assets.len(),
			"Loaded discovery manifest"
		);

		Ok(Self {
			path: path.to_path_buf(),
			assets: manifest.assets,
		})
	}

	/// Path of the loaded manifest.
	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl DiscoveryInterface for ManifestDiscovery {
	fn get(&self, asset_type: &str) -> Result<Vec<String>, DiscoveryError> {
		Ok(self.assets.get(asset_type).cloned().unwrap_or_default())
	}
}

/// Configuration schema for ManifestDiscovery.
pub struct ManifestDiscoverySchema;

impl ConfigSchema for ManifestDiscoverySchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![Field::new("path", FieldType::String).with_validator(|v| {
				match v.as_str() {
					Some(path) if path.trim().is_empty() => {
						Err("Manifest path cannot be empty".to_string())
					},
					_ => Ok(()),
				}
			})],
			vec![],
		);
		schema.validate(config)
	}
}

/// Factory function to create a manifest discovery from configuration.
///
/// Configuration parameters:
/// - `path`: location of the TOML manifest
pub fn create_discovery(config: &toml::Value) -> Result<Box<dyn DiscoveryInterface>, DiscoveryError> {
	ManifestDiscoverySchema.validate(config)?;

	let path = config
		.get("path")
		.and_then(|v| v.as_str())
		.ok_or_else(|| DiscoveryError::Configuration("path is required".into()))?;

	Ok(Box::new(ManifestDiscovery::load(path)?))
}

/// Registry for the manifest discovery implementation.
pub struct Registry;

impl provider_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "manifest";
	type Factory = crate::DiscoveryFactory;

	fn factory() -> Self::Factory {
		create_discovery
	}
}

impl crate::DiscoveryRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use provider_types::SERVICE_PROVIDER_ASSET;
	use std::fs;
	use tempfile::TempDir;

	#[test]
	fn test_load_manifest() {
		let temp_dir = TempDir::new().unwrap();
		let manifest_path = temp_dir.path().join("discovery.toml");
		fs::write(
			&manifest_path,
			r#"
[assets]
service-provider = ["greeting", "settings"]
middleware = ["auth"]
"#,
		)
		.unwrap();

		let discovery = ManifestDiscovery::load(&manifest_path).unwrap();
		assert_eq!(discovery.path(), manifest_path.as_path());
		assert_eq!(
			discovery.get(SERVICE_PROVIDER_ASSET).unwrap(),
			vec!["greeting".to_string(), "settings".to_string()]
		);
		assert!(discovery.get("templates").unwrap().is_empty());
	}

	#[test]
	fn test_factory_with_config() {
		let temp_dir = TempDir::new().unwrap();
		let manifest_path = temp_dir.path().join("discovery.toml");
		fs::write(&manifest_path, "[assets]\nservice-provider = [\"greeting\"]\n").unwrap();

		let mut table = toml::Table::new();
		table.insert(
			"path".to_string(),
			toml::Value::String(manifest_path.display().to_string()),
		);
		let discovery = create_discovery(&toml::Value::Table(table)).unwrap();
		assert_eq!(
			discovery.get(SERVICE_PROVIDER_ASSET).unwrap(),
			vec!["greeting".to_string()]
		);
	}

	#[test]
	fn test_missing_and_malformed_manifest() {
		let temp_dir = TempDir::new().unwrap();

		let missing = ManifestDiscovery::load(temp_dir.path().join("absent.toml"));
		assert!(matches!(missing, Err(DiscoveryError::Io(_))));

		let malformed_path = temp_dir.path().join("broken.toml");
		fs::write(&malformed_path, "[assets\n").unwrap();
		let malformed = ManifestDiscovery::load(&malformed_path);
		assert!(matches!(malformed, Err(DiscoveryError::ParseError(_))));
	}

	#[test]
	fn test_empty_path_rejected() {
		let config: toml::Value = toml::from_str("path = \"\"").unwrap();
		assert!(matches!(
			create_discovery(&config),
			Err(DiscoveryError::Configuration(msg)) if msg.contains("cannot be empty")
		));
	}
}
