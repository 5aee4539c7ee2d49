//! Settings service provider.
//!
//! Publishes a TOML table as the `settings` service and each of its top-level
//! entries as `settings.<key>`. Its extension layers the table over settings
//! built by earlier providers.

use provider_types::{
	downcast_service, extension, factory, service_value, ExtensionMap, FactoryMap,
	ImplementationRegistry, ProviderConstructor, ProviderError, ProviderRegistration,
	ServiceProvider,
};
use std::sync::Arc;

const SETTINGS_SERVICE: &str = "settings";

/// Provider of the `settings` services.
#[derive(Debug, Clone, Default)]
pub struct SettingsProvider {
	values: toml::Table,
}

impl SettingsProvider {
	pub fn new(values: toml::Table) -> Self {
		Self { values }
	}

	pub fn values(&self) -> &toml::Table {
		&self.values
	}
}

impl ServiceProvider for SettingsProvider {
	fn register_factories(&self) -> FactoryMap {
		let mut factories = FactoryMap::new();

		let table = toml::Value::Table(self.values.clone());
		factories.insert(
			SETTINGS_SERVICE.to_string(),
			factory(move |_| Ok(service_value(table.clone()))),
		);

		for (key, value) in &self.values {
			let value = value.clone();
			factories.insert(
				format!("{}.{}", SETTINGS_SERVICE, key),
				factory(move |_| Ok(service_value(value.clone()))),
			);
		}

		factories
	}

	fn register_extensions(&self) -> ExtensionMap {
		let mut extensions = ExtensionMap::new();

		let overrides = self.values.clone();
		extensions.insert(
			SETTINGS_SERVICE.to_string(),
			extension(move |_, previous| {
				let mut merged = match previous {
					Some(previous) => {
						let previous = downcast_service::<toml::Value>(SETTINGS_SERVICE, previous)?;
						previous.as_table().cloned().unwrap_or_default()
					},
					None => toml::Table::new(),
				};
				merged.extend(overrides.clone());
				Ok(service_value(toml::Value::Table(merged)))
			}),
		);

		extensions
	}
}

/// Constructor for the settings provider.
///
/// Arguments:
/// - `values` (optional table): the settings to publish
pub fn create_provider(args: &[toml::Value]) -> Result<Arc<dyn ServiceProvider>, ProviderError> {
	let provider = match args {
		[] => SettingsProvider::default(),
		[toml::Value::Table(values)] => SettingsProvider::new(values.clone()),
		_ => {
			return Err(ProviderError::InvalidArguments {
				name: Registry::NAME.to_string(),
				message: "expected at most one table argument".to_string(),
			})
		},
	};
	Ok(Arc::new(provider))
}

/// Registry for the settings provider class.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "settings";
	type Factory = ProviderConstructor;

	fn factory() -> Self::Factory {
		create_provider
	}
}

impl ProviderRegistration for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use provider_types::MapContainer;

	fn table(source: &str) -> toml::Table {
		toml::from_str(source).unwrap()
	}

	#[test]
	fn test_factories_per_key() {
		let provider = SettingsProvider::new(table("debug = true\nlevel = 3"));
		let factories = provider.register_factories();
		let container = MapContainer::new();

		let mut names: Vec<_> = factories.keys().cloned().collect();
		names.sort();
		assert_eq!(names, vec!["settings", "settings.debug", "settings.level"]);

		let level = factories["settings.level"](&container).unwrap();
		assert_eq!(
			*downcast_service::<toml::Value>("settings.level", level).unwrap(),
			toml::Value::Integer(3)
		);
	}

	#[test]
	fn test_extension_overrides_previous() {
		let provider = SettingsProvider::new(table("level = 5"));
		let extensions = provider.register_extensions();
		let container = MapContainer::new();

		let previous = service_value(toml::Value::Table(table("debug = true\nlevel = 1")));
		let merged = extensions[SETTINGS_SERVICE](&container, Some(previous)).unwrap();
		let merged = downcast_service::<toml::Value>(SETTINGS_SERVICE, merged).unwrap();
		assert_eq!(merged.get("level"), Some(&toml::Value::Integer(5)));
		assert_eq!(merged.get("debug"), Some(&toml::Value::Boolean(true)));

		let fresh = extensions[SETTINGS_SERVICE](&container, None).unwrap();
		let fresh = downcast_service::<toml::Value>(SETTINGS_SERVICE, fresh).unwrap();
		assert_eq!(fresh.get("level"), Some(&toml::Value::Integer(5)));
	}

	#[test]
	fn test_constructor_rejects_non_table() {
		assert!(matches!(
			create_provider(&[toml::Value::String("x".into())]),
			Err(ProviderError::InvalidArguments { .. })
		));
		assert!(create_provider(&[]).is_ok());
	}
}
