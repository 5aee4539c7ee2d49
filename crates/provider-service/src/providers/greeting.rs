//! Greeting service provider.
//!
//! Contributes a name and a greeting message built from it. The message
//! factory prefers a `greeting.name` service from the container so that other
//! providers can override the name.

use provider_types::{
	downcast_service, extension, factory, service_value, Container, ExtensionMap, FactoryMap,
	ImplementationRegistry, ProviderConstructor, ProviderError, ProviderRegistration, ServiceError,
	ServiceProvider,
};
use std::sync::Arc;

const NAME_SERVICE: &str = "greeting.name";
const MESSAGE_SERVICE: &str = "greeting.message";

/// Provider of the `greeting.*` services.
#[derive(Debug, Clone, PartialEq)]
pub struct GreetingProvider {
	name: String,
}

impl GreetingProvider {
	pub fn new(name: impl Into<String>) -> Self {
		Self { name: name.into() }
	}

	pub fn name(&self) -> &str {
		&self.name
	}
}

impl Default for GreetingProvider {
	fn default() -> Self {
		Self::new("World")
	}
}

fn name_from(container: &dyn Container, fallback: &str) -> Result<String, ServiceError> {
	if !container.has(NAME_SERVICE) {
		return Ok(fallback.to_string());
	}
	let name = downcast_service::<String>(NAME_SERVICE, container.get(NAME_SERVICE)?)?;
	Ok((*name).clone())
}

impl ServiceProvider for GreetingProvider {
	fn register_factories(&self) -> FactoryMap {
		let mut factories = FactoryMap::new();

		let name = self.name.clone();
		factories.insert(
			NAME_SERVICE.to_string(),
			factory(move |_| Ok(service_value(name.clone()))),
		);

		let fallback = self.name.clone();
		factories.insert(
			MESSAGE_SERVICE.to_string(),
			factory(move |container| {
				let name = name_from(container, &fallback)?;
				Ok(service_value(format!("Hello, {}!", name)))
			}),
		);

		factories
	}

	fn register_extensions(&self) -> ExtensionMap {
		let mut extensions = ExtensionMap::new();
		extensions.insert(
			MESSAGE_SERVICE.to_string(),
			extension(|_, previous| {
				let previous = previous.ok_or_else(|| ServiceError::Failed {
					service: MESSAGE_SERVICE.to_string(),
					message: "No message to extend".to_string(),
				})?;
				let message = downcast_service::<String>(MESSAGE_SERVICE, previous)?;
				Ok(service_value(message.to_uppercase()))
			}),
		);
		extensions
	}
}

/// Constructor for the greeting provider.
///
/// Arguments:
/// - `name` (optional string): who to greet, defaults to "World"
pub fn create_provider(args: &[toml::Value]) -> Result<Arc<dyn ServiceProvider>, ProviderError> {
	let provider = match args {
		[] => GreetingProvider::default(),
		[toml::Value::String(name)] => GreetingProvider::new(name.as_str()),
		_ => {
			return Err(ProviderError::InvalidArguments {
				name: Registry::NAME.to_string(),
				message: "expected at most one string argument".to_string(),
			})
		},
	};
	Ok(Arc::new(provider))
}

/// Registry for the greeting provider class.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "greeting";
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

	#[test]
	fn test_constructor_arguments() {
		let provider = create_provider(&[toml::Value::String("Ada".into())]).unwrap();
		let greeting = provider.into_any_arc().downcast::<GreetingProvider>().unwrap();
		assert_eq!(greeting.name(), "Ada");

		let provider = create_provider(&[]).unwrap();
		let greeting = provider.into_any_arc().downcast::<GreetingProvider>().unwrap();
		assert_eq!(greeting.name(), "World");

		assert!(matches!(
			create_provider(&[toml::Value::Integer(1)]),
			Err(ProviderError::InvalidArguments { .. })
		));
		assert_eq!(Registry::NAME, "greeting");
	}

	#[test]
	fn test_message_prefers_container_name() {
		let provider = GreetingProvider::new("Ada");
		let factories = provider.register_factories();

		let message = factories[MESSAGE_SERVICE](&MapContainer::new()).unwrap();
		assert_eq!(
			downcast_service::<String>(MESSAGE_SERVICE, message).unwrap().as_str(),
			"Hello, Ada!"
		);

		let container =
			MapContainer::new().with_service(NAME_SERVICE, service_value("Grace".to_string()));
		let message = factories[MESSAGE_SERVICE](&container).unwrap();
		assert_eq!(
			downcast_service::<String>(MESSAGE_SERVICE, message).unwrap().as_str(),
			"Hello, Grace!"
		);
	}

	#[test]
	fn test_extension_shouts() {
		let provider = GreetingProvider::default();
		let extensions = provider.register_extensions();
		let container = MapContainer::new();

		let shouted = extensions[MESSAGE_SERVICE](
			&container,
			Some(service_value("Hello, World!".to_string())),
		)
		.unwrap();
		assert_eq!(
			downcast_service::<String>(MESSAGE_SERVICE, shouted).unwrap().as_str(),
			"HELLO, WORLD!"
		);
		assert!(extensions[MESSAGE_SERVICE](&container, None).is_err());
	}
}
