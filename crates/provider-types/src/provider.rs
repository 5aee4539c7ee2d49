//! Service provider contract.
//!
//! A service provider contributes named factories (build a service from the
//! container) and named extensions (decorate a service that was already
//! built). Service values are type-erased so that one container can hold
//! services of arbitrary types.

use crate::{Container, ContainerError};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// A type-erased, shareable service value.
pub type ServiceValue = Arc<dyn Any + Send + Sync>;

/// Builds a named service from the container.
pub type Factory = Arc<dyn Fn(&dyn Container) -> Result<ServiceValue, ServiceError> + Send + Sync>;

/// Decorates an already-built service, receiving the container and the
/// previous value (if any).
pub type Extension = Arc<
	dyn Fn(&dyn Container, Option<ServiceValue>) -> Result<ServiceValue, ServiceError>
		+ Send
		+ Sync,
>;

/// Mapping from service name to factory.
pub type FactoryMap = HashMap<String, Factory>;

/// Mapping from service name to extension.
pub type ExtensionMap = HashMap<String, Extension>;

/// Errors raised by factories and extensions while producing a service.
#[derive(Debug, Error)]
pub enum ServiceError {
	/// The factory or extension could not produce its value.
	#[error("Service '{service}' failed: {message}")]
	Failed { service: String, message: String },
	/// A value had a different concrete type than expected.
	#[error("Service '{service}' is not of type {expected}")]
	TypeMismatch {
		service: String,
		expected: &'static str,
	},
	/// A dependency could not be fetched from the container.
	#[error(transparent)]
	Container(#[from] ContainerError),
}

/// Upcasting helpers so providers behind `dyn ServiceProvider` can be
/// recovered as their concrete type.
///
/// Implemented for every sized `Any + Send + Sync` type; never implement it
/// by hand.
pub trait AsAny: Any + Send + Sync {
	/// Borrows `self` as `&dyn Any`.
	fn as_any(&self) -> &dyn Any;

	/// Converts a shared pointer into a type-erased shared pointer.
	fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
	fn as_any(&self) -> &dyn Any {
		self
	}

	fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
		self
	}
}

/// Trait implemented by every service provider.
///
/// Both methods are expected to be cheap and side-effect free; the registry
/// calls each of them at most once per registered provider and shares the
/// resulting maps.
pub trait ServiceProvider: AsAny {
	/// Returns the factories this provider contributes, keyed by service name.
	fn register_factories(&self) -> FactoryMap;

	/// Returns the extensions this provider contributes, keyed by service name.
	fn register_extensions(&self) -> ExtensionMap;
}

/// Wraps a value as a [`ServiceValue`].
pub fn service_value<T: Any + Send + Sync>(value: T) -> ServiceValue {
	Arc::new(value)
}

/// Wraps a closure as a [`Factory`].
pub fn factory<F>(f: F) -> Factory
where
	F: Fn(&dyn Container) -> Result<ServiceValue, ServiceError> + Send + Sync + 'static,
{
	Arc::new(f)
}

/// Wraps a closure as an [`Extension`].
pub fn extension<F>(f: F) -> Extension
where
	F: Fn(&dyn Container, Option<ServiceValue>) -> Result<ServiceValue, ServiceError>
		+ Send
		+ Sync
		+ 'static,
{
	Arc::new(f)
}

/// Downcasts a service value to a concrete type.
///
/// `service` is only used to build the error message.
pub fn downcast_service<T: Any + Send + Sync>(
	service: &str,
	value: ServiceValue,
) -> Result<Arc<T>, ServiceError> {
	value
		.downcast::<T>()
		.map_err(|_| ServiceError::TypeMismatch {
			service: service.to_string(),
			expected: std::any::type_name::<T>(),
		})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::MapContainer;

	struct Upper;

	impl ServiceProvider for Upper {
		fn register_factories(&self) -> FactoryMap {
			let mut factories = FactoryMap::new();
			factories.insert(
				"word".to_string(),
				factory(|_| Ok(service_value("HELLO".to_string()))),
			);
			factories
		}

		fn register_extensions(&self) -> ExtensionMap {
			let mut extensions = ExtensionMap::new();
			extensions.insert(
				"word".to_string(),
				extension(|_, previous| {
					let previous = previous.ok_or_else(|| ServiceError::Failed {
						service: "word".to_string(),
						message: "nothing to extend".to_string(),
					})?;
					let word = downcast_service::<String>("word", previous)?;
					Ok(service_value(format!("{}!", word)))
				}),
			);
			extensions
		}
	}

	#[test]
	fn test_provider_recovers_concrete_type() {
		let provider: Arc<dyn ServiceProvider> = Arc::new(Upper);
		assert!(provider.as_ref().as_any().is::<Upper>());
		assert!(provider.into_any_arc().downcast::<Upper>().is_ok());
	}

	#[test]
	fn test_extension_decorates_previous_value() {
		let container = MapContainer::new();
		let provider = Upper;

		let built = (provider.register_factories()["word"])(&container).unwrap();
		let extended = (provider.register_extensions()["word"])(&container, Some(built)).unwrap();
		let extended = downcast_service::<String>("word", extended).unwrap();
		assert_eq!(extended.as_str(), "HELLO!");

		let missing = (provider.register_extensions()["word"])(&container, None);
		assert!(matches!(missing, Err(ServiceError::Failed { .. })));
	}

	#[test]
	fn test_downcast_mismatch() {
		let result = downcast_service::<i64>("word", service_value("x".to_string()));
		assert!(matches!(result, Err(ServiceError::TypeMismatch { .. })));
	}
}
