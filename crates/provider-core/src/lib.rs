//! Core module for the service provider registry.
//!
//! The [`Registry`] holds an ordered set of provider descriptors addressed by
//! small integer keys. Providers are instantiated on first access and cached,
//! as are the factory and extension maps they contribute, so every caller
//! observes the same provider and the same maps for a given key.
//!
//! Explicitly registered providers can be complemented by a discovery
//! implementation. Discovered providers occupy the keys following the explicit
//! ones and are looked up only through [`Registry::get`] and [`Registry::has`].
//!
//! ```
//! use provider_core::Registry;
//! use provider_types::{
//! 	factory, service_value, ExtensionMap, FactoryMap, MapContainer, ServiceProvider,
//! };
//! use std::sync::Arc;
//!
//! struct Answer;
//!
//! impl ServiceProvider for Answer {
//! 	fn register_factories(&self) -> FactoryMap {
//! 		let mut factories = FactoryMap::new();
//! 		factories.insert("answer".to_string(), factory(|_| Ok(service_value(42_i64))));
//! 		factories
//! 	}
//!
//! 	fn register_extensions(&self) -> ExtensionMap {
//! 		ExtensionMap::new()
//! 	}
//! }
//!
//! let mut registry = Registry::default();
//! let key = registry.push_instance(Answer);
//! let value = registry
//! 	.create_service(key, "answer", &MapContainer::new())
//! 	.unwrap();
//! assert_eq!(*value.downcast::<i64>().unwrap(), 42);
//! assert!(Arc::ptr_eq(&registry.get(key).unwrap(), &registry.get(key).unwrap()));
//! ```
//!
//! Slots cannot be assigned directly; `push` is the only way to add a
//! provider after construction:
//!
//! ```compile_fail
//! use provider_core::{ProviderDescriptor, Registry};
//!
//! let mut registry = Registry::default();
//! registry[0] = ProviderDescriptor::class("greeting");
//! ```
//!
//! ```compile_fail
//! use provider_core::{ProviderDescriptor, Registry};
//!
//! let mut registry = Registry::default();
//! registry.set(0, ProviderDescriptor::class("greeting"));
//! ```

mod descriptor;
mod entry;
mod registry;

pub use descriptor::ProviderDescriptor;
pub(crate) use entry::RegistryEntry;
pub use registry::{Iter, Registry, RegistryBuilder};

use provider_discovery::DiscoveryError;
use provider_types::{ProviderError, ServiceError};
use thiserror::Error;

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
	/// No explicit or discovered provider exists at the key.
	#[error("No service provider at key {0}")]
	OutOfRange(usize),
	/// The operation is not permitted on this key.
	#[error("Invalid operation: {0}")]
	InvalidOperation(String),
	/// The argument cannot be turned into a registry entry.
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	/// The provider at the key has no factory or extension with this name.
	#[error("Service '{service}' not found in service provider at key {key}")]
	ServiceNotFound { key: usize, service: String },
	/// The provider at the key is not of the requested concrete type.
	#[error("Service provider at key {key} is not of type {expected}")]
	TypeMismatch { key: usize, expected: &'static str },
	/// Constructing the provider failed.
	#[error("Instantiation error: {0}")]
	Instantiation(#[from] ProviderError),
	/// Querying the discovery implementation failed.
	#[error("Discovery error: {0}")]
	Discovery(#[from] DiscoveryError),
	/// A factory or extension failed.
	#[error(transparent)]
	Service(#[from] ServiceError),
}
