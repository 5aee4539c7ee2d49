//! Provider class catalog.
//!
//! Provider classes are referenced by name in configuration and by discovery
//! mechanisms. The catalog maps each name to a constructor function that
//! builds the provider from an ordered list of TOML arguments.

use crate::{ImplementationRegistry, ServiceProvider};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while constructing a service provider.
#[derive(Debug, Error)]
pub enum ProviderError {
	/// No constructor is registered under the requested class name.
	#[error("Unknown provider class '{name}'. Available: [{available}]")]
	UnknownClass { name: String, available: String },
	/// The constructor rejected its arguments.
	#[error("Invalid arguments for provider '{name}': {message}")]
	InvalidArguments { name: String, message: String },
	/// The constructor failed for another reason.
	#[error("Failed to construct provider '{name}': {message}")]
	Construction { name: String, message: String },
}

/// Constructor function type every provider class provides.
pub type ProviderConstructor =
	fn(&[toml::Value]) -> Result<Arc<dyn ServiceProvider>, ProviderError>;

/// Registry trait for provider classes.
///
/// Each provider class exposes a `Registry` type implementing this trait so
/// that it can be added to a [`ProviderCatalog`] under its class name.
pub trait ProviderRegistration: ImplementationRegistry<Factory = ProviderConstructor> {}

/// Named collection of provider constructors.
#[derive(Clone, Default)]
pub struct ProviderCatalog {
	constructors: BTreeMap<String, ProviderConstructor>,
}

impl ProviderCatalog {
	/// Creates an empty catalog.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a provider class through its [`ProviderRegistration`].
	pub fn register<R: ProviderRegistration>(&mut self) -> &mut Self {
		self.register_constructor(R::NAME, R::factory())
	}

	/// Registers a constructor under an explicit class name, replacing any
	/// previous constructor with the same name.
	pub fn register_constructor(
		&mut self,
		name: impl Into<String>,
		constructor: ProviderConstructor,
	) -> &mut Self {
		self.constructors.insert(name.into(), constructor);
		self
	}

	/// Returns true if a class is registered under `name`.
	pub fn contains(&self, name: &str) -> bool {
		self.constructors.contains_key(name)
	}

	/// Registered class names in ascending order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.constructors.keys().map(String::as_str)
	}

	/// Builds a provider of class `name` with the given arguments.
	pub fn instantiate(
		&self,
		name: &str,
		args: &[toml::Value],
	) -> Result<Arc<dyn ServiceProvider>, ProviderError> {
		let constructor =
			self.constructors
				.get(name)
				.ok_or_else(|| ProviderError::UnknownClass {
					name: name.to_string(),
					available: self.names().collect::<Vec<_>>().join(", "),
				})?;
		constructor(args)
	}
}

impl fmt::Debug for ProviderCatalog {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(self.names()).finish()
	}
}
