//! Provider descriptors.
//!
//! A descriptor records how to obtain a service provider: by class name, by
//! class name plus constructor arguments, or as an instance that already
//! exists.

use provider_types::{ProviderCatalog, ProviderError, ServiceProvider};
use std::fmt;
use std::sync::Arc;

/// How a registry entry obtains its service provider.
#[derive(Clone)]
pub enum ProviderDescriptor {
	/// Class name instantiated with no arguments.
	ClassRef(String),
	/// Class name instantiated with the given arguments, in order.
	ClassRefWithArgs(String, Vec<toml::Value>),
	/// A provider that was constructed by the caller.
	Instance(Arc<dyn ServiceProvider>),
	/// Class name published by a discovery mechanism.
	DiscoveredRef(String),
}

impl ProviderDescriptor {
	/// Descriptor for a class with no constructor arguments.
	pub fn class(name: impl Into<String>) -> Self {
		Self::ClassRef(name.into())
	}

	/// Descriptor for a class with constructor arguments.
	///
	/// An empty argument list is equivalent to [`ProviderDescriptor::class`].
	pub fn class_with_args(name: impl Into<String>, args: Vec<toml::Value>) -> Self {
		if args.is_empty() {
			return Self::ClassRef(name.into());
		}
		Self::ClassRefWithArgs(name.into(), args)
	}

	/// Descriptor wrapping an existing provider.
	pub fn instance<P: ServiceProvider>(provider: P) -> Self {
		Self::Instance(Arc::new(provider))
	}

	/// The class name, if this descriptor refers to a class.
	pub fn class_name(&self) -> Option<&str> {
		match self {
			Self::ClassRef(name) | Self::ClassRefWithArgs(name, _) | Self::DiscoveredRef(name) => {
				Some(name.as_str())
			},
			Self::Instance(_) => None,
		}
	}

	/// Produces the provider this descriptor stands for.
	///
	/// Instances are returned as the same shared pointer.
	pub(crate) fn instantiate(
		&self,
		catalog: &ProviderCatalog,
	) -> Result<Arc<dyn ServiceProvider>, ProviderError> {
		match self {
			Self::ClassRef(name) | Self::DiscoveredRef(name) => catalog.instantiate(name, &[]),
			Self::ClassRefWithArgs(name, args) => catalog.instantiate(name, args),
			Self::Instance(provider) => Ok(Arc::clone(provider)),
		}
	}
}

impl fmt::Debug for ProviderDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::ClassRef(name) => f.debug_tuple("ClassRef").field(name).finish(),
			Self::ClassRefWithArgs(name, args) => f
				.debug_tuple("ClassRefWithArgs")
				.field(name)
				.field(args)
				.finish(),
			Self::Instance(_) => f.write_str("Instance(..)"),
			Self::DiscoveredRef(name) => f.debug_tuple("DiscoveredRef").field(name).finish(),
		}
	}
}

impl From<Arc<dyn ServiceProvider>> for ProviderDescriptor {
	fn from(provider: Arc<dyn ServiceProvider>) -> Self {
		Self::Instance(provider)
	}
}

impl From<&str> for ProviderDescriptor {
	fn from(name: &str) -> Self {
		Self::ClassRef(name.to_string())
	}
}

impl From<String> for ProviderDescriptor {
	fn from(name: String) -> Self {
		Self::ClassRef(name)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_class_with_empty_args_is_plain_class() {
		let descriptor = ProviderDescriptor::class_with_args("greeting", vec![]);
		assert!(matches!(descriptor, ProviderDescriptor::ClassRef(ref name) if name == "greeting"));

		let descriptor =
			ProviderDescriptor::class_with_args("greeting", vec![toml::Value::Integer(42)]);
		assert_eq!(descriptor.class_name(), Some("greeting"));
		assert!(format!("{:?}", descriptor).starts_with("ClassRefWithArgs(\"greeting\""));

		let descriptor = ProviderDescriptor::from("settings");
		assert_eq!(format!("{:?}", descriptor), "ClassRef(\"settings\")");
	}
}
