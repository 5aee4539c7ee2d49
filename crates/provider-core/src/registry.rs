//! The service provider registry.

use crate::{ProviderDescriptor, RegistryEntry, RegistryError};
use once_cell::sync::OnceCell;
use provider_discovery::DiscoveryInterface;
use provider_types::{
	Container, ExtensionMap, FactoryMap, ProviderCatalog, ServiceProvider, ServiceValue,
	SERVICE_PROVIDER_ASSET,
};
use std::collections::{btree_map, BTreeMap};
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// Providers published by discovery, placed at `base..base + entries.len()`.
struct DiscoveredRange {
	base: usize,
	entries: Vec<RegistryEntry>,
}

impl DiscoveredRange {
	fn keys(&self) -> Range<usize> {
		self.base..self.base + self.entries.len()
	}

	fn get(&self, key: usize) -> Option<&RegistryEntry> {
		key.checked_sub(self.base)
			.and_then(|index| self.entries.get(index))
	}
}

/// Ordered, lazily instantiated collection of service providers.
///
/// Explicit entries come from construction or [`Registry::push`] and may be
/// removed with [`Registry::unset`]. Discovered entries are fetched from the
/// discovery implementation on the first lookup that misses the explicit
/// entries; the query runs at most once per registry and its entries cannot
/// be removed.
pub struct Registry {
	catalog: Arc<ProviderCatalog>,
	entries: BTreeMap<usize, RegistryEntry>,
	discovery: Option<Box<dyn DiscoveryInterface>>,
	discovered: OnceCell<DiscoveredRange>,
}

impl Registry {
	/// Creates a registry from an ordered list of descriptors.
	///
	/// Descriptors receive keys `0..n` in order. Nothing is instantiated yet.
	pub fn new(
		catalog: Arc<ProviderCatalog>,
		descriptors: impl IntoIterator<Item = ProviderDescriptor>,
	) -> Self {
		let entries = descriptors
			.into_iter()
			.map(RegistryEntry::new)
			.enumerate()
			.collect();

		Self {
			catalog,
			entries,
			discovery: None,
			discovered: OnceCell::new(),
		}
	}

	/// Starts a [`RegistryBuilder`] over `catalog`.
	pub fn builder(catalog: Arc<ProviderCatalog>) -> RegistryBuilder {
		RegistryBuilder::new(catalog)
	}

	/// Attaches a discovery implementation.
	///
	/// Replaces any previous implementation and forgets providers it already
	/// contributed; the new one is queried on the next lookup that needs it.
	pub fn with_discovery(mut self, discovery: Box<dyn DiscoveryInterface>) -> Self {
		self.discovery = Some(discovery);
		self.discovered = OnceCell::new();
		self
	}

	/// The catalog class references are resolved against.
	pub fn catalog(&self) -> &ProviderCatalog {
		&self.catalog
	}

	/// Number of explicit entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns true if there are no explicit entries.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Explicit keys in ascending order.
	pub fn keys(&self) -> impl Iterator<Item = usize> + '_ {
		self.entries.keys().copied()
	}

	/// Keys of the discovered providers, querying discovery if needed.
	///
	/// The range is empty when no discovery implementation is attached.
	pub fn discovered(&self) -> Result<Range<usize>, RegistryError> {
		Ok(self
			.discovered_range()?
			.map_or(0..0, DiscoveredRange::keys))
	}

	/// Returns the provider at `key`, instantiating it on first access.
	///
	/// Every call for the same key returns the same shared pointer until the
	/// key is unset.
	pub fn get(&self, key: usize) -> Result<Arc<dyn ServiceProvider>, RegistryError> {
		let entry = self.entry(key)?;
		Ok(Arc::clone(entry.resolve(key, &self.catalog)?))
	}

	/// Returns the provider at `key` as its concrete type.
	pub fn get_as<T: ServiceProvider>(&self, key: usize) -> Result<Arc<T>, RegistryError> {
		self.get(key)?
			.into_any_arc()
			.downcast::<T>()
			.map_err(|_| RegistryError::TypeMismatch {
				key,
				expected: std::any::type_name::<T>(),
			})
	}

	/// Returns true if a provider is registered at `key`.
	///
	/// Only the presence of a descriptor is checked; nothing is instantiated.
	/// A key beyond the explicit entries triggers the discovery query.
	pub fn has(&self, key: usize) -> Result<bool, RegistryError> {
		match self.entry(key) {
			Ok(_) => Ok(true),
			Err(RegistryError::OutOfRange(_)) => Ok(false),
			Err(e) => Err(e),
		}
	}

	/// The descriptor registered at `key`.
	pub fn descriptor(&self, key: usize) -> Result<&ProviderDescriptor, RegistryError> {
		Ok(self.entry(key)?.descriptor())
	}

	/// Removes the explicit entry at `key` together with its cached provider
	/// and maps, returning its descriptor.
	///
	/// Discovered entries cannot be removed.
	pub fn unset(&mut self, key: usize) -> Result<ProviderDescriptor, RegistryError> {
		if let Some(entry) = self.entries.remove(&key) {
			tracing::debug!(key, "Removed service provider");
			return Ok(entry.descriptor().clone());
		}

		if self
			.discovered_range()?
			.is_some_and(|range| range.get(key).is_some())
		{
			return Err(RegistryError::InvalidOperation(format!(
				"Service provider at key {} was discovered and cannot be removed",
				key
			)));
		}

		Err(RegistryError::OutOfRange(key))
	}

	/// Appends a provider and returns its key.
	///
	/// The key is one past the highest key in use, counting the discovered
	/// range once it is known. Class references must name a class in the
	/// catalog; discovered references are rejected.
	pub fn push(&mut self, descriptor: ProviderDescriptor) -> Result<usize, RegistryError> {
		match &descriptor {
			ProviderDescriptor::ClassRef(name) | ProviderDescriptor::ClassRefWithArgs(name, _) => {
				if name.trim().is_empty() {
					return Err(RegistryError::InvalidArgument(
						"Service provider class name cannot be empty".into(),
					));
				}
				if !self.catalog.contains(name) {
					return Err(RegistryError::InvalidArgument(format!(
						"Unknown service provider class '{}'",
						name
					)));
				}
			},
			ProviderDescriptor::DiscoveredRef(name) => {
				return Err(RegistryError::InvalidArgument(format!(
					"Discovered reference '{}' cannot be pushed",
					name
				)));
			},
			ProviderDescriptor::Instance(_) => {},
		}

		Ok(self.insert_next(descriptor))
	}

	/// Appends a class reference with constructor arguments.
	pub fn push_class(
		&mut self,
		name: impl Into<String>,
		args: Vec<toml::Value>,
	) -> Result<usize, RegistryError> {
		self.push(ProviderDescriptor::class_with_args(name, args))
	}

	/// Appends an already constructed provider.
	pub fn push_instance<P: ServiceProvider>(&mut self, provider: P) -> usize {
		self.insert_next(ProviderDescriptor::instance(provider))
	}

	/// Iterates over the explicit entries in ascending key order, resolving
	/// each provider as it is visited.
	pub fn iter(&self) -> Iter<'_> {
		Iter {
			registry: self,
			entries: self.entries.iter(),
		}
	}

	/// Returns the factories of the provider at `key`.
	///
	/// The map is built once per entry; later calls return the same `Arc`.
	pub fn get_factories(&self, key: usize) -> Result<Arc<FactoryMap>, RegistryError> {
		let entry = self.entry(key)?;
		Ok(Arc::clone(entry.factories(key, &self.catalog)?))
	}

	/// Returns the extensions of the provider at `key`.
	///
	/// The map is built once per entry; later calls return the same `Arc`.
	pub fn get_extensions(&self, key: usize) -> Result<Arc<ExtensionMap>, RegistryError> {
		let entry = self.entry(key)?;
		Ok(Arc::clone(entry.extensions(key, &self.catalog)?))
	}

	/// Builds `service` with the factory of the provider at `key`.
	///
	/// The result is not cached.
	pub fn create_service(
		&self,
		key: usize,
		service: &str,
		container: &dyn Container,
	) -> Result<ServiceValue, RegistryError> {
		let factories = self.get_factories(key)?;
		let factory = factories
			.get(service)
			.ok_or_else(|| RegistryError::ServiceNotFound {
				key,
				service: service.to_string(),
			})?;
		Ok(factory(container)?)
	}

	/// Applies the extension for `service` of the provider at `key` to
	/// `previous`.
	pub fn extend_service(
		&self,
		key: usize,
		service: &str,
		container: &dyn Container,
		previous: Option<ServiceValue>,
	) -> Result<ServiceValue, RegistryError> {
		let extensions = self.get_extensions(key)?;
		let extension = extensions
			.get(service)
			.ok_or_else(|| RegistryError::ServiceNotFound {
				key,
				service: service.to_string(),
			})?;
		Ok(extension(container, previous)?)
	}

	fn entry(&self, key: usize) -> Result<&RegistryEntry, RegistryError> {
		if let Some(entry) = self.entries.get(&key) {
			return Ok(entry);
		}

		self.discovered_range()?
			.and_then(|range| range.get(key))
			.ok_or(RegistryError::OutOfRange(key))
	}

	fn discovered_range(&self) -> Result<Option<&DiscoveredRange>, RegistryError> {
		let Some(discovery) = &self.discovery else {
			return Ok(None);
		};

		let range = self.discovered.get_or_try_init(|| {
			let names = discovery.get(SERVICE_PROVIDER_ASSET)?;
			let base = self.next_explicit_key();
			tracing::debug!(base, count = names.len(), "Discovered service providers");

			Ok::<_, RegistryError>(DiscoveredRange {
				base,
				entries: names
					.into_iter()
					.map(|name| RegistryEntry::new(ProviderDescriptor::DiscoveredRef(name)))
					.collect(),
			})
		})?;

		Ok(Some(range))
	}

	fn next_explicit_key(&self) -> usize {
		self.entries
			.last_key_value()
			.map_or(0, |(key, _)| key + 1)
	}

	fn insert_next(&mut self, descriptor: ProviderDescriptor) -> usize {
		let mut key = self.next_explicit_key();
		if let Some(range) = self.discovered.get() {
			key = key.max(range.keys().end);
		}

		tracing::debug!(key, descriptor = ?descriptor, "Pushed service provider");
		self.entries.insert(key, RegistryEntry::new(descriptor));
		key
	}
}

impl Default for Registry {
	fn default() -> Self {
		Self::new(Arc::new(ProviderCatalog::new()), Vec::new())
	}
}

impl fmt::Debug for Registry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Registry")
			.field("catalog", &self.catalog)
			.field("entries", &self.entries)
			.field("discovery", &self.discovery.is_some())
			.field("discovered", &self.discovered.get().map(DiscoveredRange::keys))
			.finish()
	}
}

/// Iterator over the explicit entries of a [`Registry`].
///
/// Yields each key with the result of resolving its provider.
pub struct Iter<'a> {
	registry: &'a Registry,
	entries: btree_map::Iter<'a, usize, RegistryEntry>,
}

impl Iterator for Iter<'_> {
	type Item = (usize, Result<Arc<dyn ServiceProvider>, RegistryError>);

	fn next(&mut self) -> Option<Self::Item> {
		let (&key, entry) = self.entries.next()?;
		let provider = entry
			.resolve(key, &self.registry.catalog)
			.map(Arc::clone)
			.map_err(RegistryError::from);
		Some((key, provider))
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		self.entries.size_hint()
	}
}

impl<'a> IntoIterator for &'a Registry {
	type Item = (usize, Result<Arc<dyn ServiceProvider>, RegistryError>);
	type IntoIter = Iter<'a>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

/// Builder for a [`Registry`].
pub struct RegistryBuilder {
	catalog: Arc<ProviderCatalog>,
	descriptors: Vec<ProviderDescriptor>,
	discovery: Option<Box<dyn DiscoveryInterface>>,
}

impl RegistryBuilder {
	/// Creates a builder resolving classes against `catalog`.
	pub fn new(catalog: Arc<ProviderCatalog>) -> Self {
		Self {
			catalog,
			descriptors: Vec::new(),
			discovery: None,
		}
	}

	/// Adds one descriptor.
	pub fn provider(mut self, descriptor: impl Into<ProviderDescriptor>) -> Self {
		self.descriptors.push(descriptor.into());
		self
	}

	/// Adds descriptors in order.
	pub fn providers(mut self, descriptors: impl IntoIterator<Item = ProviderDescriptor>) -> Self {
		self.descriptors.extend(descriptors);
		self
	}

	/// Sets the discovery implementation.
	pub fn discovery(mut self, discovery: Box<dyn DiscoveryInterface>) -> Self {
		self.discovery = Some(discovery);
		self
	}

	/// Builds the registry.
	pub fn build(self) -> Registry {
		let registry = Registry::new(self.catalog, self.descriptors);
		match self.discovery {
			Some(discovery) => registry.with_discovery(discovery),
			None => registry,
		}
	}
}
