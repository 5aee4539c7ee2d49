//! Registry entries and their write-once caches.

use crate::ProviderDescriptor;
use once_cell::sync::OnceCell;
use provider_types::{ExtensionMap, FactoryMap, ProviderCatalog, ProviderError, ServiceProvider};
use std::fmt;
use std::sync::Arc;

/// A descriptor together with the values lazily derived from it.
///
/// Each cell is filled at most once. A failed initialization leaves the cell
/// empty so the next access tries again.
pub(crate) struct RegistryEntry {
	descriptor: ProviderDescriptor,
	instance: OnceCell<Arc<dyn ServiceProvider>>,
	factories: OnceCell<Arc<FactoryMap>>,
	extensions: OnceCell<Arc<ExtensionMap>>,
}

impl RegistryEntry {
	pub(crate) fn new(descriptor: ProviderDescriptor) -> Self {
		Self {
			descriptor,
			instance: OnceCell::new(),
			factories: OnceCell::new(),
			extensions: OnceCell::new(),
		}
	}

	/// The descriptor this entry was created from.
	pub fn descriptor(&self) -> &ProviderDescriptor {
		&self.descriptor
	}

	/// Returns true once the provider has been instantiated.
	pub fn is_resolved(&self) -> bool {
		self.instance.get().is_some()
	}

	pub(crate) fn resolve(
		&self,
		key: usize,
		catalog: &ProviderCatalog,
	) -> Result<&Arc<dyn ServiceProvider>, ProviderError> {
		self.instance.get_or_try_init(|| {
			let provider = self.descriptor.instantiate(catalog)?;
			tracing::debug!(key, descriptor = ?self.descriptor, "Resolved service provider");
			Ok(provider)
		})
	}

	pub(crate) fn factories(
		&self,
		key: usize,
		catalog: &ProviderCatalog,
	) -> Result<&Arc<FactoryMap>, ProviderError> {
		self.factories.get_or_try_init(|| {
			let factories = self.resolve(key, catalog)?.register_factories();
			tracing::debug!(key, count = factories.len(), "Registered factories");
			Ok(Arc::new(factories))
		})
	}

	pub(crate) fn extensions(
		&self,
		key: usize,
		catalog: &ProviderCatalog,
	) -> Result<&Arc<ExtensionMap>, ProviderError> {
		self.extensions.get_or_try_init(|| {
			let extensions = self.resolve(key, catalog)?.register_extensions();
			tracing::debug!(key, count = extensions.len(), "Registered extensions");
			Ok(Arc::new(extensions))
		})
	}
}

impl fmt::Debug for RegistryEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RegistryEntry")
			.field("descriptor", &self.descriptor)
			.field("resolved", &self.is_resolved())
			.field("factories", &self.factories.get().is_some())
			.field("extensions", &self.extensions.get().is_some())
			.finish()
	}
}
