//! Provider catalog and registry assembly.
//!
//! Every bundled provider class is registered once in a process-wide catalog.
//! Registries built from configuration resolve their class references against
//! it.

use provider_config::Config;
use provider_core::{ProviderDescriptor, Registry};
use provider_types::ProviderCatalog;
use std::sync::{Arc, OnceLock};

use crate::providers;

static CATALOG: OnceLock<Arc<ProviderCatalog>> = OnceLock::new();

/// Initialize the global catalog with all bundled provider classes.
pub fn initialize_catalog() -> Arc<ProviderCatalog> {
	let catalog = CATALOG.get_or_init(|| {
		let mut catalog = ProviderCatalog::new();

		for (name, constructor) in providers::get_all_providers() {
			tracing::debug!("Registering provider class: {}", name);
			catalog.register_constructor(name, constructor);
		}

		Arc::new(catalog)
	});
	Arc::clone(catalog)
}

/// Get the global provider catalog.
pub fn get_catalog() -> Arc<ProviderCatalog> {
	initialize_catalog()
}

/// Build a registry from configuration.
///
/// Explicit providers receive keys in configuration order. Unknown classes are
/// rejected here rather than on first access.
pub fn build_registry_from_config(config: &Config) -> Result<Registry, Box<dyn std::error::Error>> {
	let catalog = get_catalog();

	let mut descriptors = Vec::with_capacity(config.providers.len());
	for provider in &config.providers {
		if !catalog.contains(&provider.class) {
			let available: Vec<_> = catalog.names().collect();
			return Err(format!(
				"Unknown provider class '{}'. Available: [{}]",
				provider.class,
				available.join(", ")
			)
			.into());
		}
		descriptors.push(ProviderDescriptor::class_with_args(
			provider.class.as_str(),
			provider.args.clone(),
		));
	}

	let mut builder = Registry::builder(catalog).providers(descriptors);

	if let Some(discovery) = &config.discovery {
		let implementation_config = discovery.primary_config().ok_or_else(|| {
			format!(
				"Primary discovery '{}' not found in implementations",
				discovery.primary
			)
		})?;
		let discovery = provider_discovery::create_discovery(&discovery.primary, implementation_config)?;
		builder = builder.discovery(discovery);
	}

	let registry = builder.build();
	tracing::info!(
		registry = %config.registry.id,
		providers = registry.len(),
		"Built service provider registry"
	);
	Ok(registry)
}
