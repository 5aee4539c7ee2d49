//! Service providers bundled with the registry binary.

use provider_types::{ImplementationRegistry, ProviderConstructor};

pub mod greeting;
pub mod settings;

/// Get all registered provider classes.
///
/// Returns a vector of (name, constructor) tuples for every bundled provider.
pub fn get_all_providers() -> Vec<(&'static str, ProviderConstructor)> {
	vec![
		(greeting::Registry::NAME, greeting::Registry::factory()),
		(settings::Registry::NAME, settings::Registry::factory()),
	]
}
