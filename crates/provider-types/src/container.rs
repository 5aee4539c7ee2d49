//! Container contract.
//!
//! The registry never inspects the container; it only hands it to factories
//! and extensions. The trait follows the usual `get`/`has` container shape so
//! that providers can look up their dependencies.

use crate::ServiceValue;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Errors that can occur when looking up a service in a container.
#[derive(Debug, Error)]
pub enum ContainerError {
	/// No service is registered under the requested identifier.
	#[error("Service '{0}' not found in container")]
	NotFound(String),
}

/// Read access to a dependency-injection container.
pub trait Container: Send + Sync {
	/// Returns the service registered under `id`.
	fn get(&self, id: &str) -> Result<ServiceValue, ContainerError>;

	/// Returns true if a service is registered under `id`.
	fn has(&self, id: &str) -> bool;
}

/// Container backed by a map of ready-made values.
#[derive(Clone, Default)]
pub struct MapContainer {
	services: HashMap<String, ServiceValue>,
}

impl MapContainer {
	/// Creates an empty container.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a service value, replacing any previous value under `id`.
	pub fn with_service(mut self, id: impl Into<String>, value: ServiceValue) -> Self {
		self.services.insert(id.into(), value);
		self
	}
}

impl fmt::Debug for MapContainer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut ids: Vec<_> = self.services.keys().collect();
		ids.sort();
		f.debug_struct("MapContainer").field("services", &ids).finish()
	}
}

impl Container for MapContainer {
	fn get(&self, id: &str) -> Result<ServiceValue, ContainerError> {
		self.services
			.get(id)
			.cloned()
			.ok_or_else(|| ContainerError::NotFound(id.to_string()))
	}

	fn has(&self, id: &str) -> bool {
		self.services.contains_key(id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::service_value;
	use std::sync::Arc;

	#[test]
	fn test_get_and_has() {
		let value = service_value(42_i64);
		let container = MapContainer::new().with_service("answer", value.clone());

		assert!(container.has("answer"));
		assert!(!container.has("question"));
		assert!(Arc::ptr_eq(&container.get("answer").unwrap(), &value));
		assert!(matches!(
			container.get("question"),
			Err(ContainerError::NotFound(id)) if id == "question"
		));
	}
}
