//! Common types module for the service provider registry.
//!
//! This module defines the contracts shared by every crate in the workspace:
//! what a service provider is, what a container looks like from the point of
//! view of a factory, how provider classes are registered by name, and how
//! TOML configuration tables are validated.

/// Provider class catalog and constructor registration.
pub mod catalog;
/// Container contract passed through to factories and extensions.
pub mod container;
/// Service provider contract, factories and extensions.
pub mod provider;
/// Base trait for name-addressed implementations.
pub mod registry;
/// Configuration validation types for ensuring type-safe configurations.
pub mod validation;

// Re-export all types for convenient access
pub use catalog::*;
pub use container::*;
pub use provider::*;
pub use registry::*;
pub use validation::*;

/// Asset type under which discovery mechanisms publish service providers.
pub const SERVICE_PROVIDER_ASSET: &str = "service-provider";
