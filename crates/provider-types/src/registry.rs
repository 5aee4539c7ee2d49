//! Registry trait for self-registering implementations.
//!
//! Provider classes and discovery implementations both declare the name they
//! are referenced by and the factory that builds them through this trait.

/// Base trait for implementation registries.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation.
	///
	/// For example:
	/// - "manifest" for `[discovery.implementations.manifest]`
	/// - "greeting" for `[[providers]] class = "greeting"`
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	///
	/// Provider classes use `ProviderConstructor`; discovery implementations
	/// use `DiscoveryFactory`.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}
