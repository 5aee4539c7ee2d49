//! Main entry point for the service provider registry.
//!
//! This binary loads a registry configuration, assembles the registry from
//! the bundled provider classes and an optional discovery implementation, and
//! lets the operator inspect providers or invoke a single factory or
//! extension.

use clap::{Parser, Subcommand};
use provider_config::Config;
use provider_core::{ProviderDescriptor, Registry, RegistryError};
use provider_types::{MapContainer, ServiceValue};
use serde::Serialize;
use std::path::PathBuf;

mod catalog;
mod providers;

/// Command-line arguments for the registry service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// List explicit and discovered providers with their services
	List {
		/// Print the listing as JSON
		#[arg(long)]
		json: bool,
	},
	/// Build a service with the factory of one provider
	Create { key: usize, service: String },
	/// Apply the extension of one provider to a service
	Extend { key: usize, service: String },
}

/// Description of one registry entry as printed by `list`.
#[derive(Debug, Serialize, PartialEq)]
struct ProviderSummary {
	key: usize,
	source: &'static str,
	class: String,
	factories: Vec<String>,
	extensions: Vec<String>,
}

/// Main entry point for the registry service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the registry with the bundled providers
/// 5. Runs the requested command
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.with_writer(std::io::stderr)
		.init();

	let config = Config::from_file(&args.config).await?;
	tracing::info!("Loaded configuration [{}]", config.registry.id);

	let registry = catalog::build_registry_from_config(&config)?;

	match args.command {
		Command::List { json } => {
			let summaries = summarize(&registry)?;
			if json {
				println!("{}", serde_json::to_string_pretty(&summaries)?);
			} else {
				for summary in &summaries {
					println!(
						"{:>3}  {:<10}  {:<12}  factories: [{}]  extensions: [{}]",
						summary.key,
						summary.source,
						summary.class,
						summary.factories.join(", "),
						summary.extensions.join(", ")
					);
				}
			}
		},
		Command::Create { key, service } => {
			let value = registry.create_service(key, &service, &MapContainer::new())?;
			println!("{}", render_value(&value));
		},
		Command::Extend { key, service } => {
			let container = MapContainer::new();
			let previous = base_service(&registry, &service, &container)?;
			let value = registry.extend_service(key, &service, &container, previous)?;
			println!("{}", render_value(&value));
		},
	}

	Ok(())
}

/// Describes every explicit and discovered provider in key order.
fn summarize(registry: &Registry) -> Result<Vec<ProviderSummary>, RegistryError> {
	let discovered = registry.discovered()?;

	registry
		.keys()
		.map(|key| (key, "explicit"))
		.chain(discovered.map(|key| (key, "discovered")))
		.map(|(key, source)| {
			let class = match registry.descriptor(key)? {
				ProviderDescriptor::Instance(_) => "<instance>".to_string(),
				descriptor => descriptor.class_name().unwrap_or_default().to_string(),
			};

			let mut factories: Vec<_> = registry.get_factories(key)?.keys().cloned().collect();
			factories.sort();
			let mut extensions: Vec<_> = registry.get_extensions(key)?.keys().cloned().collect();
			extensions.sort();

			Ok::<_, RegistryError>(ProviderSummary {
				key,
				source,
				class,
				factories,
				extensions,
			})
		})
		.collect()
}

/// Builds the value an extension decorates: the service from the first
/// provider, in key order, with a factory for it.
fn base_service(
	registry: &Registry,
	service: &str,
	container: &MapContainer,
) -> Result<Option<ServiceValue>, RegistryError> {
	let keys: Vec<_> = registry.keys().chain(registry.discovered()?).collect();
	for key in keys {
		if registry.get_factories(key)?.contains_key(service) {
			return registry.create_service(key, service, container).map(Some);
		}
	}
	Ok(None)
}

/// Formats a service value for display.
fn render_value(value: &ServiceValue) -> String {
	if let Some(text) = value.downcast_ref::<String>() {
		text.clone()
	} else if let Some(number) = value.downcast_ref::<i64>() {
		number.to_string()
	} else if let Some(flag) = value.downcast_ref::<bool>() {
		flag.to_string()
	} else if let Some(toml::Value::Table(table)) = value.downcast_ref::<toml::Value>() {
		toml::to_string(table).unwrap_or_else(|_| "<unprintable table>".to_string())
	} else if let Some(toml_value) = value.downcast_ref::<toml::Value>() {
		toml_value.to_string()
	} else {
		"<opaque service value>".to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use provider_types::service_value;

	fn registry() -> Registry {
		let config: Config = r#"
[registry]
id = "test"

[[providers]]
class = "greeting"
args = ["Ada"]

[[providers]]
class = "settings"
args = [{ level = 3 }]

[discovery]
primary = "static"
[discovery.implementations.static]
providers = ["greeting"]
"#
		.parse()
		.unwrap();
		catalog::build_registry_from_config(&config).unwrap()
	}

	#[test]
	fn test_summarize_lists_explicit_then_discovered() {
		let summaries = summarize(&registry()).unwrap();

		assert_eq!(summaries.len(), 3);
		assert_eq!(
			summaries[0],
			ProviderSummary {
				key: 0,
				source: "explicit",
				class: "greeting".to_string(),
				factories: vec!["greeting.message".to_string(), "greeting.name".to_string()],
				extensions: vec!["greeting.message".to_string()],
			}
		);
		assert_eq!(summaries[1].class, "settings");
		assert_eq!(summaries[1].factories, vec!["settings", "settings.level"]);
		assert_eq!(summaries[2].key, 2);
		assert_eq!(summaries[2].source, "discovered");
	}

	#[test]
	fn test_summary_json_shape() {
		let summaries = summarize(&registry()).unwrap();
		let json = serde_json::to_value(&summaries[2]).unwrap();
		assert_eq!(json["source"], "discovered");
		assert_eq!(json["class"], "greeting");
	}

	#[test]
	fn test_extend_uses_first_factory() {
		let registry = registry();
		let container = MapContainer::new();

		let previous = base_service(&registry, "greeting.message", &container)
			.unwrap()
			.unwrap();
		assert_eq!(render_value(&previous), "Hello, Ada!");

		let extended = registry
			.extend_service(2, "greeting.message", &container, Some(previous))
			.unwrap();
		assert_eq!(render_value(&extended), "HELLO, ADA!");

		assert!(base_service(&registry, "missing", &container).unwrap().is_none());
	}

	#[test]
	fn test_render_value() {
		assert_eq!(render_value(&service_value(7_i64)), "7");
		assert_eq!(render_value(&service_value(true)), "true");
		assert_eq!(render_value(&service_value(toml::Value::Integer(3))), "3");
		assert_eq!(render_value(&service_value(1.5_f32)), "<opaque service value>");

		let table: toml::Table = toml::from_str("level = 3").unwrap();
		assert_eq!(
			render_value(&service_value(toml::Value::Table(table))),
			"level = 3\n"
		);
	}
}
