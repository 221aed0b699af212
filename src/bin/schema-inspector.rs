//! # Connector Schema Inspector
//!
//! A command-line utility that loads a connector configuration file and
//! prints the object classes and attributes a session built from it would
//! expose, including the configured custom attributes.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin schema-inspector connector.json
//! cargo run --bin schema-inspector connector.json --json
//! ```
//!
//! ## Output Example
//!
//! ```text
//! Inspecting configuration: connector.json
//! ✓ Configuration is valid
//!
//! Object class: user
//!   Attributes: 14
//!   Required: key, username
//!   Multi-valued: attributes.tags, groups
//!   Not returned by default: groups
//! ```
//!
//! ## Exit Codes
//!
//! - `0`: The configuration is valid and the schema was printed
//! - `1`: The configuration could not be read, parsed or validated

use directory_connector::client::InMemoryIdentityService;
use directory_connector::schema::ObjectClassInfo;
use directory_connector::{Connector, ConnectorConfiguration, ConnectorSchema};
use std::env;
use std::path::Path;
use std::process;

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <configuration.json> [--json]", args[0]);
        process::exit(1);
    }

    let path = Path::new(&args[1]);
    let as_json = args.iter().skip(2).any(|arg| arg == "--json");

    match inspect(path).await {
        Ok(schema) if as_json => match serde_json::to_string_pretty(&schema) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("❌ Failed to serialize schema: {}", e);
                process::exit(1);
            }
        },
        Ok(schema) => {
            println!("Inspecting configuration: {}", path.display());
            println!("✓ Configuration is valid");
            for object_class in &schema.object_classes {
                print_object_class_summary(object_class);
            }
        }
        Err(e) => {
            eprintln!("❌ Inspection failed: {}", e);
            process::exit(1);
        }
    }
}

async fn inspect(path: &Path) -> Result<ConnectorSchema, Box<dyn std::error::Error>> {
    let configuration = ConnectorConfiguration::from_file(path)?;

    // The schema does not depend on the remote service
    let mut connector = Connector::new();
    connector
        .init(configuration, InMemoryIdentityService::new())
        .await?;
    let schema = connector.schema()?;
    connector.dispose().await;

    Ok(schema)
}

fn print_object_class_summary(info: &ObjectClassInfo) {
    println!();
    println!("Object class: {}", info.object_class);
    println!("  Attributes: {}", info.attributes.len());

    let names = |predicate: fn(&directory_connector::schema::AttributeInfo) -> bool| {
        info.attributes
            .iter()
            .filter(|attr| predicate(attr))
            .map(|attr| attr.name.as_str())
            .collect::<Vec<_>>()
    };

    let required = names(|attr| attr.required);
    if !required.is_empty() {
        println!("  Required: {}", required.join(", "));
    }
    let multi_valued = names(|attr| attr.multi_valued);
    if !multi_valued.is_empty() {
        println!("  Multi-valued: {}", multi_valued.join(", "));
    }
    let hidden = names(|attr| !attr.returned_by_default);
    if !hidden.is_empty() {
        println!("  Not returned by default: {}", hidden.join(", "));
    }
    let read_only = names(|attr| !attr.creatable && !attr.updateable);
    if !read_only.is_empty() {
        println!("  Read-only: {}", read_only.join(", "));
    }
}
