//! Shared utilities for command handlers

use crate::cli::InputFormat;
use crate::config::FileSyntax;
use crate::error::{Error, Result};
use shapeshift_core::{ConversionBus, TypeCatalog, TypeDescriptor};
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Load and validate a type catalog written in TOML, YAML or JSON
pub fn load_catalog(path: &Path) -> Result<TypeCatalog> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = fs::read_to_string(path)?;
    let catalog: TypeCatalog = FileSyntax::of(path).parse(&content)?;
    catalog.validate()?;

    debug!(
        path = %path.display(),
        enums = catalog.enums.len(),
        interfaces = catalog.interfaces.len(),
        records = catalog.records.len(),
        "Loaded type catalog"
    );
    Ok(catalog)
}

/// Default registry, extended with the catalog's records when one is given
pub fn build_bus(catalog: Option<&TypeCatalog>) -> Result<ConversionBus> {
    let builder = ConversionBus::builder().with_defaults();
    let builder = match catalog {
        Some(catalog) => catalog.install(builder)?,
        None => builder,
    };
    Ok(builder.build())
}

/// Parse a type expression, resolving catalog names when a catalog is given
pub fn parse_type(expr: &str, catalog: Option<&TypeCatalog>) -> Result<TypeDescriptor> {
    let parsed = match catalog {
        Some(catalog) => catalog.parse_type(expr)?,
        None => expr.parse()?,
    };
    Ok(parsed)
}

/// Read a JSON or YAML document from a file, or from stdin for `-`
pub fn read_document(input: &Path, format: Option<InputFormat>) -> Result<serde_json::Value> {
    if input == Path::new("-") {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        return parse_document(input, &content, format);
    }

    if !input.exists() {
        return Err(Error::FileNotFound {
            path: input.to_path_buf(),
        });
    }
    let content = fs::read_to_string(input)?;
    let format = format.or_else(|| match FileSyntax::of(input) {
        FileSyntax::Yaml => Some(InputFormat::Yaml),
        _ => None,
    });
    parse_document(input, &content, format)
}

/// Parse document text; without an explicit format JSON is tried first,
/// then YAML
pub fn parse_document(
    origin: &Path,
    content: &str,
    format: Option<InputFormat>,
) -> Result<serde_json::Value> {
    let invalid = |expected: &str, message: String| Error::InvalidFormat {
        path: origin.to_path_buf(),
        expected: expected.to_string(),
        message,
    };

    match format {
        Some(InputFormat::Json) => {
            serde_json::from_str(content).map_err(|e| invalid("JSON", e.to_string()))
        }
        Some(InputFormat::Yaml) => {
            serde_yaml::from_str(content).map_err(|e| invalid("YAML", e.to_string()))
        }
        None => serde_json::from_str(content).or_else(|json_err| {
            serde_yaml::from_str(content)
                .map_err(|_| invalid("JSON or YAML", json_err.to_string()))
        }),
    }
}
