//! Resolve command handler

use super::utils::{build_bus, load_catalog, parse_type};
use crate::cli::ResolveArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::OutputWriter;
use serde::Serialize;
use shapeshift_core::TypeDescriptor;

/// Machine-readable answer of the resolve command
#[derive(Debug, Serialize)]
struct Resolution {
    source: String,
    target: String,
    converter: String,
}

/// Handle the resolve command
pub fn handle_resolve(args: ResolveArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let catalog = config
        .types_path(args.types.as_deref())
        .map(load_catalog)
        .transpose()?;
    let bus = build_bus(catalog.as_ref())?;

    let target = parse_type(&args.target, catalog.as_ref())?;
    let source = match &args.source {
        Some(expr) => parse_type(expr, catalog.as_ref())?,
        None => TypeDescriptor::any(),
    };

    let converter = bus.get(&source, &target)?;
    let resolution = Resolution {
        source: source.to_string(),
        target: target.to_string(),
        converter: converter.name().to_string(),
    };

    if output.format() == crate::cli::OutputFormat::Human {
        output.table(&[
            ("source", resolution.source),
            ("target", resolution.target),
            ("converter", resolution.converter),
        ])
    } else {
        output.data(&resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use crate::output::tests::capture;

    fn args(target: &str, source: Option<&str>) -> ResolveArgs {
        ResolveArgs {
            target: target.to_string(),
            source: source.map(str::to_string),
            types: None,
        }
    }

    #[test]
    fn test_resolve_structural_target() {
        let (mut output, buffer) = capture(OutputFormat::Json);
        handle_resolve(args("Set<long>", None), &Config::default(), &mut output).unwrap();
        assert_eq!(
            buffer.contents(),
            "{\"source\":\"any\",\"target\":\"Set<long>\",\"converter\":\"Set<long>\"}\n"
        );
    }

    #[test]
    fn test_resolve_identity_fast_path() {
        let (mut output, buffer) = capture(OutputFormat::Human);
        handle_resolve(args("int", Some("int")), &Config::default(), &mut output).unwrap();
        let text = buffer.contents();
        assert!(text.contains("converter │ identity"), "{}", text);
    }

    #[test]
    fn test_resolve_without_converter_fails() {
        let (mut output, _) = capture(OutputFormat::Json);
        let err = handle_resolve(args("enum", None), &Config::default(), &mut output).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
