//! Convert command handler

use super::utils::{build_bus, load_catalog, parse_type, read_document};
use crate::cli::ConvertArgs;
use crate::config::Config;
use crate::error::Result;
use crate::logging::timing::Timer;
use crate::output::{format_value_compact, OutputWriter};
use shapeshift_core::Value;
use tracing::{debug, info};

/// Handle the convert command
///
/// The document is read into raw values, converted to the target type and
/// written back through the same converter, so the printed document shows
/// the normalized form (parsed numbers, canonical enum names, discriminated
/// objects).
pub fn handle_convert(args: ConvertArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("convert", &args.target);

    let catalog = config
        .types_path(args.types.as_deref())
        .map(load_catalog)
        .transpose()?;
    let bus = build_bus(catalog.as_ref())?;
    let target = parse_type(&args.target, catalog.as_ref())?;

    let document = read_document(&args.input, args.input_format)?;
    output.info(&format!(
        "Converting {} to {}",
        format_value_compact(&document),
        target
    ))?;

    let raw = Value::from(document);
    let read_timer = Timer::new("read");
    let converted = bus.convert(&raw, &target)?;
    debug!(
        target = %target,
        elapsed_us = read_timer.elapsed().as_micros() as u64,
        value = %converted,
        "Converted document"
    );
    drop(read_timer);

    let written = bus.serialize(&converted, &target)?;
    info!(target = %target, cached_pairs = bus.cached_pairs(), "Conversion finished");

    output.success(&format!("✓ Converted to {}", target))?;
    output.section("Result")?;
    output.data(&written.to_json()?)
}
