//! Numeric coercion rules
//!
//! Pure functions converting numeric or textual input into each numeric kind,
//! and the converters built on them. Integer kinds share one pipeline:
//! integral floats are accepted (within [`EPSILON`]), other numbers are
//! widened and range checked, and text goes through the literal grammar of
//! [`parse_integer_literal`].
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

use super::Converter;
use crate::bus::ConversionBus;
use crate::error::{Error, Result};
use crate::value::Value;

/// Absolute tolerance for treating a float as integral.
///
/// This is the smallest normal `f32`, used as an absolute tolerance: too
/// strict for large magnitudes and too loose near zero. Kept as-is so that
/// results stay compatible with existing data.
pub const EPSILON: f64 = f32::MIN_POSITIVE as f64;

/// Integer kinds sharing the integral coercion pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntKind {
    I8,
    I16,
    I32,
    I64,
    BigInt,
}

impl IntKind {
    pub fn min(self) -> i128 {
        match self {
            IntKind::I8 => i8::MIN as i128,
            IntKind::I16 => i16::MIN as i128,
            IntKind::I32 => i32::MIN as i128,
            IntKind::I64 => i64::MIN as i128,
            IntKind::BigInt => i128::MIN,
        }
    }

    pub fn max(self) -> i128 {
        match self {
            IntKind::I8 => i8::MAX as i128,
            IntKind::I16 => i16::MAX as i128,
            IntKind::I32 => i32::MAX as i128,
            IntKind::I64 => i64::MAX as i128,
            IntKind::BigInt => i128::MAX,
        }
    }

    /// Largest literal accepted with the `u` marker
    fn unsigned_max(self) -> u128 {
        match self {
            IntKind::I8 => u8::MAX as u128,
            IntKind::I16 => u16::MAX as u128,
            IntKind::I32 => u32::MAX as u128,
            IntKind::I64 => u64::MAX as u128,
            IntKind::BigInt => i128::MAX as u128,
        }
    }

    /// Two's complement reinterpretation of an unsigned literal
    fn reinterpret_unsigned(self, v: u128) -> i128 {
        match self {
            IntKind::I8 => v as u8 as i8 as i128,
            IntKind::I16 => v as u16 as i16 as i128,
            IntKind::I32 => v as u32 as i32 as i128,
            IntKind::I64 => v as u64 as i64 as i128,
            IntKind::BigInt => v as i128,
        }
    }

    /// Type suffix letter stripped from literals
    pub fn suffix(self) -> char {
        match self {
            IntKind::I8 => 'b',
            IntKind::I16 => 's',
            IntKind::I32 => 'i',
            IntKind::I64 | IntKind::BigInt => 'l',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            IntKind::I8 => "byte",
            IntKind::I16 => "short",
            IntKind::I32 => "int",
            IntKind::I64 => "long",
            IntKind::BigInt => "biginteger",
        }
    }

    /// Wrap an already range-checked value in this kind's variant
    fn wrap(self, v: i128) -> Value {
        match self {
            IntKind::I8 => Value::I8(v as i8),
            IntKind::I16 => Value::I16(v as i16),
            IntKind::I32 => Value::I32(v as i32),
            IntKind::I64 => Value::I64(v as i64),
            IntKind::BigInt => Value::BigInt(v),
        }
    }

    fn check_range(self, v: i128, original: &dyn std::fmt::Display) -> Result<i128> {
        if v < self.min() || v > self.max() {
            return Err(Error::conversion_failed(
                original,
                self.name(),
                format!(
                    "Value {} is out of range for {} ([{},{}])",
                    v,
                    self.name(),
                    self.min(),
                    self.max()
                ),
            ));
        }
        Ok(v)
    }
}

/// Coerce any numeric or textual value into an integer of `kind`
pub fn to_integer(value: &Value, kind: IntKind) -> Result<i128> {
    match value {
        Value::F32(v) => float_to_integer(*v as f64, kind, value),
        Value::F64(v) => float_to_integer(*v, kind, value),
        Value::String(s) => parse_integer_literal(s, kind),
        other => match other.as_i128() {
            Some(v) => kind.check_range(v, value),
            None => Err(Error::conversion_failed(
                value,
                kind.name(),
                format!("expected a number or numeric text, found {}", value.kind_name()),
            )),
        },
    }
}

fn float_to_integer(v: f64, kind: IntKind, original: &Value) -> Result<i128> {
    if !v.is_finite() {
        return Err(Error::conversion_failed(
            original,
            kind.name(),
            format!("Value {} is not a finite number", v),
        ));
    }

    let magnitude = v.abs();
    if magnitude - magnitude.floor() >= EPSILON {
        return Err(Error::conversion_failed(
            original,
            kind.name(),
            format!(
                "Value {} cannot be represented as {} without loss of precision",
                v,
                kind.name()
            ),
        ));
    }

    let integral = magnitude.floor().copysign(v);
    if integral < kind.min() as f64 || integral >= kind.max() as f64 + 1.0 {
        return Err(Error::conversion_failed(
            original,
            kind.name(),
            format!(
                "Value {} is out of range for {} ([{},{}])",
                v,
                kind.name(),
                kind.min(),
                kind.max()
            ),
        ));
    }
    Ok(integral as i128)
}

/// Parse an integer literal
///
/// The input is lowercased, then read as: optional `+`/`-`, optional radix
/// prefix (`0x` or `#` for hex, `0b` for binary), digits, an optional `u`
/// (unsigned) and an optional type suffix (only the suffix of `kind` is
/// recognized). Unsigned literals may use the full unsigned width of the
/// kind and are reinterpreted as two's complement.
pub fn parse_integer_literal(input: &str, kind: IntKind) -> Result<i128> {
    let lower = input.trim().to_lowercase();
    let invalid = |message: String| Error::coercion_failed(input, kind.name(), message);

    let mut body = lower.as_str();
    if let Some(rest) = body.strip_suffix(kind.suffix()) {
        body = rest;
    }
    let unsigned = match body.strip_suffix('u') {
        Some(rest) => {
            body = rest;
            true
        }
        None => false,
    };

    let negative = if let Some(rest) = body.strip_prefix('-') {
        if unsigned {
            return Err(invalid(
                "Negative numbers cannot be unsigned (both - prefix and u suffix were used)"
                    .to_string(),
            ));
        }
        body = rest;
        true
    } else {
        if let Some(rest) = body.strip_prefix('+') {
            body = rest;
        }
        false
    };

    let (radix, digits) = if let Some(rest) = body.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = body.strip_prefix('#') {
        (16, rest)
    } else if let Some(rest) = body.strip_prefix("0b") {
        (2, rest)
    } else {
        (10, body)
    };

    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return Err(invalid(format!("'{}' is not a valid number", input)));
    }

    let magnitude = u128::from_str_radix(digits, radix)
        .map_err(|e| invalid(format!("'{}' is not a valid number: {}", input, e)))?;

    if unsigned {
        if magnitude > kind.unsigned_max() {
            return Err(Error::conversion_failed(
                input,
                kind.name(),
                format!(
                    "Value {} is out of range for unsigned {} ([0,{}])",
                    magnitude,
                    kind.name(),
                    kind.unsigned_max()
                ),
            ));
        }
        return Ok(kind.reinterpret_unsigned(magnitude));
    }

    // the magnitude of i128::MIN only fits once negated
    let v = if negative {
        0i128.checked_sub_unsigned(magnitude)
    } else {
        i128::try_from(magnitude).ok()
    };
    match v {
        Some(v) => kind.check_range(v, &input),
        None => Err(invalid(format!(
            "'{}' is not a valid number: number too large to fit in target type",
            input
        ))),
    }
}

/// Whether a double keeps its binary exponent when narrowed to `f32`
pub fn fits_f32(v: f64) -> bool {
    if v == 0.0 || !v.is_finite() {
        return true;
    }
    let exponent = ((v.to_bits() >> 52) & 0x7ff) as i32 - 1023;
    (-126..=127).contains(&exponent)
}

/// Coerce any numeric or textual value into a double
pub fn to_f64(value: &Value) -> Result<f64> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            let literal = trimmed
                .strip_suffix(['d', 'D'])
                .unwrap_or(trimmed);
            literal.parse::<f64>().map_err(|e| {
                Error::coercion_failed(s, "double", format!("'{}' is not a valid number: {}", s, e))
            })
        }
        other => other.as_f64().ok_or_else(|| {
            Error::conversion_failed(
                value,
                "double",
                format!("expected a number or numeric text, found {}", value.kind_name()),
            )
        }),
    }
}

/// Coerce any numeric or textual value into a float, refusing exponent loss
pub fn to_f32(value: &Value) -> Result<f32> {
    match value {
        Value::F32(v) => Ok(*v),
        Value::String(s) => {
            let trimmed = s.trim();
            let literal = trimmed
                .strip_suffix(['f', 'F'])
                .unwrap_or(trimmed);
            literal.parse::<f32>().map_err(|e| {
                Error::coercion_failed(s, "float", format!("'{}' is not a valid number: {}", s, e))
            })
        }
        other => {
            let v = other.as_f64().ok_or_else(|| {
                Error::conversion_failed(
                    value,
                    "float",
                    format!("expected a number or numeric text, found {}", value.kind_name()),
                )
            })?;
            if !fits_f32(v) {
                return Err(Error::conversion_failed(
                    value,
                    "float",
                    format!(
                        "Value {} cannot be represented as a float without significant loss of precision",
                        v
                    ),
                ));
            }
            Ok(v as f32)
        }
    }
}

/// Narrowest numeric value holding `value`; numbers pass through unchanged
pub fn to_number(value: &Value) -> Result<Value> {
    if value.is_numeric() {
        return Ok(value.clone());
    }
    let Value::String(s) = value else {
        return Err(Error::conversion_failed(
            value,
            "number",
            format!("expected a number or numeric text, found {}", value.kind_name()),
        ));
    };

    for kind in [IntKind::I32, IntKind::I64, IntKind::BigInt] {
        if let Ok(v) = parse_integer_literal(s, kind) {
            return Ok(kind.wrap(v));
        }
    }
    let trimmed = s.trim();
    if let Some(literal) = trimmed.strip_suffix(['f', 'F']) {
        if let Ok(v) = literal.parse::<f32>() {
            return Ok(Value::F32(v));
        }
    }
    to_f64(value)
        .map(Value::F64)
        .map_err(|_| Error::coercion_failed(s, "number", format!("'{}' is not a valid number", s)))
}

/// Converter for one integer kind
#[derive(Debug, Clone, Copy)]
pub struct IntegerConverter {
    kind: IntKind,
}

impl IntegerConverter {
    pub fn new(kind: IntKind) -> Self {
        Self { kind }
    }
}

impl Converter for IntegerConverter {
    fn read(&self, value: &Value, _bus: &ConversionBus) -> Result<Value> {
        to_integer(value, self.kind).map(|v| self.kind.wrap(v))
    }

    fn name(&self) -> &str {
        self.kind.name()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FloatConverter;

impl Converter for FloatConverter {
    fn read(&self, value: &Value, _bus: &ConversionBus) -> Result<Value> {
        to_f32(value).map(Value::F32)
    }

    fn name(&self) -> &str {
        "float"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DoubleConverter;

impl Converter for DoubleConverter {
    fn read(&self, value: &Value, _bus: &ConversionBus) -> Result<Value> {
        to_f64(value).map(Value::F64)
    }

    fn name(&self) -> &str {
        "double"
    }
}

/// Converter for the abstract numeric target
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberConverter;

impl Converter for NumberConverter {
    fn read(&self, value: &Value, _bus: &ConversionBus) -> Result<Value> {
        to_number(value)
    }

    fn name(&self) -> &str {
        "number"
    }
}
