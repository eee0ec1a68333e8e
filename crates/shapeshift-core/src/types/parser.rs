//! Type expression parser
//!
//! Grammar:
//!
//! ```text
//! type     := '?' ( 'extends' type )?
//!           | name ( '<' type ( ',' type )* '>' )? ( '[' ']' )*
//! ```
//!
//! Builtin names are matched case-insensitively. Anything else is handed to a
//! [`TypeResolver`], and without one becomes a concrete object type.
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

use super::{TypeDescriptor, TypeKind};
use crate::error::{Error, Result};

/// Resolves names that are not builtin types (records, interfaces, enums)
pub trait TypeResolver {
    fn resolve(&self, name: &str) -> Option<TypeDescriptor>;
}

impl<F> TypeResolver for F
where
    F: Fn(&str) -> Option<TypeDescriptor>,
{
    fn resolve(&self, name: &str) -> Option<TypeDescriptor> {
        self(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token<'a> {
    Name(&'a str),
    Open,
    Close,
    Comma,
    Question,
    Brackets,
}

pub(super) fn parse(expr: &str, resolver: Option<&dyn TypeResolver>) -> Result<TypeDescriptor> {
    let tokens = tokenize(expr)?;
    let mut parser = Parser {
        expr,
        tokens,
        pos: 0,
        resolver,
    };
    let ty = parser.parse_type()?;
    if let Some((offset, token)) = parser.tokens.get(parser.pos) {
        return Err(parser.error(*offset, format!("unexpected {:?}", token)));
    }
    Ok(ty)
}

fn tokenize(expr: &str) -> Result<Vec<(usize, Token<'_>)>> {
    let mut tokens = Vec::new();
    let bytes = expr.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        match c {
            b' ' | b'\t' | b'\n' | b'\r' => i += 1,
            b'<' => {
                tokens.push((i, Token::Open));
                i += 1;
            }
            b'>' => {
                tokens.push((i, Token::Close));
                i += 1;
            }
            b',' => {
                tokens.push((i, Token::Comma));
                i += 1;
            }
            b'?' => {
                tokens.push((i, Token::Question));
                i += 1;
            }
            b'[' => {
                if bytes.get(i + 1) != Some(&b']') {
                    return Err(syntax_error(expr, i, "expected ']'"));
                }
                tokens.push((i, Token::Brackets));
                i += 2;
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                let start = i;
                while i < bytes.len()
                    && (bytes[i].is_ascii_alphanumeric() || matches!(bytes[i], b'_' | b'.' | b'$'))
                {
                    i += 1;
                }
                tokens.push((start, Token::Name(&expr[start..i])));
            }
            _ => {
                let ch = expr[i..].chars().next().unwrap_or('?');
                return Err(syntax_error(expr, i, format!("unexpected character '{}'", ch)));
            }
        }
    }
    Ok(tokens)
}

fn syntax_error(expr: &str, offset: usize, message: impl Into<String>) -> Error {
    Error::conversion_failed(
        format!("'{}'", expr),
        "type expression",
        format!("at offset {}: {}", offset, message.into()),
    )
}

struct Parser<'a, 'r> {
    expr: &'a str,
    tokens: Vec<(usize, Token<'a>)>,
    pos: usize,
    resolver: Option<&'r dyn TypeResolver>,
}

impl<'a, 'r> Parser<'a, 'r> {
    fn error(&self, offset: usize, message: impl Into<String>) -> Error {
        syntax_error(self.expr, offset, message)
    }

    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|(o, _)| *o)
            .unwrap_or(self.expr.len())
    }

    fn next(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.pos).map(|(_, t)| t.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn parse_type(&mut self) -> Result<TypeDescriptor> {
        let offset = self.offset();
        match self.next() {
            Some(Token::Question) => {
                if let Some(Token::Name(word)) = self.peek() {
                    if word.eq_ignore_ascii_case("extends") {
                        self.pos += 1;
                        let bound = self.parse_type()?;
                        return Ok(TypeDescriptor::wildcard_extends(bound));
                    }
                }
                Ok(TypeDescriptor::wildcard())
            }
            Some(Token::Name(name)) => {
                let mut args = Vec::new();
                if self.peek() == Some(&Token::Open) {
                    self.pos += 1;
                    loop {
                        args.push(self.parse_type()?);
                        let offset = self.offset();
                        match self.next() {
                            Some(Token::Comma) => continue,
                            Some(Token::Close) => break,
                            Some(token) => {
                                return Err(self.error(offset, format!("unexpected {:?}", token)))
                            }
                            None => return Err(self.error(offset, "unterminated type arguments")),
                        }
                    }
                }

                let mut ty = self.named(name, args, offset)?;
                while self.peek() == Some(&Token::Brackets) {
                    self.pos += 1;
                    ty = TypeDescriptor::array(ty);
                }
                Ok(ty)
            }
            Some(token) => Err(self.error(offset, format!("unexpected {:?}", token))),
            None => Err(self.error(offset, "expected a type")),
        }
    }

    fn named(&self, name: &str, args: Vec<TypeDescriptor>, offset: usize) -> Result<TypeDescriptor> {
        let kind = match name.to_ascii_lowercase().as_str() {
            "any" => TypeKind::Any,
            "object" => TypeKind::Object(None),
            "boolean" | "bool" => TypeKind::Bool,
            "char" | "character" => TypeKind::Char,
            "byte" => TypeKind::I8,
            "short" => TypeKind::I16,
            "int" | "integer" => TypeKind::I32,
            "long" => TypeKind::I64,
            "biginteger" | "bigint" => TypeKind::BigInt,
            "float" => TypeKind::F32,
            "double" => TypeKind::F64,
            "number" => TypeKind::Number,
            "string" => TypeKind::String,
            "uuid" => TypeKind::Uuid,
            "uri" | "url" => TypeKind::Url,
            "path" | "file" => TypeKind::Path,
            "enum" => TypeKind::Enum(None),
            "list" => TypeKind::List,
            "set" => TypeKind::Set,
            "array" => TypeKind::Array,
            "map" => TypeKind::Map,
            _ => {
                if !args.is_empty() {
                    return Err(self.error(offset, format!("'{}' does not take type arguments", name)));
                }
                return Ok(self
                    .resolver
                    .and_then(|r| r.resolve(name))
                    .unwrap_or_else(|| TypeDescriptor::object(name)));
            }
        };

        let expected = kind.expected_arity();
        if !args.is_empty() && args.len() != expected {
            return Err(self.error(
                offset,
                format!(
                    "'{}' expects {} type argument(s), found {}",
                    name,
                    expected,
                    args.len()
                ),
            ));
        }
        Ok(TypeDescriptor::new(kind, args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        assert_eq!(TypeDescriptor::parse("int").unwrap(), TypeDescriptor::i32());
        assert_eq!(TypeDescriptor::parse("Integer").unwrap(), TypeDescriptor::i32());
        assert_eq!(TypeDescriptor::parse("double").unwrap(), TypeDescriptor::f64());
        assert_eq!(TypeDescriptor::parse("URI").unwrap(), TypeDescriptor::url());
        assert_eq!(TypeDescriptor::parse("File").unwrap(), TypeDescriptor::path());
    }

    #[test]
    fn test_nested_generics() {
        let ty = TypeDescriptor::parse("Map<String, List<? extends Number>>").unwrap();
        assert_eq!(
            ty,
            TypeDescriptor::map(
                TypeDescriptor::string(),
                TypeDescriptor::list(TypeDescriptor::wildcard_extends(TypeDescriptor::number()))
            )
        );
    }

    #[test]
    fn test_array_suffix_and_raw() {
        assert_eq!(
            TypeDescriptor::parse("int[][]").unwrap(),
            TypeDescriptor::array(TypeDescriptor::array(TypeDescriptor::i32()))
        );
        assert!(TypeDescriptor::parse("List").unwrap().is_raw());
    }

    #[test]
    fn test_unknown_names_use_resolver() {
        assert_eq!(TypeDescriptor::parse("Pet").unwrap(), TypeDescriptor::object("Pet"));

        let resolver = |name: &str| (name == "Animal").then(|| TypeDescriptor::interface("Animal"));
        assert_eq!(
            TypeDescriptor::parse_with("List<Animal>", &resolver).unwrap(),
            TypeDescriptor::list(TypeDescriptor::interface("Animal"))
        );
    }

    #[test]
    fn test_errors_report_offset() {
        let err = TypeDescriptor::parse("Map<String, int").unwrap_err();
        assert!(err.to_string().contains("offset 15"), "{}", err);

        let err = TypeDescriptor::parse("List<int, int>").unwrap_err();
        assert!(err.to_string().contains("expects 1"), "{}", err);

        assert!(TypeDescriptor::parse("int%").is_err());
        assert!(TypeDescriptor::parse("").is_err());
        assert!(TypeDescriptor::parse("Pet<int>").is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for expr in ["Map<string, List<int>>", "Set<? extends number>", "Array<long>"] {
            assert_eq!(TypeDescriptor::parse(expr).unwrap().to_string(), expr);
        }
    }
}
