#![deny(unsafe_code)]

//! Parser for the TL interface-description language.
//!
//! # This Is Just a Grammar
//!
//! This crate turns schema text into [`RawDefinition`] records and wire-type
//! tokens into [`TypeExpr`] trees. It does not resolve types, build shapes,
//! or generate anything; downstream crates consume the validated form and
//! never re-slice raw strings.
//!
//! The accepted subset is what the reference schemas actually use:
//!
//! ```text
//! // LAYER 181
//! msg#abcdef01 text:string = Message;
//! message#5a1b3e42 flags:# id:int reply:flags.1?Message = Message;
//! ---functions---
//! messages.sendMessage#fa88427a peer:InputPeer message:string = Updates;
//! invokeAfterMsg#cb9f372d {X:Type} msg_id:long query:!X = X;
//! ```
//!
//! `//` comments and blank lines are skipped; `---functions---` /
//! `---types---` flip the definition kind; a `{X:Type}` binder marks the
//! definition generic without contributing a parameter. Bare non-`name:type`
//! tokens (the builtin `vector` line's `# [ t ]`) are tolerated and skipped;
//! that line's tag is on the denylist and never reaches generation.
//!
//! Explicit tags are required. The reference schemas always carry them; a
//! line without one is a [`ParseError`], not a silently computed checksum.

use std::fmt;

use tl_schema::{DefinitionKind, QualifiedName, RawDefinition, RawParam, ScalarKind, Tag, TypeExpr};
use tracing::debug;

/// Everything extracted from one schema file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaFile {
    /// Definitions in encounter order, constructors and functions mixed as
    /// the section markers dictate.
    pub definitions: Vec<RawDefinition>,
    /// The `// LAYER <n>` marker, if the schema carries one.
    pub layer: Option<u32>,
}

/// A malformed schema line, positioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// 1-based source line.
    pub line: usize,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The line does not end with `;`.
    MissingTerminator,
    /// No `= ResultType` part.
    MissingResultType,
    /// No `name#tag` head.
    MissingTag { name: String },
    /// The `#tag` part is not 32-bit hex.
    InvalidTag { name: String, token: String },
    /// A `name:type` param whose type token fails the wire-type grammar.
    MalformedParam { param: String, error: TypeExprError },
    /// Nothing before the `=`.
    EmptyDefinition,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: ", self.line)?;
        match &self.kind {
            ParseErrorKind::MissingTerminator => write!(f, "definition does not end with `;`"),
            ParseErrorKind::MissingResultType => write!(f, "definition has no `= ResultType`"),
            ParseErrorKind::MissingTag { name } => {
                write!(f, "definition `{name}` has no `#tag`")
            }
            ParseErrorKind::InvalidTag { name, token } => {
                write!(f, "definition `{name}` has invalid tag `{token}`")
            }
            ParseErrorKind::MalformedParam { param, error } => {
                write!(f, "param `{param}`: {error}")
            }
            ParseErrorKind::EmptyDefinition => write!(f, "definition has no name"),
        }
    }
}

impl std::error::Error for ParseError {}

/// A wire-type token that fails the grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExprError {
    Empty,
    /// `vector<` without a closing `>`.
    UnclosedVector { token: String },
    /// `vector<vector<…>>`: the grammar is single-level.
    NestedVector { token: String },
    /// A `?` without a leading `field.bit` gate.
    MalformedFlag { token: String },
    /// A named-type token with characters outside the identifier grammar.
    InvalidName { token: String },
}

impl fmt::Display for TypeExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExprError::Empty => write!(f, "empty wire type"),
            TypeExprError::UnclosedVector { token } => {
                write!(f, "unclosed vector in `{token}`")
            }
            TypeExprError::NestedVector { token } => {
                write!(f, "nested vector in `{token}` (the grammar is single-level)")
            }
            TypeExprError::MalformedFlag { token } => {
                write!(f, "malformed flag gate in `{token}` (expected `field.bit?type`)")
            }
            TypeExprError::InvalidName { token } => {
                write!(f, "`{token}` is not a valid type name")
            }
        }
    }
}

impl std::error::Error for TypeExprError {}

/// Parse a whole schema file.
pub fn parse_schema(text: &str) -> Result<SchemaFile, ParseError> {
    let mut kind = DefinitionKind::Constructor;
    let mut definitions = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        if line == "---functions---" {
            kind = DefinitionKind::Function;
            continue;
        }
        if line == "---types---" {
            kind = DefinitionKind::Constructor;
            continue;
        }
        let definition = parse_definition(line, kind).map_err(|kind| ParseError {
            line: index + 1,
            kind,
        })?;
        definitions.push(definition);
    }

    let layer = extract_layer(text);
    debug!(
        definitions = definitions.len(),
        layer = ?layer,
        "parsed schema"
    );
    Ok(SchemaFile { definitions, layer })
}

/// Parse one definition line (already trimmed, known not to be a comment or
/// section marker).
pub fn parse_definition(line: &str, kind: DefinitionKind) -> Result<RawDefinition, ParseErrorKind> {
    let line = line
        .strip_suffix(';')
        .ok_or(ParseErrorKind::MissingTerminator)?;
    let (lhs, result_type) = line
        .split_once('=')
        .ok_or(ParseErrorKind::MissingResultType)?;
    let result_type = result_type.trim().to_string();
    if result_type.is_empty() {
        return Err(ParseErrorKind::MissingResultType);
    }

    let mut tokens = lhs.split_whitespace();
    let head = tokens.next().ok_or(ParseErrorKind::EmptyDefinition)?;
    let (name, tag) = parse_head(head)?;

    let mut params = Vec::new();
    let mut generic_binder = false;
    for token in tokens {
        if token.starts_with('{') {
            generic_binder = true;
            continue;
        }
        let Some((param_name, raw_type)) = token.split_once(':') else {
            // Bare tokens only occur on the builtin `vector` line, which is
            // denylisted downstream.
            continue;
        };
        let ty = parse_type_expr(raw_type).map_err(|error| ParseErrorKind::MalformedParam {
            param: param_name.to_string(),
            error,
        })?;
        params.push(RawParam {
            name: param_name.to_string(),
            raw_type: raw_type.to_string(),
            ty,
        });
    }

    Ok(RawDefinition {
        kind,
        tag,
        name: QualifiedName::parse(&name),
        params,
        result_type,
        generic_binder,
    })
}

fn parse_head(head: &str) -> Result<(String, Tag), ParseErrorKind> {
    let Some((name, tag)) = head.split_once('#') else {
        return Err(ParseErrorKind::MissingTag {
            name: head.to_string(),
        });
    };
    let raw = u32::from_str_radix(tag, 16).map_err(|_| ParseErrorKind::InvalidTag {
        name: name.to_string(),
        token: tag.to_string(),
    })?;
    Ok((name.to_string(), Tag::new(raw)))
}

/// Parse one wire-type token into the grammar.
pub fn parse_type_expr(token: &str) -> Result<TypeExpr, TypeExprError> {
    if token.is_empty() {
        return Err(TypeExprError::Empty);
    }
    if token == "#" {
        return Ok(TypeExpr::BitmaskMarker);
    }

    if let Some((gate, rest)) = token.split_once('?') {
        let Some((field, bit)) = gate.split_once('.') else {
            return Err(TypeExprError::MalformedFlag {
                token: token.to_string(),
            });
        };
        let bit: u32 = bit.parse().map_err(|_| TypeExprError::MalformedFlag {
            token: token.to_string(),
        })?;
        if !is_ident(field) {
            return Err(TypeExprError::MalformedFlag {
                token: token.to_string(),
            });
        }
        let inner = parse_type_expr(rest)?;
        return Ok(TypeExpr::Flagged {
            field: field.to_string(),
            bit,
            inner: Box::new(inner),
        });
    }

    // `vector` is occasionally lowercase in the lower-level schema.
    let lower = token.to_ascii_lowercase();
    if lower.starts_with("vector<") {
        let Some(element) = token["vector<".len()..].strip_suffix('>') else {
            return Err(TypeExprError::UnclosedVector {
                token: token.to_string(),
            });
        };
        let element = parse_type_expr(element)?;
        if matches!(element, TypeExpr::Vector(_)) {
            return Err(TypeExprError::NestedVector {
                token: token.to_string(),
            });
        }
        return Ok(TypeExpr::Vector(Box::new(element)));
    }

    if let Some(param) = token.strip_prefix('!') {
        if !is_ident(param) {
            return Err(TypeExprError::InvalidName {
                token: token.to_string(),
            });
        }
        return Ok(TypeExpr::GenericArg);
    }

    if let Some(kind) = ScalarKind::from_keyword(token) {
        return Ok(TypeExpr::Scalar(kind));
    }

    if token == "X" {
        return Ok(TypeExpr::GenericResult);
    }

    let (bare, named) = match token.strip_prefix('%') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    let (namespace, name) = match named.split_once('.') {
        Some((ns, name)) => (Some(ns), name),
        None => (None, named),
    };
    if !is_ident(name) || !namespace.map_or(true, is_ident) {
        return Err(TypeExprError::InvalidName {
            token: token.to_string(),
        });
    }
    Ok(TypeExpr::Named {
        namespace: namespace.map(str::to_string),
        name: name.to_string(),
        bare,
    })
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Find the `// LAYER <n>` marker.
///
/// Absence is an explicit `None`, never `0` and never a stale value.
pub fn extract_layer(text: &str) -> Option<u32> {
    for line in text.lines() {
        let Some(rest) = line.trim_start().strip_prefix("//") else {
            continue;
        };
        let Some(number) = rest.trim_start().strip_prefix("LAYER ") else {
            continue;
        };
        let digits: String = number
            .trim_start()
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        if let Ok(layer) = digits.parse() {
            return Some(layer);
        }
    }
    None
}
