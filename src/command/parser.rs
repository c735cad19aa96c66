//! Command file parser
//!
//! Grammar:
//! ```text
//! statement     := query-stmt | purchase-stmt
//! query-stmt    := "query:" WS store-id "," field "=" value WS ";"
//! purchase-stmt := "purchase:" WS json-object WS ";"
//! ```
//!
//! Parsing never fails as a whole. A statement that does not match the
//! grammar is dropped and reported as a [`ParseDiagnostic`]; everything
//! else is returned in source order.

use serde_json::Value;
use std::fmt;
use std::io;
use std::path::Path;
use thiserror::Error;

use super::{Command, StoreId};
use crate::common::{Error, Result};

const QUERY_TAG: &str = "query:";
const PURCHASE_TAG: &str = "purchase:";

/// Why a statement was dropped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("expected ',' between store id and filter")]
    MissingComma,

    #[error("expected '=' between field and value")]
    MissingEquals,

    #[error("store id '{0}' is not an integer")]
    InvalidStoreId(String),

    #[error("purchase body is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("purchase body must be a JSON object")]
    NotAnObject,

    #[error("statement must start with 'query:' or 'purchase:'")]
    UnknownTag,
}

/// A dropped statement and where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct ParseDiagnostic {
    /// 1-based ordinal among the non-empty statements of the file
    pub index: usize,
    /// 1-based line on which the statement starts
    pub line: usize,
    /// The trimmed statement text
    pub statement: String,
    pub kind: ParseErrorKind,
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "statement {} (line {}): {}",
            self.index, self.line, self.kind
        )
    }
}

/// Everything the parser got out of a command file
#[derive(Debug, Default)]
pub struct ParsedCommands {
    pub commands: Vec<Command>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

/// A raw statement with its starting line
#[derive(Debug)]
struct Statement<'a> {
    text: &'a str,
    line: usize,
}

/// Parse the full text of a command file
pub fn parse_commands(source: &str) -> ParsedCommands {
    let mut parsed = ParsedCommands::default();

    for (i, statement) in split_statements(source).into_iter().enumerate() {
        match parse_statement(statement.text) {
            Ok(command) => parsed.commands.push(command),
            Err(kind) => {
                let diagnostic = ParseDiagnostic {
                    index: i + 1,
                    line: statement.line,
                    statement: statement.text.to_string(),
                    kind,
                };
                tracing::warn!("Dropping malformed {}", diagnostic);
                parsed.diagnostics.push(diagnostic);
            }
        }
    }

    parsed
}

/// Read and parse a command file
///
/// A missing file is treated as an empty one.
pub fn parse_file(path: &Path) -> Result<ParsedCommands> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(parse_commands(&content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!("Command file '{}' not found", path.display());
            Ok(ParsedCommands::default())
        }
        Err(e) => Err(Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        }),
    }
}

/// Parse a single statement, without its terminating `;`
pub fn parse_statement(statement: &str) -> std::result::Result<Command, ParseErrorKind> {
    let statement = statement.trim();

    if let Some(body) = statement.strip_prefix(QUERY_TAG) {
        parse_query(body)
    } else if let Some(body) = statement.strip_prefix(PURCHASE_TAG) {
        parse_purchase(body)
    } else {
        Err(ParseErrorKind::UnknownTag)
    }
}

fn parse_query(body: &str) -> std::result::Result<Command, ParseErrorKind> {
    let (store, filter) = body.split_once(',').ok_or(ParseErrorKind::MissingComma)?;

    let store = store.trim();
    let store = store
        .parse::<i64>()
        .map(StoreId)
        .map_err(|_| ParseErrorKind::InvalidStoreId(store.to_string()))?;

    let (field, value) = filter
        .split_once('=')
        .ok_or(ParseErrorKind::MissingEquals)?;

    Ok(Command::Query {
        store,
        field: field.trim().to_string(),
        value: value.trim().to_string(),
    })
}

fn parse_purchase(body: &str) -> std::result::Result<Command, ParseErrorKind> {
    match serde_json::from_str::<Value>(body.trim()) {
        Ok(Value::Object(payload)) => Ok(Command::Purchase { payload }),
        Ok(_) => Err(ParseErrorKind::NotAnObject),
        Err(e) => Err(ParseErrorKind::InvalidJson(e.to_string())),
    }
}

/// Split source text on `;` into trimmed, non-empty statements
///
/// A `;` inside a JSON string of a purchase statement does not end the
/// statement. JSON strings cannot span lines, so if a quote is still open at
/// the end of its line (or of the input) the first `;` seen inside it ends the
/// statement after all and scanning resumes right after it.
fn split_statements(source: &str) -> Vec<Statement<'_>> {
    let bytes = source.as_bytes();
    let mut statements = Vec::new();
    let mut start = 0;
    let mut pos = 0;
    let mut in_string = false;
    let mut escaped = false;
    let mut quoted_semicolon: Option<usize> = None;
    // Whether the current statement is a purchase, decided at its first quote
    let mut purchase: Option<bool> = None;

    loop {
        if pos >= bytes.len() {
            match quoted_semicolon.take() {
                Some(split) if in_string => {
                    in_string = false;
                    push_statement(&mut statements, source, start, split);
                    start = split + 1;
                    pos = split + 1;
                    purchase = None;
                    continue;
                }
                _ => break,
            }
        }

        let b = bytes[pos];
        if in_string {
            match b {
                b'\n' => {
                    in_string = false;
                    if let Some(split) = quoted_semicolon.take() {
                        push_statement(&mut statements, source, start, split);
                        start = split + 1;
                        pos = split + 1;
                        purchase = None;
                        continue;
                    }
                }
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => {
                    in_string = false;
                    quoted_semicolon = None;
                }
                b';' if quoted_semicolon.is_none() => quoted_semicolon = Some(pos),
                _ => {}
            }
            pos += 1;
            continue;
        }

        match b {
            b'"' => {
                let is_purchase = *purchase.get_or_insert_with(|| {
                    source[start..pos].trim_start().starts_with(PURCHASE_TAG)
                });
                if is_purchase {
                    in_string = true;
                    escaped = false;
                }
            }
            b';' => {
                push_statement(&mut statements, source, start, pos);
                start = pos + 1;
                purchase = None;
            }
            _ => {}
        }
        pos += 1;
    }
    push_statement(&mut statements, source, start, bytes.len());

    statements
}

fn push_statement<'a>(
    statements: &mut Vec<Statement<'a>>,
    source: &'a str,
    start: usize,
    end: usize,
) {
    let segment = &source[start..end];
    let text = segment.trim();
    if text.is_empty() {
        return;
    }
    let offset = start + (segment.len() - segment.trim_start().len());
    statements.push(Statement {
        text,
        line: 1 + source[..offset].matches('\n').count(),
    });
}
