//! Transcript rendering
//!
//! Each result becomes one block:
//! ```text
//! <status-code>
//! <payload as indented JSON | NONE>
//! ;
//! ```
//! Blocks are joined by a single blank line. A `null` body is written as
//! `NONE`, the same as no body at all.

use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter, Serializer};
use serde_json::Value;
use std::io;
use std::path::Path;

use crate::command::CommandResult;
use crate::common::{Error, Result};

/// Written in place of a payload when the call did not succeed
pub const NONE_TOKEN: &str = "NONE";

/// Last line of every block
pub const BLOCK_TERMINATOR: &str = ";";

const BLOCK_SEPARATOR: &str = "\n\n";

/// Render one result as a transcript block
pub fn render(result: &CommandResult) -> String {
    let body = match &result.payload {
        Some(Value::Null) | None => NONE_TOKEN.to_string(),
        Some(payload) => render_payload(payload),
    };
    format!("{}\n{}\n{}", result.status, body, BLOCK_TERMINATOR)
}

/// Pretty-print JSON with two-space indentation, keys in received order and
/// non-ASCII characters escaped
pub fn render_payload(payload: &Value) -> String {
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, AsciiPrettyFormatter::default());
    payload
        .serialize(&mut serializer)
        .expect("serializing a JSON value into memory cannot fail");
    // Every byte written is ASCII
    String::from_utf8_lossy(&out).into_owned()
}

/// Ordered, render-once collection of result blocks
#[derive(Debug, Default)]
pub struct Transcript {
    blocks: Vec<String>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the block for the next result
    pub fn push(&mut self, result: CommandResult) {
        self.blocks.push(render(&result));
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The full transcript text
    pub fn render(&self) -> String {
        self.blocks.join(BLOCK_SEPARATOR)
    }

    /// Write the transcript, replacing any existing file
    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.render()).map_err(|e| Error::FileWrite {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }
}

/// [`PrettyFormatter`] that writes non-ASCII characters as `\uXXXX` escapes
#[derive(Default)]
struct AsciiPrettyFormatter<'a> {
    inner: PrettyFormatter<'a>,
}

impl Formatter for AsciiPrettyFormatter<'_> {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.inner.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object_value(writer)
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut start = 0;
        for (i, c) in fragment.char_indices() {
            if c.is_ascii() {
                continue;
            }
            writer.write_all(fragment[start..i].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                writer.write_all(format!("\\u{unit:04x}").as_bytes())?;
            }
            start = i + c.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}
