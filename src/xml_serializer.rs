//! Output-Baum → XML Serialisierung.
//!
//! Konvertiert den dekodierten [`OutputNode`]-Baum in XML-Text.
//!
//! Vier APIs:
//! - `tree_to_xml()` — gibt XML als String zurueck (Convenience).
//! - `tree_to_xml_writer()` — streamt XML direkt in `impl Write`.
//! - `tree_to_pretty_xml()` / `tree_to_pretty_xml_writer()` — wie oben,
//!   aber mit Einrueckung (2 Spaces).

use std::io::Write;

use crate::error::Error;
use crate::output::OutputNode;
use crate::Result;

/// Serialisiert den Baum als XML-String.
pub fn tree_to_xml(root: &OutputNode) -> Result<String> {
    let mut buf = Vec::new();
    tree_to_xml_writer(root, &mut buf)?;
    String::from_utf8(buf).map_err(|_| Error::IoError("XML output is not valid UTF-8".into()))
}

/// Serialisiert den Baum als pretty-printed XML-String (2 Spaces Einzug).
pub fn tree_to_pretty_xml(root: &OutputNode) -> Result<String> {
    let mut buf = Vec::new();
    tree_to_pretty_xml_writer(root, &mut buf)?;
    String::from_utf8(buf).map_err(|_| Error::IoError("XML output is not valid UTF-8".into()))
}

/// Serialisiert den Baum direkt in einen Writer (Streaming, kein String im RAM).
pub fn tree_to_xml_writer(root: &OutputNode, mut writer: impl Write) -> Result<()> {
    write_node(&mut writer, root)
}

/// Serialisiert den Baum pretty-printed in einen Writer.
pub fn tree_to_pretty_xml_writer(root: &OutputNode, mut writer: impl Write) -> Result<()> {
    write_node_pretty(&mut writer, root, 0)?;
    w(&mut writer, "\n")
}

// ============================================================================
// Hilfsfunktionen
// ============================================================================

/// io::Error → Error Konvertierung.
fn io_err(e: std::io::Error) -> Error {
    Error::IoError(e.to_string())
}

/// Schreibt einen String als Bytes in den Writer.
#[inline]
fn w(writer: &mut impl Write, s: &str) -> Result<()> {
    writer.write_all(s.as_bytes()).map_err(io_err)
}

/// Schreibt Text-Content mit XML-Escaping (`&`, `<`, `>`).
fn write_escaped(writer: &mut impl Write, text: &str) -> Result<()> {
    let mut rest = text;
    while let Some(pos) = rest.find(['&', '<', '>']) {
        w(writer, &rest[..pos])?;
        match rest.as_bytes()[pos] {
            b'&' => w(writer, "&amp;")?,
            b'<' => w(writer, "&lt;")?,
            _ => w(writer, "&gt;")?,
        }
        rest = &rest[pos + 1..];
    }
    w(writer, rest)
}

fn write_node(writer: &mut impl Write, node: &OutputNode) -> Result<()> {
    match &node.text {
        Some(text) => {
            w(writer, "<")?;
            w(writer, &node.name)?;
            w(writer, ">")?;
            write_escaped(writer, text)?;
            w(writer, "</")?;
            w(writer, &node.name)?;
            w(writer, ">")
        }
        None if node.children.is_empty() => {
            w(writer, "<")?;
            w(writer, &node.name)?;
            w(writer, "/>")
        }
        None => {
            w(writer, "<")?;
            w(writer, &node.name)?;
            w(writer, ">")?;
            for child in &node.children {
                write_node(writer, child)?;
            }
            w(writer, "</")?;
            w(writer, &node.name)?;
            w(writer, ">")
        }
    }
}

fn write_node_pretty(writer: &mut impl Write, node: &OutputNode, depth: usize) -> Result<()> {
    let indent = "  ".repeat(depth);
    w(writer, &indent)?;
    match &node.text {
        Some(text) => {
            w(writer, "<")?;
            w(writer, &node.name)?;
            w(writer, ">")?;
            write_escaped(writer, text)?;
            w(writer, "</")?;
            w(writer, &node.name)?;
            w(writer, ">")
        }
        None if node.children.is_empty() => {
            w(writer, "<")?;
            w(writer, &node.name)?;
            w(writer, "/>")
        }
        None => {
            w(writer, "<")?;
            w(writer, &node.name)?;
            w(writer, ">\n")?;
            for child in &node.children {
                write_node_pretty(writer, child, depth + 1)?;
                w(writer, "\n")?;
            }
            w(writer, &indent)?;
            w(writer, "</")?;
            w(writer, &node.name)?;
            w(writer, ">")
        }
    }
}
