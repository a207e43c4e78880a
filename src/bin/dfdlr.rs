//! dfdlr CLI — DFDL-annotiertes XSD + Textdatei → XML.

use clap::{Args, Parser, Subcommand};
use dfdlr::xml_serializer::{tree_to_pretty_xml_writer, tree_to_xml_writer};
use dfdlr::{
    build_model, decode, parse_xsd_with_imports, resolve_global_format, DecodeProperties,
    MaxOccurs, SchemaModel, SchemaNode,
};
use std::io::{IsTerminal, Read, Write};
use std::path::Path;
use std::process;

#[derive(Parser)]
#[command(name = "dfdlr", about = "DFDL-annotated XSD driven text -> XML decoding")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a text data file against a DFDL-annotated schema
    Decode(DecodeArgs),
    /// Print the resolved schema model
    Dump(DumpArgs),
}

#[derive(Args)]
struct DecodeArgs {
    /// Input data file (- for stdin)
    #[arg(short, long)]
    input: String,

    /// Output file (optional; without -o auto-derived, -o - = stdout)
    #[arg(short, long)]
    output: Option<String>,

    /// Schema file (.xsd) with DFDL annotations
    #[arg(short, long)]
    schema: String,

    /// Pretty-printed XML output (2-space indent)
    #[arg(long)]
    pretty: bool,

    /// Transform to apply after decoding (accepted, currently without effect)
    #[arg(long)]
    transform: Option<String>,
}

#[derive(Args)]
struct DumpArgs {
    /// Schema file (.xsd) with DFDL annotations
    #[arg(short, long)]
    schema: String,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Fehler: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Decode(args) => run_decode(args),
        Command::Dump(args) => run_dump(args),
    }
}

/// Lädt Schema, Modell und Format-Properties aus einer XSD-Datei.
///
/// Compile-Befunde werden gemeldet, blockieren aber nicht (nur ein fataler
/// Parse-Fehler bricht ab).
fn load_schema(path: &str) -> Result<(SchemaModel, dfdlr::GlobalFormat), String> {
    let raw = parse_xsd_with_imports(Path::new(path))
        .map_err(|e| format!("Schema-Parse-Fehler: {e}"))?;
    for diagnostic in &raw.diagnostics {
        eprintln!("Schema-Hinweis: {diagnostic}");
    }
    let model = build_model(&raw).map_err(|e| format!("Schema-Fehler: {e}"))?;
    let format =
        resolve_global_format(&raw.format_blocks).map_err(|e| format!("Format-Fehler: {e}"))?;
    Ok((model, format))
}

fn run_decode(args: DecodeArgs) -> Result<(), String> {
    let (model, format) = load_schema(&args.schema)?;

    if args.transform.is_some() {
        // Forward-kompatibler Erweiterungspunkt, per Vertrag ein No-op.
        eprintln!("Hinweis: --transform ist derzeit ohne Wirkung");
    }

    let data = read_input(&args.input)?;
    let decoded = decode(&model, &format, &data).map_err(|e| format!("Decode-Fehler: {e}"))?;
    for warning in &decoded.warnings {
        eprintln!("Decode-Hinweis: {warning}");
    }

    let output_path = resolve_output_path(args.output.as_deref(), &args.input, "xml")?;
    write_to_output(&output_path, |mut writer| {
        let result = if args.pretty {
            tree_to_pretty_xml_writer(&decoded.root, &mut writer)
        } else {
            tree_to_xml_writer(&decoded.root, &mut writer)
        };
        result.map_err(|e| format!("Serialisierungs-Fehler: {e}"))?;
        writer.flush().map_err(|e| format!("Schreibfehler: {e}"))
    })
}

fn run_dump(args: DumpArgs) -> Result<(), String> {
    let (model, format) = load_schema(&args.schema)?;

    let mut out = String::new();
    for root in &model.roots {
        dump_node(root, 0, &mut out);
    }
    if !format.is_empty() {
        out.push_str("format properties:\n");
        for (name, value) in format.iter() {
            out.push_str(&format!("  {name} = {value:?}\n"));
        }
    }
    print!("{out}");
    Ok(())
}

/// Eine Zeile pro Schema-Knoten, eingerückt nach Tiefe.
fn dump_node(node: &SchemaNode, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    match node {
        SchemaNode::Complex(complex) => {
            out.push_str(&format!(
                "{indent}element {}{}\n",
                complex.qname,
                dump_props(&complex.props)
            ));
            dump_node(&complex.content, depth + 1, out);
        }
        SchemaNode::Sequence(items) => {
            out.push_str(&format!("{indent}sequence\n"));
            for item in items {
                dump_node(item, depth + 1, out);
            }
        }
        SchemaNode::Choice(alternatives) => {
            out.push_str(&format!("{indent}choice\n"));
            for alternative in alternatives {
                dump_node(alternative, depth + 1, out);
            }
        }
        SchemaNode::Field(field) => {
            out.push_str(&format!(
                "{indent}field {} kind={}{}\n",
                field.qname,
                field.data_kind,
                dump_props(&field.props)
            ));
        }
        SchemaNode::Ref { qname, target, props } => {
            out.push_str(&format!(
                "{indent}ref {qname} -> {target}{}\n",
                dump_props(props)
            ));
        }
    }
}

fn dump_props(props: &DecodeProperties) -> String {
    let mut parts = Vec::new();
    if let Some(initiator) = &props.initiator {
        parts.push(format!("initiator={initiator:?}"));
    }
    if let Some(terminator) = &props.terminator {
        parts.push(format!("terminator={terminator:?}"));
    }
    if let Some(length) = props.length {
        parts.push(format!("length={length}"));
    }
    let occurs = match props.max_occurs {
        MaxOccurs::Bounded(max) => format!("occurs={}..{max}", props.min_occurs),
        MaxOccurs::Unbounded => format!("occurs={}..*", props.min_occurs),
    };
    parts.push(occurs);
    format!(" [{}]", parts.join(" "))
}

fn read_input(path: &str) -> Result<String, String> {
    if path == "-" {
        if std::io::stdin().is_terminal() {
            eprintln!("Lese von stdin (Ctrl+D zum Beenden)...");
        }
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("Lesefehler (stdin): {e}"))?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).map_err(|e| format!("Lesefehler '{}': {e}", path))
    }
}

/// Erstellt einen BufWriter fuer stdout oder eine Datei.
fn create_buf_writer(path: &str) -> Result<std::io::BufWriter<Box<dyn Write>>, String> {
    if path == "-" {
        Ok(std::io::BufWriter::new(Box::new(std::io::stdout())))
    } else {
        let file = std::fs::File::create(path).map_err(|e| format!("Schreibfehler: {e}"))?;
        Ok(std::io::BufWriter::new(Box::new(file)))
    }
}

/// Schreibt Output entweder nach stdout ("-") oder atomar in eine Datei
/// (tmp+rename).
fn write_to_output(
    output_path: &str,
    write_fn: impl FnOnce(std::io::BufWriter<Box<dyn Write>>) -> Result<(), String>,
) -> Result<(), String> {
    if output_path == "-" {
        return write_fn(create_buf_writer("-")?);
    }

    let tmp_path = format!("{output_path}.tmp");
    let writer = create_buf_writer(&tmp_path)?;
    if let Err(e) = write_fn(writer) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e);
    }
    std::fs::rename(&tmp_path, output_path).map_err(|e| format!("Rename-Fehler: {e}"))
}

/// Leitet den Output-Pfad aus der Eingabe und der gewuenschten Extension ab.
///
/// Bei explizitem `-o` wird dieser Pfad direkt verwendet. Ohne `-o` wird
/// die Extension der Eingabedatei ersetzt (bzw. angehaengt wenn keine
/// vorhanden).
fn resolve_output_path(explicit: Option<&str>, input: &str, ext: &str) -> Result<String, String> {
    if let Some(path) = explicit {
        return Ok(path.to_string());
    }
    if input == "-" {
        return Err("ohne -o braucht es eine Eingabedatei (nicht stdin)".into());
    }
    let path = std::path::Path::new(input);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| "ungueltiger Eingabepfad".to_string())?;
    let parent = path.parent().unwrap_or_else(|| std::path::Path::new(""));
    Ok(parent
        .join(format!("{stem}.{ext}"))
        .to_string_lossy()
        .to_string())
}
