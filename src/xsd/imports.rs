//! Laden von Schema-Dateien mit `xs:import` / `xs:include` Auflösung.
//!
//! Die Import-/Include-Ziele tragen per Konvention die DFDL-Format-Blöcke
//! (`dfdl:defineEscapeScheme` / `dfdl:defineFormat`) in ihren
//! `xs:annotation`/`xs:appinfo` Abschnitten; Element-Deklarationen liefert
//! nur das Haupt-Schema. Relative `schemaLocation`-Pfade werden vom
//! Verzeichnis des jeweils einbindenden Schemas aufgelöst, zirkuläre
//! Einbindungen werden erkannt und übersprungen.

use std::path::{Path, PathBuf};

use roxmltree::{Document, Node, ParsingOptions};

use crate::error::{Diagnostic, Error, Result};
use crate::xsd::{collect_format_blocks, FormatBlock, RawSchema, MAX_XSD_SIZE, XS_NS};
use crate::FastHashMap;

/// Parsed ein XSD-Dokument von Platte, inklusive Import-/Include-Zielen.
///
/// # Beispiel
///
/// ```no_run
/// use std::path::Path;
/// use dfdlr::parse_xsd_with_imports;
///
/// let raw = parse_xsd_with_imports(Path::new("feed.xsd")).unwrap();
/// ```
pub fn parse_xsd_with_imports(xsd_path: &Path) -> Result<RawSchema> {
    let content = read_schema_file(xsd_path)?;
    let mut raw = super::parse_xsd(&content)?;

    let mut ctx = ImportContext::new();
    let canonical = canonicalize(xsd_path)?;
    ctx.loaded.insert(canonical.clone(), raw.target_namespace.clone());

    let base_dir = canonical
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    let targets = {
        let doc = parse_document(&content)?;
        collect_locations(&doc.root_element())
    };
    for target in targets {
        ctx.harvest(&base_dir, &raw.target_namespace, &target)?;
    }

    raw.format_blocks = ctx.blocks;
    raw.diagnostics.extend(ctx.diagnostics);
    Ok(raw)
}

/// Ein `xs:import` / `xs:include` Ziel.
struct IncludeTarget {
    schema_location: String,
    /// true für `xs:include` (gleicher targetNamespace erwartet).
    is_include: bool,
}

/// Rekursions-Zustand über die Einbindungs-Kette.
struct ImportContext {
    /// Bereits geladene Schemas: canonical path → targetNamespace.
    loaded: FastHashMap<PathBuf, String>,
    blocks: Vec<FormatBlock>,
    diagnostics: Vec<Diagnostic>,
}

impl ImportContext {
    fn new() -> Self {
        Self {
            loaded: FastHashMap::default(),
            blocks: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Lädt ein Ziel, sammelt dessen Format-Blöcke ein und rekursiert in
    /// dessen eigene Einbindungen.
    fn harvest(&mut self, base_dir: &Path, parent_ns: &str, target: &IncludeTarget) -> Result<()> {
        let path = base_dir.join(&target.schema_location);
        if !path.exists() {
            return Err(Error::xsd(format!(
                "schema location '{}' not found (resolved to '{}')",
                target.schema_location,
                path.display()
            )));
        }
        let canonical = canonicalize(&path)?;
        if self.loaded.contains_key(&canonical) {
            // Zyklus oder Mehrfach-Einbindung: nur einmal einsammeln, sonst
            // würden die Blöcke als Duplikat-Properties durchschlagen.
            return Ok(());
        }

        let content = read_schema_file(&path)?;
        let (target_ns, nested) = {
            let doc = parse_document(&content)?;
            let root = doc.root_element();
            let target_ns = root.attribute("targetNamespace").unwrap_or("").to_string();
            self.blocks.extend(collect_format_blocks(&root));
            (target_ns, collect_locations(&root))
        };

        if target.is_include && !target_ns.is_empty() && target_ns != parent_ns {
            self.diagnostics.push(Diagnostic::warning(format!(
                "xs:include target '{}' declares targetNamespace '{}', expected '{}'",
                target.schema_location, target_ns, parent_ns
            )));
        }

        self.loaded.insert(canonical.clone(), target_ns.clone());

        let nested_base = canonical
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();
        for nested_target in nested {
            self.harvest(&nested_base, &target_ns, &nested_target)?;
        }
        Ok(())
    }
}

/// Liest eine Schema-Datei mit Größen-Guard.
fn read_schema_file(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::xsd(format!("Cannot read schema '{}': {e}", path.display())))?;
    if content.len() > MAX_XSD_SIZE {
        return Err(Error::xsd(format!(
            "XSD document too large: {} bytes (max {} bytes)",
            content.len(),
            MAX_XSD_SIZE
        )));
    }
    Ok(content)
}

fn canonicalize(path: &Path) -> Result<PathBuf> {
    path.canonicalize()
        .map_err(|e| Error::xsd(format!("Cannot resolve schema path '{}': {e}", path.display())))
}

fn parse_document(content: &str) -> Result<Document<'_>> {
    let xml_opts = ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    let doc = Document::parse_with_options(content, xml_opts)
        .map_err(|e| Error::xsd(format!("XML: {e}")))?;
    let root = doc.root_element();
    if root.tag_name().name() != "schema" || root.tag_name().namespace() != Some(XS_NS) {
        return Err(Error::xsd("Root element must be xs:schema"));
    }
    Ok(doc)
}

/// Sammelt die `schemaLocation`-Ziele eines Schema-Dokuments.
///
/// `xs:import` ohne `schemaLocation` (z.B. für wohlbekannte Namespaces)
/// wird übersprungen.
fn collect_locations(root: &Node) -> Vec<IncludeTarget> {
    root.children()
        .filter(Node::is_element)
        .filter_map(|child| {
            let is_include = match (child.tag_name().namespace(), child.tag_name().name()) {
                (Some(XS_NS), "include") => true,
                (Some(XS_NS), "import") => false,
                _ => return None,
            };
            child.attribute("schemaLocation").map(|loc| IncludeTarget {
                schema_location: loc.to_string(),
                is_include,
            })
        })
        .collect()
}
