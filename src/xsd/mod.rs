//! XSD Schema Loader / Compiler.
//!
//! Parsed XML Schema (XSD) Dateien mit DFDL-Layout-Attributen und konvertiert
//! sie zu einem rohen Objekt-Graph ([`RawSchema`]): Element-Deklarationen mit
//! qualifiziertem Namen, Content-Particle (Sequence/Choice/Element),
//! skalarem Primitivtyp, Occurs-Grenzen und den *nicht* zur Schemasprache
//! gehörenden Decoration-Attributen als Name/Wert-Paare.
//!
//! # Scope
//!
//! - XSD → `RawSchema` Parsing (Elemente, Particles, Typ-Referenzen)
//! - `dfdl:defineEscapeScheme` / `dfdl:defineFormat` Annotation-Blöcke
//!   (über [`parse_xsd_with_imports()`] aus den Import-Zielen eingesammelt)
//!
//! # Out of Scope
//!
//! - Schema-*Validierung* (Facets, Identity Constraints, Substitution Groups)
//! - `xs:attribute` Deklarationen — der Decoder erzeugt keine XML-Attribute,
//!   sie werden mit Warnung übersprungen
//!
//! Nicht-fatale Befunde landen als [`Diagnostic`] im Ergebnis und blockieren
//! das Dekodieren per Vertrag nicht.

mod imports;

pub use imports::parse_xsd_with_imports;

use log::debug;
use roxmltree::{Document, Node, ParsingOptions};

use crate::error::{Diagnostic, Error, Result};
use crate::qname::QName;
use crate::schema::MaxOccurs;

/// XML Schema Namespace.
pub(crate) const XS_NS: &str = "http://www.w3.org/2001/XMLSchema";

/// DFDL 1.0 Namespace (Layout-Decoration-Attribute).
pub const DFDL_NS: &str = "http://www.ogf.org/dfdl/dfdl-1.0/";

/// IBM DFDL Extension Namespace (wird erkannt und ignoriert).
const IBM_DFDL_EXTN_NS: &str = "http://www.ibm.com/dfdl/extensions";

/// Maximale Größe eines XSD-Dokuments (16 MiB) — Eingabegrößenbeschränkung.
pub(crate) const MAX_XSD_SIZE: usize = 16 * 1024 * 1024;

/// XSD Built-in Typ → kleingeschriebener Primitiv-Name des Werts.
///
/// Datengetrieben: ein neuer Built-in ist ein Tabelleneintrag. Nicht
/// gelistete Built-ins fallen auf den kleingeschriebenen lokalen Namen
/// zurück (der Name der zugrundeliegenden Wert-Repräsentation).
const PRIMITIVE_KINDS: &[(&str, &str)] = &[
    ("string", "string"),
    ("normalizedString", "string"),
    ("token", "string"),
    ("boolean", "boolean"),
    ("decimal", "decimal"),
    ("float", "float"),
    ("double", "double"),
    ("integer", "integer"),
    ("nonNegativeInteger", "integer"),
    ("positiveInteger", "integer"),
    ("int", "int"),
    ("unsignedInt", "int"),
    ("long", "long"),
    ("unsignedLong", "long"),
    ("short", "short"),
    ("unsignedShort", "short"),
    ("byte", "byte"),
    ("unsignedByte", "byte"),
    ("date", "date"),
    ("time", "time"),
    ("dateTime", "datetime"),
];

/// Liefert den Daten-Kind-Namen für einen XSD Built-in Typ.
fn primitive_kind(local_name: &str) -> String {
    PRIMITIVE_KINDS
        .iter()
        .find(|(name, _)| *name == local_name)
        .map(|(_, kind)| (*kind).to_string())
        .unwrap_or_else(|| local_name.to_lowercase())
}

// ============================================================================
// Roh-Objekt-Graph
// ============================================================================

/// Ergebnis der Schema-Kompilierung: der rohe Objekt-Graph.
#[derive(Debug, Clone, Default)]
pub struct RawSchema {
    /// `targetNamespace` des Haupt-Schemas (leer wenn nicht deklariert).
    pub target_namespace: String,
    /// Top-Level Element-Deklarationen in Dokument-Reihenfolge.
    pub elements: Vec<RawElement>,
    /// Format-Blöcke aus den Annotationen der Import-/Include-Ziele.
    pub format_blocks: Vec<FormatBlock>,
    /// Nicht-fatale Befunde (Warnungen blockieren das Dekodieren nicht).
    pub diagnostics: Vec<Diagnostic>,
}

/// Art eines Annotation-Format-Blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatBlockKind {
    /// `dfdl:defineEscapeScheme` / `dfdl:escapeScheme`.
    EscapeScheme,
    /// `dfdl:defineFormat` / `dfdl:format`.
    Format,
}

/// Ein Format-Block: die Attribute eines `dfdl:escapeScheme` bzw.
/// `dfdl:format` Elements als ungeordnete Name/Wert-Paare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatBlock {
    pub kind: FormatBlockKind,
    pub attributes: Vec<(String, String)>,
}

/// Eine Element-Deklaration des rohen Graphen.
///
/// Genau eine der drei Typ-Quellen ist gesetzt: `content` (inline complex),
/// `simple_kind` (skalar) oder `type_ref` (Referenz auf eine benannte
/// Definition; auch der Fallback für Elemente ohne jede Typ-Angabe — deren
/// Name referenziert die gleichnamige Top-Level-Definition).
#[derive(Debug, Clone)]
pub struct RawElement {
    /// Lokaler Name.
    pub name: String,
    /// Namespace (targetNamespace des deklarierenden Schemas).
    pub namespace: String,
    /// Inline complex Content (Sequence / Choice / einzelnes Element).
    pub content: Option<RawParticle>,
    /// Primitiv-Name des skalaren Werttyps (kleingeschrieben).
    pub simple_kind: Option<String>,
    /// Referenz auf eine benannte Definition.
    pub type_ref: Option<QName>,
    /// Untere Occurs-Grenze (absent → 0).
    pub min_occurs: usize,
    /// Obere Occurs-Grenze (absent → 1).
    pub max_occurs: MaxOccurs,
    /// Decoration-Attribute (nicht zur Schemasprache gehörend), als
    /// `("dfdl:length", "10")`-artige Paare in Dokument-Reihenfolge.
    pub decoration: Vec<(String, String)>,
}

impl RawElement {
    /// Qualifizierter Name der Deklaration.
    pub fn qname(&self) -> QName {
        QName::new(&self.namespace, &self.name)
    }
}

/// Content-Particle einer complex Deklaration.
#[derive(Debug, Clone)]
pub enum RawParticle {
    /// Geordnete Komposition.
    Sequence(Vec<RawParticle>),
    /// Alternativen, genau eine pro Vorkommen.
    Choice(Vec<RawParticle>),
    /// Kind-Element-Deklaration.
    Element(Box<RawElement>),
}

// ============================================================================
// Parser
// ============================================================================

/// Parsed ein XSD-Dokument zu einem [`RawSchema`].
///
/// Import-/Include-Ziele werden hier *nicht* geladen (kein Dateizugriff);
/// dafür gibt es [`parse_xsd_with_imports()`]. Die `format_blocks` des
/// Ergebnisses sind entsprechend leer.
///
/// # Beispiel
///
/// ```
/// use dfdlr::parse_xsd;
///
/// let xsd = r#"
///     <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
///                targetNamespace="urn:feed">
///         <xs:element name="book" type="xs:string"/>
///     </xs:schema>
/// "#;
///
/// let raw = parse_xsd(xsd).unwrap();
/// assert_eq!(raw.elements.len(), 1);
/// assert_eq!(raw.elements[0].simple_kind.as_deref(), Some("string"));
/// ```
pub fn parse_xsd(xsd_content: &str) -> Result<RawSchema> {
    if xsd_content.len() > MAX_XSD_SIZE {
        return Err(Error::xsd(format!(
            "XSD document too large: {} bytes (max {} bytes)",
            xsd_content.len(),
            MAX_XSD_SIZE
        )));
    }

    let xml_opts = ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    let doc = Document::parse_with_options(xsd_content, xml_opts)
        .map_err(|e| Error::xsd(format!("XML: {e}")))?;

    let root = doc.root_element();
    if root.tag_name().name() != "schema" || root.tag_name().namespace() != Some(XS_NS) {
        return Err(Error::xsd("Root element must be xs:schema"));
    }

    let mut parser = XsdParser::new(root.attribute("targetNamespace").unwrap_or(""));
    parser.parse_schema(&root)?;
    Ok(parser.build())
}

/// Parser-Zustand für ein einzelnes Schema-Dokument.
struct XsdParser {
    target_namespace: String,
    elements: Vec<RawElement>,
    diagnostics: Vec<Diagnostic>,
}

impl XsdParser {
    fn new(target_namespace: &str) -> Self {
        Self {
            target_namespace: target_namespace.to_string(),
            elements: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn build(self) -> RawSchema {
        RawSchema {
            target_namespace: self.target_namespace,
            elements: self.elements,
            format_blocks: Vec::new(),
            diagnostics: self.diagnostics,
        }
    }

    /// Top-Level: alle globalen `xs:element` Deklarationen einsammeln.
    fn parse_schema(&mut self, root: &Node) -> Result<()> {
        for child in root.children().filter(Node::is_element) {
            match (child.tag_name().namespace(), child.tag_name().name()) {
                (Some(XS_NS), "element") => {
                    let elem = self.parse_element(&child)?;
                    self.elements.push(elem);
                }
                (Some(XS_NS), "import" | "include" | "annotation") => {
                    // import/include lädt imports::parse_xsd_with_imports();
                    // Top-Level-Annotationen des Hauptdokuments tragen keine
                    // Format-Blöcke (die liegen per Konvention im Import-Ziel).
                }
                (Some(XS_NS), other) => {
                    self.diagnostics.push(Diagnostic::warning(format!(
                        "unsupported top-level construct xs:{other} skipped"
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Eine `xs:element` Deklaration (global oder lokal).
    fn parse_element(&mut self, node: &Node) -> Result<RawElement> {
        // xs:element ref="tns:foo" — reine Referenz, Name kommt vom Ziel.
        if let Some(reference) = node.attribute("ref") {
            let qname = self.resolve_qname(node, reference)?;
            return Ok(RawElement {
                name: qname.local_name.to_string(),
                namespace: qname.namespace.to_string(),
                content: None,
                simple_kind: None,
                type_ref: Some(qname),
                min_occurs: parse_min_occurs(node)?,
                max_occurs: parse_max_occurs(node)?,
                decoration: collect_decoration(node),
            });
        }

        let name = node
            .attribute("name")
            .ok_or_else(|| Error::xsd("xs:element without name attribute"))?
            .to_string();

        let mut content = None;
        let mut simple_kind = None;
        let mut type_ref = None;

        if let Some(type_attr) = node.attribute("type") {
            let qname = self.resolve_qname(node, type_attr)?;
            if &*qname.namespace == XS_NS {
                simple_kind = Some(primitive_kind(&qname.local_name));
            } else {
                type_ref = Some(qname);
            }
        } else if let Some(inline) = find_xs_child(node, "complexType") {
            content = Some(self.parse_complex_content(&inline)?);
        } else if let Some(inline) = find_xs_child(node, "simpleType") {
            simple_kind = Some(self.parse_simple_type(&inline));
        } else {
            // Keine Typ-Angabe: referenziert die gleichnamige
            // Top-Level-Definition (aufgelöst beim Modell-Aufbau).
            type_ref = Some(QName::new(&self.target_namespace, &name));
        }

        Ok(RawElement {
            name,
            namespace: self.target_namespace.clone(),
            content,
            simple_kind,
            type_ref,
            min_occurs: parse_min_occurs(node)?,
            max_occurs: parse_max_occurs(node)?,
            decoration: collect_decoration(node),
        })
    }

    /// Content-Particle eines `xs:complexType`.
    fn parse_complex_content(&mut self, complex_type: &Node) -> Result<RawParticle> {
        let mut particle = None;
        for child in complex_type.children().filter(Node::is_element) {
            match (child.tag_name().namespace(), child.tag_name().name()) {
                (Some(XS_NS), "sequence") => {
                    particle = Some(RawParticle::Sequence(self.parse_particle_items(&child)?));
                }
                (Some(XS_NS), "choice") => {
                    particle = Some(RawParticle::Choice(self.parse_particle_items(&child)?));
                }
                (Some(XS_NS), "annotation") => {}
                (Some(XS_NS), "attribute") => {
                    self.diagnostics.push(Diagnostic::warning(format!(
                        "xs:attribute '{}' skipped (decoder emits no XML attributes)",
                        child.attribute("name").unwrap_or("?")
                    )));
                }
                (Some(XS_NS), other) => {
                    self.diagnostics.push(Diagnostic::warning(format!(
                        "unsupported content construct xs:{other} skipped"
                    )));
                }
                _ => {}
            }
        }
        // Leerer complexType: leere Sequence, kein Sonderfall im Modell.
        Ok(particle.unwrap_or(RawParticle::Sequence(Vec::new())))
    }

    /// Items einer `xs:sequence` / `xs:choice`.
    fn parse_particle_items(&mut self, group: &Node) -> Result<Vec<RawParticle>> {
        let mut items = Vec::new();
        for child in group.children().filter(Node::is_element) {
            match (child.tag_name().namespace(), child.tag_name().name()) {
                (Some(XS_NS), "element") => {
                    items.push(RawParticle::Element(Box::new(self.parse_element(&child)?)));
                }
                (Some(XS_NS), "sequence") => {
                    items.push(RawParticle::Sequence(self.parse_particle_items(&child)?));
                }
                (Some(XS_NS), "choice") => {
                    items.push(RawParticle::Choice(self.parse_particle_items(&child)?));
                }
                (Some(XS_NS), "annotation") => {}
                (Some(XS_NS), other) => {
                    self.diagnostics.push(Diagnostic::warning(format!(
                        "unsupported particle construct xs:{other} skipped"
                    )));
                }
                _ => {}
            }
        }
        Ok(items)
    }

    /// Primitiv-Name eines inline `xs:simpleType` (über die Restriction-Base).
    fn parse_simple_type(&mut self, simple_type: &Node) -> String {
        if let Some(restriction) = find_xs_child(simple_type, "restriction")
            && let Some(base) = restriction.attribute("base")
        {
            let local = base.rsplit(':').next().unwrap_or(base);
            return primitive_kind(local);
        }
        self.diagnostics.push(Diagnostic::warning(
            "xs:simpleType without restriction base, assuming string",
        ));
        "string".to_string()
    }

    /// Löst einen `prefix:local` Attributwert gegen die Namespace-Bindings
    /// des Knotens auf.
    fn resolve_qname(&self, node: &Node, value: &str) -> Result<QName> {
        match value.split_once(':') {
            Some((prefix, local)) => {
                let uri = node.lookup_namespace_uri(Some(prefix)).ok_or_else(|| {
                    Error::xsd(format!("undeclared namespace prefix '{prefix}' in '{value}'"))
                })?;
                Ok(QName::new(uri, local))
            }
            None => {
                let uri = node
                    .lookup_namespace_uri(None)
                    .unwrap_or(self.target_namespace.as_str());
                Ok(QName::new(uri, value))
            }
        }
    }
}

/// Erstes `xs:`-Kind mit dem gegebenen lokalen Namen.
fn find_xs_child<'a, 'input>(node: &Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .filter(Node::is_element)
        .find(|c| c.tag_name().namespace() == Some(XS_NS) && c.tag_name().name() == name)
}

/// `minOccurs` (absent → 0).
fn parse_min_occurs(node: &Node) -> Result<usize> {
    match node.attribute("minOccurs") {
        None => Ok(0),
        Some(v) => v
            .parse()
            .map_err(|_| Error::xsd(format!("invalid minOccurs '{v}'"))),
    }
}

/// `maxOccurs` (absent → 1, `"unbounded"` → [`MaxOccurs::Unbounded`]).
fn parse_max_occurs(node: &Node) -> Result<MaxOccurs> {
    match node.attribute("maxOccurs") {
        None => Ok(MaxOccurs::Bounded(1)),
        Some("unbounded") => Ok(MaxOccurs::Unbounded),
        Some(v) => v
            .parse()
            .map(MaxOccurs::Bounded)
            .map_err(|_| Error::xsd(format!("invalid maxOccurs '{v}'"))),
    }
}

/// Sammelt Decoration-Attribute (Attribute mit Namespace, also außerhalb der
/// Schemasprache) als Name/Wert-Paare ein.
///
/// DFDL- und IBM-Extension-Attribute behalten ihre gewohnten Präfixe, fremde
/// Namespaces werden in Clark-Notation notiert.
fn collect_decoration(node: &Node) -> Vec<(String, String)> {
    let mut decoration = Vec::new();
    for attr in node.attributes() {
        let name = match attr.namespace() {
            None => continue,
            Some(DFDL_NS) => format!("dfdl:{}", attr.name()),
            Some(IBM_DFDL_EXTN_NS) => format!("ibmDfdlExtn:{}", attr.name()),
            Some(ns) => {
                debug!("foreign decoration attribute {{{ns}}}{} kept verbatim", attr.name());
                format!("{{{ns}}}{}", attr.name())
            }
        };
        decoration.push((name, attr.value().to_string()));
    }
    decoration
}

/// Sammelt die `dfdl:defineEscapeScheme` / `dfdl:defineFormat` Blöcke aus
/// den `xs:annotation`/`xs:appinfo` Abschnitten eines Schema-Dokuments.
///
/// Die Attribute kommen von den *inneren* `dfdl:escapeScheme` /
/// `dfdl:format` Elementen, nicht vom define-Wrapper.
pub(crate) fn collect_format_blocks(root: &Node) -> Vec<FormatBlock> {
    let mut blocks = Vec::new();
    for annotation in root.children().filter(|c| {
        c.is_element()
            && c.tag_name().namespace() == Some(XS_NS)
            && c.tag_name().name() == "annotation"
    }) {
        for appinfo in annotation.children().filter(|c| {
            c.is_element()
                && c.tag_name().namespace() == Some(XS_NS)
                && c.tag_name().name() == "appinfo"
        }) {
            for define in appinfo.children().filter(Node::is_element) {
                let (kind, inner_name) =
                    match (define.tag_name().namespace(), define.tag_name().name()) {
                        (Some(DFDL_NS), "defineEscapeScheme") => {
                            (FormatBlockKind::EscapeScheme, "escapeScheme")
                        }
                        (Some(DFDL_NS), "defineFormat") => (FormatBlockKind::Format, "format"),
                        _ => continue,
                    };
                for inner in define.children().filter(|c| {
                    c.is_element()
                        && c.tag_name().namespace() == Some(DFDL_NS)
                        && c.tag_name().name() == inner_name
                }) {
                    let attributes = inner
                        .attributes()
                        .map(|a| (a.name().to_string(), a.value().to_string()))
                        .collect();
                    blocks.push(FormatBlock { kind, attributes });
                }
            }
        }
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED_XSD: &str = r#"
        <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
                   xmlns:dfdl="http://www.ogf.org/dfdl/dfdl-1.0/"
                   targetNamespace="urn:feed" xmlns:tns="urn:feed">
            <xs:element name="person">
                <xs:complexType>
                    <xs:sequence>
                        <xs:element name="name" type="xs:string"
                                    dfdl:initiator="NAME:" dfdl:length="10"/>
                        <xs:element name="age" type="xs:int"
                                    dfdl:terminator=";" minOccurs="1"/>
                    </xs:sequence>
                </xs:complexType>
            </xs:element>
        </xs:schema>
    "#;

    #[test]
    fn parses_top_level_complex_element() {
        let raw = parse_xsd(FEED_XSD).unwrap();
        assert_eq!(raw.target_namespace, "urn:feed");
        assert_eq!(raw.elements.len(), 1);

        let person = &raw.elements[0];
        assert_eq!(person.name, "person");
        let Some(RawParticle::Sequence(items)) = &person.content else {
            panic!("expected sequence content");
        };
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn decoration_attributes_are_collected_verbatim() {
        let raw = parse_xsd(FEED_XSD).unwrap();
        let Some(RawParticle::Sequence(items)) = &raw.elements[0].content else {
            panic!("expected sequence content");
        };
        let RawParticle::Element(name_elem) = &items[0] else {
            panic!("expected element particle");
        };
        assert_eq!(
            name_elem.decoration,
            vec![
                ("dfdl:initiator".to_string(), "NAME:".to_string()),
                ("dfdl:length".to_string(), "10".to_string()),
            ]
        );
        assert_eq!(name_elem.simple_kind.as_deref(), Some("string"));
    }

    #[test]
    fn occurs_bounds_follow_the_mapping() {
        let xsd = r#"
            <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                <xs:element name="r">
                    <xs:complexType><xs:sequence>
                        <xs:element name="a" type="xs:string"/>
                        <xs:element name="b" type="xs:string" minOccurs="2" maxOccurs="5"/>
                        <xs:element name="c" type="xs:string" maxOccurs="unbounded"/>
                    </xs:sequence></xs:complexType>
                </xs:element>
            </xs:schema>
        "#;
        let raw = parse_xsd(xsd).unwrap();
        let Some(RawParticle::Sequence(items)) = &raw.elements[0].content else {
            panic!("expected sequence");
        };
        let bounds: Vec<(usize, MaxOccurs)> = items
            .iter()
            .map(|p| match p {
                RawParticle::Element(e) => (e.min_occurs, e.max_occurs),
                _ => panic!("expected element"),
            })
            .collect();
        assert_eq!(bounds[0], (0, MaxOccurs::Bounded(1)), "absent → (0, 1)");
        assert_eq!(bounds[1], (2, MaxOccurs::Bounded(5)));
        assert_eq!(bounds[2], (0, MaxOccurs::Unbounded));
    }

    #[test]
    fn untyped_element_references_its_own_name() {
        let xsd = r#"
            <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
                       targetNamespace="urn:feed">
                <xs:element name="outer">
                    <xs:complexType><xs:sequence>
                        <xs:element name="inner"/>
                    </xs:sequence></xs:complexType>
                </xs:element>
            </xs:schema>
        "#;
        let raw = parse_xsd(xsd).unwrap();
        let Some(RawParticle::Sequence(items)) = &raw.elements[0].content else {
            panic!("expected sequence");
        };
        let RawParticle::Element(inner) = &items[0] else {
            panic!("expected element");
        };
        assert_eq!(inner.type_ref, Some(QName::new("urn:feed", "inner")));
    }

    #[test]
    fn named_type_reference_resolves_prefix() {
        let xsd = r#"
            <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
                       xmlns:tns="urn:feed" targetNamespace="urn:feed">
                <xs:element name="outer">
                    <xs:complexType><xs:sequence>
                        <xs:element name="addr" type="tns:address"/>
                    </xs:sequence></xs:complexType>
                </xs:element>
            </xs:schema>
        "#;
        let raw = parse_xsd(xsd).unwrap();
        let Some(RawParticle::Sequence(items)) = &raw.elements[0].content else {
            panic!("expected sequence");
        };
        let RawParticle::Element(addr) = &items[0] else {
            panic!("expected element");
        };
        assert_eq!(addr.type_ref, Some(QName::new("urn:feed", "address")));
    }

    #[test]
    fn undeclared_prefix_is_fatal() {
        let xsd = r#"
            <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                <xs:element name="x" type="nope:address"/>
            </xs:schema>
        "#;
        assert!(matches!(parse_xsd(xsd), Err(Error::XsdParse(_))));
    }

    #[test]
    fn choice_particles_are_parsed() {
        let xsd = r#"
            <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                <xs:element name="r">
                    <xs:complexType>
                        <xs:choice>
                            <xs:element name="a" type="xs:string"/>
                            <xs:element name="b" type="xs:string"/>
                        </xs:choice>
                    </xs:complexType>
                </xs:element>
            </xs:schema>
        "#;
        let raw = parse_xsd(xsd).unwrap();
        let Some(RawParticle::Choice(alts)) = &raw.elements[0].content else {
            panic!("expected choice content");
        };
        assert_eq!(alts.len(), 2);
    }

    #[test]
    fn attributes_are_skipped_with_a_warning() {
        let xsd = r#"
            <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                <xs:element name="r">
                    <xs:complexType>
                        <xs:sequence/>
                        <xs:attribute name="id" type="xs:string"/>
                    </xs:complexType>
                </xs:element>
            </xs:schema>
        "#;
        let raw = parse_xsd(xsd).unwrap();
        assert_eq!(raw.diagnostics.len(), 1);
        assert!(raw.diagnostics[0].message.contains("id"));
    }

    #[test]
    fn non_schema_root_is_rejected() {
        assert!(parse_xsd("<root/>").is_err());
        assert!(parse_xsd("not xml").is_err());
    }

    #[test]
    fn primitive_kind_table_and_fallback() {
        assert_eq!(primitive_kind("string"), "string");
        assert_eq!(primitive_kind("dateTime"), "datetime");
        assert_eq!(primitive_kind("unsignedShort"), "short");
        // Nicht gelistet → kleingeschriebener lokaler Name.
        assert_eq!(primitive_kind("anyURI"), "anyuri");
    }

    #[test]
    fn format_blocks_are_collected_from_annotations() {
        let xsd = r#"
            <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
                       xmlns:dfdl="http://www.ogf.org/dfdl/dfdl-1.0/">
                <xs:annotation><xs:appinfo source="http://www.ogf.org/dfdl/">
                    <dfdl:defineEscapeScheme name="default">
                        <dfdl:escapeScheme escapeCharacter="\"/>
                    </dfdl:defineEscapeScheme>
                    <dfdl:defineFormat name="base">
                        <dfdl:format separator="CR;LF;" encoding="UTF-8"/>
                    </dfdl:defineFormat>
                </xs:appinfo></xs:annotation>
            </xs:schema>
        "#;
        let doc = Document::parse(xsd).unwrap();
        let blocks = collect_format_blocks(&doc.root_element());
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].kind, FormatBlockKind::EscapeScheme);
        assert_eq!(blocks[1].kind, FormatBlockKind::Format);
        assert!(blocks[1]
            .attributes
            .contains(&("separator".to_string(), "CR;LF;".to_string())));
    }
}
