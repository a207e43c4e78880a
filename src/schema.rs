//! Internes Schema-Modell für die Decode-Engine.
//!
//! Der rohe Objekt-Graph des XSD-Frontends wird zu einem Baum getypter
//! [`SchemaNode`]-Knoten mit pro-Knoten [`DecodeProperties`] konvertiert.
//! Benannte complex Definitionen leben genau einmal in einem Index
//! (`BTreeMap<QName, Rc<ComplexNode>>`) und werden per Name referenziert,
//! nie tief kopiert — ein Typ kann von mehreren Stellen (und prinzipiell
//! rekursiv) referenziert werden, der Schema-"Baum" ist also ein Graph
//! geteilter Knoten.
//!
//! Die geschlossene Variantenmenge ersetzt die Laufzeit-Typtests einer
//! dynamischen Schema-API: ein neues Konstrukt ist eine neue Variante, die
//! der Compiler in jedem `match` einfordert.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::qname::QName;
use crate::xsd::{RawElement, RawParticle, RawSchema};
use crate::FastHashSet;

// ============================================================================
// MaxOccurs
// ============================================================================

/// Obere Occurs-Grenze eines Elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxOccurs {
    /// Endliche Obergrenze.
    Bounded(usize),
    /// `maxOccurs="unbounded"` — die Engine stoppt über Input-Erschöpfung.
    Unbounded,
}

impl MaxOccurs {
    /// True wenn nach `count` Vorkommen ein weiteres zulässig ist.
    pub fn allows_another(&self, count: usize) -> bool {
        match self {
            MaxOccurs::Bounded(max) => count < *max,
            MaxOccurs::Unbounded => true,
        }
    }
}

// ============================================================================
// DecodeProperties
// ============================================================================

/// Layout-Eigenschaften eines Schema-Knotens, aus den Decoration-Attributen
/// (`dfdl:initiator`, `dfdl:terminator`, `dfdl:length`) und den
/// Occurs-Deklarationen des Schemas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeProperties {
    /// Literal vor dem kodierten Wert (wird konsumiert, nie Teil des Werts).
    pub initiator: Option<String>,
    /// Literal hinter dem kodierten Wert.
    pub terminator: Option<String>,
    /// Feste Länge in Bytes.
    pub length: Option<usize>,
    /// Untere Occurs-Grenze.
    pub min_occurs: usize,
    /// Obere Occurs-Grenze.
    pub max_occurs: MaxOccurs,
}

impl Default for DecodeProperties {
    fn default() -> Self {
        Self {
            initiator: None,
            terminator: None,
            length: None,
            min_occurs: 0,
            max_occurs: MaxOccurs::Bounded(1),
        }
    }
}

impl DecodeProperties {
    /// Initiator als `&str` (leer wenn nicht gesetzt — matcht immer).
    pub fn initiator_str(&self) -> &str {
        self.initiator.as_deref().unwrap_or("")
    }

    /// Füllt ungesetzte Layout-Properties aus `fallback` auf.
    ///
    /// Occurs-Grenzen kommen immer von `self` (der Referenz-Stelle) —
    /// wie oft ein Element vorkommt, entscheidet die einbettende Deklaration,
    /// nicht die Definition.
    pub fn or_else(&self, fallback: &DecodeProperties) -> DecodeProperties {
        DecodeProperties {
            initiator: self.initiator.clone().or_else(|| fallback.initiator.clone()),
            terminator: self
                .terminator
                .clone()
                .or_else(|| fallback.terminator.clone()),
            length: self.length.or(fallback.length),
            min_occurs: self.min_occurs,
            max_occurs: self.max_occurs,
        }
    }
}

// ============================================================================
// SchemaNode
// ============================================================================

/// Benannte complex Definition: Element mit strukturiertem Inhalt.
#[derive(Debug, Clone)]
pub struct ComplexNode {
    pub qname: QName,
    pub props: DecodeProperties,
    pub content: SchemaNode,
}

/// Skalares Blatt: direkt aus Input-Bytes dekodiert.
#[derive(Debug, Clone)]
pub struct FieldNode {
    pub qname: QName,
    /// Kleingeschriebener Primitiv-Name der Wert-Repräsentation
    /// (`string`, `int`, `decimal`, `boolean`, `datetime`, …).
    pub data_kind: String,
    pub props: DecodeProperties,
}

/// Ein Knoten des Schema-Modells.
#[derive(Debug, Clone)]
pub enum SchemaNode {
    /// Strukturiertes Element (geteilte Identität, siehe Modell-Index).
    Complex(Rc<ComplexNode>),
    /// Geordnete Komposition ohne Backtracking.
    Sequence(Vec<SchemaNode>),
    /// Alternativen; pro Vorkommen wird genau eine gewählt.
    Choice(Vec<SchemaNode>),
    /// Skalares Blatt.
    Field(FieldNode),
    /// Referenz per qualifiziertem Namen in den Modell-Index.
    ///
    /// `qname` ist der Name des referenzierenden Elements (er benennt den
    /// Output-Knoten), `target` der Name der Definition. `props` stammen von
    /// der Referenz-Stelle und überlagern beim Dekodieren die Properties der
    /// Definition.
    Ref {
        qname: QName,
        target: QName,
        props: DecodeProperties,
    },
}

// ============================================================================
// SchemaModel
// ============================================================================

/// Das fertige Schema-Modell: Wurzel-Deklarationen plus Index der benannten
/// complex Definitionen. Nach dem Aufbau unveränderlich.
#[derive(Debug, Clone, Default)]
pub struct SchemaModel {
    /// Top-Level-Deklarationen in Dokument-Reihenfolge.
    pub roots: Vec<SchemaNode>,
    /// Geteilte Knoten-Identitäten, Schlüssel: qualifizierter Name.
    index: BTreeMap<QName, Rc<ComplexNode>>,
}

impl SchemaModel {
    /// Löst eine Referenz auf.
    pub fn resolve(&self, qname: &QName) -> Option<&Rc<ComplexNode>> {
        self.index.get(qname)
    }

    /// Iteriert die benannten complex Definitionen (sortiert nach QName).
    pub fn complex_types(&self) -> impl Iterator<Item = (&QName, &Rc<ComplexNode>)> {
        self.index.iter()
    }
}

/// Baut das Schema-Modell aus dem rohen Objekt-Graph.
///
/// # Fehler
///
/// - [`Error::XsdParse`] bei ungültigen Decoration-Werten oder doppelten
///   Definitionen.
/// - [`Error::UnresolvedTypeReference`] wenn eine Referenz nach dem Aufbau
///   auf keine Definition zeigt (Validierungs-Pass, damit Vorwärts- und
///   rekursive Referenzen funktionieren).
pub fn build_model(raw: &RawSchema) -> Result<SchemaModel> {
    let mut builder = ModelBuilder {
        index: BTreeMap::new(),
    };
    let mut roots = Vec::new();
    for element in &raw.elements {
        roots.push(builder.build_element(element)?);
    }
    let model = SchemaModel {
        roots,
        index: builder.index,
    };
    validate_references(&model)?;
    Ok(model)
}

struct ModelBuilder {
    index: BTreeMap<QName, Rc<ComplexNode>>,
}

impl ModelBuilder {
    /// Eine Element-Deklaration → ein Schema-Knoten (depth-first).
    fn build_element(&mut self, element: &RawElement) -> Result<SchemaNode> {
        let qname = element.qname();
        let props = parse_properties(element)?;

        if let Some(particle) = &element.content {
            let content = self.build_particle(particle)?;
            let node = Rc::new(ComplexNode {
                qname: qname.clone(),
                props,
                content,
            });
            // Unter dem qualifizierten Namen registrieren, damit spätere
            // Geschwister dieselbe Knoten-Identität referenzieren können.
            if self.index.insert(qname.clone(), Rc::clone(&node)).is_some() {
                return Err(Error::xsd(format!("duplicate definition of '{qname}'")));
            }
            return Ok(SchemaNode::Complex(node));
        }

        if let Some(kind) = &element.simple_kind {
            return Ok(SchemaNode::Field(FieldNode {
                qname,
                data_kind: kind.clone(),
                props,
            }));
        }

        if let Some(target) = &element.type_ref {
            return Ok(SchemaNode::Ref {
                qname,
                target: target.clone(),
                props,
            });
        }

        Err(Error::xsd(format!("element '{qname}' carries no type information")))
    }

    fn build_particle(&mut self, particle: &RawParticle) -> Result<SchemaNode> {
        match particle {
            RawParticle::Sequence(items) => Ok(SchemaNode::Sequence(
                items
                    .iter()
                    .map(|p| self.build_particle(p))
                    .collect::<Result<_>>()?,
            )),
            RawParticle::Choice(alternatives) => Ok(SchemaNode::Choice(
                alternatives
                    .iter()
                    .map(|p| self.build_particle(p))
                    .collect::<Result<_>>()?,
            )),
            RawParticle::Element(element) => self.build_element(element),
        }
    }
}

/// Decoration-Attribute + Occurs-Deklarationen → [`DecodeProperties`].
fn parse_properties(element: &RawElement) -> Result<DecodeProperties> {
    let mut props = DecodeProperties {
        min_occurs: element.min_occurs,
        max_occurs: element.max_occurs,
        ..DecodeProperties::default()
    };
    for (name, value) in &element.decoration {
        match name.as_str() {
            "dfdl:length" => {
                let length = value.parse().map_err(|_| {
                    Error::xsd(format!(
                        "invalid dfdl:length '{value}' on element '{}'",
                        element.qname()
                    ))
                })?;
                props.length = Some(length);
            }
            "dfdl:initiator" => props.initiator = Some(value.clone()),
            "dfdl:terminator" => props.terminator = Some(value.clone()),
            other => {
                // dfdl:occursCountKind, ibmDfdlExtn:sampleValue u.ä. sind
                // bekannt, tragen aber nichts zum Layout bei.
                log::debug!("decoration attribute {other} ignored on '{}'", element.qname());
            }
        }
    }
    Ok(props)
}

/// Validierungs-Pass: jede Referenz muss auf eine Definition im Index zeigen.
///
/// Läuft nach dem Aufbau, damit Vorwärts-Referenzen und Selbst-Referenzen
/// zulässig sind; Zyklen werden über ein Besucht-Set abgefangen.
fn validate_references(model: &SchemaModel) -> Result<()> {
    let mut visited: FastHashSet<*const ComplexNode> = FastHashSet::default();

    fn walk(
        node: &SchemaNode,
        model: &SchemaModel,
        visited: &mut FastHashSet<*const ComplexNode>,
    ) -> Result<()> {
        match node {
            SchemaNode::Complex(complex) => {
                if visited.insert(Rc::as_ptr(complex)) {
                    walk(&complex.content, model, visited)?;
                }
                Ok(())
            }
            SchemaNode::Sequence(items) | SchemaNode::Choice(items) => {
                for item in items {
                    walk(item, model, visited)?;
                }
                Ok(())
            }
            SchemaNode::Field(_) => Ok(()),
            SchemaNode::Ref { target, .. } => match model.resolve(target) {
                Some(definition) => {
                    if visited.insert(Rc::as_ptr(definition)) {
                        walk(&definition.content, model, visited)?;
                    }
                    Ok(())
                }
                None => Err(Error::unresolved(target.to_string())),
            },
        }
    }

    for root in &model.roots {
        walk(root, model, &mut visited)?;
    }
    Ok(())
}
