//! Die Decode-Engine: rekursiver Abstieg über das Schema-Modell.
//!
//! Der Interpreter läuft das (unveränderliche) Schema-Modell gegen den
//! (veränderlichen) [`Cursor`] und baut den Output-Baum auf. Entscheidungen
//! sind Initiator-getrieben und single-pass: kein Backtracking, keine
//! Lookahead-Tiefe über den jeweils ersten erwarteten Kind-Knoten hinaus.
//!
//! Steuerfluss je Knotenart:
//! - **Complex**: begrenzte Wiederholungs-Schleife. Erstes Vorkommen über den
//!   eigenen Initiator, weitere Vorkommen über einen nicht-konsumierenden
//!   Lookahead auf den Initiator des ersten erwarteten Kind-Knotens.
//!   `maxOccurs` wird strikt durchgesetzt; bei `unbounded` stoppen
//!   Input-Erschöpfung und ein Kein-Fortschritt-Guard die Schleife.
//! - **Sequence**: Items in deklarierter Reihenfolge, ein Item ohne
//!   Initiator-Match gilt als abwesend und das nächste wird an derselben
//!   Position versucht. Keine Wiederholung, keine Umordnung.
//! - **Choice**: die erste Alternative, deren Initiator an der aktuellen
//!   Position matcht; matcht keine, liefert die Choice "kein Match" nach oben.
//! - **Field**: optionaler Initiator (wird konsumiert, nie Teil des Werts),
//!   dann genau eine Extraktion: feste Länge, Terminator-Scan oder Rest des
//!   Records. Der Record wird vorgerückt, sobald er leer gelesen ist.


use log::{debug, warn};

use crate::cursor::Cursor;
use crate::error::{Diagnostic, Error, Result};
use crate::output::OutputNode;
use crate::properties::GlobalFormat;
use crate::schema::{ComplexNode, DecodeProperties, FieldNode, SchemaModel, SchemaNode};

/// Name des synthetischen Wurzel-Containers.
const ROOT_NAME: &str = "root";

/// Tiefenlimit der Decode-Rekursion.
///
/// Selbst-referenzielle Typen ohne konsumierenden Initiator würden sonst
/// endlos absteigen — echte Schachtelung dieser Tiefe kommt in
/// Record-Formaten nicht vor.
const MAX_DEPTH: usize = 128;

/// Ergebnis eines Decode-Laufs.
#[derive(Debug, Clone)]
pub struct Decoded {
    /// Output-Baum unter einem synthetischen "root"-Container.
    pub root: OutputNode,
    /// Meldepflichtige, nicht-fatale Befunde (z.B. Unterbelegung).
    pub warnings: Vec<Diagnostic>,
}

/// Dekodiert einen Input-String gegen das Schema-Modell.
///
/// Der Record-Separator wird vor dem ersten Record-Zugriff aus dem
/// [`GlobalFormat`] aufgelöst — fehlt er, bricht der Aufruf mit
/// [`Error::MissingGlobalProperty`] ab, bevor irgendetwas gelesen wurde.
pub fn decode(model: &SchemaModel, format: &GlobalFormat, input: &str) -> Result<Decoded> {
    let separator = format.record_separator()?;
    let mut cursor = Cursor::new(input, &separator);
    decode_with_cursor(model, format, &mut cursor)
}

/// Dekodiert gegen einen bereits aufgebauten Cursor.
///
/// Der Cursor gehört für die Dauer des Aufrufs exklusiv diesem Decode-Lauf;
/// die Engine hält keinen Zustand darüber hinaus — zwei Läufe über zwei
/// unabhängige Cursor liefern strukturell identische Bäume.
pub fn decode_with_cursor(
    model: &SchemaModel,
    format: &GlobalFormat,
    cursor: &mut Cursor,
) -> Result<Decoded> {
    let mut engine = Engine {
        model,
        format,
        warnings: Vec::new(),
        depth: 0,
    };
    let mut root = OutputNode::element(ROOT_NAME);
    for top in &model.roots {
        engine.eval_node(top, &mut root, cursor)?;
    }
    Ok(Decoded {
        root,
        warnings: engine.warnings,
    })
}

/// Zustand eines Decode-Laufs: Modell und Format read-only, Warnungen
/// akkumulierend. Die Scan-Position lebt ausschließlich im Cursor, der
/// explizit durch jeden Schritt gereicht wird — die Engine ist re-entrant
/// und pro Knoten isoliert testbar.
struct Engine<'a> {
    model: &'a SchemaModel,
    format: &'a GlobalFormat,
    warnings: Vec<Diagnostic>,
    /// Aktuelle Schachtelungstiefe (Guard gegen endlosen Abstieg).
    depth: usize,
}

impl Engine<'_> {
    /// Wertet einen Knoten aus. Liefert true wenn der Knoten mindestens
    /// einmal gematcht hat — die Information fließt als Match-Status in die
    /// umgebende Sequence/Choice, nie als Backtracking-Punkt.
    fn eval_node(
        &mut self,
        node: &SchemaNode,
        parent: &mut OutputNode,
        cursor: &mut Cursor,
    ) -> Result<bool> {
        match node {
            SchemaNode::Complex(complex) => {
                let name = complex.qname.local_name.to_string();
                self.eval_complex(complex, &complex.props, &name, parent, cursor)
            }
            SchemaNode::Sequence(items) => self.eval_sequence(items, parent, cursor),
            SchemaNode::Choice(alternatives) => self.eval_choice(alternatives, parent, cursor),
            SchemaNode::Field(field) => self.eval_field(field, parent, cursor),
            SchemaNode::Ref {
                qname,
                target,
                props,
            } => {
                // Beim Modell-Aufbau validiert; der Fehlerpfad bleibt für
                // von Hand gebaute Modelle.
                let definition = self
                    .model
                    .resolve(target)
                    .ok_or_else(|| Error::unresolved(target.to_string()))?
                    .clone();
                let effective = props.or_else(&definition.props);
                // Der Output-Knoten trägt den Namen des referenzierenden
                // Elements, nicht den der Definition.
                let name = qname.local_name.to_string();
                self.eval_complex(&definition, &effective, &name, parent, cursor)
            }
        }
    }

    /// Complex-Element: begrenzte Wiederholungs-Schleife.
    ///
    /// `props` sind die an dieser Stelle wirksamen Properties (bei einer
    /// Referenz: Referenz-Stelle über Definition gelegt).
    fn eval_complex(
        &mut self,
        node: &ComplexNode,
        props: &DecodeProperties,
        element_name: &str,
        parent: &mut OutputNode,
        cursor: &mut Cursor,
    ) -> Result<bool> {
        let qname = node.qname.to_string();
        if self.depth >= MAX_DEPTH {
            return Err(Error::RecursionLimitExceeded {
                qname,
                limit: MAX_DEPTH,
            });
        }
        self.depth += 1;
        let initiator = self.effective_initiator(props);
        let mut count = 0usize;

        loop {
            if cursor.is_exhausted() || !props.max_occurs.allows_another(count) {
                break;
            }
            let proceed = if count == 0 {
                // Erstes Vorkommen: der eigene Initiator entscheidet
                // (leerer Initiator matcht immer).
                cursor.starts_with(&initiator)
            } else {
                // Weitere Vorkommen: nicht-konsumierender Lookahead auf den
                // ersten erwarteten Kind-Knoten. Anders als eine gezählte
                // Schleife läuft die Wiederholung nur solange der Input
                // tatsächlich eine weitere Instanz enthält.
                self.matches_at(&node.content, cursor)
            };
            if !proceed {
                break;
            }

            let before = cursor.position();
            if count == 0 && !initiator.is_empty() {
                cursor.take(initiator.len(), &qname)?;
            }

            let mut element = OutputNode::element(element_name);
            let matched = self.eval_node(&node.content, &mut element, cursor)?;
            let progressed = cursor.position() != before;
            if !matched && !progressed {
                // Weder Output noch Konsum — das Vorkommen ist leer,
                // anhängen würde nur die Schleife füttern.
                break;
            }

            if count == 0 {
                parent.append_child(element);
            } else {
                parent.append_sibling(element);
            }
            count += 1;

            if !progressed {
                debug!("repetition of '{qname}' made no progress, stopping after {count}");
                break;
            }
        }

        self.depth -= 1;
        if count < props.min_occurs {
            warn!(
                "element '{qname}' occurred {count} time(s), minOccurs is {}",
                props.min_occurs
            );
            self.warnings
                .push(Diagnostic::under_occurrence(&qname, count, props.min_occurs));
        }
        Ok(count > 0)
    }

    /// Sequence: Items in deklarierter Reihenfolge, bedingungslos. Ein Item
    /// ohne Match gilt als abwesend; das nächste Item wird an derselben
    /// Cursor-Position versucht (optionale Felder über An-/Abwesenheit des
    /// Initiators).
    fn eval_sequence(
        &mut self,
        items: &[SchemaNode],
        parent: &mut OutputNode,
        cursor: &mut Cursor,
    ) -> Result<bool> {
        let mut any = false;
        for item in items {
            if self.eval_node(item, parent, cursor)? {
                any = true;
            }
        }
        Ok(any)
    }

    /// Choice: erste Alternative mit Initiator-Match wird konsumiert.
    fn eval_choice(
        &mut self,
        alternatives: &[SchemaNode],
        parent: &mut OutputNode,
        cursor: &mut Cursor,
    ) -> Result<bool> {
        for alternative in alternatives {
            if self.matches_at(alternative, cursor) {
                return self.eval_node(alternative, parent, cursor);
            }
        }
        Ok(false)
    }

    /// Field: Initiator prüfen und konsumieren, Wert extrahieren, Blatt
    /// anhängen, Record vorrücken sobald er leer ist.
    fn eval_field(
        &mut self,
        field: &FieldNode,
        parent: &mut OutputNode,
        cursor: &mut Cursor,
    ) -> Result<bool> {
        if cursor.is_exhausted() {
            return Ok(false);
        }
        let qname = field.qname.to_string();
        let initiator = self.effective_initiator(&field.props);
        if !initiator.is_empty() {
            if !cursor.starts_with(&initiator) {
                return Ok(false);
            }
            // Initiator-Bytes werden übersprungen, nie Teil des Werts.
            cursor.take(initiator.len(), &qname)?;
        }

        let terminator = field
            .props
            .terminator
            .as_deref()
            .or_else(|| self.format.default_terminator());
        let value = match (field.props.length, terminator) {
            (Some(length), _) => cursor.take(length, &qname)?,
            (None, Some(term)) => cursor.take_until(term, &qname)?,
            // Weder Länge noch Terminator: delimited bis zum Record-Ende.
            (None, None) => cursor.take_rest(),
        };

        parent.append_child(OutputNode::leaf(field.qname.local_name.as_ref(), value));

        if cursor.remaining_in_record() == 0 {
            cursor.advance_record();
        }
        Ok(true)
    }

    /// Nicht-konsumierender Lookahead: matcht der Knoten an der aktuellen
    /// Cursor-Position über seinen (effektiven) Initiator?
    ///
    /// Für Struktur-Knoten ohne eigenen Initiator steigt der Test zum ersten
    /// erwarteten Kind ab; eine Choice matcht, wenn irgendeine Alternative
    /// matcht. Auf erschöpftem Cursor matcht nichts.
    fn matches_at(&self, node: &SchemaNode, cursor: &Cursor) -> bool {
        self.matches_at_depth(node, cursor, 0)
    }

    fn matches_at_depth(&self, node: &SchemaNode, cursor: &Cursor, depth: usize) -> bool {
        if depth >= MAX_DEPTH {
            return false;
        }
        match node {
            SchemaNode::Field(field) => {
                cursor.starts_with(&self.effective_initiator(&field.props))
            }
            SchemaNode::Complex(complex) => {
                let initiator = self.effective_initiator(&complex.props);
                if initiator.is_empty() {
                    self.matches_at_depth(&complex.content, cursor, depth + 1)
                } else {
                    cursor.starts_with(&initiator)
                }
            }
            SchemaNode::Sequence(items) => items
                .first()
                .is_some_and(|first| self.matches_at_depth(first, cursor, depth + 1)),
            SchemaNode::Choice(alternatives) => alternatives
                .iter()
                .any(|alternative| self.matches_at_depth(alternative, cursor, depth + 1)),
            SchemaNode::Ref { target, props, .. } => match self.model.resolve(target) {
                Some(definition) => {
                    let effective = props.or_else(&definition.props);
                    let initiator = self.effective_initiator(&effective);
                    if initiator.is_empty() {
                        self.matches_at_depth(&definition.content, cursor, depth + 1)
                    } else {
                        cursor.starts_with(&initiator)
                    }
                }
                None => false,
            },
        }
    }

    /// Initiator des Knotens, mit Fallback auf den dokumentweiten Default.
    fn effective_initiator(&self, props: &DecodeProperties) -> String {
        props
            .initiator
            .as_deref()
            .or_else(|| self.format.default_initiator())
            .unwrap_or("")
            .to_string()
    }
}
