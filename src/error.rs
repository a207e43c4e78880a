//! Central error types for the DFDL text decoder.
//!
//! Schema-Fehler (XSD-Frontend, Modell-Aufbau) werden vor dem ersten Decode
//! erkannt — fail fast, kein partielles Schema. Decode-Fehler brechen den
//! laufenden Decode-Aufruf ab und tragen den qualifizierten Namen des
//! fehlschlagenden Knotens plus die Cursor-Position.

use core::fmt;

/// All error conditions raised by schema loading, model building and decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The XSD document could not be parsed or compiled.
    XsdParse(String),
    /// An element's declared type name resolves to no built schema node.
    UnresolvedTypeReference {
        /// Qualifizierter Name der fehlenden Definition.
        qname: String,
    },
    /// The same property name appears in more than one dfdl:defineFormat /
    /// dfdl:defineEscapeScheme block.
    DuplicateFormatProperty { name: String },
    /// A required document-wide property (the record separator) is absent
    /// when decoding begins.
    MissingGlobalProperty { name: String },
    /// The record separator spelling contains a control mnemonic that is not
    /// in the translation table (e.g. "XY;" instead of "CR;" / "LF;").
    UnknownControlMnemonic { mnemonic: String },
    /// A fixed-length field extraction exceeds the bytes remaining in the
    /// current record. Crossing a record boundary mid-field is not supported.
    FieldExtractionOutOfRange {
        /// Qualifizierter Name des Felds.
        qname: String,
        /// Record-Index zum Zeitpunkt des Fehlers.
        record: usize,
        /// Byte-Offset innerhalb des Records.
        offset: usize,
        /// Angeforderte Länge in Bytes.
        requested: usize,
        /// Im Record verbleibende Bytes.
        available: usize,
    },
    /// A delimited field's terminator was not found before the record end.
    /// Die delimited-Variante desselben Overruns wie
    /// [`Error::FieldExtractionOutOfRange`].
    TerminatorNotFound {
        qname: String,
        record: usize,
        offset: usize,
        terminator: String,
    },
    /// The decode recursion exceeded its depth limit (guard against
    /// self-referential types whose occurrences consume no input).
    RecursionLimitExceeded { qname: String, limit: usize },
    /// An IO error while reading schema or input files.
    IoError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::XsdParse(msg) => write!(f, "XSD parse error: {msg}"),
            Self::UnresolvedTypeReference { qname } => {
                write!(f, "unresolved type reference '{qname}'")
            }
            Self::DuplicateFormatProperty { name } => {
                write!(f, "duplicate format property '{name}' across dfdl:defineFormat blocks")
            }
            Self::MissingGlobalProperty { name } => {
                write!(f, "missing required global format property '{name}'")
            }
            Self::UnknownControlMnemonic { mnemonic } => {
                write!(f, "unknown control mnemonic '{mnemonic}' in record separator spelling")
            }
            Self::FieldExtractionOutOfRange {
                qname,
                record,
                offset,
                requested,
                available,
            } => write!(
                f,
                "field extraction out of range for '{qname}': {requested} bytes requested, \
                 {available} available (record {record}, offset {offset})"
            ),
            Self::TerminatorNotFound {
                qname,
                record,
                offset,
                terminator,
            } => write!(
                f,
                "terminator '{terminator}' not found before record end for '{qname}' \
                 (record {record}, offset {offset})"
            ),
            Self::RecursionLimitExceeded { qname, limit } => write!(
                f,
                "recursion limit {limit} exceeded while decoding '{qname}' \
                 (self-referential type without consuming input)"
            ),
            Self::IoError(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Erstellt einen `UnresolvedTypeReference` Fehler.
    pub fn unresolved(qname: impl Into<String>) -> Self {
        Self::UnresolvedTypeReference { qname: qname.into() }
    }

    /// Erstellt einen `MissingGlobalProperty` Fehler.
    pub fn missing_property(name: impl Into<String>) -> Self {
        Self::MissingGlobalProperty { name: name.into() }
    }

    /// Erstellt einen `XsdParse` Fehler mit Nachricht.
    pub fn xsd(msg: impl Into<String>) -> Self {
        Self::XsdParse(msg.into())
    }
}

/// A convenience `Result` type alias using [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

// ============================================================================
// Diagnostics (nicht-fatale Befunde)
// ============================================================================

/// Schwere eines Befunds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Wird gemeldet, Verarbeitung läuft weiter.
    Warning,
    /// Fataler Befund — die Quelle der Diagnose bricht ab.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Nicht-fataler Befund aus Schema-Kompilierung oder Decode-Lauf.
///
/// Schema-Befunde mit [`Severity::Warning`] blockieren das Dekodieren nicht;
/// Unterbelegungs-Befunde (Vorkommen < minOccurs bei erschöpftem Input) sind
/// per Vertrag meldepflichtig, aber nicht fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    /// Erstellt eine Warnung.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    /// Unterbelegung: ein Element endete unter seinem declared minOccurs.
    pub fn under_occurrence(qname: &str, found: usize, min: usize) -> Self {
        Self::warning(format!(
            "element '{qname}' occurred {found} time(s), minOccurs is {min} (input exhausted early)"
        ))
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}
