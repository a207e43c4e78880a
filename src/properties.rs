//! Dokumentweite Format-Properties (GlobalFormat).
//!
//! Die Properties kommen aus den `dfdl:defineEscapeScheme` /
//! `dfdl:defineFormat` Annotation-Blöcken der per `xs:import` / `xs:include`
//! eingebundenen Schemas. Jedes Attribut eines Blocks wird als
//! `(name, value)`-Paar übernommen. Doppelte Namen über Blöcke hinweg sind
//! ein Konfigurationsfehler, kein first-wins.
//!
//! Der Record-Separator wird als Control-Mnemonic-Spelling notiert
//! (z.B. `"CR;LF;"`) und vor dem Splitten über eine datengetriebene
//! Tabelle in die tatsächlichen Bytes übersetzt.

use crate::error::{Error, Result};
use crate::xsd::FormatBlock;
use crate::FastIndexMap;

/// Name der Pflicht-Property: das Record-Trennzeichen.
pub const SEPARATOR_PROPERTY: &str = "separator";

/// Name der optionalen Default-Initiator-Property.
pub const INITIATOR_PROPERTY: &str = "initiator";

/// Name der optionalen Default-Terminator-Property.
pub const TERMINATOR_PROPERTY: &str = "terminator";

/// Übersetzungstabelle für Control-Mnemonics im Separator-Spelling.
///
/// Erweiterbar: neue Mnemonics sind ein Tabelleneintrag, keine Code-Änderung.
const CONTROL_MNEMONICS: &[(&str, &str)] = &[
    ("CR", "\r"),
    ("LF", "\n"),
    ("NL", "\n"),
    ("TAB", "\t"),
    ("SP", " "),
    ("FF", "\u{0c}"),
    ("VT", "\u{0b}"),
    ("NUL", "\0"),
];

/// Übersetzt ein Separator-Spelling in die tatsächliche Byte-Folge.
///
/// Ein Spelling ohne `;` ist ein Literal und wird unverändert übernommen.
/// Mit `;` wird es als Folge von Mnemonics gelesen: `"CR;LF;"` → `"\r\n"`.
/// Unbekannte Mnemonics sind ein Fehler, kein stilles Literal.
pub fn translate_control_spelling(spelling: &str) -> Result<String> {
    if !spelling.contains(';') {
        return Ok(spelling.to_string());
    }
    let mut out = String::new();
    for mnemonic in spelling.split(';').filter(|t| !t.is_empty()) {
        match CONTROL_MNEMONICS.iter().find(|(name, _)| *name == mnemonic) {
            Some((_, bytes)) => out.push_str(bytes),
            None => {
                return Err(Error::UnknownControlMnemonic {
                    mnemonic: mnemonic.to_string(),
                })
            }
        }
    }
    Ok(out)
}

/// Dokumentweite Format-Properties, einmal pro geladenem Schema befüllt.
///
/// Einfüge-Reihenfolge bleibt erhalten (deterministisches `iter()`);
/// nach dem Laden unveränderlich, read-only geteilt mit der Decode-Engine.
#[derive(Debug, Clone, Default)]
pub struct GlobalFormat {
    entries: FastIndexMap<String, String>,
}

impl GlobalFormat {
    /// Erstellt eine leere Property-Map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fügt eine Property ein.
    ///
    /// # Fehler
    ///
    /// - [`Error::DuplicateFormatProperty`] wenn der Name bereits belegt ist.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(Error::DuplicateFormatProperty { name });
        }
        self.entries.insert(name, value.into());
        Ok(())
    }

    /// Liest eine Property.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Anzahl der Properties.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True wenn keine Properties geladen wurden.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iteriert in Einfüge-Reihenfolge.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Löst den Record-Separator auf (übersetzt, nie leer).
    ///
    /// # Fehler
    ///
    /// - [`Error::MissingGlobalProperty`] wenn die Property fehlt oder zu
    ///   einer leeren Byte-Folge übersetzt — mit leerem Separator darf nicht
    ///   dekodiert werden.
    /// - [`Error::UnknownControlMnemonic`] bei unbekanntem Mnemonic.
    pub fn record_separator(&self) -> Result<String> {
        let spelling = self
            .get(SEPARATOR_PROPERTY)
            .ok_or_else(|| Error::missing_property(SEPARATOR_PROPERTY))?;
        let separator = translate_control_spelling(spelling)?;
        if separator.is_empty() {
            return Err(Error::missing_property(SEPARATOR_PROPERTY));
        }
        Ok(separator)
    }

    /// Dokumentweiter Default-Initiator (Fallback für Knoten ohne eigenen).
    pub fn default_initiator(&self) -> Option<&str> {
        self.get(INITIATOR_PROPERTY).filter(|v| !v.is_empty())
    }

    /// Dokumentweiter Default-Terminator.
    pub fn default_terminator(&self) -> Option<&str> {
        self.get(TERMINATOR_PROPERTY).filter(|v| !v.is_empty())
    }
}

/// Der Property Resolver: Annotation-Blöcke → [`GlobalFormat`].
///
/// Jedes Attribut jedes Blocks landet als `(name, value)` in der Map;
/// ein doppelter Name über Blöcke hinweg bricht mit
/// [`Error::DuplicateFormatProperty`] ab.
pub fn resolve_global_format(blocks: &[FormatBlock]) -> Result<GlobalFormat> {
    let mut format = GlobalFormat::new();
    for block in blocks {
        for (name, value) in &block.attributes {
            format.insert(name.clone(), value.clone())?;
        }
    }
    Ok(format)
}
