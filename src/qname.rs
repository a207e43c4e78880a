//! Qualifizierte Namen (Namespace-URI + local-name).
//!
//! `QName` nutzt `Rc<str>` für beide Komponenten: Schema-Knoten teilen sich
//! dieselben Namen vielfach (Index-Keys, Referenzen, Output-Elemente), eine
//! Kopie pro Vorkommen wäre reine Allokations-Last.
//!
//! Ordnung: erst local-name, dann URI — deterministische Iteration der
//! `BTreeMap`-basierten Modell-Indizes.

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

/// Qualifizierter Name eines Schema-Elements oder -Typs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace-URI (leer wenn das Schema keinen targetNamespace trägt).
    pub namespace: Rc<str>,
    /// Lokaler Name.
    pub local_name: Rc<str>,
}

impl QName {
    /// Erstellt einen neuen QName.
    pub fn new(namespace: impl AsRef<str>, local_name: impl AsRef<str>) -> Self {
        Self {
            namespace: Rc::from(namespace.as_ref()),
            local_name: Rc::from(local_name.as_ref()),
        }
    }

    /// True wenn der QName keinen Namespace trägt.
    pub fn is_unqualified(&self) -> bool {
        self.namespace.is_empty()
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.local_name)
        } else {
            write!(f, "{}:{}", self.namespace, self.local_name)
        }
    }
}

impl Ord for QName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.local_name
            .cmp(&other.local_name)
            .then_with(|| self.namespace.cmp(&other.namespace))
    }
}

impl PartialOrd for QName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_and_without_namespace() {
        assert_eq!(QName::new("urn:feed", "row").to_string(), "urn:feed:row");
        assert_eq!(QName::new("", "row").to_string(), "row");
    }

    #[test]
    fn ordering_is_local_name_first() {
        let a = QName::new("urn:z", "alpha");
        let b = QName::new("urn:a", "beta");
        assert!(a < b, "local-name ordnet vor URI");

        let c = QName::new("urn:a", "alpha");
        assert!(c < a, "bei gleichem local-name entscheidet die URI");
    }

    #[test]
    fn equality_ignores_rc_identity() {
        let a = QName::new("urn:feed", "row");
        let b = QName::new("urn:feed", "row");
        assert_eq!(a, b);
    }

    #[test]
    fn unqualified_detection() {
        assert!(QName::new("", "x").is_unqualified());
        assert!(!QName::new("urn:x", "x").is_unqualified());
    }
}
