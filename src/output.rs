//! Output-Baum des Decoders.
//!
//! Reine Akkumulation: die Decode-Engine hängt Knoten in Dokument-Reihenfolge
//! an, Validierung findet hier nicht statt. Ein Knoten trägt entweder Kinder
//! (Struktur-Element) oder einen Textwert (Blatt) — spiegelbildlich zum
//! Schema-Knoten, der ihn erzeugt hat.

use std::fmt;

/// Ein Knoten des dekodierten Dokuments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNode {
    /// Element-Name (lokaler Name des Schema-Knotens).
    pub name: String,
    /// Kind-Knoten in Dokument-Reihenfolge.
    pub children: Vec<OutputNode>,
    /// Textwert, nur bei Blättern gesetzt.
    pub text: Option<String>,
}

impl OutputNode {
    /// Erstellt ein leeres Struktur-Element.
    pub fn element(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            text: None,
        }
    }

    /// Erstellt ein Blatt mit Textwert.
    pub fn leaf(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            text: Some(text.into()),
        }
    }

    /// Hängt `node` als letztes Kind an.
    pub fn append_child(&mut self, node: OutputNode) {
        self.children.push(node);
    }

    /// Hängt `node` als nächstes Geschwister hinter das zuletzt angehängte
    /// Kind — bei einem Vec-basierten Baum dieselbe Operation wie
    /// [`append_child`](Self::append_child), als eigener Name erhalten, weil
    /// die Engine beide Absichten trennt (erstes Vorkommen vs. Wiederholung).
    pub fn append_sibling(&mut self, node: OutputNode) {
        self.children.push(node);
    }

    /// True wenn der Knoten weder Kinder noch Text trägt.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.text.is_none()
    }

    /// Anzahl der direkten Kinder mit dem gegebenen Namen.
    pub fn count_children(&self, name: &str) -> usize {
        self.children.iter().filter(|c| c.name == name).count()
    }

    /// Erstes direktes Kind mit dem gegebenen Namen.
    pub fn child(&self, name: &str) -> Option<&OutputNode> {
        self.children.iter().find(|c| c.name == name)
    }
}

impl fmt::Display for OutputNode {
    /// Kompakte Debug-Darstellung (`name{child,child}` bzw. `name="text"`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.text {
            Some(text) => write!(f, "{}={:?}", self.name, text),
            None => {
                write!(f, "{}{{", self.name)?;
                for (i, child) in self.children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{child}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_and_leaf_constructors() {
        let e = OutputNode::element("person");
        assert!(e.is_empty());
        assert_eq!(e.text, None);

        let l = OutputNode::leaf("name", "John");
        assert!(!l.is_empty());
        assert_eq!(l.text.as_deref(), Some("John"));
    }

    #[test]
    fn append_preserves_document_order() {
        let mut root = OutputNode::element("root");
        root.append_child(OutputNode::leaf("a", "1"));
        root.append_sibling(OutputNode::leaf("b", "2"));
        root.append_sibling(OutputNode::leaf("a", "3"));

        let names: Vec<&str> = root.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "a"]);
        assert_eq!(root.count_children("a"), 2);
    }

    #[test]
    fn child_finds_first_match() {
        let mut root = OutputNode::element("root");
        root.append_child(OutputNode::leaf("x", "first"));
        root.append_child(OutputNode::leaf("x", "second"));
        assert_eq!(root.child("x").unwrap().text.as_deref(), Some("first"));
        assert!(root.child("y").is_none());
    }

    #[test]
    fn display_is_compact() {
        let mut root = OutputNode::element("r");
        root.append_child(OutputNode::leaf("a", "1"));
        assert_eq!(root.to_string(), "r{a=\"1\"}");
    }
}
