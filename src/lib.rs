//! dfdlr – DFDL-annotierter XSD → Text-Decoder
//!
//! Dekodiert Fixed-Width- und Delimiter-basierte Textdateien zu einem
//! hierarchischen XML-Dokument. Das Record-Layout (Feldreihenfolge, Längen,
//! Initiatoren, Terminatoren, Wiederholungsgrenzen, Verschachtelung) ist
//! nicht hart codiert, sondern kommt vollständig aus einem XML Schema mit
//! DFDL-Layout-Attributen (dfdl:length, dfdl:initiator, dfdl:terminator).
//!
//! # Beispiel
//!
//! ```
//! use dfdlr::{build_model, parse_xsd, decode, GlobalFormat};
//! use dfdlr::xml_serializer::tree_to_xml;
//!
//! let xsd = r#"
//!     <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
//!                xmlns:dfdl="http://www.ogf.org/dfdl/dfdl-1.0/">
//!         <xs:element name="person">
//!             <xs:complexType>
//!                 <xs:sequence>
//!                     <xs:element name="name" type="xs:string"
//!                                 dfdl:initiator="NAME:" dfdl:length="10"/>
//!                 </xs:sequence>
//!             </xs:complexType>
//!         </xs:element>
//!     </xs:schema>
//! "#;
//!
//! let raw = parse_xsd(xsd).unwrap();
//! let model = build_model(&raw).unwrap();
//! let mut format = GlobalFormat::new();
//! format.insert("separator", "LF;").unwrap();
//!
//! let decoded = decode(&model, &format, "NAME:John      \n").unwrap();
//! let xml = tree_to_xml(&decoded.root).unwrap();
//! assert!(xml.contains("<name>John      </name>"));
//! ```

pub mod cursor;
pub mod decoder;
pub mod error;
pub mod output;
pub mod properties;
pub mod qname;
pub mod schema;
pub mod xml_serializer;
pub mod xsd;

pub use error::{Diagnostic, Error, Result, Severity};

/// HashMap mit ahash (schneller, nicht DoS-resistent — für interne Datenstrukturen).
pub(crate) type FastHashMap<K, V> = hashbrown::HashMap<K, V, ahash::RandomState>;

/// HashSet mit ahash.
pub(crate) type FastHashSet<K> = hashbrown::HashSet<K, ahash::RandomState>;

/// IndexMap mit ahash (deterministische Iteration + schnelles Hashing).
pub(crate) type FastIndexMap<K, V> = indexmap::IndexMap<K, V, ahash::RandomState>;

// Public API: Schema-Modell
pub use qname::QName;
pub use schema::{
    build_model, ComplexNode, DecodeProperties, FieldNode, MaxOccurs, SchemaModel, SchemaNode,
};

// Public API: Format-Properties
pub use properties::{resolve_global_format, GlobalFormat};

// Public API: Decoder
pub use cursor::Cursor;
pub use decoder::{decode, decode_with_cursor, Decoded};
pub use output::OutputNode;

// Public API: XSD-Frontend
pub use xsd::{parse_xsd, parse_xsd_with_imports, FormatBlock, RawSchema};

// Public API: Serialisierung
pub use xml_serializer::{
    tree_to_pretty_xml, tree_to_pretty_xml_writer, tree_to_xml, tree_to_xml_writer,
};
