//! Namespace constants

use oxigraph::model::NamedNode;

pub const SH_NS: &str = "http://www.w3.org/ns/shacl#";
pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";
pub const OWL_NS: &str = "http://www.w3.org/2002/07/owl#";

/// Term in the SHACL namespace.
pub fn sh(local: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("{SH_NS}{local}"))
}

pub fn owl(local: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("{OWL_NS}{local}"))
}
