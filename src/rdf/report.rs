//! SHACL validation results and their RDF rendering
//!
//! A [`ValidationReport`] collects [`ValidationResult`]s while shapes are
//! evaluated, then renders itself as a standard `sh:ValidationReport` graph.

use crate::error::{Result, ValidatorError};
use crate::rdf::vocab::{RDF_NS, SH_NS, XSD_NS, sh};
use oxigraph::io::{RdfFormat, RdfSerializer};
use oxigraph::model::vocab::rdf;
use oxigraph::model::{BlankNode, Graph, Literal, NamedNode, NamedOrBlankNode, Term, Triple};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;

// =============================================================================
// Severity Levels
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Violation,
}

impl Severity {
    pub fn from_iri(iri: &str) -> Self {
        match iri {
            "http://www.w3.org/ns/shacl#Info" => Severity::Info,
            "http://www.w3.org/ns/shacl#Warning" => Severity::Warning,
            _ => Severity::Violation,
        }
    }

    pub fn to_iri(&self) -> NamedNode {
        match self {
            Severity::Info => sh("Info"),
            Severity::Warning => sh("Warning"),
            Severity::Violation => sh("Violation"),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => f.write_str("info"),
            Severity::Warning => f.write_str("warning"),
            Severity::Violation => f.write_str("violation"),
        }
    }
}

/// Which result severities make a data graph non-conforming.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningPolicy {
    /// Only `sh:Violation` results fail conformance
    #[default]
    Tolerate,
    /// Any result, including `sh:Warning` and `sh:Info`, fails conformance
    Fail,
}

// =============================================================================
// Validation Result
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    focus_node: Term,
    result_path: Option<NamedNode>,
    value: Option<Term>,
    message: String,
    severity: Severity,
    source_shape: NamedOrBlankNode,
    /// Local name of the constraint component, e.g. `MinCountConstraintComponent`
    component: &'static str,
}

impl ValidationResult {
    pub fn new(
        focus_node: Term,
        message: String,
        severity: Severity,
        source_shape: NamedOrBlankNode,
        component: &'static str,
    ) -> Self {
        Self {
            focus_node,
            result_path: None,
            value: None,
            message,
            severity,
            source_shape,
            component,
        }
    }

    pub fn with_path(mut self, path: NamedNode) -> Self {
        self.result_path = Some(path);
        self
    }

    pub fn with_value(mut self, value: Term) -> Self {
        self.value = Some(value);
        self
    }

    pub fn focus_node(&self) -> &Term {
        &self.focus_node
    }

    pub fn result_path(&self) -> Option<&NamedNode> {
        self.result_path.as_ref()
    }

    pub fn value(&self) -> Option<&Term> {
        self.value.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn source_shape(&self) -> &NamedOrBlankNode {
        &self.source_shape
    }

    pub fn source_constraint_component(&self) -> NamedNode {
        sh(self.component)
    }
}

// =============================================================================
// Validation Report
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    results: Vec<ValidationResult>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_result(&mut self, result: ValidationResult) {
        self.results.push(result);
    }

    pub fn conforms(&self, policy: WarningPolicy) -> bool {
        match policy {
            WarningPolicy::Tolerate => self.violation_count() == 0,
            WarningPolicy::Fail => self.results.is_empty(),
        }
    }

    pub fn results(&self) -> &[ValidationResult] {
        &self.results
    }

    pub fn violations(&self) -> impl Iterator<Item = &ValidationResult> {
        self.with_severity(Severity::Violation)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationResult> {
        self.with_severity(Severity::Warning)
    }

    pub fn infos(&self) -> impl Iterator<Item = &ValidationResult> {
        self.with_severity(Severity::Info)
    }

    fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &ValidationResult> {
        self.results.iter().filter(move |r| r.severity == severity)
    }

    pub fn violation_count(&self) -> usize {
        self.violations().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn info_count(&self) -> usize {
        self.infos().count()
    }

    /// One-line human summary, e.g. `2 violation(s), 1 warning(s), 0 info(s)`.
    pub fn summary(&self) -> String {
        format!(
            "{} violation(s), {} warning(s), {} info(s)",
            self.violation_count(),
            self.warning_count(),
            self.info_count()
        )
    }

    /// Render as a `sh:ValidationReport` graph.
    pub fn to_graph(&self, policy: WarningPolicy) -> Graph {
        let mut graph = Graph::new();
        let report = BlankNode::default();

        graph.insert(&Triple::new(report.clone(), rdf::TYPE, sh("ValidationReport")));
        graph.insert(&Triple::new(
            report.clone(),
            sh("conforms"),
            Literal::from(self.conforms(policy)),
        ));

        for result in &self.results {
            let node = BlankNode::default();
            graph.insert(&Triple::new(report.clone(), sh("result"), node.clone()));
            graph.insert(&Triple::new(node.clone(), rdf::TYPE, sh("ValidationResult")));
            graph.insert(&Triple::new(node.clone(), sh("focusNode"), result.focus_node.clone()));
            if let Some(path) = &result.result_path {
                graph.insert(&Triple::new(node.clone(), sh("resultPath"), path.clone()));
            }
            if let Some(value) = &result.value {
                graph.insert(&Triple::new(node.clone(), sh("value"), value.clone()));
            }
            graph.insert(&Triple::new(
                node.clone(),
                sh("resultSeverity"),
                result.severity.to_iri(),
            ));
            graph.insert(&Triple::new(
                node.clone(),
                sh("sourceShape"),
                Term::from(result.source_shape.clone()),
            ));
            graph.insert(&Triple::new(
                node.clone(),
                sh("sourceConstraintComponent"),
                result.source_constraint_component(),
            ));
            graph.insert(&Triple::new(
                node,
                sh("resultMessage"),
                Literal::new_simple_literal(&result.message),
            ));
        }

        graph
    }
}

// =============================================================================
// Serialization
// =============================================================================

/// Serialize a graph as Turtle with the `sh`, `rdf` and `xsd` prefixes bound.
pub fn serialize_turtle(graph: &Graph) -> Result<String> {
    let serializer = RdfSerializer::from_format(RdfFormat::Turtle)
        .with_prefix("sh", SH_NS)
        .and_then(|s| s.with_prefix("rdf", RDF_NS))
        .and_then(|s| s.with_prefix("xsd", XSD_NS))
        .map_err(|e| ValidatorError::Serialize(io::Error::new(io::ErrorKind::InvalidInput, e)))?;

    let mut writer = serializer.for_writer(Vec::new());
    for triple in graph.iter() {
        writer
            .serialize_triple(triple)
            .map_err(ValidatorError::Serialize)?;
    }
    let bytes = writer.finish().map_err(ValidatorError::Serialize)?;

    String::from_utf8(bytes)
        .map_err(|e| ValidatorError::Serialize(io::Error::new(io::ErrorKind::InvalidData, e)))
}
