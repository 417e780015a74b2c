//! RDF graph validation against SHACL shapes and an ontology
//!
//! Shapes and ontology definitions are usually split across several Turtle
//! files. [`RdfValidator`] merges each list into one compound graph per call
//! and hands both, with the data graph, to a [`ConformanceChecker`].
//!
//! # Example
//!
//! ```rust,no_run
//! use validation_tool::rdf::{RdfValidator, parse_turtle};
//!
//! let data = parse_turtle("@prefix ex: <http://example.org/> . ex:alice a ex:Person .")?;
//! let validator = RdfValidator::new();
//! let shapes = ["shapes/core.ttl", "shapes/people.ttl"];
//! validator.validate_rdf_turtle(&data, &shapes, &["ontology.ttl"])?;
//! # Ok::<(), validation_tool::ValidatorError>(())
//! ```

pub mod loader;
pub mod report;
pub mod shacl;
pub mod vocab;

pub use loader::{FileGraphLoader, GraphLoader, parse_graph, parse_turtle};
pub use report::{Severity, ValidationReport, ValidationResult, WarningPolicy, serialize_turtle};
pub use shacl::{ClassHierarchy, ShaclChecker};

use crate::error::{Result, ValidatorError};
use crate::logging::validation_span;
use oxigraph::io::RdfFormat;
use oxigraph::model::Graph;

/// A diagnostic graph that can render itself for logs and error messages.
pub trait ResultsGraph {
    fn serialize(&self) -> Result<String>;
}

impl ResultsGraph for Graph {
    fn serialize(&self) -> Result<String> {
        serialize_turtle(self)
    }
}

/// What a [`ConformanceChecker`] reports for one data graph.
#[derive(Debug, Clone)]
pub struct Conformance<R> {
    pub conforms: bool,
    pub results_graph: R,
    /// Engine-specific extra detail, e.g. a human summary
    pub extra: Option<String>,
}

/// Decides whether a data graph conforms to a shapes graph, given an ontology.
///
/// Whether warnings count as failures and how the ontology is used are the
/// implementation's policy.
pub trait ConformanceChecker {
    type Report: ResultsGraph;

    fn check(
        &self,
        data: &Graph,
        ontology: &Graph,
        shapes: &Graph,
    ) -> Result<Conformance<Self::Report>>;
}

/// Merge the Turtle sources in `parts`, in order, into one graph.
pub fn compound_graph<L, S>(loader: &L, parts: &[S]) -> Result<Graph>
where
    L: GraphLoader + ?Sized,
    S: AsRef<str>,
{
    let mut compound = Graph::new();
    for part in parts {
        let graph = loader.parse(part.as_ref(), RdfFormat::Turtle)?;
        compound.extend(graph.iter());
    }
    Ok(compound)
}

pub struct RdfValidator<L = FileGraphLoader, C = ShaclChecker> {
    loader: L,
    checker: C,
}

impl RdfValidator<FileGraphLoader, ShaclChecker> {
    pub fn new() -> Self {
        Self::with_parts(FileGraphLoader::new(), ShaclChecker::default())
    }
}

impl Default for RdfValidator<FileGraphLoader, ShaclChecker> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: GraphLoader, C: ConformanceChecker> RdfValidator<L, C> {
    pub fn with_parts(loader: L, checker: C) -> Self {
        Self { loader, checker }
    }

    /// Validate `data_graph` against the union of `shacl_parts` and the union
    /// of `ontology_parts`.
    ///
    /// # Errors
    /// - [`ValidatorError::Io`] / [`ValidatorError::RdfParse`] when a part
    ///   cannot be read or parsed
    /// - [`ValidatorError::Validation`] when the checker reports
    ///   non-conformance; the message embeds the serialized results graph
    ///
    /// The results graph is serialized once for the debug log. On failure it
    /// is serialized a second time for the error message, so a conforming call
    /// costs one [`ResultsGraph::serialize`] and a failing call costs two.
    pub fn validate_rdf_turtle<S, O>(
        &self,
        data_graph: &Graph,
        shacl_parts: &[S],
        ontology_parts: &[O],
    ) -> Result<bool>
    where
        S: AsRef<str>,
        O: AsRef<str>,
    {
        let target = format!("{} triple(s)", data_graph.len());
        let _span = validation_span("rdf", &target).entered();
        let shapes = compound_graph(&self.loader, shacl_parts)?;
        let ontology = compound_graph(&self.loader, ontology_parts)?;
        tracing::debug!(
            shacl_parts = shacl_parts.len(),
            shape_triples = shapes.len(),
            ontology_parts = ontology_parts.len(),
            ontology_triples = ontology.len(),
            "built compound graphs"
        );

        let outcome = self.checker.check(data_graph, &ontology, &shapes)?;
        let results = outcome.results_graph.serialize()?;
        tracing::debug!(results = %results, extra = ?outcome.extra, "conformance results");

        if outcome.conforms {
            tracing::info!("Data conforms to the ontology and SHACL shapes.");
            Ok(true)
        } else {
            tracing::error!(extra = ?outcome.extra, "SHACL validation error");
            Err(ValidatorError::validation(format!(
                "Data does not conform to the ontology and SHACL shapes: {}",
                outcome.results_graph.serialize()?
            )))
        }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn checker(&self) -> &C {
        &self.checker
    }
}
