//! Turtle source loading
//!
//! [`GraphLoader`] turns a location into an in-memory graph. The validator
//! calls it once per shapes/ontology part, always with [`RdfFormat::Turtle`].

use crate::error::{Result, ValidatorError};
use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::{Graph, Triple};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

pub trait GraphLoader {
    fn parse(&self, location: &str, format: RdfFormat) -> Result<Graph>;
}

/// Reads graphs from the local file system.
///
/// Relative locations are resolved against `base_dir` when one is set.
#[derive(Debug, Clone, Default)]
pub struct FileGraphLoader {
    base_dir: Option<PathBuf>,
}

impl FileGraphLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    pub fn resolve(&self, location: &str) -> PathBuf {
        let path = Path::new(location);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl GraphLoader for FileGraphLoader {
    fn parse(&self, location: &str, format: RdfFormat) -> Result<Graph> {
        let path = self.resolve(location);
        let file = File::open(&path).map_err(|source| ValidatorError::io(location, source))?;
        let base_iri = path
            .canonicalize()
            .ok()
            .map(|absolute| format!("file://{}", absolute.display()));

        let graph = parse_graph(BufReader::new(file), format, base_iri.as_deref(), location)?;
        tracing::debug!(location, triples = graph.len(), "parsed graph");
        Ok(graph)
    }
}

/// Parse every triple in `reader` into a fresh graph.
///
/// `location` only labels errors. An unusable `base_iri` is ignored rather
/// than failing the parse. Blank node labels are replaced with fresh ones, so
/// `_:b0` in two documents stays two nodes once their graphs are merged.
pub fn parse_graph(
    reader: impl Read,
    format: RdfFormat,
    base_iri: Option<&str>,
    location: &str,
) -> Result<Graph> {
    let parser = match base_iri {
        Some(iri) => RdfParser::from_format(format)
            .with_base_iri(iri)
            .unwrap_or_else(|_| RdfParser::from_format(format)),
        None => RdfParser::from_format(format),
    }
    .rename_blank_nodes();

    let mut graph = Graph::new();
    for quad in parser.for_reader(reader) {
        let quad = quad.map_err(|source| ValidatorError::RdfParse {
            location: location.to_string(),
            source,
        })?;
        graph.insert(&Triple::from(quad));
    }
    Ok(graph)
}

/// Parse an inline Turtle document.
pub fn parse_turtle(turtle: &str) -> Result<Graph> {
    parse_graph(turtle.as_bytes(), RdfFormat::Turtle, None, "<inline>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;
    use tempfile::TempDir;

    const PERSON_TTL: &str = r#"
        @prefix ex: <http://example.org/> .
        ex:alice a ex:Person ; ex:name "Alice" .
    "#;

    #[test]
    fn test_parse_inline_turtle() {
        let graph = parse_turtle(PERSON_TTL).unwrap();
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_malformed_turtle_is_parse_error() {
        let err = parse_turtle("@prefix ex: <http://example.org/> . ex:a ex:b").unwrap_err();
        assert_matches!(
            err,
            ValidatorError::RdfParse { ref location, .. } if location == "<inline>"
        );
    }

    #[test]
    fn test_file_loader_resolves_against_base_dir() {
        let dir = TempDir::new().unwrap();
        let mut file = File::create(dir.path().join("person.ttl")).unwrap();
        file.write_all(PERSON_TTL.as_bytes()).unwrap();

        let loader = FileGraphLoader::with_base_dir(dir.path());
        let graph = loader.parse("person.ttl", RdfFormat::Turtle).unwrap();
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_relative_iris_resolve_against_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("local.ttl"), "<#a> <#b> <#c> .").unwrap();

        let graph = FileGraphLoader::with_base_dir(dir.path())
            .parse("local.ttl", RdfFormat::Turtle)
            .unwrap();
        let triple = graph.iter().next().unwrap();
        assert!(triple.subject.to_string().starts_with("<file://"));
    }

    #[test]
    fn test_blank_node_labels_are_renamed_per_document() {
        let turtle = "_:shape <http://example.org/p> 1 .";
        let first = parse_turtle(turtle).unwrap();
        let second = parse_turtle(turtle).unwrap();

        let mut merged = first.clone();
        merged.extend(second.iter());
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = FileGraphLoader::new()
            .parse("/no/such/shapes.ttl", RdfFormat::Turtle)
            .unwrap_err();
        assert_matches!(err, ValidatorError::Io { .. });
    }
}
