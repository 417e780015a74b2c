pub mod config;
pub mod error;
pub mod json;
pub mod logging;
pub mod rdf;

pub use config::{CliArgs, CliCommand, ToolConfig, ValidationCommand};
pub use error::{ErrorKind, Result, SchemaViolation, ValidatorError};
pub use json::JsonValidator;
pub use logging::{LoggingConfig, init_logging};
pub use rdf::{RdfValidator, WarningPolicy};

use anyhow::Context;
use rdf::{FileGraphLoader, GraphLoader, ShaclChecker};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Run the validation described by `config`, stopping at the first failure.
pub fn run(config: &ToolConfig) -> anyhow::Result<()> {
    match &config.command {
        ValidationCommand::Json { schema, data } => {
            let validator = JsonValidator::new();
            let schema_path = config.resolve_path(schema);
            let files: Vec<_> = data.iter().map(|path| config.resolve_path(path)).collect();
            validate_json_files(&validator, &schema_path.to_string_lossy(), &files)?;
        }
        ValidationCommand::Rdf {
            data,
            shacl_parts,
            ontology_parts,
        } => {
            let loader = FileGraphLoader::with_base_dir(&config.base_dir);
            let data_location = data.to_string_lossy();
            let data_graph = loader
                .parse(&data_location, oxigraph::io::RdfFormat::Turtle)
                .with_context(|| format!("failed to load data graph {data_location}"))?;

            let validator =
                RdfValidator::with_parts(loader, ShaclChecker::new(config.warning_policy));
            validator
                .validate_rdf_turtle(&data_graph, shacl_parts.as_slice(), ontology_parts.as_slice())
                .with_context(|| format!("{data_location} failed validation"))?;
            println!("{data_location}: conforms");
        }
    }
    Ok(())
}

/// Validate each file against one schema, which is read once and then served
/// from the validator's cache.
fn validate_json_files(
    validator: &JsonValidator,
    schema_path: &str,
    files: &[PathBuf],
) -> anyhow::Result<()> {
    for path in files {
        let instance = read_json(path)?;
        validator
            .validate_json(&instance, schema_path, false)
            .with_context(|| format!("{} failed validation", path.display()))?;
        println!("{}: valid", path.display());
    }

    let stats = validator.cache().stats();
    tracing::debug!(
        files = files.len(),
        schema_loads = stats.loads,
        cache_hits = stats.hits,
        "json run complete"
    );
    Ok(())
}

fn read_json(path: &Path) -> anyhow::Result<serde_json::Value> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse JSON data {}", path.display()))
}
