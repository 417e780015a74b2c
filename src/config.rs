use crate::rdf::WarningPolicy;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "validation-tool",
    about = "Validate JSON documents against JSON Schema and RDF graphs against SHACL shapes",
    version
)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)",
        global = true
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "VALIDATION_TOOL_BASE_DIR",
        value_name = "DIR",
        help = "Directory relative input paths are resolved against",
        global = true
    )]
    pub base_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// Validate JSON data files against one JSON Schema
    Json {
        #[arg(
            long,
            env = "VALIDATION_TOOL_SCHEMA",
            value_name = "FILE",
            help = "JSON Schema file"
        )]
        schema: PathBuf,

        #[arg(value_name = "DATA", required = true, help = "JSON data files")]
        data: Vec<PathBuf>,
    },
    /// Validate a Turtle data graph against SHACL shapes and an ontology
    Rdf {
        #[arg(long, value_name = "FILE", help = "Turtle data graph")]
        data: PathBuf,

        #[arg(
            long,
            env = "VALIDATION_TOOL_SHACL",
            value_name = "FILE",
            value_delimiter = ',',
            help = "Comma-separated SHACL Turtle files, merged in order"
        )]
        shacl: Option<Vec<String>>,

        #[arg(
            long,
            env = "VALIDATION_TOOL_ONTOLOGY",
            value_name = "FILE",
            value_delimiter = ',',
            help = "Comma-separated ontology Turtle files, merged in order"
        )]
        ontology: Option<Vec<String>>,

        #[arg(long, help = "Treat sh:Warning and sh:Info results as failures")]
        fail_on_warnings: bool,
    },
}

/// A fully resolved validation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationCommand {
    Json { schema: PathBuf, data: Vec<PathBuf> },
    Rdf {
        data: PathBuf,
        shacl_parts: Vec<String>,
        ontology_parts: Vec<String>,
    },
}

#[derive(Debug, Clone)]
pub struct ToolConfig {
    pub base_dir: PathBuf,
    pub warning_policy: WarningPolicy,
    pub command: ValidationCommand,
}

impl ToolConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            config,
            base_dir: cli_base_dir,
            command,
        } = args;

        let file_config = if let Some(path) = config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            base_dir: file_base_dir,
            shacl_parts: file_shacl_parts,
            ontology_parts: file_ontology_parts,
            warning_policy: file_warning_policy,
        } = file_config;

        let base_dir = cli_base_dir
            .or(file_base_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        let mut warning_policy = file_warning_policy.unwrap_or_default();

        let command = match command {
            CliCommand::Json { schema, data } => {
                anyhow::ensure!(!data.is_empty(), "at least one JSON data file must be provided");
                ValidationCommand::Json { schema, data }
            }
            CliCommand::Rdf {
                data,
                shacl,
                ontology,
                fail_on_warnings,
            } => {
                if fail_on_warnings {
                    warning_policy = WarningPolicy::Fail;
                }
                ValidationCommand::Rdf {
                    data,
                    shacl_parts: normalize_parts(shacl.or(file_shacl_parts).unwrap_or_default()),
                    ontology_parts: normalize_parts(
                        ontology.or(file_ontology_parts).unwrap_or_default(),
                    ),
                }
            }
        };

        Ok(Self {
            base_dir,
            warning_policy,
            command,
        })
    }

    /// Fail fast on inputs that cannot be read.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.base_dir.is_dir(),
            "base directory {:?} does not exist or is not a directory",
            self.base_dir
        );

        match &self.command {
            ValidationCommand::Json { schema, data, .. } => {
                self.ensure_file("schema", schema)?;
                for path in data {
                    self.ensure_file("JSON data file", path)?;
                }
            }
            ValidationCommand::Rdf {
                data,
                shacl_parts,
                ontology_parts,
            } => {
                self.ensure_file("data graph", data)?;
                for part in shacl_parts {
                    self.ensure_file("SHACL part", Path::new(part))?;
                }
                for part in ontology_parts {
                    self.ensure_file("ontology part", Path::new(part))?;
                }
            }
        }
        Ok(())
    }

    pub fn resolve_path<P: AsRef<Path>>(&self, relative: P) -> PathBuf {
        let relative = relative.as_ref();
        if relative.is_absolute() {
            relative.to_path_buf()
        } else {
            self.base_dir.join(relative)
        }
    }

    fn ensure_file(&self, what: &str, path: &Path) -> Result<()> {
        let resolved = self.resolve_path(path);
        anyhow::ensure!(resolved.exists(), "{what} {:?} does not exist", resolved);
        anyhow::ensure!(resolved.is_file(), "{what} {:?} is not a file", resolved);
        Ok(())
    }
}

fn normalize_parts(parts: Vec<String>) -> Vec<String> {
    parts
        .into_iter()
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    base_dir: Option<PathBuf>,
    shacl_parts: Option<Vec<String>>,
    ontology_parts: Option<Vec<String>>,
    warning_policy: Option<WarningPolicy>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}
