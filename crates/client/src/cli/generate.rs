//! Generate CLI command and the generation arguments shared with `render`.

use std::path::{Path, PathBuf};

use clap::{Args, Parser};
use serde_json::Value;
use shaper_core::generation::GenerationRequest;
use uuid::Uuid;

use crate::error::Result;

/// Generation parameters.
#[derive(Debug, Clone, Args)]
pub struct GenerationArgs {
    /// Natural-language description of the component.
    pub prompt: String,
    /// JSON schema file describing the component's data.
    #[arg(long)]
    pub schema_file: Option<PathBuf>,
    /// JSON schema file extending the base schema.
    #[arg(long)]
    pub extend_schema_file: Option<PathBuf>,
    /// Style variant (repeatable).
    #[arg(long = "variant")]
    pub variants: Vec<String>,
    /// Generation step (repeatable).
    #[arg(long = "step")]
    pub steps: Vec<String>,
    /// Component id sent with the request.
    #[arg(long, conflicts_with = "fresh")]
    pub id: Option<String>,
    /// Tag the request with a random component id.
    #[arg(long)]
    pub fresh: bool,
    /// Model identifier.
    #[arg(long)]
    pub model: Option<String>,
}

impl GenerationArgs {
    /// Build the request, reading schema files from disk.
    pub fn to_request(&self) -> Result<GenerationRequest> {
        let mut request = GenerationRequest::new(&self.prompt);

        if !self.variants.is_empty() {
            request = request.with_variants(self.variants.iter().cloned());
        }
        if !self.steps.is_empty() {
            request = request.with_steps(self.steps.iter().cloned());
        }
        if let Some(path) = &self.schema_file {
            request = request.with_schema(&read_schema(path)?);
        }
        if let Some(path) = &self.extend_schema_file {
            request = request.with_extend_schema(&read_schema(path)?);
        }
        if let Some(id) = &self.id {
            request = request.with_id(id);
        } else if self.fresh {
            request = request.with_id(Uuid::new_v4().to_string());
        }
        if let Some(model) = &self.model {
            request = request.with_model(model);
        }

        Ok(request)
    }
}

fn read_schema(path: &Path) -> Result<Value> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Generate command.
#[derive(Debug, Parser)]
pub struct GenerateCommand {
    #[command(flatten)]
    pub params: GenerationArgs,
    /// Print every intermediate state, not only the final one.
    #[arg(long)]
    pub watch: bool,
}
