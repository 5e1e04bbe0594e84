//! One generation run: resolve variables, plan every file, then materialize.

use crate::error::Result;
use crate::manifest::{load_manifest, Manifest};
use crate::materializer::{materialize, Report};
use crate::processor::Processor;
use crate::prompt::Prompter;
use crate::renderer::MiniJinjaRenderer;
use crate::store::TemplateStore;
use crate::variables::{resolve, Request, VariableSet};
use indexmap::IndexMap;
use log::info;

/// Result of a successful run.
#[derive(Debug)]
pub struct Outcome {
    pub manifest: Manifest,
    pub variables: VariableSet,
    pub report: Report,
    /// Sources left out by `--skip-tests`
    pub skipped: Vec<String>,
}

impl Outcome {
    /// One-line summary printed after the per-file lines.
    pub fn summary(&self) -> String {
        format!(
            "Project '{}' generated successfully from template '{}' ({}) in {} ({} files).",
            self.variables.get_str("project_name").unwrap_or_default(),
            self.manifest.name,
            self.manifest.description,
            self.report.target.display(),
            self.report.files.len()
        )
    }
}

/// Generates a project from `store` into `request.target`.
///
/// Variables are validated and every file is rendered before the target is
/// touched; a failure at any of those stages leaves the filesystem as it was.
pub fn generate(
    store: &dyn TemplateStore,
    request: &Request,
    answers: &IndexMap<String, serde_json::Value>,
    prompter: Option<&dyn Prompter>,
    overwrite: bool,
) -> Result<Outcome> {
    let variables = resolve(request, answers, prompter)?;
    let (manifest, entries) = load_manifest(store)?;
    info!("Generating '{}' from {}", manifest.name, store.describe());

    let renderer = MiniJinjaRenderer::new();
    let processor = Processor::new(store, &renderer, &variables, request.skip_tests);
    let plan = processor.plan(&entries)?;

    let report = materialize(&plan, &request.target, overwrite)?;
    Ok(Outcome { manifest, variables, report, skipped: plan.skipped })
}
