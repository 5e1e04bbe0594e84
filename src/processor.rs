//! Generation planning.
//! Resolves every manifest entry into its final destination path and final
//! bytes, entirely in memory, so that no file is written unless the whole
//! template renders.

use crate::constants::TESTS_GROUP;
use crate::error::{Error, Result};
use crate::manifest::{EntryKind, ManifestEntry};
use crate::renderer::TemplateRenderer;
use crate::store::TemplateStore;
use crate::variables::VariableSet;
use log::debug;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// One file ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    /// Path of the source in the template store
    pub source: String,
    /// Destination relative to the generation target
    pub destination: PathBuf,
    pub kind: EntryKind,
    pub contents: Vec<u8>,
}

/// Ordered list of files for one generation run.
#[derive(Debug, Default)]
pub struct GenerationPlan {
    pub files: Vec<PlannedFile>,
    /// Sources left out because of their group
    pub skipped: Vec<String>,
}

/// Returns true when a rendered destination is a safe relative path.
///
/// Rejects empty paths, absolute paths, doubled separators and any `.` or
/// `..` component.
pub fn is_rendered_path_valid(path: &str) -> bool {
    if path.trim().is_empty() || path.starts_with('/') || path.contains('\\') {
        return false;
    }
    if path.split('/').any(|part| part.is_empty() || part == "." || part == "..") {
        return false;
    }
    Path::new(path).components().all(|c| matches!(c, Component::Normal(_)))
}

/// Builds generation plans from a store, a renderer and a variable set.
pub struct Processor<'a> {
    store: &'a dyn TemplateStore,
    renderer: &'a dyn TemplateRenderer,
    variables: &'a VariableSet,
    skip_tests: bool,
}

impl<'a> Processor<'a> {
    pub fn new(
        store: &'a dyn TemplateStore,
        renderer: &'a dyn TemplateRenderer,
        variables: &'a VariableSet,
        skip_tests: bool,
    ) -> Self {
        Self { store, renderer, variables, skip_tests }
    }

    /// Resolves one entry.
    ///
    /// # Errors
    /// * `Error::UnresolvedToken` / `Error::Template` if the path or content fails to render
    /// * `Error::Manifest` if the rendered destination is not a safe relative path
    ///   or a substituted source is not UTF-8 text
    pub fn process(&self, entry: &ManifestEntry, context: &serde_json::Value) -> Result<PlannedFile> {
        let destination = self.renderer.render(entry.destination(), entry.destination(), context)?;
        if !is_rendered_path_valid(&destination) {
            return Err(Error::Manifest(format!(
                "'{}' renders to invalid destination path '{destination}'",
                entry.source
            )));
        }

        let raw = self.store.read(&entry.source)?;
        let kind = entry.kind();
        let contents = match kind {
            EntryKind::Copy => {
                debug!("Copying file: {} -> {destination}", entry.source);
                raw
            }
            EntryKind::Substitute => {
                debug!("Rendering file: {} -> {destination}", entry.source);
                let text = String::from_utf8(raw).map_err(|_| {
                    Error::Manifest(format!("'{}' is marked substitute but is not UTF-8", entry.source))
                })?;
                self.renderer.render(&entry.source, &text, context)?.into_bytes()
            }
        };

        Ok(PlannedFile { source: entry.source.clone(), destination: PathBuf::from(destination), kind, contents })
    }

    /// Resolves every entry in manifest order.
    ///
    /// # Errors
    /// * Any error from [`Processor::process`]
    /// * `Error::Manifest` if two entries resolve to the same destination
    pub fn plan(&self, entries: &[ManifestEntry]) -> Result<GenerationPlan> {
        let context = self.variables.to_context();
        let mut plan = GenerationPlan::default();
        let mut seen: HashMap<PathBuf, String> = HashMap::new();

        for entry in entries {
            if self.skip_tests && entry.in_group(TESTS_GROUP) {
                debug!("Skipping {}: tests are disabled", entry.source);
                plan.skipped.push(entry.source.clone());
                continue;
            }
            let file = self.process(entry, &context)?;
            if let Some(previous) = seen.insert(file.destination.clone(), file.source.clone()) {
                return Err(Error::Manifest(format!(
                    "'{}' and '{previous}' both resolve to '{}'",
                    file.source,
                    file.destination.display()
                )));
            }
            plan.files.push(file);
        }

        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_rendered_path_valid() {
        assert!(!is_rendered_path_valid(""));
        assert!(!is_rendered_path_valid("output//filename.txt"));
        assert!(!is_rendered_path_valid("/filename.txt"));
        assert!(!is_rendered_path_valid("../escape.txt"));
        assert!(!is_rendered_path_valid("app/./page.tsx"));
        assert!(is_rendered_path_valid("filename.txt"));
        assert!(is_rendered_path_valid("output/filename.txt"));
        assert!(is_rendered_path_valid(".gitignore"));
    }
}
