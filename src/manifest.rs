//! Template manifest handling.
//! The manifest (`manifest.yml` at the template root) lists, in order, which
//! store files are materialized, where they go, and how they are processed.
//!
//! ```yaml
//! name: nextjs
//! description: Next.js workspace
//! ignore:
//!   - "**/.DS_Store"
//! files:
//!   - source: package.json.j2
//!   - source: gitignore
//!     destination: .gitignore
//!   - source: e2e/home.spec.ts.j2
//!     group: tests
//! ```
//!
//! An empty `files` list means every store file except the manifest itself and
//! the `ignore` matches, in sorted order.

use crate::constants::{MANIFEST_FILE, TEMPLATE_SUFFIX};
use crate::error::{Error, Result};
use crate::store::TemplateStore;
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::debug;
use serde::Deserialize;

/// How a manifest entry is materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Bytes are copied unchanged
    Copy,
    /// Text is rendered with the variable set
    Substitute,
}

/// One entry of the template manifest as written in `manifest.yml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestEntry {
    pub source: String,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub kind: Option<EntryKind>,
    #[serde(default)]
    pub group: Option<String>,
}

impl ManifestEntry {
    pub fn new<S: Into<String>>(source: S) -> Self {
        Self { source: source.into(), destination: None, kind: None, group: None }
    }

    /// Explicit kind, or `Substitute` for `.j2` sources and `Copy` otherwise.
    pub fn kind(&self) -> EntryKind {
        self.kind.unwrap_or_else(|| {
            if is_template_path(&self.source) {
                EntryKind::Substitute
            } else {
                EntryKind::Copy
            }
        })
    }

    /// Destination path template; defaults to the source without its `.j2` suffix.
    pub fn destination(&self) -> &str {
        match &self.destination {
            Some(destination) => destination,
            None => self.source.strip_suffix(TEMPLATE_SUFFIX).unwrap_or(&self.source),
        }
    }

    pub fn in_group(&self, group: &str) -> bool {
        self.group.as_deref() == Some(group)
    }
}

/// Returns true for `name.ext.j2` style file names.
pub fn is_template_path(path: &str) -> bool {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let parts: Vec<&str> = file_name.split('.').collect();
    parts.len() > 2 && parts.last() == Some(&"j2")
}

/// The template manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ignore: Vec<String>,
    #[serde(default)]
    pub files: Vec<ManifestEntry>,
}

impl Manifest {
    /// Parses manifest content.
    ///
    /// # Errors
    /// * `Error::Manifest` if the YAML does not match the manifest schema
    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| Error::Manifest(format!("invalid {MANIFEST_FILE}: {e}")))
    }

    /// Compiles the `ignore` patterns.
    pub fn ignore_set(&self) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.ignore {
            builder.add(Glob::new(pattern).map_err(|e| {
                Error::Manifest(format!("invalid ignore pattern '{pattern}': {e}"))
            })?);
        }
        builder
            .build()
            .map_err(|e| Error::Manifest(format!("ignore patterns failed to compile: {e}")))
    }
}

/// Loads the manifest of a store and resolves it into the final ordered entry list.
///
/// # Errors
/// * `Error::Manifest` if the manifest is missing or invalid, if an entry
///   names a source absent from the store, or if a source path escapes the
///   template root
pub fn load_manifest(store: &dyn TemplateStore) -> Result<(Manifest, Vec<ManifestEntry>)> {
    if !store.contains(MANIFEST_FILE) {
        return Err(Error::Manifest(format!("{} has no {MANIFEST_FILE}", store.describe())));
    }
    let raw = store.read(MANIFEST_FILE)?;
    let content = String::from_utf8(raw)
        .map_err(|_| Error::Manifest(format!("{MANIFEST_FILE} is not valid UTF-8")))?;
    let manifest = Manifest::parse(&content)?;
    let ignored = manifest.ignore_set()?;

    let entries = if manifest.files.is_empty() {
        debug!("Manifest lists no files, discovering from {}", store.describe());
        store
            .files()?
            .into_iter()
            .filter(|path| path != MANIFEST_FILE)
            .filter(|path| {
                let skip = ignored.is_match(path);
                if skip {
                    debug!("Skipping {path}: matched ignore pattern");
                }
                !skip
            })
            .map(ManifestEntry::new)
            .collect()
    } else {
        manifest.files.clone()
    };

    for entry in &entries {
        if !is_safe_source(&entry.source) {
            return Err(Error::Manifest(format!(
                "source '{}' must be a relative path inside the template",
                entry.source
            )));
        }
        if !store.contains(&entry.source) {
            return Err(Error::Manifest(format!(
                "source '{}' does not exist in {}",
                entry.source,
                store.describe()
            )));
        }
    }

    debug!("Manifest '{}' resolved to {} entries", manifest.name, entries.len());
    Ok((manifest, entries))
}

fn is_safe_source(source: &str) -> bool {
    !source.is_empty()
        && !source.starts_with('/')
        && !source.contains('\\')
        && source.split('/').all(|part| !part.is_empty() && part != "." && part != "..")
}
