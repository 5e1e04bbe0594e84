//! Template stores: read-only sets of template files addressed by relative path.
//! Templates are either bundled into the binary or read from a directory on disk.

use crate::error::{Error, Result};
use log::debug;
use rust_embed::RustEmbed;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Templates compiled into the binary.
#[derive(RustEmbed)]
#[folder = "templates/"]
struct BundledTemplates;

/// Read-only access to the files of one template.
///
/// Paths are relative to the template root and always use `/` as separator.
pub trait TemplateStore {
    /// Human-readable description of where the template comes from.
    fn describe(&self) -> String;

    /// Lists every file of the template in sorted order.
    fn files(&self) -> Result<Vec<String>>;

    /// Reads a file by its relative path.
    fn read(&self, path: &str) -> Result<Vec<u8>>;

    /// Returns true when the template contains a file at `path`.
    fn contains(&self, path: &str) -> bool;
}

/// Represents the location of a template.
#[derive(Debug, PartialEq, Eq)]
pub enum TemplateSource {
    /// Template bundled with the binary, by name
    Bundled(String),
    /// Template directory on the local filesystem
    Directory(PathBuf),
}

impl std::fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateSource::Bundled(name) => write!(f, "bundled template: '{name}'"),
            TemplateSource::Directory(path) => write!(f, "local path: '{}'", path.display()),
        }
    }
}

impl TemplateSource {
    /// Decides where templates come from. Called once at startup.
    ///
    /// # Arguments
    /// * `template` - Value of `--template`, a bundled name or a directory path
    /// * `dir_override` - Value of the template directory environment variable, if set
    pub fn select(template: &str, dir_override: Option<PathBuf>) -> Self {
        if let Some(dir) = dir_override {
            debug!("Template directory forced by environment: {}", dir.display());
            return Self::Directory(dir);
        }
        let path = Path::new(template);
        if path.is_dir() {
            Self::Directory(path.to_path_buf())
        } else {
            Self::Bundled(template.to_string())
        }
    }

    /// Opens the store this source points to.
    pub fn open(self) -> Result<Box<dyn TemplateStore>> {
        debug!("Opening {self}");
        match self {
            TemplateSource::Bundled(name) => Ok(Box::new(EmbeddedStore::new(name)?)),
            TemplateSource::Directory(path) => Ok(Box::new(DirectoryStore::new(path)?)),
        }
    }
}

/// Store backed by the templates bundled into the binary.
pub struct EmbeddedStore {
    name: String,
    prefix: String,
}

impl EmbeddedStore {
    /// Creates a store for the bundled template `name`.
    ///
    /// # Errors
    /// * `Error::Usage` if no bundled template has that name
    pub fn new<S: Into<String>>(name: S) -> Result<Self> {
        let name = name.into();
        let available = Self::available();
        if !available.contains(&name) {
            return Err(Error::Usage(format!(
                "unknown template '{}' (available: {})",
                name,
                available.join(", ")
            )));
        }
        let prefix = format!("{name}/");
        Ok(Self { name, prefix })
    }

    /// Names of all bundled templates, sorted.
    pub fn available() -> Vec<String> {
        BundledTemplates::iter()
            .filter_map(|path| path.split_once('/').map(|(name, _)| name.to_string()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl TemplateStore for EmbeddedStore {
    fn describe(&self) -> String {
        format!("bundled template '{}'", self.name)
    }

    fn files(&self) -> Result<Vec<String>> {
        let mut files: Vec<String> = BundledTemplates::iter()
            .filter_map(|path| path.strip_prefix(&self.prefix).map(str::to_string))
            .collect();
        files.sort();
        Ok(files)
    }

    fn read(&self, path: &str) -> Result<Vec<u8>> {
        BundledTemplates::get(&format!("{}{}", self.prefix, path))
            .map(|file| file.data.into_owned())
            .ok_or_else(|| {
                Error::Manifest(format!("'{path}' is not part of {}", self.describe()))
            })
    }

    fn contains(&self, path: &str) -> bool {
        BundledTemplates::get(&format!("{}{}", self.prefix, path)).is_some()
    }
}

/// Store backed by a template directory on disk.
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Creates a store rooted at `root`.
    ///
    /// # Errors
    /// * `Error::Usage` if `root` is not a directory
    pub fn new<P: Into<PathBuf>>(root: P) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::Usage(format!(
                "template directory '{}' does not exist",
                root.display()
            )));
        }
        Ok(Self { root })
    }
}

fn to_store_path(path: &Path) -> Option<String> {
    let parts = path
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}

impl TemplateStore for DirectoryStore {
    fn describe(&self) -> String {
        format!("template directory '{}'", self.root.display())
    }

    fn files(&self) -> Result<Vec<String>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .map_err(|e| Error::Manifest(e.to_string()))?;
            let relative = to_store_path(relative).ok_or_else(|| {
                Error::Manifest(format!("non UTF-8 path: {}", entry.path().display()))
            })?;
            files.push(relative);
        }
        files.sort();
        Ok(files)
    }

    fn read(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.root.join(path);
        fs::read(&full_path).map_err(Error::io_at(full_path))
    }

    fn contains(&self, path: &str) -> bool {
        self.root.join(path).is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_template_source_display() {
        let bundled = TemplateSource::Bundled("nextjs".to_string());
        assert_eq!(format!("{bundled}"), "bundled template: 'nextjs'");

        let dir = TemplateSource::Directory(PathBuf::from("/path/to/template"));
        assert_eq!(format!("{dir}"), "local path: '/path/to/template'");
    }

    #[test]
    fn test_select_prefers_environment_override() {
        let source = TemplateSource::select("nextjs", Some(PathBuf::from("/tmp/custom")));
        assert_eq!(source, TemplateSource::Directory(PathBuf::from("/tmp/custom")));
    }

    #[test]
    fn test_select_existing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let arg = temp_dir.path().to_str().unwrap();
        assert_eq!(
            TemplateSource::select(arg, None),
            TemplateSource::Directory(temp_dir.path().to_path_buf())
        );
        assert_eq!(
            TemplateSource::select("nextjs", None),
            TemplateSource::Bundled("nextjs".to_string())
        );
    }

    #[test]
    fn test_embedded_store_lists_bundled_template() {
        assert!(EmbeddedStore::available().contains(&"nextjs".to_string()));
        let store = EmbeddedStore::new("nextjs").unwrap();
        let files = store.files().unwrap();
        assert!(files.contains(&"manifest.yml".to_string()));
        assert!(store.contains("package.json.j2"));
        assert!(!store.contains("missing.txt"));
    }

    #[test]
    fn test_embedded_store_unknown_name() {
        assert!(matches!(EmbeddedStore::new("rails"), Err(Error::Usage(_))));
    }

    #[test]
    fn test_directory_store_uses_forward_slashes() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("app/api")).unwrap();
        fs::write(temp_dir.path().join("app/api/route.ts"), "export {}").unwrap();
        fs::write(temp_dir.path().join("README.md"), "# readme").unwrap();

        let store = DirectoryStore::new(temp_dir.path()).unwrap();
        assert_eq!(store.files().unwrap(), vec!["README.md", "app/api/route.ts"]);
        assert_eq!(store.read("app/api/route.ts").unwrap(), b"export {}");
    }

    #[test]
    fn test_directory_store_missing_root() {
        assert!(DirectoryStore::new("/definitely/not/here").is_err());
    }
}
