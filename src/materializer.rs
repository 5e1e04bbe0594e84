//! Materialization of a generation plan onto disk.
//!
//! Files are first written to a staging directory. A new target is created
//! by renaming a staging directory made next to it; an existing target is
//! staged inside itself, so moves never leave its filesystem, and receives
//! the staged files one by one while a journal records every change, so a
//! failure can be undone completely.

use crate::constants::STAGING_PREFIX;
use crate::error::{Error, Result};
use crate::processor::GenerationPlan;
use log::{debug, warn};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// What happened to a destination path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    Created,
    Overwritten,
}

impl fmt::Display for FileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileAction::Created => write!(f, "created"),
            FileAction::Overwritten => write!(f, "overwritten"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub action: FileAction,
}

/// Outcome of a successful generation.
#[derive(Debug)]
pub struct Report {
    pub target: PathBuf,
    pub files: Vec<WrittenFile>,
}

/// Fails when the target exists but is not a directory.
pub fn check_target(target: &Path) -> Result<()> {
    if target.exists() && !target.is_dir() {
        return Err(Error::Validation(format!(
            "target '{}' exists and is not a directory",
            target.display()
        )));
    }
    Ok(())
}

/// Collects every planned destination that cannot be written as is.
///
/// Existing files are conflicts only without `overwrite`. A destination
/// occupied by a directory, or whose parent path crosses an existing file,
/// is always a conflict.
pub fn find_conflicts(plan: &GenerationPlan, target: &Path, overwrite: bool) -> Vec<PathBuf> {
    let mut conflicts = Vec::new();
    for file in &plan.files {
        let destination = target.join(&file.destination);
        let blocked_parent = file
            .destination
            .ancestors()
            .skip(1)
            .filter(|a| !a.as_os_str().is_empty())
            .map(|a| target.join(a))
            .find(|a| a.exists() && !a.is_dir());
        if let Some(parent) = blocked_parent {
            if !conflicts.contains(&parent) {
                conflicts.push(parent);
            }
        } else if destination.is_dir() || (destination.exists() && !overwrite) {
            conflicts.push(destination);
        }
    }
    conflicts
}

/// Writes a plan into `target`.
///
/// # Errors
/// * `Error::Validation` if the target is not a directory
/// * `Error::Conflict` if destinations already exist, before anything is written
/// * `Error::RolledBack` if writing failed and every change was undone
/// * `Error::Incomplete` if writing failed and the undo left paths behind
pub fn materialize(plan: &GenerationPlan, target: &Path, overwrite: bool) -> Result<Report> {
    check_target(target)?;
    let conflicts = find_conflicts(plan, target, overwrite);
    if !conflicts.is_empty() {
        return Err(Error::Conflict { paths: conflicts });
    }

    if target.exists() {
        // Staging inside the target keeps every move on the target's filesystem,
        // including when the target is a mount point.
        let staging = stage(plan, target)?;
        return promote_staged(plan, staging.path(), target);
    }

    let parent = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(Error::io_at(&parent))?;

    let staging = stage(plan, &parent)?;
    fs::rename(staging.path(), target).map_err(|e| Error::RolledBack {
        source: Box::new(Error::IoAt { path: target.to_path_buf(), source: e }),
    })?;
    let files = plan
        .files
        .iter()
        .map(|f| WrittenFile { path: target.join(&f.destination), action: FileAction::Created })
        .collect();
    Ok(Report { target: target.to_path_buf(), files })
}

/// Writes every planned file into a fresh staging directory under `root`.
fn stage(plan: &GenerationPlan, root: &Path) -> Result<TempDir> {
    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(root)
        .map_err(Error::io_at(root))?;
    debug!("Staging {} files in {}", plan.files.len(), staging.path().display());

    for file in &plan.files {
        write_file(&staging.path().join(&file.destination), &file.contents)
            .map_err(|e| Error::RolledBack { source: Box::new(e) })?;
    }
    Ok(staging)
}

/// Moves staged files into an existing target, undoing everything on failure.
fn promote_staged(plan: &GenerationPlan, staging: &Path, target: &Path) -> Result<Report> {
    let mut promotion = Promotion::new(target)?;
    let mut files = Vec::with_capacity(plan.files.len());
    for file in &plan.files {
        match promotion.promote(&staging.join(&file.destination), &file.destination) {
            Ok(action) => {
                files.push(WrittenFile { path: target.join(&file.destination), action })
            }
            Err(e) => {
                warn!("Promoting '{}' failed, rolling back", file.destination.display());
                return Err(promotion.abort(e));
            }
        }
    }

    Ok(Report { target: target.to_path_buf(), files })
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(Error::io_at(parent))?;
    }
    fs::write(path, contents).map_err(Error::io_at(path))
}

/// Renames a file, copying it when source and destination sit on different devices.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!("'{}' is on another device, copying", to.display());
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
        result => result,
    }
}

/// A reversible change to the target.
#[derive(Debug)]
enum Step {
    CreatedDir(PathBuf),
    CreatedFile(PathBuf),
    Replaced { destination: PathBuf, backup: PathBuf },
}

/// Moves staged files into an existing target, journaling each change.
struct Promotion<'a> {
    target: &'a Path,
    backup: TempDir,
    journal: Vec<Step>,
}

impl<'a> Promotion<'a> {
    fn new(target: &'a Path) -> Result<Self> {
        let backup = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(target)
            .map_err(Error::io_at(target))?;
        Ok(Self { target, backup, journal: Vec::new() })
    }

    fn promote(&mut self, staged: &Path, relative: &Path) -> Result<FileAction> {
        let destination = self.target.join(relative);

        if let Some(parent) = destination.parent() {
            let mut missing: Vec<&Path> =
                parent.ancestors().take_while(|dir| !dir.exists()).collect();
            missing.reverse();
            for dir in missing {
                fs::create_dir(dir).map_err(Error::io_at(dir))?;
                self.journal.push(Step::CreatedDir(dir.to_path_buf()));
            }
        }

        let action = if destination.exists() {
            let backup = self.backup.path().join(relative);
            if let Some(parent) = backup.parent() {
                fs::create_dir_all(parent).map_err(Error::io_at(parent))?;
            }
            move_file(&destination, &backup).map_err(Error::io_at(&destination))?;
            self.journal.push(Step::Replaced { destination: destination.clone(), backup });
            FileAction::Overwritten
        } else {
            FileAction::Created
        };

        move_file(staged, &destination).map_err(Error::io_at(&destination))?;
        if action == FileAction::Created {
            self.journal.push(Step::CreatedFile(destination));
        }
        Ok(action)
    }

    /// Rolls back and wraps `cause` in the error matching the rollback outcome.
    fn abort(self, cause: Error) -> Error {
        let leftovers = self.rollback();
        if leftovers.is_empty() {
            Error::RolledBack { source: Box::new(cause) }
        } else {
            Error::Incomplete { paths: leftovers, source: Box::new(cause) }
        }
    }

    /// Undoes the journal in reverse. Returns the paths it could not restore.
    fn rollback(self) -> Vec<PathBuf> {
        let mut leftovers = Vec::new();
        for step in self.journal.iter().rev() {
            let result = match step {
                Step::CreatedFile(path) => fs::remove_file(path),
                Step::CreatedDir(path) => fs::remove_dir(path),
                Step::Replaced { destination, backup } => move_file(backup, destination),
            };
            if let Err(e) = result {
                let path = match step {
                    Step::CreatedFile(path) | Step::CreatedDir(path) => path,
                    Step::Replaced { destination, .. } => destination,
                };
                warn!("Rollback could not restore '{}': {e}", path.display());
                leftovers.push(path.clone());
            }
        }
        if !leftovers.is_empty() {
            // Originals that failed to move back still live in the backup directory.
            let kept = self.backup.keep();
            warn!("Backups kept in '{}'", kept.display());
            leftovers.push(kept);
        }
        leftovers
    }
}
