//! Recursive search for a module file below a root directory.
//!
//! The search is depth-first over the *subdirectories* of the root. Files that
//! sit directly in the root are never considered; only descendants are
//! scanned. Sibling directories are visited in lexicographic order and the
//! first directory holding exactly one match ends the search, so a later
//! sibling with its own copy of the module is never reached. Two or more
//! matches in one directory make the request ambiguous.
//!
//! File names are compared ignoring ASCII case, which keeps the lookup stable
//! across case-sensitive and case-insensitive filesystems. Symbolic links to
//! directories are not followed.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised while locating a module.
#[derive(Debug, Error)]
pub enum LocateError {
    /// No descendant directory holds the module.
    #[error("could not find module '{module}' in any directory below '{root}'")]
    NotFound {
        /// Module base name that was searched for.
        module: String,
        /// Directory the search started from.
        root: Utf8PathBuf,
    },

    /// A directory holds more than one file matching the module name.
    #[error(
        "module '{module}' is ambiguous below '{root}': '{directory}' holds {} candidates ({})",
        .candidates.len(),
        join_paths(.candidates)
    )]
    Ambiguous {
        /// Module base name that was searched for.
        module: String,
        /// Directory the search started from.
        root: Utf8PathBuf,
        /// Directory holding the competing files.
        directory: Utf8PathBuf,
        /// Every matching file in that directory.
        candidates: Vec<Utf8PathBuf>,
    },

    /// A directory could not be opened or listed.
    #[error("failed to read directory '{directory}': {source}")]
    Io {
        /// Directory being read.
        directory: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

fn join_paths(paths: &[Utf8PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Locates module files by base name.
///
/// # Example
///
/// ```no_run
/// use camino::Utf8Path;
/// use dotcall_cli::ModuleLocator;
///
/// let locator = ModuleLocator::new();
/// let path = locator.find(Utf8Path::new("."), "SampleLib")?;
/// println!("{path}");
/// # Ok::<(), dotcall_cli::LocateError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleLocator {
    extension: String,
}

impl Default for ModuleLocator {
    fn default() -> Self {
        Self::with_extension(std::env::consts::DLL_EXTENSION)
    }
}

impl ModuleLocator {
    /// Creates a locator for the platform's dynamic-library extension.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a locator for a specific file extension (without the dot).
    #[must_use]
    pub fn with_extension(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    /// Returns the file extension modules are expected to carry.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Returns the file name a module with the given base name must have.
    #[must_use]
    pub fn file_name(&self, module: &str) -> String {
        format!("{module}.{}", self.extension)
    }

    /// Finds the file for `module` below `root`.
    ///
    /// # Errors
    ///
    /// Returns [`LocateError::NotFound`] when no descendant directory holds
    /// the module, [`LocateError::Ambiguous`] when the first directory with a
    /// match holds several, and [`LocateError::Io`] when a directory cannot
    /// be read.
    pub fn find(&self, root: &Utf8Path, module: &str) -> Result<Utf8PathBuf, LocateError> {
        let file_name = self.file_name(module);
        let directory = Dir::open_ambient_dir(root, ambient_authority())
            .map_err(|source| io_error(root, source))?;
        let search = Search {
            module,
            file_name: &file_name,
            root,
        };

        search
            .descend(&directory, root)?
            .ok_or_else(|| LocateError::NotFound {
                module: module.to_owned(),
                root: root.to_owned(),
            })
    }
}

struct Search<'a> {
    module: &'a str,
    file_name: &'a str,
    root: &'a Utf8Path,
}

impl Search<'_> {
    fn descend(&self, directory: &Dir, path: &Utf8Path) -> Result<Option<Utf8PathBuf>, LocateError> {
        debug!(directory = %path, module = self.module, "looking for module");
        for name in subdirectories(directory, path)? {
            let child_path = path.join(&name);
            let child = directory
                .open_dir(&name)
                .map_err(|source| io_error(&child_path, source))?;
            let matches = matching_files(&child, &child_path, self.file_name)?;
            debug!(directory = %child_path, count = matches.len(), "found candidate files");

            match matches.as_slice() {
                [] => {
                    if let Some(found) = self.descend(&child, &child_path)? {
                        return Ok(Some(found));
                    }
                }
                [single] => return Ok(Some(child_path.join(single))),
                _ => {
                    return Err(LocateError::Ambiguous {
                        module: self.module.to_owned(),
                        root: self.root.to_owned(),
                        candidates: matches.iter().map(|file| child_path.join(file)).collect(),
                        directory: child_path,
                    });
                }
            }
        }
        Ok(None)
    }
}

fn subdirectories(directory: &Dir, path: &Utf8Path) -> Result<Vec<String>, LocateError> {
    let mut names = Vec::new();
    for entry in directory.entries().map_err(|source| io_error(path, source))? {
        let dir_entry = entry.map_err(|source| io_error(path, source))?;
        let file_type = dir_entry
            .file_type()
            .map_err(|source| io_error(path, source))?;
        if !file_type.is_dir() {
            continue;
        }
        match dir_entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => warn!(directory = %path, name = ?raw, "skipping directory with a non-UTF-8 name"),
        }
    }
    names.sort();
    Ok(names)
}

fn matching_files(
    directory: &Dir,
    path: &Utf8Path,
    file_name: &str,
) -> Result<Vec<String>, LocateError> {
    let mut matches = Vec::new();
    for entry in directory.entries().map_err(|source| io_error(path, source))? {
        let dir_entry = entry.map_err(|source| io_error(path, source))?;
        let Ok(name) = dir_entry.file_name().into_string() else {
            continue;
        };
        if !name.eq_ignore_ascii_case(file_name) {
            continue;
        }
        match directory.metadata(&name) {
            Ok(metadata) if metadata.is_file() => matches.push(name),
            Ok(_) => {}
            Err(error) => {
                warn!(directory = %path, file = %name, %error, "skipping unreadable candidate");
            }
        }
    }
    matches.sort();
    Ok(matches)
}

fn io_error(directory: &Utf8Path, source: io::Error) -> LocateError {
    LocateError::Io {
        directory: directory.to_owned(),
        source,
    }
}

#[cfg(test)]
mod tests;
