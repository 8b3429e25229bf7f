//! Loading module libraries and reading their exported definitions.
//!
//! [`ModuleLoader`] is the seam between the pipeline and the platform's
//! dynamic loader. [`DylibLoader`] opens a library with `libloading`, checks
//! the exported ABI revision, and calls the definition entry point. Tests and
//! embedders can supply in-process definitions through
//! [`LoadedModule::in_process`].

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use dotcall_module::{
    ABI_VERSION, ABI_VERSION_SYMBOL, DEFINITION_SYMBOL, DefinitionEntryPoint, DefinitionError,
    ModuleDefinition,
};
use libloading::{Library, Symbol};
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while loading a module.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The platform loader rejected the file.
    #[error("failed to load module '{path}': {source}")]
    Open {
        /// Path of the module file.
        path: Utf8PathBuf,
        /// Error reported by the platform loader.
        #[source]
        source: libloading::Error,
    },

    /// The library does not export a required symbol.
    #[error("module '{path}' does not export '{symbol}': {source}")]
    MissingSymbol {
        /// Path of the module file.
        path: Utf8PathBuf,
        /// Name of the missing symbol.
        symbol: String,
        /// Error reported by the platform loader.
        #[source]
        source: libloading::Error,
    },

    /// The library was built against a different ABI revision.
    #[error("module '{path}' uses ABI revision {actual}, but this host expects {expected}")]
    AbiMismatch {
        /// Path of the module file.
        path: Utf8PathBuf,
        /// Revision the host understands.
        expected: u32,
        /// Revision the module exports.
        actual: u32,
    },

    /// The module's registry failed validation.
    #[error("module '{path}' exports an invalid definition: {source}")]
    InvalidDefinition {
        /// Path of the module file.
        path: Utf8PathBuf,
        /// Validation failure.
        #[source]
        source: DefinitionError,
    },
}

/// A loaded module: its registry and, for dynamic libraries, the library
/// handle that keeps the registry's code mapped.
pub struct LoadedModule {
    // Declared before `library` so the registry is dropped while its code is
    // still mapped.
    definition: ModuleDefinition,
    library: Option<Library>,
}

impl LoadedModule {
    /// Wraps a definition that lives in the current process.
    #[must_use]
    pub const fn in_process(definition: ModuleDefinition) -> Self {
        Self {
            definition,
            library: None,
        }
    }

    /// Returns the module's registry.
    #[must_use]
    pub const fn definition(&self) -> &ModuleDefinition {
        &self.definition
    }

    /// Returns `true` when the module was loaded from a dynamic library.
    #[must_use]
    pub const fn is_dynamic(&self) -> bool {
        self.library.is_some()
    }
}

impl fmt::Debug for LoadedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModule")
            .field("definition", &self.definition)
            .field("dynamic", &self.is_dynamic())
            .finish()
    }
}

/// Loads a module from a located file.
///
/// The trait exists so the pipeline can run against in-process definitions
/// in tests.
pub trait ModuleLoader {
    /// Loads the module at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the file cannot be loaded as a module.
    fn load(&self, path: &Utf8Path) -> Result<LoadedModule, LoadError>;
}

impl<L: ModuleLoader + ?Sized> ModuleLoader for &L {
    fn load(&self, path: &Utf8Path) -> Result<LoadedModule, LoadError> {
        (**self).load(path)
    }
}

/// Loads modules as dynamic libraries.
#[derive(Debug, Default, Clone, Copy)]
pub struct DylibLoader;

impl ModuleLoader for DylibLoader {
    fn load(&self, path: &Utf8Path) -> Result<LoadedModule, LoadError> {
        debug!(path = %path, "opening module library");
        // SAFETY: loading a library runs its initialisers. Modules are
        // trusted code built for this host; the ABI check below rejects
        // libraries built against another contract revision.
        let library = unsafe { Library::new(path.as_std_path()) }.map_err(|source| {
            LoadError::Open {
                path: path.to_owned(),
                source,
            }
        })?;

        let actual = read_abi_version(&library, path)?;
        if actual != ABI_VERSION {
            return Err(LoadError::AbiMismatch {
                path: path.to_owned(),
                expected: ABI_VERSION,
                actual,
            });
        }

        let definition = read_definition(&library, path)?;
        info!(
            path = %path,
            module = definition.name(),
            types = definition.len(),
            "module definition loaded"
        );
        Ok(LoadedModule {
            definition,
            library: Some(library),
        })
    }
}

fn read_abi_version(library: &Library, path: &Utf8Path) -> Result<u32, LoadError> {
    // SAFETY: `DOTCALL_ABI_VERSION` is emitted by `export_module!` as a
    // `u32` static, so the symbol address points at an initialised `u32`
    // that lives as long as `library`.
    unsafe {
        let symbol: Symbol<'_, *const u32> = library
            .get(ABI_VERSION_SYMBOL)
            .map_err(|source| missing_symbol(path, ABI_VERSION_SYMBOL, source))?;
        Ok(**symbol)
    }
}

fn read_definition(library: &Library, path: &Utf8Path) -> Result<ModuleDefinition, LoadError> {
    // SAFETY: the ABI revision matched, so `dotcall_module_definition` has
    // the `DefinitionEntryPoint` signature and was compiled against the same
    // `dotcall-module` as the host.
    let entry_point: Symbol<'_, DefinitionEntryPoint> = unsafe { library.get(DEFINITION_SYMBOL) }
        .map_err(|source| missing_symbol(path, DEFINITION_SYMBOL, source))?;
    entry_point().map_err(|source| LoadError::InvalidDefinition {
        path: path.to_owned(),
        source,
    })
}

fn missing_symbol(path: &Utf8Path, symbol: &[u8], source: libloading::Error) -> LoadError {
    let name = symbol.strip_suffix(b"\0").unwrap_or(symbol);
    LoadError::MissingSymbol {
        path: path.to_owned(),
        symbol: String::from_utf8_lossy(name).into_owned(),
        source,
    }
}
