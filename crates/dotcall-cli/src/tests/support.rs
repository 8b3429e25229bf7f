//! Shared fixtures: a recording in-process module and a search tree.

use std::fs;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use camino::{Utf8Path, Utf8PathBuf};
use dotcall_module::{MethodDefinition, ModuleDefinition, TypeDefinition};
use samplelib::{GreetRequest, Greeting};
use tempfile::TempDir;

use dotcall_config::Config;

use crate::config::ConfigLoader;
use crate::errors::AppError;
use crate::loader::{LoadError, LoadedModule, ModuleLoader};

/// Extension used for module files in tests.
pub(crate) const EXTENSION: &str = std::env::consts::DLL_EXTENSION;

/// Module name the recording module is placed under.
pub(crate) const MODULE: &str = "SampleLib";

/// Calls observed by the recording module.
#[derive(Debug, Clone, Default)]
pub(crate) struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub(crate) fn record(&self, call: String) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

struct RecordingGreeter {
    log: CallLog,
}

impl RecordingGreeter {
    fn greet(&mut self, request: GreetRequest) -> Result<Greeting, io::Error> {
        self.log.record(format!("Greet:{}", request.name));
        Ok(Greeting {
            message: format!("Hello, {}!", request.name),
            count: 1,
        })
    }

    fn ping(&mut self) -> Result<&'static str, io::Error> {
        self.log.record("Ping".to_owned());
        Ok("pong")
    }

    fn introduce(&mut self, first: String, second: String) -> Result<String, io::Error> {
        self.log.record(format!("Introduce:{first}:{second}"));
        Ok(format!("{first}, meet {second}."))
    }

    fn refuse(&mut self, request: GreetRequest) -> Result<Greeting, io::Error> {
        self.log.record(format!("Refuse:{}", request.name));
        Err(io::Error::other("greeter is unavailable"))
    }
}

/// Builds a module whose `Sample.Greeter` records every call into `log`.
pub(crate) fn recording_module(log: &CallLog) -> ModuleDefinition {
    let shared = log.clone();
    ModuleDefinition::builder(MODULE)
        .with_type(
            TypeDefinition::with_constructor("Sample.Greeter", move || {
                Ok::<_, io::Error>(RecordingGreeter {
                    log: shared.clone(),
                })
            })
            .method(MethodDefinition::unary("Greet", "request", RecordingGreeter::greet))
            .method(MethodDefinition::nullary("Ping", RecordingGreeter::ping))
            .method(MethodDefinition::binary(
                "Introduce",
                ["first", "second"],
                RecordingGreeter::introduce,
            ))
            .method(MethodDefinition::unary("Refuse", "request", RecordingGreeter::refuse)),
        )
        .with_type(TypeDefinition::with_constructor("Sample.Locked", || {
            Err::<RecordingGreeter, _>(io::Error::other("the door is locked"))
        }))
        .build()
        .expect("recording module is valid")
}

/// Loader that serves the recording module for any path.
#[derive(Debug, Clone, Default)]
pub(crate) struct StubLoader {
    pub(crate) log: CallLog,
}

impl ModuleLoader for StubLoader {
    fn load(&self, _path: &Utf8Path) -> Result<LoadedModule, LoadError> {
        Ok(LoadedModule::in_process(recording_module(&self.log)))
    }
}

/// Config loader returning a fixed configuration.
pub(crate) struct StaticConfigLoader {
    pub(crate) config: Config,
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

/// Temporary directory tree used as a search root.
pub(crate) struct ModuleTree {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl ModuleTree {
    pub(crate) fn new() -> Self {
        let dir = TempDir::new().expect("create temporary directory");
        let root = Utf8Path::from_path(dir.path())
            .expect("temporary directory is UTF-8")
            .to_owned();
        Self { _dir: dir, root }
    }

    pub(crate) fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Places an empty module file at `relative` (without extension).
    pub(crate) fn place(&self, relative: &str) -> Utf8PathBuf {
        let path = self.root.join(format!("{relative}.{EXTENSION}"));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create module directory");
        }
        fs::write(&path, b"").expect("write module file");
        path
    }
}
