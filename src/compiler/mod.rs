//! The compiler facade: CoffeeScript in, JavaScript out.
mod instance;

pub use instance::{BUNDLED_SCRIPT, bundled_script, is_bundled};

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde_json::Value;

use crate::engine::{Context, EngineError, Runtime};
use crate::error::Result;
use crate::model::CompileOptions;
use crate::source;

/// Entry point the compiler script registers.
pub const ENTRY_POINT: &str = "CoffeeScript.compile";

/// A CoffeeScript compiler script bound to one JavaScript runtime.
///
/// The script is loaded into a context on the first compile and that context
/// serves every later call. Concurrent first calls wait for a single load.
pub struct Compiler {
    script: Arc<str>,
    runtime: Arc<dyn Runtime>,
    context: OnceCell<Box<dyn Context>>,
}

impl Compiler {
    pub fn new(script: impl Into<Arc<str>>, runtime: Arc<dyn Runtime>) -> Self {
        Self {
            script: script.into(),
            runtime,
            context: OnceCell::new(),
        }
    }

    pub fn runtime(&self) -> &dyn Runtime {
        self.runtime.as_ref()
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    fn context(&self) -> Result<&dyn Context> {
        let context = self
            .context
            .get_or_try_init(|| self.runtime.load(&self.script))?;
        Ok(context.as_ref())
    }

    /// Compile CoffeeScript source and return the JavaScript.
    pub fn compile(&self, source: &str, options: CompileOptions) -> Result<String> {
        let context = self.context()?;
        let options = serde_json::to_value(options).map_err(EngineError::from)?;

        match context.call(ENTRY_POINT, &[Value::String(source.to_owned()), options])? {
            Value::String(js) => Ok(js),
            other => Err(EngineError::Protocol {
                runtime: self.runtime.name().to_string(),
                detail: format!("`{ENTRY_POINT}` returned {other} instead of a string"),
            }
            .into()),
        }
    }

    /// Compile one file, decoded with the encoding named by `encoding`.
    pub fn compile_file(
        &self,
        path: impl AsRef<Path>,
        encoding: &str,
        options: CompileOptions,
    ) -> Result<String> {
        let source = source::read_source(path, encoding)?;
        self.compile(&source, options)
    }

    /// Concatenate files in the given order, separated by a blank line, and
    /// compile the result as one program.
    pub fn compile_files<I, P>(
        &self,
        paths: I,
        encoding: &str,
        options: CompileOptions,
    ) -> Result<String>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let source = source::read_sources(paths, encoding)?;
        self.compile(&source, options)
    }
}

impl fmt::Debug for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compiler")
            .field("runtime", &self.runtime.name())
            .field("script_len", &self.script.len())
            .field("loaded", &self.context.get().is_some())
            .finish()
    }
}
