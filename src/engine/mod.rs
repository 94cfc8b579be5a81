//! JavaScript execution behind a narrow interface.
//!
//! A [`Runtime`] loads a script into a fresh [`Context`]; the context then
//! evaluates expressions or calls functions defined by that script and hands
//! back JSON values. Failures come in two kinds: [`EngineError`] when the
//! runtime itself could not do its job, and [`ProgramError`] when the
//! JavaScript program threw.
pub mod external;

use std::fmt;
use std::io;
use std::sync::Arc;

use log::debug;
use serde_json::Value;
use thiserror::Error;

pub use external::ExternalRuntime;

/// Environment variable naming the runtime to use instead of probing.
pub const RUNTIME_ENV: &str = "JS_RUNTIME";

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("could not find a JavaScript runtime")]
    Unavailable,

    #[error("unknown JavaScript runtime `{0}`")]
    UnknownRuntime(String),

    #[error("JavaScript runtime `{0}` is not available")]
    RuntimeUnavailable(String),

    #[error("failed to start {runtime}")]
    Spawn {
        runtime: String,
        #[source]
        source: io::Error,
    },

    #[error("{runtime} exited with {status}: {output}")]
    Crashed {
        runtime: String,
        status: String,
        output: String,
    },

    #[error("script failed to initialize in {runtime}: {message}")]
    Init { runtime: String, message: String },

    #[error("unexpected output from {runtime}: {detail}")]
    Protocol { runtime: String, detail: String },

    #[error("encoding arguments")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// An error thrown by the JavaScript program itself.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ProgramError {
    /// `String(err)` as seen by the runtime, e.g. `SyntaxError: unexpected ,`.
    pub message: String,
    pub stack: Option<String>,
}

#[derive(Debug, Error)]
pub enum ExecError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Program(#[from] ProgramError),
}

/// A JavaScript implementation available to this process.
pub trait Runtime: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn is_available(&self) -> bool;

    /// Load `script` into a new execution context.
    fn load(&self, script: &str) -> Result<Box<dyn Context>, EngineError>;

    /// Evaluate one expression in an empty context.
    fn eval(&self, expr: &str) -> Result<Value, ExecError> {
        self.load("")?.eval(expr)
    }
}

/// A live script environment created by [`Runtime::load`].
pub trait Context: fmt::Debug + Send + Sync {
    /// Run `code` as a function body after the loaded script; the value of
    /// its `return` statement is the result.
    fn exec(&self, code: &str) -> Result<Value, ExecError>;

    fn eval(&self, expr: &str) -> Result<Value, ExecError> {
        let expr = if expr.trim().is_empty() { "''" } else { expr };
        let quoted = serde_json::to_string(&format!("({expr})")).map_err(EngineError::from)?;
        self.exec(&format!("return eval({quoted})"))
    }

    /// Call the function at `name` (a dotted path such as
    /// `CoffeeScript.compile`) with JSON arguments.
    fn call(&self, name: &str, args: &[Value]) -> Result<Value, ExecError> {
        let args = serde_json::to_string(args).map_err(EngineError::from)?;
        self.eval(&format!("{name}.apply(this, {args})"))
    }
}

/// Every runtime this crate knows how to drive, in preference order.
pub fn known_runtimes() -> Vec<Arc<dyn Runtime>> {
    external::known()
        .into_iter()
        .map(|runtime| Arc::new(runtime) as Arc<dyn Runtime>)
        .collect()
}

pub fn available_runtimes() -> Vec<Arc<dyn Runtime>> {
    known_runtimes()
        .into_iter()
        .filter(|runtime| runtime.is_available())
        .collect()
}

/// Look a runtime up by name (case-insensitive); it must be installed.
pub fn runtime_by_name(name: &str) -> Result<Arc<dyn Runtime>, EngineError> {
    let runtime = known_runtimes()
        .into_iter()
        .find(|runtime| runtime.name().eq_ignore_ascii_case(name))
        .ok_or_else(|| EngineError::UnknownRuntime(name.to_string()))?;

    if !runtime.is_available() {
        return Err(EngineError::RuntimeUnavailable(runtime.name().to_string()));
    }
    Ok(runtime)
}

/// Pick the runtime named by [`RUNTIME_ENV`], or the first one installed.
pub fn get() -> Result<Arc<dyn Runtime>, EngineError> {
    if let Ok(name) = std::env::var(RUNTIME_ENV) {
        let name = name.trim();
        if !name.is_empty() {
            debug!("{RUNTIME_ENV} selects runtime `{name}`");
            return runtime_by_name(name);
        }
    }

    let runtime = available_runtimes()
        .into_iter()
        .next()
        .ok_or(EngineError::Unavailable)?;
    debug!("using JavaScript runtime {}", runtime.name());
    Ok(runtime)
}
