use std::path::PathBuf;

use thiserror::Error;

use crate::engine::{EngineError, ExecError, ProgramError};

/// Payload of a rejected compilation: the compiler's own message, verbatim.
pub type CompilationError = ProgramError;

/// Everything a compile call can fail with.
///
/// `Engine`, `Compilation` and `Decode` are the three kinds callers branch on:
/// a broken environment, bad CoffeeScript, and bytes that do not match the
/// declared encoding.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Engine(EngineError),

    #[error(transparent)]
    Compilation(CompilationError),

    #[error("{}: bytes are not valid {encoding}", .path.display())]
    Decode { path: PathBuf, encoding: &'static str },

    #[error("no CoffeeScript compiler in this build; add assets/coffee-script.js and rebuild")]
    NotBundled,

    #[error("unknown encoding `{0}`")]
    UnknownEncoding(String),

    #[error("reading {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn is_engine(&self) -> bool {
        matches!(self, Error::Engine(_))
    }

    pub fn is_compilation(&self) -> bool {
        matches!(self, Error::Compilation(_))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode { .. })
    }
}

impl From<EngineError> for Error {
    fn from(e: EngineError) -> Self {
        Error::Engine(e)
    }
}

// The one place where adapter failures become crate errors: a script that
// threw is a compilation failure, anything else belongs to the engine.
impl From<ExecError> for Error {
    fn from(e: ExecError) -> Self {
        match e {
            ExecError::Engine(e) => Error::Engine(e),
            ExecError::Program(e) => Error::Compilation(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
