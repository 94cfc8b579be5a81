//! Shared helpers for the integration tests.
//!
//! - [`FakeRuntime`] counts loads and answers `CoffeeScript.compile` without
//!   any JavaScript, so facade behaviour can be checked anywhere.
//! - [`node`] hands out the real Node runtime when it is installed.
//! - [`MINI_COFFEE`] is a tiny stand-in compiler script for end-to-end runs.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use coffeescript::engine::{self, ExternalRuntime};
use coffeescript::{Context, EngineError, ExecError, ProgramError, Runtime};
use serde_json::{Value, json};

pub const MINI_COFFEE: &str = include_str!("../fixtures/mini-coffee.js");

pub const CFCODE: &str = "
#このコメントはasciiで表現できない文字列です(This is a non-ascii comment)
helloworld = \"こんにちは世界\"
add = (x, y) ->
    x + y
";
pub const HELLO: &str = "こんにちは";
pub const WORLD: &str = "世界";
pub const HELLOWORLD: &str = "こんにちは世界";

/// Runtime whose contexts echo the source back instead of compiling it.
///
/// Sources containing `syntax error` are rejected like the real compiler
/// would, `crash` simulates a dying runtime and `number` makes the entry
/// point return a non-string.
#[derive(Debug, Default)]
pub struct FakeRuntime {
    loads: AtomicUsize,
    failing_loads: usize,
    load_delay: Option<Duration>,
}

impl FakeRuntime {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The first `n` loads fail with [`EngineError::Unavailable`].
    pub fn failing(n: usize) -> Arc<Self> {
        Arc::new(Self {
            failing_loads: n,
            ..Self::default()
        })
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            load_delay: Some(delay),
            ..Self::default()
        })
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl Runtime for FakeRuntime {
    fn name(&self) -> &str {
        "Fake"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn load(&self, script: &str) -> Result<Box<dyn Context>, EngineError> {
        let n = self.loads.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.load_delay {
            thread::sleep(delay);
        }
        if n < self.failing_loads {
            return Err(EngineError::Unavailable);
        }
        Ok(Box::new(FakeContext {
            script: script.to_string(),
        }))
    }
}

#[derive(Debug)]
pub struct FakeContext {
    script: String,
}

pub fn wrap(source: &str) -> String {
    format!("(function() {{\n{source}\n}}).call(this);\n")
}

impl Context for FakeContext {
    fn exec(&self, _code: &str) -> Result<Value, ExecError> {
        Err(EngineError::Protocol {
            runtime: "Fake".into(),
            detail: "exec is not supported".into(),
        }
        .into())
    }

    fn call(&self, name: &str, args: &[Value]) -> Result<Value, ExecError> {
        assert_eq!(name, "CoffeeScript.compile");
        assert_eq!(self.script, "fake compiler");

        let source = args[0].as_str().expect("source is a string");
        let bare = args[1]["bare"].as_bool().expect("bare flag");

        if source.contains("syntax error") {
            return Err(ProgramError {
                message: "SyntaxError: [stdin]:1:1: syntax error".into(),
                stack: None,
            }
            .into());
        }
        match source {
            "crash" => Err(EngineError::Crashed {
                runtime: "Fake".into(),
                status: "signal: 11".into(),
                output: String::new(),
            }
            .into()),
            "number" => Ok(json!(42)),
            _ if bare => Ok(Value::String(source.to_string())),
            _ => Ok(Value::String(wrap(source))),
        }
    }
}

pub fn fake_compiler(runtime: &Arc<FakeRuntime>) -> coffeescript::Compiler {
    coffeescript::Compiler::new("fake compiler", runtime.clone() as Arc<dyn Runtime>)
}

/// The Node runtime, or `None` (with a note on stderr) when not installed.
pub fn node() -> Option<Arc<dyn Runtime>> {
    let runtime = ExternalRuntime::node();
    if runtime.is_available() {
        Some(Arc::new(runtime) as Arc<dyn Runtime>)
    } else {
        eprintln!("skipping: no Node runtime on PATH");
        None
    }
}

/// Any installed runtime, or `None` (with a note on stderr).
pub fn any_runtime() -> Option<Arc<dyn Runtime>> {
    let runtime = engine::available_runtimes().into_iter().next();
    if runtime.is_none() {
        eprintln!("skipping: no JavaScript runtime installed");
    }
    runtime
}

pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("write test file");
    path
}
