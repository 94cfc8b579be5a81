//! Runtimes driven as child processes.
//!
//! Every `exec` wraps the loaded script plus the requested code in a small
//! runner, writes it to a temporary file and runs the runtime's command on
//! it. The runner prints one JSON line: `["ok"]`, `["ok", value]` or
//! `["err", message, stack]`.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::debug;
use serde_json::Value;
use tempfile::TempPath;

use super::{Context, EngineError, ExecError, ProgramError, Runtime};

const SOURCE_PLACEHOLDER: &str = "#{source}";

/// Runner for engines with `process.stdout`.
const NODE_RUNNER: &str = include_str!("runners/node.js");
/// Runner for shells exposing a global `print`.
const PRINT_RUNNER: &str = include_str!("runners/print.js");

const JSC_PATH: &str = "/System/Library/Frameworks/JavaScriptCore.framework/Versions/A/Resources/jsc";

#[derive(Debug, Clone)]
pub struct ExternalRuntime {
    name: String,
    /// Candidate command lines; the first whose binary resolves is used.
    commands: Vec<Vec<String>>,
    runner: &'static str,
}

impl ExternalRuntime {
    pub fn new(name: impl Into<String>, commands: &[&[&str]], runner: &'static str) -> Self {
        Self {
            name: name.into(),
            commands: commands
                .iter()
                .map(|cmd| cmd.iter().map(|s| s.to_string()).collect())
                .collect(),
            runner,
        }
    }

    pub fn node() -> Self {
        Self::new("Node", &[&["nodejs"], &["node"]], NODE_RUNNER)
    }

    pub fn javascript_core() -> Self {
        Self::new("JavaScriptCore", &[&[JSC_PATH]], PRINT_RUNNER)
    }

    pub fn spidermonkey() -> Self {
        Self::new("SpiderMonkey", &[&["js"]], PRINT_RUNNER)
    }

    /// Binary path and extra arguments of the first installed command.
    fn resolve(&self) -> Option<(PathBuf, Vec<String>)> {
        self.commands.iter().find_map(|cmd| {
            let (program, args) = cmd.split_first()?;
            let binary = which::which(program).ok()?;
            Some((binary, args.to_vec()))
        })
    }
}

pub(crate) fn known() -> Vec<ExternalRuntime> {
    vec![
        ExternalRuntime::node(),
        ExternalRuntime::javascript_core(),
        ExternalRuntime::spidermonkey(),
    ]
}

impl Runtime for ExternalRuntime {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        self.resolve().is_some()
    }

    fn load(&self, script: &str) -> Result<Box<dyn Context>, EngineError> {
        let (binary, args) = self
            .resolve()
            .ok_or_else(|| EngineError::RuntimeUnavailable(self.name.clone()))?;
        debug!("{} resolved to {}", self.name, binary.display());

        let context = ExternalContext {
            runtime: self.name.clone(),
            runner: self.runner,
            binary,
            args,
            source: script.to_string(),
        };

        // Run the script once on its own so a broken script is reported
        // here rather than on the first call.
        match context.exec("") {
            Ok(_) => Ok(Box::new(context)),
            Err(ExecError::Engine(e)) => Err(e),
            Err(ExecError::Program(e)) => Err(EngineError::Init {
                runtime: self.name.clone(),
                message: e.message,
            }),
        }
    }
}

#[derive(Debug)]
pub struct ExternalContext {
    runtime: String,
    runner: &'static str,
    binary: PathBuf,
    args: Vec<String>,
    source: String,
}

impl ExternalContext {
    fn write_program(&self, code: &str) -> Result<TempPath, EngineError> {
        let program = format!("{}\n{}", self.source, code);
        let script = self.runner.replacen(SOURCE_PLACEHOLDER, &program, 1);

        let mut file = tempfile::Builder::new()
            .prefix("coffeescript-")
            .suffix(".js")
            .tempfile()?;
        file.write_all(script.as_bytes())?;
        file.flush()?;
        Ok(file.into_temp_path())
    }

    fn run(&self, path: &Path) -> Result<String, EngineError> {
        debug!("running {} {}", self.binary.display(), path.display());
        let output = Command::new(&self.binary)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| EngineError::Spawn {
                runtime: self.runtime.clone(),
                source,
            })?;

        let stdout = String::from_utf8(output.stdout).map_err(|_| EngineError::Protocol {
            runtime: self.runtime.clone(),
            detail: "stdout is not valid UTF-8".into(),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::Crashed {
                runtime: self.runtime.clone(),
                status: output.status.to_string(),
                output: format!("{stdout}{stderr}").trim().to_string(),
            });
        }
        Ok(stdout)
    }
}

impl Context for ExternalContext {
    fn exec(&self, code: &str) -> Result<Value, ExecError> {
        let path = self.write_program(code)?;
        let stdout = self.run(&path)?;
        parse_output(&self.runtime, &stdout)
    }
}

/// Interpret the runner's last line of output.
fn parse_output(runtime: &str, stdout: &str) -> Result<Value, ExecError> {
    let protocol = |detail: String| EngineError::Protocol {
        runtime: runtime.to_string(),
        detail,
    };

    let line = stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .ok_or_else(|| protocol("no output".into()))?;

    let reply: Value =
        serde_json::from_str(line).map_err(|e| protocol(format!("{e} in `{line}`")))?;
    let items = reply
        .as_array()
        .ok_or_else(|| protocol(format!("expected an array, got `{line}`")))?;

    match items.first().and_then(Value::as_str) {
        Some("ok") => Ok(items.get(1).cloned().unwrap_or(Value::Null)),
        Some("err") => {
            let message = items
                .get(1)
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            let stack = items.get(2).and_then(Value::as_str).map(str::to_string);
            Err(ProgramError { message, stack }.into())
        }
        _ => Err(protocol(format!("unknown status in `{line}`")).into()),
    }
}
