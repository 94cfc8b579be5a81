//! A bridge to the JavaScript CoffeeScript compiler.
//!
//! ```no_run
//! use coffeescript::CompileOptions;
//!
//! let js = coffeescript::compile("add = (a, b) -> a + b", CompileOptions::bare())?;
//! assert!(js.contains("add = function(a, b)"));
//! # Ok::<(), coffeescript::Error>(())
//! ```
pub mod cli;
pub mod compiler;
pub mod engine;
pub mod error;
pub mod model;
pub mod source;

pub use compiler::Compiler;
pub use engine::{Context, EngineError, ExecError, ProgramError, Runtime};
pub use error::{CompilationError, Error, Result};
pub use model::{CompileOptions, DEFAULT_ENCODING};

use std::io::Write;
use std::path::Path;

use anyhow::Context as _;
use clap::Parser;
use log::info;

/// Compile CoffeeScript source with the process-wide compiler.
pub fn compile(source: &str, options: CompileOptions) -> Result<String> {
    Compiler::instance()?.compile(source, options)
}

/// Compile one CoffeeScript file with the process-wide compiler.
pub fn compile_file(
    path: impl AsRef<Path>,
    encoding: &str,
    options: CompileOptions,
) -> Result<String> {
    Compiler::instance()?.compile_file(path, encoding, options)
}

/// Join several CoffeeScript files and compile them with the process-wide
/// compiler.
pub fn compile_files<I, P>(paths: I, encoding: &str, options: CompileOptions) -> Result<String>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    Compiler::instance()?.compile_files(paths, encoding, options)
}

pub fn run() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    if args.list_runtimes {
        for runtime in engine::known_runtimes() {
            let status = if runtime.is_available() { "available" } else { "missing" };
            println!("{:<16}{status}", runtime.name());
        }
        return Ok(());
    }

    // 1. ── Compiler ───────────────────────────────────────────────────
    let dedicated;
    let compiler = if args.compiler.is_none() && args.runtime.is_none() {
        Compiler::instance().with_context(|| "Loading the bundled CoffeeScript compiler")?
    } else {
        let runtime = match &args.runtime {
            Some(name) => engine::runtime_by_name(name)?,
            None => engine::get()?,
        };
        let script = match &args.compiler {
            Some(path) => source::read_source(path, DEFAULT_ENCODING)?,
            None => compiler::bundled_script()?.to_owned(),
        };
        dedicated = Compiler::new(script, runtime);
        &dedicated
    };
    info!("compiling with {}", compiler.runtime().name());

    // 2. ── Compile ────────────────────────────────────────────────────
    let js = compiler
        .compile_files(&args.files, &args.encoding, CompileOptions::from(args.bare))
        .with_context(|| format!("Compiling {} file(s)", args.files.len()))?;

    // 3. ── Write output ───────────────────────────────────────────────
    match &args.output {
        Some(path) => std::fs::write(path, &js)
            .with_context(|| format!("Writing {}", path.display()))?,
        None => std::io::stdout()
            .write_all(js.as_bytes())
            .with_context(|| "Writing to stdout")?,
    }

    Ok(())
}
