use once_cell::sync::OnceCell;

use super::Compiler;
use crate::engine;
use crate::error::{Error, Result};

/// File name of the compiler script shipped in `assets/`.
pub const BUNDLED_SCRIPT: &str = "coffee-script.js";

#[cfg(bundled_compiler)]
const SCRIPT: Option<&str> = Some(include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/assets/coffee-script.js"
)));
#[cfg(not(bundled_compiler))]
const SCRIPT: Option<&str> = None;

static INSTANCE: OnceCell<Compiler> = OnceCell::new();

/// Whether this build embeds `assets/coffee-script.js`.
pub fn is_bundled() -> bool {
    SCRIPT.is_some()
}

/// Text of the CoffeeScript compiler embedded at build time.
pub fn bundled_script() -> Result<&'static str> {
    SCRIPT.ok_or(Error::NotBundled)
}

impl Compiler {
    /// The process-wide compiler: bundled script, discovered runtime.
    ///
    /// Built on first use and kept for the life of the process. If building
    /// it fails nothing is kept, so a later call tries again.
    pub fn instance() -> Result<&'static Compiler> {
        INSTANCE.get_or_try_init(|| {
            let script = bundled_script()?;
            let runtime = engine::get()?;
            Ok(Compiler::new(script, runtime))
        })
    }
}
