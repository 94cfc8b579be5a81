use serde::Serialize;

/// Encoding used when the caller does not name one.
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Options handed to `CoffeeScript.compile` on every call.
///
/// Serialised as-is into the options object of the foreign entry point,
/// so field names follow the JavaScript side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CompileOptions {
    /// Compile without the top-level function safety wrapper.
    pub bare: bool,
}

impl CompileOptions {
    pub fn bare() -> Self {
        Self { bare: true }
    }

    pub fn wrapped() -> Self {
        Self { bare: false }
    }
}

impl From<bool> for CompileOptions {
    fn from(bare: bool) -> Self {
        Self { bare }
    }
}
