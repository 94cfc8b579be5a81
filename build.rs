use std::path::Path;

const COMPILER_SCRIPT: &str = "assets/coffee-script.js";

fn main() {
    println!("cargo:rerun-if-changed={COMPILER_SCRIPT}");
    println!("cargo:rustc-check-cfg=cfg(bundled_compiler)");

    if Path::new(COMPILER_SCRIPT).is_file() {
        println!("cargo:rustc-cfg=bundled_compiler");
    } else {
        println!("cargo:warning={COMPILER_SCRIPT} missing; building without a default compiler");
    }
}
