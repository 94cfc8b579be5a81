use clap::Parser;
use std::path::PathBuf;

use crate::model::DEFAULT_ENCODING;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// CoffeeScript files, compiled together in the order given
    #[arg(required_unless_present = "list_runtimes")]
    pub files: Vec<PathBuf>,
    /// Compile without the top-level function safety wrapper
    #[arg(short, long)]
    pub bare: bool,
    /// Encoding of the input files
    #[arg(short, long, default_value = DEFAULT_ENCODING)]
    pub encoding: String,
    /// Write the JavaScript here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// JavaScript runtime to run the compiler in (see --list-runtimes)
    #[arg(short, long)]
    pub runtime: Option<String>,
    /// Compiler script to load instead of the bundled one
    #[arg(long, value_name = "PATH")]
    pub compiler: Option<PathBuf>,
    /// Print the known JavaScript runtimes and exit
    #[arg(long)]
    pub list_runtimes: bool,
}
