//! CLI module for Symquery
//!
//! Provides command-line interface using clap derive macros.

pub mod commands;
pub mod output;

pub use output::{OutputContext, OutputFormat};

use clap::{Parser, Subcommand};

use commands::{config::ConfigArgs, symbols::SymbolsArgs, window::WindowArgs};

const LONG_ABOUT: &str = r#"
Symquery - editor-context queries over a single file

Loads a file as the active buffer and answers the two context queries an
assistant asks for: the symbol names in the buffer, or the lines around the
cursor.

EXAMPLES:
  symquery symbols src/main.rs                        # Uses lsp.servers from config
  symquery symbols src/lib.rs --server rust-analyzer  # Explicit language server
  symquery symbols app.py --outline symbols.json      # Saved documentSymbol payload
  symquery window src/main.rs --line 120 --lines 40
  symquery window src/main.rs --lines 0 --format text # Whole buffer
"#;

/// Symquery - editor-context queries for AI assistants
#[derive(Parser, Debug)]
#[command(name = "symquery")]
#[command(author, version, about, long_about = LONG_ABOUT)]
#[command(propagate_version = true)]
#[command(after_help = "Use 'symquery <COMMAND> --help' for more information about a command.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (json, text) [default: output.format from config]
    #[arg(long, global = true)]
    pub format: Option<String>,

    /// Verbose output (show debug info)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Symbol names of a file, or its full text when no outline is available
    Symbols(SymbolsArgs),

    /// Lines around the cursor
    Window(WindowArgs),

    /// Configuration management
    Config(ConfigArgs),
}
