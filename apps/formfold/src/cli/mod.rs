//! # Formfold CLI Module
//!
//! This module implements the CLI interface for Formfold.
//!
//! ## Available Commands
//!
//! - `new` - Initialize a new form definition file
//! - `outline` - Show the form structure
//! - `server` - Start the HTTP form-editing server
//! - `plan` - Print the render sequence
//! - `candidates` - Show a fieldset's conditional-field candidates
//! - `check` - Check an identifier for availability
//! - `duplicate` - Duplicate a fieldset under a new identifier
//! - `export` - Export the definition as JSON
//! - `import` - Import a JSON definition

mod commands;

use clap::{Parser, Subcommand};
use formfold_core::FormError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Formfold - Form Structure Engine
///
/// Edits and inspects dynamic form definitions: grouped fieldsets,
/// boundary markers, conditional display, form-scoped identifiers.
#[derive(Parser, Debug)]
#[command(name = "formfold")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the form definition file
    #[arg(short = 'F', long, global = true, default_value = "form.ffd")]
    pub form: PathBuf,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new form definition file
    New {
        /// Form title
        #[arg(short, long, default_value = "Untitled form")]
        title: String,

        /// Overwrite an existing definition
        #[arg(long)]
        force: bool,
    },

    /// Show the form structure
    Outline,

    /// Start the HTTP form-editing server
    Server {
        /// Host to bind to (overrides config)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to a formfold.toml config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the render sequence
    Plan {
        /// Submitted-values JSON file used to evaluate conditions
        #[arg(short, long)]
        submission: Option<PathBuf>,
    },

    /// Show a fieldset's conditional-field candidates
    Candidates {
        /// Fieldset identifier
        fieldset: String,
    },

    /// Check an identifier for availability
    Check {
        /// Candidate identifier
        identifier: String,
    },

    /// Duplicate a fieldset's configuration under a new identifier
    Duplicate {
        /// Source fieldset identifier
        source: String,

        /// Identifier for the copy
        new_id: String,
    },

    /// Export the definition as JSON
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Import a JSON definition
    Import {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), FormError> {
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::New { title, force }) => cmd_new(&cli.form, &title, force, json_mode),
        Some(Commands::Outline) => cmd_outline(&cli.form, json_mode),
        Some(Commands::Server { host, port, config }) => {
            cmd_server(&cli.form, host, port, config.as_deref()).await
        }
        Some(Commands::Plan { submission }) => {
            cmd_plan(&cli.form, submission.as_deref(), json_mode)
        }
        Some(Commands::Candidates { fieldset }) => {
            cmd_candidates(&cli.form, &fieldset, json_mode)
        }
        Some(Commands::Check { identifier }) => cmd_check(&cli.form, &identifier, json_mode),
        Some(Commands::Duplicate { source, new_id }) => {
            cmd_duplicate(&cli.form, &source, &new_id)
        }
        Some(Commands::Export { output }) => cmd_export(&cli.form, &output),
        Some(Commands::Import { input }) => cmd_import(&cli.form, &input),
        None => {
            // No subcommand - show the outline by default
            cmd_outline(&cli.form, json_mode)
        }
    }
}
