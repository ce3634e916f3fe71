//! # Formfold - Form Structure Server
//!
//! The main binary for the Formfold form-structure engine.
//!
//! This application provides:
//! - HTTP form-editing API server (axum-based)
//! - CLI interface for definition files
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │               apps/formfold (THE BINARY)             │
//! │                                                      │
//! │   ┌─────────────┐          ┌─────────────┐           │
//! │   │   CLI       │          │   HTTP API  │           │
//! │   │  (clap)     │          │   (axum)    │           │
//! │   └──────┬──────┘          └──────┬──────┘           │
//! │          │                        │                  │
//! │          └────────────┬───────────┘                  │
//! │                       ▼                              │
//! │               ┌────────────────┐                     │
//! │               │ formfold-core  │                     │
//! │               │  (THE LOGIC)   │                     │
//! │               └────────────────┘                     │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! formfold server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! formfold new --title "Contact survey"
//! formfold outline
//! formfold plan --submission answers.json
//! ```

use clap::Parser;
use formfold::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Initialize tracing — FORMFOLD_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("FORMFOLD_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "formfold=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Display startup banner
    if !cli.quiet {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Formfold startup banner.
fn print_banner() {
    println!(
        r#"
  ┌─────────────────────────────────────┐
  │  Formfold · Form Structure Engine   │
  │  v{:<34}│
  │                                     │
  │  Grouped · Conditional · Ordered    │
  └─────────────────────────────────────┘
"#,
        env!("CARGO_PKG_VERSION")
    );
}
