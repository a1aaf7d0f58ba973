//! TaxAUmate terminal chat.
//!
//! # Usage
//!
//! ```bash
//! export OPENAI_API_KEY=... PINECONE_API_KEY=... MONGO_URI=mongodb://...
//! taxaumate
//!
//! # Local records instead of MongoDB
//! taxaumate --documents-parquet data/documents.parquet
//!
//! # Load once into a DuckDB file, then reuse it
//! taxaumate --documents-db data/documents.duckdb --documents-parquet data/documents.parquet
//! taxaumate --documents-db data/documents.duckdb
//! ```

mod config;
mod display;
mod startup;

use std::io::{self, Write};

use anyhow::Context;
use clap::Parser;
use taxaumate_core::Session;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::display::TerminalView;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A `.env` file in the working directory fills in unset variables.
    dotenvy::dotenv().ok();
    let config = Config::parse();

    // Logs on stderr; stdout carries the conversation.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    tracing::info!("taxaumate v{}", env!("CARGO_PKG_VERSION"));

    let assistant = match startup::build_assistant(&config).await {
        Ok(assistant) => assistant,
        Err(e) => {
            tracing::error!(error = ?e, "startup failed");
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let mut stdout = io::stdout();
    display::print_welcome(&mut stdout).context("writing welcome")?;

    let mut session = Session::with_welcome();
    let mut view = TerminalView::new(io::stdout());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        display::print_prompt(&mut stdout).context("writing prompt")?;
        let Some(line) = lines.next_line().await.context("reading question")? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        assistant.answer_turn(&mut session, question, &mut view).await;
    }

    tracing::info!(entries = session.len(), "session ended");
    display::print_footer(&mut stdout).context("writing footer")?;
    stdout.flush()?;
    Ok(())
}
