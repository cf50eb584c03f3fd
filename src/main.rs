// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Read the URL list (file or stdin) and feed it to the manager
// 3. Run the sequential index sweep and print the results
// 4. Exit with proper code (0 = everything indexed, 1 = gaps found,
//    2 = error)
//
// Rust concepts:
// - async/await: The checker does network I/O
// - Result<T, E>: For error handling (T = success type, E = error type)
// - match: Pattern matching to handle different subcommands
// =============================================================================

// Module declarations - tells Rust about our other source files
mod checker; // src/checker/ - the status-checking capability
mod cli; // src/cli.rs - command-line parsing
mod manager; // src/manager/ - the link-list state machine

use std::io::Read;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use checker::SerpChecker;
use cli::{Cli, Commands};
use manager::{IndexStatus, LinkListManager, LinkRecord};

// The #[tokio::main] attribute transforms our async main into a real main
// function. It creates a tokio runtime and runs our async code inside it.
#[tokio::main]
async fn main() {
    // Diagnostics go through the log facade; RUST_LOG controls verbosity
    env_logger::init();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, print it and exit with code 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// This is the main application logic
// Returns:
//   Ok(0) = every tracked URL is indexed
//   Ok(1) = at least one URL is not indexed
//   Err = unexpected error (exit code 2)
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            input,
            json,
            raw,
            timeout,
            delay,
        } => handle_check(&input, json, raw, timeout, delay).await,
        Commands::Queries { input } => handle_queries(&input),
    }
}

// Handles the 'check' subcommand
//
// Parses the URL list, sweeps it sequentially against the search engine,
// prints the results and the summary counts.
async fn handle_check(input: &str, json: bool, raw: bool, timeout: u64, delay: u64) -> Result<i32> {
    let raw_text = read_input(input)?;

    let checker = SerpChecker::new(
        Duration::from_secs(timeout),
        Duration::from_millis(delay),
    )?;
    let manager = LinkListManager::new(checker);

    let appended = manager.parse_and_append(&raw_text);
    if appended.is_empty() {
        println!("⚠️  No URLs found in input");
        return Ok(0);
    }

    println!("🔗 Tracking {} URL(s)", appended.len());
    println!("\n🔍 Checking index status (one request at a time)...\n");

    manager.check_all().await;

    let records = manager.records();
    if json {
        // Serialize results to JSON and print
        let json_output = serde_json::to_string_pretty(&records)?;
        println!("{}", json_output);
    } else {
        print_table(&records);
    }

    let stats = manager.stats();
    println!("\n📊 Summary:");
    println!("   📋 Total: {}", stats.total);
    println!("   ✅ Indexed: {}", stats.indexed);
    println!("   ❌ Not indexed: {}", stats.not_indexed);

    if raw {
        // The raw list is the copy-paste payload: one token per URL, in
        // input order
        println!("\n📎 Raw results:");
        println!("{}", manager.export_text());
    }

    if stats.indexed == stats.total {
        Ok(0) // Exit code 0 = everything indexed
    } else {
        Ok(1) // Exit code 1 = at least one gap
    }
}

// Handles the 'queries' subcommand
//
// No checking happens here: we just parse the list and print the site:
// query URL for each entry, one per line, so they can be opened by hand.
fn handle_queries(input: &str) -> Result<i32> {
    let raw_text = read_input(input)?;

    let records = manager::parse_links(&raw_text);
    if records.is_empty() {
        println!("⚠️  No URLs found in input");
        return Ok(0);
    }

    for record in &records {
        println!("{}", record.query_url);
    }

    Ok(0)
}

// Reads the URL list from a file, or from stdin when the path is '-'
fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read URL list from stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("failed to read URL list from {}", input))
    }
}

// Prints results as a human-readable table in the terminal
fn print_table(records: &[LinkRecord]) {
    // Print table header
    println!("{:<4} {:<60} {:<15}", "#", "URL", "STATUS");
    println!("{}", "=".repeat(80));

    // Print each record; numbering is positional, starting at 01
    for (index, record) in records.iter().enumerate() {
        // Truncate URL if too long for display
        let url_display = if record.original_url.len() > 57 {
            format!("{}...", &record.original_url[..57])
        } else {
            record.original_url.clone()
        };

        println!(
            "{:<4} {:<60} {:<15}",
            format!("{:02}", index + 1),
            url_display,
            format_status(&record.status)
        );
    }
}

// Formats the status enum as a display string
fn format_status(status: &IndexStatus) -> String {
    match status {
        IndexStatus::Indexed => "✅ INDEXED".to_string(),
        IndexStatus::NotIndexed => "❌ NO".to_string(),
        IndexStatus::Checking => "🔄 CHECKING".to_string(),
        IndexStatus::Pending => "⏳ PENDING".to_string(),
    }
}
