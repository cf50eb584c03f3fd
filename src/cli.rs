// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - Enums: Types that can be one of several variants
// - Derive macros: Automatically generate code for our types
// =============================================================================

use clap::{Parser, Subcommand};

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "index-scout",
    version = "0.1.0",
    about = "A CLI tool to track which URLs are indexed by a search engine",
    long_about = "index-scout takes a list of URLs, derives a site: search query for each one, \
                  and checks whether the search engine has the URL in its index. \
                  Useful for keeping an eye on how much of a site has been picked up."
)]
pub struct Cli {
    // The #[command(subcommand)] attribute tells clap that this field
    // will hold one of the subcommands defined in the Commands enum
    #[command(subcommand)]
    pub command: Commands,
}

// This enum defines our subcommands (check, queries)
//
// Each variant represents a different subcommand the user can run
// The fields inside each variant become the arguments for that subcommand
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check every URL in a list against the search engine's index
    ///
    /// Example: index-scout check urls.txt --json
    Check {
        /// Path to a text file with one URL per line, or '-' to read stdin
        ///
        /// Lines that don't look like URLs are silently skipped; lines
        /// starting with "www" get an https:// prefix
        input: String,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,

        /// Also print the raw status list (one token per line), ready to
        /// paste into a spreadsheet column
        #[arg(long)]
        raw: bool,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 10)]
        timeout: u64,

        /// Delay between requests in milliseconds
        ///
        /// Checks run one at a time; this spaces them out further so the
        /// search engine doesn't rate-limit us
        #[arg(long, default_value_t = 500)]
        delay: u64,
    },

    /// Print the site: query URL for every URL in a list
    ///
    /// Example: index-scout queries urls.txt
    ///
    /// Handy for checking by hand: open the printed URLs in a browser and
    /// eyeball the results
    Queries {
        /// Path to a text file with one URL per line, or '-' to read stdin
        input: String,
    },
}
