use clap::Parser;
use std::path::PathBuf;

#[derive(clap::Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable detailed debug logging (global)
    #[arg(long, global = true, default_value_t = false)]
    pub debug: bool,

    /// Enable verbose logging (global)
    #[arg(long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// JSON config file (concurrency, timeouts, platforms, ...)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Fetch a URL's response headers and grade them
    Analyze {
        /// Target URL or bare host (https:// is assumed)
        url: String,

        /// Print the full analysis as JSON
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Platforms to render patches for (nginx, apache, nextjs, express, netlify, vercel, generic)
        #[arg(short = 'p', long = "platform")]
        platforms: Vec<String>,

        /// Request timeout in seconds (overrides config)
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Analyze every URL in a newline-delimited file
    Batch {
        /// Path to file with one URL per line
        file: PathBuf,

        /// Output directory for results.jsonl and summary.csv
        #[arg(short = 'o', long, default_value = "./results")]
        out: PathBuf,

        /// Global concurrency (overrides config)
        #[arg(short = 'c', long)]
        concurrency: Option<u16>,

        /// Per-host limit (overrides config)
        #[arg(long)]
        per_host: Option<u16>,
    },

    /// Check a Content-Security-Policy value offline
    Csp {
        /// Policy text, e.g. "default-src 'self'"
        policy: String,
    },

    /// Check a Strict-Transport-Security value for preload eligibility
    Hsts {
        /// Header value, e.g. "max-age=31536000; includeSubDomains; preload"
        value: String,
    },

    /// Analyze a URL and write ready-to-apply patches plus a PR description
    Fix {
        /// Target URL or bare host
        url: String,

        /// Platform to patch; repeatable. Defaults to the detected platform.
        #[arg(short = 'p', long = "platform")]
        platforms: Vec<String>,

        /// Existing config file to merge into (applies to the first platform)
        #[arg(long, value_name = "FILE")]
        existing: Option<PathBuf>,

        /// Output directory
        #[arg(short = 'o', long, default_value = "./patches")]
        out: PathBuf,
    },
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}
