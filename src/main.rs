//! Binary entry point for cairn.
//!
//! Parses the command line, loads configuration, initializes logging, and
//! dispatches to the command handlers. Results print as JSON on stdout;
//! errors print as JSON on stderr with a stable `kind` tag.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow prints in the main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command dispatch
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::process::ExitCode;

use cairn::config::CairnConfig;
use cairn::{Error, WorkspaceService, cli, observability};

/// Cairn - a markdown knowledge store for AI agents.
#[derive(Parser)]
#[command(name = "cairn")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Workspace to operate on.
    #[arg(short, long, global = true, env = "CAIRN_WORKSPACE")]
    workspace: Option<String>,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Create or replace a note.
    Write {
        /// Note path, e.g. `entities/person/jamie`.
        path: String,

        /// Markdown content with optional frontmatter; read from stdin
        /// when omitted.
        content: Option<String>,

        /// Tags merged into the frontmatter (comma-separated).
        #[arg(short, long)]
        tags: Option<String>,

        /// Aliases merged into the frontmatter (comma-separated).
        #[arg(short, long)]
        aliases: Option<String>,
    },

    /// Read a note.
    Read {
        /// Note path.
        path: String,

        /// Return only this section's content.
        #[arg(short, long)]
        section: Option<String>,

        /// Return frontmatter and backlinks without the body.
        #[arg(short, long)]
        metadata_only: bool,
    },

    /// Apply a targeted edit to a note body.
    Patch {
        /// Note path.
        path: String,

        /// Operation: append, prepend, replace, append_section, or
        /// prepend_section.
        op: String,

        /// Content to insert; read from stdin when omitted.
        content: Option<String>,

        /// Exact text to replace (replace only).
        #[arg(short, long)]
        find: Option<String>,

        /// Section heading to target (section operations).
        #[arg(short, long)]
        section: Option<String>,
    },

    /// Delete a note.
    Delete {
        /// Note path.
        path: String,
    },

    /// List notes by path prefix.
    List {
        /// Path prefix to list under.
        #[arg(short, long)]
        prefix: Option<String>,

        /// Include notes in nested folders.
        #[arg(short, long)]
        recursive: bool,

        /// Sort order: modified, created, or path.
        #[arg(long, default_value = "modified")]
        sort: String,

        /// Maximum results per page.
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Resumption cursor from a previous page.
        #[arg(long)]
        cursor: Option<String>,
    },

    /// Search notes.
    Search {
        /// Free-text query, prefix-matched per word.
        query: Option<String>,

        /// Require all of these tags (comma-separated).
        #[arg(short, long)]
        tags: Option<String>,

        /// Restrict to paths under this prefix.
        #[arg(short, long)]
        prefix: Option<String>,

        /// Restrict to notes linking to this path.
        #[arg(short, long)]
        backlinks_to: Option<String>,

        /// Restrict to notes modified at or after this RFC 3339 timestamp.
        #[arg(short, long)]
        modified_since: Option<String>,

        /// Maximum results per page.
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Resumption cursor from a previous page.
        #[arg(long)]
        cursor: Option<String>,
    },

    /// Traverse the link graph from a note.
    Links {
        /// Note path to start from.
        path: String,

        /// Traversal depth.
        #[arg(short, long, default_value = "1")]
        depth: usize,

        /// Direction: in, out, or both.
        #[arg(long, default_value = "both")]
        direction: String,
    },

    /// Read or append to a date-keyed daily note.
    Daily {
        /// Date (YYYY-MM-DD); today in the configured timezone when
        /// omitted.
        #[arg(short, long)]
        date: Option<String>,

        /// Operation: read, append, append_section, or prepend_section.
        #[arg(short, long, default_value = "read")]
        op: String,

        /// Content for the mutating operations.
        content: Option<String>,

        /// Section heading for the section operations.
        #[arg(short, long)]
        section: Option<String>,
    },

    /// Rebuild the workspace index from stored documents.
    Reindex,

    /// Generate shell completions.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Main entry point.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Completions need neither config nor logging.
    if let Commands::Completions { shell } = &cli.command {
        let mut command = Cli::command();
        clap_complete::generate(*shell, &mut command, "cairn", &mut std::io::stdout());
        return ExitCode::SUCCESS;
    }

    let config = match load_config(cli.config.as_deref(), cli.verbose) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init(&config) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli, &config) {
        Ok(value) => {
            println!("{}", render(&value));
            ExitCode::SUCCESS
        },
        Err(e) => {
            let body = serde_json::json!({
                "error": { "kind": e.kind(), "message": e.message() }
            });
            eprintln!("{}", render(&body));
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command against the resolved workspace.
fn run_command(cli: Cli, config: &CairnConfig) -> cairn::Result<serde_json::Value> {
    let workspace = cli
        .workspace
        .unwrap_or_else(|| config.default_workspace.clone());
    let service = WorkspaceService::open(config, &workspace)?;

    match cli.command {
        Commands::Write {
            path,
            content,
            tags,
            aliases,
        } => {
            let content = content_or_stdin(content)?;
            cli::cmd_write(&service, path, content, tags, aliases)
        },

        Commands::Read {
            path,
            section,
            metadata_only,
        } => cli::cmd_read(&service, &path, section.as_deref(), metadata_only),

        Commands::Patch {
            path,
            op,
            content,
            find,
            section,
        } => {
            let content = content_or_stdin(content)?;
            cli::cmd_patch(&service, path, &op, content, find, section)
        },

        Commands::Delete { path } => cli::cmd_delete(&service, &path),

        Commands::List {
            prefix,
            recursive,
            sort,
            limit,
            cursor,
        } => cli::cmd_list(&service, prefix, recursive, &sort, limit, cursor),

        Commands::Search {
            query,
            tags,
            prefix,
            backlinks_to,
            modified_since,
            limit,
            cursor,
        } => cli::cmd_search(
            &service,
            query,
            tags,
            prefix,
            backlinks_to,
            modified_since,
            limit,
            cursor,
        ),

        Commands::Links {
            path,
            depth,
            direction,
        } => cli::cmd_links(&service, &path, depth, &direction),

        Commands::Daily {
            date,
            op,
            content,
            section,
        } => cli::cmd_daily(&service, date, &op, content, section),

        Commands::Reindex => cli::cmd_reindex(&service),

        // Handled in main before config load.
        Commands::Completions { .. } => Ok(serde_json::Value::Null),
    }
}

/// Loads configuration, honoring an explicit path and the verbose flag.
fn load_config(path: Option<&str>, verbose: bool) -> cairn::Result<CairnConfig> {
    let mut config = match path {
        Some(config_path) => {
            let mut config = CairnConfig::load_from_file(std::path::Path::new(config_path))?;
            config.validate()?;
            config
        },
        None => CairnConfig::load()?,
    };

    if verbose {
        config.log = "debug".to_string();
    }
    Ok(config)
}

/// Returns the positional content, falling back to stdin.
fn content_or_stdin(content: Option<String>) -> cairn::Result<String> {
    use std::io::Read;

    match content {
        Some(content) => Ok(content),
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .map_err(|e| Error::OperationFailed {
                    operation: "read_stdin".to_string(),
                    cause: e.to_string(),
                })?;
            Ok(input)
        },
    }
}

fn render(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
