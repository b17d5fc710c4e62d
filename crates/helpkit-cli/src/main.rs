mod chat;
mod config;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use helpkit_core::{
    match_query, normalize, score_all, tokenize, Catalog, FormatOptions, Session, TurnResult,
};

use crate::config::Config;

#[derive(Parser)]
#[command(
    name = "helpkit",
    version,
    about = "Keyword help bot - answers questions from a static knowledge base"
)]
struct Cli {
    /// Path to a catalog TOML file (overrides config)
    #[arg(long, global = true)]
    kb: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question
    Ask {
        /// Question text
        #[arg(required = true)]
        query: Vec<String>,

        /// Print the turn as JSON
        #[arg(long)]
        json: bool,
    },

    /// Click a quick-reply chip by its label
    Chip {
        /// Chip label, e.g. "Change email"
        label: String,

        /// Print the turn as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive chat on stdin/stdout
    Chat,

    /// Show how a question is tokenized and scored
    Explain {
        /// Question text
        #[arg(required = true)]
        query: Vec<String>,

        /// Include entries that scored zero
        #[arg(short, long)]
        all: bool,
    },

    /// List topics in the catalog
    Topics,

    /// Validate a catalog file
    Validate {
        /// Catalog TOML (defaults to the active catalog)
        path: Option<PathBuf>,
    },

    /// Show current configuration
    Config,

    /// Run the JSON-RPC bridge on stdio for an embedding widget
    Serve {
        /// Maximum concurrent sessions (overrides config)
        #[arg(long)]
        max_sessions: Option<usize>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = config::load_config()?;
    let kb = cli.kb.as_deref();

    match cli.command {
        Commands::Ask { query, json } => {
            cmd_ask(open_catalog(kb, &config)?, &query.join(" "), json)
        }
        Commands::Chip { label, json } => cmd_chip(open_catalog(kb, &config)?, &label, json),
        Commands::Chat => cmd_chat(open_catalog(kb, &config)?),
        Commands::Explain { query, all } => {
            cmd_explain(&*open_catalog(kb, &config)?, &query.join(" "), all)
        }
        Commands::Topics => cmd_topics(&*open_catalog(kb, &config)?),
        Commands::Validate { path } => cmd_validate(path.as_deref().or(kb), &config),
        Commands::Config => cmd_config(kb, &config),
        Commands::Serve { max_sessions } => helpkit_bridge::run_server(
            open_catalog(kb, &config)?,
            max_sessions.unwrap_or(config.bridge.max_sessions),
        ),
    }
}

// ---------------------------------------------------------------------------
// Catalog loading
// ---------------------------------------------------------------------------

/// Resolve the catalog: `--kb`, then `kb.path` from config, then `kb.toml`
/// in the platform config dir, then the built-in catalog. Returns the
/// catalog and a description of where it came from.
fn load_catalog(flag: Option<&Path>, config: &Config) -> Result<(Catalog, String)> {
    let explicit = flag
        .map(Path::to_path_buf)
        .or_else(|| config.kb.path.as_ref().map(PathBuf::from));

    let (catalog, source) = match explicit {
        Some(path) => (read_catalog(&path)?, path.display().to_string()),
        None => match default_kb_path().filter(|p| p.exists()) {
            Some(path) => (read_catalog(&path)?, path.display().to_string()),
            None => (
                Catalog::builtin().context("loading built-in catalog")?,
                "built-in".to_string(),
            ),
        },
    };

    let catalog = catalog.with_format(FormatOptions {
        linkify: config.reply.linkify,
    });
    Ok((catalog, source))
}

fn open_catalog(flag: Option<&Path>, config: &Config) -> Result<Arc<Catalog>> {
    let (catalog, source) = load_catalog(flag, config)?;
    tracing::debug!(source = %source, topics = catalog.kb.len(), "catalog ready");
    Ok(Arc::new(catalog))
}

fn read_catalog(path: &Path) -> Result<Catalog> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Catalog::from_toml_str(&content).with_context(|| format!("loading catalog {}", path.display()))
}

fn default_kb_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "helpkit").map(|d| d.config_dir().join("kb.toml"))
}

// ---------------------------------------------------------------------------
// Turn commands
// ---------------------------------------------------------------------------

fn cmd_ask(catalog: Arc<Catalog>, query: &str, json: bool) -> Result<()> {
    let mut session = Session::new(catalog);
    let turn = session.handle_user_message(query);
    print_turn_result(turn.as_ref(), json)
}

fn cmd_chip(catalog: Arc<Catalog>, label: &str, json: bool) -> Result<()> {
    let mut session = Session::new(catalog);
    let turn = session.handle_chip_click(label);
    print_turn_result(turn.as_ref(), json)
}

fn print_turn_result(turn: Option<&TurnResult>, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&turn)?);
        return Ok(());
    }
    match turn {
        Some(turn) => {
            chat::print_turn(&mut io::stdout(), turn)?;
            if let Some(topic) = &turn.topic {
                println!("  (topic: {topic}, {})", turn.resolution);
            }
        }
        None => println!("(empty input, nothing to answer)"),
    }
    Ok(())
}

fn cmd_chat(catalog: Arc<Catalog>) -> Result<()> {
    let mut session = Session::new(catalog);
    let stdin = io::stdin();
    let turns = chat::chat_loop(&mut session, stdin.lock(), &mut io::stdout())?;
    tracing::debug!(turns, "chat ended");
    Ok(())
}

// ---------------------------------------------------------------------------
// Inspection commands
// ---------------------------------------------------------------------------

fn cmd_explain(catalog: &Catalog, query: &str, all: bool) -> Result<()> {
    let text = normalize(query);
    let mut tokens: Vec<_> = tokenize(&text).into_iter().collect();
    tokens.sort();

    println!("text:   {text:?}");
    println!("tokens: {}", tokens.join(", "));
    println!();

    let mut any = false;
    for (entry, score) in score_all(&text, &catalog.kb) {
        if score > 0 || all {
            println!("  {:<12} {score}", entry.id);
            any = true;
        }
    }
    if !any {
        println!("  (no entry scored)");
    }
    println!();

    let best = match_query(&text, &catalog.kb);
    match best.entry {
        Some(entry) => println!("winner: {} (score {})", entry.id, best.score),
        None => match catalog.fallback.resolve(&text, &catalog.kb) {
            Some((rule, entry)) => println!("winner: {} (fallback rule {})", entry.id, rule.name),
            None => println!("winner: none (unresolved)"),
        },
    }
    Ok(())
}

fn cmd_topics(catalog: &Catalog) -> Result<()> {
    if catalog.kb.is_empty() {
        println!("No topics.");
        return Ok(());
    }
    for entry in catalog.kb.iter() {
        println!("{}", entry.id);
        println!("  keys:  {}", entry.keys.join(", "));
        println!(
            "  chips: {}",
            catalog
                .suggestions
                .suggestions_for(Some(entry.id.as_str()))
                .join(", ")
        );
    }
    println!();
    println!("home: {}", catalog.suggestions.home().join(", "));
    Ok(())
}

fn cmd_validate(path: Option<&Path>, config: &Config) -> Result<()> {
    let (catalog, source) = match path {
        Some(p) => (read_catalog(p)?, p.display().to_string()),
        None => load_catalog(None, config)?,
    };
    print_catalog_summary(&catalog, &source);
    Ok(())
}

fn print_catalog_summary(catalog: &Catalog, source: &str) {
    println!("Catalog: {source}");
    println!("  topics:         {}", catalog.kb.len());
    println!("  fallback rules: {}", catalog.fallback.len());
    for rule in catalog.fallback.rules() {
        println!("    {} -> {}", rule.name, rule.topic);
    }
    println!("  home chips:     {}", catalog.suggestions.home().len());
    let dangling = catalog.dangling_labels();
    if dangling.is_empty() {
        println!("OK");
    } else {
        println!("  labels without a topic (matched as text): {}", dangling.join(", "));
    }
}

fn cmd_config(flag: Option<&Path>, config: &Config) -> Result<()> {
    println!("Config: {}", config::show_config_path());
    let kb_source = match flag {
        Some(p) => format!("{} (--kb)", p.display()),
        None => match (&config.kb.path, default_kb_path()) {
            (Some(p), _) => format!("{p} (config)"),
            (None, Some(p)) if p.exists() => format!("{} (default location)", p.display()),
            _ => "built-in".to_string(),
        },
    };
    println!("Catalog: {kb_source}");
    println!("Linkify replies: {}", config.reply.linkify);
    println!("Bridge max sessions: {}", config.bridge.max_sessions);
    Ok(())
}
