//! Gatefold CLI — reader shell for the gated publication.
//!
//! A standalone HTTP client that drives a client session against a running
//! Gatefold server: unlock sections with an access key, inspect the
//! section list, and open content pages the way the web shell loads them.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod remote;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use gatefold_core::guard::GuardState;
use gatefold_core::navigation::default_sections;
use gatefold_core::overlay::OverlayState;
use gatefold_core::page::PageQuery;
use gatefold_core::registry::KeyRegistry;
use gatefold_core::session::{BackAction, ClientSession, ContentLayer};
use gatefold_storage::{JsonFileStore, MemoryStore};

use crate::remote::RemoteSource;

// ── ANSI color helpers ───────────────────────────────────────────────

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

// ── CLI structure ────────────────────────────────────────────────────

/// Gatefold — reader shell for the gated publication.
#[derive(Parser)]
#[command(
    name = "gatefold",
    version,
    about = "Gatefold CLI — unlock sections and browse the publication",
    long_about = None,
    after_help = format!(
        "{DIM}Environment variables:{RESET}\n  \
         GATEFOLD_ADDR   Server address (default: http://127.0.0.1:8600)\n  \
         GATEFOLD_HOME   Directory for the persisted session state\n\n\
         {DIM}Examples:{RESET}\n  \
         gatefold status\n  \
         gatefold unlock ARCHIVE_2026\n  \
         gatefold open /post/31188738e14680a3bff7de9e9ed62509\n  \
         gatefold clear"
    ),
)]
struct Cli {
    /// Gatefold server address.
    #[arg(long, env = "GATEFOLD_ADDR", default_value = "http://127.0.0.1:8600")]
    addr: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current role and the section list.
    Status,
    /// Apply an access key.
    Unlock {
        /// The key to apply (surrounding whitespace is ignored).
        key: String,
    },
    /// Load a content page the way the web shell would.
    Open {
        /// Path, optionally with query parameters
        /// (e.g. `/post/<id>?modal=<id>`).
        path: String,
    },
    /// List the top-level sections and their links.
    Sections,
    /// Forget the persisted access key.
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let session = build_session(&cli.addr).await?;

    match cli.command {
        Commands::Status => status(&session).await,
        Commands::Unlock { key } => unlock(&session, &key).await,
        Commands::Open { path } => open(&session, &path).await,
        Commands::Sections => sections(&session),
        Commands::Clear => clear(&session).await,
    }
}

/// Directory holding the persisted session state.
fn home_dir() -> Result<PathBuf> {
    if let Ok(home) = std::env::var("GATEFOLD_HOME") {
        return Ok(PathBuf::from(home));
    }
    let home = std::env::var("HOME").context("neither GATEFOLD_HOME nor HOME is set")?;
    Ok(PathBuf::from(home).join(".config").join("gatefold"))
}

/// Assemble the client session: persistent store on disk, session store
/// in memory (one CLI invocation is one session), content from the server.
async fn build_session(addr: &str) -> Result<ClientSession> {
    let store_path = home_dir()?.join("session.json");
    let persistent = JsonFileStore::open(&store_path)
        .await
        .with_context(|| format!("failed to open {}", store_path.display()))?;

    Ok(ClientSession::new(
        KeyRegistry::default(),
        default_sections(),
        Arc::new(persistent),
        Arc::new(MemoryStore::new()),
        Arc::new(RemoteSource::new(addr.to_owned())),
    ))
}

async fn status(session: &ClientSession) -> Result<()> {
    let role = session.control().resolve(None).await;
    println!("{BOLD}Role:{RESET} {role}");
    println!();
    sections(session)
}

fn sections(session: &ClientSession) -> Result<()> {
    println!("{BOLD}Sections:{RESET}");
    for section in session.tracker().sections() {
        println!(
            "  {CYAN}{:<10}{RESET} {:<24} {DIM}{}{RESET}",
            section.id,
            section.label,
            section.href()
        );
    }
    Ok(())
}

async fn unlock(session: &ClientSession, key: &str) -> Result<()> {
    let role = session.control().apply_key(key).await;
    if role.is_none() {
        bail!("invalid key");
    }
    println!("{GREEN}✓{RESET} unlocked — role is now {BOLD}{role}{RESET}");
    Ok(())
}

async fn clear(session: &ClientSession) -> Result<()> {
    session.control().store().clear().await;
    println!("{GREEN}✓{RESET} persisted key cleared");
    Ok(())
}

async fn open(session: &ClientSession, path: &str) -> Result<()> {
    let (path, query) = match path.split_once('?') {
        Some((p, q)) => (p, PageQuery::parse(q)),
        None => (path, PageQuery::default()),
    };

    let view = session
        .load_page(path, &query)
        .await
        .with_context(|| format!("failed to load {path}"))?;

    let layer = match view.layer {
        ContentLayer::SectionList => "section list",
        ContentLayer::FullDetail => "detail page",
    };
    println!("{BOLD}Layer:{RESET} {layer}");
    println!("{BOLD}Role:{RESET}  {}", view.role);

    if let Some(index) = view.active_section {
        if let Some(section) = session.tracker().sections().get(index) {
            println!("{BOLD}Tab:{RESET}   {}", section.label);
        }
    }

    match view.guard.state() {
        GuardState::Granted => {
            if let Some(title) = &view.title {
                println!("{BOLD}Title:{RESET} {title}");
            }
            let blocks = view
                .record
                .as_value()
                .get("block")
                .and_then(serde_json::Value::as_object)
                .map_or(0, serde_json::Map::len);
            println!("{GREEN}✓{RESET} content loaded ({blocks} blocks)");
        }
        GuardState::Locked => {
            println!(
                "{YELLOW}locked{RESET} — this page needs an access key \
                 {DIM}(gatefold unlock <key>){RESET}"
            );
        }
        GuardState::Loading => {}
    }

    if view.layer == ContentLayer::FullDetail {
        match session.back_action(path, &query)? {
            BackAction::RestoreOverlay { href } => {
                println!("{DIM}back restores the overlay: {href}{RESET}");
            }
            BackAction::HistoryBack => {}
        }
    }

    report_overlay(session).await;
    Ok(())
}

/// Wait for an auto-opened overlay to settle and describe it.
async fn report_overlay(session: &ClientSession) {
    let mut state = session.overlay().state().await;
    if !state.is_open() {
        return;
    }

    // The fetch is fire-and-forget; poll briefly for a settled state.
    for _ in 0..100 {
        if !matches!(state, OverlayState::Loading { .. }) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        state = session.overlay().state().await;
    }

    match state {
        OverlayState::Ready { page, record, .. } => {
            let title = record.title().unwrap_or_else(|| page.to_string());
            println!("{BOLD}Overlay:{RESET} {title}");
        }
        OverlayState::Failed { page, reason, .. } => {
            println!("{RED}overlay failed{RESET} for {page}: {reason}");
        }
        OverlayState::Loading { page, .. } => {
            println!("{DIM}overlay still loading for {page}{RESET}");
        }
        OverlayState::Closed => {}
    }
}
