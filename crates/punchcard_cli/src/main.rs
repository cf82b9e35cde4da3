//! `punchcard` command line journal.
//!
//! # Responsibility
//! - Drive the core journal service from a shell.
//! - Persist local drafts (entries plus undo slot) between invocations.
//!
//! Usage: punchcard <command> [--db PATH] [--draft PATH]

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use punchcard_core::model::draft::DraftBuffer;
use punchcard_core::sync::snapshot::{
    decode_draft_matrix, decode_entry_set_snapshot, encode_entry_set_snapshot,
};
use punchcard_core::view::export::{build_memory_export, build_publish_snapshot};
use punchcard_core::view::preview::derive_entry_preview;
use punchcard_core::{
    init_from_config, open_db, AdminGate, AuthorizationToken, Entry, EntryOrder, EntryStore,
    JournalConfig, JournalService, SqliteEntryRepository, NOTEBOOK_PAGE_SIZE,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "punchcard")]
#[command(about = "2026 punch-card journal", version)]
struct Cli {
    /// SQLite file with the published entries (overrides PUNCHCARD_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Local draft snapshot file (overrides PUNCHCARD_DRAFT_PATH)
    #[arg(long, global = true)]
    draft: Option<PathBuf>,

    /// Absolute log directory (overrides PUNCHCARD_LOG_DIR)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error (overrides PUNCHCARD_LOG_LEVEL)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write text on a day, e.g. `write "jan 14" "met with advisor"`
    Write {
        label: String,
        /// Blank text erases the day
        #[arg(num_args = 1.., trailing_var_arg = true)]
        text: Vec<String>,
    },

    /// Erase a day (undoable)
    Erase { label: String },

    /// Restore the last erased day
    Undo,

    /// List local entries
    List {
        /// Case-insensitive filter on label or text
        #[arg(long, default_value = "")]
        query: String,
        /// Zero-based page index
        #[arg(long, default_value_t = 0)]
        page: usize,
        #[arg(long, default_value_t = NOTEBOOK_PAGE_SIZE)]
        page_size: usize,
        #[arg(long, value_enum, default_value_t = OrderArg::Written)]
        order: OrderArg,
    },

    /// Merge the published entries into local drafts
    Fetch,

    /// Merge with the published entries and publish the result
    Publish {
        /// Admin token (defaults to PUNCHCARD_ADMIN_TOKEN)
        #[arg(long)]
        token: Option<String>,
    },

    /// Replace local drafts with a legacy `{ punched, logs }` grid file
    ImportDraft { file: PathBuf },

    /// Print a JSON export of local drafts
    Export {
        #[arg(long, value_enum, default_value_t = ExportKind::Memory)]
        kind: ExportKind,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    /// Newest write first
    Written,
    /// Latest calendar day first
    Calendar,
}

impl From<OrderArg> for EntryOrder {
    fn from(value: OrderArg) -> Self {
        match value {
            OrderArg::Written => EntryOrder::Written,
            OrderArg::Calendar => EntryOrder::Calendar,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportKind {
    /// Raw grid plus every logged day
    Memory,
    /// Titled entries, latest day first
    Snapshot,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli);
    init_from_config(&config).context("failed to initialize logging")?;

    let store = load_store(&config.draft_path)?;
    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;
    let repo = SqliteEntryRepository::new(&conn, AdminGate::new(config.admin_token.as_deref()));
    let service = JournalService::new(store, repo);

    match cli.command {
        Command::Write { label, text } => {
            let text = text.join(" ");
            match service.write(&label, &text, now_ms())? {
                Some(entry) => println!("wrote {} ({})", entry.label, entry.id),
                None => println!("erased {label}"),
            }
            save_store(&config.draft_path, service.store())?;
        }
        Command::Erase { label } => {
            match service.erase(&label)? {
                Some(entry) => println!("erased {} (undo available)", entry.label),
                None => println!("nothing written on {label}"),
            }
            save_store(&config.draft_path, service.store())?;
        }
        Command::Undo => {
            match service.undo() {
                Some(entry) => println!("restored {}", entry.label),
                None => println!("nothing to undo"),
            }
            save_store(&config.draft_path, service.store())?;
        }
        Command::List {
            query,
            page,
            page_size,
            order,
        } => {
            if page_size == 0 {
                bail!("--page-size must be at least 1");
            }
            let view = service.page(&query, order.into(), page_size, page);
            let window = view.window;
            println!(
                "page {}/{} | showing {}-{} of {}",
                window.page_index + 1,
                window.total_pages,
                window.first_item,
                window.last_item,
                window.total_items
            );
            for entry in &view.items {
                print_entry(entry);
            }
        }
        Command::Fetch => {
            let summary = service.refresh_from_remote()?;
            println!(
                "merged {} entries ({} local wins, {} remote wins)",
                summary.total(),
                summary.local_wins,
                summary.remote_wins
            );
            save_store(&config.draft_path, service.store())?;
        }
        Command::Publish { token } => {
            let token = token
                .or_else(|| config.admin_token.clone())
                .ok_or_else(|| anyhow!("no admin token; pass --token or set PUNCHCARD_ADMIN_TOKEN"))?;
            let report = service.publish(&AuthorizationToken::new(token))?;
            println!("published {} entries", report.published);
            save_store(&config.draft_path, service.store())?;
        }
        Command::ImportDraft { file } => {
            let json = fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let draft = decode_draft_matrix(&json)
                .with_context(|| format!("invalid draft grid in {}", file.display()))?;
            let entries = draft.to_entry_set(now_ms())?;
            let count = entries.len();
            service.store().replace_all(entries);
            save_store(&config.draft_path, service.store())?;
            println!("imported {count} entries");
        }
        Command::Export { kind } => {
            let entries = service.store().all();
            let json = match kind {
                ExportKind::Memory => serde_json::to_string_pretty(&build_memory_export(
                    &DraftBuffer::from_entry_set(&entries),
                    Utc::now(),
                ))?,
                ExportKind::Snapshot => {
                    serde_json::to_string_pretty(&build_publish_snapshot(&entries, Utc::now()))?
                }
            };
            println!("{json}");
        }
    }

    Ok(())
}

fn resolve_config(cli: &Cli) -> JournalConfig {
    let mut config = JournalConfig::from_env();
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(draft) = &cli.draft {
        config.draft_path = draft.clone();
    }
    if let Some(log_dir) = &cli.log_dir {
        config.log_dir = log_dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    config
}

fn load_store(path: &Path) -> Result<EntryStore> {
    if !path.exists() {
        return Ok(EntryStore::new());
    }
    let json =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let (entries, undo) = decode_entry_set_snapshot(&json)
        .with_context(|| format!("invalid draft snapshot in {}", path.display()))?;
    info!(
        "event=draft_load module=cli status=ok count={} undo_pending={}",
        entries.len(),
        undo.is_some()
    );
    Ok(EntryStore::from_parts(entries, undo))
}

fn save_store(path: &Path, store: &EntryStore) -> Result<()> {
    let (entries, undo) = store.snapshot();
    let json = encode_entry_set_snapshot(&entries, undo.as_ref())?;
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    info!(
        "event=draft_save module=cli status=ok count={}",
        entries.len()
    );
    Ok(())
}

fn print_entry(entry: &Entry) {
    let preview = derive_entry_preview(entry);
    println!("{:>6}  {}", entry.label, preview.title);
    if let Some(excerpt) = preview.excerpt.filter(|excerpt| *excerpt != preview.title) {
        println!("        {excerpt}");
    }
    if let Some(image) = preview.image {
        println!("        image: {image}");
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
