use clap::{Parser, Subcommand};
use galleryx::document::{self, BlockKind};
use galleryx::search::{Paginator, SearchQuery};
use galleryx::suggest::{self, SuggestionCursor, SuggestionMode};
use galleryx::tags::TagIndex;
use galleryx::vault::Vault;
use galleryx::{config, output};
use serde_json::json;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "galleryx")]
#[command(about = "Gallery blocks, tags and search for Markdown vaults")]
#[command(long_about = "\
Gallery blocks, tags and search for Markdown vaults

A vault is a directory of Markdown notes. Galleries are fenced code blocks:

  ```galleryx
  settings: grid
  columns: 3
  https://example.com/cat.jpg {Cat, Pets}
  ![[clips/run.mp4]] {sport}
  ```

Single items use an inline code span (`galleryx-single: ![[dog.png]] {dog}`)
and saved searches a `galleryx-search` block with `tags:` and `limit:` lines.

Tags are case-insensitive and stored lower-cased. The tag index is seeded
from every note that contains a gallery marker.

Run 'galleryx gen-config' to generate a documented galleryx.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Vault root directory
    #[arg(long, default_value = ".", global = true)]
    vault: PathBuf,

    /// Log per-document progress to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every gallery, single and search block in the vault
    Scan,
    /// Seed the tag index and print every known tag
    Tags,
    /// Suggest tags for a comma-separated input
    Suggest {
        /// Input text; the segment after the last comma is completed
        input: String,
        /// First N matches in index order instead of all matches sorted
        #[arg(long)]
        top: bool,
        /// Highlight the Nth suggestion (1-based) and print the committed input
        #[arg(long)]
        pick: Option<usize>,
    },
    /// Find items carrying every given tag
    Search {
        /// Comma-separated tags; empty matches everything
        #[arg(default_value = "")]
        tags: String,
        /// Page to show (1-based)
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Replace the tags of one item and rewrite its document
    Tag {
        /// Document path relative to the vault root
        doc: PathBuf,
        /// Item source exactly as written in the block
        source: String,
        /// Comma-separated new tags; empty removes the tag group
        #[arg(default_value = "")]
        tags: String,
    },
    /// Parse the blocks of one document (or stdin) and print them as JSON
    Parse {
        /// Document to parse; reads stdin when omitted
        file: Option<PathBuf>,
    },
    /// Print a stock galleryx.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Scan => {
            let vault = open_vault(&cli.vault)?;
            let docs = vault.galleries()?;
            output::print_scan_output(&docs, vault.config().search.page_size);
        }
        Command::Tags => {
            let vault = open_vault(&cli.vault)?;
            let mut index = TagIndex::new();
            let report = vault.populate_index(&mut index)?;
            output::print_tag_index(&index, &report);
        }
        Command::Suggest { input, top, pick } => {
            let vault = open_vault(&cli.vault)?;
            let mut index = TagIndex::new();
            vault.populate_index(&mut index)?;

            let suggestions = vault.config().suggestions.clone();
            let mode = if top {
                SuggestionMode::Top(suggestions.limit)
            } else {
                suggestions.suggestion_mode()
            };
            let mut cursor = SuggestionCursor::new(suggest::suggest(&input, &index, mode));
            for _ in 0..pick.unwrap_or(0) {
                cursor.move_down();
            }
            output::print_suggestions(cursor.suggestions(), cursor.selected_index());
            if let Some(committed) = cursor.commit(&input) {
                println!("Input: {committed}");
            }
        }
        Command::Search { tags, page } => {
            let vault = open_vault(&cli.vault)?;
            let page_size = vault.config().search.page_size;
            let query = SearchQuery::from_input(&tags, page_size);
            let results = vault.search(&query)?;
            let mut pages = Paginator::new(&results, query.limit);
            pages.go_to(page);
            output::print_search_page(&pages);
        }
        Command::Tag { doc, source, tags } => {
            let vault = open_vault(&cli.vault)?;
            let mut index = TagIndex::new();
            vault.populate_index(&mut index)?;
            let outcome = vault.edit_item_tags(&doc, &source, &[tags], &mut index)?;
            output::print_tag_edit(&outcome);
        }
        Command::Parse { file } => {
            let text = match file {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let config = config::load_config(&cli.vault)?;
            let blocks: Vec<serde_json::Value> = document::find_blocks(&text, &config.markers)
                .iter()
                .map(|block| match block.kind {
                    BlockKind::Search => {
                        let query = block.search_query(config.search.page_size);
                        json!({
                            "kind": "search",
                            "line": block.line,
                            "inline": block.inline,
                            "query": query.map(|q| json!({ "tags": q.tags, "limit": q.limit })),
                        })
                    }
                    kind => json!({
                        "kind": if kind == BlockKind::Single { "single" } else { "gallery" },
                        "line": block.line,
                        "inline": block.inline,
                        "gallery": block.parse(),
                    }),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&blocks)?);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Open the vault and size the rayon pool from its `[processing]` config.
///
/// Every command that reads documents goes through here.
fn open_vault(root: &Path) -> Result<Vault, galleryx::vault::VaultError> {
    let vault = Vault::open(root)?;
    init_thread_pool(&vault.config().processing);
    Ok(vault)
}

/// Log to stderr so stdout stays parseable. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "galleryx=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
