// src/main.rs
//
// canopy - operator CLI over the tree store

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::{Builder, Target};
use log::LevelFilter;
use serde::Serialize;

use canopy::application::commands::*;
use canopy::application::dto::*;
use canopy::application::{AppState, CommandResult, ErrorResponse};
use canopy::config::StoreConfig;
use canopy::db::{get_connection, get_database_stats, verify_database_integrity};
use canopy::domain::NodeKind;

/// Hierarchical category and collection store.
#[derive(Parser)]
#[command(name = "canopy", version, about = "Nested-set category and collection store")]
struct Cli {
    /// JSON config file (defaults, then this file, then CANOPY_* variables).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file; overrides the config.
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create (or upgrade) the database.
    Init,

    /// Create a node.
    Create {
        /// category or collection.
        #[arg(long, default_value = "category")]
        kind: String,
        #[arg(long)]
        parent: Option<String>,
        /// Insert directly after this sibling.
        #[arg(long)]
        after: Option<String>,
        #[arg(long)]
        key: Option<String>,
        #[arg(long)]
        locale: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "keyword")]
        keywords: Vec<String>,
        /// Collection type key (collections only).
        #[arg(long = "type")]
        collection_type: Option<String>,
    },

    /// Move a node with its subtree.
    Move {
        node: String,
        /// New parent; omit to make the node a root.
        #[arg(long)]
        parent: Option<String>,
        #[arg(long)]
        after: Option<String>,
    },

    /// Change attributes of a node.
    Update {
        node: String,
        #[arg(long)]
        key: Option<String>,
        /// Collection type key (collections only).
        #[arg(long = "type")]
        collection_type: Option<String>,
        /// Locale used when a requested translation is missing.
        #[arg(long)]
        default_locale: Option<String>,
    },

    /// Delete a node.
    Delete {
        node: String,
        /// Also delete every descendant.
        #[arg(long)]
        cascade: bool,
    },

    /// Set the translation of a node for one locale.
    SetContent {
        node: String,
        #[arg(long)]
        locale: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "keyword")]
        keywords: Vec<String>,
    },

    /// Create or update a meta entry.
    Meta {
        node: String,
        #[arg(long)]
        key: String,
        #[arg(long)]
        value: String,
        /// Locale the entry applies to; omit for all locales.
        #[arg(long)]
        locale: Option<String>,
        /// Update this entry instead of creating one.
        #[arg(long)]
        id: Option<String>,
        /// Use the entry as the node's fallback meta.
        #[arg(long)]
        default: bool,
    },

    /// File a media item under a collection.
    AttachMedia {
        node: String,
        file_name: String,
    },

    /// Show a node in one locale.
    Show {
        node: String,
        #[arg(long, default_value = "en")]
        locale: String,
    },

    /// Print a whole forest.
    Tree {
        #[arg(long, default_value = "category")]
        kind: String,
        #[arg(long, default_value = "en")]
        locale: String,
    },

    /// Print the ancestors of a node.
    Breadcrumb {
        node: String,
        #[arg(long, default_value = "en")]
        locale: String,
    },

    /// Check database integrity and both forests.
    Check,
}

fn init_logger() {
    if std::env::var("RUST_LOG").is_ok() {
        env_logger::init();
    } else {
        Builder::new()
            .target(Target::Stderr)
            .filter_level(LevelFilter::Warn)
            .filter_module("canopy", LevelFilter::Info)
            .init();
    }
}

fn main() -> Result<()> {
    init_logger();
    let cli = Cli::parse();

    let mut config = StoreConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(database) = &cli.database {
        config.database_path = database.clone();
    }

    let state = AppState::initialize(&config)
        .with_context(|| format!("opening {}", config.database_path.display()))?;
    log::info!("using {}", config.database_path.display());

    if let Err(error) = run(&state, &cli) {
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&error)?);
        } else {
            eprintln!("error: {}", error);
        }
        std::process::exit(1);
    }
    Ok(())
}

fn run(state: &AppState, cli: &Cli) -> CommandResult<()> {
    let json = cli.json;

    match &cli.command {
        Commands::Init => print(json, &"ok", |_| println!("ok")),

        Commands::Create {
            kind,
            parent,
            after,
            key,
            locale,
            title,
            description,
            keywords,
            collection_type,
        } => {
            let node = create_node(
                state,
                CreateNodeDto {
                    kind: kind.clone(),
                    parent_id: parent.clone(),
                    after_sibling_id: after.clone(),
                    key: key.clone(),
                    locale: locale.clone(),
                    title: title.clone(),
                    description: description.clone(),
                    keywords: keywords.clone(),
                    collection_type: collection_type.clone(),
                },
            )?;
            print(json, &node, |n| println!("{}", n.id))
        }

        Commands::Move {
            node,
            parent,
            after,
        } => {
            let node = move_node(
                state,
                MoveNodeDto {
                    node_id: node.clone(),
                    parent_id: parent.clone(),
                    after_sibling_id: after.clone(),
                },
            )?;
            print(json, &node, |n| println!("{} [{}, {}] depth {}", n.id, n.lft, n.rgt, n.depth))
        }

        Commands::Update {
            node,
            key,
            collection_type,
            default_locale,
        } => {
            let node = update_node(
                state,
                UpdateNodeDto {
                    node_id: node.clone(),
                    key: key.clone(),
                    collection_type: collection_type.clone(),
                    default_locale: default_locale.clone(),
                },
            )?;
            print(json, &node, |n| println!("{}", n.id))
        }

        Commands::Delete { node, cascade } => {
            let removed = delete_node(state, node, *cascade)?;
            print(json, &removed, |ids| println!("removed {} node(s)", ids.len()))
        }

        Commands::SetContent {
            node,
            locale,
            title,
            description,
            keywords,
        } => {
            let translation = set_content(
                state,
                SetContentDto {
                    node_id: node.clone(),
                    locale: locale.clone(),
                    title: title.clone(),
                    description: description.clone(),
                    keywords: keywords.clone(),
                },
            )?;
            print(json, &translation, |t| println!("{}: {}", t.locale, t.title))
        }

        Commands::Meta {
            node,
            key,
            value,
            locale,
            id,
            default,
        } => {
            let meta = set_meta(
                state,
                SetMetaDto {
                    node_id: node.clone(),
                    id: id.clone(),
                    locale: locale.clone(),
                    key: key.clone(),
                    value: value.clone(),
                    make_default: *default,
                },
            )?;
            print(json, &meta, |entries| {
                for m in entries {
                    println!(
                        "{} [{}] {} = {}",
                        m.id,
                        m.locale.as_deref().unwrap_or("*"),
                        m.key,
                        m.value
                    );
                }
            })
        }

        Commands::AttachMedia { node, file_name } => {
            let media = attach_media(
                state,
                AttachMediaDto {
                    node_id: node.clone(),
                    file_name: file_name.clone(),
                },
            )?;
            print(json, &media, |m| println!("{}", m.id))
        }

        Commands::Show { node, locale } => {
            let view = get_view(state, node, locale)?;
            print(json, &view, print_view)
        }

        Commands::Tree { kind, locale } => {
            let lines = get_tree(state, kind, locale)?;
            print(json, &lines, |lines| {
                for line in lines {
                    println!(
                        "{}{} [{}, {}] {}",
                        "  ".repeat(line.depth.max(0) as usize),
                        line.title.as_deref().or(line.key.as_deref()).unwrap_or("(untitled)"),
                        line.lft,
                        line.rgt,
                        line.id
                    );
                }
            })
        }

        Commands::Breadcrumb { node, locale } => {
            let crumbs = get_breadcrumb(state, node, locale)?;
            print(json, &crumbs, |crumbs| {
                let titles: Vec<&str> = crumbs
                    .iter()
                    .map(|c| c.title.as_deref().unwrap_or(&c.id))
                    .collect();
                println!("{}", titles.join(" / "));
            })
        }

        Commands::Check => {
            let conn = get_connection(&state.pool)?;
            verify_database_integrity(&conn)?;
            for kind in [NodeKind::Category, NodeKind::Collection] {
                state.tree_service.verify_forest(kind)?;
            }
            let stats = get_database_stats(&conn)?;
            print(json, &stats, |r| {
                println!(
                    "ok: {} categories, {} collections, {} translations, {} media ({} bytes)",
                    r.category_count, r.collection_count, r.translation_count, r.media_count, r.size_bytes
                )
            })
        }
    }
}

fn print<T, F>(json: bool, value: &T, human: F) -> CommandResult<()>
where
    T: Serialize,
    F: FnOnce(&T),
{
    if json {
        let text = serde_json::to_string_pretty(value)
            .map_err(|e| ErrorResponse::from_app_error(e.into()))?;
        println!("{}", text);
    } else {
        human(value);
    }
    Ok(())
}

fn print_view(view: &NodeViewDto) {
    let title = view.title.as_deref().unwrap_or("(untitled)");
    match &view.resolved_locale {
        Some(resolved) if *resolved != view.locale => println!("{} ({})", title, resolved),
        _ => println!("{}", title),
    }
    println!("  id:       {}", view.node.id);
    println!("  kind:     {}{}", view.node.kind, if view.node.locked { " (locked)" } else { "" });
    println!("  interval: [{}, {}] depth {}", view.node.lft, view.node.rgt, view.node.depth);
    if let Some(description) = &view.description {
        println!("  about:    {}", description);
    }
    if !view.keywords.is_empty() {
        println!("  keywords: {}", view.keywords.join(", "));
    }
    if !view.breadcrumb.is_empty() {
        let path: Vec<&str> = view
            .breadcrumb
            .iter()
            .map(|c| c.title.as_deref().unwrap_or(&c.id))
            .collect();
        println!("  path:     {}", path.join(" / "));
    }
    for meta in &view.meta {
        println!("  meta:     {} = {}", meta.key, meta.value);
    }
    println!(
        "  counts:   {} children, {} descendants, {} media ({} in subtree)",
        view.aggregates.child_count,
        view.aggregates.descendant_count,
        view.aggregates.media_count,
        view.aggregates.subtree_media_count
    );
    for child in &view.children {
        println!("  - {}", child.title.as_deref().unwrap_or(&child.id));
    }
}
