//! codegraph-pipeline CLI - drives the multi-pass graph construction
//! pipeline over a repository and reports what it produced.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use codegraph_pipeline::application::ports::GraphStore;
use codegraph_pipeline::connector::env_scanner;
use codegraph_pipeline::connector::git::{diff_scope, ChangeStatus, DiffScope};
use codegraph_pipeline::{
    project_name_from_path, CancellationToken, EdgeType, GitHistoryAnalyser, InMemoryGraphStore,
    Language, NodeLabel, PipelineConfig, PipelineDriver, TreeSitterBackend,
};

/// codegraph-pipeline - builds a code knowledge graph from a source repo
#[derive(Parser)]
#[command(name = "codegraph-pipeline")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to pipeline.toml (defaults to <repo>/pipeline.toml if present)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full index over a repository
    Index {
        /// Path to the repository to index
        path: String,

        /// Project name override (defaults to a derivation from the path)
        #[arg(short, long)]
        name: Option<String>,

        /// Skip the git-history change-coupling pass
        #[arg(long)]
        no_history: bool,
    },

    /// Re-index only the files a git diff touched
    Reindex {
        /// Path to the repository to re-index
        path: String,

        /// Diff scope: unstaged, staged, all, or branch[:base]
        #[arg(short, long, default_value = "unstaged")]
        scope: String,

        /// Project name override
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Scan for KEY = URL bindings in config files (env/yaml/toml/hcl/Dockerfile/shell)
    EnvUrls {
        /// Path to the repository to scan
        path: String,
    },

    /// Exercise the git-diff surface standalone: print changed files and hunks
    Diff {
        /// Path to the repository to diff
        path: String,

        /// Diff scope: unstaged, staged, all, or branch
        #[arg(short, long, default_value = "unstaged")]
        scope: String,

        /// Base ref to compare against when `--scope branch` (defaults to main)
        #[arg(long)]
        base: Option<String>,
    },

    /// Print node/edge counts for an already-indexed project
    Stats {
        /// Path to the repository the project was indexed from
        path: String,

        /// Project name override (defaults to a derivation from the path)
        #[arg(short, long)]
        name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Index {
            path,
            name,
            no_history,
        } => {
            let root = PathBuf::from(&path)
                .canonicalize()
                .with_context(|| format!("repository path not found: {path}"))?;
            let project = name.unwrap_or_else(|| project_name_from_path(&root));
            let config = load_config(&root, cli.config.as_deref())?;

            let files = discover_files(&root);
            info!(files = files.len(), project = %project, "discovered files");

            let store = Arc::new(InMemoryGraphStore::new());
            let backend = Arc::new(TreeSitterBackend::new());
            let mut driver = PipelineDriver::new(backend, store.clone()).with_config(config);
            if !no_history {
                driver = driver.with_history_analyser(Arc::new(GitHistoryAnalyser::new()));
            }

            let outcome = driver
                .run(&project, &root, &files, &CancellationToken::new())
                .await?;

            println!(
                "Indexed {} ({} files processed, {} skipped, {} nodes, {} edges)",
                project, outcome.files_processed, outcome.files_skipped, outcome.nodes_upserted, outcome.edges_inserted
            );
            print_edge_type_breakdown(store.as_ref(), &project).await?;
        }

        Commands::Reindex { path, scope, name } => {
            let root = PathBuf::from(&path)
                .canonicalize()
                .with_context(|| format!("repository path not found: {path}"))?;
            let project = name.unwrap_or_else(|| project_name_from_path(&root));
            let config = load_config(&root, cli.config.as_deref())?;

            let parsed_scope = parse_scope(&scope)?;
            let (changed, _hunks) = diff_scope(&root, &parsed_scope)?;
            let changed_files: Vec<PathBuf> = changed
                .into_iter()
                .filter(|c| c.status != ChangeStatus::Deleted)
                .filter(|c| Language::from_path(Path::new(&c.path)) != Language::Unknown)
                .map(|c| PathBuf::from(c.path))
                .collect();

            if changed_files.is_empty() {
                println!("No changed files in scope {scope:?}; nothing to do.");
                return Ok(());
            }
            info!(files = changed_files.len(), project = %project, "re-indexing changed files");

            let store = Arc::new(InMemoryGraphStore::new());
            let backend = Arc::new(TreeSitterBackend::new());
            let driver = PipelineDriver::new(backend, store.clone()).with_config(config);

            let outcome = driver
                .reindex(&project, &root, &changed_files, &CancellationToken::new())
                .await?;

            println!(
                "Re-indexed {} files in {} ({} nodes, {} edges)",
                outcome.files_processed, project, outcome.nodes_upserted, outcome.edges_inserted
            );
        }

        Commands::EnvUrls { path } => {
            let root = PathBuf::from(&path)
                .canonicalize()
                .with_context(|| format!("repository path not found: {path}"))?;
            let bindings = env_scanner::scan(&root)?;
            if bindings.is_empty() {
                println!("No KEY = URL bindings found.");
            } else {
                for binding in bindings {
                    println!("{}: {} = {}", binding.file_path, binding.key, binding.url);
                }
            }
        }

        Commands::Diff { path, scope, base } => {
            let root = PathBuf::from(&path)
                .canonicalize()
                .with_context(|| format!("repository path not found: {path}"))?;
            let effective_scope = match (scope.as_str(), &base) {
                ("branch", Some(base)) => format!("branch:{base}"),
                (other, _) => other.to_string(),
            };
            let parsed_scope = parse_scope(&effective_scope)?;
            let (changed, hunks) = diff_scope(&root, &parsed_scope)?;

            if changed.is_empty() {
                println!("No changes in scope {scope:?}.");
                return Ok(());
            }
            for file in &changed {
                match &file.old_path {
                    Some(old) => println!("{:?}\t{old} -> {}", file.status, file.path),
                    None => println!("{:?}\t{}", file.status, file.path),
                }
            }
            for hunk in &hunks {
                println!("  {}:{}-{}", hunk.path, hunk.start_line, hunk.end_line);
            }
        }

        Commands::Stats { path, name } => {
            let root = PathBuf::from(&path)
                .canonicalize()
                .with_context(|| format!("repository path not found: {path}"))?;
            let project = name.unwrap_or_else(|| project_name_from_path(&root));
            let config = load_config(&root, cli.config.as_deref())?;

            let files = discover_files(&root);
            let store = Arc::new(InMemoryGraphStore::new());
            let backend = Arc::new(TreeSitterBackend::new());
            let driver = PipelineDriver::new(backend, store.clone()).with_config(config);
            driver
                .run(&project, &root, &files, &CancellationToken::new())
                .await?;

            let nodes = store.count_nodes(&project).await?;
            let edges = store.count_edges(&project).await?;
            println!("{project}: {nodes} nodes, {edges} edges");
        }
    }

    Ok(())
}

fn load_config(root: &Path, override_path: Option<&str>) -> Result<PipelineConfig> {
    let path = match override_path {
        Some(p) => PathBuf::from(p),
        None => root.join("pipeline.toml"),
    };
    Ok(PipelineConfig::load(&path)?)
}

fn parse_scope(scope: &str) -> Result<DiffScope> {
    match scope {
        "unstaged" => Ok(DiffScope::Unstaged),
        "staged" => Ok(DiffScope::Staged),
        "all" => Ok(DiffScope::All),
        other => match other.strip_prefix("branch") {
            Some(rest) => {
                let base = rest.strip_prefix(':').filter(|s| !s.is_empty()).unwrap_or("main");
                Ok(DiffScope::Branch { base: base.to_string() })
            }
            None => anyhow::bail!("unknown diff scope {other:?}; expected unstaged, staged, all, or branch[:base]"),
        },
    }
}

/// Walks `root` respecting `.gitignore`/`.ignore`, keeping only files whose
/// extension maps to a supported [`Language`]. File discovery is treated as
/// an external collaborator by the pipeline itself; this is the CLI's own
/// minimal front door to it.
fn discover_files(root: &Path) -> Vec<PathBuf> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner:.green} discovering files... {msg:.dim}")
            .expect("invalid progress bar template"),
    );

    let mut files = Vec::new();
    let walker = ignore::WalkBuilder::new(root).hidden(false).build();
    for entry in walker.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if Language::from_path(path) == Language::Unknown {
            continue;
        }
        if let Ok(rel) = path.strip_prefix(root) {
            spinner.set_message(rel.display().to_string());
            spinner.tick();
            files.push(rel.to_path_buf());
        }
    }
    spinner.finish_and_clear();
    files
}

async fn print_edge_type_breakdown(store: &InMemoryGraphStore, project: &str) -> Result<()> {
    const EDGE_TYPES: &[EdgeType] = &[
        EdgeType::Defines,
        EdgeType::DefinesMethod,
        EdgeType::Calls,
        EdgeType::Usage,
        EdgeType::Inherits,
        EdgeType::Implements,
        EdgeType::Override,
        EdgeType::Raises,
        EdgeType::Throws,
        EdgeType::UsesType,
        EdgeType::Configures,
        EdgeType::FileChangesWith,
    ];
    for edge_type in EDGE_TYPES {
        let edges = store.find_edges_by_type(project, *edge_type).await?;
        if !edges.is_empty() {
            println!(" {}: {}", edge_type.as_str(), edges.len());
        }
    }
    let functions = store.find_nodes_by_label(project, NodeLabel::Function).await?.len();
    let methods = store.find_nodes_by_label(project, NodeLabel::Method).await?.len();
    let classes = store.find_nodes_by_label(project, NodeLabel::Class).await?.len();
    println!(" functions: {functions}, methods: {methods}, classes: {classes}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_scopes() {
        assert_eq!(parse_scope("unstaged").unwrap(), DiffScope::Unstaged);
        assert_eq!(parse_scope("staged").unwrap(), DiffScope::Staged);
        assert_eq!(parse_scope("all").unwrap(), DiffScope::All);
    }

    #[test]
    fn parses_branch_scope_with_and_without_base() {
        assert_eq!(
            parse_scope("branch").unwrap(),
            DiffScope::Branch { base: "main".to_string() }
        );
        assert_eq!(
            parse_scope("branch:develop").unwrap(),
            DiffScope::Branch { base: "develop".to_string() }
        );
    }

    #[test]
    fn rejects_unknown_scope() {
        assert!(parse_scope("bogus").is_err());
    }
}
