// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use docsync::{
    catalog::Catalog,
    config::{save_config, SyncConfig},
    path::{default_catalog_path, default_config_path},
    sync::{GitBinary, Orchestrator, SyncOutcome},
};

use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use inquire::{MultiSelect, Text};
use std::{path::PathBuf, process::exit};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "docsync [options] <command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    /// Path to repository catalog.
    #[arg(
        long,
        global = true,
        value_name = "path",
        default_value_os_t = default_catalog_path()
    )]
    pub catalog: PathBuf,

    /// Path to sync configuration.
    #[arg(
        long,
        global = true,
        value_name = "path",
        default_value_os_t = default_config_path()
    )]
    pub config: PathBuf,

    /// Version-control client to clone and pull with.
    #[arg(long, global = true, value_name = "program", default_value = "git")]
    pub git: String,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<()> {
        match &self.command {
            Command::List(opts) => run_list(&self, opts),
            Command::Select(opts) => run_select(&self, opts),
            Command::Sync => run_sync(&self),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// List repositories in catalog, and mark the selected ones.
    #[command(override_usage = "docsync list [options]")]
    List(ListOptions),

    /// Update selected repositories and docs base path.
    #[command(override_usage = "docsync select [options] [<repo_name>]...")]
    Select(SelectOptions),

    /// Clone or pull every selected repository into docs base path.
    #[command(override_usage = "docsync sync [options]")]
    Sync,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ListOptions {
    /// List only selected repositories.
    #[arg(short, long)]
    pub selected: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct SelectOptions {
    /// Repositories to select. Prompts interactively if none are given.
    #[arg(value_name = "repo_name")]
    pub names: Vec<String>,

    /// Base directory to mirror repositories into.
    #[arg(short, long, value_name = "path")]
    pub docs_base: Option<String>,

    /// Add to current selection instead of replacing it.
    #[arg(short, long, group = "mode", requires = "names")]
    pub add: bool,

    /// Remove from current selection instead of replacing it.
    #[arg(short, long, group = "mode", requires = "names")]
    pub remove: bool,
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_timer(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run() -> Result<()> {
    Cli::parse().run()
}

fn run_list(cli: &Cli, opts: &ListOptions) -> Result<()> {
    let catalog = Catalog::load_or_empty(&cli.catalog)?;
    let config = SyncConfig::load_or_default(&cli.config);

    if config.docs_base.is_empty() {
        println!("docs base: <not set>");
    } else {
        println!("docs base: {}", config.docs_base);
    }

    let width = catalog
        .names()
        .chain(config.selected_repos.iter().map(String::as_str))
        .map(str::len)
        .max()
        .unwrap_or_default();

    for entry in catalog.iter() {
        let selected = config.is_selected(&entry.name);
        if opts.selected && !selected {
            continue;
        }

        let mark = if selected { "x" } else { " " };
        println!("[{mark}] {:<width$}  {}", entry.name, entry.repo_url);
    }

    // INVARIANT: Selected names missing from catalog still deserve a mention.
    for name in config.selected_repos.iter().filter(|name| !catalog.contains(name)) {
        println!("[?] {name:<width$}  <not in catalog>");
    }

    Ok(())
}

fn run_select(cli: &Cli, opts: &SelectOptions) -> Result<()> {
    let catalog = Catalog::load_or_empty(&cli.catalog)?;
    let mut config = SyncConfig::load_or_default(&cli.config);

    if opts.names.is_empty() {
        config = prompt_selection(&catalog, config, opts.docs_base.is_none())?;
    } else {
        for name in opts.names.iter().filter(|name| !catalog.contains(name)) {
            warn!("{name} is not listed in catalog {:?}", cli.catalog.display());
        }

        let names = opts.names.iter().cloned();
        if opts.add {
            config.selected_repos.extend(names);
        } else if opts.remove {
            for name in names {
                config.selected_repos.remove(&name);
            }
        } else {
            config.selected_repos = names.collect();
        }
    }

    if let Some(docs_base) = &opts.docs_base {
        config.docs_base = docs_base.clone();
    }

    save_config(&cli.config, &config)?;
    info!("configuration updated successfully");

    Ok(())
}

fn prompt_selection(
    catalog: &Catalog,
    config: SyncConfig,
    ask_docs_base: bool,
) -> Result<SyncConfig> {
    let docs_base = if ask_docs_base {
        let mut prompt = Text::new("docs base path");
        if !config.docs_base.is_empty() {
            prompt = prompt.with_default(config.docs_base.as_str());
        }
        prompt.prompt()?
    } else {
        config.docs_base.clone()
    };

    let options = catalog.names().map(ToString::to_string).collect::<Vec<_>>();
    let defaults = options
        .iter()
        .enumerate()
        .filter(|(_, name)| config.is_selected(name))
        .map(|(idx, _)| idx)
        .collect::<Vec<_>>();

    // INVARIANT: Only catalog entries can be picked, so stale names get dropped.
    let selected_repos = MultiSelect::new("select repositories", options)
        .with_default(defaults.as_slice())
        .prompt()?;

    Ok(SyncConfig::new(docs_base, selected_repos))
}

fn run_sync(cli: &Cli) -> Result<()> {
    let catalog = Catalog::load_or_empty(&cli.catalog)?;
    let config = SyncConfig::load_or_default(&cli.config);

    let bar = ProgressBar::new(0);
    let style = ProgressStyle::with_template(
        "{elapsed_precise:.green}  {msg:<50}  [{wide_bar:.yellow/blue}]",
    )?
    .progress_chars("-Cco.");
    bar.set_style(style);

    let orchestrator = Orchestrator::new(GitBinary::new(&cli.git)).with_progress(bar);
    for outcome in orchestrator.sync_config(&config, &catalog) {
        match &outcome {
            SyncOutcome::Repo(repo) if repo.result.is_ok() => info!("{outcome}"),
            SyncOutcome::Repo(_) => error!("{outcome}"),
            _ => warn!("{outcome}"),
        }
    }

    Ok(())
}
