pub mod cli;
pub mod render;
pub mod rest;
pub mod wallet;

use std::ffi::OsString;
use std::io::Write;

use anyhow::{Context, anyhow};
use clap::Parser;
use todolist_core::config::{self, Config};
use todolist_core::{Contract, TaskListView, ViewOptions};
use tracing::{debug, info};

use crate::cli::Command;
use crate::render::Renderer;
use crate::rest::RestChainReader;
use crate::wallet::AptosCliWallet;

#[tracing::instrument(skip_all)]
pub fn run(raw_args: Vec<OsString>) -> anyhow::Result<()> {
    let pre = cli::preprocess_args(&raw_args)?;
    let cli = cli::GlobalCli::parse_from(pre.cleaned_args);

    cli::init_tracing(cli.verbose, cli.quiet)?;

    info!(
        verbose = cli.verbose,
        quiet = cli.quiet,
        "starting todolist CLI"
    );
    debug!(?pre.rc_overrides, "preprocessed rc overrides");

    let mut cfg = Config::load(cli.todolistrc.as_deref())?;
    cfg.apply_overrides(
        pre.rc_overrides
            .into_iter()
            .chain(cli.rc_overrides.into_iter().map(|kv| (kv.key, kv.value))),
    );

    let command = cli.command.unwrap_or(Command::Show);
    let renderer = Renderer::new(&cfg)?;

    if command == Command::Config {
        let mut out = std::io::stdout().lock();
        for (key, value) in cfg.iter() {
            writeln!(out, "{key} = {value}")?;
        }
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(execute(&cfg, &renderer, command))?;

    info!("done");
    Ok(())
}

async fn execute(cfg: &Config, renderer: &Renderer, command: Command) -> anyhow::Result<()> {
    let module_address = cfg
        .get("module.address")
        .unwrap_or_else(|| config::DEFAULT_MODULE_ADDRESS.to_string());
    let reader = RestChainReader::new(cfg)?;
    let wallet = AptosCliWallet::connect(cfg).await;

    let view = TaskListView::new(
        wallet,
        reader,
        Contract::new(module_address),
        ViewOptions::from_config(cfg),
    );
    view.sync_account().await;

    match command {
        Command::Show | Command::Config => {}
        Command::CreateList => view.create_list().await,
        Command::Add { text } => {
            view.set_draft(text.join(" "));
            view.create_task().await;
        }
        Command::Done { id } => view.complete_task(id).await,
    }

    let state = view.snapshot();
    renderer.print_view(std::io::stdout().lock(), &state)?;

    match state.error {
        Some(message) => Err(anyhow!(message)),
        None => Ok(()),
    }
}
