use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use dimagram_cdn::{BunnyPurger, CacheInvalidator, NoopInvalidator};
use dimagram_ingest::Ingestor;
use dimagram_publish::{AlbumLedger, AlbumSnapshot, PointerTarget, Publisher, Transition, TransitionReport};
use dimagram_remote::{RemoteStore, SftpRemote};
use dimagram_server::{AppState, DimagramServer};
use dimagram_store::FileCollectionStore;
use dimagram_types::AlbumItem;

use crate::cli::*;
use crate::config::AppConfig;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;
    match cli.command {
        Command::Serve(args) => cmd_serve(config, args).await,
        Command::Publish => cmd_transition(&config, Transition::Publish, cli.format).await,
        Command::Unpublish => cmd_transition(&config, Transition::Unpublish, cli.format).await,
        Command::Status(args) => cmd_status(&config, args, cli.format).await,
    }
}

fn ledger(config: &AppConfig) -> Arc<AlbumLedger> {
    let store = FileCollectionStore::new(&config.data_dir);
    Arc::new(AlbumLedger::new(Arc::new(store)))
}

fn remote(config: &AppConfig) -> anyhow::Result<Arc<dyn RemoteStore>> {
    let sftp = SftpRemote::new(config.remote.clone()).context("remote store is not usable")?;
    Ok(Arc::new(sftp))
}

fn invalidator(config: &AppConfig) -> anyhow::Result<Arc<dyn CacheInvalidator>> {
    if !config.cdn.has_api_key() {
        tracing::warn!("no CDN API key configured, cache purges are skipped");
        return Ok(Arc::new(NoopInvalidator));
    }
    Ok(Arc::new(BunnyPurger::new(&config.cdn)?))
}

fn publisher(config: &AppConfig, remote: Arc<dyn RemoteStore>) -> anyhow::Result<Publisher> {
    let path = &config.remote.pointer_path;
    let pointer = PointerTarget::new(path.clone(), config.cdn.public_url(path));
    Ok(Publisher::new(ledger(config), remote, invalidator(config)?, pointer))
}

async fn cmd_serve(mut config: AppConfig, args: ServeArgs) -> anyhow::Result<()> {
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind;
    }
    let remote = remote(&config)?;
    let publisher = publisher(&config, remote.clone())?;
    let ingestor = Ingestor::new(
        config.ingest.clone(),
        remote,
        config.remote.content_dir.clone(),
        config.cdn.clone(),
    );
    let state = AppState::new(Arc::new(publisher), Arc::new(ingestor));

    println!(
        "{} dimagram server on {} (data: {})",
        "✓".green().bold(),
        config.server.bind_addr.to_string().bold(),
        config.data_dir.display()
    );
    DimagramServer::new(config.server, state).serve().await?;
    Ok(())
}

async fn cmd_transition(config: &AppConfig, transition: Transition, format: OutputFormat) -> anyhow::Result<()> {
    let publisher = publisher(config, remote(config)?)?;
    let report = match transition {
        Transition::Publish => publisher.publish().await.context("publish failed")?,
        Transition::Unpublish => publisher.unpublish().await.context("unpublish failed")?,
    };
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&report),
    }
    Ok(())
}

fn print_report(report: &TransitionReport) {
    let verb = match report.transition {
        Transition::Publish => "Published",
        Transition::Unpublish => "Unpublished",
    };
    println!("{} {} item {}", "✓".green().bold(), verb, report.item.id.to_string().yellow());
    match &report.pointer {
        Some(live) => println!("  Live: {} {}", live.id.to_string().yellow(), live.url.dimmed()),
        None => println!("  Live: {} (remote pointer left in place)", "none".dimmed()),
    }
    for advisory in &report.advisories {
        println!("  {} {}", "warning:".yellow().bold(), advisory.message);
    }
}

async fn cmd_status(config: &AppConfig, args: StatusArgs, format: OutputFormat) -> anyhow::Result<()> {
    // Raw state first, so a damaged data directory can still be looked at.
    let snapshot = ledger(config).inspect().await?;
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_status(&snapshot, args.limit);
    }
    if let Err(problem) = snapshot.validate() {
        if format == OutputFormat::Text {
            println!("{} {}", "problem:".red().bold(), problem);
        }
        return Err(problem).context("album data needs repair before the next publish");
    }
    Ok(())
}

fn print_status(snapshot: &AlbumSnapshot, limit: usize) {
    match snapshot.live() {
        Some(live) => println!("Live: {}", describe(live)),
        None => println!("Live: {}", "nothing published yet".dimmed()),
    }
    println!("Archive: {} items", snapshot.archive.len().to_string().bold());
    println!("Queue: {} items", snapshot.queue.len().to_string().bold());
    for (position, item) in snapshot.queue.iter().take(limit).enumerate() {
        println!("  {}. {}", position + 1, describe(item));
    }
    if snapshot.queue.len() > limit {
        println!("  {}", format!("... {} more", snapshot.queue.len() - limit).dimmed());
    }
}

fn describe(item: &AlbumItem) -> String {
    let mut line = format!("{} {}", item.id.to_string().yellow(), item.url);
    if let Some(description) = &item.description {
        line.push_str(&format!(" {}", format!("({description})").dimmed()));
    }
    line
}
