mod cli;
mod render;

use std::sync::Arc;

use clap::Parser;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use uuid::Uuid;

use herald_core::{
    Dropdown, HistoryPage, HttpRemote, MarkReadOutcome, NotificationStore, Panel, Poller,
    StoreConfig, StoreEvent,
};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "herald=info,herald_core=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut remote = HttpRemote::new(&cli.server, cli.user);
    if let Some(token) = cli.token {
        remote = remote.with_token(token);
    }
    let store = NotificationStore::new(Arc::new(remote), StoreConfig::from_env());

    let result = match cli.command.unwrap_or(Commands::Watch) {
        Commands::Watch => watch(store.clone()).await,
        Commands::List { filter, sort } => {
            let mut panel = Panel::new(store.clone());
            panel.set_filter(filter.into());
            panel.set_sort(sort.into());
            panel.refresh().await?;
            print!("{}", render::panel(&panel.snapshot().await));
            Ok(())
        }
        Commands::History { search, kind, pages } => {
            let mut history = HistoryPage::new(store.clone());
            history.load_first().await?;
            for _ in 1..pages {
                if history.load_more().await?.is_none() {
                    break;
                }
            }
            if let Some(text) = search {
                history.set_search(text);
            }
            history.set_kind(kind.map(Into::into));
            print!("{}", render::history(&history.snapshot().await));
            Ok(())
        }
        Commands::Read { id } => {
            load_until_found(&store, id).await?;
            match store.mark_as_read(id).await? {
                MarkReadOutcome::Marked => println!("Marked {} read", id),
                MarkReadOutcome::AlreadyRead => println!("{} was already read", id),
            }
            Ok(())
        }
        Commands::ReadAll => {
            store.refresh().await?;
            let outcome = store.mark_all_as_read().await?;
            println!("Marked {} read", outcome.marked.len());
            if !outcome.failed.is_empty() {
                println!("{} could not be marked and stay unread:", outcome.failed.len());
                for id in &outcome.failed {
                    println!("  {}", id);
                }
            }
            Ok(())
        }
        Commands::Delete { id } => {
            load_until_found(&store, id).await?;
            store.delete_notification(id).await?;
            println!("Deleted {}", id);
            Ok(())
        }
    };

    store.shutdown();
    result
}

/// Refresh, then page back until `id` is loaded. A missing id surfaces as
/// `NotFound` from the mutation itself.
async fn load_until_found(store: &NotificationStore, id: Uuid) -> anyhow::Result<()> {
    store.refresh().await?;
    if !store.load_until(id).await? {
        warn!("{} is not among the {} loaded notifications", id, store.notifications().await.len());
    }
    Ok(())
}

/// Keep page 1 fresh and redraw the dropdown after every change until Ctrl+C.
async fn watch(store: NotificationStore) -> anyhow::Result<()> {
    let dropdown = Dropdown::new(store.clone());
    let poller = Poller::from_config(store.clone());
    let mut events = store.subscribe();

    poller.start();
    info!("Watching notifications, Ctrl+C to stop");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
            event = events.recv() => match event {
                Ok(StoreEvent::FetchStarted { .. }) => {}
                Ok(StoreEvent::Closed) => break,
                Ok(event) => {
                    if event.is_failure() {
                        warn!("{}", event);
                    }
                    println!("{}", render::dropdown(&dropdown.snapshot().await));
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!("Missed {} store events, redrawing", missed);
                    println!("{}", render::dropdown(&dropdown.snapshot().await));
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    poller.stop();
    Ok(())
}
