//! Stdio driver for the query pipeline.
//!
//! Reads one message per line from stdin, either `user_id<TAB>text` or just
//! `text` (user `stdin`), handles each on its own task, and writes one JSON
//! reply per line to stdout. Messages dropped by admission produce no reply.
//!
//! All tracing output goes to stderr so that stdout stays a clean
//! newline-delimited JSON channel.
//!
//! Usage: `guru [config.toml]`

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use guru::query::HELP_TEXT;
use guru::{GuruConfig, Input, WebCoordinator, parse_input};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;

const DEFAULT_USER: &str = "stdin";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => GuruConfig::load(&path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => GuruConfig::default(),
    };

    let coordinator = Arc::new(
        WebCoordinator::from_config(&config).context("failed to build query pipeline")?,
    );
    let config = Arc::new(config);
    tracing::info!(backend = %config.search.backend, "guru ready");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut requests = JoinSet::new();

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        let coordinator = Arc::clone(&coordinator);
        let config = Arc::clone(&config);
        requests.spawn(async move {
            handle_line(&coordinator, &config, &line).await;
        });
        // Reap finished tasks so the set doesn't grow with uptime.
        while requests.try_join_next().is_some() {}
    }

    while requests.join_next().await.is_some() {}
    coordinator.shutdown();
    tracing::info!("guru shut down cleanly");
    Ok(())
}

async fn handle_line(coordinator: &WebCoordinator, config: &GuruConfig, line: &str) {
    let (user, text) = match line.split_once('\t') {
        Some((user, text)) if !user.trim().is_empty() => (user.trim(), text),
        _ => (DEFAULT_USER, line),
    };

    let reply = match parse_input(text, config.query.max_len) {
        Ok(Input::Help) => HELP_TEXT.to_owned(),
        Ok(Input::UnknownCommand(command)) => {
            tracing::warn!(user, command = %command, "unknown command");
            return;
        }
        Err(e) => {
            tracing::error!(user, error = %e, "rejected query");
            e.to_string()
        }
        Ok(Input::Query(query)) => {
            tracing::info!(user, query = %query, "received query");
            match coordinator
                .reply(user, &query, config.resolver.deadline())
                .await
            {
                Some(reply) => reply,
                None => return,
            }
        }
    };

    let envelope = serde_json::json!({
        "user": user,
        "query": text.trim(),
        "reply": reply,
    });
    println!("{envelope}");
}
