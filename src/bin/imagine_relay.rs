//! Runs the imagine relay.
//!
//! Usage:
//!
//! ```text
//! imagine-relay --discord-token <token> --channel-id <id> [--port 3000]
//! ```
//!
//! Every flag also reads from its environment variable (`DISCORD_TOKEN`,
//! `CHANNEL_ID`, `MIDJOURNEY_BOT_ID`, `MAKE_WEBHOOK_URL`, `PORT`, ...). The
//! process serves the HTTP surface, watches the configured channel through the
//! Discord gateway and sweeps expired jobs until SIGTERM or Ctrl+C.

use clap::Parser;
use eyre::{Result, WrapErr};
use imagine_relay::config::{RelayArgs, RelayConfig};
use imagine_relay::job::adapters::discord::{CompletionEventHandler, SerenityChatTransport};
use imagine_relay::job::adapters::http::{self, HttpState};
use imagine_relay::job::adapters::memory::InMemoryJobStore;
use imagine_relay::job::adapters::webhook::ReqwestWebhookNotifier;
use imagine_relay::job::services::{JobLifecycleService, spawn_reaper};
use mockable::DefaultClock;
use serenity::http::Http;
use serenity::model::gateway::GatewayIntents;
use serenity::prelude::Client;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imagine_relay=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = RelayConfig::try_from(RelayArgs::parse()).wrap_err("invalid configuration")?;
    info!(?config, "starting imagine relay");

    let http_client = Arc::new(Http::new(config.discord_token()));
    let notifier = ReqwestWebhookNotifier::new(config.webhook_timeout())
        .wrap_err("failed to build webhook client")?;
    let service = Arc::new(JobLifecycleService::new(
        Arc::new(InMemoryJobStore::new()),
        Arc::new(SerenityChatTransport::new(http_client)),
        Arc::new(notifier),
        Arc::new(DefaultClock),
        config.lifecycle().clone(),
    ));

    let shutdown = CancellationToken::new();
    let reaper = spawn_reaper(
        Arc::clone(&service),
        config.sweep_interval(),
        shutdown.clone(),
    );

    let http_state = HttpState::new(Arc::clone(&service));
    let http_shutdown = shutdown.clone();
    let http_addr = config.http_addr();
    let server = tokio::spawn(async move {
        if let Err(err) = http::serve(http_state, http_addr, http_shutdown.clone()).await {
            error!(error = %err, "HTTP server stopped");
            http_shutdown.cancel();
        }
    });

    let intents =
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT;
    let mut client = Client::builder(config.discord_token(), intents)
        .event_handler(CompletionEventHandler::new(Arc::clone(&service)))
        .await
        .wrap_err("failed to create Discord client")?;

    let shard_manager = Arc::clone(&client.shard_manager);
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        tokio::select! {
            () = wait_for_signal() => info!("shutdown signal received"),
            () = signal_shutdown.cancelled() => {}
        }
        signal_shutdown.cancel();
        shard_manager.shutdown_all().await;
    });

    info!("connecting to the Discord gateway");
    let gateway = client.start().await;
    shutdown.cancel();

    if let Err(err) = server.await {
        warn!(error = %err, "HTTP server task failed");
    }
    if let Err(err) = reaper.await {
        warn!(error = %err, "job reaper task failed");
    }
    gateway.wrap_err("Discord client error")?;
    info!("imagine relay stopped");
    Ok(())
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                warn!(error = %err, "SIGTERM handler unavailable");
                if let Err(ctrl_c_err) = tokio::signal::ctrl_c().await {
                    warn!(error = %ctrl_c_err, "Ctrl+C handler unavailable");
                    std::future::pending::<()>().await;
                }
            }
        }
    }
    #[cfg(not(unix))]
    {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    }
}
