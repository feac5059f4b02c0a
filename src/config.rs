//! Runtime configuration for the relay service.
//!
//! Values come from command-line flags with environment fallbacks and are
//! validated into a [`RelayConfig`] before any connection is opened.

use crate::job::{
    domain::{CallbackTarget, DEFAULT_GRACE_PERIOD, DEFAULT_STALE_AFTER, JobDomainError, ReclaimPolicy},
    services::{DEFAULT_GENERATION_AUTHOR_ID, DEFAULT_HISTORY_WINDOW, LifecycleConfig, MatcherConfig},
};
use clap::Parser;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use thiserror::Error;

/// Command-line interface of the relay.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about = "Relays HTTP prompt jobs through a chat image-generation bot", long_about = None)]
pub struct RelayArgs {
    /// Discord bot token
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    pub discord_token: String,

    /// Channel prompts are posted to and results are read from
    #[arg(long, env = "CHANNEL_ID")]
    pub channel_id: u64,

    /// User id of the image-generation bot
    #[arg(long, env = "MIDJOURNEY_BOT_ID", default_value_t = DEFAULT_GENERATION_AUTHOR_ID)]
    pub generation_bot_id: u64,

    /// Webhook notified when a request names none
    #[arg(long, env = "MAKE_WEBHOOK_URL")]
    pub default_webhook_url: Option<String>,

    /// Address the HTTP server binds to
    #[arg(long, env = "BIND_ADDRESS", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind_address: IpAddr,

    /// Port the HTTP server listens on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Seconds after which an uncompleted job is discarded
    #[arg(long, env = "STALE_AFTER_SECS", default_value_t = DEFAULT_STALE_AFTER.as_secs())]
    pub stale_after_secs: u64,

    /// Seconds a completed job stays queryable
    #[arg(long, env = "GRACE_PERIOD_SECS", default_value_t = DEFAULT_GRACE_PERIOD.as_secs())]
    pub grace_period_secs: u64,

    /// Seconds between two sweeps
    #[arg(long, env = "SWEEP_INTERVAL_SECS", default_value_t = 600)]
    pub sweep_interval_secs: u64,

    /// Number of prior channel messages scanned for a job tag
    #[arg(long, env = "HISTORY_WINDOW", default_value_t = DEFAULT_HISTORY_WINDOW)]
    pub history_window: usize,

    /// Seconds before a webhook request is abandoned
    #[arg(long, env = "WEBHOOK_TIMEOUT_SECS", default_value_t = 10)]
    pub webhook_timeout_secs: u64,
}

/// Errors raised while validating configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The bot token is blank.
    #[error("discord token must not be empty")]
    EmptyToken,

    /// The channel id is zero.
    #[error("channel id must be a non-zero snowflake")]
    MissingChannel,

    /// A duration setting is zero.
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    /// The history window is zero.
    #[error("history window must be greater than zero")]
    ZeroHistoryWindow,

    /// The default webhook is malformed.
    #[error("invalid default webhook: {0}")]
    DefaultWebhook(#[source] JobDomainError),

    /// A reclaim threshold is out of range.
    #[error("invalid reclaim policy: {0}")]
    Reclaim(#[source] JobDomainError),
}

/// Validated relay configuration.
#[derive(Clone)]
pub struct RelayConfig {
    discord_token: String,
    http_addr: SocketAddr,
    sweep_interval: Duration,
    webhook_timeout: Duration,
    lifecycle: LifecycleConfig,
}

impl RelayConfig {
    /// Returns the bot token.
    #[must_use]
    pub fn discord_token(&self) -> &str {
        &self.discord_token
    }

    /// Returns the HTTP listen address.
    #[must_use]
    pub const fn http_addr(&self) -> SocketAddr {
        self.http_addr
    }

    /// Returns the delay between sweeps.
    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    /// Returns the webhook request timeout.
    #[must_use]
    pub const fn webhook_timeout(&self) -> Duration {
        self.webhook_timeout
    }

    /// Returns the lifecycle settings.
    #[must_use]
    pub const fn lifecycle(&self) -> &LifecycleConfig {
        &self.lifecycle
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("discord_token", &"<redacted>")
            .field("http_addr", &self.http_addr)
            .field("sweep_interval", &self.sweep_interval)
            .field("webhook_timeout", &self.webhook_timeout)
            .field("lifecycle", &self.lifecycle)
            .finish()
    }
}

impl TryFrom<RelayArgs> for RelayConfig {
    type Error = ConfigError;

    fn try_from(args: RelayArgs) -> Result<Self, Self::Error> {
        let discord_token = args.discord_token.trim().to_owned();
        if discord_token.is_empty() {
            return Err(ConfigError::EmptyToken);
        }
        if args.channel_id == 0 {
            return Err(ConfigError::MissingChannel);
        }
        if args.history_window == 0 {
            return Err(ConfigError::ZeroHistoryWindow);
        }
        let stale_after = non_zero_secs("stale after", args.stale_after_secs)?;
        let sweep_interval = non_zero_secs("sweep interval", args.sweep_interval_secs)?;
        let webhook_timeout = non_zero_secs("webhook timeout", args.webhook_timeout_secs)?;
        let grace_period = Duration::from_secs(args.grace_period_secs);

        let reclaim =
            ReclaimPolicy::new(stale_after, grace_period).map_err(ConfigError::Reclaim)?;
        let matcher = MatcherConfig::new(args.generation_bot_id)
            .with_history_window(args.history_window);
        let mut lifecycle = LifecycleConfig::new(args.channel_id)
            .with_matcher(matcher)
            .with_reclaim_policy(reclaim);
        if let Some(raw) = args
            .default_webhook_url
            .filter(|webhook| !webhook.trim().is_empty())
        {
            let target = CallbackTarget::new(raw).map_err(ConfigError::DefaultWebhook)?;
            lifecycle = lifecycle.with_default_callback_target(target);
        }

        Ok(Self {
            discord_token,
            http_addr: SocketAddr::new(args.bind_address, args.port),
            sweep_interval,
            webhook_timeout,
            lifecycle,
        })
    }
}

fn non_zero_secs(name: &'static str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::ZeroDuration(name));
    }
    Ok(Duration::from_secs(secs))
}
