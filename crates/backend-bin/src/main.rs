use anyhow::Context;
use clap::{Parser, Subcommand};
use start_backend_lib::{
    auth::PasswordPolicy,
    config::{Settings, DEFAULT_CONFIG_FILE},
    handlers, AppState,
};
use std::io::{self, BufRead};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use zeroize::Zeroize;

/// How often idle rate limit buckets are swept
const PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Parser, Debug)]
#[command(name = "start-server", version, about = "Login service with rate limiting and auditing")]
struct Cli {
    /// TOML configuration file
    #[arg(long, short, env = "START_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Read a password from stdin and print its scrypt hash
    HashPassword,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load_from(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;

    init_tracing(&settings);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(settings).await,
        Command::HashPassword => hash_password(&settings),
    }
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if settings.log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn serve(settings: Settings) -> anyhow::Result<()> {
    let addr = settings.bind_addr();
    let state = Arc::new(AppState::new(settings)?);

    // Sweep idle rate limit buckets in the background
    let limiter = state.login_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        loop {
            interval.tick().await;
            let removed = limiter.purge_expired();
            if removed > 0 {
                debug!(removed, "Purged expired rate limit buckets");
            }
        }
    });

    let app = handlers::create_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("listening on {addr}");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}

fn hash_password(settings: &Settings) -> anyhow::Result<()> {
    let mut password = String::new();
    io::stdin()
        .lock()
        .read_line(&mut password)
        .context("reading password from stdin")?;
    let trimmed_len = password.trim_end_matches(['\r', '\n']).len();
    password.truncate(trimmed_len);

    let policy: PasswordPolicy = settings.password_policy();
    if let Err(e) = policy.validate(Some(&password)) {
        password.zeroize();
        anyhow::bail!(e);
    }

    let hash = settings.password_encoder()?.hash_secure(&mut password)?;
    println!("{hash}");
    Ok(())
}
