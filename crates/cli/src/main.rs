use clap::{Args, Parser, Subcommand, ValueEnum};
use codeviz_server::Server;
use codeviz_storage_ephemeral::EphemeralStore;
use codeviz_storage_firebase::{FirebaseConfig, FirebaseStore};
use color_eyre::eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_TOKEN_ENV: &str = "CODEVIZ_FIREBASE_TOKEN";

#[derive(Clone, Copy, Debug, ValueEnum, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum Backend {
    Ephemeral,
    Firebase,
}

#[derive(Parser, Debug)]
#[command(name = "codeviz", version, about = "codeviz backend server")]
struct Cli {
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[arg(long, global = true)]
    config: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve HTTP, GraphQL and WebSocket endpoints
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[arg(long, value_enum)]
    backend: Option<Backend>,
    #[arg(long, help = "Listen address [default: 127.0.0.1:8000]")]
    addr: Option<String>,
    #[arg(long = "database-url", value_name = "URL")]
    database_url: Option<String>,
    #[arg(
        long = "auth-token-env",
        value_name = "VAR",
        help = "Environment variable holding the database auth token"
    )]
    auth_token_env: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct ServeSection {
    backend: Option<Backend>,
    addr: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct FirebaseSection {
    database_url: Option<String>,
    auth_token_env: Option<String>,
    timeout_ms: Option<u64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct AppConfig {
    #[serde(default)]
    serve: Option<ServeSection>,
    #[serde(default)]
    firebase: Option<FirebaseSection>,
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    let cfg = load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Serve(args) => serve(args, &cfg).await?,
    }
    Ok(())
}

async fn serve(args: ServeArgs, cfg: &AppConfig) -> Result<()> {
    let serve_cfg = cfg.serve.clone().unwrap_or_default();
    let backend = args
        .backend
        .or(serve_cfg.backend)
        .unwrap_or(Backend::Ephemeral);
    let addr = args
        .addr
        .or(serve_cfg.addr)
        .unwrap_or_else(|| DEFAULT_ADDR.to_string());
    info!(?backend, %addr, "starting server");

    let server = match backend {
        Backend::Ephemeral => Server::new(EphemeralStore::new()),
        Backend::Firebase => {
            let fb_cfg = firebase_config(&args.database_url, &args.auth_token_env, cfg)?;
            let store = FirebaseStore::new(fb_cfg)
                .map_err(|e| eyre!("failed to init firebase store: {}", e))?;
            Server::new(store)
        }
    };
    if let Err(e) = server.run_http(&addr).await {
        tracing::error!(error = %e, "http server exited with error");
        return Err(eyre!("http server failed: {}", e));
    }
    Ok(())
}

fn firebase_config(
    database_url: &Option<String>,
    auth_token_env: &Option<String>,
    cfg: &AppConfig,
) -> Result<FirebaseConfig> {
    let section = cfg.firebase.clone().unwrap_or_default();
    let url = database_url
        .clone()
        .or(section.database_url)
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| {
            eyre!("firebase backend requires a database url (--database-url or firebase.database_url)")
        })?;
    let token_env = auth_token_env
        .clone()
        .or(section.auth_token_env)
        .unwrap_or_else(|| DEFAULT_TOKEN_ENV.to_string());
    let auth_token = std::env::var(&token_env)
        .ok()
        .filter(|t| !t.trim().is_empty());
    if auth_token.is_none() {
        tracing::warn!(env = %token_env, "no database auth token set; requests go unauthenticated");
    }
    let mut fb = FirebaseConfig::new(url);
    fb.auth_token = auth_token;
    if let Some(ms) = section.timeout_ms {
        fb.timeout_ms = ms;
    }
    Ok(fb)
}

fn load_config(path: Option<&str>) -> Result<AppConfig> {
    let mut builder = config::Config::builder()
        .add_source(config::Environment::with_prefix("CODEVIZ").separator("__"));

    if let Some(raw) = path {
        let expanded = expand_path(raw);
        if !expanded.exists() {
            tracing::warn!(
                path = expanded.display().to_string(),
                "config file not found; continuing with defaults and env overrides"
            );
        }
        builder = builder.add_source(config::File::from(expanded).required(false));
    }

    let cfg = builder
        .build()
        .map_err(|e| eyre!("config load error: {}", e))?;
    cfg.try_deserialize()
        .map_err(|e| eyre!("config parse error: {}", e))
}

fn expand_path(input: &str) -> PathBuf {
    if input == "~" {
        return home_dir().unwrap_or_else(|| PathBuf::from(input));
    }
    if let Some(rest) = input.strip_prefix("~/") {
        return home_dir()
            .map(|mut base| {
                base.push(rest);
                base
            })
            .unwrap_or_else(|| PathBuf::from(rest));
    }
    PathBuf::from(input)
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("USERPROFILE").map(PathBuf::from))
}
