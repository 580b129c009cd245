use clap::Parser;
use dotenvy::dotenv;
use guia_lafaiete::auth::SessionContext;
use guia_lafaiete::backend::{MemoryBackend, RestBackend, SharedBackend};
use guia_lafaiete::config::{self, AppConfig, BackendConfig};
use guia_lafaiete::demo;
use guia_lafaiete::errors::Result;
use guia_lafaiete::pages::{self, PageContext, Visit};
use guia_lafaiete::query::QueryClient;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Redirects followed before giving up on a path.
const MAX_REDIRECTS: usize = 5;

/// Renders one page of the Guia Lafaiete directory.
#[derive(Debug, Parser)]
#[command(name = "guia-lafaiete", version, about)]
struct Args {
    /// Path to open, e.g. `/eventos` or `/busca?q=feira`
    #[arg(default_value = "/")]
    path: String,

    /// Use the built-in sample data instead of the hosted backend
    #[arg(long)]
    demo: bool,

    /// Sign in with this email before opening the path
    #[arg(long, requires = "password")]
    email: Option<String>,

    #[arg(long, requires = "email")]
    password: Option<String>,

    /// Settings file (defaults to ./guia.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn build_backend(args: &Args, app_config: &AppConfig) -> Result<SharedBackend> {
    if args.demo {
        let backend = MemoryBackend::new();
        let accounts = demo::seed(&backend, chrono::Utc::now());
        info!(
            "Using in-memory demo backend (admin: {}, user: {})",
            accounts.admin_id, accounts.user_id
        );
        return Ok(Arc::new(backend));
    }
    let backend_config = BackendConfig::from_env()
        .inspect_err(|e| error!("Backend configuration missing: {e}"))?;
    info!("Using backend at {}", backend_config.url);
    Ok(Arc::new(RestBackend::new(backend_config, app_config.http.timeout())?))
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 2. Load .env file (non-fatal, env vars can be set externally)
    dotenv().ok();

    let args = Args::parse();

    // 3. Load application settings
    let app_config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => config::load_default_config()?,
    };

    // 4. Build the backend; the hosted one fails fast without configuration
    let backend = build_backend(&args, &app_config)?;

    // 5. Query client and session, re-hydrated from storage
    let client = Arc::new(QueryClient::new(Arc::clone(&backend), app_config.query.clone()));
    let session = SessionContext::new(backend, app_config.auth.clone());
    session.restore().await;

    if let (Some(email), Some(password)) = (&args.email, &args.password) {
        session
            .sign_in(email, password)
            .await
            .inspect_err(|e| error!("Sign-in failed: {e}"))?;
    }

    // 6. Open the path, following redirects
    let ctx = PageContext { client, session };
    let mut path = args.path.clone();
    for _ in 0..MAX_REDIRECTS {
        match pages::open(&ctx, &path).await {
            Visit::Page(page) => {
                println!("{page}");
                return Ok(());
            }
            Visit::Redirect(to) => {
                println!("→ {to}");
                path = to.path;
            }
        }
    }
    warn!("Too many redirects opening {}", args.path);
    Ok(())
}
