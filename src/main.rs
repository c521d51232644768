//! rolodex — contact extraction & reconciliation engine.
//! Messaging adapters post raw input; an LLM extracts contact records,
//! fuzzy matches go through a yes/no confirmation before any write.

use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rolodex::confirm::{MemoryPendingStore, Orchestrator};
use rolodex::{ai, api, store, AppState, SharedDB};

#[derive(Parser)]
#[command(name = "rolodex", version, about = "Contact extraction and reconciliation engine")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "4151", env = "ROLODEX_PORT")]
    port: u16,

    /// SQLite database path
    #[arg(short, long, default_value = "rolodex.db", env = "ROLODEX_DB")]
    db: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let cdb = store::ContactDB::open(&args.db).expect("failed to open database");
    let shared: SharedDB = Arc::new(cdb);

    let ai_cfg = ai::AiConfig::from_env();
    let ai_status = match &ai_cfg {
        Some(cfg) => format!(
            "llm={}, transcribe={}, vision={}",
            cfg.llm_model, cfg.transcribe_model, cfg.vision_model
        ),
        None => "disabled".into(),
    };

    let api_key = std::env::var("ROLODEX_API_KEY").ok();
    let auth_status = if api_key.is_some() { "enabled" } else { "disabled" };

    let orchestrator = Arc::new(Orchestrator::new(
        shared.clone(),
        Arc::new(MemoryPendingStore::default()),
    ));

    let state = AppState {
        db: shared,
        ai: ai_cfg,
        api_key,
        orchestrator,
    };
    let app = api::router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    info!(addr = %addr, db = %args.db, ai = %ai_status, auth = %auth_status, "rolodex up");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind port");
    axum::serve(listener, app).await.expect("server error");
}
