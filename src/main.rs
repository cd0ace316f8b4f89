use referral_ledger::engine::{ClaimEngine, MembershipGate, ReferralRegistry};
use referral_ledger::wallet::TracingWallet;
use referral_ledger::{api, config::Config, db::init_db, Repository, Wallet};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let pool = match init_db(&config.database_path).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    // Wire the engines around one repository. The tracing wallet stands in
    // until a real wallet service is configured.
    let repo = Arc::new(Repository::new(pool));
    let wallet: Arc<dyn Wallet> = Arc::new(TracingWallet::new());
    let registry = Arc::new(ReferralRegistry::new(
        repo.clone(),
        wallet.clone(),
        config.terms_version.clone(),
    ));
    let claim_engine = Arc::new(ClaimEngine::new(repo.clone(), wallet));
    let membership = Arc::new(MembershipGate::new(repo.clone()));

    let app = api::create_router(api::AppState::new(repo, registry, claim_engine, membership));

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!(terms_version = %config.terms_version, "listening on {}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
