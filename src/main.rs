use advisor_crm::admin::routes::create_router;
use advisor_crm::admin::AdminState;
use advisor_crm::store::StoreClient;
use advisor_crm::types::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // One collector for both stacks: library log records are bridged into
    // tracing, and the HTTP trace layer speaks tracing natively.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env().map_err(std::io::Error::other)?;
    let store = StoreClient::new(&config)?;

    let bind_addr = config.bind_addr.clone();
    let state = AdminState { store, config };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("admin API listening on {}", bind_addr);
    axum::serve(listener, router).await?;
    Ok(())
}
