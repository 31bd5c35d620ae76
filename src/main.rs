use anyhow::{Context, Result};
use doc_registry::config::RegistryConfig;
use doc_registry::logging::init_tracing;
use doc_registry::storage::JsonFileStore;
use doc_registry::web::build_router;
use doc_registry::DocumentRegistry;
use tracing::info;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = RegistryConfig::from_env()?;
    init_tracing(config.log_level_or("info"));

    let store = JsonFileStore::new(&config.store_path);
    let registry = DocumentRegistry::new(store, config.registry_options());
    let app = build_router(registry);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!(
        store = %config.store_path.display(),
        update_mode = %config.update_mode,
        link_policy = %config.link_policy,
        "document admin panel starting"
    );
    println!("🚀 Document admin panel running on http://{}", config.bind_addr);
    println!("📋 Endpoints:");
    println!("   GET    /                - Admin document list");
    println!("   GET    /documents       - All documents (JSON)");
    println!("   POST   /documents       - Add a document");
    println!("   GET    /documents/:id   - One document");
    println!("   PUT    /documents/:id   - Edit a document");
    println!("   DELETE /documents/:id   - Delete a document");
    println!("   GET    /export          - Download a backup");

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;
    Ok(())
}
