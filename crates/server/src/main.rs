use anyhow::Context;
use deployment::Deployment;
use server::{DeploymentImpl, routes};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    utils::logging::init();

    let deployment = DeploymentImpl::new().await?;
    let addr = deployment.config().read().await.bind_address();

    let app = routes::router(deployment)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server running on http://{addr}");

    axum::serve(listener, app).await.context("server crashed")?;
    Ok(())
}
