use tokio::signal;
use tracing::warn;

/// 阻塞等待 Ctrl+C，用于 main 中与 HTTP 服务并行 select
pub async fn listen_for_shutdown() {
    signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
    warn!("Shutdown signal received, stopping attendance server...");
}
