#[tokio::main]
async fn main() {
    if let Err(e) = wellness_lib::run().await {
        tracing::error!("{e}");
        eprintln!("wellness-assistant: {e}");
        std::process::exit(1);
    }
}
