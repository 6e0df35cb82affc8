#[tokio::main]
async fn main() {
    coinpulse::cli::run().await;
}
