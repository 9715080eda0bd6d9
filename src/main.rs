#[tokio::main]
async fn main() {
    if let Err(e) = inbox_dashboard::run().await {
        eprintln!("inbox-dashboard failed: {}", e);
        std::process::exit(1);
    }
}
