use crate::services::Stores;
use crate::utils::get_data_dir;

/// Print the state of the local persisted stores
pub async fn run() {
    println!("📊 coinpulse local data status\n");

    let data_dir = get_data_dir();
    if !data_dir.exists() {
        println!(
            "⚠️  No data directory at {} yet. Run 'serve' or receive an alert first.",
            data_dir.display()
        );
        return;
    }

    let stores = Stores::open(&data_dir);
    let watchlist = stores.watchlist.get_all().await;
    let alerts = stores.alerts.get_all().await;
    let settings = stores.settings.get().await;

    println!("📁 Data directory: {}", data_dir.display());
    println!("   ⭐ Watchlist items: {}", watchlist.len());
    println!(
        "   🔔 Alerts:          {} ({} unread)",
        alerts.len(),
        stores.alerts.unread_count().await
    );
    let token_preview: String = settings.webhook_token.chars().take(8).collect();
    println!("   🔑 Webhook token:   {}…", token_preview);
    println!(
        "   💬 Chat webhook:    {}",
        if settings.chat_webhook_url.is_some() {
            "configured"
        } else {
            "not configured"
        }
    );
}
