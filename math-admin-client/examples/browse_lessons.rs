use math_admin_client::list::LoadOutcome;
use math_admin_client::models::lesson::{Grade, LessonType};
use math_admin_client::screens::LessonScreen;
use math_admin_client::{ApiClient, ClientConfig, Language, LogNotifier};
use std::sync::Arc;

/// Page through the grade 1 addition lessons of a running admin API.
///
/// `MATH_ADMIN_BASE_URL` or `admin.yaml` point it at the server.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = ClientConfig::load("admin.yaml")?;
    let client = Arc::new(ApiClient::from_config(&config)?);
    let screen = LessonScreen::new(client.clone(), Arc::new(LogNotifier), *config.language());

    screen.open().await?;
    while screen.snapshot().await.has_more {
        // a page without new rows would never end the loop
        if screen.load_more().await? == (LoadOutcome::Loaded { added: 0 }) {
            break;
        }
    }

    let snapshot = screen.snapshot().await;
    println!(
        "{} of {} lessons loaded for grade {} {}",
        snapshot.accumulated,
        snapshot.total,
        Grade::default(),
        LessonType::default().label(snapshot.language)
    );
    for lesson in &snapshot.visible {
        println!(
            "{:>3}  {}",
            lesson.order().unwrap_or_default(),
            lesson.localized("name", Language::En).unwrap_or("-")
        );
    }

    if let Some(stats) = client.cache_stats() {
        println!(
            "cache: {} entries ({} valid, {} expired)",
            stats.total_entries, stats.valid_entries, stats.expired_entries
        );
    }
    Ok(())
}
