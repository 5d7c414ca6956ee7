use tracing::info;

use super::models::NewTopic;
use super::store::{ForumStore, StoreResult};

/// Topics every fresh forum starts with.
pub const DEFAULT_TOPICS: &[(&str, &str)] = &[
    ("Tech", "Gadgets, programming, AI, and tech news."),
    ("Games", "Gaming discussion: PC/console/mobile, esports, and releases."),
    ("Lifestyle", "Daily life, productivity, wellness, and habits."),
    ("Music", "Artists, genres, recommendations, and live shows."),
    ("Automotive", "Cars, bikes, mods, reviews, and maintenance."),
    ("Culture", "Pop culture, trends, media, and society."),
];

/// Insert the default topics that are not present yet. Safe to run on every boot.
pub async fn seed_default_topics(store: &dyn ForumStore) -> StoreResult<u64> {
    let topics = DEFAULT_TOPICS
        .iter()
        .map(|(title, description)| NewTopic {
            title: (*title).to_string(),
            description: (*description).to_string(),
            created_by_user_id: None,
        })
        .collect();

    let inserted = store.seed_topics(topics).await?;
    info!("Seeded {} default topic(s)", inserted);
    Ok(inserted)
}
