use async_trait::async_trait;
use chrono::{Duration, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, DateTime},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{db::Database, errors::AppResult, models::domain::SeenQuestion};

pub const DEFAULT_SEEN_COLLECTION: &str = "quiz_seen";

/// Cross-session memory of which questions each (guild, user, topic) has been served.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SeenQuestionRepository: Send + Sync {
    /// Question texts newer than `ttl_days`, newest first.
    async fn load_recent_avoid(
        &self,
        guild_id: i64,
        user_id: i64,
        topic: &str,
        limit: i64,
        ttl_days: i64,
    ) -> AppResult<Vec<String>>;

    /// Insert-or-ignore keyed by (guild, user, topic, signature).
    async fn record_seen(
        &self,
        guild_id: i64,
        user_id: i64,
        topic: &str,
        signature: &str,
        starter: &str,
        question_text: &str,
    ) -> AppResult<()>;

    /// Deletes records older than `ttl_days` and returns how many were removed.
    async fn prune_older_than(&self, ttl_days: i64) -> AppResult<u64>;
}

/// Oldest creation time still inside a `ttl_days` window. A window too large
/// to represent reaches back to the earliest date, so nothing expires.
pub fn cutoff(ttl_days: i64) -> DateTime {
    Duration::try_days(ttl_days.max(0))
        .and_then(|ttl| Utc::now().checked_sub_signed(ttl))
        .map(|cutoff| DateTime::from_millis(cutoff.timestamp_millis()))
        .unwrap_or(DateTime::MIN)
}

pub struct MongoSeenQuestionRepository {
    collection: Collection<SeenQuestion>,
}

impl MongoSeenQuestionRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.collection(collection_name);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for seen questions collection");

        let signature_index = IndexModel::builder()
            .keys(doc! { "guild_id": 1, "user_id": 1, "topic": 1, "signature": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("seen_signature_unique".to_string())
                    .build(),
            )
            .build();

        let recent_index = IndexModel::builder()
            .keys(doc! { "guild_id": 1, "user_id": 1, "topic": 1, "created_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("seen_recent".to_string())
                    .build(),
            )
            .build();

        self.collection
            .create_indexes(vec![signature_index, recent_index])
            .await?;

        log::info!("Successfully created indexes for seen questions collection");
        Ok(())
    }
}

#[async_trait]
impl SeenQuestionRepository for MongoSeenQuestionRepository {
    async fn load_recent_avoid(
        &self,
        guild_id: i64,
        user_id: i64,
        topic: &str,
        limit: i64,
        ttl_days: i64,
    ) -> AppResult<Vec<String>> {
        let filter = doc! {
            "guild_id": guild_id,
            "user_id": user_id,
            "topic": topic,
            "created_at": { "$gte": cutoff(ttl_days) },
        };

        let cursor = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .limit(limit.max(0))
            .await?;
        let items: Vec<SeenQuestion> = cursor.try_collect().await?;

        Ok(items
            .into_iter()
            .map(|seen| seen.question)
            .filter(|q| !q.is_empty())
            .collect())
    }

    async fn record_seen(
        &self,
        guild_id: i64,
        user_id: i64,
        topic: &str,
        signature: &str,
        starter: &str,
        question_text: &str,
    ) -> AppResult<()> {
        let seen = SeenQuestion::new(guild_id, user_id, topic, signature, starter, question_text);

        self.collection
            .update_one(
                doc! {
                    "guild_id": seen.guild_id,
                    "user_id": seen.user_id,
                    "topic": &seen.topic,
                    "signature": &seen.signature,
                },
                doc! {
                    "$setOnInsert": {
                        "starter": &seen.starter,
                        "question": &seen.question,
                        "created_at": seen.created_at,
                    }
                },
            )
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn prune_older_than(&self, ttl_days: i64) -> AppResult<u64> {
        let result = self
            .collection
            .delete_many(doc! { "created_at": { "$lt": cutoff(ttl_days) } })
            .await?;
        Ok(result.deleted_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cutoff_is_in_the_past() {
        let now = DateTime::now();
        let week_ago = cutoff(7);
        let elapsed = now.timestamp_millis() - week_ago.timestamp_millis();
        let seven_days = 7 * 24 * 60 * 60 * 1000;

        assert!(elapsed >= seven_days - 1000 && elapsed <= seven_days + 1000);
    }

    #[test]
    fn negative_ttl_clamps_to_now() {
        let now = DateTime::now().timestamp_millis();
        assert!((cutoff(-5).timestamp_millis() - now).abs() < 1000);
    }

    #[test]
    fn unrepresentable_ttl_keeps_everything() {
        assert_eq!(cutoff(i64::MAX), DateTime::MIN);
        assert_eq!(cutoff(200_000_000), DateTime::MIN);
    }
}
