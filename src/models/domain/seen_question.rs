use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

/// A question a user was served, kept to steer later generations away from repeats.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SeenQuestion {
    pub guild_id: i64,
    pub user_id: i64,
    pub topic: String,
    pub signature: String,
    pub starter: String,
    pub question: String,
    pub created_at: DateTime,
}

impl SeenQuestion {
    pub fn new(
        guild_id: i64,
        user_id: i64,
        topic: &str,
        signature: &str,
        starter: &str,
        question: &str,
    ) -> Self {
        Self {
            guild_id,
            user_id,
            topic: topic.to_string(),
            signature: signature.to_string(),
            starter: starter.to_string(),
            question: question.to_string(),
            created_at: DateTime::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_copies_fields() {
        let seen = SeenQuestion::new(1, 2, "web security", "abcd", "what port does", "What port?");

        assert_eq!(seen.guild_id, 1);
        assert_eq!(seen.user_id, 2);
        assert_eq!(seen.topic, "web security");
        assert_eq!(seen.starter, "what port does");
        assert!(seen.created_at <= DateTime::now());
    }
}
