use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateQuizRequestDto {
    #[validate(length(min = 1, max = 100))]
    pub topic: String,

    #[validate(range(min = 1, max = 10))]
    pub count: usize,

    pub guild_id: Option<i64>,

    pub user_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(topic: &str, count: usize) -> GenerateQuizRequestDto {
        GenerateQuizRequestDto {
            topic: topic.to_string(),
            count,
            guild_id: None,
            user_id: None,
        }
    }

    #[test]
    fn accepts_valid_request() {
        assert!(request("web security", 5).validate().is_ok());
        assert!(request("x", 1).validate().is_ok());
        assert!(request("x", 10).validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_count() {
        assert!(request("web security", 0).validate().is_err());
        assert!(request("web security", 11).validate().is_err());
    }

    #[test]
    fn rejects_bad_topic_length() {
        assert!(request("", 3).validate().is_err());
        assert!(request(&"t".repeat(101), 3).validate().is_err());
    }

    #[test]
    fn ids_are_optional_in_json() {
        let parsed: GenerateQuizRequestDto =
            serde_json::from_str(r#"{"topic":"crypto","count":3,"guild_id":42}"#)
                .expect("valid json");
        assert_eq!(parsed.guild_id, Some(42));
        assert_eq!(parsed.user_id, None);
    }
}
