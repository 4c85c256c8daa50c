//! Persisted records.

use std::fmt;
use std::str::FromStr;

use bm_blocks::FeedbackScale;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of interactive block a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    Poll,
    Feedback,
}

impl ResponseType {
    /// Infer the type from the clicked value: rating-scale words are
    /// feedback, anything else is a poll option id.
    pub fn for_value(value: &str) -> Self {
        if FeedbackScale::parse(value).is_some() {
            Self::Feedback
        } else {
            Self::Poll
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Poll => "poll",
            Self::Feedback => "feedback",
        }
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "poll" => Ok(Self::Poll),
            "feedback" => Ok(Self::Feedback),
            other => Err(format!("unknown response type '{other}'")),
        }
    }
}

/// A recorded click. At most one exists per `(block_id, recipient_token)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub block_id: String,
    pub recipient_token: String,
    pub response_type: ResponseType,
    pub value: String,
    pub recorded_at: DateTime<Utc>,
}

/// Result of an insert-or-ignore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The row was written.
    Inserted,
    /// A row for the same key already existed and was left untouched.
    AlreadyExists,
}

/// Shareable, time-limited access to an email snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewToken {
    pub token: String,
    pub email_id: String,
    pub expires_at: DateTime<Utc>,
    pub view_count: u64,
}

impl PreviewToken {
    /// Expiry is inclusive: a token is unusable from `expires_at` on.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_response_type_for_value() {
        assert_eq!(ResponseType::for_value("love"), ResponseType::Feedback);
        assert_eq!(ResponseType::for_value("dislike"), ResponseType::Feedback);
        assert_eq!(ResponseType::for_value("a"), ResponseType::Poll);
        assert_eq!(ResponseType::for_value("3"), ResponseType::Poll);
    }

    #[test]
    fn test_response_type_round_trip_str() {
        for kind in [ResponseType::Poll, ResponseType::Feedback] {
            assert_eq!(kind.as_str().parse::<ResponseType>(), Ok(kind));
        }
        assert!("vote".parse::<ResponseType>().is_err());
    }

    #[test]
    fn test_expiry_boundary_inclusive() {
        let now = Utc::now();
        let token = PreviewToken {
            token: "t".to_owned(),
            email_id: "e".to_owned(),
            expires_at: now,
            view_count: 0,
        };

        assert!(token.is_expired_at(now));
        assert!(token.is_expired_at(now + TimeDelta::seconds(1)));
        assert!(!token.is_expired_at(now - TimeDelta::seconds(1)));
    }

    #[test]
    fn test_preview_token_serializes_camel_case() {
        let token = PreviewToken {
            token: "t".to_owned(),
            email_id: "e".to_owned(),
            expires_at: DateTime::from_timestamp(0, 0).unwrap(),
            view_count: 3,
        };
        let json = serde_json::to_value(&token).unwrap();

        assert_eq!(json["emailId"], "e");
        assert_eq!(json["viewCount"], 3);
        assert_eq!(json["expiresAt"], "1970-01-01T00:00:00Z");
    }
}
