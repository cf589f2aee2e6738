//! Event Entity
//!
//! A community event document. Schema-flexible: beyond the fields the
//! platform itself reads, anything the caller supplies is stored verbatim.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use bson::{oid::ObjectId, Document};

/// Caller-supplied owner identity.
///
/// The platform records whatever email the request body claims as the event
/// owner; nothing verifies the caller actually controls that address. Every
/// ownership decision flows through this type so verification can be added
/// in one place without touching query logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerClaim(String);

impl OwnerClaim {
    pub fn new(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    pub fn email(&self) -> &str {
        &self.0
    }

    pub fn into_email(self) -> String {
        self.0
    }
}

/// Event entity - one document in the `events` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Store-assigned identity, absent until inserted. Never changed by
    /// update: identity fields are stripped from update payloads.
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Free text, matched case-insensitively by search
    pub title: String,

    /// Open set of category labels; "all" is a reserved filter sentinel,
    /// not a real category
    pub event_type: String,

    /// When the event happens. Drives upcoming/past visibility and every
    /// sort order, so it is normalized to a real datetime at creation.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub date: DateTime<Utc>,

    /// Owner identity as claimed at creation (see [`OwnerClaim`])
    pub created_by_email: String,

    /// Membership set. Always contains `created_by_email`; grown only via
    /// add-if-absent, so no duplicates.
    pub joined_users: Vec<String>,

    /// Everything else the caller sent, stored as-is and never validated
    #[serde(flatten)]
    pub extra: Document,
}

impl Event {
    /// Create a new event owned by `owner`. The owner automatically joins
    /// their own event.
    pub fn new(
        title: impl Into<String>,
        event_type: impl Into<String>,
        date: DateTime<Utc>,
        owner: OwnerClaim,
        extra: Document,
    ) -> Self {
        let owner_email = owner.into_email();
        Self {
            id: None,
            title: title.into(),
            event_type: event_type.into(),
            date,
            created_by_email: owner_email.clone(),
            joined_users: vec![owner_email],
            extra,
        }
    }

    /// Add `email` to the membership set if absent. Returns whether the
    /// set changed. Mirrors the store-side `$addToSet` rule.
    pub fn add_member(&mut self, email: &str) -> bool {
        if self.joined_users.iter().any(|m| m == email) {
            return false;
        }
        self.joined_users.push(email.to_string());
        true
    }

    /// Whether `email` created this event or joined it
    pub fn involves(&self, email: &str) -> bool {
        self.created_by_email == email || self.joined_users.iter().any(|m| m == email)
    }

    /// Whether the event is still upcoming relative to `now`
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.date > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use chrono::TimeZone;

    fn sample_event() -> Event {
        Event::new(
            "Beach Cleanup",
            "cleanup",
            Utc.with_ymd_and_hms(2099, 1, 1, 0, 0, 0).unwrap(),
            OwnerClaim::new("a@x.com"),
            doc! { "location": "North Shore" },
        )
    }

    #[test]
    fn test_creator_joins_own_event() {
        let event = sample_event();
        assert_eq!(event.created_by_email, "a@x.com");
        assert_eq!(event.joined_users, vec!["a@x.com"]);
        assert!(event.id.is_none());
    }

    #[test]
    fn test_add_member_grows_set() {
        let mut event = sample_event();
        assert!(event.add_member("b@x.com"));
        assert_eq!(event.joined_users, vec!["a@x.com", "b@x.com"]);
    }

    #[test]
    fn test_add_member_is_idempotent() {
        let mut event = sample_event();
        event.add_member("b@x.com");
        assert!(!event.add_member("b@x.com"));
        assert!(!event.add_member("a@x.com"));
        assert_eq!(event.joined_users, vec!["a@x.com", "b@x.com"]);
        assert_eq!(
            event.joined_users.iter().filter(|m| *m == "b@x.com").count(),
            1
        );
    }

    #[test]
    fn test_involves_creator_and_members() {
        let mut event = sample_event();
        event.add_member("b@x.com");
        assert!(event.involves("a@x.com"));
        assert!(event.involves("b@x.com"));
        assert!(!event.involves("c@x.com"));
    }

    #[test]
    fn test_is_upcoming() {
        let event = sample_event();
        let before = Utc.with_ymd_and_hms(2098, 12, 31, 23, 59, 59).unwrap();
        let exact = Utc.with_ymd_and_hms(2099, 1, 1, 0, 0, 0).unwrap();
        assert!(event.is_upcoming(before));
        // Strictly greater than: an event happening right now is not upcoming
        assert!(!event.is_upcoming(exact));
    }

    #[test]
    fn test_extra_fields_round_trip_through_bson() {
        let event = sample_event();
        let doc = bson::to_document(&event).unwrap();
        assert_eq!(doc.get_str("location").unwrap(), "North Shore");
        assert_eq!(doc.get_str("createdByEmail").unwrap(), "a@x.com");
        assert!(doc.get("_id").is_none());

        let decoded: Event = bson::from_document(doc).unwrap();
        assert_eq!(decoded.extra.get_str("location").unwrap(), "North Shore");
        assert_eq!(decoded.joined_users, vec!["a@x.com"]);
    }
}
