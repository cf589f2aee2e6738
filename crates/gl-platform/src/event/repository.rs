//! Event Repository
//!
//! All queries against the `events` collection. Filter documents are built
//! by pure functions so the query contract is testable without a store.

use mongodb::{
    bson::{self, doc, oid::ObjectId, Document},
    options::FindOptions,
    results::{DeleteResult, UpdateResult},
    Collection, Database,
};
use futures::TryStreamExt;
use chrono::{DateTime, Utc};

use crate::event::entity::Event;
use crate::shared::error::Result;

/// Sentinel category meaning "do not filter by event type"
pub const TYPE_FILTER_ALL: &str = "all";

/// How many events the latest-events view returns
pub const LATEST_LIMIT: i64 = 6;

/// Events strictly in the future relative to `now`
pub fn upcoming_filter(now: DateTime<Utc>) -> Document {
    doc! { "date": { "$gt": bson::DateTime::from_chrono(now) } }
}

/// Events `email` created or joined
pub fn joined_filter(email: &str) -> Document {
    doc! {
        "$or": [
            { "createdByEmail": email },
            { "joinedUsers": { "$in": [email] } },
        ]
    }
}

/// Events `email` created (ownership only, date-independent)
pub fn managed_filter(email: &str) -> Document {
    doc! { "createdByEmail": email }
}

/// Upcoming events matching an optional title term and category.
///
/// A blank term drops the title predicate; an absent category or the "all"
/// sentinel drops the type predicate. The date restriction always applies.
pub fn search_filter(term: Option<&str>, event_type: Option<&str>, now: DateTime<Utc>) -> Document {
    let mut filter = upcoming_filter(now);

    if let Some(term) = term {
        let term = term.trim();
        if !term.is_empty() {
            filter.insert(
                "title",
                doc! { "$regex": regex_escape(term), "$options": "i" },
            );
        }
    }

    if let Some(event_type) = event_type {
        if !event_type.is_empty() && event_type != TYPE_FILTER_ALL {
            filter.insert("eventType", event_type);
        }
    }

    filter
}

/// Add-if-absent membership update
pub fn join_update(email: &str) -> Document {
    doc! { "$addToSet": { "joinedUsers": email } }
}

/// Remove identity fields from an update payload. An update must never
/// change document identity, whatever the caller sends.
pub fn strip_identity(mut update: Document) -> Document {
    update.remove("_id");
    update
}

/// Escape regex metacharacters so search terms match literally
fn regex_escape(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if "\\.+*?()|[]{}^$".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub struct EventRepository {
    collection: Collection<Event>,
}

impl EventRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("events"),
        }
    }

    /// Insert a new event and return the store-assigned id
    pub async fn insert(&self, event: &Event) -> Result<ObjectId> {
        let result = self.collection.insert_one(event).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| crate::PlatformError::internal("insert did not return an ObjectId"))
    }

    pub async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Event>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    /// All events with a date strictly after `now`, ascending by date
    pub async fn find_upcoming(&self, now: DateTime<Utc>) -> Result<Vec<Event>> {
        let options = FindOptions::builder().sort(doc! { "date": 1 }).build();
        let cursor = self
            .collection
            .find(upcoming_filter(now))
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// Events `email` created or joined, past ones included, ascending by date
    pub async fn find_joined(&self, email: &str) -> Result<Vec<Event>> {
        let options = FindOptions::builder().sort(doc! { "date": 1 }).build();
        let cursor = self
            .collection
            .find(joined_filter(email))
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// Events `email` created, regardless of date
    pub async fn find_managed(&self, email: &str) -> Result<Vec<Event>> {
        let cursor = self.collection.find(managed_filter(email)).await?;
        Ok(cursor.try_collect().await?)
    }

    /// The most recently dated events, newest first
    pub async fn find_latest(&self) -> Result<Vec<Event>> {
        let options = FindOptions::builder()
            .sort(doc! { "date": -1 })
            .limit(LATEST_LIMIT)
            .build();
        let cursor = self.collection.find(doc! {}).with_options(options).await?;
        Ok(cursor.try_collect().await?)
    }

    /// Upcoming events matching the search predicates, ascending by date
    pub async fn search(
        &self,
        term: Option<&str>,
        event_type: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>> {
        let options = FindOptions::builder().sort(doc! { "date": 1 }).build();
        let cursor = self
            .collection
            .find(search_filter(term, event_type, now))
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// Add `email` to the event's membership set if absent.
    ///
    /// A non-matching id matches zero documents; the caller sees that in the
    /// returned counts rather than as an error.
    pub async fn add_member(&self, id: &ObjectId, email: &str) -> Result<UpdateResult> {
        Ok(self
            .collection
            .update_one(doc! { "_id": id }, join_update(email))
            .await?)
    }

    /// Field-level `$set` merge of `update` into the stored document.
    /// Identity fields must already be stripped (see [`strip_identity`]).
    pub async fn update_fields(&self, id: &ObjectId, update: Document) -> Result<UpdateResult> {
        Ok(self
            .collection
            .update_one(doc! { "_id": id }, doc! { "$set": update })
            .await?)
    }

    pub async fn delete(&self, id: &ObjectId) -> Result<DeleteResult> {
        Ok(self.collection.delete_one(doc! { "_id": id }).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_upcoming_filter_is_strictly_greater() {
        let filter = upcoming_filter(now());
        let date = filter.get_document("date").unwrap();
        assert_eq!(
            date.get_datetime("$gt").unwrap(),
            &bson::DateTime::from_chrono(now())
        );
        assert!(date.get("$gte").is_none());
    }

    #[test]
    fn test_joined_filter_covers_owner_and_members() {
        let filter = joined_filter("a@x.com");
        let or = filter.get_array("$or").unwrap();
        assert_eq!(or.len(), 2);
        assert_eq!(
            or[0].as_document().unwrap().get_str("createdByEmail").unwrap(),
            "a@x.com"
        );
        let members = or[1].as_document().unwrap().get_document("joinedUsers").unwrap();
        assert_eq!(members.get_array("$in").unwrap().len(), 1);
    }

    #[test]
    fn test_managed_filter_is_ownership_only() {
        let filter = managed_filter("a@x.com");
        assert_eq!(filter.get_str("createdByEmail").unwrap(), "a@x.com");
        assert!(filter.get("date").is_none());
    }

    #[test]
    fn test_search_filter_all_predicates() {
        let filter = search_filter(Some("beach"), Some("cleanup"), now());
        let title = filter.get_document("title").unwrap();
        assert_eq!(title.get_str("$regex").unwrap(), "beach");
        assert_eq!(title.get_str("$options").unwrap(), "i");
        assert_eq!(filter.get_str("eventType").unwrap(), "cleanup");
        assert!(filter.get_document("date").is_ok());
    }

    #[test]
    fn test_search_filter_blank_term_drops_title_predicate() {
        for term in [None, Some(""), Some("   ")] {
            let filter = search_filter(term, Some("cleanup"), now());
            assert!(filter.get("title").is_none());
        }
    }

    #[test]
    fn test_search_filter_all_sentinel_drops_type_predicate() {
        for event_type in [None, Some(""), Some(TYPE_FILTER_ALL)] {
            let filter = search_filter(Some("beach"), event_type, now());
            assert!(filter.get("eventType").is_none());
        }
    }

    #[test]
    fn test_search_filter_without_predicates_matches_upcoming() {
        let filter = search_filter(None, Some(TYPE_FILTER_ALL), now());
        assert_eq!(filter, upcoming_filter(now()));
    }

    #[test]
    fn test_search_term_is_matched_literally() {
        let filter = search_filter(Some("c++ (outdoors)"), None, now());
        let title = filter.get_document("title").unwrap();
        assert_eq!(title.get_str("$regex").unwrap(), "c\\+\\+ \\(outdoors\\)");
    }

    #[test]
    fn test_join_update_uses_add_to_set() {
        let update = join_update("b@x.com");
        let add = update.get_document("$addToSet").unwrap();
        assert_eq!(add.get_str("joinedUsers").unwrap(), "b@x.com");
    }

    #[test]
    fn test_strip_identity_removes_id_only() {
        let update = strip_identity(doc! { "_id": "abc", "title": "New", "date": "junk" });
        assert!(update.get("_id").is_none());
        assert_eq!(update.get_str("title").unwrap(), "New");
        assert_eq!(update.get_str("date").unwrap(), "junk");
    }

    #[test]
    fn test_latest_limit_is_six() {
        assert_eq!(LATEST_LIMIT, 6);
    }
}
