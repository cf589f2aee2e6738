//! Events REST API
//!
//! The HTTP surface over the event store access layer. Request/response
//! bodies are JSON throughout; store failures surface as HTTP 500 with a
//! generic `{success: false, message}` body.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa::{IntoParams, ToSchema};
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::{oid::ObjectId, Bson};
use std::sync::Arc;

use crate::event::entity::{Event, OwnerClaim};
use crate::event::repository::{strip_identity, EventRepository};
use crate::shared::error::PlatformError;

/// Lenient event-date input.
///
/// Clients send either a full RFC 3339 datetime or a bare calendar date;
/// both normalize to a UTC datetime so date filters and sorts stay sound.
pub mod event_date {
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{de, Deserialize, Deserializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| {
            de::Error::custom(format!("expected RFC 3339 datetime or YYYY-MM-DD, got {raw:?}"))
        })
    }
}

/// Create event request. Fields the platform does not read are kept
/// verbatim in `extra` and stored alongside the schema fields.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub event_type: String,

    #[serde(deserialize_with = "event_date::deserialize")]
    #[schema(value_type = String)]
    pub date: DateTime<Utc>,

    /// Claimed owner identity; accepted without verification
    pub created_by_email: String,

    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Event response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub event_type: String,
    pub date: String,
    pub created_by_email: String,
    pub joined_users: Vec<String>,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl From<Event> for EventResponse {
    fn from(e: Event) -> Self {
        let extra = match Bson::Document(e.extra).into_relaxed_extjson() {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        Self {
            id: e.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: e.title,
            event_type: e.event_type,
            date: e.date.to_rfc3339(),
            created_by_email: e.created_by_email,
            joined_users: e.joined_users,
            extra,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventResponse {
    pub success: bool,
    pub result: InsertedId,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertedId {
    pub inserted_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct JoinEventRequest {
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinEventResponse {
    pub success: bool,
    pub result: UpdateCounts,
}

/// Matched/modified counts from a single-document update. A join of an
/// unknown id shows up here as zeros, not as an error.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCounts {
    pub matched_count: u64,
    pub modified_count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GetEventResponse {
    /// Null when the id is well-formed but matches nothing
    pub result: Option<EventResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventResponse {
    pub modified_count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LatestEventsResponse {
    pub success: bool,
    pub result: Vec<EventResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteEventResponse {
    /// True when a document was removed, false when nothing matched
    pub success: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmailQuery {
    pub email: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive title substring; blank means no title filter
    pub search: Option<String>,

    /// Exact category; absent or "all" means no category filter
    pub event_type: Option<String>,
}

/// Events service state
#[derive(Clone)]
pub struct EventsState {
    pub event_repo: Arc<EventRepository>,
}

/// List upcoming events
///
/// Every event dated strictly after the current time, soonest first.
#[utoipa::path(
    get,
    path = "/events",
    tag = "events",
    responses(
        (status = 200, description = "Upcoming events", body = Vec<EventResponse>),
        (status = 500, description = "Store failure")
    )
)]
pub async fn list_upcoming_events(
    State(state): State<EventsState>,
) -> Result<Json<Vec<EventResponse>>, PlatformError> {
    let events = state.event_repo.find_upcoming(Utc::now()).await?;
    Ok(Json(events.into_iter().map(Into::into).collect()))
}

/// Create an event
///
/// Records the claimed owner and self-joins them into the membership set.
#[utoipa::path(
    post,
    path = "/events",
    tag = "events",
    request_body = CreateEventRequest,
    responses(
        (status = 200, description = "Event created", body = CreateEventResponse),
        (status = 500, description = "Store failure")
    )
)]
pub async fn create_event(
    State(state): State<EventsState>,
    Json(req): Json<CreateEventRequest>,
) -> Result<Json<CreateEventResponse>, PlatformError> {
    let owner = OwnerClaim::new(req.created_by_email);

    let mut extra = bson::to_document(&req.extra)?;
    // The membership set and identity are platform-managed; caller-supplied
    // copies would shadow the initialized values when flattened back in.
    extra.remove("_id");
    extra.remove("joinedUsers");

    let event = Event::new(req.title, req.event_type, req.date, owner, extra);
    let id = state.event_repo.insert(&event).await?;

    tracing::info!(event_id = %id, owner = %event.created_by_email, "Event created");

    Ok(Json(CreateEventResponse {
        success: true,
        result: InsertedId {
            inserted_id: id.to_hex(),
        },
    }))
}

/// Join an event
///
/// Adds the email to the membership set if absent; repeat joins are no-ops.
#[utoipa::path(
    patch,
    path = "/join/{id}",
    tag = "events",
    params(("id" = String, Path, description = "Event ID")),
    request_body = JoinEventRequest,
    responses(
        (status = 200, description = "Join applied (counts show the effect)", body = JoinEventResponse),
        (status = 500, description = "Malformed id or store failure")
    )
)]
pub async fn join_event(
    State(state): State<EventsState>,
    Path(id): Path<String>,
    Json(req): Json<JoinEventRequest>,
) -> Result<Json<JoinEventResponse>, PlatformError> {
    let id = ObjectId::parse_str(&id)?;
    let result = state.event_repo.add_member(&id, &req.email).await?;
    Ok(Json(JoinEventResponse {
        success: true,
        result: UpdateCounts {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        },
    }))
}

/// Get one event by id
#[utoipa::path(
    get,
    path = "/events/{id}",
    tag = "events",
    params(("id" = String, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Lookup result, null when unmatched", body = GetEventResponse),
        (status = 500, description = "Malformed id or store failure")
    )
)]
pub async fn get_event(
    State(state): State<EventsState>,
    Path(id): Path<String>,
) -> Result<Json<GetEventResponse>, PlatformError> {
    let id = ObjectId::parse_str(&id)?;
    let event = state.event_repo.find_by_id(&id).await?;
    Ok(Json(GetEventResponse {
        result: event.map(Into::into),
    }))
}

/// List events a user created or joined
///
/// Includes past events, soonest first.
#[utoipa::path(
    get,
    path = "/joined",
    tag = "events",
    params(EmailQuery),
    responses(
        (status = 200, description = "Created-or-joined events", body = Vec<EventResponse>),
        (status = 500, description = "Store failure")
    )
)]
pub async fn list_joined_events(
    State(state): State<EventsState>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Vec<EventResponse>>, PlatformError> {
    let events = state.event_repo.find_joined(&query.email).await?;
    Ok(Json(events.into_iter().map(Into::into).collect()))
}

/// List events a user created
#[utoipa::path(
    get,
    path = "/manage",
    tag = "events",
    params(EmailQuery),
    responses(
        (status = 200, description = "Owned events", body = Vec<EventResponse>),
        (status = 500, description = "Store failure")
    )
)]
pub async fn list_managed_events(
    State(state): State<EventsState>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Vec<EventResponse>>, PlatformError> {
    let events = state.event_repo.find_managed(&query.email).await?;
    Ok(Json(events.into_iter().map(Into::into).collect()))
}

/// Partially update an event
///
/// Field-level replace of whatever the payload names, identity excluded.
/// No field validation: the caller can reshape `date` or `joinedUsers`
/// through this path.
#[utoipa::path(
    put,
    path = "/events/{id}",
    tag = "events",
    params(("id" = String, Path, description = "Event ID")),
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Count of modified documents (0 or 1)", body = UpdateEventResponse),
        (status = 500, description = "Malformed id or store failure")
    )
)]
pub async fn update_event(
    State(state): State<EventsState>,
    Path(id): Path<String>,
    Json(payload): Json<serde_json::Map<String, serde_json::Value>>,
) -> Result<Json<UpdateEventResponse>, PlatformError> {
    let id = ObjectId::parse_str(&id)?;
    let update = strip_identity(bson::to_document(&payload)?);

    // A payload that only named the identity field has nothing left to merge
    if update.is_empty() {
        return Ok(Json(UpdateEventResponse { modified_count: 0 }));
    }

    let result = state.event_repo.update_fields(&id, update).await?;
    Ok(Json(UpdateEventResponse {
        modified_count: result.modified_count,
    }))
}

/// List the latest events
///
/// The six most recently dated events, newest first, past or future.
#[utoipa::path(
    get,
    path = "/latest",
    tag = "events",
    responses(
        (status = 200, description = "Latest events", body = LatestEventsResponse),
        (status = 500, description = "Store failure")
    )
)]
pub async fn list_latest_events(
    State(state): State<EventsState>,
) -> Result<Json<LatestEventsResponse>, PlatformError> {
    let events = state.event_repo.find_latest().await?;
    Ok(Json(LatestEventsResponse {
        success: true,
        result: events.into_iter().map(Into::into).collect(),
    }))
}

/// Search upcoming events
///
/// Title substring and category filters over the upcoming-events view,
/// soonest first.
#[utoipa::path(
    get,
    path = "/search",
    tag = "events",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching upcoming events", body = Vec<EventResponse>),
        (status = 500, description = "Store failure")
    )
)]
pub async fn search_events(
    State(state): State<EventsState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<EventResponse>>, PlatformError> {
    let events = state
        .event_repo
        .search(query.search.as_deref(), query.event_type.as_deref(), Utc::now())
        .await?;
    Ok(Json(events.into_iter().map(Into::into).collect()))
}

/// Delete an event
#[utoipa::path(
    delete,
    path = "/events/{id}",
    tag = "events",
    params(("id" = String, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Deletion result; success=false means nothing matched", body = DeleteEventResponse),
        (status = 500, description = "Malformed id or store failure")
    )
)]
pub async fn delete_event(
    State(state): State<EventsState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteEventResponse>, PlatformError> {
    let id = ObjectId::parse_str(&id)?;
    let result = state.event_repo.delete(&id).await?;
    if result.deleted_count > 0 {
        tracing::info!(event_id = %id, "Event deleted");
    }
    Ok(Json(DeleteEventResponse {
        success: result.deleted_count > 0,
    }))
}

/// Create events router
pub fn events_router(state: EventsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_upcoming_events, create_event))
        .routes(routes!(get_event, update_event, delete_event))
        .routes(routes!(join_event))
        .routes(routes!(list_joined_events))
        .routes(routes!(list_managed_events))
        .routes(routes!(list_latest_events))
        .routes(routes!(search_events))
        .with_state(state)
}
