use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::content::{
    ContentRecord, ContentStatus, ContentType, ElderApprovalStatus, Priority, SensitivityLevel,
};
use crate::moderation::engine::{apply_decision, DecisionType, ReviewDecision};
use crate::moderation::queue::{project_queue, QueueFilters};
use crate::moderation::roles::ActorRole;
use crate::moderation::store;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: usize = 10;
const MAX_PAGE_SIZE: usize = 100;

/// The acting role arrives as a header derived from the authenticated
/// session by the gateway. Auth itself lives outside this service.
fn actor_role(headers: &HeaderMap) -> Result<ActorRole, AppError> {
    let raw = headers
        .get("x-actor-role")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Validation("missing x-actor-role header".to_string()))?;
    raw.parse().map_err(AppError::Validation)
}

#[derive(Deserialize)]
pub struct StoriesQuery {
    pub status: Option<String>,
    pub cultural_sensitivity: Option<String>,
    pub story_type: Option<String>,
    pub search: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_count: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Serialize)]
pub struct StoriesResponse {
    pub stories: Vec<ContentRecord>,
    pub pagination: PaginationInfo,
}

/// GET /api/admin/content/stories
pub async fn handle_list_stories(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<StoriesQuery>,
) -> Result<Json<StoriesResponse>, AppError> {
    let role = actor_role(&headers)?;

    let filters = QueueFilters {
        status: parse_filter::<ContentStatus>(params.status.as_deref())?,
        sensitivity: parse_filter::<SensitivityLevel>(params.cultural_sensitivity.as_deref())?,
        content_type: parse_filter::<ContentType>(params.story_type.as_deref())?,
        search: params.search,
    };

    let page = params.page.unwrap_or(1).max(1);
    let page_size = params
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let records = store::list_all(&state.db).await?;
    let projected = project_queue(&records, role, &filters, page, page_size);

    Ok(Json(StoriesResponse {
        pagination: PaginationInfo {
            current_page: projected.page,
            total_pages: projected.total_pages,
            total_count: projected.total_count,
            has_next: projected.page < projected.total_pages,
            has_prev: projected.page > 1,
        },
        stories: projected.items,
    }))
}

/// GET /api/admin/content/stories/:id
pub async fn handle_get_story(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContentRecord>, AppError> {
    let record = store::fetch(&state.db, id).await?;
    Ok(Json(record))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoryRequest {
    pub title: String,
    pub body: String,
    pub author: String,
    pub content_type: ContentType,
    /// Optional: missing levels go through the sensitivity classifier.
    pub cultural_sensitivity_level: Option<SensitivityLevel>,
    pub priority: Option<Priority>,
    /// Start as a draft instead of entering the review queue directly.
    #[serde(default)]
    pub draft: bool,
}

/// POST /api/admin/content/stories
pub async fn handle_create_story(
    State(state): State<AppState>,
    Json(req): Json<CreateStoryRequest>,
) -> Result<(StatusCode, Json<ContentRecord>), AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("title must not be empty".to_string()));
    }
    if req.body.trim().is_empty() {
        return Err(AppError::Validation("body must not be empty".to_string()));
    }

    let sensitivity = match req.cultural_sensitivity_level {
        Some(level) => level,
        None => state.classifier.classify(&req.title, &req.body).await?,
    };

    // High sensitivity gates the record from the moment it is created.
    let requires_elder_review = sensitivity == SensitivityLevel::High;
    let elder_approval = if requires_elder_review {
        ElderApprovalStatus::Pending
    } else {
        ElderApprovalStatus::NotRequired
    };

    let now = Utc::now();
    let record = ContentRecord {
        id: Uuid::new_v4(),
        title: req.title.trim().to_string(),
        body: req.body,
        author: req.author,
        content_type: req.content_type,
        status: if req.draft {
            ContentStatus::Draft
        } else {
            ContentStatus::PendingReview
        },
        sensitivity,
        requires_elder_review,
        elder_approval,
        priority: req.priority.unwrap_or(Priority::Medium),
        featured: false,
        reviewer_notes: vec![],
        version: 1,
        created_at: now,
        updated_at: now,
    };

    store::insert(&state.db, &record).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    pub story_id: Uuid,
    pub admin_action: DecisionType,
    pub actor: String,
    pub reason: String,
    pub notes: String,
}

/// PUT /api/admin/content/stories
///
/// Applies one review-engine transition. The record is read fresh, the
/// engine re-validates against that state, and the commit is conditional on
/// the version read — a concurrent decision surfaces as 409 CONFLICT.
pub async fn handle_decide(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<DecisionRequest>,
) -> Result<Json<ContentRecord>, AppError> {
    let role = actor_role(&headers)?;

    let current = store::fetch(&state.db, req.story_id).await?;

    let decision = ReviewDecision {
        decision: req.admin_action,
        actor: req.actor,
        actor_role: role,
        reason: req.reason,
        notes: req.notes,
    };

    let next = apply_decision(&current, &decision, Utc::now())?;
    let committed = store::commit(&state.db, &next, current.version).await?;

    Ok(Json(committed))
}

fn parse_filter<T: std::str::FromStr<Err = String>>(
    raw: Option<&str>,
) -> Result<Option<T>, AppError> {
    match raw {
        None | Some("") | Some("all") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(AppError::Validation),
    }
}
