//! Moderation Queue View — a pure, deterministic projection of content
//! records into the filtered, sorted, paginated list a given actor may see.
//!
//! Read-only and side-effect-free; safe to compute concurrently for many
//! viewers.

use crate::models::content::{
    ContentRecord, ContentStatus, ContentType, ElderApprovalStatus, SensitivityLevel,
};
use crate::moderation::roles::{self, ActorRole};

/// Conjunctive filter criteria. Absent fields match everything.
#[derive(Debug, Clone, Default)]
pub struct QueueFilters {
    pub status: Option<ContentStatus>,
    pub sensitivity: Option<SensitivityLevel>,
    pub content_type: Option<ContentType>,
    pub search: Option<String>,
}

/// One stable slice of the projected queue.
#[derive(Debug, Clone)]
pub struct QueuePage {
    pub items: Vec<ContentRecord>,
    pub total_count: usize,
    pub page: usize,
    pub total_pages: usize,
}

/// Whether `record` is visible to an actor with `role` at all.
///
/// Elder-gated items still awaiting sign-off are visible only to elders and
/// admins; plain moderators never see them. This mirrors the gate at the
/// queue level so gated content cannot even be browsed past.
pub fn visible_to(record: &ContentRecord, role: ActorRole) -> bool {
    if !roles::can_view_queue(role) {
        return false;
    }
    if roles::sees_gated_pending(role) {
        return true;
    }
    !(record.sensitivity == SensitivityLevel::High
        && record.elder_approval == ElderApprovalStatus::Pending)
}

/// Projects the ordered queue slice for one viewer.
///
/// Sort order: priority descending (urgent first), then `created_at`
/// ascending, so urgent long-waiting items surface first. Pagination is
/// offset-based and 1-indexed; a page past the end yields an empty `items`
/// with correct totals.
pub fn project_queue(
    records: &[ContentRecord],
    role: ActorRole,
    filters: &QueueFilters,
    page: usize,
    page_size: usize,
) -> QueuePage {
    let mut matched: Vec<&ContentRecord> = records
        .iter()
        .filter(|r| visible_to(r, role))
        .filter(|r| filters.status.map_or(true, |s| r.status == s))
        .filter(|r| filters.sensitivity.map_or(true, |s| r.sensitivity == s))
        .filter(|r| filters.content_type.map_or(true, |t| r.content_type == t))
        .filter(|r| match filters.search.as_deref() {
            Some(q) if !q.is_empty() => {
                let q = q.to_lowercase();
                r.title.to_lowercase().contains(&q) || r.body.to_lowercase().contains(&q)
            }
            _ => true,
        })
        .collect();

    matched.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });

    let total_count = matched.len();
    let page_size = page_size.max(1);
    let page = page.max(1);
    let total_pages = total_count.div_ceil(page_size);

    let items = matched
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .cloned()
        .collect();

    QueuePage {
        items,
        total_count,
        page,
        total_pages,
    }
}
