//! Content records — the unit of reviewable community content.
//!
//! A record carries two interlocking pieces of state: the lifecycle `status`
//! and the elder-approval sub-state. The review engine is the only mutator;
//! everything here is plain data plus wire/database conversions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::AppError;
use crate::moderation::engine::DecisionType;
use crate::moderation::roles::ActorRole;

/// What kind of content this record holds. Fixed at creation, never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Story,
    Profile,
    Comment,
    Media,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Story => "story",
            ContentType::Profile => "profile",
            ContentType::Comment => "comment",
            ContentType::Media => "media",
        }
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "story" => ContentType::Story,
            "profile" => ContentType::Profile,
            "comment" => ContentType::Comment,
            "media" => ContentType::Media,
            other => return Err(format!("unknown content type '{other}'")),
        })
    }
}

/// Lifecycle state of a content record.
///
/// `Approved` is reachable only through the out-of-scope authoring flow;
/// the review engine publishes directly and treats `Approved` like any other
/// settled status (flaggable, nothing else).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    Draft,
    PendingReview,
    InReview,
    Approved,
    Published,
    Rejected,
    Archived,
    Flagged,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Draft => "draft",
            ContentStatus::PendingReview => "pending_review",
            ContentStatus::InReview => "in_review",
            ContentStatus::Approved => "approved",
            ContentStatus::Published => "published",
            ContentStatus::Rejected => "rejected",
            ContentStatus::Archived => "archived",
            ContentStatus::Flagged => "flagged",
        }
    }
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "draft" => ContentStatus::Draft,
            "pending_review" => ContentStatus::PendingReview,
            "in_review" => ContentStatus::InReview,
            "approved" => ContentStatus::Approved,
            "published" => ContentStatus::Published,
            "rejected" => ContentStatus::Rejected,
            "archived" => ContentStatus::Archived,
            "flagged" => ContentStatus::Flagged,
            other => return Err(format!("unknown content status '{other}'")),
        })
    }
}

/// Tiered classification of how much cultural-protocol care content requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityLevel {
    Low,
    Medium,
    High,
}

impl SensitivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensitivityLevel::Low => "low",
            SensitivityLevel::Medium => "medium",
            SensitivityLevel::High => "high",
        }
    }
}

impl FromStr for SensitivityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "low" => SensitivityLevel::Low,
            "medium" => SensitivityLevel::Medium,
            "high" => SensitivityLevel::High,
            other => return Err(format!("unknown sensitivity level '{other}'")),
        })
    }
}

/// Elder sign-off sub-state, tracked alongside `status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElderApprovalStatus {
    NotRequired,
    Pending,
    Approved,
    Rejected,
}

impl ElderApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElderApprovalStatus::NotRequired => "not_required",
            ElderApprovalStatus::Pending => "pending",
            ElderApprovalStatus::Approved => "approved",
            ElderApprovalStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ElderApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "not_required" => ElderApprovalStatus::NotRequired,
            "pending" => ElderApprovalStatus::Pending,
            "approved" => ElderApprovalStatus::Approved,
            "rejected" => ElderApprovalStatus::Rejected,
            other => return Err(format!("unknown elder approval status '{other}'")),
        })
    }
}

/// Informational urgency. Does not gate transitions, only queue ordering.
/// Ordered so that `Urgent` compares greatest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "low" => Priority::Low,
            "medium" => Priority::Medium,
            "high" => Priority::High,
            "urgent" => Priority::Urgent,
            other => return Err(format!("unknown priority '{other}'")),
        })
    }
}

/// One append-only audit entry accompanying a review decision.
/// Once appended, content and timestamp are immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewerNote {
    pub author: String,
    pub author_role: ActorRole,
    pub decision: DecisionType,
    pub reason: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// One unit of submitted content subject to review.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub author: String,
    pub content_type: ContentType,
    pub status: ContentStatus,
    #[serde(rename = "culturalSensitivityLevel")]
    pub sensitivity: SensitivityLevel,
    pub requires_elder_review: bool,
    #[serde(rename = "elderApprovalStatus")]
    pub elder_approval: ElderApprovalStatus,
    pub priority: Priority,
    pub featured: bool,
    pub reviewer_notes: Vec<ReviewerNote>,
    /// Optimistic-concurrency counter, bumped by the store on every commit.
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw database row for a content record. Enum columns are TEXT; notes are JSONB.
#[derive(Debug, Clone, FromRow)]
pub struct ContentRecordRow {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub author: String,
    pub content_type: String,
    pub status: String,
    pub cultural_sensitivity_level: String,
    pub requires_elder_review: bool,
    pub elder_approval_status: String,
    pub priority: String,
    pub featured: bool,
    pub reviewer_notes: serde_json::Value,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ContentRecordRow> for ContentRecord {
    type Error = AppError;

    fn try_from(row: ContentRecordRow) -> Result<Self, Self::Error> {
        let decode = |e: String| AppError::Internal(anyhow::anyhow!("corrupt row: {e}"));

        Ok(ContentRecord {
            id: row.id,
            title: row.title,
            body: row.body,
            author: row.author,
            content_type: row.content_type.parse().map_err(decode)?,
            status: row.status.parse().map_err(decode)?,
            sensitivity: row.cultural_sensitivity_level.parse().map_err(decode)?,
            requires_elder_review: row.requires_elder_review,
            elder_approval: row.elder_approval_status.parse().map_err(decode)?,
            priority: row.priority.parse().map_err(decode)?,
            featured: row.featured,
            reviewer_notes: serde_json::from_value(row.reviewer_notes)
                .map_err(|e| AppError::Internal(anyhow::anyhow!("corrupt reviewer notes: {e}")))?,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
