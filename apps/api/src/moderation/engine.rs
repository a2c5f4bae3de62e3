//! Review Decision Engine — the pure state-transition function at the heart
//! of content moderation.
//!
//! `apply_decision` validates a proposed decision against the record's current
//! state and the actor's role, then returns the fully transitioned record with
//! an audit note appended. On any guard failure the input is untouched and a
//! typed error is returned; there is no partial mutation and no retry.
//!
//! Guard order: input validation, then permission, then transition + gate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::content::{
    ContentRecord, ContentStatus, ElderApprovalStatus, Priority, ReviewerNote,
};
use crate::moderation::gate;
use crate::moderation::roles::{self, ActorRole};

/// One discrete action a reviewer can take on a content record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionType {
    Approve,
    Reject,
    RequestChanges,
    EscalateToElder,
    /// The dashboard historically sends this as plain "flag".
    #[serde(alias = "flag")]
    FlagContent,
    Feature,
    Unfeature,
    ElderApprove,
    ElderReject,
}

impl DecisionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionType::Approve => "approve",
            DecisionType::Reject => "reject",
            DecisionType::RequestChanges => "request_changes",
            DecisionType::EscalateToElder => "escalate_to_elder",
            DecisionType::FlagContent => "flag_content",
            DecisionType::Feature => "feature",
            DecisionType::Unfeature => "unfeature",
            DecisionType::ElderApprove => "elder_approve",
            DecisionType::ElderReject => "elder_reject",
        }
    }
}

/// A proposed decision on a content record. `actor_role` is derived from the
/// authenticated session by the caller; the engine treats it as trusted input.
#[derive(Debug, Clone)]
pub struct ReviewDecision {
    pub decision: DecisionType,
    pub actor: String,
    pub actor_role: ActorRole,
    pub reason: String,
    pub notes: String,
}

/// Applies one review decision to a record, returning the transitioned record.
///
/// Pure: the input record is never modified. Callers are responsible for
/// re-reading the record immediately before calling this and committing the
/// result with an optimistic version check, so that two concurrent decisions
/// on the same record cannot both succeed.
pub fn apply_decision(
    record: &ContentRecord,
    decision: &ReviewDecision,
    now: DateTime<Utc>,
) -> Result<ContentRecord, AppError> {
    // Every decision carries a non-empty reason and notes, validated before
    // any other guard so malformed input never reaches the transition table.
    if decision.reason.trim().is_empty() {
        return Err(AppError::Validation(
            "a review decision requires a non-empty reason".to_string(),
        ));
    }
    if decision.notes.trim().is_empty() {
        return Err(AppError::Validation(
            "a review decision requires non-empty notes".to_string(),
        ));
    }

    match decision.decision {
        DecisionType::ElderApprove | DecisionType::ElderReject => {
            if decision.actor_role != ActorRole::CommunityElder {
                return Err(AppError::ElderOnlyAction);
            }
        }
        other => {
            if !roles::may_invoke(decision.actor_role, other) {
                return Err(AppError::InsufficientPermission);
            }
        }
    }

    let mut next = record.clone();

    use ContentStatus::*;
    use DecisionType::*;

    // Flagged is review-adjacent: after `flag_content`, a record re-enters the
    // review cycle and the ordinary decisions become valid again.
    match (record.status, decision.decision) {
        (PendingReview | InReview | Flagged, Approve) => {
            // The elder gate can never be bypassed, regardless of actor role.
            if !gate::can_finalize(record) {
                return Err(AppError::ElderApprovalPending);
            }
            next.status = Published;
        }

        (PendingReview | InReview | Flagged, Reject) => {
            next.status = Rejected;
        }

        (PendingReview | InReview | Flagged, RequestChanges) => {
            next.status = Draft;
            // Sending content back to the author clears any priority escalation.
            next.priority = Priority::Medium;
        }

        (PendingReview | InReview | Flagged, EscalateToElder) => {
            if record.requires_elder_review {
                return Err(AppError::InvalidTransition(
                    "content is already escalated for elder review".to_string(),
                ));
            }
            next.status = InReview;
            next.requires_elder_review = true;
            next.elder_approval = ElderApprovalStatus::Pending;
        }

        (Archived, FlagContent) => {
            return Err(AppError::InvalidTransition(
                "archived content cannot be flagged".to_string(),
            ));
        }
        (_, FlagContent) => {
            next.status = Flagged;
            // Featured implies published, at every point in the history.
            next.featured = false;
        }

        (Published, Feature) => {
            next.featured = true;
        }
        (Published, Unfeature) => {
            next.featured = false;
        }
        (_, Feature | Unfeature) => {
            return Err(AppError::InvalidTransition(format!(
                "only published content can be featured (status is {})",
                record.status
            )));
        }

        (PendingReview | InReview | Flagged, ElderApprove) => {
            require_open_elder_gate(record)?;
            next.elder_approval = ElderApprovalStatus::Approved;
            // A record already under active review publishes on elder sign-off;
            // one still pending waits for the moderator's approve.
            if record.status == InReview {
                next.status = Published;
            }
        }

        (PendingReview | InReview | Flagged, ElderReject) => {
            require_open_elder_gate(record)?;
            next.elder_approval = ElderApprovalStatus::Rejected;
            next.status = Rejected;
        }

        (status, decision_type) => {
            return Err(AppError::InvalidTransition(format!(
                "{} is not a valid decision while content is {}",
                decision_type.as_str(),
                status
            )));
        }
    }

    next.reviewer_notes.push(ReviewerNote {
        author: decision.actor.clone(),
        author_role: decision.actor_role,
        decision: decision.decision,
        reason: decision.reason.trim().to_string(),
        notes: decision.notes.trim().to_string(),
        created_at: now,
    });
    next.updated_at = now;

    Ok(next)
}

/// Elder actions only apply to a record whose gate is open: escalated and
/// still awaiting sign-off. Anything else would let an elder action reopen a
/// settled record.
fn require_open_elder_gate(record: &ContentRecord) -> Result<(), AppError> {
    if !record.requires_elder_review || record.elder_approval != ElderApprovalStatus::Pending {
        return Err(AppError::InvalidTransition(
            "content is not awaiting elder review".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::content::{ContentType, SensitivityLevel};
    use uuid::Uuid;

    fn make_record(status: ContentStatus) -> ContentRecord {
        ContentRecord {
            id: Uuid::new_v4(),
            title: "The old crossing".to_string(),
            body: "How the river was crossed before the bridge.".to_string(),
            author: "Uncle Jim".to_string(),
            content_type: ContentType::Story,
            status,
            sensitivity: SensitivityLevel::Low,
            requires_elder_review: false,
            elder_approval: ElderApprovalStatus::NotRequired,
            priority: Priority::Medium,
            featured: false,
            reviewer_notes: vec![],
            version: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn make_gated_record(status: ContentStatus) -> ContentRecord {
        let mut record = make_record(status);
        record.sensitivity = SensitivityLevel::High;
        record.requires_elder_review = true;
        record.elder_approval = ElderApprovalStatus::Pending;
        record
    }

    fn make_decision(decision: DecisionType, role: ActorRole) -> ReviewDecision {
        ReviewDecision {
            decision,
            actor: "reviewer".to_string(),
            actor_role: role,
            reason: "routine review".to_string(),
            notes: "looks fine".to_string(),
        }
    }

    #[test]
    fn test_approve_publishes_ungated_content() {
        let record = make_record(ContentStatus::PendingReview);
        let decision = make_decision(DecisionType::Approve, ActorRole::ContentModerator);

        let next = apply_decision(&record, &decision, Utc::now()).unwrap();
        assert_eq!(next.status, ContentStatus::Published);
        assert_eq!(next.reviewer_notes.len(), 1);
        assert_eq!(next.reviewer_notes[0].decision, DecisionType::Approve);
    }

    #[test]
    fn test_approve_blocked_while_elder_approval_pending() {
        // The elder gate is inviolable regardless of who asks
        let record = make_gated_record(ContentStatus::PendingReview);
        let decision = make_decision(DecisionType::Approve, ActorRole::ContentModerator);

        let err = apply_decision(&record, &decision, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::ElderApprovalPending));
        // Pure function: the input record is untouched
        assert_eq!(record.status, ContentStatus::PendingReview);
        assert_eq!(record.elder_approval, ElderApprovalStatus::Pending);
    }

    #[test]
    fn test_elder_gate_blocks_admins_too() {
        let record = make_gated_record(ContentStatus::InReview);
        for role in [ActorRole::TenantAdmin, ActorRole::SuperAdmin] {
            let decision = make_decision(DecisionType::Approve, role);
            let err = apply_decision(&record, &decision, Utc::now()).unwrap_err();
            assert!(matches!(err, AppError::ElderApprovalPending));
        }
    }

    #[test]
    fn test_escalate_then_elder_approve_publishes() {
        // The full escalation path: moderator hands off, elder signs off
        let mut record = make_record(ContentStatus::PendingReview);
        record.sensitivity = SensitivityLevel::High;

        let escalate = make_decision(DecisionType::EscalateToElder, ActorRole::ContentModerator);
        let record = apply_decision(&record, &escalate, Utc::now()).unwrap();
        assert_eq!(record.status, ContentStatus::InReview);
        assert!(record.requires_elder_review);
        assert_eq!(record.elder_approval, ElderApprovalStatus::Pending);

        let approve = make_decision(DecisionType::ElderApprove, ActorRole::CommunityElder);
        let record = apply_decision(&record, &approve, Utc::now()).unwrap();
        assert_eq!(record.elder_approval, ElderApprovalStatus::Approved);
        assert_eq!(record.status, ContentStatus::Published);
    }

    #[test]
    fn test_elder_approve_from_pending_review_waits_for_moderator() {
        let record = make_gated_record(ContentStatus::PendingReview);
        let approve = make_decision(DecisionType::ElderApprove, ActorRole::CommunityElder);

        let record = apply_decision(&record, &approve, Utc::now()).unwrap();
        assert_eq!(record.elder_approval, ElderApprovalStatus::Approved);
        // Only in_review auto-publishes on elder sign-off
        assert_eq!(record.status, ContentStatus::PendingReview);

        let moderator_approve = make_decision(DecisionType::Approve, ActorRole::ContentModerator);
        let record = apply_decision(&record, &moderator_approve, Utc::now()).unwrap();
        assert_eq!(record.status, ContentStatus::Published);
    }

    #[test]
    fn test_elder_reject_rejects_the_record() {
        let record = make_gated_record(ContentStatus::InReview);
        let decision = make_decision(DecisionType::ElderReject, ActorRole::CommunityElder);

        let next = apply_decision(&record, &decision, Utc::now()).unwrap();
        assert_eq!(next.elder_approval, ElderApprovalStatus::Rejected);
        assert_eq!(next.status, ContentStatus::Rejected);
    }

    #[test]
    fn test_elder_actions_rejected_for_non_elders() {
        let record = make_gated_record(ContentStatus::InReview);
        for role in [
            ActorRole::ContentModerator,
            ActorRole::TenantAdmin,
            ActorRole::SuperAdmin,
        ] {
            let decision = make_decision(DecisionType::ElderApprove, role);
            let err = apply_decision(&record, &decision, Utc::now()).unwrap_err();
            assert!(matches!(err, AppError::ElderOnlyAction));
        }
    }

    #[test]
    fn test_elder_actions_need_an_open_gate() {
        // Ungated record: nothing for an elder to decide
        let record = make_record(ContentStatus::InReview);
        let decision = make_decision(DecisionType::ElderApprove, ActorRole::CommunityElder);
        let err = apply_decision(&record, &decision, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));

        // Already decided: the gate is closed
        let mut decided = make_gated_record(ContentStatus::InReview);
        decided.elder_approval = ElderApprovalStatus::Approved;
        let err = apply_decision(&decided, &decision, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }

    #[test]
    fn test_low_roles_cannot_invoke_decisions() {
        let record = make_record(ContentStatus::PendingReview);
        for role in [
            ActorRole::Guest,
            ActorRole::CommunityMember,
            ActorRole::Storyteller,
            ActorRole::CulturalReviewer,
        ] {
            let decision = make_decision(DecisionType::Approve, role);
            let err = apply_decision(&record, &decision, Utc::now()).unwrap_err();
            assert!(matches!(err, AppError::InsufficientPermission));
        }
    }

    #[test]
    fn test_feature_on_published_content() {
        // Featuring is a published-only toggle
        let record = make_record(ContentStatus::Published);
        let decision = make_decision(DecisionType::Feature, ActorRole::TenantAdmin);

        let next = apply_decision(&record, &decision, Utc::now()).unwrap();
        assert!(next.featured);
        assert_eq!(next.status, ContentStatus::Published);
    }

    #[test]
    fn test_feature_on_draft_is_invalid() {
        // Drafts have nothing to feature
        let record = make_record(ContentStatus::Draft);
        let decision = make_decision(DecisionType::Feature, ActorRole::TenantAdmin);

        let err = apply_decision(&record, &decision, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }

    #[test]
    fn test_unfeature_on_published_content() {
        let mut record = make_record(ContentStatus::Published);
        record.featured = true;
        let decision = make_decision(DecisionType::Unfeature, ActorRole::ContentModerator);

        let next = apply_decision(&record, &decision, Utc::now()).unwrap();
        assert!(!next.featured);
        assert_eq!(next.status, ContentStatus::Published);
    }

    #[test]
    fn test_empty_notes_fail_validation_before_any_mutation() {
        // Malformed input is rejected before the transition table is consulted
        let record = make_record(ContentStatus::PendingReview);
        let before = record.updated_at;
        let mut decision = make_decision(DecisionType::Approve, ActorRole::ContentModerator);
        decision.notes = "   ".to_string();

        let err = apply_decision(&record, &decision, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(record.updated_at, before);
        assert!(record.reviewer_notes.is_empty());
    }

    #[test]
    fn test_empty_reason_fails_validation() {
        let record = make_record(ContentStatus::PendingReview);
        let mut decision = make_decision(DecisionType::Reject, ActorRole::ContentModerator);
        decision.reason = String::new();

        let err = apply_decision(&record, &decision, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_request_changes_returns_to_draft_and_clears_priority() {
        let mut record = make_record(ContentStatus::InReview);
        record.priority = Priority::Urgent;
        let decision = make_decision(DecisionType::RequestChanges, ActorRole::ContentModerator);

        let next = apply_decision(&record, &decision, Utc::now()).unwrap();
        assert_eq!(next.status, ContentStatus::Draft);
        assert_eq!(next.priority, Priority::Medium);
    }

    #[test]
    fn test_flag_reenters_the_review_cycle() {
        let record = make_record(ContentStatus::Published);
        let flag = make_decision(DecisionType::FlagContent, ActorRole::ContentModerator);

        let flagged = apply_decision(&record, &flag, Utc::now()).unwrap();
        assert_eq!(flagged.status, ContentStatus::Flagged);

        // Re-review cycle: the ordinary decisions are valid again from flagged
        let reject = make_decision(DecisionType::Reject, ActorRole::ContentModerator);
        let next = apply_decision(&flagged, &reject, Utc::now()).unwrap();
        assert_eq!(next.status, ContentStatus::Rejected);
    }

    #[test]
    fn test_flag_clears_featured_so_featured_implies_published() {
        let mut record = make_record(ContentStatus::Published);
        record.featured = true;
        let flag = make_decision(DecisionType::FlagContent, ActorRole::ContentModerator);

        let flagged = apply_decision(&record, &flag, Utc::now()).unwrap();
        assert_eq!(flagged.status, ContentStatus::Flagged);
        assert!(!flagged.featured);
    }

    #[test]
    fn test_archived_content_cannot_be_flagged() {
        let record = make_record(ContentStatus::Archived);
        let flag = make_decision(DecisionType::FlagContent, ActorRole::SuperAdmin);

        let err = apply_decision(&record, &flag, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }

    #[test]
    fn test_terminal_states_only_move_through_flagging() {
        // Rejected and published records reject ordinary review decisions
        for status in [ContentStatus::Rejected, ContentStatus::Published] {
            let record = make_record(status);
            for decision_type in [
                DecisionType::Approve,
                DecisionType::Reject,
                DecisionType::RequestChanges,
                DecisionType::EscalateToElder,
            ] {
                let decision = make_decision(decision_type, ActorRole::SuperAdmin);
                let err = apply_decision(&record, &decision, Utc::now()).unwrap_err();
                assert!(
                    matches!(err, AppError::InvalidTransition(_)),
                    "{} from {} should be invalid",
                    decision_type.as_str(),
                    status
                );
            }
        }
    }

    #[test]
    fn test_double_escalation_is_invalid() {
        let record = make_gated_record(ContentStatus::InReview);
        let decision = make_decision(DecisionType::EscalateToElder, ActorRole::ContentModerator);

        let err = apply_decision(&record, &decision, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }

    #[test]
    fn test_notes_grow_by_exactly_one_per_decision() {
        let record = make_record(ContentStatus::PendingReview);
        let escalate = make_decision(DecisionType::EscalateToElder, ActorRole::ContentModerator);
        let first = apply_decision(&record, &escalate, Utc::now()).unwrap();
        assert_eq!(first.reviewer_notes.len(), 1);

        let approve = make_decision(DecisionType::ElderApprove, ActorRole::CommunityElder);
        let second = apply_decision(&first, &approve, Utc::now()).unwrap();
        assert_eq!(second.reviewer_notes.len(), 2);
        // Existing entries are never rewritten
        assert_eq!(
            second.reviewer_notes[0].created_at,
            first.reviewer_notes[0].created_at
        );
        assert_eq!(second.reviewer_notes[0].notes, first.reviewer_notes[0].notes);
    }

    #[test]
    fn test_updated_at_moves_on_every_transition() {
        let record = make_record(ContentStatus::PendingReview);
        let later = record.updated_at + chrono::Duration::seconds(30);
        let decision = make_decision(DecisionType::Reject, ActorRole::ContentModerator);

        let next = apply_decision(&record, &decision, later).unwrap();
        assert_eq!(next.updated_at, later);
    }

    #[test]
    fn test_wire_alias_flag_parses_as_flag_content() {
        let parsed: DecisionType = serde_json::from_str("\"flag\"").unwrap();
        assert_eq!(parsed, DecisionType::FlagContent);
        let parsed: DecisionType = serde_json::from_str("\"flag_content\"").unwrap();
        assert_eq!(parsed, DecisionType::FlagContent);
    }
}
