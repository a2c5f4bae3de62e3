//! Cultural Sensitivity Gate — pure predicates consulted by the review engine.
//!
//! The gate never mutates state. High-sensitivity content is always gated;
//! lower-sensitivity content is gated only when a moderator has explicitly
//! escalated it (`requires_elder_review`).

use crate::models::content::{ContentRecord, ElderApprovalStatus, SensitivityLevel};

/// True if the record must carry elder sign-off before it can be finalized.
pub fn requires_gate(record: &ContentRecord) -> bool {
    record.sensitivity == SensitivityLevel::High || record.requires_elder_review
}

/// True iff the record is not gated, or the elder sign-off has been obtained.
pub fn can_finalize(record: &ContentRecord) -> bool {
    !requires_gate(record) || record.elder_approval == ElderApprovalStatus::Approved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::content::{ContentStatus, ContentType, Priority};
    use chrono::Utc;
    use uuid::Uuid;

    fn record(
        sensitivity: SensitivityLevel,
        requires_elder_review: bool,
        elder_approval: ElderApprovalStatus,
    ) -> ContentRecord {
        ContentRecord {
            id: Uuid::new_v4(),
            title: "title".to_string(),
            body: "body".to_string(),
            author: "author".to_string(),
            content_type: ContentType::Story,
            status: ContentStatus::PendingReview,
            sensitivity,
            requires_elder_review,
            elder_approval,
            priority: Priority::Medium,
            featured: false,
            reviewer_notes: vec![],
            version: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_high_sensitivity_is_always_gated() {
        let r = record(SensitivityLevel::High, false, ElderApprovalStatus::Pending);
        assert!(requires_gate(&r));
        assert!(!can_finalize(&r));
    }

    #[test]
    fn test_explicit_escalation_gates_any_sensitivity() {
        // Medium sensitivity, but a moderator escalated it
        let r = record(SensitivityLevel::Medium, true, ElderApprovalStatus::Pending);
        assert!(requires_gate(&r));
        assert!(!can_finalize(&r));

        let low = record(SensitivityLevel::Low, true, ElderApprovalStatus::Pending);
        assert!(requires_gate(&low));
    }

    #[test]
    fn test_ungated_content_can_finalize() {
        let r = record(
            SensitivityLevel::Low,
            false,
            ElderApprovalStatus::NotRequired,
        );
        assert!(!requires_gate(&r));
        assert!(can_finalize(&r));
    }

    #[test]
    fn test_approved_sign_off_unlocks_the_gate() {
        let r = record(SensitivityLevel::High, true, ElderApprovalStatus::Approved);
        assert!(requires_gate(&r));
        assert!(can_finalize(&r));
    }

    #[test]
    fn test_rejected_sign_off_keeps_the_gate_closed() {
        let r = record(SensitivityLevel::High, true, ElderApprovalStatus::Rejected);
        assert!(!can_finalize(&r));
    }
}
