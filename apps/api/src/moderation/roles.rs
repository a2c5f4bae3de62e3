//! Actor roles and the decision capability table.
//!
//! Roles form an explicit ordered enumeration; what each role may do is a
//! single lookup here rather than string comparisons scattered through
//! handlers. Elder decisions are reserved for `CommunityElder` exactly —
//! admins cannot stand in for an elder.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::moderation::engine::DecisionType;

/// Roles an authenticated actor can hold, lowest privilege first.
/// The role arrives as a derived, trusted input from the auth layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Guest,
    CommunityMember,
    Storyteller,
    CulturalReviewer,
    ContentModerator,
    CommunityElder,
    TenantAdmin,
    SuperAdmin,
}

impl ActorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorRole::Guest => "guest",
            ActorRole::CommunityMember => "community_member",
            ActorRole::Storyteller => "storyteller",
            ActorRole::CulturalReviewer => "cultural_reviewer",
            ActorRole::ContentModerator => "content_moderator",
            ActorRole::CommunityElder => "community_elder",
            ActorRole::TenantAdmin => "tenant_admin",
            ActorRole::SuperAdmin => "super_admin",
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActorRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "guest" => ActorRole::Guest,
            "community_member" => ActorRole::CommunityMember,
            "storyteller" => ActorRole::Storyteller,
            "cultural_reviewer" => ActorRole::CulturalReviewer,
            "content_moderator" => ActorRole::ContentModerator,
            "community_elder" => ActorRole::CommunityElder,
            "tenant_admin" => ActorRole::TenantAdmin,
            "super_admin" => ActorRole::SuperAdmin,
            other => return Err(format!("unknown actor role '{other}'")),
        })
    }
}

/// Whether `role` may invoke `decision` at all.
///
/// Elder decisions are checked separately by the engine so it can report
/// `ElderOnlyAction` instead of the generic permission error.
pub fn may_invoke(role: ActorRole, decision: DecisionType) -> bool {
    match decision {
        DecisionType::ElderApprove | DecisionType::ElderReject => {
            role == ActorRole::CommunityElder
        }
        _ => matches!(
            role,
            ActorRole::ContentModerator
                | ActorRole::CommunityElder
                | ActorRole::TenantAdmin
                | ActorRole::SuperAdmin
        ),
    }
}

/// Whether the role can see the moderation queue at all.
pub fn can_view_queue(role: ActorRole) -> bool {
    matches!(
        role,
        ActorRole::CulturalReviewer
            | ActorRole::ContentModerator
            | ActorRole::CommunityElder
            | ActorRole::TenantAdmin
            | ActorRole::SuperAdmin
    )
}

/// Whether the role may see elder-gated items that are still pending.
/// Plain moderators and cultural reviewers may not; elders and admins may.
pub fn sees_gated_pending(role: ActorRole) -> bool {
    matches!(
        role,
        ActorRole::CommunityElder | ActorRole::TenantAdmin | ActorRole::SuperAdmin
    )
}
