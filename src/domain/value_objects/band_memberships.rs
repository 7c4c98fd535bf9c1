use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::band_members::BandMemberEntity;
use crate::domain::value_objects::enums::membership_roles::MembershipRole;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequestModel {
    pub name: String,
    pub instruments: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteMemberModel {
    pub profile_id: Uuid,
    pub name: String,
    pub instrument: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BandMemberDto {
    pub membership_id: Uuid,
    pub profile_id: Uuid,
    pub name: String,
    pub instrument: String,
    pub role: String,
    pub status: String,
    pub display_order: i32,
}

impl From<BandMemberEntity> for BandMemberDto {
    fn from(entity: BandMemberEntity) -> Self {
        Self {
            membership_id: entity.id,
            profile_id: entity.profile_id,
            name: entity.name,
            instrument: entity.instrument,
            role: entity.role,
            status: entity.status,
            display_order: entity.display_order,
        }
    }
}

/// What the viewing profile is to a band. Drives the join-request UI:
/// `pending` renders "Request Pending", `rejected` renders "Request
/// Declined", `leader` renders the management link.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ViewerMembership {
    None,
    Pending,
    Approved,
    Rejected,
    Invited,
    Leader,
}

impl ViewerMembership {
    pub fn from_membership(entity: &BandMemberEntity) -> Self {
        if MembershipRole::from_str(&entity.role) == Some(MembershipRole::Leader)
            && entity.status == "approved"
        {
            return ViewerMembership::Leader;
        }

        match entity.status.as_str() {
            "pending" => ViewerMembership::Pending,
            "approved" => ViewerMembership::Approved,
            "rejected" => ViewerMembership::Rejected,
            "invited" => ViewerMembership::Invited,
            _ => ViewerMembership::None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerMembershipDto {
    pub status: ViewerMembership,
}
