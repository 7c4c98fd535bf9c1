use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum MembershipStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Invited,
}

impl MembershipStatus {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(MembershipStatus::Pending),
            "approved" => Some(MembershipStatus::Approved),
            "rejected" => Some(MembershipStatus::Rejected),
            "invited" => Some(MembershipStatus::Invited),
            _ => None,
        }
    }
}

impl Display for MembershipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let membership_status = match self {
            MembershipStatus::Pending => "pending",
            MembershipStatus::Approved => "approved",
            MembershipStatus::Rejected => "rejected",
            MembershipStatus::Invited => "invited",
        };
        write!(f, "{}", membership_status)
    }
}
