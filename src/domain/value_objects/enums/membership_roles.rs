use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum MembershipRole {
    Leader,
    #[default]
    Member,
}

impl MembershipRole {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "leader" => Some(MembershipRole::Leader),
            "member" => Some(MembershipRole::Member),
            _ => None,
        }
    }
}

impl Display for MembershipRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let membership_role = match self {
            MembershipRole::Leader => "leader",
            MembershipRole::Member => "member",
        };
        write!(f, "{}", membership_role)
    }
}
