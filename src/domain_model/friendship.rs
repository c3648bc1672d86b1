use crate::domain_model::EntityRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct FriendshipId(pub u64);

impl fmt::Display for FriendshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
    Denied,
    Blocked,
}

impl FriendshipStatus {
    pub const ALL: [FriendshipStatus; 4] = [
        FriendshipStatus::Pending,
        FriendshipStatus::Accepted,
        FriendshipStatus::Denied,
        FriendshipStatus::Blocked,
    ];

    /// Persisted representation.
    pub fn code(self) -> i8 {
        match self {
            FriendshipStatus::Pending => 0,
            FriendshipStatus::Accepted => 1,
            FriendshipStatus::Denied => 2,
            FriendshipStatus::Blocked => 3,
        }
    }

    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            0 => Some(FriendshipStatus::Pending),
            1 => Some(FriendshipStatus::Accepted),
            2 => Some(FriendshipStatus::Denied),
            3 => Some(FriendshipStatus::Blocked),
            _ => None,
        }
    }
}

impl fmt::Display for FriendshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FriendshipStatus::Pending => "pending",
            FriendshipStatus::Accepted => "accepted",
            FriendshipStatus::Denied => "denied",
            FriendshipStatus::Blocked => "blocked",
        };
        f.write_str(s)
    }
}

impl FromStr for FriendshipStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(FriendshipStatus::Pending),
            "accepted" => Ok(FriendshipStatus::Accepted),
            "denied" => Ok(FriendshipStatus::Denied),
            "blocked" => Ok(FriendshipStatus::Blocked),
            other => Err(format!("unknown friendship status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Friendship {
    pub id: FriendshipId,
    pub sender: EntityRef,
    pub recipient: EntityRef,
    pub status: FriendshipStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Friendship {
    pub fn involves(&self, entity: &EntityRef) -> bool {
        &self.sender == entity || &self.recipient == entity
    }

    /// The other side of the relationship as seen from `entity`.
    pub fn counterpart(&self, entity: &EntityRef) -> &EntityRef {
        if &self.sender == entity {
            &self.recipient
        } else {
            &self.sender
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_are_stable() {
        for status in FriendshipStatus::ALL {
            assert_eq!(FriendshipStatus::from_code(status.code()), Some(status));
            assert_eq!(status.to_string().parse::<FriendshipStatus>(), Ok(status));
        }
        assert_eq!(FriendshipStatus::Blocked.code(), 3);
        assert_eq!(FriendshipStatus::from_code(4), None);
    }

    #[test]
    fn counterpart_picks_the_other_side() {
        let a = EntityRef::new("User", uuid::Uuid::from_u128(1)).unwrap();
        let b = EntityRef::new("User", uuid::Uuid::from_u128(2)).unwrap();
        let now = Utc::now();
        let friendship = Friendship {
            id: FriendshipId(1),
            sender: a.clone(),
            recipient: b.clone(),
            status: FriendshipStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        assert_eq!(friendship.counterpart(&a), &b);
        assert_eq!(friendship.counterpart(&b), &a);
        assert!(friendship.involves(&a));
    }
}
