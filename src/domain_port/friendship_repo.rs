use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::repo_tx::StorageTx;

/// Predicate over friendship rows.
///
/// `And(vec![])` matches everything, `Or(vec![])` matches nothing.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FriendshipFilter {
    Sender(EntityRef),
    Recipient(EntityRef),
    Status(FriendshipStatus),
    And(Vec<FriendshipFilter>),
    Or(Vec<FriendshipFilter>),
}

impl FriendshipFilter {
    /// Sender is `sender` and recipient is `recipient`.
    pub fn directed(sender: &EntityRef, recipient: &EntityRef) -> Self {
        FriendshipFilter::And(vec![
            FriendshipFilter::Sender(sender.clone()),
            FriendshipFilter::Recipient(recipient.clone()),
        ])
    }

    /// The record between `a` and `b`, whichever side sent it.
    pub fn pair(a: &EntityRef, b: &EntityRef) -> Self {
        FriendshipFilter::Or(vec![Self::directed(a, b), Self::directed(b, a)])
    }

    /// Every record `entity` takes part in.
    pub fn involving(entity: &EntityRef) -> Self {
        FriendshipFilter::Or(vec![
            FriendshipFilter::Sender(entity.clone()),
            FriendshipFilter::Recipient(entity.clone()),
        ])
    }

    pub fn and(self, other: FriendshipFilter) -> Self {
        match self {
            FriendshipFilter::And(mut parts) => {
                parts.push(other);
                FriendshipFilter::And(parts)
            }
            this => FriendshipFilter::And(vec![this, other]),
        }
    }

    /// Narrows to `status` when one is given.
    pub fn with_status(self, status: Option<FriendshipStatus>) -> Self {
        match status {
            Some(status) => self.and(FriendshipFilter::Status(status)),
            None => self,
        }
    }

    pub fn matches(&self, friendship: &Friendship) -> bool {
        match self {
            FriendshipFilter::Sender(entity) => &friendship.sender == entity,
            FriendshipFilter::Recipient(entity) => &friendship.recipient == entity,
            FriendshipFilter::Status(status) => friendship.status == *status,
            FriendshipFilter::And(parts) => parts.iter().all(|p| p.matches(friendship)),
            FriendshipFilter::Or(parts) => parts.iter().any(|p| p.matches(friendship)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewFriendship {
    pub sender: EntityRef,
    pub recipient: EntityRef,
    pub status: FriendshipStatus,
}

impl NewFriendship {
    pub fn pending(sender: &EntityRef, recipient: &EntityRef) -> Self {
        NewFriendship {
            sender: sender.clone(),
            recipient: recipient.clone(),
            status: FriendshipStatus::Pending,
        }
    }
}

/// Datastore interface the friendship service is written against.
///
/// Listings come back in ascending id order.
#[async_trait::async_trait]
pub trait FriendshipRepo: Send + Sync {
    async fn insert_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        new: NewFriendship,
    ) -> Result<Friendship, FriendshipError>;

    async fn find_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        filter: &FriendshipFilter,
        page: Page,
    ) -> Result<Vec<Friendship>, FriendshipError>;

    async fn update_status_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        filter: &FriendshipFilter,
        status: FriendshipStatus,
    ) -> Result<u64, FriendshipError>;

    async fn delete_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        filter: &FriendshipFilter,
    ) -> Result<u64, FriendshipError>;

    async fn find(
        &self,
        filter: &FriendshipFilter,
        page: Page,
    ) -> Result<Vec<Friendship>, FriendshipError>;

    async fn count(&self, filter: &FriendshipFilter) -> Result<u64, FriendshipError>;
}
