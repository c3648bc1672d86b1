use crate::domain_model::*;

#[derive(Debug, thiserror::Error)]
pub enum FriendshipError {
    #[error("relationship not found")]
    RelationshipNotFound,
    #[error("relationship already exists")]
    DuplicateRelationship,
    #[error("an entity cannot befriend itself")]
    SelfRelationship,
    #[error("store error: {0}")]
    Store(String),
}

/// Relationship operations between two friendable entities.
///
/// Mutations on a pair with no record fail with
/// [`FriendshipError::RelationshipNotFound`]; predicates answer `false`.
#[async_trait::async_trait]
pub trait FriendshipService: Send + Sync {
    /// Sends a friend request from `actor` to `target`.
    async fn befriend(
        &self,
        actor: &EntityRef,
        target: &EntityRef,
    ) -> Result<Friendship, FriendshipError>;

    /// Removes the relationship whatever its status.
    async fn unfriend(&self, actor: &EntityRef, target: &EntityRef)
    -> Result<(), FriendshipError>;

    async fn is_friends_with(
        &self,
        actor: &EntityRef,
        target: &EntityRef,
        status: Option<FriendshipStatus>,
    ) -> Result<bool, FriendshipError>;

    async fn accept_friend_request(
        &self,
        actor: &EntityRef,
        target: &EntityRef,
    ) -> Result<Friendship, FriendshipError>;

    async fn deny_friend_request(
        &self,
        actor: &EntityRef,
        target: &EntityRef,
    ) -> Result<Friendship, FriendshipError>;

    async fn block_friend_request(
        &self,
        actor: &EntityRef,
        target: &EntityRef,
    ) -> Result<Friendship, FriendshipError>;

    /// Puts the relationship back to pending.
    async fn unblock_friend_request(
        &self,
        actor: &EntityRef,
        target: &EntityRef,
    ) -> Result<Friendship, FriendshipError>;

    async fn get_friendship(
        &self,
        actor: &EntityRef,
        target: &EntityRef,
    ) -> Result<Option<Friendship>, FriendshipError>;

    /// Counterparts of `actor`, optionally narrowed to one status.
    async fn get_friendships(
        &self,
        actor: &EntityRef,
        status: Option<FriendshipStatus>,
        page: Page,
    ) -> Result<Vec<EntityRef>, FriendshipError>;

    async fn get_all_friendships(
        &self,
        actor: &EntityRef,
        page: Page,
    ) -> Result<Vec<EntityRef>, FriendshipError> {
        self.get_friendships(actor, None, page).await
    }

    async fn get_pending_friendships(
        &self,
        actor: &EntityRef,
        page: Page,
    ) -> Result<Vec<EntityRef>, FriendshipError> {
        self.get_friendships(actor, Some(FriendshipStatus::Pending), page)
            .await
    }

    async fn get_accepted_friendships(
        &self,
        actor: &EntityRef,
        page: Page,
    ) -> Result<Vec<EntityRef>, FriendshipError> {
        self.get_friendships(actor, Some(FriendshipStatus::Accepted), page)
            .await
    }

    async fn get_denied_friendships(
        &self,
        actor: &EntityRef,
        page: Page,
    ) -> Result<Vec<EntityRef>, FriendshipError> {
        self.get_friendships(actor, Some(FriendshipStatus::Denied), page)
            .await
    }

    async fn get_blocked_friendships(
        &self,
        actor: &EntityRef,
        page: Page,
    ) -> Result<Vec<EntityRef>, FriendshipError> {
        self.get_friendships(actor, Some(FriendshipStatus::Blocked), page)
            .await
    }

    async fn has_blocked(
        &self,
        actor: &EntityRef,
        target: &EntityRef,
    ) -> Result<bool, FriendshipError>;

    /// Looks only at the record sent by `actor` to `target`.
    async fn is_blocked_by(
        &self,
        actor: &EntityRef,
        target: &EntityRef,
    ) -> Result<bool, FriendshipError>;

    /// Pending requests addressed to `actor`.
    async fn get_friend_requests(
        &self,
        actor: &EntityRef,
    ) -> Result<Vec<Friendship>, FriendshipError>;

    /// Records `actor` initiated, any status.
    async fn get_sent_friendships(
        &self,
        actor: &EntityRef,
        page: Page,
    ) -> Result<Vec<Friendship>, FriendshipError>;
}
