use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Arc;
use tracing::{debug, info};

pub struct RealFriendshipService {
    friendship_repo: Arc<dyn FriendshipRepo>,
    tx_manager: Arc<dyn TxManager>,
}

impl RealFriendshipService {
    pub fn new(
        friendship_repo: Arc<dyn FriendshipRepo>,
        tx_manager: Arc<dyn TxManager>,
    ) -> RealFriendshipService {
        RealFriendshipService {
            friendship_repo,
            tx_manager,
        }
    }

    async fn begin(&self) -> Result<Box<dyn StorageTx<'_> + '_>, FriendshipError> {
        self.tx_manager
            .begin()
            .await
            .map_err(|e| FriendshipError::Store(e.to_string()))
    }

    async fn set_status(
        &self,
        actor: &EntityRef,
        target: &EntityRef,
        status: FriendshipStatus,
    ) -> Result<Friendship, FriendshipError> {
        debug!(%actor, %target, %status, "set friendship status");
        let filter = FriendshipFilter::pair(actor, target);
        let first = Page::new(Some(1), 0);

        let mut tx = self.begin().await?;

        // check first: mysql reports 0 affected rows when the status is unchanged
        let existing = self
            .friendship_repo
            .find_in_tx(&mut *tx, &filter, first)
            .await?;
        if existing.is_empty() {
            return Err(FriendshipError::RelationshipNotFound);
        }

        self.friendship_repo
            .update_status_in_tx(&mut *tx, &filter, status)
            .await?;
        let friendship = self
            .friendship_repo
            .find_in_tx(&mut *tx, &filter, first)
            .await?
            .into_iter()
            .next()
            .ok_or(FriendshipError::RelationshipNotFound)?;

        tx.commit()
            .await
            .map_err(|e| FriendshipError::Store(e.to_string()))?;

        info!(id = %friendship.id, %status, "friendship status changed");
        Ok(friendship)
    }
}

#[async_trait::async_trait]
impl FriendshipService for RealFriendshipService {
    async fn befriend(
        &self,
        actor: &EntityRef,
        target: &EntityRef,
    ) -> Result<Friendship, FriendshipError> {
        debug!(%actor, %target, "befriend");
        EntityPair::new(actor, target).ok_or(FriendshipError::SelfRelationship)?;

        let mut tx = self.begin().await?;

        let existing = self
            .friendship_repo
            .find_in_tx(
                &mut *tx,
                &FriendshipFilter::pair(actor, target),
                Page::new(Some(1), 0),
            )
            .await?;
        if !existing.is_empty() {
            tx.rollback()
                .await
                .map_err(|e| FriendshipError::Store(e.to_string()))?;
            return Err(FriendshipError::DuplicateRelationship);
        }

        let friendship = self
            .friendship_repo
            .insert_in_tx(&mut *tx, NewFriendship::pending(actor, target))
            .await?;

        tx.commit()
            .await
            .map_err(|e| FriendshipError::Store(e.to_string()))?;

        info!(id = %friendship.id, sender = %actor, recipient = %target, "friend request sent");
        Ok(friendship)
    }

    async fn unfriend(
        &self,
        actor: &EntityRef,
        target: &EntityRef,
    ) -> Result<(), FriendshipError> {
        debug!(%actor, %target, "unfriend");
        let mut tx = self.begin().await?;

        let deleted = self
            .friendship_repo
            .delete_in_tx(&mut *tx, &FriendshipFilter::pair(actor, target))
            .await?;
        if deleted == 0 {
            return Err(FriendshipError::RelationshipNotFound);
        }

        tx.commit()
            .await
            .map_err(|e| FriendshipError::Store(e.to_string()))?;

        info!(%actor, %target, "friendship removed");
        Ok(())
    }

    async fn is_friends_with(
        &self,
        actor: &EntityRef,
        target: &EntityRef,
        status: Option<FriendshipStatus>,
    ) -> Result<bool, FriendshipError> {
        let filter = FriendshipFilter::pair(actor, target).with_status(status);
        Ok(self.friendship_repo.count(&filter).await? > 0)
    }

    async fn accept_friend_request(
        &self,
        actor: &EntityRef,
        target: &EntityRef,
    ) -> Result<Friendship, FriendshipError> {
        self.set_status(actor, target, FriendshipStatus::Accepted)
            .await
    }

    async fn deny_friend_request(
        &self,
        actor: &EntityRef,
        target: &EntityRef,
    ) -> Result<Friendship, FriendshipError> {
        self.set_status(actor, target, FriendshipStatus::Denied)
            .await
    }

    async fn block_friend_request(
        &self,
        actor: &EntityRef,
        target: &EntityRef,
    ) -> Result<Friendship, FriendshipError> {
        self.set_status(actor, target, FriendshipStatus::Blocked)
            .await
    }

    async fn unblock_friend_request(
        &self,
        actor: &EntityRef,
        target: &EntityRef,
    ) -> Result<Friendship, FriendshipError> {
        self.set_status(actor, target, FriendshipStatus::Pending)
            .await
    }

    async fn get_friendship(
        &self,
        actor: &EntityRef,
        target: &EntityRef,
    ) -> Result<Option<Friendship>, FriendshipError> {
        let found = self
            .friendship_repo
            .find(
                &FriendshipFilter::pair(actor, target),
                Page::new(Some(1), 0),
            )
            .await?;
        Ok(found.into_iter().next())
    }

    async fn get_friendships(
        &self,
        actor: &EntityRef,
        status: Option<FriendshipStatus>,
        page: Page,
    ) -> Result<Vec<EntityRef>, FriendshipError> {
        let filter = FriendshipFilter::involving(actor).with_status(status);
        let friendships = self.friendship_repo.find(&filter, page).await?;

        Ok(friendships
            .iter()
            .map(|f| f.counterpart(actor).clone())
            .collect())
    }

    async fn has_blocked(
        &self,
        actor: &EntityRef,
        target: &EntityRef,
    ) -> Result<bool, FriendshipError> {
        Ok(self
            .get_friendship(actor, target)
            .await?
            .is_some_and(|f| f.status == FriendshipStatus::Blocked))
    }

    async fn is_blocked_by(
        &self,
        actor: &EntityRef,
        target: &EntityRef,
    ) -> Result<bool, FriendshipError> {
        let found = self
            .friendship_repo
            .find(
                &FriendshipFilter::directed(actor, target),
                Page::new(Some(1), 0),
            )
            .await?;
        Ok(found
            .first()
            .is_some_and(|f| f.status == FriendshipStatus::Blocked))
    }

    async fn get_friend_requests(
        &self,
        actor: &EntityRef,
    ) -> Result<Vec<Friendship>, FriendshipError> {
        let filter = FriendshipFilter::Recipient(actor.clone())
            .and(FriendshipFilter::Status(FriendshipStatus::Pending));
        self.friendship_repo.find(&filter, Page::all()).await
    }

    async fn get_sent_friendships(
        &self,
        actor: &EntityRef,
        page: Page,
    ) -> Result<Vec<Friendship>, FriendshipError> {
        self.friendship_repo
            .find(&FriendshipFilter::Sender(actor.clone()), page)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra_memory::*;

    fn service() -> RealFriendshipService {
        let store = Arc::new(MemoryStore::new());
        RealFriendshipService::new(
            Arc::new(MemoryFriendshipRepo::new(store.clone())),
            Arc::new(MemoryTxManager::new(store)),
        )
    }

    fn user(n: u128) -> EntityRef {
        EntityRef::new("User", uuid::Uuid::from_u128(n)).unwrap()
    }

    #[tokio::test]
    async fn befriend_creates_pending_unordered_relationship() {
        let svc = service();
        let (a, b) = (user(1), user(2));

        let created = svc.befriend(&a, &b).await.unwrap();
        assert_eq!(created.sender, a);
        assert_eq!(created.recipient, b);
        assert_eq!(created.status, FriendshipStatus::Pending);

        assert!(svc.is_friends_with(&a, &b, None).await.unwrap());
        assert!(svc.is_friends_with(&b, &a, None).await.unwrap());
        assert!(
            svc.is_friends_with(&b, &a, Some(FriendshipStatus::Pending))
                .await
                .unwrap()
        );
        assert!(
            !svc.is_friends_with(&a, &b, Some(FriendshipStatus::Accepted))
                .await
                .unwrap()
        );

        let found = svc.get_friendship(&b, &a).await.unwrap().unwrap();
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn befriend_twice_keeps_a_single_record() {
        let svc = service();
        let (a, b) = (user(1), user(2));

        svc.befriend(&a, &b).await.unwrap();
        let err = svc.befriend(&b, &a).await.unwrap_err();
        assert!(matches!(err, FriendshipError::DuplicateRelationship));

        let err = svc.befriend(&a, &b).await.unwrap_err();
        assert!(matches!(err, FriendshipError::DuplicateRelationship));

        assert_eq!(svc.get_all_friendships(&a, Page::all()).await.unwrap(), vec![b.clone()]);
        assert_eq!(svc.get_all_friendships(&b, Page::all()).await.unwrap(), vec![a]);
    }

    #[tokio::test]
    async fn befriend_self_is_rejected() {
        let svc = service();
        let a = user(1);

        let err = svc.befriend(&a, &a).await.unwrap_err();
        assert!(matches!(err, FriendshipError::SelfRelationship));
        assert!(svc.get_all_friendships(&a, Page::all()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn accept_clears_incoming_request() {
        let svc = service();
        let (a, b) = (user(1), user(2));

        svc.befriend(&a, &b).await.unwrap();
        let requests = svc.get_friend_requests(&b).await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].sender, a);
        assert!(svc.get_friend_requests(&a).await.unwrap().is_empty());

        let accepted = svc.accept_friend_request(&a, &b).await.unwrap();
        assert_eq!(accepted.status, FriendshipStatus::Accepted);
        assert!(svc.get_friend_requests(&b).await.unwrap().is_empty());
        assert_eq!(
            svc.get_accepted_friendships(&b, Page::all()).await.unwrap(),
            vec![a]
        );
    }

    #[tokio::test]
    async fn transitions_overwrite_any_prior_status() {
        let svc = service();
        let (a, b) = (user(1), user(2));
        svc.befriend(&a, &b).await.unwrap();

        let blocked = svc.block_friend_request(&b, &a).await.unwrap();
        assert_eq!(blocked.status, FriendshipStatus::Blocked);

        // accepting a blocked relationship is allowed
        let accepted = svc.accept_friend_request(&b, &a).await.unwrap();
        assert_eq!(accepted.status, FriendshipStatus::Accepted);

        let denied = svc.deny_friend_request(&a, &b).await.unwrap();
        assert_eq!(denied.status, FriendshipStatus::Denied);

        let pending = svc.unblock_friend_request(&a, &b).await.unwrap();
        assert_eq!(pending.status, FriendshipStatus::Pending);

        // same status twice still succeeds
        let pending = svc.unblock_friend_request(&a, &b).await.unwrap();
        assert_eq!(pending.status, FriendshipStatus::Pending);
        assert_eq!(pending.sender, a);
        assert_eq!(pending.recipient, b);
    }

    #[tokio::test]
    async fn mutations_on_missing_pair_are_not_found() {
        let svc = service();
        let (a, b) = (user(1), user(2));

        for result in [
            svc.accept_friend_request(&a, &b).await,
            svc.deny_friend_request(&a, &b).await,
            svc.block_friend_request(&a, &b).await,
            svc.unblock_friend_request(&a, &b).await,
        ] {
            assert!(matches!(result, Err(FriendshipError::RelationshipNotFound)));
        }
        assert!(matches!(
            svc.unfriend(&a, &b).await,
            Err(FriendshipError::RelationshipNotFound)
        ));
        assert!(!svc.has_blocked(&a, &b).await.unwrap());
        assert!(!svc.is_blocked_by(&a, &b).await.unwrap());
        assert!(svc.get_friendship(&a, &b).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unfriend_removes_any_status() {
        let svc = service();
        let (a, b) = (user(1), user(2));

        svc.befriend(&a, &b).await.unwrap();
        svc.block_friend_request(&a, &b).await.unwrap();
        svc.unfriend(&b, &a).await.unwrap();

        assert!(!svc.is_friends_with(&a, &b, None).await.unwrap());
        assert!(svc.get_friendship(&a, &b).await.unwrap().is_none());

        // the pair can start over
        svc.befriend(&b, &a).await.unwrap();
        assert!(svc.is_friends_with(&a, &b, None).await.unwrap());
    }

    #[tokio::test]
    async fn blocking_is_seen_from_both_predicates() {
        let svc = service();
        let (a, b) = (user(1), user(2));

        svc.befriend(&a, &b).await.unwrap();
        svc.block_friend_request(&b, &a).await.unwrap();

        assert!(svc.is_blocked_by(&a, &b).await.unwrap());
        assert!(svc.has_blocked(&b, &a).await.unwrap());
        assert!(svc.has_blocked(&a, &b).await.unwrap());
        // directional: no record was sent from b to a
        assert!(!svc.is_blocked_by(&b, &a).await.unwrap());
    }

    #[tokio::test]
    async fn status_listings_partition_relationships() {
        let svc = service();
        let a = user(1);
        let (p, x, d, k) = (user(2), user(3), user(4), user(5));

        svc.befriend(&a, &p).await.unwrap();
        svc.befriend(&x, &a).await.unwrap();
        svc.befriend(&a, &d).await.unwrap();
        svc.befriend(&k, &a).await.unwrap();
        svc.accept_friend_request(&a, &x).await.unwrap();
        svc.deny_friend_request(&a, &d).await.unwrap();
        svc.block_friend_request(&a, &k).await.unwrap();

        let all = Page::all();
        assert_eq!(svc.get_pending_friendships(&a, all).await.unwrap(), vec![p.clone()]);
        assert_eq!(svc.get_accepted_friendships(&a, all).await.unwrap(), vec![x.clone()]);
        assert_eq!(svc.get_denied_friendships(&a, all).await.unwrap(), vec![d.clone()]);
        assert_eq!(svc.get_blocked_friendships(&a, all).await.unwrap(), vec![k.clone()]);
        assert_eq!(
            svc.get_all_friendships(&a, all).await.unwrap(),
            vec![p, x, d, k]
        );
    }

    #[tokio::test]
    async fn pagination_windows_the_full_listing() {
        let svc = service();
        let a = user(1);
        for n in 2..=5 {
            svc.befriend(&a, &user(n)).await.unwrap();
        }

        let full = svc.get_all_friendships(&a, Page::all()).await.unwrap();
        assert_eq!(full.len(), 4);

        let window = svc
            .get_all_friendships(&a, Page::new(Some(2), 1))
            .await
            .unwrap();
        assert_eq!(window, full[1..3].to_vec());

        let tail = svc
            .get_all_friendships(&a, Page::new(None, 3))
            .await
            .unwrap();
        assert_eq!(tail, full[3..].to_vec());
    }

    #[tokio::test]
    async fn polymorphic_entities_are_distinct() {
        let svc = service();
        let id = uuid::Uuid::from_u128(9);
        let person = EntityRef::new("User", id).unwrap();
        let org = EntityRef::new("Organization", id).unwrap();
        let other = user(1);

        svc.befriend(&other, &org).await.unwrap();

        assert!(svc.is_friends_with(&other, &org, None).await.unwrap());
        assert!(!svc.is_friends_with(&other, &person, None).await.unwrap());
        // same id, different kind: not the same entity
        svc.befriend(&person, &org).await.unwrap();
        assert_eq!(
            svc.get_all_friendships(&org, Page::all()).await.unwrap(),
            vec![other, person]
        );
    }

    #[tokio::test]
    async fn kinds_containing_separators_do_not_collide() {
        let svc = service();
        let u = |n| uuid::Uuid::from_u128(n);
        let entity = |kind: String, id| EntityRef::new(kind, id).unwrap();

        let k1 = entity("K".into(), u(1));
        let l2m = entity(format!("L:{}|M", u(2)), u(3));
        let k1l = entity(format!("K:{}|L", u(1)), u(2));
        let m3 = entity("M".into(), u(3));

        svc.befriend(&k1, &l2m).await.unwrap();
        svc.befriend(&k1l, &m3).await.unwrap();

        assert!(svc.is_friends_with(&m3, &k1l, None).await.unwrap());
        assert_eq!(svc.get_all_friendships(&k1, Page::all()).await.unwrap(), vec![l2m]);
    }

    #[tokio::test]
    async fn sent_friendships_only_lists_initiated_records() {
        let svc = service();
        let (a, b, c) = (user(1), user(2), user(3));

        svc.befriend(&a, &b).await.unwrap();
        svc.befriend(&c, &a).await.unwrap();
        svc.accept_friend_request(&a, &b).await.unwrap();

        let sent = svc.get_sent_friendships(&a, Page::all()).await.unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, b);
        assert_eq!(sent[0].status, FriendshipStatus::Accepted);
    }
}
