use super::util::{downcast, is_dup_key};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::{MySql, MySqlPool, QueryBuilder};

const SCHEMA: &str = include_str!("friendships.sql");

const SELECT_COLUMNS: &str = r#"
SELECT id, sender_type, sender_id, recipient_type, recipient_id, status, created_at, updated_at
FROM friendships
WHERE "#;

#[derive(sqlx::FromRow)]
struct FriendshipRow {
    id: u64,
    sender_type: String,
    sender_id: EntityId,
    recipient_type: String,
    recipient_id: EntityId,
    status: i8,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl FriendshipRow {
    fn into_friendship(self) -> Result<Friendship, FriendshipError> {
        let id = self.id;
        let status = FriendshipStatus::from_code(self.status).ok_or_else(|| {
            FriendshipError::Store(format!("friendship {id} bad status: {}", self.status))
        })?;
        let kind = |raw: String| {
            EntityKind::new(raw)
                .map_err(|e| FriendshipError::Store(format!("friendship {id} bad entity: {e}")))
        };

        Ok(Friendship {
            id: FriendshipId(id),
            sender: EntityRef {
                kind: kind(self.sender_type)?,
                id: self.sender_id,
            },
            recipient: EntityRef {
                kind: kind(self.recipient_type)?,
                id: self.recipient_id,
            },
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn push_entity(
    qb: &mut QueryBuilder<'_, MySql>,
    type_column: &str,
    id_column: &str,
    entity: &EntityRef,
) {
    qb.push("(")
        .push(type_column)
        .push(" = ")
        .push_bind(entity.kind.as_str().to_owned())
        .push(" AND ")
        .push(id_column)
        .push(" = ")
        .push_bind(entity.id)
        .push(")");
}

fn push_group(
    qb: &mut QueryBuilder<'_, MySql>,
    parts: &[FriendshipFilter],
    sep: &str,
    empty: &str,
) {
    if parts.is_empty() {
        qb.push(empty);
        return;
    }

    qb.push("(");
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            qb.push(sep);
        }
        push_filter(qb, part);
    }
    qb.push(")");
}

/// Renders `filter` as a WHERE clause body with bound parameters.
fn push_filter(qb: &mut QueryBuilder<'_, MySql>, filter: &FriendshipFilter) {
    match filter {
        FriendshipFilter::Sender(entity) => push_entity(qb, "sender_type", "sender_id", entity),
        FriendshipFilter::Recipient(entity) => {
            push_entity(qb, "recipient_type", "recipient_id", entity)
        }
        FriendshipFilter::Status(status) => {
            qb.push("status = ").push_bind(status.code());
        }
        FriendshipFilter::And(parts) => push_group(qb, parts, " AND ", "TRUE"),
        FriendshipFilter::Or(parts) => push_group(qb, parts, " OR ", "FALSE"),
    }
}

fn select_query(filter: &FriendshipFilter, page: Page) -> QueryBuilder<'static, MySql> {
    let mut qb = QueryBuilder::new(SELECT_COLUMNS);
    push_filter(&mut qb, filter);
    qb.push(" ORDER BY id");

    match (page.limit, page.offset) {
        (None, 0) => {}
        (limit, offset) => {
            // mysql has no OFFSET without LIMIT
            qb.push(" LIMIT ")
                .push_bind(limit.map(u64::from).unwrap_or(u64::MAX))
                .push(" OFFSET ")
                .push_bind(u64::from(offset));
        }
    }

    qb
}

fn into_friendships(rows: Vec<FriendshipRow>) -> Result<Vec<Friendship>, FriendshipError> {
    rows.into_iter().map(FriendshipRow::into_friendship).collect()
}

pub struct MySqlFriendshipRepo {
    pool: MySqlPool,
}

impl MySqlFriendshipRepo {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates the `friendships` table when missing.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl FriendshipRepo for MySqlFriendshipRepo {
    async fn insert_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        new: NewFriendship,
    ) -> Result<Friendship, FriendshipError> {
        let pair = EntityPair::new(&new.sender, &new.recipient)
            .ok_or(FriendshipError::SelfRelationship)?;

        let tx = downcast(tx)?;

        let res = sqlx::query(
            r#"
INSERT INTO friendships (sender_type, sender_id, recipient_type, recipient_id, status, pair_key)
VALUES (?, ?, ?, ?, ?, ?)
"#,
        )
        .bind(new.sender.kind.as_str())
        .bind(new.sender.id)
        .bind(new.recipient.kind.as_str())
        .bind(new.recipient.id)
        .bind(new.status.code())
        .bind(pair.key())
        .execute(tx.conn())
        .await;

        let id = match res {
            Ok(done) => done.last_insert_id(),
            Err(e) if is_dup_key(&e) => return Err(FriendshipError::DuplicateRelationship),
            Err(e) => return Err(FriendshipError::Store(format!("insert friendship: {e}"))),
        };

        let row = sqlx::query_as::<_, FriendshipRow>(
            r#"
SELECT id, sender_type, sender_id, recipient_type, recipient_id, status, created_at, updated_at
FROM friendships
WHERE id = ?
"#,
        )
        .bind(id)
        .fetch_one(tx.conn())
        .await
        .map_err(|e| FriendshipError::Store(format!("select inserted friendship: {e}")))?;

        row.into_friendship()
    }

    async fn find_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        filter: &FriendshipFilter,
        page: Page,
    ) -> Result<Vec<Friendship>, FriendshipError> {
        let tx = downcast(tx)?;

        let rows = select_query(filter, page)
            .build_query_as::<FriendshipRow>()
            .fetch_all(tx.conn())
            .await
            .map_err(|e| FriendshipError::Store(format!("select friendships: {e}")))?;

        into_friendships(rows)
    }

    async fn update_status_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        filter: &FriendshipFilter,
        status: FriendshipStatus,
    ) -> Result<u64, FriendshipError> {
        let tx = downcast(tx)?;

        let mut qb = QueryBuilder::<MySql>::new("UPDATE friendships SET status = ");
        qb.push_bind(status.code()).push(" WHERE ");
        push_filter(&mut qb, filter);

        let done = qb
            .build()
            .execute(tx.conn())
            .await
            .map_err(|e| FriendshipError::Store(format!("update friendship status: {e}")))?;

        Ok(done.rows_affected())
    }

    async fn delete_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        filter: &FriendshipFilter,
    ) -> Result<u64, FriendshipError> {
        let tx = downcast(tx)?;

        let mut qb = QueryBuilder::<MySql>::new("DELETE FROM friendships WHERE ");
        push_filter(&mut qb, filter);

        let done = qb
            .build()
            .execute(tx.conn())
            .await
            .map_err(|e| FriendshipError::Store(format!("delete friendship: {e}")))?;

        Ok(done.rows_affected())
    }

    async fn find(
        &self,
        filter: &FriendshipFilter,
        page: Page,
    ) -> Result<Vec<Friendship>, FriendshipError> {
        let rows = select_query(filter, page)
            .build_query_as::<FriendshipRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| FriendshipError::Store(format!("select friendships: {e}")))?;

        into_friendships(rows)
    }

    async fn count(&self, filter: &FriendshipFilter) -> Result<u64, FriendshipError> {
        let mut qb = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM friendships WHERE ");
        push_filter(&mut qb, filter);

        let count: i64 = qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| FriendshipError::Store(format!("count friendships: {e}")))?;

        Ok(count as u64)
    }
}
