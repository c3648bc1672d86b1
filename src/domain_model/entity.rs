use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum InvalidEntity {
    #[error("entity kind must not be empty")]
    EmptyKind,
    #[error("invalid entity format, expected Kind:uuid")]
    Format,
    #[error("invalid entity id: {0}")]
    Id(#[from] uuid::Error),
}

/// Type discriminator of a friendable entity, e.g. `User` or `Organization`.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityKind(String);

impl EntityKind {
    pub fn new(kind: impl Into<String>) -> Result<Self, InvalidEntity> {
        let kind = kind.into();
        if kind.is_empty() {
            return Err(InvalidEntity::EmptyKind);
        }
        Ok(EntityKind(kind))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EntityKind {
    type Error = InvalidEntity;

    fn try_from(kind: String) -> Result<Self, Self::Error> {
        EntityKind::new(kind)
    }
}

impl From<EntityKind> for String {
    fn from(kind: EntityKind) -> Self {
        kind.0
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct EntityId(pub uuid::Uuid);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::from_str(s).map(EntityId)
    }
}

/// Polymorphic reference to one side of a friendship.
///
/// Ordering is `(kind, id)`, which is what [`EntityPair`] canonicalises on.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: EntityId,
}

impl EntityRef {
    pub fn new(kind: impl Into<String>, id: uuid::Uuid) -> Result<Self, InvalidEntity> {
        Ok(EntityRef {
            kind: EntityKind::new(kind)?,
            id: EntityId(id),
        })
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

impl FromStr for EntityRef {
    type Err = InvalidEntity;

    /// Parses `Kind:uuid`. The id never holds a colon, so the kind may.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s.rsplit_once(':').ok_or(InvalidEntity::Format)?;
        let id = id.parse::<uuid::Uuid>()?;

        EntityRef::new(kind, id)
    }
}

/// Anything that can take part in a friendship.
pub trait Friendable {
    fn entity_ref(&self) -> EntityRef;
}

impl Friendable for EntityRef {
    fn entity_ref(&self) -> EntityRef {
        self.clone()
    }
}

/// Unordered pair of distinct entities, stored smaller side first.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct EntityPair(EntityRef, EntityRef);

impl EntityPair {
    /// Returns `None` when both sides are the same entity.
    pub fn new(a: &EntityRef, b: &EntityRef) -> Option<Self> {
        match a.cmp(b) {
            std::cmp::Ordering::Less => Some(Self(a.clone(), b.clone())),
            std::cmp::Ordering::Greater => Some(Self(b.clone(), a.clone())),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn min(&self) -> &EntityRef {
        &self.0
    }

    pub fn max(&self) -> &EntityRef {
        &self.1
    }

    /// Canonical key backing the one-record-per-pair uniqueness.
    ///
    /// Each kind is length-prefixed, so separators inside a kind cannot
    /// make two pairs share a key.
    pub fn key(&self) -> String {
        let side = |e: &EntityRef| format!("{}:{}:{}", e.kind.as_str().len(), e.kind, e.id);
        format!("{}|{}", side(&self.0), side(&self.1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(n: u128) -> EntityRef {
        EntityRef::new("User", uuid::Uuid::from_u128(n)).unwrap()
    }

    #[test]
    fn parses_and_displays_entity_ref() {
        let raw = "Organization:00000000-0000-0000-0000-00000000002a";
        let entity: EntityRef = raw.parse().unwrap();

        assert_eq!(entity.kind.as_str(), "Organization");
        assert_eq!(entity.id, EntityId(uuid::Uuid::from_u128(42)));
        assert_eq!(entity.to_string(), raw);
    }

    #[test]
    fn rejects_malformed_entity_ref() {
        assert!("User".parse::<EntityRef>().is_err());
        assert!(":00000000-0000-0000-0000-00000000002a".parse::<EntityRef>().is_err());
        assert!("User:not-a-uuid".parse::<EntityRef>().is_err());
    }

    #[test]
    fn pair_is_unordered() {
        let a = user(1);
        let b = user(2);

        let ab = EntityPair::new(&a, &b).unwrap();
        let ba = EntityPair::new(&b, &a).unwrap();

        assert_eq!(ab, ba);
        assert_eq!(ab.key(), ba.key());
        assert_eq!(ab.min(), &a);
        assert_eq!(ab.max(), &b);
    }

    #[test]
    fn pair_distinguishes_kinds_with_same_id() {
        let id = uuid::Uuid::from_u128(7);
        let u = EntityRef::new("User", id).unwrap();
        let o = EntityRef::new("Organization", id).unwrap();

        let pair = EntityPair::new(&u, &o).unwrap();
        assert_eq!(pair.min(), &o);
        assert!(EntityPair::new(&u, &u).is_none());
    }

    #[test]
    fn empty_kind_is_rejected_everywhere() {
        let id = uuid::Uuid::from_u128(1);

        assert_eq!(EntityKind::new(""), Err(InvalidEntity::EmptyKind));
        assert_eq!(EntityRef::new("", id), Err(InvalidEntity::EmptyKind));
        assert_eq!(
            format!(":{id}").parse::<EntityRef>(),
            Err(InvalidEntity::EmptyKind)
        );
        assert!(serde_json::from_str::<EntityKind>(r#""""#).is_err());
    }

    #[test]
    fn kind_with_separators_round_trips() {
        let entity = EntityRef::new("K:u1|L", uuid::Uuid::from_u128(2)).unwrap();
        assert_eq!(entity.to_string().parse::<EntityRef>().unwrap(), entity);
    }

    #[test]
    fn pair_key_is_injective_over_separator_kinds() {
        let u = |n| uuid::Uuid::from_u128(n);

        let k1 = EntityRef::new("K", u(1)).unwrap();
        let l2m = EntityRef::new(format!("L:{}|M", u(2)), u(3)).unwrap();
        let k1l = EntityRef::new(format!("K:{}|L", u(1)), u(2)).unwrap();
        let m3 = EntityRef::new("M", u(3)).unwrap();

        let first = EntityPair::new(&k1, &l2m).unwrap();
        let second = EntityPair::new(&k1l, &m3).unwrap();

        assert_ne!(first, second);
        assert_ne!(first.key(), second.key());
    }
}
