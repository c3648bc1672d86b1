//! Walks through the friendship lifecycle against the in-process store.
//!
//! $ cargo run --bin memory_demo

use friendship::application_port::*;
use friendship::domain_model::*;
use friendship::logger::*;
use friendship::server::Server;

struct User {
    entity: EntityRef,
    name: &'static str,
}

impl User {
    fn new(name: &'static str) -> Result<Self, InvalidEntity> {
        Ok(User {
            entity: EntityRef::new("User", uuid::Uuid::new_v4())?,
            name,
        })
    }
}

impl Friendable for User {
    fn entity_ref(&self) -> EntityRef {
        self.entity.clone()
    }
}

struct Organization {
    entity: EntityRef,
}

impl Friendable for Organization {
    fn entity_ref(&self) -> EntityRef {
        self.entity.clone()
    }
}

fn names(friends: &[EntityRef]) -> Vec<String> {
    friends.iter().map(ToString::to_string).collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let logger = Logger::new_bootstrap();
    logger.reload_from_config(&LogConfig {
        filter: "friendship=debug".to_string(),
    })?;

    let server = Server::in_memory();
    let service = server.friendship_service.as_ref();

    let alice = User::new("alice")?;
    let bob = User::new("bob")?;
    let acme = Organization {
        entity: EntityRef::new("Organization", uuid::Uuid::new_v4())?,
    };
    let (a, b, o) = (alice.entity_ref(), bob.entity_ref(), acme.entity_ref());

    service.befriend(&a, &b).await?;
    service.befriend(&o, &a).await?;
    info!(requests = service.get_friend_requests(&b).await?.len(), "{} inbox", bob.name);

    if let Err(e) = service.befriend(&b, &a).await {
        info!("second request refused: {e}");
    }

    service.accept_friend_request(&b, &a).await?;
    service.block_friend_request(&a, &o).await?;

    let friends = service.get_accepted_friendships(&a, Page::all()).await?;
    let blocked = service.get_blocked_friendships(&a, Page::all()).await?;
    println!("{} friends: {:?}", alice.name, names(&friends));
    println!("{} blocked: {:?}", alice.name, names(&blocked));
    println!("{} is blocked by {}: {}", o, a, service.is_blocked_by(&o, &a).await?);

    service.unfriend(&a, &b).await?;
    println!(
        "{} and {} still friends: {}",
        alice.name,
        bob.name,
        service.is_friends_with(&a, &b, None).await?
    );

    Ok(())
}
