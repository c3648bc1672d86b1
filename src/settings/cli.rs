use super::Parser;
use crate::domain_model::{EntityRef, FriendshipStatus};
use clap::{Args, Subcommand};

/// Administer friendships in the configured store.
#[derive(Parser, Debug)]
#[command(name = "friendship", version)]
pub struct Cli {
    #[arg(long)]
    pub settings: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Two participants, each written as `Kind:uuid`.
#[derive(Args, Debug, Clone)]
pub struct PairArgs {
    pub actor: EntityRef,
    pub target: EntityRef,
}

#[derive(Args, Debug, Clone, Copy)]
pub struct PageArgs {
    #[arg(long)]
    pub limit: Option<u32>,
    #[arg(long, default_value_t = 0)]
    pub offset: u32,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the friendships table (mysql backend).
    Migrate,
    /// Send a friend request from actor to target.
    Befriend(PairArgs),
    Unfriend(PairArgs),
    Accept(PairArgs),
    Deny(PairArgs),
    Block(PairArgs),
    Unblock(PairArgs),
    /// Print the relationship record between two entities.
    Show(PairArgs),
    /// Report is-friends-with, has-blocked and is-blocked-by for a pair.
    Check {
        #[command(flatten)]
        pair: PairArgs,
        #[arg(long)]
        status: Option<FriendshipStatus>,
    },
    /// List the counterparts of an entity.
    List {
        actor: EntityRef,
        #[arg(long)]
        status: Option<FriendshipStatus>,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Pending requests addressed to an entity.
    Requests { actor: EntityRef },
    /// Records an entity has initiated.
    Sent {
        actor: EntityRef,
        #[command(flatten)]
        page: PageArgs,
    },
}
