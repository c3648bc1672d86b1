// repo

mod friendship_repo;

mod repo_tx;

pub use friendship_repo::*;

pub use repo_tx::*;
