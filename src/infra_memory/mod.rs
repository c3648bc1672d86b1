mod friendship_repo_memory;
mod repo_tx_memory;

pub use friendship_repo_memory::*;
pub use repo_tx_memory::*;

mod util;
