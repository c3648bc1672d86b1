//! Tracing setup shared by the binaries. Library code only uses the macros.

mod logger;
pub use logger::*;

pub use tracing::{debug, error, info, trace, warn};
