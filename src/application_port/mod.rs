mod friendship_service;

pub use friendship_service::*;
