mod entity;
mod friendship;
mod unit;

pub use entity::*;
pub use friendship::*;
pub use unit::*;
