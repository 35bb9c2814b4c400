//! Master data: account groups, items and parties

pub mod fields;
pub mod group;
pub mod item;
pub mod party;

pub use fields::*;
pub use group::*;
pub use item::*;
pub use party::*;
