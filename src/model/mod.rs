//! Pure data structures for packing orders and their wire representation.
//!
//! [`PackOrder`] implements [`ActorEntity`](crate::framework::ActorEntity) in
//! [`crate::pack_actor`]; everything in this module is free of I/O.

pub mod order;
pub mod status;
pub mod wire;

pub use order::*;
pub use status::*;
pub use wire::*;
