//! Type-safe wrappers around [`ResourceClient`](crate::framework::ResourceClient).

pub mod actor_client;
pub mod countdown;
pub mod pack_client;

pub use actor_client::*;
pub use countdown::*;
pub use pack_client::*;
