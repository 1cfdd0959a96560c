//! planner/mod.rs
//! Block size planning for the encrypt path.
//!
//! The decrypt path never plans: it takes the block size from the header.

pub mod policy;
pub mod memory;

pub use policy::*;
pub use memory::*;
