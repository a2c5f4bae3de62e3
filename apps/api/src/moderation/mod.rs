//! Content moderation: the review decision engine, the cultural-sensitivity
//! gate, and the queue projection, plus their HTTP surface and persistence.

pub mod classify;
pub mod engine;
pub mod gate;
pub mod handlers;
pub mod queue;
pub mod roles;
pub mod store;
