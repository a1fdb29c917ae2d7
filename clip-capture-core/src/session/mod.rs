pub mod coordinator;
pub mod events;
