pub mod capture_engine;
pub mod coordinator_delegate;
pub mod media_sink;
