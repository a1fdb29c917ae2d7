pub mod clip;
pub mod config;
pub mod error;
pub mod outcome;
pub mod session;
pub mod state;
