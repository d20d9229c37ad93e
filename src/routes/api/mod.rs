pub mod auth;
pub mod error;
pub mod odds;
pub mod prediction;
pub mod race;
pub mod racer;
pub mod stats;
