pub mod clock;
pub mod codec;
pub mod config;
pub mod dedup;
pub mod driver;
pub mod lock;
pub mod planner;
pub mod store;
pub mod warn;
