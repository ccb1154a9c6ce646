mod app;
mod config;
mod error;
mod hub;
mod signaling;

pub use app::*;
pub use config::*;
pub use error::*;
pub use hub::*;
pub use signaling::*;
