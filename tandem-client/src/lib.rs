mod connectivity;
mod engine;
mod error;
mod media;
mod signaling;

pub use connectivity::*;
pub use engine::*;
pub use error::*;
pub use media::*;
pub use signaling::*;
