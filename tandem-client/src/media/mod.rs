mod display_surface;
mod media_source;
mod media_stream;
mod synchronizer;

pub use display_surface::*;
pub use media_source::*;
pub use media_stream::*;
pub use synchronizer::*;
