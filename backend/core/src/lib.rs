pub mod error;
pub mod event;
pub mod traits;

pub use error::ShimmerError;
pub use event::LiveVideoEvent;
pub use traits::LiveVideoHandler;
