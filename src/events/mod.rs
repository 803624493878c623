pub mod gesture;
pub mod window;

pub use gesture::Gesture;
pub use window::{WindowClass, WindowGeometry, WindowProbeResult};
