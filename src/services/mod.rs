pub mod clock;
pub mod drag;
pub mod gesture_source;
pub mod movement;
pub mod pet_runtime;
pub mod sequencer;
pub mod surface;
pub mod window_activation;

pub use gesture_source::create_gesture_source;
pub use pet_runtime::PetRuntime;
pub use window_activation::{create_window_system, WindowActivator};
