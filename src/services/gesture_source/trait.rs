use crate::error::Result;
use crate::events::Gesture;
use tokio::sync::mpsc;

/// Trait for gesture sources that can run in different modes
#[async_trait::async_trait]
pub trait GestureSource {
    /// Run the source, delivering gestures until the input ends or the receiver is dropped
    async fn run(self: Box<Self>, tx: mpsc::Sender<Gesture>) -> Result<()>;
}

/// Factory function to create an appropriate gesture source based on the dry_run flag
pub fn create_gesture_source(dry_run: bool) -> Box<dyn GestureSource + Send> {
    if dry_run {
        Box::new(super::dry_run::DryRunGestureSource::new())
    } else {
        Box::new(super::console::ConsoleGestureSource::new())
    }
}
