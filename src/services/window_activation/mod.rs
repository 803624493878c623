//! WindowActivation service: responsibility and boundaries
//!
//! This module is responsible ONLY for finding, classifying and toggling the
//! window of an external application (and launching it when no usable window
//! exists). It never touches animation state: the click handler calls it
//! and ignores everything except the logged outcome.

mod activator;
mod dry_run;
mod probe;
mod r#trait;
mod x11;

pub use self::activator::{ActivationOutcome, WindowActivator};
pub use self::r#trait::{create_window_system, LaunchCommand};
