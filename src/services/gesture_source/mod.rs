mod console;
mod dry_run;
mod r#trait;

pub use self::r#trait::create_gesture_source;
