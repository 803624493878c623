use crate::catalog::FrameHandle;
use crate::config::ScreenConfig;
use crate::trace_if_enabled;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan_distance(&self, other: Position) -> i32 {
        let distance = self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y));
        i32::try_from(distance).unwrap_or(i32::MAX)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenBounds {
    pub width: i32,
    pub height: i32,
}

impl From<ScreenConfig> for ScreenBounds {
    fn from(config: ScreenConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
        }
    }
}

/// Поверхность, на которой хост рисует питомца.
///
/// Движок вызывает только `show_frame` и `move_to`; оба вызываются с частотой
/// кадров анимации и не должны блокировать.
pub trait PetSurface {
    fn show_frame(&mut self, frame: &FrameHandle);
    fn move_to(&mut self, position: Position);
    fn position(&self) -> Position;
    fn screen(&self) -> ScreenBounds;
}

/// Поверхность без рендеринга: хранит позицию и пишет кадры в лог
pub struct HeadlessSurface {
    position: Position,
    screen: ScreenBounds,
    current_frame: Option<FrameHandle>,
    frames_shown: u64,
}

impl HeadlessSurface {
    pub fn new(screen: ScreenBounds, position: Position) -> Self {
        debug!("Headless-поверхность {}x{}, старт в {}", screen.width, screen.height, position);
        Self {
            position,
            screen,
            current_frame: None,
            frames_shown: 0,
        }
    }

    pub fn current_frame(&self) -> Option<&FrameHandle> {
        self.current_frame.as_ref()
    }

    pub fn frames_shown(&self) -> u64 {
        self.frames_shown
    }
}

impl PetSurface for HeadlessSurface {
    fn show_frame(&mut self, frame: &FrameHandle) {
        trace_if_enabled!("Кадр {} в {}", frame, self.position);
        self.current_frame = Some(frame.clone());
        self.frames_shown += 1;
    }

    fn move_to(&mut self, position: Position) {
        if position != self.position {
            trace_if_enabled!("Перемещение {} -> {}", self.position, position);
            self.position = position;
        }
    }

    fn position(&self) -> Position {
        self.position
    }

    fn screen(&self) -> ScreenBounds {
        self.screen
    }
}
