use crate::services::surface::Position;
use std::time::{Duration, Instant};

/// Чем закончилось отпускание левой кнопки
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// Курсор почти не сдвинулся - это клик
    Click,
    /// Повторный клик раньше окна антидребезга
    Debounced,
    Drag,
    /// Отпускание без нажатия
    Ignored,
}

/// Перетаскивание питомца мышью и отличие клика от перетаскивания
pub struct DragTracker {
    threshold: i32,
    debounce: Duration,
    press_position: Option<Position>,
    /// Смещение курсора относительно угла питомца в момент нажатия
    grab_offset: Position,
    last_click: Option<Instant>,
}

impl DragTracker {
    pub fn new(threshold: i32, debounce: Duration) -> Self {
        Self {
            threshold,
            debounce,
            press_position: None,
            grab_offset: Position::default(),
            last_click: None,
        }
    }

    #[allow(dead_code)]
    pub fn is_dragging(&self) -> bool {
        self.press_position.is_some()
    }

    pub fn on_press(&mut self, cursor: Position, pet: Position) {
        self.press_position = Some(cursor);
        self.grab_offset = Position::new(cursor.x.saturating_sub(pet.x), cursor.y.saturating_sub(pet.y));
    }

    /// Новая позиция питомца, если он сейчас следует за мышью
    pub fn on_move(&self, cursor: Position) -> Option<Position> {
        self.press_position?;
        Some(Position::new(
            cursor.x.saturating_sub(self.grab_offset.x),
            cursor.y.saturating_sub(self.grab_offset.y),
        ))
    }

    pub fn on_release(&mut self, cursor: Position, now: Instant) -> Release {
        let Some(pressed) = self.press_position.take() else {
            return Release::Ignored;
        };

        if pressed.manhattan_distance(cursor) >= self.threshold {
            return Release::Drag;
        }

        if let Some(last) = self.last_click {
            if now.saturating_duration_since(last) < self.debounce {
                return Release::Debounced;
            }
        }

        self.last_click = Some(now);
        Release::Click
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> DragTracker {
        DragTracker::new(5, Duration::from_millis(400))
    }

    #[test]
    fn test_small_movement_is_click() {
        let mut drag = tracker();
        let now = Instant::now();

        drag.on_press(Position::new(100, 100), Position::new(64, 64));
        assert!(drag.is_dragging());
        assert_eq!(drag.on_release(Position::new(102, 102), now), Release::Click);
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_threshold_distance_is_drag() {
        let mut drag = tracker();
        drag.on_press(Position::new(100, 100), Position::new(64, 64));
        assert_eq!(drag.on_release(Position::new(103, 102), Instant::now()), Release::Drag);
    }

    #[test]
    fn test_move_keeps_grab_offset() {
        let mut drag = tracker();
        assert_eq!(drag.on_move(Position::new(10, 10)), None);

        drag.on_press(Position::new(100, 100), Position::new(64, 70));
        assert_eq!(drag.on_move(Position::new(200, 150)), Some(Position::new(164, 120)));
    }

    #[test]
    fn test_rapid_clicks_are_debounced() {
        let mut drag = tracker();
        let start = Instant::now();
        let at = Position::new(10, 10);

        drag.on_press(at, at);
        assert_eq!(drag.on_release(at, start), Release::Click);

        drag.on_press(at, at);
        assert_eq!(
            drag.on_release(at, start + Duration::from_millis(150)),
            Release::Debounced
        );

        drag.on_press(at, at);
        assert_eq!(
            drag.on_release(at, start + Duration::from_millis(500)),
            Release::Click
        );
    }

    #[test]
    fn test_extreme_coordinates_saturate() {
        let mut drag = tracker();
        drag.on_press(Position::new(-2_147_483_000, 0), Position::new(960, 540));
        assert_eq!(
            drag.on_move(Position::new(i32::MAX, i32::MIN)),
            Some(Position::new(i32::MAX, i32::MIN.saturating_add(540)))
        );
        assert_eq!(
            drag.on_release(Position::new(i32::MAX, 0), Instant::now()),
            Release::Drag
        );
    }

    #[test]
    fn test_release_without_press_ignored() {
        let mut drag = tracker();
        assert_eq!(drag.on_release(Position::new(1, 1), Instant::now()), Release::Ignored);
    }
}
