use crate::catalog::{Action, Direction};
use crate::services::surface::{Position, ScreenBounds};

/// Следующая позиция питомца для движущегося действия.
///
/// Шаг делается на `frame_step_pixels` в направлении действия. Если шаг
/// пересекает границу (`border` от края экрана), питомец переносится к
/// противоположному краю, а не упирается в границу.
pub fn next_position(current: Position, action: &Action, screen: ScreenBounds, border: i32) -> Position {
    let Some(direction) = action.movement() else {
        return stationary_position(current, screen, border);
    };

    let step = action.frame_step_pixels;
    let (w, h) = (screen.width, screen.height);

    match direction {
        Direction::Right => {
            let x = current.x.saturating_add(step);
            if x < w - border {
                Position::new(x, current.y)
            } else {
                Position::new(border, current.y)
            }
        }
        Direction::Left => {
            let x = current.x.saturating_sub(step);
            if x > border {
                Position::new(x, current.y)
            } else {
                Position::new(w - border, current.y)
            }
        }
        Direction::Up => {
            let y = current.y.saturating_sub(step);
            if y > border {
                Position::new(current.x, y)
            } else {
                Position::new(current.x, h - border)
            }
        }
        Direction::Down => {
            let y = current.y.saturating_add(step);
            if y < h - border {
                Position::new(current.x, y)
            } else {
                Position::new(current.x, border)
            }
        }
        Direction::LeftDown => {
            let x = current.x.saturating_sub(step);
            let y = current.y.saturating_add(step);
            // Переход любой из границ - в фиксированный угол, без частичного переноса
            if x > border && y < h - border {
                Position::new(x, y)
            } else {
                Position::new(w - border, border)
            }
        }
    }
}

/// Проверка для неподвижных действий: если питомец оказался за границей
/// (например, его утащили мышью), он переносится к противоположному краю.
pub fn stationary_position(current: Position, screen: ScreenBounds, border: i32) -> Position {
    let wrap = |value: i32, extent: i32| {
        if value < border {
            extent - border
        } else if value > extent - border {
            border
        } else {
            value
        }
    };

    Position::new(wrap(current.x, screen.width), wrap(current.y, screen.height))
}
