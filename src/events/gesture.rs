use crate::services::surface::Position;
use std::fmt;

/// Жесты пользователя и команды хоста, которые получает питомец
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gesture {
    HoverEnter,
    /// Нажатие левой кнопки (глобальные координаты курсора)
    Press(Position),
    Move(Position),
    Release(Position),
    /// Нажатие и отпускание на месте
    Click,
    Play(String),
    Random,
    Switch(String),
    Quit,
}

impl Gesture {
    /// Разбор текстовой команды консоли: `hover`, `press 10 20`, `play walk`...
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let command = parts.next()?.to_lowercase();
        let rest: Vec<&str> = parts.collect();

        let position = |rest: &[&str]| -> Option<Position> {
            match rest {
                [x, y] => Some(Position::new(x.parse().ok()?, y.parse().ok()?)),
                _ => None,
            }
        };

        match command.as_str() {
            "hover" => Some(Gesture::HoverEnter),
            "press" => position(&rest).map(Gesture::Press),
            "move" => position(&rest).map(Gesture::Move),
            "release" => position(&rest).map(Gesture::Release),
            "click" => Some(Gesture::Click),
            "play" if !rest.is_empty() => Some(Gesture::Play(rest.join(" "))),
            "random" => Some(Gesture::Random),
            "switch" if !rest.is_empty() => Some(Gesture::Switch(rest.join(" "))),
            "quit" | "exit" => Some(Gesture::Quit),
            _ => None,
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gesture::HoverEnter => write!(f, "hover"),
            Gesture::Press(p) => write!(f, "press {}", p),
            Gesture::Move(p) => write!(f, "move {}", p),
            Gesture::Release(p) => write!(f, "release {}", p),
            Gesture::Click => write!(f, "click"),
            Gesture::Play(id) => write!(f, "play {}", id),
            Gesture::Random => write!(f, "random"),
            Gesture::Switch(name) => write!(f, "switch {}", name),
            Gesture::Quit => write!(f, "quit"),
        }
    }
}
