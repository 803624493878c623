use crate::error::{PetError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub type ActionId = String;

/// Ссылка на кадр анимации: номер кадра и файл, из которого хост его рисует
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameHandle {
    pub index: u32,
    pub path: PathBuf,
}

impl FrameHandle {
    pub fn new(index: u32, path: impl Into<PathBuf>) -> Self {
        Self {
            index,
            path: path.into(),
        }
    }
}

impl fmt::Display for FrameHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ({})", self.index, self.path.display())
    }
}

/// Направление движения питомца
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    LeftDown,
}

/// Действие: последовательность кадров, число повторов и необязательное движение.
/// После загрузки не изменяется.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub id: ActionId,
    pub images: Vec<FrameHandle>,
    pub repeat_count: u32,
    pub needs_move: bool,
    pub direction: Option<Direction>,
    pub frame_step_pixels: i32,
    pub frame_interval: Duration,
}

impl Action {
    pub fn frame_count(&self) -> usize {
        self.images.len()
    }

    /// Направление, если действие действительно двигает питомца
    pub fn movement(&self) -> Option<Direction> {
        if self.needs_move {
            self.direction
        } else {
            None
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} кадров x{}, {}мс)",
            self.id,
            self.images.len(),
            self.repeat_count,
            self.frame_interval.as_millis()
        )
    }
}

/// Действия, привязанные к направлениям
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionalBindings {
    pub default: ActionId,
    pub up: ActionId,
    pub down: ActionId,
    pub left: ActionId,
    pub right: ActionId,
}

impl DirectionalBindings {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ActionId)> {
        [
            ("default", &self.default),
            ("up", &self.up),
            ("down", &self.down),
            ("left", &self.left),
            ("right", &self.right),
        ]
        .into_iter()
    }
}

/// Каталог действий одного персонажа
#[derive(Debug, Clone)]
pub struct ActionCatalog {
    pub character: String,
    actions: HashMap<ActionId, Arc<Action>>,
    pub directional: DirectionalBindings,
    random_sequences: Vec<Vec<Arc<Action>>>,
    /// Размер окна питомца, он же отступ от края экрана
    pub size: u32,
    /// Период случайных действий
    pub refresh: Duration,
    pub app_image_path: Option<String>,
    pub greet_on_hover: bool,
}

impl ActionCatalog {
    /// Собирает каталог, проверяя что все ссылки на действия разрешаются
    pub fn new(
        character: impl Into<String>,
        actions: HashMap<ActionId, Arc<Action>>,
        directional: DirectionalBindings,
        random_ids: Vec<Vec<ActionId>>,
    ) -> Result<Self> {
        for (name, id) in directional.iter() {
            if !actions.contains_key(id) {
                return PetError::catalog(format!(
                    "Привязка '{}' ссылается на несуществующее действие '{}'",
                    name, id
                ));
            }
        }

        let mut random_sequences = Vec::with_capacity(random_ids.len());
        for (i, ids) in random_ids.iter().enumerate() {
            if ids.is_empty() {
                return PetError::catalog(format!("Пустая случайная последовательность #{}", i + 1));
            }

            let sequence = ids
                .iter()
                .map(|id| {
                    actions.get(id).cloned().ok_or_else(|| {
                        crate::pet_error!(
                            catalog,
                            "Случайная последовательность #{} ссылается на несуществующее действие '{}'",
                            i + 1,
                            id
                        )
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            random_sequences.push(sequence);
        }

        Ok(Self {
            character: character.into(),
            actions,
            directional,
            random_sequences,
            size: 128,
            refresh: Duration::from_millis(4000),
            app_image_path: None,
            greet_on_hover: false,
        })
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_refresh(mut self, refresh: Duration) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn with_app_image_path(mut self, path: Option<String>) -> Self {
        self.app_image_path = path.filter(|p| !p.trim().is_empty());
        self
    }

    pub fn with_greet_on_hover(mut self, greet: bool) -> Self {
        self.greet_on_hover = greet;
        self
    }

    pub fn get(&self, id: &str) -> Result<&Arc<Action>> {
        self.actions
            .get(id)
            .ok_or_else(|| PetError::UnknownAction(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn random_sequences(&self) -> &[Vec<Arc<Action>>] {
        &self.random_sequences
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn action(id: &str, frames: u32, repeat_count: u32) -> Arc<Action> {
        Arc::new(Action {
            id: id.to_string(),
            images: (0..frames)
                .map(|i| FrameHandle::new(i, format!("action/{}.png", i)))
                .collect(),
            repeat_count,
            needs_move: false,
            direction: None,
            frame_step_pixels: 10,
            frame_interval: Duration::from_millis(40),
        })
    }

    pub(crate) fn bindings(id: &str) -> DirectionalBindings {
        DirectionalBindings {
            default: id.to_string(),
            up: id.to_string(),
            down: id.to_string(),
            left: id.to_string(),
            right: id.to_string(),
        }
    }

    pub(crate) fn catalog(actions: &[Arc<Action>], random: Vec<Vec<&str>>) -> ActionCatalog {
        let map = actions
            .iter()
            .map(|a| (a.id.clone(), a.clone()))
            .collect::<HashMap<_, _>>();
        let random = random
            .into_iter()
            .map(|seq| seq.into_iter().map(str::to_string).collect())
            .collect();
        ActionCatalog::new("test", map, bindings(&actions[0].id), random)
            .expect("тестовый каталог должен быть корректным")
    }

    #[test]
    fn test_catalog_resolves_random_sequences() {
        let catalog = catalog(
            &[action("stand", 2, 1), action("walk", 4, 3)],
            vec![vec!["stand", "walk"], vec!["walk"]],
        );

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.random_sequences().len(), 2);
        assert_eq!(catalog.random_sequences()[0][1].id, "walk");
        assert!(catalog.get("stand").is_ok());
        assert!(matches!(catalog.get("fly"), Err(PetError::UnknownAction(_))));
    }

    #[test]
    fn test_catalog_rejects_unknown_directional_binding() {
        let map = HashMap::from([("stand".to_string(), action("stand", 1, 1))]);
        let mut directional = bindings("stand");
        directional.left = "walk_left".to_string();

        let err = ActionCatalog::new("test", map, directional, vec![]).unwrap_err();
        assert!(matches!(err, PetError::Catalog(msg) if msg.contains("walk_left")));
    }

    #[test]
    fn test_catalog_rejects_unknown_random_reference() {
        let map = HashMap::from([("stand".to_string(), action("stand", 1, 1))]);
        let err = ActionCatalog::new(
            "test",
            map,
            bindings("stand"),
            vec![vec!["stand".to_string(), "sleep".to_string()]],
        )
        .unwrap_err();
        assert!(matches!(err, PetError::Catalog(msg) if msg.contains("sleep")));
    }

    #[test]
    fn test_movement_requires_needs_move() {
        let mut a = (*action("walk", 1, 1)).clone();
        a.direction = Some(Direction::Right);
        assert_eq!(a.movement(), None);
        a.needs_move = true;
        assert_eq!(a.movement(), Some(Direction::Right));
    }
}
