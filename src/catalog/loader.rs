use crate::catalog::action::{Action, ActionCatalog, ActionId, Direction, DirectionalBindings, FrameHandle};
use crate::error::{PetError, Result};
use figment::{
    providers::{Format, Json},
    Figment,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const ACT_CONF_FILE: &str = "act_conf.json";
const PET_CONF_FILE: &str = "pet_conf.json";
const ACTION_DIR: &str = "action";

/// Описание действия в act_conf.json
#[derive(Debug, Clone, Deserialize)]
struct ActDef {
    /// Диапазон кадров [начало, конец] включительно
    images: Vec<u32>,
    #[serde(default = "default_act_num")]
    act_num: u32,
    #[serde(default)]
    need_move: bool,
    #[serde(default)]
    direction: Option<Direction>,
    #[serde(default = "default_frame_move")]
    frame_move: i32,
    #[serde(default = "default_frame_refresh")]
    frame_refresh: f64,
}

fn default_act_num() -> u32 {
    1
}

fn default_frame_move() -> i32 {
    10
}

fn default_frame_refresh() -> f64 {
    0.04
}

/// Настройки персонажа в pet_conf.json
#[derive(Debug, Clone, Deserialize)]
struct PetDef {
    default: ActionId,
    up: ActionId,
    down: ActionId,
    left: ActionId,
    right: ActionId,
    #[serde(default)]
    random_act: Vec<Vec<ActionId>>,
    #[serde(default = "default_size")]
    size: u32,
    /// Период случайных действий, мс
    #[serde(default = "default_refresh")]
    refresh: u64,
    #[serde(default)]
    app_image_path: Option<String>,
    #[serde(default)]
    greet_on_hover: bool,
}

fn default_size() -> u32 {
    128
}

fn default_refresh() -> u64 {
    4000
}

/// Загрузчик каталогов действий из каталога персонажей
pub struct CatalogLoader {
    role_dir: PathBuf,
}

impl CatalogLoader {
    pub fn new(role_dir: impl Into<PathBuf>) -> Self {
        Self {
            role_dir: role_dir.into(),
        }
    }

    /// Все персонажи (подкаталоги role_dir), по алфавиту
    pub fn characters(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.role_dir).map_err(|e| {
            PetError::Catalog(format!(
                "Нет доступа к каталогу персонажей {:?}: {}",
                self.role_dir, e
            ))
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Персонаж из конфигурации либо первый найденный
    pub fn resolve_character(&self, requested: &str) -> Result<String> {
        let characters = self.characters()?;
        if requested.is_empty() {
            return characters.into_iter().next().ok_or_else(|| {
                PetError::Catalog(format!("В {:?} нет ни одного персонажа", self.role_dir))
            });
        }

        if characters.iter().any(|c| c == requested) {
            Ok(requested.to_string())
        } else {
            PetError::catalog(format!(
                "Персонаж '{}' не найден, доступны: {:?}",
                requested, characters
            ))
        }
    }

    pub fn load(&self, character: &str) -> Result<ActionCatalog> {
        let dir = self.role_dir.join(character);
        info!("Загрузка каталога действий персонажа '{}' из {:?}", character, dir);

        let frames = scan_frames(&dir.join(ACTION_DIR))?;
        debug!("Найдено {} кадров", frames.len());

        let act_conf = dir.join(ACT_CONF_FILE);
        let pet_conf = dir.join(PET_CONF_FILE);
        for path in [&act_conf, &pet_conf] {
            if !path.is_file() {
                return PetError::catalog(format!("Файл {:?} не найден", path));
            }
        }

        let catalog = build_catalog(
            character,
            Figment::from(Json::file(&act_conf)),
            Figment::from(Json::file(&pet_conf)),
            &frames,
        )?;

        info!(
            "Каталог '{}' загружен: {} действий, {} случайных последовательностей",
            character,
            catalog.len(),
            catalog.random_sequences().len()
        );
        Ok(catalog)
    }
}

/// Номер кадра -> файл. Имя файла без расширения должно быть числом.
fn scan_frames(dir: &Path) -> Result<HashMap<u32, PathBuf>> {
    let entries = fs::read_dir(dir)
        .map_err(|e| PetError::Catalog(format!("Нет доступа к каталогу кадров {:?}: {}", dir, e)))?;

    let mut frames = HashMap::new();
    for entry in entries {
        let path = entry?.path();
        let index = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(|stem| stem.parse::<u32>().ok());
        match index {
            Some(index) => {
                frames.insert(index, path);
            }
            None => debug!("Пропускаем файл без номера кадра: {:?}", path),
        }
    }
    Ok(frames)
}

/// Собирает каталог из уже разобранных источников. Все ссылки на кадры и
/// действия проверяются здесь, до запуска анимации.
pub(crate) fn build_catalog(
    character: &str,
    act_source: Figment,
    pet_source: Figment,
    frames: &HashMap<u32, PathBuf>,
) -> Result<ActionCatalog> {
    let act_defs: HashMap<ActionId, ActDef> = act_source
        .extract()
        .map_err(|e| PetError::Catalog(format!("Ошибка разбора {}: {}", ACT_CONF_FILE, e)))?;
    let pet_def: PetDef = pet_source
        .extract()
        .map_err(|e| PetError::Catalog(format!("Ошибка разбора {}: {}", PET_CONF_FILE, e)))?;

    let mut actions = HashMap::with_capacity(act_defs.len());
    for (id, def) in act_defs {
        let action = build_action(&id, def, frames)?;
        actions.insert(id, Arc::new(action));
    }

    let directional = DirectionalBindings {
        default: pet_def.default,
        up: pet_def.up,
        down: pet_def.down,
        left: pet_def.left,
        right: pet_def.right,
    };

    if pet_def.refresh == 0 {
        return PetError::catalog("refresh должно быть больше 0");
    }

    Ok(ActionCatalog::new(character, actions, directional, pet_def.random_act)?
        .with_size(pet_def.size)
        .with_refresh(Duration::from_millis(pet_def.refresh))
        .with_app_image_path(pet_def.app_image_path)
        .with_greet_on_hover(pet_def.greet_on_hover))
}

fn build_action(id: &str, def: ActDef, frames: &HashMap<u32, PathBuf>) -> Result<Action> {
    let (start, end) = match (def.images.first(), def.images.last()) {
        (Some(&start), Some(&end)) if start <= end => (start, end),
        _ => {
            return PetError::catalog(format!(
                "Действие '{}': неверный диапазон кадров {:?}",
                id, def.images
            ))
        }
    };

    let images = (start..=end)
        .map(|index| {
            frames
                .get(&index)
                .map(|path| FrameHandle::new(index, path.clone()))
                .ok_or_else(|| {
                    crate::pet_error!(catalog, "Действие '{}': кадр {} не найден", id, index)
                })
        })
        .collect::<Result<Vec<_>>>()?;

    if def.act_num == 0 {
        return PetError::catalog(format!("Действие '{}': act_num должно быть больше 0", id));
    }

    // Интервал таймера анимации не может быть нулевым или непредставимым
    let frame_interval = match Duration::try_from_secs_f64(def.frame_refresh) {
        Ok(interval) if !interval.is_zero() => interval,
        _ => {
            return PetError::catalog(format!(
                "Действие '{}': неверный frame_refresh {} (нужно положительное число секунд)",
                id, def.frame_refresh
            ))
        }
    };

    if def.frame_move < 0 {
        return PetError::catalog(format!("Действие '{}': frame_move не может быть отрицательным", id));
    }

    if def.need_move && def.direction.is_none() {
        return PetError::catalog(format!(
            "Действие '{}': need_move требует указать direction",
            id
        ));
    }

    Ok(Action {
        id: id.to_string(),
        images,
        repeat_count: def.act_num,
        needs_move: def.need_move,
        direction: def.direction,
        frame_step_pixels: def.frame_move,
        frame_interval,
    })
}
