//! Каталог действий персонажа: модель данных и загрузка из act_conf.json / pet_conf.json.
//!
//! Все ссылки на кадры и действия проверяются при загрузке. Движок анимации
//! получает уже проверенный каталог и не читает файлы сам.

pub mod action;
mod loader;

pub use action::{Action, ActionCatalog, ActionId, Direction, FrameHandle};
pub use loader::CatalogLoader;
