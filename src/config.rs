use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub pet: PetConfig,
    pub screen: ScreenConfig,
    pub activation: ActivationConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PetConfig {
    /// Каталог с персонажами (`<role_dir>/<имя>/act_conf.json` и т.д.)
    pub role_dir: PathBuf,
    /// Пустая строка - первый персонаж по алфавиту
    #[serde(default)]
    pub character: String,
}

/// Размер экрана для headless-поверхности
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct ScreenConfig {
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ActivationConfig {
    /// Персонаж, для которого клик переключает окно внешнего приложения
    pub character: String,
    pub window_title: String,
    /// Если не задано - берётся `app_image_path` из pet_conf.json персонажа
    #[serde(default)]
    pub launch_command: Option<String>,
    #[serde(default)]
    pub launch_args: Vec<String>,
    pub command_timeout_ms: u64,
    pub click_threshold_px: i32,
    pub click_debounce_ms: u64,
}

impl ActivationConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    pub fn click_debounce(&self) -> Duration {
        Duration::from_millis(self.click_debounce_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "compact".to_string(),
            },
            pet: PetConfig {
                role_dir: PathBuf::from("res/role"),
                character: String::new(),
            },
            screen: ScreenConfig {
                width: 1920,
                height: 1080,
            },
            activation: ActivationConfig {
                character: "小智".to_string(),
                window_title: "DeepChat - Shell".to_string(),
                launch_command: None,
                launch_args: Vec::new(),
                command_timeout_ms: 2000,
                click_threshold_px: 5,
                click_debounce_ms: 400,
            },
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        // Значения по умолчанию перекрываются файлом и переменными PET_*
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("PET_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "compact" | "pretty" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        if self.screen.width <= 0 || self.screen.height <= 0 {
            anyhow::bail!(
                "Неверный размер экрана: {}x{}",
                self.screen.width,
                self.screen.height
            );
        }

        if self.activation.window_title.is_empty() {
            anyhow::bail!("activation.window_title не может быть пустым");
        }

        if self.activation.command_timeout_ms < 100 {
            anyhow::bail!("command_timeout_ms должно быть минимум 100");
        }

        if self.activation.click_threshold_px <= 0 {
            anyhow::bail!("click_threshold_px должно быть больше 0");
        }

        if let Some(command) = &self.activation.launch_command {
            if command.trim().is_empty() {
                anyhow::bail!("activation.launch_command задан, но пуст");
            }
        }

        Ok(())
    }
}
