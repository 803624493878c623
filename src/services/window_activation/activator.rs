use crate::error::Result;
use crate::pet_error;
use std::fmt;
use tracing::{debug, info, warn};

use super::probe::probe_window;
use super::r#trait::{LaunchCommand, WindowSystem};

/// Чем закончился клик по питомцу
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// Свёрнутое окно развернуто и активировано
    Activated(String),
    /// Видимое окно свёрнуто
    Minimized(String),
    Launched,
    LaunchFailed,
    /// Окна нет, а команда запуска не настроена
    NoLaunchCommand,
}

impl fmt::Display for ActivationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivationOutcome::Activated(id) => write!(f, "окно {} активировано", id),
            ActivationOutcome::Minimized(id) => write!(f, "окно {} свёрнуто", id),
            ActivationOutcome::Launched => write!(f, "приложение запущено"),
            ActivationOutcome::LaunchFailed => write!(f, "запуск приложения не удался"),
            ActivationOutcome::NoLaunchCommand => write!(f, "команда запуска не настроена"),
        }
    }
}

/// Переключает окно внешнего приложения по клику, а если подходящего окна
/// нет - запускает приложение. Никакие ошибки наружу не выходят.
pub struct WindowActivator {
    system: Box<dyn WindowSystem>,
}

impl WindowActivator {
    pub fn new(system: Box<dyn WindowSystem>) -> Self {
        Self { system }
    }

    pub async fn handle_activation_click(
        &self,
        title: &str,
        launch: Option<&LaunchCommand>,
    ) -> ActivationOutcome {
        info!("Клик активации: ищем окно '{}'", title);

        let target = match self.find_valid_window(title).await {
            Ok(target) => target,
            Err(e) => {
                warn!("Поиск окна '{}' не удался: {}", title, e);
                None
            }
        };

        let outcome = match target {
            Some(window_id) => match self.toggle(&window_id).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("Не удалось переключить окно {}: {}", window_id, e);
                    self.launch(launch)
                }
            },
            None => {
                debug!("Подходящих окон '{}' нет", title);
                self.launch(launch)
            }
        };

        info!("Результат клика: {}", outcome);
        outcome
    }

    /// Первое окно из найденных, которое существует, отображено и не выведено
    /// из-под управления. Свёрнутые окна тоже подходят.
    async fn find_valid_window(&self, title: &str) -> Result<Option<String>> {
        let candidates = self.system.search_by_name(title).await?;
        debug!("Кандидаты для '{}': {:?}", title, candidates);

        for window_id in candidates {
            let probe = probe_window(self.system.as_ref(), &window_id).await;
            if probe.is_valid() {
                return Ok(Some(window_id));
            }
        }

        Ok(None)
    }

    async fn toggle(&self, window_id: &str) -> Result<ActivationOutcome> {
        // Окно могло исчезнуть между поиском и переключением
        let probe = probe_window(self.system.as_ref(), window_id).await;

        if !probe.is_valid() {
            return Err(pet_error!(tool, "окно {} больше не валидно ({:?})", window_id, probe.class));
        }

        if probe.hidden {
            self.system.activate(window_id).await?;
            Ok(ActivationOutcome::Activated(window_id.to_string()))
        } else {
            self.system.minimize(window_id).await?;
            Ok(ActivationOutcome::Minimized(window_id.to_string()))
        }
    }

    fn launch(&self, launch: Option<&LaunchCommand>) -> ActivationOutcome {
        let Some(command) = launch else {
            debug!("Команда запуска не настроена, клик ничего не делает");
            return ActivationOutcome::NoLaunchCommand;
        };

        match self.system.launch(command) {
            Ok(()) => ActivationOutcome::Launched,
            Err(e) => {
                warn!("Не удалось запустить '{}': {}", command, e);
                ActivationOutcome::LaunchFailed
            }
        }
    }
}
