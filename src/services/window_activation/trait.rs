use crate::config::ActivationConfig;
use crate::error::Result;
use crate::events::WindowGeometry;
use smallvec::SmallVec;
use std::fmt;

/// Идентификаторы окон, найденные по заголовку (обычно одно-два)
pub type WindowIds = SmallVec<[String; 4]>;

/// Команда запуска внешнего приложения
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl LaunchCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.program)
        } else {
            write!(f, "{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Граница с оконной системой: поиск окон, запросы свойств, переключение и
/// запуск процессов. Все ошибки возвращаются вызывающему, решение о запасном
/// пути принимает `WindowActivator`.
#[async_trait::async_trait]
pub trait WindowSystem: Send + Sync {
    /// Окна, в заголовке которых есть `title`, в порядке обнаружения
    async fn search_by_name(&self, title: &str) -> Result<WindowIds>;

    /// Заголовок окна; ошибка означает, что окно запросить нельзя
    async fn window_name(&self, window_id: &str) -> Result<String>;

    async fn geometry(&self, window_id: &str) -> Result<WindowGeometry>;

    /// Значение свойства `_NET_WM_STATE`
    async fn wm_state(&self, window_id: &str) -> Result<String>;

    async fn activate(&self, window_id: &str) -> Result<()>;

    async fn minimize(&self, window_id: &str) -> Result<()>;

    /// Запускает процесс и не ждёт его завершения
    fn launch(&self, command: &LaunchCommand) -> Result<()>;
}

/// Factory function to create the window system backend based on the dry_run flag
pub fn create_window_system(config: &ActivationConfig, dry_run: bool) -> Box<dyn WindowSystem> {
    if dry_run {
        Box::new(super::dry_run::DryRunWindowSystem::new(&config.window_title))
    } else {
        Box::new(super::x11::X11WindowSystem::new(config.command_timeout()))
    }
}
