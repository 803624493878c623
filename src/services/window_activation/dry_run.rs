use crate::error::{PetError, Result};
use crate::events::WindowGeometry;
use parking_lot::RwLock;
use tracing::info;

use super::r#trait::{LaunchCommand, WindowIds, WindowSystem};

#[derive(Debug, Clone)]
struct SimulatedWindow {
    id: String,
    title: String,
    hidden: bool,
}

/// Эмуляция оконной системы: запуск приложения добавляет окно с нужным
/// заголовком, а клики сворачивают и разворачивают его
pub struct DryRunWindowSystem {
    title: String,
    windows: RwLock<Vec<SimulatedWindow>>,
}

impl DryRunWindowSystem {
    pub fn new(title: &str) -> Self {
        info!("Dry-run режим - оконная система эмулируется");
        Self {
            title: title.to_string(),
            windows: RwLock::new(Vec::new()),
        }
    }

    fn set_hidden(&self, window_id: &str, hidden: bool) -> Result<()> {
        let mut windows = self.windows.write();
        let window = windows
            .iter_mut()
            .find(|w| w.id == window_id)
            .ok_or_else(|| PetError::Tool(format!("[DRY RUN] окна {} нет", window_id)))?;
        window.hidden = hidden;
        Ok(())
    }

    fn with_window<T>(&self, window_id: &str, f: impl FnOnce(&SimulatedWindow) -> T) -> Result<T> {
        self.windows
            .read()
            .iter()
            .find(|w| w.id == window_id)
            .map(f)
            .ok_or_else(|| PetError::Tool(format!("[DRY RUN] окна {} нет", window_id)))
    }
}

#[async_trait::async_trait]
impl WindowSystem for DryRunWindowSystem {
    async fn search_by_name(&self, title: &str) -> Result<WindowIds> {
        Ok(self
            .windows
            .read()
            .iter()
            .filter(|w| w.title.contains(title))
            .map(|w| w.id.clone())
            .collect())
    }

    async fn window_name(&self, window_id: &str) -> Result<String> {
        self.with_window(window_id, |w| w.title.clone())
    }

    async fn geometry(&self, window_id: &str) -> Result<WindowGeometry> {
        self.with_window(window_id, |_| WindowGeometry {
            width: 800,
            height: 600,
            unmapped: false,
        })
    }

    async fn wm_state(&self, window_id: &str) -> Result<String> {
        self.with_window(window_id, |w| {
            if w.hidden {
                "_NET_WM_STATE(ATOM) = _NET_WM_STATE_HIDDEN".to_string()
            } else {
                "_NET_WM_STATE(ATOM) = ".to_string()
            }
        })
    }

    async fn activate(&self, window_id: &str) -> Result<()> {
        info!("[DRY RUN] windowactivate {}", window_id);
        self.set_hidden(window_id, false)
    }

    async fn minimize(&self, window_id: &str) -> Result<()> {
        info!("[DRY RUN] windowminimize {}", window_id);
        self.set_hidden(window_id, true)
    }

    fn launch(&self, command: &LaunchCommand) -> Result<()> {
        let mut windows = self.windows.write();
        let id = (0x3a00001 + windows.len()).to_string();
        info!("[DRY RUN] Запуск '{}' -> окно {}", command, id);
        windows.push(SimulatedWindow {
            id,
            title: self.title.clone(),
            hidden: false,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::window_activation::{ActivationOutcome, WindowActivator};

    #[tokio::test]
    async fn test_dry_run_cycle_launch_minimize_activate() {
        let activator = WindowActivator::new(Box::new(DryRunWindowSystem::new("DeepChat - Shell")));
        let command = LaunchCommand::new("deepchat");

        assert_eq!(
            activator.handle_activation_click("DeepChat", Some(&command)).await,
            ActivationOutcome::Launched
        );

        let id = (0x3a00001usize).to_string();
        assert_eq!(
            activator.handle_activation_click("DeepChat", Some(&command)).await,
            ActivationOutcome::Minimized(id.clone())
        );
        assert_eq!(
            activator.handle_activation_click("DeepChat", Some(&command)).await,
            ActivationOutcome::Activated(id)
        );
    }
}
