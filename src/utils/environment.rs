use std::env;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Утилиты X11, которые нужны для переключения окна приложения
pub const X11_TOOLS: &[&str] = &["xdotool", "xwininfo", "xprop"];

/// Проверить окружение для переключения окон. Ничего не запрещает: без X11
/// клик просто ничего не сделает или запустит приложение.
pub fn check_environment() {
    info!("Проверка окружения...");

    match env::var("DISPLAY") {
        Ok(value) if !value.is_empty() => info!("DISPLAY={}", value),
        _ => warn!("Переменная DISPLAY не задана, переключение окон работать не будет"),
    }

    if let Ok(session) = env::var("XDG_SESSION_TYPE") {
        if session == "wayland" {
            warn!("⚠️  Сессия Wayland: xdotool видит только окна XWayland");
        }
    }

    let path = env::var_os("PATH").unwrap_or_default();
    let missing = missing_tools(env::split_paths(&path), X11_TOOLS);
    if missing.is_empty() {
        info!("Утилиты X11 найдены: {}", X11_TOOLS.join(", "));
    } else {
        warn!("Не найдены утилиты: {}", missing.join(", "));
        for command in get_setup_commands() {
            warn!("   {}", command);
        }
    }
}

/// Утилиты, которых нет ни в одном из каталогов
pub fn missing_tools<I>(dirs: I, tools: &[&'static str]) -> Vec<&'static str>
where
    I: IntoIterator<Item = PathBuf>,
{
    let dirs: Vec<PathBuf> = dirs.into_iter().collect();
    tools
        .iter()
        .copied()
        .filter(|tool| !dirs.iter().any(|dir| is_file(&dir.join(tool))))
        .collect()
}

fn is_file(path: &Path) -> bool {
    path.metadata().map(|m| m.is_file()).unwrap_or(false)
}

/// Рекомендуемые команды для установки утилит
pub fn get_setup_commands() -> Vec<String> {
    vec![
        "# Debian/Ubuntu:".to_string(),
        "sudo apt install xdotool x11-utils".to_string(),
        "# Arch:".to_string(),
        "sudo pacman -S xdotool xorg-xwininfo xorg-xprop".to_string(),
    ]
}
