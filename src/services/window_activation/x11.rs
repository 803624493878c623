use crate::error::{PetError, Result};
use crate::events::WindowGeometry;
use crate::pet_error;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

use super::r#trait::{LaunchCommand, WindowIds, WindowSystem};

/// Оконная система X11 через `xdotool`, `xwininfo` и `xprop`
pub struct X11WindowSystem {
    timeout: Duration,
}

impl X11WindowSystem {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Запуск утилиты с ограниченным временем ожидания: зависшая утилита не
    /// должна навсегда остановить цикл событий
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        debug!("Запуск {} {}", program, args.join(" "));

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(output) => Ok(output.map_err(|e| pet_error!(tool, "{} не найден: {}", program, e))?),
            Err(_) => Err(pet_error!(
                timeout,
                "{} не ответил за {}мс",
                program,
                self.timeout.as_millis()
            )),
        }
    }

    /// Как `run`, но ненулевой код возврата - ошибка
    async fn run_checked(&self, program: &str, args: &[&str]) -> Result<String> {
        let output = self.run(program, args).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("{} вернул ошибку: {}", program, stderr.trim());
            return Err(PetError::Tool(format!(
                "{} {} завершился с {}: {}",
                program,
                args.join(" "),
                output.status,
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait::async_trait]
impl WindowSystem for X11WindowSystem {
    async fn search_by_name(&self, title: &str) -> Result<WindowIds> {
        let output = self.run("xdotool", &["search", "--name", title]).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        // xdotool search возвращает 1, если ничего не нашёл
        if !output.status.success() && !stdout.trim().is_empty() {
            return Err(pet_error!(tool, "xdotool search завершился с {}", output.status));
        }

        Ok(parse_window_ids(&stdout))
    }

    async fn window_name(&self, window_id: &str) -> Result<String> {
        let stdout = self.run_checked("xdotool", &["getwindowname", window_id]).await?;
        Ok(stdout.trim().to_string())
    }

    async fn geometry(&self, window_id: &str) -> Result<WindowGeometry> {
        let stdout = self.run_checked("xwininfo", &["-id", window_id]).await?;
        parse_xwininfo(&stdout)
            .ok_or_else(|| pet_error!(tool, "xwininfo не вернул описание окна {}", window_id))
    }

    async fn wm_state(&self, window_id: &str) -> Result<String> {
        let stdout = self
            .run_checked("xprop", &["-id", window_id, "_NET_WM_STATE"])
            .await?;
        Ok(stdout.trim().to_string())
    }

    async fn activate(&self, window_id: &str) -> Result<()> {
        self.run_checked("xdotool", &["windowactivate", window_id]).await?;
        Ok(())
    }

    async fn minimize(&self, window_id: &str) -> Result<()> {
        self.run_checked("xdotool", &["windowminimize", window_id]).await?;
        Ok(())
    }

    fn launch(&self, command: &LaunchCommand) -> Result<()> {
        let child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        info!("Запущено приложение '{}' (pid {:?})", command, child.id());
        Ok(())
    }
}

/// Вывод `xdotool search`: по одному числовому id на строку
pub(crate) fn parse_window_ids(stdout: &str) -> WindowIds {
    stdout
        .split_whitespace()
        .filter(|id| id.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
        .collect()
}

/// Разбор вывода `xwininfo -id`. `None`, если в выводе нет описания окна.
pub(crate) fn parse_xwininfo(stdout: &str) -> Option<WindowGeometry> {
    if !stdout.contains("Window id:") {
        return None;
    }

    let mut width = None;
    let mut height = None;
    let mut unmapped = false;

    for line in stdout.lines().map(str::trim) {
        if let Some(value) = line.strip_prefix("Width:") {
            width = value.trim().parse::<u32>().ok();
        } else if let Some(value) = line.strip_prefix("Height:") {
            height = value.trim().parse::<u32>().ok();
        } else if let Some(value) = line.strip_prefix("Map State:") {
            unmapped = value.trim() == "IsUnMapped";
        }
    }

    Some(WindowGeometry {
        width: width.unwrap_or(0),
        height: height.unwrap_or(0),
        unmapped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const XWININFO: &str = r#"
xwininfo: Window id: 0x3a00003 "DeepChat - Shell"

  Absolute upper-left X:  120
  Absolute upper-left Y:  80
  Relative upper-left X:  0
  Relative upper-left Y:  0
  Width: 1280
  Height: 800
  Depth: 24
  Visual: 0x21
  Border width: 0
  Class: InputOutput
  Map State: IsViewable
  Override Redirect State: no
"#;

    #[test]
    fn test_parse_window_ids() {
        let ids = parse_window_ids("60817411\n60817415\n");
        assert_eq!(ids.as_slice(), ["60817411", "60817415"]);
        assert!(parse_window_ids("").is_empty());
        assert!(parse_window_ids("Defaulting to search window name\n").is_empty());
    }

    #[test]
    fn test_parse_xwininfo_viewable() {
        let geometry = parse_xwininfo(XWININFO).unwrap();
        assert_eq!(geometry.width, 1280);
        assert_eq!(geometry.height, 800);
        assert!(!geometry.unmapped);
    }

    #[test]
    fn test_parse_xwininfo_unmapped_and_degenerate() {
        let unmapped = XWININFO
            .replace("IsViewable", "IsUnMapped")
            .replace("Width: 1280", "Width: 1")
            .replace("Height: 800", "Height: 1");
        let geometry = parse_xwininfo(&unmapped).unwrap();
        assert!(geometry.unmapped);
        assert_eq!((geometry.width, geometry.height), (1, 1));
    }

    #[test]
    fn test_parse_xwininfo_without_window() {
        assert_eq!(parse_xwininfo("xwininfo: error: No such window"), None);
    }

    #[tokio::test]
    async fn test_hung_tool_times_out() {
        let system = X11WindowSystem::new(Duration::from_millis(100));
        let started = std::time::Instant::now();

        let err = system.run("sleep", &["5"]).await.unwrap_err();
        assert!(matches!(err, PetError::Timeout(msg) if msg.contains("sleep")));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_missing_tool_is_tool_error() {
        let system = X11WindowSystem::new(Duration::from_millis(500));

        let err = system
            .run("desk-pet-no-such-tool", &["--version"])
            .await
            .unwrap_err();
        assert!(matches!(err, PetError::Tool(msg) if msg.contains("desk-pet-no-such-tool")));
    }

    #[tokio::test]
    async fn test_failing_tool_is_checked() {
        let system = X11WindowSystem::new(Duration::from_millis(500));
        assert!(matches!(system.run_checked("false", &[]).await, Err(PetError::Tool(_))));
    }
}
