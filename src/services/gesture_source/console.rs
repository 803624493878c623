use crate::error::Result;
use crate::events::Gesture;
use crate::pet_error;
use std::io::{self, BufRead, BufReader};
use std::thread;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use super::r#trait::GestureSource;

const HELP: &str = "hover | press X Y | move X Y | release X Y | click | play ID | random | switch NAME | quit";

/// Жесты из текстовых команд на stdin (headless-хост)
pub struct ConsoleGestureSource {
    input: Box<dyn BufRead + Send>,
}

impl ConsoleGestureSource {
    pub fn new() -> Self {
        Self::with_input(BufReader::new(io::stdin()))
    }

    pub fn with_input(input: impl BufRead + Send + 'static) -> Self {
        Self {
            input: Box::new(input),
        }
    }
}

#[async_trait::async_trait]
impl GestureSource for ConsoleGestureSource {
    /// Чтение идёт в отдельном потоке: блокирующий read нельзя отменить, а
    /// задача, ждущая поток, снимается через `abort` и не держит завершение рантайма
    async fn run(self: Box<Self>, tx: mpsc::Sender<Gesture>) -> Result<()> {
        info!("Консоль жестов готова: {}", HELP);

        let (done_tx, done_rx) = oneshot::channel();
        let input = self.input;
        thread::Builder::new()
            .name("gesture-console".to_string())
            .spawn(move || {
                let _ = done_tx.send(forward_lines(input, &tx));
            })?;

        done_rx
            .await
            .map_err(|_| pet_error!(internal, "Поток консоли жестов завершился аварийно"))?
    }
}

fn forward_lines(input: impl BufRead, tx: &mpsc::Sender<Gesture>) -> Result<()> {
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let Some(gesture) = Gesture::parse(&line) else {
            warn!("Неизвестная команда '{}'. Доступно: {}", line.trim(), HELP);
            continue;
        };

        debug!("Жест из консоли: {}", gesture);
        tx.blocking_send(gesture)
            .map_err(|_| pet_error!(internal, "Канал жестов закрыт"))?;
    }

    info!("stdin закрыт, консоль жестов остановлена");
    Ok(())
}
