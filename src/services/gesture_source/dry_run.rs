use crate::error::Result;
use crate::pet_error;
use crate::events::Gesture;
use crate::services::surface::Position;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};
use tracing::info;

use super::r#trait::GestureSource;

/// Эмуляция пользователя: периодически наводит мышь, кликает и тащит питомца
pub struct DryRunGestureSource {
    period: Duration,
}

impl DryRunGestureSource {
    pub fn new() -> Self {
        Self {
            period: Duration::from_secs(7),
        }
    }

    fn script() -> Vec<Vec<Gesture>> {
        let at = Position::new(600, 400);
        vec![
            vec![Gesture::HoverEnter],
            vec![Gesture::Press(at), Gesture::Release(at)],
            vec![
                Gesture::Press(at),
                Gesture::Move(Position::new(660, 420)),
                Gesture::Release(Position::new(660, 420)),
            ],
            vec![Gesture::Random],
        ]
    }
}

#[async_trait::async_trait]
impl GestureSource for DryRunGestureSource {
    async fn run(self: Box<Self>, tx: mpsc::Sender<Gesture>) -> Result<()> {
        info!("Dry-run режим - жесты пользователя эмулируются");

        let script = Self::script();
        let mut step = 0;
        let mut interval = interval(self.period);

        loop {
            interval.tick().await;

            let gestures = &script[step];
            info!("Dry-run: эмулируем жесты {:?}", gestures);
            for gesture in gestures {
                tx.send(gesture.clone())
                    .await
                    .map_err(|_| pet_error!(internal, "Канал жестов закрыт"))?;
            }

            step = (step + 1) % script.len();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_dry_run_source_emits_script() {
        let (tx, mut rx) = mpsc::channel(16);
        let source = Box::new(DryRunGestureSource::new());
        let handle = tokio::spawn(source.run(tx));

        assert_eq!(rx.recv().await, Some(Gesture::HoverEnter));
        assert!(matches!(rx.recv().await, Some(Gesture::Press(_))));
        assert!(matches!(rx.recv().await, Some(Gesture::Release(_))));

        drop(rx);
        let result = handle.await.unwrap();
        assert!(result.is_err());
    }
}
