use std::time::Duration;

/// Состояние единственного таймера анимации.
///
/// Движок только запускает и останавливает таймер; реальное ожидание делает
/// хост. Каждый `start` увеличивает поколение, по которому хост понимает,
/// что таймер нужно перезапустить (даже с тем же интервалом).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnimationClock {
    interval: Option<Duration>,
    generation: u64,
}

impl AnimationClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, interval: Duration) {
        self.interval = Some(interval);
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn stop(&mut self) {
        self.interval = None;
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
