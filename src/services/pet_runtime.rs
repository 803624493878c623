use crate::catalog::{ActionCatalog, CatalogLoader};
use crate::config::Config;
use crate::error::Result;
use crate::events::Gesture;
use crate::services::drag::{DragTracker, Release};
use crate::services::sequencer::Sequencer;
use crate::services::surface::{HeadlessSurface, PetSurface, Position, ScreenBounds};
use crate::services::window_activation::{LaunchCommand, WindowActivator};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Duration, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Хост питомца: единственная задача, которая владеет движком анимации и
/// по очереди обрабатывает тики таймеров и жесты. Обработчики выполняются
/// до конца, поэтому тики никогда не перекрываются.
pub struct PetRuntime {
    config: Arc<Config>,
    loader: CatalogLoader,
    sequencer: Sequencer,
    surface: HeadlessSurface,
    activator: WindowActivator,
    drag: DragTracker,
    launch: Option<LaunchCommand>,
}

impl PetRuntime {
    pub fn new(
        config: Arc<Config>,
        loader: CatalogLoader,
        catalog: ActionCatalog,
        activator: WindowActivator,
    ) -> Self {
        let screen = ScreenBounds::from(config.screen);
        let start = Position::new(screen.width / 2, screen.height / 2);
        let drag = DragTracker::new(
            config.activation.click_threshold_px,
            config.activation.click_debounce(),
        );
        let launch = Self::resolve_launch(&config, &catalog);

        Self {
            loader,
            sequencer: Sequencer::new(Arc::new(catalog)),
            surface: HeadlessSurface::new(screen, start),
            activator,
            drag,
            launch,
            config,
        }
    }

    /// Команда из конфигурации важнее `app_image_path` персонажа
    fn resolve_launch(config: &Config, catalog: &ActionCatalog) -> Option<LaunchCommand> {
        match (&config.activation.launch_command, &catalog.app_image_path) {
            (Some(command), _) => {
                Some(LaunchCommand::new(command.clone()).with_args(config.activation.launch_args.clone()))
            }
            (None, Some(path)) => Some(LaunchCommand::new(path.clone())),
            (None, None) => None,
        }
    }

    fn is_activation_character(&self) -> bool {
        self.sequencer.catalog().character == self.config.activation.character
    }

    #[allow(dead_code)]
    pub fn surface(&self) -> &HeadlessSurface {
        &self.surface
    }

    #[allow(dead_code)]
    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub async fn run(&mut self, mut gestures: mpsc::Receiver<Gesture>) -> Result<()> {
        info!(
            "PetRuntime запущен для '{}', случайные действия каждые {}мс",
            self.sequencer.catalog().character,
            self.sequencer.catalog().refresh.as_millis()
        );

        let mut random_timer = Self::make_interval(self.sequencer.catalog().refresh);
        let mut animation: Option<Interval> = None;
        let mut animation_generation = None;
        let mut gestures_open = true;

        let shutdown = signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            self.sync_animation_clock(&mut animation, &mut animation_generation);

            tokio::select! {
                _ = next_frame(&mut animation) => {
                    self.sequencer.on_tick(&mut self.surface);
                }
                _ = random_timer.tick() => {
                    self.sequencer.play_random();
                }
                gesture = gestures.recv(), if gestures_open => match gesture {
                    Some(gesture) => {
                        if self.handle_gesture(gesture).await == Flow::Quit {
                            info!("Получена команда выхода");
                            break;
                        }
                        // Смена персонажа меняет период случайных действий
                        if random_timer.period() != self.sequencer.catalog().refresh {
                            random_timer = Self::make_interval(self.sequencer.catalog().refresh);
                        }
                    }
                    None => {
                        debug!("Источник жестов завершился");
                        gestures_open = false;
                    }
                },
                result = &mut shutdown => {
                    match result {
                        Ok(()) => info!("Получен сигнал завершения (Ctrl+C)"),
                        Err(err) => error!("Ошибка при ожидании сигнала завершения: {}", err),
                    }
                    break;
                }
            }
        }

        info!(
            "PetRuntime остановлен, показано кадров: {}, последний: {:?}",
            self.surface.frames_shown(),
            self.surface.current_frame().map(|f| f.index)
        );
        Ok(())
    }

    fn make_interval(period: Duration) -> Interval {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    }

    /// Перезапускает таймер анимации, если движок его запустил заново или остановил
    fn sync_animation_clock(&self, animation: &mut Option<Interval>, generation: &mut Option<u64>) {
        let clock = self.sequencer.clock();
        if !clock.is_running() {
            *animation = None;
            *generation = None;
            return;
        }

        if *generation != Some(clock.generation()) {
            *animation = clock.interval().map(Self::make_interval);
            *generation = Some(clock.generation());
        }
    }

    async fn handle_gesture(&mut self, gesture: Gesture) -> Flow {
        debug!("Жест: {} (движок занят: {})", gesture, self.sequencer.is_busy());

        match gesture {
            Gesture::HoverEnter => {
                if self.sequencer.catalog().greet_on_hover || self.is_activation_character() {
                    self.sequencer.greet();
                }
            }
            Gesture::Press(cursor) => self.drag.on_press(cursor, self.surface.position()),
            Gesture::Move(cursor) => {
                if let Some(position) = self.drag.on_move(cursor) {
                    self.surface.move_to(position);
                }
            }
            Gesture::Release(cursor) => self.on_release(cursor).await,
            Gesture::Click => {
                let at = self.surface.position();
                self.drag.on_press(at, at);
                self.on_release(at).await;
            }
            Gesture::Play(action_id) => self.sequencer.play_specific(&action_id),
            Gesture::Random => self.sequencer.play_random(),
            Gesture::Switch(character) => self.switch_character(&character),
            Gesture::Quit => return Flow::Quit,
        }

        Flow::Continue
    }

    async fn on_release(&mut self, cursor: Position) {
        match self.drag.on_release(cursor, std::time::Instant::now()) {
            Release::Click => self.on_click().await,
            Release::Debounced => debug!("Повторный клик подавлен"),
            Release::Drag => debug!("Питомец перетащен в {}", self.surface.position()),
            Release::Ignored => {}
        }
    }

    /// Клик переключает окно приложения только у персонажа активации.
    /// Проверка окон блокирует цикл на время работы внешних утилит.
    async fn on_click(&mut self) {
        if !self.is_activation_character() {
            debug!("Клик по '{}' без действия", self.sequencer.catalog().character);
            return;
        }

        self.activator
            .handle_activation_click(&self.config.activation.window_title, self.launch.as_ref())
            .await;
    }

    fn switch_character(&mut self, character: &str) {
        match self.loader.load(character) {
            Ok(catalog) => {
                self.launch = Self::resolve_launch(&self.config, &catalog);
                self.sequencer.replace_catalog(Arc::new(catalog));
                info!("Персонаж сменён на '{}'", character);
            }
            Err(e) => warn!("Не удалось сменить персонажа на '{}': {}", character, e),
        }
    }
}

/// Ожидание следующего кадра; без запущенного таймера - никогда
async fn next_frame(animation: &mut Option<Interval>) {
    match animation {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
