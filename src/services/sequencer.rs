use crate::catalog::{Action, ActionCatalog, ActionId};
use crate::debug_if_enabled;
use crate::services::clock::AnimationClock;
use crate::services::movement;
use crate::services::surface::PetSurface;
use crate::trace_if_enabled;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::{debug, info, warn};

const GREETING_ACTION: &str = "default";

/// Изменяемое состояние движка. Сбрасывается между последовательностями,
/// но не пересоздаётся.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequencerState {
    /// Проигрываемая последовательность, пустая в простое
    pub active_sequence: Vec<Arc<Action>>,
    pub sequence_index: usize,
    pub frame_index: usize,
    pub remaining_repeats: u32,
    pub is_playing: bool,
    /// Истинно только во время передачи управления следующему действию
    pub is_transitioning: bool,
    /// Одноместный почтовый ящик прерывания: последняя запись побеждает
    pub pending_action_id: Option<ActionId>,
}

impl SequencerState {
    fn reset(&mut self) {
        self.active_sequence.clear();
        self.sequence_index = 0;
        self.frame_index = 0;
        self.remaining_repeats = 0;
        self.is_playing = false;
        self.is_transitioning = false;
        self.pending_action_id = None;
    }
}

/// Конечный автомат проигрывания действий.
///
/// Ничего не рисует сам: на каждый тик таймера выбирает кадр и позицию и
/// передаёт их в `PetSurface`. Таймер (`AnimationClock`) только запускается
/// и останавливается здесь, ждёт его хост.
pub struct Sequencer {
    catalog: Arc<ActionCatalog>,
    state: SequencerState,
    clock: AnimationClock,
    rng: SmallRng,
}

impl Sequencer {
    pub fn new(catalog: Arc<ActionCatalog>) -> Self {
        Self::with_rng(catalog, SmallRng::from_os_rng())
    }

    pub fn with_rng(catalog: Arc<ActionCatalog>, rng: SmallRng) -> Self {
        info!(
            "Инициализация Sequencer для '{}' ({} действий)",
            catalog.character,
            catalog.len()
        );
        Self {
            catalog,
            state: SequencerState::default(),
            clock: AnimationClock::new(),
            rng,
        }
    }

    pub fn catalog(&self) -> &Arc<ActionCatalog> {
        &self.catalog
    }

    #[allow(dead_code)]
    pub fn state(&self) -> &SequencerState {
        &self.state
    }

    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_playing || self.state.is_transitioning
    }

    /// Смена персонажа: текущая анимация и отложенное действие отбрасываются
    pub fn replace_catalog(&mut self, catalog: Arc<ActionCatalog>) {
        info!("Sequencer переключается на персонажа '{}'", catalog.character);
        self.clock.stop();
        self.state.reset();
        self.catalog = catalog;
    }

    /// Проиграть действие. В простое оно стартует сразу, иначе
    /// перезаписывает отложенное действие и будет запущено на ближайшем переходе.
    pub fn play_specific(&mut self, action_id: &str) {
        if self.is_busy() {
            match self.state.pending_action_id.replace(action_id.to_string()) {
                Some(previous) if previous != action_id => {
                    debug!("Отложенное действие '{}' заменено на '{}'", previous, action_id)
                }
                _ => debug!("Действие '{}' отложено до завершения текущего", action_id),
            }
            return;
        }

        self.start_specific(action_id);
    }

    /// Приветствие при наведении мыши: действие с id `default`, а если
    /// в каталоге такого нет - действие, на которое указывает привязка `default`
    pub fn greet(&mut self) {
        let greeting = if self.catalog.get(GREETING_ACTION).is_ok() {
            GREETING_ACTION.to_string()
        } else {
            self.catalog.directional.default.clone()
        };
        self.play_specific(&greeting);
    }

    /// Случайная последовательность из каталога; занятый движок не трогается
    pub fn play_random(&mut self) {
        if self.is_busy() {
            trace_if_enabled!("Sequencer занят, случайное действие пропущено");
            return;
        }

        let Some(sequence) = self.catalog.random_sequences().choose(&mut self.rng).cloned() else {
            debug!("У персонажа '{}' нет случайных последовательностей", self.catalog.character);
            return;
        };

        debug_if_enabled!(
            "Случайная последовательность: {:?}",
            sequence.iter().map(|a| a.id.as_str()).collect::<Vec<_>>()
        );
        self.start_sequence(sequence);
    }

    /// Один тик таймера анимации: ровно один кадр
    pub fn on_tick(&mut self, surface: &mut dyn PetSurface) {
        if !self.state.is_playing || self.state.sequence_index >= self.state.active_sequence.len() {
            self.clock.stop();
            return;
        }

        let action = Arc::clone(&self.state.active_sequence[self.state.sequence_index]);
        let Some(frame) = action.images.get(self.state.frame_index) else {
            warn!("Действие '{}' без кадра #{}", action.id, self.state.frame_index);
            self.go_idle();
            return;
        };
        surface.show_frame(frame);

        let border = self.catalog.size as i32;
        let next = if action.needs_move {
            movement::next_position(surface.position(), &action, surface.screen(), border)
        } else {
            movement::stationary_position(surface.position(), surface.screen(), border)
        };
        surface.move_to(next);

        self.state.frame_index += 1;
        if self.state.frame_index < action.frame_count() {
            return;
        }

        // Прошли все кадры действия
        self.state.frame_index = 0;
        self.state.remaining_repeats = self.state.remaining_repeats.saturating_sub(1);
        if self.state.remaining_repeats > 0 {
            return;
        }

        debug_if_enabled!("Действие '{}' завершено", action.id);
        self.state.sequence_index += 1;
        self.clock.stop();
        self.transition();
    }

    /// Переход между действиями. Отложенное действие всегда побеждает
    /// остаток текущей последовательности, остаток отбрасывается.
    fn transition(&mut self) {
        self.state.is_transitioning = true;

        if let Some(next_id) = self.state.pending_action_id.take() {
            self.state.is_playing = false;
            self.start_specific(&next_id);
            if !self.state.is_playing {
                self.go_idle();
            }
        } else if self.state.sequence_index < self.state.active_sequence.len() {
            self.start_current_action();
        } else {
            self.go_idle();
        }

        self.state.is_transitioning = false;
    }

    fn start_specific(&mut self, action_id: &str) {
        match self.catalog.get(action_id) {
            Ok(action) => {
                let action = Arc::clone(action);
                self.start_sequence(vec![action]);
            }
            Err(e) => warn!("Действие пропущено: {}", e),
        }
    }

    fn start_sequence(&mut self, sequence: Vec<Arc<Action>>) {
        self.state.active_sequence = sequence;
        self.state.sequence_index = 0;
        self.state.frame_index = 0;
        self.state.is_playing = true;
        self.start_current_action();
    }

    fn start_current_action(&mut self) {
        let Some(action) = self.state.active_sequence.get(self.state.sequence_index).cloned() else {
            self.go_idle();
            return;
        };

        debug_if_enabled!("Старт действия {}", action);
        self.state.frame_index = 0;
        self.state.remaining_repeats = action.repeat_count;
        self.clock.start(action.frame_interval);
    }

    fn go_idle(&mut self) {
        self.clock.stop();
        self.state.active_sequence.clear();
        self.state.sequence_index = 0;
        self.state.frame_index = 0;
        self.state.remaining_repeats = 0;
        self.state.is_playing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::action::tests::{action, catalog};
    use crate::catalog::{Direction, FrameHandle};
    use crate::services::surface::{Position, ScreenBounds};
    use std::time::Duration;

    /// Поверхность, записывающая все вызовы движка
    struct RecordingSurface {
        frames: Vec<(String, u32)>,
        position: Position,
        moves: Vec<Position>,
    }

    impl RecordingSurface {
        fn new() -> Self {
            Self {
                frames: Vec::new(),
                position: Position::new(500, 500),
                moves: Vec::new(),
            }
        }

        fn frame_paths(&self) -> Vec<&str> {
            self.frames.iter().map(|(p, _)| p.as_str()).collect()
        }
    }

    impl PetSurface for RecordingSurface {
        fn show_frame(&mut self, frame: &FrameHandle) {
            self.frames
                .push((frame.path.to_string_lossy().into_owned(), frame.index));
        }

        fn move_to(&mut self, position: Position) {
            self.position = position;
            self.moves.push(position);
        }

        fn position(&self) -> Position {
            self.position
        }

        fn screen(&self) -> ScreenBounds {
            ScreenBounds {
                width: 1920,
                height: 1080,
            }
        }
    }

    fn tagged(id: &str, frames: u32, repeat_count: u32) -> Arc<Action> {
        let mut a = (*action(id, frames, repeat_count)).clone();
        for frame in &mut a.images {
            frame.path = format!("{}/{}", id, frame.index).into();
        }
        Arc::new(a)
    }

    fn sequencer(actions: &[Arc<Action>], random: Vec<Vec<&str>>) -> Sequencer {
        Sequencer::with_rng(Arc::new(catalog(actions, random)), SmallRng::seed_from_u64(7))
    }

    /// Крутит таймер, пока он запущен
    fn run_to_idle(seq: &mut Sequencer, surface: &mut RecordingSurface) -> usize {
        let mut ticks = 0;
        while seq.clock().is_running() {
            seq.on_tick(surface);
            ticks += 1;
            assert!(ticks < 10_000, "анимация не завершилась");
        }
        ticks
    }

    #[test]
    fn test_greet_end_to_end() {
        let mut seq = sequencer(&[tagged("greet", 3, 1)], vec![]);
        let mut surface = RecordingSurface::new();

        seq.play_specific("greet");
        assert!(seq.state().is_playing);
        assert_eq!(seq.clock().interval(), Some(Duration::from_millis(40)));

        run_to_idle(&mut seq, &mut surface);

        assert_eq!(surface.frame_paths(), vec!["greet/0", "greet/1", "greet/2"]);
        assert!(!seq.state().is_playing);
        assert!(!seq.is_busy());
        assert_eq!(seq.state().pending_action_id, None);
        assert!(seq.state().active_sequence.is_empty());
    }

    #[test]
    fn test_repeat_count_multiplies_frames() {
        for (frames, repeats) in [(1, 1), (4, 3), (2, 5)] {
            let mut seq = sequencer(&[tagged("loop", frames, repeats)], vec![]);
            let mut surface = RecordingSurface::new();

            seq.play_specific("loop");
            run_to_idle(&mut seq, &mut surface);

            assert_eq!(surface.frames.len(), (frames * repeats) as usize);
            assert!(!seq.is_busy());
        }
    }

    #[test]
    fn test_random_sequence_plays_back_to_back() {
        let mut seq = sequencer(
            &[tagged("sit", 2, 1), tagged("walk", 1, 2)],
            vec![vec!["sit", "walk"]],
        );
        let mut surface = RecordingSurface::new();

        seq.play_random();
        run_to_idle(&mut seq, &mut surface);

        assert_eq!(surface.frame_paths(), vec!["sit/0", "sit/1", "walk/0", "walk/0"]);
    }

    #[test]
    fn test_interrupt_waits_for_frame_loop_and_discards_rest() {
        let mut seq = sequencer(
            &[tagged("sit", 3, 1), tagged("walk", 2, 1), tagged("wave", 2, 1)],
            vec![vec!["sit", "walk"]],
        );
        let mut surface = RecordingSurface::new();

        seq.play_random();
        seq.on_tick(&mut surface);
        seq.play_specific("wave");
        assert_eq!(seq.state().pending_action_id.as_deref(), Some("wave"));

        run_to_idle(&mut seq, &mut surface);

        assert_eq!(
            surface.frame_paths(),
            vec!["sit/0", "sit/1", "sit/2", "wave/0", "wave/1"]
        );
        assert_eq!(seq.state().pending_action_id, None);
    }

    #[test]
    fn test_interrupt_last_write_wins() {
        let mut seq = sequencer(
            &[tagged("sit", 2, 1), tagged("x", 1, 1), tagged("y", 1, 1)],
            vec![],
        );
        let mut surface = RecordingSurface::new();

        seq.play_specific("sit");
        seq.play_specific("x");
        seq.play_specific("y");
        run_to_idle(&mut seq, &mut surface);

        assert_eq!(surface.frame_paths(), vec!["sit/0", "sit/1", "y/0"]);
    }

    #[test]
    fn test_play_random_while_busy_is_noop() {
        let mut seq = sequencer(
            &[tagged("sit", 3, 2), tagged("walk", 2, 1)],
            vec![vec!["walk"]],
        );
        let mut surface = RecordingSurface::new();

        seq.play_specific("sit");
        seq.on_tick(&mut surface);
        let before = seq.state().clone();
        let clock_before = seq.clock().clone();

        seq.play_random();

        assert_eq!(seq.state(), &before);
        assert_eq!(seq.clock(), &clock_before);
    }

    #[test]
    fn test_unknown_action_is_ignored() {
        let mut seq = sequencer(&[tagged("sit", 1, 1)], vec![]);
        seq.play_specific("dance");

        assert!(!seq.is_busy());
        assert!(!seq.clock().is_running());
    }

    #[test]
    fn test_unknown_pending_action_leaves_engine_idle() {
        let mut seq = sequencer(&[tagged("sit", 1, 1), tagged("walk", 1, 1)], vec![vec!["sit", "walk"]]);
        let mut surface = RecordingSurface::new();

        seq.play_random();
        seq.play_specific("dance");
        run_to_idle(&mut seq, &mut surface);

        // Остаток последовательности отброшен, неизвестное действие пропущено
        assert_eq!(surface.frame_paths(), vec!["sit/0"]);
        assert!(!seq.is_busy());
        assert_eq!(seq.state().pending_action_id, None);
    }

    #[test]
    fn test_clock_follows_action_interval() {
        let mut slow = (*tagged("slow", 1, 1)).clone();
        slow.frame_interval = Duration::from_millis(250);
        let mut seq = sequencer(&[tagged("fast", 1, 1), Arc::new(slow)], vec![vec!["fast", "slow"]]);
        let mut surface = RecordingSurface::new();

        seq.play_random();
        assert_eq!(seq.clock().interval(), Some(Duration::from_millis(40)));
        seq.on_tick(&mut surface);
        assert_eq!(seq.clock().interval(), Some(Duration::from_millis(250)));
        seq.on_tick(&mut surface);
        assert!(!seq.clock().is_running());
    }

    #[test]
    fn test_moving_action_relocates_surface() {
        let mut walk = (*tagged("walk", 2, 1)).clone();
        walk.needs_move = true;
        walk.direction = Some(Direction::Right);
        walk.frame_step_pixels = 30;
        let mut seq = sequencer(&[Arc::new(walk)], vec![]);
        let mut surface = RecordingSurface::new();

        seq.play_specific("walk");
        run_to_idle(&mut seq, &mut surface);

        assert_eq!(surface.moves, vec![Position::new(530, 500), Position::new(560, 500)]);
    }

    #[test]
    fn test_stationary_action_wraps_dragged_pet() {
        let mut seq = sequencer(&[tagged("sit", 1, 1)], vec![]);
        let mut surface = RecordingSurface::new();
        surface.position = Position::new(1900, 500);

        seq.play_specific("sit");
        seq.on_tick(&mut surface);

        assert_eq!(surface.position, Position::new(128, 500));
    }

    #[test]
    fn test_greet_queues_while_busy() {
        let mut seq = sequencer(&[tagged("hello", 1, 1), tagged("sit", 2, 1)], vec![]);
        let mut surface = RecordingSurface::new();

        seq.play_specific("sit");
        seq.greet();
        assert_eq!(seq.state().pending_action_id.as_deref(), Some("hello"));

        run_to_idle(&mut seq, &mut surface);
        assert_eq!(surface.frame_paths(), vec!["sit/0", "sit/1", "hello/0"]);
    }

    #[test]
    fn test_greet_prefers_action_named_default() {
        // Привязка `default` указывает на "hello", но есть и действие "default"
        let mut seq = sequencer(&[tagged("hello", 1, 1), tagged("default", 2, 1)], vec![]);
        let mut surface = RecordingSurface::new();

        seq.greet();
        run_to_idle(&mut seq, &mut surface);
        assert_eq!(surface.frame_paths(), vec!["default/0", "default/1"]);

        seq.play_specific("hello");
        seq.greet();
        assert_eq!(seq.state().pending_action_id.as_deref(), Some("default"));
    }

    #[test]
    fn test_replace_catalog_resets_state() {
        let mut seq = sequencer(&[tagged("sit", 3, 1)], vec![]);
        let mut surface = RecordingSurface::new();
        seq.play_specific("sit");
        seq.on_tick(&mut surface);
        seq.play_specific("sit");

        seq.replace_catalog(Arc::new(catalog(&[tagged("run", 1, 1)], vec![])));

        assert_eq!(seq.state(), &SequencerState::default());
        assert!(!seq.clock().is_running());
        seq.play_specific("sit");
        assert!(!seq.is_busy());
        seq.play_specific("run");
        assert!(seq.is_busy());
    }

    #[test]
    fn test_tick_while_idle_stops_clock() {
        let mut seq = sequencer(&[tagged("sit", 1, 1)], vec![]);
        let mut surface = RecordingSurface::new();

        seq.on_tick(&mut surface);

        assert!(surface.frames.is_empty());
        assert!(!seq.clock().is_running());
    }
}
