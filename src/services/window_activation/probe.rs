//! Классификация окна по нескольким частично пересекающимся запросам.
//!
//! Ни один запрос к оконной системе не достоверен сам по себе, поэтому
//! результаты собираются в `WindowFacts`, а класс окна определяет
//! упорядоченная таблица правил: первое сработавшее правило побеждает.

use crate::events::{WindowClass, WindowGeometry, WindowProbeResult};
use crate::trace_if_enabled;
use tracing::debug;

use super::r#trait::WindowSystem;

const STATE_WITHDRAWN: &str = "_NET_WM_STATE_WITHDRAWN";
const STATE_HIDDEN: &str = "_NET_WM_STATE_HIDDEN";

/// Сырые результаты запросов об одном окне
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowFacts {
    /// Удалось ли запросить заголовок окна
    pub name_ok: bool,
    /// `None` - xwininfo не смог описать окно
    pub geometry: Option<WindowGeometry>,
    /// `None` - запрос `_NET_WM_STATE` не удался
    pub wm_state: Option<String>,
}

type Rule = fn(&WindowFacts) -> Option<WindowClass>;

/// Порядок важен: существование -> геометрия -> отображение -> расширенное состояние
const RULES: &[(&str, Rule)] = &[
    ("existence", rule_existence),
    ("geometry", rule_geometry),
    ("map_state", rule_map_state),
    ("withdrawn", rule_withdrawn),
    ("hidden", rule_hidden),
];

fn rule_existence(facts: &WindowFacts) -> Option<WindowClass> {
    (!facts.name_ok || facts.geometry.is_none()).then_some(WindowClass::Missing)
}

fn rule_geometry(facts: &WindowFacts) -> Option<WindowClass> {
    let geometry = facts.geometry?;
    let degenerate = geometry.width == 0
        || geometry.height == 0
        || (geometry.width == 1 && geometry.height == 1);
    degenerate.then_some(WindowClass::Degenerate)
}

fn rule_map_state(facts: &WindowFacts) -> Option<WindowClass> {
    facts
        .geometry
        .filter(|g| g.unmapped)
        .map(|_| WindowClass::Degenerate)
}

fn rule_withdrawn(facts: &WindowFacts) -> Option<WindowClass> {
    facts
        .wm_state
        .as_deref()
        .filter(|state| state.contains(STATE_WITHDRAWN))
        .map(|_| WindowClass::Withdrawn)
}

fn rule_hidden(facts: &WindowFacts) -> Option<WindowClass> {
    facts
        .wm_state
        .as_deref()
        .filter(|state| state.contains(STATE_HIDDEN))
        .map(|_| WindowClass::Minimized)
}

/// Класс окна; если ни одно правило не сработало, окно видимо
/// (в том числе когда не удался только запрос состояния)
pub fn classify(facts: &WindowFacts) -> WindowClass {
    RULES
        .iter()
        .find_map(|(name, rule)| {
            let class = rule(facts)?;
            trace_if_enabled!("Правило '{}' -> {:?}", name, class);
            Some(class)
        })
        .unwrap_or(WindowClass::Visible)
}

/// Собирает факты об окне, останавливаясь, как только исход ясен
pub async fn gather_facts(system: &dyn WindowSystem, window_id: &str) -> WindowFacts {
    let mut facts = WindowFacts::default();

    if let Err(e) = system.window_name(window_id).await {
        debug!("Окно {} не запрашивается: {}", window_id, e);
        return facts;
    }
    facts.name_ok = true;

    match system.geometry(window_id).await {
        Ok(geometry) => facts.geometry = Some(geometry),
        Err(e) => {
            debug!("Нет геометрии окна {}: {}", window_id, e);
            return facts;
        }
    }

    match system.wm_state(window_id).await {
        Ok(state) => facts.wm_state = Some(state),
        Err(e) => debug!("Нет _NET_WM_STATE окна {}: {}", window_id, e),
    }

    facts
}

pub async fn probe_window(system: &dyn WindowSystem, window_id: &str) -> WindowProbeResult {
    let facts = gather_facts(system, window_id).await;
    let result = WindowProbeResult::new(window_id, classify(&facts));
    debug!("Проверка: {}", result);
    result
}
