use std::fmt;

/// Класс окна по результатам проверки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowClass {
    /// Окно не удалось запросить вообще
    Missing,
    /// Нулевой/1x1 размер или окно не отображено
    Degenerate,
    /// Окно выведено из-под управления оконного менеджера
    Withdrawn,
    /// Свёрнуто (`_NET_WM_STATE_HIDDEN`), но валидно
    Minimized,
    Visible,
}

impl WindowClass {
    /// Пригодно ли окно для переключения
    pub fn is_valid(&self) -> bool {
        matches!(self, WindowClass::Minimized | WindowClass::Visible)
    }
}

/// Результат проверки одного окна, создаётся на каждый клик
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowProbeResult {
    pub window_id: String,
    pub class: WindowClass,
    pub exists: bool,
    pub mapped: bool,
    pub hidden: bool,
    pub withdrawn: bool,
}

impl WindowProbeResult {
    pub fn new(window_id: impl Into<String>, class: WindowClass) -> Self {
        let exists = class != WindowClass::Missing;
        Self {
            window_id: window_id.into(),
            class,
            exists,
            mapped: exists && class != WindowClass::Degenerate,
            hidden: class == WindowClass::Minimized,
            withdrawn: class == WindowClass::Withdrawn,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.exists && self.mapped && !self.withdrawn
    }
}

impl fmt::Display for WindowProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "окно {} ({:?})", self.window_id, self.class)
    }
}

/// Геометрия и состояние отображения из `xwininfo`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowGeometry {
    pub width: u32,
    pub height: u32,
    pub unmapped: bool,
}
