use thiserror::Error;

#[derive(Error, Debug)]
pub enum PetError {
    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка каталога действий: {0}")]
    Catalog(String),

    #[error("Неизвестное действие: {0}")]
    UnknownAction(String),

    #[error("Внешняя утилита завершилась с ошибкой: {0}")]
    Tool(String),

    #[error("Превышено время ожидания: {0}")]
    Timeout(String),

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

impl PetError {
    pub fn catalog<T>(msg: impl Into<String>) -> Result<T> {
        Err(PetError::Catalog(msg.into()))
    }
}

pub type Result<T> = std::result::Result<T, PetError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! pet_error {
    (catalog, $($arg:tt)*) => {
        $crate::error::PetError::Catalog(format!($($arg)*))
    };
    (tool, $($arg:tt)*) => {
        $crate::error::PetError::Tool(format!($($arg)*))
    };
    (timeout, $($arg:tt)*) => {
        $crate::error::PetError::Timeout(format!($($arg)*))
    };
    (internal, $($arg:tt)*) => {
        $crate::error::PetError::Internal(format!($($arg)*))
    };
}
