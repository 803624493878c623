use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Настройка логирования. `RUST_LOG` важнее уровня из конфигурации и CLI.
///
/// `format`: `compact` для обычной работы, `pretty` - многострочный вывод
/// для отладки переходов между действиями.
pub fn init_tracing(level: &str, format: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    let registry = tracing_subscriber::registry().with(filter);
    if format == "pretty" {
        registry.with(tracing_subscriber::fmt::layer().pretty()).init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().compact().with_target(false))
            .init();
    }

    Ok(())
}

// Таймер анимации тикает десятки раз в секунду: аргументы форматируются
// только когда уровень действительно включён
#[macro_export]
macro_rules! debug_if_enabled {
    ($($arg:tt)*) => {
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! trace_if_enabled {
    ($($arg:tt)*) => {
        if tracing::enabled!(tracing::Level::TRACE) {
            tracing::trace!($($arg)*);
        }
    };
}
