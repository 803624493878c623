use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
mod catalog;
mod config;
mod error;
mod events;
mod services;
mod utils;

use catalog::CatalogLoader;
use config::Config;
use services::{create_gesture_source, create_window_system, PetRuntime, WindowActivator};
use utils::init_tracing;

#[derive(Parser, Debug)]
#[command(name = "desk-pet")]
#[command(about = "Десктопный питомец с анимациями и переключением окна приложения")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "pet.toml")]
    config: String,

    /// Персонаж (по умолчанию из конфигурации или первый найденный)
    #[arg(long)]
    character: Option<String>,

    /// Режим сухого запуска (эмуляция окон и жестов)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Загрузка конфигурации
    let mut config = Config::load(&args.config)?;
    if let Some(character) = &args.character {
        config.pet.character = character.clone();
    }

    // Инициализация системы логирования
    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    init_tracing(level, &config.logging.format)?;

    info!("Запуск desk-pet v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);

    if args.dry_run {
        warn!("Режим сухого запуска - окна и жесты эмулируются");
    } else {
        utils::environment::check_environment();
    }

    // Ошибки каталога фатальны: движок не стартует с битыми ссылками
    let loader = CatalogLoader::new(&config.pet.role_dir);
    let character = loader.resolve_character(&config.pet.character)?;
    let catalog = loader.load(&character)?;

    let config = Arc::new(config);
    let activator = WindowActivator::new(create_window_system(&config.activation, args.dry_run));
    let mut runtime = PetRuntime::new(config.clone(), loader, catalog, activator);

    info!("Все компоненты инициализированы");

    let (tx, rx) = mpsc::channel(64);
    let gesture_source = create_gesture_source(args.dry_run);
    let gesture_handle = tokio::spawn(async move {
        if let Err(e) = gesture_source.run(tx).await {
            error!("Ошибка в источнике жестов: {}", e);
        }
    });

    runtime.run(rx).await?;

    gesture_handle.abort();

    info!("desk-pet завершил работу");
    Ok(())
}
