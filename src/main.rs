mod bot;
mod config;
mod prices;

use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::{dispatching::dialogue::InMemStorage, prelude::*};

use crate::bot::contact::ContactDesk;
use crate::bot::gallery::ImageDir;
use crate::bot::handlers::schema;
use crate::bot::states::State;
use crate::config::Config;
use crate::prices::PriceTable;

#[tokio::main]
async fn main() {
    dotenv().ok();

    pretty_env_logger::init();
    log::info!("Запуск бота...");

    let config = Config::from_env().unwrap_or_else(|e| {
        log::error!("Ошибка конфигурации: {e}");
        std::process::exit(1);
    });

    let table = PriceTable::load(config.price_table.as_deref()).unwrap_or_else(|e| {
        log::error!("Не удалось загрузить таблицу цен: {e}");
        std::process::exit(1);
    });

    let images = ImageDir::new(config.image_dir.clone());
    let desk = ContactDesk {
        operator: config.operator_chat_id,
        hours: config.working_hours.clone(),
    };

    let bot = Bot::from_env();

    log::info!("Бот успешно запущен. Ожидаем команды.");
    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![
            InMemStorage::<State>::new(),
            Arc::new(table),
            Arc::new(images),
            Arc::new(desk)
        ])
        .default_handler(|upd| async move {
            log::debug!("Необработанное обновление: {:?}", upd.id);
        })
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}
