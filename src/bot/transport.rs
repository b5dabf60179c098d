use async_trait::async_trait;
use std::path::{Path, PathBuf};
use teloxide::prelude::*;
use teloxide::types::InputFile;
use thiserror::Error;

use crate::bot::common::Reply;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("запрос к Telegram не выполнен: {0}")]
    Request(#[from] teloxide::RequestError),

    #[error("не удалось прочитать {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Отправка исходящих сообщений. Подключение, повторы и лимиты
/// остаются на стороне реализации.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn deliver_text(&self, chat_id: ChatId, reply: &Reply) -> Result<(), DeliveryError>;

    async fn deliver_photo(&self, chat_id: ChatId, path: &Path) -> Result<(), DeliveryError>;
}

/// Отправляет ответы по порядку, останавливаясь на первой ошибке.
pub async fn deliver_all<T>(transport: &T, chat_id: ChatId, replies: &[Reply]) -> Result<(), DeliveryError>
where
    T: Transport + ?Sized,
{
    for reply in replies {
        transport.deliver_text(chat_id, reply).await?;
    }
    Ok(())
}

#[async_trait]
impl Transport for Bot {
    async fn deliver_text(&self, chat_id: ChatId, reply: &Reply) -> Result<(), DeliveryError> {
        let request = self.send_message(chat_id, reply.text.clone());
        match reply.keyboard.to_markup() {
            Some(markup) => request.reply_markup(markup).await?,
            None => request.await?,
        };
        Ok(())
    }

    async fn deliver_photo(&self, chat_id: ChatId, path: &Path) -> Result<(), DeliveryError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| DeliveryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.send_photo(chat_id, InputFile::memory(bytes).file_name(file_name))
            .await?;
        Ok(())
    }
}
