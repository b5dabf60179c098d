use std::path::{Path, PathBuf};
use teloxide::types::ChatId;
use thiserror::Error;

use crate::bot::common::{back_to_menu_keyboard, style_keyboard, Reply};
use crate::bot::transport::{DeliveryError, Transport};
use crate::prices::PriceTable;

pub const MAX_EXAMPLES: usize = 5;

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];
const INVALID_STYLE: &str = "Пожалуйста, выберите стиль из списка.";
const NO_EXAMPLES: &str = "Извините, пока нет примеров для этого стиля.";
const BACK_HINT: &str = "Вы можете вернуться в главное меню:";

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("папка не найдена: {0}")]
    NotFound(PathBuf),

    #[error("не удалось прочитать {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Папка с примерами: по подпапке на каждый стиль.
#[derive(Debug, Clone)]
pub struct ImageDir {
    root: PathBuf,
}

impl ImageDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Первые [`MAX_EXAMPLES`] картинок стиля в порядке имён файлов.
    pub async fn lookup(&self, style: &str) -> Result<Vec<PathBuf>, LookupError> {
        let dir = self.root.join(style);
        let io_error = |source| LookupError::Io {
            path: dir.clone(),
            source,
        };

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LookupError::NotFound(dir.clone()));
            }
            Err(e) => return Err(io_error(e)),
        };

        let mut images = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
            let path = entry.path();
            if is_image(&path) {
                images.push(path);
            }
        }

        images.sort();
        images.truncate(MAX_EXAMPLES);
        Ok(images)
    }
}

impl LookupError {
    fn log_level(&self) -> log::Level {
        match self {
            LookupError::NotFound(_) => log::Level::Warn,
            LookupError::Io { .. } => log::Level::Error,
        }
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

pub fn choose_style_prompt(table: &PriceTable) -> Reply {
    Reply::text("🎨 Выберите стиль, чтобы посмотреть примеры работ:").with_keyboard(style_keyboard(table))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryStep {
    AwaitingStyle,
    Terminal,
}

/// Отправляет примеры выбранного стиля. Неудачная отправка одной
/// картинки не прерывает остальные.
pub async fn send_examples<T>(
    transport: &T,
    chat_id: ChatId,
    table: &PriceTable,
    images: &ImageDir,
    style: &str,
) -> Result<GalleryStep, DeliveryError>
where
    T: Transport + ?Sized,
{
    if !table.is_style(style) {
        transport.deliver_text(chat_id, &Reply::text(INVALID_STYLE)).await?;
        return Ok(GalleryStep::AwaitingStyle);
    }
    log::info!("[EXAMPLES] Пользователь выбрал стиль: {style}");

    let paths = match images.lookup(style).await {
        Ok(paths) => paths,
        Err(e) => {
            log::log!(e.log_level(), "[EXAMPLES] {e}");
            Vec::new()
        }
    };

    if paths.is_empty() {
        let reply = Reply::text(NO_EXAMPLES).with_keyboard(back_to_menu_keyboard());
        transport.deliver_text(chat_id, &reply).await?;
        return Ok(GalleryStep::Terminal);
    }

    let header = Reply::text(format!("🖼 Примеры работ в стиле «{style}»:"));
    transport.deliver_text(chat_id, &header).await?;

    for path in &paths {
        match transport.deliver_photo(chat_id, path).await {
            Ok(()) => log::info!("[EXAMPLES] Отправлено изображение: {}", path.display()),
            Err(e) => {
                log::error!("[EXAMPLES] Ошибка при отправке {}: {e}", path.display());
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                transport
                    .deliver_text(chat_id, &Reply::text(format!("⚠️ Не удалось отправить: {name}")))
                    .await?;
            }
        }
    }

    let closing = Reply::text(BACK_HINT).with_keyboard(back_to_menu_keyboard());
    transport.deliver_text(chat_id, &closing).await?;
    Ok(GalleryStep::Terminal)
}
