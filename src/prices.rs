use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::bot::common::DONE;
use crate::bot::states::MenuEntry;

#[derive(Debug, Error)]
pub enum PriceTableError {
    #[error("не удалось прочитать {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("некорректный формат таблицы цен: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("в таблице цен нет ни одного размера")]
    NoSizes,

    #[error("в таблице цен нет ни одного стиля")]
    NoStyles,

    #[error("стиль без отрисовки «{0}» отсутствует в списке стилей")]
    UnknownFlatStyle(String),

    #[error("повторяющееся значение «{0}»")]
    Duplicate(String),

    #[error("«{0}» совпадает с кнопкой меню или командой")]
    ReservedName(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PricedItem {
    pub name: String,
    pub price: u32,
}

impl PricedItem {
    fn new(name: &str, price: u32) -> Self {
        Self {
            name: name.to_string(),
            price,
        }
    }
}

/// Прайс-лист: размеры холстов, стили и дополнительные опции.
///
/// Загружается один раз при старте и дальше только читается.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PriceTable {
    sizes: Vec<PricedItem>,
    styles: Vec<String>,
    flat_style: String,
    #[serde(default)]
    add_ons: Vec<PricedItem>,
}

impl Default for PriceTable {
    fn default() -> Self {
        Self {
            sizes: vec![
                PricedItem::new("20×30", 1245),
                PricedItem::new("30×40", 1545),
                PricedItem::new("40×50", 1845),
                PricedItem::new("40×60", 2085),
                PricedItem::new("50×70", 2545),
                PricedItem::new("60×80", 3245),
            ],
            styles: ["Просто фото на холсте", "Dream Art", "Digital Art", "Поп-арт", "Шарж"]
                .map(String::from)
                .to_vec(),
            flat_style: "Просто фото на холсте".to_string(),
            add_ons: vec![
                PricedItem::new("Подарочная упаковка", 245),
                PricedItem::new("Фактурный гель", 350),
                PricedItem::new("Лаковое покрытие", 300),
                PricedItem::new("Срочное изготовление", 500),
            ],
        }
    }
}

impl PriceTable {
    /// Встроенный прайс, либо файл TOML, если путь задан.
    pub fn load(path: Option<&Path>) -> Result<Self, PriceTableError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path).map_err(|source| PriceTableError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, PriceTableError> {
        let table: PriceTable = toml::from_str(raw)?;
        table.validate()?;
        Ok(table)
    }

    fn validate(&self) -> Result<(), PriceTableError> {
        if self.sizes.is_empty() {
            return Err(PriceTableError::NoSizes);
        }
        if self.styles.is_empty() {
            return Err(PriceTableError::NoStyles);
        }
        if !self.is_style(&self.flat_style) {
            return Err(PriceTableError::UnknownFlatStyle(self.flat_style.clone()));
        }

        ensure_unique(self.sizes.iter().map(|item| item.name.as_str()))?;
        ensure_unique(self.styles.iter().map(String::as_str))?;
        ensure_unique(self.add_ons.iter().map(|item| item.name.as_str()))?;

        let names = self.size_names().chain(self.style_names()).chain(self.add_on_names());
        for name in names {
            if MenuEntry::from_text(name).is_some() || name.starts_with('/') {
                return Err(PriceTableError::ReservedName(name.to_string()));
            }
        }
        if self.is_add_on(DONE) {
            return Err(PriceTableError::ReservedName(DONE.to_string()));
        }

        Ok(())
    }

    pub fn size_names(&self) -> impl Iterator<Item = &str> {
        self.sizes.iter().map(|item| item.name.as_str())
    }

    pub fn style_names(&self) -> impl Iterator<Item = &str> {
        self.styles.iter().map(String::as_str)
    }

    pub fn add_on_names(&self) -> impl Iterator<Item = &str> {
        self.add_ons.iter().map(|item| item.name.as_str())
    }

    pub fn size_price(&self, size: &str) -> Option<u32> {
        find_price(&self.sizes, size)
    }

    pub fn add_on_price(&self, name: &str) -> Option<u32> {
        find_price(&self.add_ons, name)
    }

    pub fn is_size(&self, size: &str) -> bool {
        self.size_price(size).is_some()
    }

    pub fn is_style(&self, style: &str) -> bool {
        self.styles.iter().any(|known| known == style)
    }

    pub fn is_add_on(&self, name: &str) -> bool {
        self.add_on_price(name).is_some()
    }

    /// Отрисовка (и вопрос о количестве лиц) нужна всем стилям,
    /// кроме «просто фото». Неизвестный стиль отрисовки не требует.
    pub fn requires_face_count(&self, style: &str) -> bool {
        style != self.flat_style && self.is_style(style)
    }
}

fn find_price(items: &[PricedItem], name: &str) -> Option<u32> {
    items
        .iter()
        .find(|item| item.name == name)
        .map(|item| item.price)
}

fn ensure_unique<'a>(names: impl Iterator<Item = &'a str>) -> Result<(), PriceTableError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(PriceTableError::Duplicate(name.to_string()));
        }
    }
    Ok(())
}
