use chrono::{DateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use std::path::PathBuf;
use teloxide::types::ChatId;
use thiserror::Error;

const DEFAULT_IMAGE_DIR: &str = "data/images";
const DEFAULT_TIMEZONE: &str = "Europe/Moscow";
const DEFAULT_WORK_START: &str = "10:00";
const DEFAULT_WORK_END: &str = "19:00";
const MOSCOW_LABEL: &str = "московскому времени";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("не задана переменная окружения {0}")]
    Missing(&'static str),

    #[error("{key}: некорректный id чата «{value}»")]
    InvalidChatId { key: &'static str, value: String },

    #[error("{key}: неизвестный часовой пояс «{value}»")]
    InvalidTimezone { key: &'static str, value: String },

    #[error("{key}: время «{value}» должно быть в формате ЧЧ:ММ")]
    InvalidTime { key: &'static str, value: String },

    #[error("рабочее время должно начинаться раньше, чем заканчивается ({start}–{end})")]
    EmptyWorkingHours { start: NaiveTime, end: NaiveTime },
}

/// Рабочие часы менеджера: начало включительно, конец не включается.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingHours {
    pub tz: Tz,
    pub start: NaiveTime,
    pub end: NaiveTime,
    /// Как пояс называется в тексте после «по», например «московскому времени».
    pub zone_label: String,
}

impl WorkingHours {
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        let local = now.with_timezone(&self.tz).time();
        self.start <= local && local < self.end
    }

    /// Например, «с 10:00 до 19:00».
    pub fn describe(&self) -> String {
        format!("с {} до {}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

fn default_zone_label(tz: Tz) -> String {
    if tz == chrono_tz::Europe::Moscow {
        MOSCOW_LABEL.to_string()
    } else {
        format!("времени {}", tz.name())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub operator_chat_id: ChatId,
    pub image_dir: PathBuf,
    pub price_table: Option<PathBuf>,
    pub working_hours: WorkingHours,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let operator_chat_id = {
            let value = get("ADMIN_ID").ok_or(ConfigError::Missing("ADMIN_ID"))?;
            value
                .trim()
                .parse::<i64>()
                .map(ChatId)
                .map_err(|_| ConfigError::InvalidChatId { key: "ADMIN_ID", value })?
        };

        let image_dir = PathBuf::from(get("IMAGE_DIR").unwrap_or_else(|| DEFAULT_IMAGE_DIR.to_string()));
        let price_table = get("PRICE_TABLE").map(PathBuf::from);

        let tz = {
            let value = get("WORK_TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
            value
                .trim()
                .parse::<Tz>()
                .map_err(|_| ConfigError::InvalidTimezone { key: "WORK_TIMEZONE", value })?
        };
        let start = parse_time("WORK_HOURS_START", get("WORK_HOURS_START"), DEFAULT_WORK_START)?;
        let end = parse_time("WORK_HOURS_END", get("WORK_HOURS_END"), DEFAULT_WORK_END)?;
        if start >= end {
            return Err(ConfigError::EmptyWorkingHours { start, end });
        }
        let zone_label = get("WORK_TIMEZONE_LABEL")
            .map(|label| label.trim().to_string())
            .unwrap_or_else(|| default_zone_label(tz));

        Ok(Self {
            operator_chat_id,
            image_dir,
            price_table,
            working_hours: WorkingHours {
                tz,
                start,
                end,
                zone_label,
            },
        })
    }
}

fn parse_time(key: &'static str, value: Option<String>, default: &str) -> Result<NaiveTime, ConfigError> {
    let value = value.unwrap_or_else(|| default.to_string());
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| ConfigError::InvalidTime { key, value })
}
