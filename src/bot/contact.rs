use chrono::{DateTime, Utc};
use teloxide::types::{ChatId, User};

use crate::bot::common::Reply;
use crate::bot::transport::{DeliveryError, Transport};
use crate::config::WorkingHours;

pub const ASK_QUESTION: &str = "✉️ Пожалуйста, напишите ваш вопрос, мы передадим его менеджеру.";
pub const ASK_TEXT_QUESTION: &str = "Пожалуйста, напишите вопрос текстом.";
const NO_SENDER: &str = "Произошла ошибка. Попробуйте позже.";
const FORWARD_FAILED: &str = "⚠️ Не удалось отправить сообщение менеджеру. Попробуйте позже.";

/// Кто задал вопрос.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: u64,
    pub username: Option<String>,
    pub first_name: String,
}

impl From<&User> for Sender {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.0,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
        }
    }
}

impl Sender {
    fn display_name(&self) -> &str {
        self.username
            .as_deref()
            .filter(|name| !name.is_empty())
            .or(Some(self.first_name.as_str()).filter(|name| !name.is_empty()))
            .unwrap_or("Пользователь")
    }
}

pub fn format_user_message(sender: &Sender, text: &str) -> String {
    format!(
        "📩 Новое сообщение от пользователя @{} (ID: {}):\n\n{text}",
        sender.display_name(),
        sender.id
    )
}

/// Куда и когда уходят вопросы пользователей.
#[derive(Debug, Clone)]
pub struct ContactDesk {
    pub operator: ChatId,
    pub hours: WorkingHours,
}

impl ContactDesk {
    pub fn acknowledgement(&self, now: DateTime<Utc>) -> String {
        if self.hours.contains(now) {
            "✅ Ваше сообщение отправлено.\nВ ближайшее время Вам напишет наш менеджер.".to_string()
        } else {
            format!(
                "✅ Ваше сообщение отправлено.\n\
                 Наш менеджер свяжется с вами в рабочее время: {} по {}.",
                self.hours.describe(),
                self.hours.zone_label
            )
        }
    }

    /// Пересылает вопрос менеджеру и отвечает пользователю. Ошибка
    /// пересылки не пробрасывается: пользователь получает извинение.
    pub async fn forward<T>(
        &self,
        transport: &T,
        chat_id: ChatId,
        sender: Option<&Sender>,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<(), DeliveryError>
    where
        T: Transport + ?Sized,
    {
        let Some(sender) = sender else {
            log::warn!("⚠️ Не удалось определить отправителя в чате {}", chat_id.0);
            return transport.deliver_text(chat_id, &Reply::text(NO_SENDER)).await;
        };

        let forwarded = Reply::text(format_user_message(sender, text));
        if let Err(e) = transport.deliver_text(self.operator, &forwarded).await {
            log::error!("Ошибка при отправке менеджеру: {e}");
            return transport.deliver_text(chat_id, &Reply::text(FORWARD_FAILED)).await;
        }
        log::info!("Сообщение пользователя {} отправлено менеджеру.", sender.id);

        transport
            .deliver_text(chat_id, &Reply::text(self.acknowledgement(now)))
            .await
    }
}
