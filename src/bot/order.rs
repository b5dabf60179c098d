//! Диалог калькулятора: размер → стиль → (количество лиц) → опции → итог.
//!
//! Сначала ввод классифицируется относительно текущего шага и прайса,
//! затем таблица переходов решает, что сохранить в заказ и что ответить.
//! Никакого ввода-вывода здесь нет.

use crate::bot::calculator::{format_summary, Order};
use crate::bot::common::{add_on_keyboard, size_keyboard, style_keyboard, Keyboard, Reply, DONE};
use crate::prices::PriceTable;

pub const MIN_FACES: u32 = 1;
pub const MAX_FACES: u32 = 10;

const ASK_SIZE: &str = "📐 Выберите размер холста:";
const INVALID_SIZE: &str = "Пожалуйста, выберите размер из предложенных.";
const INVALID_STYLE: &str = "Пожалуйста, выберите стиль из списка.";
const ASK_FACES: &str = "👤 Сколько лиц будет на портрете?\n(Пожалуйста, введите число от 1 до 10.)";
const INVALID_FACES: &str = "Пожалуйста, введите число от 1 до 10.";
const ASK_ADD_ONS: &str = "Вам потребуется что-то дополнительно?\nКогда закончите выбор, нажмите \"Готово\".";
const INVALID_ADD_ON: &str = "Пожалуйста, выберите одну из доступных опций или нажмите \"Готово\".";
const ADD_ON_REPEATED: &str = "Эта опция уже выбрана.";
const ADD_ONS_FINISHED: &str = "✅ Выбор опций завершён.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStep {
    AwaitingSize,
    AwaitingStyle,
    AwaitingFaceCount,
    AwaitingOptions,
    Terminal,
}

/// Что означает входящий текст на текущем шаге.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Size(&'a str),
    DrawnStyle(&'a str),
    FlatStyle(&'a str),
    Faces(u32),
    AddOn(&'a str),
    RepeatedAddOn,
    Done,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSession {
    pub step: OrderStep,
    pub order: Order,
}

impl OrderSession {
    /// Новый заказ и первый вопрос о размере холста.
    pub fn start(table: &PriceTable) -> (Self, Reply) {
        let session = Self {
            step: OrderStep::AwaitingSize,
            order: Order::default(),
        };
        (session, Reply::text(ASK_SIZE).with_keyboard(size_keyboard(table)))
    }

    pub fn is_finished(&self) -> bool {
        self.step == OrderStep::Terminal
    }

    /// Обрабатывает одно входящее сообщение. Ответ всегда один,
    /// кроме завершения выбора опций: там подтверждение и чек.
    pub fn handle(&mut self, table: &PriceTable, text: &str) -> Vec<Reply> {
        let input = self.classify(table, text);

        match (self.step, input) {
            (OrderStep::AwaitingSize, Input::Size(size)) => {
                self.order.size = Some(size.to_string());
                self.step = OrderStep::AwaitingStyle;
                log::info!("Пользователь выбрал размер: {size}");
                vec![Reply::text(format!(
                    "✅ Выбран размер - {size}.\n Какой стиль портрета Вас интересует:"
                ))
                .with_keyboard(style_keyboard(table))]
            }
            (OrderStep::AwaitingStyle, Input::DrawnStyle(style)) => {
                self.order.style = Some(style.to_string());
                self.step = OrderStep::AwaitingFaceCount;
                log::info!("Выбран стиль: {style}");
                vec![Reply::text(ASK_FACES)]
            }
            (OrderStep::AwaitingStyle, Input::FlatStyle(style)) => {
                self.order.style = Some(style.to_string());
                self.order.face_count = 0;
                self.step = OrderStep::AwaitingOptions;
                log::info!("Выбран стиль: {style}");
                vec![Reply::text(format!("✅ Стиль выбран.\n\n{ASK_ADD_ONS}"))
                    .with_keyboard(add_on_keyboard(table))]
            }
            (OrderStep::AwaitingFaceCount, Input::Faces(count)) => {
                self.order.face_count = count;
                self.step = OrderStep::AwaitingOptions;
                log::info!("Выбрано лиц: {count}");
                vec![Reply::text(format!("✅ Кол-во лиц сохранено.\n\n{ASK_ADD_ONS}"))
                    .with_keyboard(add_on_keyboard(table))]
            }
            (OrderStep::AwaitingOptions, Input::AddOn(name)) => {
                self.order.add_ons.push(name.to_string());
                log::info!("Добавлена опция: {name}");
                vec![Reply::text(format!("Добавлено: {name}"))]
            }
            (OrderStep::AwaitingOptions, Input::RepeatedAddOn) => {
                vec![Reply::text(ADD_ON_REPEATED)]
            }
            (OrderStep::AwaitingOptions, Input::Done) => {
                self.step = OrderStep::Terminal;
                log::info!("Итоговые данные: {:?}", self.order);
                vec![
                    Reply::text(ADD_ONS_FINISHED).with_keyboard(Keyboard::Remove),
                    Reply::text(format_summary(table, &self.order)),
                ]
            }
            (OrderStep::Terminal, _) => Vec::new(),
            (step, _) => vec![reprompt(step)],
        }
    }

    fn classify<'a>(&self, table: &PriceTable, text: &'a str) -> Input<'a> {
        match self.step {
            OrderStep::AwaitingSize if table.is_size(text) => Input::Size(text),
            OrderStep::AwaitingStyle if table.requires_face_count(text) => Input::DrawnStyle(text),
            OrderStep::AwaitingStyle if table.is_style(text) => Input::FlatStyle(text),
            OrderStep::AwaitingFaceCount => parse_face_count(text).map_or(Input::Invalid, Input::Faces),
            OrderStep::AwaitingOptions if text == DONE => Input::Done,
            OrderStep::AwaitingOptions if self.order.add_ons.iter().any(|name| name == text) => {
                Input::RepeatedAddOn
            }
            OrderStep::AwaitingOptions if table.is_add_on(text) => Input::AddOn(text),
            _ => Input::Invalid,
        }
    }
}

fn parse_face_count(text: &str) -> Option<u32> {
    text.trim()
        .parse::<u32>()
        .ok()
        .filter(|count| (MIN_FACES..=MAX_FACES).contains(count))
}

fn reprompt(step: OrderStep) -> Reply {
    let text = match step {
        OrderStep::AwaitingSize => INVALID_SIZE,
        OrderStep::AwaitingStyle => INVALID_STYLE,
        OrderStep::AwaitingFaceCount => INVALID_FACES,
        OrderStep::AwaitingOptions | OrderStep::Terminal => INVALID_ADD_ON,
    };
    Reply::text(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_at(step: OrderStep) -> OrderSession {
        OrderSession {
            step,
            order: Order::default(),
        }
    }

    #[test]
    fn start_asks_for_size_with_size_keyboard() {
        let table = PriceTable::default();
        let (session, reply) = OrderSession::start(&table);

        assert_eq!(session.step, OrderStep::AwaitingSize);
        assert_eq!(session.order, Order::default());
        assert!(reply.text.to_lowercase().contains("размер холста"));
        assert_eq!(reply.keyboard, size_keyboard(&table));
    }

    #[test]
    fn valid_size_moves_to_style() {
        let table = PriceTable::default();
        let mut session = session_at(OrderStep::AwaitingSize);

        let replies = session.handle(&table, "30×40");

        assert_eq!(session.step, OrderStep::AwaitingStyle);
        assert_eq!(session.order.size.as_deref(), Some("30×40"));
        assert_eq!(replies.len(), 1);
        assert!(replies[0].text.to_lowercase().contains("стиль портрета"));
        assert_eq!(replies[0].keyboard, style_keyboard(&table));
    }

    #[test]
    fn invalid_size_reprompts_identically() {
        let table = PriceTable::default();
        let mut session = session_at(OrderStep::AwaitingSize);

        let first = session.handle(&table, "150×150");
        let second = session.handle(&table, "30x40");

        assert_eq!(session, session_at(OrderStep::AwaitingSize));
        assert_eq!(first, vec![Reply::text(INVALID_SIZE)]);
        assert_eq!(first, second);
    }

    #[test]
    fn flat_style_skips_face_count() {
        let table = PriceTable::default();
        let mut session = session_at(OrderStep::AwaitingStyle);
        session.order.face_count = 4;

        let replies = session.handle(&table, "Просто фото на холсте");

        assert_eq!(session.step, OrderStep::AwaitingOptions);
        assert_eq!(session.order.style.as_deref(), Some("Просто фото на холсте"));
        assert_eq!(session.order.face_count, 0);
        assert!(replies[0].text.to_lowercase().contains("стиль выбран"));
        assert_eq!(replies[0].keyboard, add_on_keyboard(&table));
    }

    #[test]
    fn drawn_style_asks_for_faces() {
        let table = PriceTable::default();
        let mut session = session_at(OrderStep::AwaitingStyle);

        let replies = session.handle(&table, "Dream Art");

        assert_eq!(session.step, OrderStep::AwaitingFaceCount);
        assert_eq!(session.order.style.as_deref(), Some("Dream Art"));
        assert!(replies[0].text.to_lowercase().contains("сколько лиц"));
    }

    #[test]
    fn invalid_style_is_case_sensitive() {
        let table = PriceTable::default();
        let mut session = session_at(OrderStep::AwaitingStyle);

        let replies = session.handle(&table, "dream art");

        assert_eq!(session.step, OrderStep::AwaitingStyle);
        assert_eq!(session.order.style, None);
        assert_eq!(replies, vec![Reply::text(INVALID_STYLE)]);
    }

    #[test]
    fn face_count_bounds() {
        let table = PriceTable::default();
        let cases = [
            ("1", Some(1)),
            ("5", Some(5)),
            ("10", Some(10)),
            (" 7 ", Some(7)),
            ("0", None),
            ("11", None),
            ("-2", None),
            ("abc", None),
            ("", None),
        ];

        for (text, expected) in cases {
            let mut session = session_at(OrderStep::AwaitingFaceCount);
            let replies = session.handle(&table, text);
            assert_eq!(replies.len(), 1, "input {text:?}");

            match expected {
                Some(count) => {
                    assert_eq!(session.step, OrderStep::AwaitingOptions, "input {text:?}");
                    assert_eq!(session.order.face_count, count);
                    assert!(replies[0].text.to_lowercase().contains("дополнительно"));
                    assert_eq!(replies[0].keyboard, add_on_keyboard(&table));
                }
                None => {
                    assert_eq!(session.step, OrderStep::AwaitingFaceCount, "input {text:?}");
                    assert_eq!(session.order.face_count, 0);
                    assert!(replies[0].text.to_lowercase().contains("введите число"));
                }
            }
        }
    }

    #[test]
    fn add_on_is_added_once() {
        let table = PriceTable::default();
        let mut session = session_at(OrderStep::AwaitingOptions);

        let first = session.handle(&table, "Подарочная упаковка");
        let second = session.handle(&table, "Подарочная упаковка");

        assert_eq!(session.order.add_ons, vec!["Подарочная упаковка".to_string()]);
        assert_eq!(first[0].text, "Добавлено: Подарочная упаковка");
        assert_eq!(second, vec![Reply::text(ADD_ON_REPEATED)]);
        assert_eq!(session.step, OrderStep::AwaitingOptions);
    }

    #[test]
    fn unknown_add_on_is_rejected() {
        let table = PriceTable::default();
        let mut session = session_at(OrderStep::AwaitingOptions);

        let replies = session.handle(&table, "Неизвестная опция");

        assert!(session.order.add_ons.is_empty());
        assert!(replies[0].text.contains("Пожалуйста, выберите одну из доступных опций"));
    }

    #[test]
    fn done_closes_options_and_sends_summary() {
        let table = PriceTable::default();
        let mut session = session_at(OrderStep::AwaitingOptions);
        session.order = Order {
            size: Some("30×40".to_string()),
            style: Some("Dream Art".to_string()),
            face_count: 2,
            add_ons: vec!["Подарочная упаковка".to_string()],
        };

        let replies = session.handle(&table, DONE);

        assert!(session.is_finished());
        assert_eq!(replies.len(), 2);
        assert!(replies[0].text.contains("завершён"));
        assert_eq!(replies[0].keyboard, Keyboard::Remove);
        assert_eq!(replies[1].text, format_summary(&table, &session.order));
        assert!(replies[1].text.contains("💰 Итого: 3590 ₽"));
    }

    #[test]
    fn done_without_add_ons_gives_empty_list() {
        let table = PriceTable::default();
        let mut session = session_at(OrderStep::AwaitingOptions);

        session.handle(&table, DONE);

        assert!(session.is_finished());
        assert!(session.order.add_ons.is_empty());
    }

    #[test]
    fn terminal_ignores_input() {
        let table = PriceTable::default();
        let mut session = session_at(OrderStep::Terminal);

        assert!(session.handle(&table, "30×40").is_empty());
        assert!(session.handle(&table, DONE).is_empty());
        assert_eq!(session, session_at(OrderStep::Terminal));
    }

    #[test]
    fn done_is_not_accepted_before_options() {
        let table = PriceTable::default();
        let mut session = session_at(OrderStep::AwaitingStyle);

        let replies = session.handle(&table, DONE);

        assert_eq!(session.step, OrderStep::AwaitingStyle);
        assert_eq!(replies, vec![Reply::text(INVALID_STYLE)]);
    }

    #[test]
    fn full_walkthrough_with_faces() {
        let table = PriceTable::default();
        let (mut session, _) = OrderSession::start(&table);

        for text in ["40×60", "Digital Art", "1", "Подарочная упаковка", "Фактурный гель"] {
            assert_eq!(session.handle(&table, text).len(), 1);
        }
        let replies = session.handle(&table, DONE);

        assert!(session.is_finished());
        assert!(replies[1]
            .text
            .ends_with(&format!("💰 Итого: {} ₽", 2085 + 1200 + 245 + 350)));
    }
}
