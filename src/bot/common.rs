use teloxide::types::{KeyboardButton, KeyboardMarkup, KeyboardRemove, ReplyMarkup};

use crate::prices::PriceTable;

pub const MENU_CALCULATOR: &str = "📄 Калькулятор стоимости";
pub const MENU_EXAMPLES: &str = "🖼 Примеры работ";
pub const MENU_CONTACT: &str = "👤 Связаться с менеджером";
pub const BACK_TO_MENU: &str = "🔙 В главное меню";

/// Кнопка завершения выбора дополнительных опций.
pub const DONE: &str = "Готово";

pub const GREETING: &str = "Привет! Я помогу вам оформить заказ на портрет 🎨\n\
                            Выберите действие из меню ниже:";

const BUTTONS_PER_ROW: usize = 2;

/// Клавиатура ответа в виде, не зависящем от транспорта.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Keyboard {
    /// Клавиатуру не трогаем.
    #[default]
    Keep,
    Remove,
    Buttons {
        rows: Vec<Vec<String>>,
        one_time: bool,
    },
}

impl Keyboard {
    pub fn to_markup(&self) -> Option<ReplyMarkup> {
        match self {
            Keyboard::Keep => None,
            Keyboard::Remove => Some(ReplyMarkup::KeyboardRemove(KeyboardRemove::new())),
            Keyboard::Buttons { rows, one_time } => {
                let buttons = rows
                    .iter()
                    .map(|row| row.iter().map(|text| KeyboardButton::new(text.as_str())).collect::<Vec<_>>());
                let markup = KeyboardMarkup::new(buttons).resize_keyboard();
                let markup = if *one_time {
                    markup.one_time_keyboard()
                } else {
                    markup
                };
                Some(ReplyMarkup::Keyboard(markup))
            }
        }
    }
}

/// Одно исходящее текстовое сообщение.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Keyboard,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Keyboard::Keep,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = keyboard;
        self
    }
}

fn chunked<'a>(items: impl Iterator<Item = &'a str>) -> Vec<Vec<String>> {
    let items: Vec<String> = items.map(String::from).collect();
    items
        .chunks(BUTTONS_PER_ROW)
        .map(<[String]>::to_vec)
        .collect()
}

pub fn main_menu_keyboard() -> Keyboard {
    Keyboard::Buttons {
        rows: [MENU_CALCULATOR, MENU_EXAMPLES, MENU_CONTACT]
            .map(|label| vec![label.to_string()])
            .to_vec(),
        one_time: false,
    }
}

pub fn back_to_menu_keyboard() -> Keyboard {
    Keyboard::Buttons {
        rows: vec![vec![BACK_TO_MENU.to_string()]],
        one_time: true,
    }
}

pub fn size_keyboard(table: &PriceTable) -> Keyboard {
    Keyboard::Buttons {
        rows: chunked(table.size_names()),
        one_time: true,
    }
}

pub fn style_keyboard(table: &PriceTable) -> Keyboard {
    Keyboard::Buttons {
        rows: chunked(table.style_names()),
        one_time: true,
    }
}

pub fn add_on_keyboard(table: &PriceTable) -> Keyboard {
    let mut rows = chunked(table.add_on_names());
    rows.push(vec![DONE.to_string()]);
    Keyboard::Buttons {
        rows,
        one_time: false,
    }
}

pub fn greeting() -> Reply {
    Reply::text(GREETING).with_keyboard(main_menu_keyboard())
}
