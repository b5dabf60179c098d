use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::macros::BotCommands;
use teloxide::prelude::Dialogue;

use crate::bot::common::{BACK_TO_MENU, MENU_CALCULATOR, MENU_CONTACT, MENU_EXAMPLES};
use crate::bot::order::OrderSession;

pub type MyDialogue = Dialogue<State, InMemStorage<State>>;
pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Поддерживаемые команды")]
pub enum Command {
    #[command(description = "Главное меню")]
    Start,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum State {
    #[default]
    Start,
    Calculator {
        session: OrderSession,
    },
    ChoosingExampleStyle,
    WaitingForQuestion,
}

/// Кнопки главного меню, с которых начинается каждый сценарий.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuEntry {
    MainMenu,
    Calculator,
    Examples,
    Contact,
}

/// Точки входа: текст сообщения → сценарий. Срабатывают в любом
/// состоянии, так что начатый сценарий всегда можно перезапустить.
pub const ENTRY_POINTS: [(&str, MenuEntry); 4] = [
    (BACK_TO_MENU, MenuEntry::MainMenu),
    (MENU_CALCULATOR, MenuEntry::Calculator),
    (MENU_EXAMPLES, MenuEntry::Examples),
    (MENU_CONTACT, MenuEntry::Contact),
];

impl MenuEntry {
    pub fn from_text(text: &str) -> Option<Self> {
        ENTRY_POINTS
            .iter()
            .find(|(trigger, _)| *trigger == text)
            .map(|(_, entry)| *entry)
    }
}
