use chrono::{DateTime, Utc};
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::types::{ChatId, Me};
use teloxide::utils::command::BotCommands;
use teloxide::{dispatching::dialogue::InMemStorage, prelude::*};

use crate::bot::common::{greeting, Reply};
use crate::bot::contact::{self, ContactDesk, Sender};
use crate::bot::gallery::{self, GalleryStep, ImageDir};
use crate::bot::order::OrderSession;
use crate::bot::states::{Command, HandlerResult, MenuEntry, MyDialogue, State};
use crate::bot::transport::{deliver_all, DeliveryError, Transport};
use crate::prices::PriceTable;

/// Куда отправить входящее сообщение.
#[derive(Debug, Clone, PartialEq)]
enum Route {
    Start,
    Menu(MenuEntry),
    Order(OrderSession),
    ExampleStyle,
    Question,
    Ignore,
}

/// `/start` и кнопки меню срабатывают в любом состоянии. Прочие команды
/// не попадают ни в один сценарий.
fn route(state: &State, text: Option<&str>, bot_name: &str) -> Route {
    if let Some(text) = text {
        if matches!(Command::parse(text, bot_name), Ok(Command::Start)) {
            return Route::Start;
        }
        if let Some(entry) = MenuEntry::from_text(text) {
            return Route::Menu(entry);
        }
        if text.starts_with('/') {
            return Route::Ignore;
        }
    }

    match state {
        State::Start => Route::Ignore,
        State::Calculator { session } => Route::Order(session.clone()),
        State::ChoosingExampleStyle => Route::ExampleStyle,
        State::WaitingForQuestion => Route::Question,
    }
}

pub fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    use dptree::case;

    let message_handler = Update::filter_message()
        .enter_dialogue::<Message, InMemStorage<State>, State>()
        .filter_map(|msg: Message, state: State, me: Me| {
            Some(route(&state, msg.text(), me.username()))
        })
        .branch(case![Route::Start].endpoint(cmd_start))
        .branch(case![Route::Menu(entry)].endpoint(enter_menu_entry))
        .branch(case![Route::Order(session)].endpoint(receive_order_input))
        .branch(case![Route::ExampleStyle].endpoint(receive_example_style))
        .branch(case![Route::Question].endpoint(receive_question))
        .branch(case![Route::Ignore].endpoint(ignore_message));

    dptree::entry()
        .branch(message_handler)
}

/// Что сделать с диалогом после ответа пользователю.
#[derive(Debug, Clone, PartialEq)]
enum Next {
    Stay,
    Enter(State),
    Exit,
}

async fn apply(dialogue: &MyDialogue, next: Next) -> HandlerResult {
    match next {
        Next::Stay => {}
        Next::Enter(state) => dialogue.update(state).await?,
        Next::Exit => dialogue.exit().await?,
    }
    Ok(())
}

async fn show_main_menu<T>(transport: &T, chat_id: ChatId) -> Result<Next, DeliveryError>
where
    T: Transport + ?Sized,
{
    transport.deliver_text(chat_id, &greeting()).await?;
    Ok(Next::Exit)
}

/// Начинает сценарий заново: заказ, начатый раньше, отбрасывается.
async fn open_menu_entry<T>(
    transport: &T,
    chat_id: ChatId,
    entry: MenuEntry,
    table: &PriceTable,
) -> Result<Next, DeliveryError>
where
    T: Transport + ?Sized,
{
    let (prompt, state) = match entry {
        MenuEntry::MainMenu => return show_main_menu(transport, chat_id).await,
        MenuEntry::Calculator => {
            let (session, prompt) = OrderSession::start(table);
            (prompt, State::Calculator { session })
        }
        MenuEntry::Examples => (gallery::choose_style_prompt(table), State::ChoosingExampleStyle),
        MenuEntry::Contact => (Reply::text(contact::ASK_QUESTION), State::WaitingForQuestion),
    };

    transport.deliver_text(chat_id, &prompt).await?;
    Ok(Next::Enter(state))
}

async fn advance_order<T>(
    transport: &T,
    chat_id: ChatId,
    mut session: OrderSession,
    table: &PriceTable,
    text: &str,
) -> Result<Next, DeliveryError>
where
    T: Transport + ?Sized,
{
    let replies = session.handle(table, text);
    deliver_all(transport, chat_id, &replies).await?;

    if session.is_finished() {
        Ok(Next::Exit)
    } else {
        Ok(Next::Enter(State::Calculator { session }))
    }
}

async fn pick_example_style<T>(
    transport: &T,
    chat_id: ChatId,
    table: &PriceTable,
    images: &ImageDir,
    style: &str,
) -> Result<Next, DeliveryError>
where
    T: Transport + ?Sized,
{
    match gallery::send_examples(transport, chat_id, table, images, style).await? {
        GalleryStep::AwaitingStyle => Ok(Next::Stay),
        GalleryStep::Terminal => Ok(Next::Exit),
    }
}

async fn take_question<T>(
    transport: &T,
    chat_id: ChatId,
    desk: &ContactDesk,
    sender: Option<&Sender>,
    text: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Next, DeliveryError>
where
    T: Transport + ?Sized,
{
    let Some(text) = text else {
        transport
            .deliver_text(chat_id, &Reply::text(contact::ASK_TEXT_QUESTION))
            .await?;
        return Ok(Next::Stay);
    };

    desk.forward(transport, chat_id, sender, text, now).await?;
    Ok(Next::Exit)
}

async fn cmd_start(bot: Bot, dialogue: MyDialogue, msg: Message) -> HandlerResult {
    match msg.from.as_ref() {
        Some(user) => log::info!("Пользователь {} ({}) отправил /start", user.id.0, user.first_name),
        None => log::info!("Чат {} отправил /start", msg.chat.id.0),
    }
    let next = show_main_menu(&bot, msg.chat.id).await?;
    apply(&dialogue, next).await
}

async fn enter_menu_entry(
    bot: Bot,
    dialogue: MyDialogue,
    entry: MenuEntry,
    msg: Message,
    table: Arc<PriceTable>,
) -> HandlerResult {
    let next = open_menu_entry(&bot, msg.chat.id, entry, &table).await?;
    apply(&dialogue, next).await
}

async fn receive_order_input(
    bot: Bot,
    dialogue: MyDialogue,
    session: OrderSession,
    msg: Message,
    table: Arc<PriceTable>,
) -> HandlerResult {
    let text = msg.text().unwrap_or_default();
    let next = advance_order(&bot, msg.chat.id, session, &table, text).await?;
    apply(&dialogue, next).await
}

async fn receive_example_style(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    table: Arc<PriceTable>,
    images: Arc<ImageDir>,
) -> HandlerResult {
    let style = msg.text().unwrap_or_default();
    let next = pick_example_style(&bot, msg.chat.id, &table, &images, style).await?;
    apply(&dialogue, next).await
}

async fn receive_question(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    desk: Arc<ContactDesk>,
) -> HandlerResult {
    let sender = msg.from.as_ref().map(Sender::from);
    let outcome = take_question(&bot, msg.chat.id, &desk, sender.as_ref(), msg.text(), Utc::now()).await;

    match outcome {
        Ok(next) => apply(&dialogue, next).await,
        // вопрос уже мог уйти менеджеру, повторно его не ждём
        Err(e) => {
            dialogue.exit().await?;
            Err(e.into())
        }
    }
}

async fn ignore_message(msg: Message) -> HandlerResult {
    log::debug!("Пропущено сообщение в чате {}: {:?}", msg.chat.id.0, msg.text());
    Ok(())
}
