//! Telegram long-polling transport.

use crate::channels::dispatcher::MessageDispatcher;
use crate::channels::types::IncomingMessage;
use crate::channels::util::split_message;
use std::sync::Arc;
use teloxide::RequestError;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode};

/// Telegram's per-message character limit
pub const TELEGRAM_MAX_MESSAGE_CHARS: usize = 4096;

/// Poll Telegram until the process is interrupted, answering every text message
pub async fn start_telegram_listener(bot_token: String, dispatcher: Arc<MessageDispatcher>) {
    let bot = Bot::new(bot_token);

    match bot.get_me().await {
        Ok(me) => log::info!("[TELEGRAM] Connected as @{}", me.username()),
        Err(e) => log::warn!("[TELEGRAM] Could not fetch bot identity: {}", e),
    }

    let handler = Update::filter_message().endpoint(handle_message);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![dispatcher])
        .default_handler(|upd| async move {
            log::debug!("[TELEGRAM] Unhandled update: {:?}", upd.kind);
        })
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("[TELEGRAM] Listener stopped");
}

async fn handle_message(
    bot: Bot,
    msg: Message,
    dispatcher: Arc<MessageDispatcher>,
) -> ResponseResult<()> {
    let (Some(user), Some(text)) = (msg.from(), msg.text()) else {
        return Ok(());
    };

    let incoming =
        IncomingMessage::new(user.id.0.to_string(), text).with_user_name(user.full_name());

    let Some(result) = dispatcher.dispatch(incoming).await else {
        return Ok(());
    };

    if let Some(error) = &result.error {
        log::warn!("[TELEGRAM] Replying with failure notice to {}: {}", user.id.0, error);
    }

    for chunk in split_message(&result.response, TELEGRAM_MAX_MESSAGE_CHARS) {
        send_markdown(&bot, msg.chat.id, &chunk).await?;
    }

    Ok(())
}

/// Send with Markdown, falling back to plain text when Telegram rejects the markup
async fn send_markdown(bot: &Bot, chat_id: ChatId, text: &str) -> ResponseResult<()> {
    #[allow(deprecated)]
    let sent = bot
        .send_message(chat_id, text)
        .parse_mode(ParseMode::Markdown)
        .await;

    match sent {
        Ok(_) => Ok(()),
        Err(RequestError::Api(e)) => {
            log::warn!("[TELEGRAM] Markdown rejected ({}), resending as plain text", e);
            bot.send_message(chat_id, text).await?;
            Ok(())
        }
        Err(e) => Err(e),
    }
}
