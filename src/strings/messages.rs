//! # Messages
//!
//! Contains constant strings and format functions for user-facing messages,
//! plus the button labels that double as text triggers.

use crate::application::subscription::ChannelStatus;
use crate::domain::types::Application;

// Reply keyboard labels. Pressing one sends the label back as plain text.
pub const APPLY_BUTTON: &str = "📝 Оставить заявку";
pub const MY_APPLICATIONS_BUTTON: &str = "📊 Мои заявки";
pub const CHECK_BUTTON: &str = "🔄 Проверить подписки";
pub const HELP_BUTTON: &str = "📚 Помощь";
pub const CONFIRM_BUTTON: &str = "✅ Подтвердить";
pub const CANCEL_BUTTON: &str = "❌ Отменить";

pub const CHANNEL_BUTTON_1: &str = "📢 Канал 1";
pub const CHANNEL_BUTTON_2: &str = "📢 Канал 2";
pub const RECHECK_BUTTON: &str = "✅ Я подписался";
pub const RECHECK_CALLBACK: &str = "check_subs";

pub fn greeting_subscribed(first_name: &str) -> String {
    format!(
        "👋 Привет, {first_name}!\n\n\
         ✅ Вы подписаны на все каналы!\n\
         🎉 Теперь вы можете оставить заявку.\n\n\
         Выберите действие:"
    )
}

pub fn greeting_unsubscribed(first_name: &str, channels: &[String; 2]) -> String {
    format!(
        "👋 Привет, {first_name}!\n\n\
         Для использования бота подпишитесь на:\n1. {}\n2. {}\n\n\
         После подписки нажмите кнопку ниже:",
        channels[0], channels[1]
    )
}

/// Public link for a channel username; numeric ids have no link.
pub fn channel_link(channel: &str) -> Option<String> {
    channel
        .strip_prefix('@')
        .filter(|name| !name.is_empty())
        .map(|name| format!("https://t.me/{name}"))
}

pub const RECHECK_SUCCESS: &str = "✅ Отлично! Теперь вы можете пользоваться ботом.";
pub const CHOOSE_ACTION: &str = "Выберите действие:";
pub const RECHECK_FAILED: &str =
    "❌ Вы еще не подписались на все каналы. Пожалуйста, подпишитесь и проверьте снова.";

pub fn subscription_report(statuses: &[ChannelStatus]) -> String {
    let mut text = String::from("📊 Статус подписок:\n\n");
    for (i, status) in statuses.iter().enumerate() {
        let mark = if status.subscribed {
            "✅ Подписан"
        } else {
            "❌ Не подписан"
        };
        text.push_str(&format!("{}. {}: {}\n", i + 1, status.channel, mark));
    }
    text.push('\n');
    if statuses.iter().all(|s| s.subscribed) {
        text.push_str("🎉 Вы подписаны на все каналы!");
    } else {
        text.push_str("Подпишитесь на недостающие каналы.");
    }
    text
}

pub const NO_APPLICATIONS: &str = "📭 У вас нет заявок.";

/// Telegram rejects messages longer than this many UTF-16 code units.
pub const MESSAGE_LIMIT: usize = 4096;

/// Application list split into messages that each fit under `MESSAGE_LIMIT`.
/// Only the first page carries the header.
pub fn applications_pages(apps: &[Application]) -> Vec<String> {
    let mut pages = Vec::new();
    let mut page = String::from("📋 Ваши заявки:\n\n");
    let mut page_len = utf16_len(&page);

    for app in apps {
        let line = format!("#{} - {} ({})\n", app.id, app.full_name, app.city);
        let line = truncate_utf16(&line, MESSAGE_LIMIT);
        let line_len = utf16_len(line);
        if page_len + line_len > MESSAGE_LIMIT {
            pages.push(std::mem::take(&mut page));
            page_len = 0;
        }
        page.push_str(line);
        page_len += line_len;
    }
    pages.push(page);
    pages
}

fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

fn truncate_utf16(text: &str, limit: usize) -> &str {
    let mut used = 0;
    for (idx, ch) in text.char_indices() {
        used += ch.len_utf16();
        if used > limit {
            return &text[..idx];
        }
    }
    text
}

// Form
pub const FORM_DENIED: &str = "❌ Для создания заявки необходимо подписаться на оба канала!";
pub const FORM_START: &str = "📝 Создание заявки:\n\n1. Введите Имя и Фамилию (например: Иван Иванов):";
pub const NAME_INVALID: &str = "❌ Введите имя и фамилию через пробел:";
pub const ASK_CITY: &str = "✅ Принято!\n\n2. Введите ваш город:";
pub const CITY_INVALID: &str = "❌ Город слишком короткий. Введите снова:";
pub const ASK_PHONE: &str = "✅ Принято!\n\n3. Введите номер телефона (например: +79991234567):";
pub const PHONE_INVALID: &str = "❌ Неверный формат телефона. Введите снова:";
pub const CONFIRM_REPROMPT: &str = "Пожалуйста, нажмите «✅ Подтвердить» или «❌ Отменить».";
pub const FORM_CANCELLED: &str = "❌ Заявка отменена.";
pub const SAVE_FAILED: &str =
    "⚠️ Не удалось сохранить заявку. Попробуйте нажать «✅ Подтвердить» ещё раз.";

pub fn confirm_summary(name: &str, city: &str, phone: &str) -> String {
    format!("📋 Проверьте данные:\n\n1. {name}\n2. {city}\n3. {phone}\n\nВсё верно?")
}

pub fn application_created(id: i64, name: &str, city: &str, phone: &str) -> String {
    format!(
        "🎉 Заявка #{id} создана!\n\n\
         Имя: {name}\nГород: {city}\nТелефон: {phone}\n\n\
         Администратор свяжется с вами!"
    )
}
