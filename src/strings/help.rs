//! # Help Text
//!
//! Displayed to the user via `/help` or the help button.

pub fn main(channels: &[String; 2]) -> String {
    format!(
        concat!(
            "📚 Справка по боту:\n",
            "\n",
            "/start - Начать работу\n",
            "/check - Проверить подписки\n",
            "/help - Эта справка\n",
            "/apply - Начать заявку\n",
            "/cancel - Отменить заявку\n",
            "\n",
            "Каналы для подписки:\n",
            "1. {}\n",
            "2. {}"
        ),
        channels[0], channels[1]
    )
}
