//! # Command Router
//!
//! Routes incoming updates to the appropriate command handler (in `interface/commands`).
//! Every update first refreshes the sender's user row, then the first matching rule wins.
//! An open form session captures free text; slash commands still reach their handlers.

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::application::state::BotState;
use crate::application::subscription::SubscriptionChecker;
use crate::domain::traits::ChatProvider;
use crate::domain::types::{Incoming, IncomingKind, Sender};
use crate::infrastructure::store::RecordStore;
use crate::interface::commands;
use crate::strings::messages;

/// Splits `/cmd@botname args` into `"/cmd"`. Returns `None` for non-commands.
fn command_name(text: &str) -> Option<&str> {
    if !text.starts_with('/') {
        return None;
    }
    let head = text.split_whitespace().next().unwrap_or(text);
    Some(head.split('@').next().unwrap_or(head))
}

pub struct CommandRouter {
    store: Arc<RecordStore>,
    checker: Arc<SubscriptionChecker>,
    state: Arc<Mutex<BotState>>,
}

impl CommandRouter {
    pub fn new(
        store: Arc<RecordStore>,
        checker: Arc<SubscriptionChecker>,
        state: Arc<Mutex<BotState>>,
    ) -> Self {
        Self {
            store,
            checker,
            state,
        }
    }

    pub async fn route<C>(&self, chat: &C, incoming: &Incoming) -> Result<()>
    where
        C: ChatProvider,
    {
        let sender = &incoming.sender;
        self.store.upsert_user(
            sender.id,
            sender.username.as_deref(),
            &sender.first_name,
            sender.last_name.as_deref(),
        )?;

        match &incoming.kind {
            IncomingKind::Callback { id, data } => {
                tracing::info!("Router callback data='{}' sender='{}'", data, sender.id);
                if data == messages::RECHECK_CALLBACK {
                    commands::start::handle_recheck(&self.checker, chat, sender.id, id).await
                } else {
                    chat.answer_callback(id).await?;
                    Ok(())
                }
            }
            IncomingKind::Text(text) => self.route_text(chat, sender, text.trim()).await,
        }
    }

    async fn route_text<C>(&self, chat: &C, sender: &Sender, msg: &str) -> Result<()>
    where
        C: ChatProvider,
    {
        tracing::info!("Router dispatching text='{}' sender='{}'", msg, sender.id);

        if let Some(cmd) = command_name(msg) {
            return match cmd {
                "/start" => commands::start::handle_start(&self.checker, chat, sender).await,
                "/check" => commands::check::handle_check(&self.checker, chat, sender.id).await,
                "/help" => commands::help::handle_help(self.checker.channels(), chat).await,
                "/apply" => {
                    commands::form::handle_apply(&self.state, &self.checker, chat, sender.id)
                        .await
                }
                "/cancel" => commands::form::handle_cancel(&self.state, chat, sender.id)
                    .await
                    .map(|_| ()),
                _ => Ok(()),
            };
        }

        // Active form captures free text, menu labels included.
        let in_form = self.state.lock().await.has_session(sender.id);
        if in_form {
            return commands::form::handle_step(&self.state, &self.store, chat, sender.id, msg)
                .await;
        }

        match msg {
            messages::CHECK_BUTTON => {
                commands::check::handle_check(&self.checker, chat, sender.id).await
            }
            messages::HELP_BUTTON => {
                commands::help::handle_help(self.checker.channels(), chat).await
            }
            messages::MY_APPLICATIONS_BUTTON => {
                commands::applications::handle_list(&self.store, chat, sender.id).await
            }
            messages::APPLY_BUTTON => {
                commands::form::handle_apply(&self.state, &self.checker, chat, sender.id).await
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{FakeMembers, RecordingChat};
    use crate::domain::types::{Keyboard, MemberStatus};

    const USER: i64 = 5;

    fn router(members: FakeMembers) -> (CommandRouter, Arc<RecordStore>) {
        let store = Arc::new(RecordStore::open(":memory:").unwrap());
        let checker = Arc::new(SubscriptionChecker::new(
            ["@one".to_string(), "@two".to_string()],
            Arc::new(members),
        ));
        let state = Arc::new(Mutex::new(BotState::default()));
        (CommandRouter::new(store.clone(), checker, state), store)
    }

    fn subscribed_router() -> (CommandRouter, Arc<RecordStore>) {
        router(FakeMembers::subscribed(USER, &["@one", "@two"]))
    }

    fn sender() -> Sender {
        Sender {
            id: USER,
            username: Some("ivan".to_string()),
            first_name: "Ivan".to_string(),
            last_name: None,
        }
    }

    fn text(body: &str) -> Incoming {
        Incoming {
            sender: sender(),
            chat_id: USER,
            kind: IncomingKind::Text(body.to_string()),
        }
    }

    fn callback(data: &str) -> Incoming {
        Incoming {
            sender: sender(),
            chat_id: USER,
            kind: IncomingKind::Callback {
                id: "cb".to_string(),
                data: data.to_string(),
            },
        }
    }

    #[test]
    fn test_command_name() {
        assert_eq!(command_name("/start"), Some("/start"));
        assert_eq!(command_name("/start@intake_bot payload"), Some("/start"));
        assert_eq!(command_name("hello"), None);
        assert_eq!(command_name(messages::APPLY_BUTTON), None);
    }

    #[tokio::test]
    async fn test_every_update_registers_user() {
        let (router, store) = subscribed_router();
        let chat = RecordingChat::new();
        router.route(&chat, &text("random words")).await.unwrap();

        assert!(chat.sent().is_empty());
        let user = store.get_user(USER).unwrap().unwrap();
        assert_eq!(user.username.as_deref(), Some("ivan"));
    }

    #[tokio::test]
    async fn test_start_subscribed_shows_menu() {
        let (router, _) = subscribed_router();
        let chat = RecordingChat::new();
        router.route(&chat, &text("/start")).await.unwrap();

        let sent = chat.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].text.contains("Ivan"));
        assert_eq!(sent[0].keyboard, Some(commands::start::main_menu()));
    }

    #[tokio::test]
    async fn test_start_unsubscribed_shows_links() {
        let (router, _) = router(FakeMembers::default());
        let chat = RecordingChat::new();
        router.route(&chat, &text("/start")).await.unwrap();

        let sent = chat.sent();
        assert!(sent[0].text.contains("@one"));
        assert!(matches!(sent[0].keyboard, Some(Keyboard::Inline(_))));
    }

    #[tokio::test]
    async fn test_recheck_callback() {
        let (router, _) = router(FakeMembers::default().with(USER, "@one", MemberStatus::Member));
        let chat = RecordingChat::new();
        router.route(&chat, &callback(messages::RECHECK_CALLBACK)).await.unwrap();
        assert_eq!(chat.answered(), vec!["cb".to_string()]);
        assert_eq!(chat.last_text(), messages::RECHECK_FAILED);

        let (router, _) = subscribed_router();
        let chat = RecordingChat::new();
        router.route(&chat, &callback(messages::RECHECK_CALLBACK)).await.unwrap();
        assert_eq!(
            chat.texts(),
            vec![
                messages::RECHECK_SUCCESS.to_string(),
                messages::CHOOSE_ACTION.to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_callback_is_only_answered() {
        let (router, _) = subscribed_router();
        let chat = RecordingChat::new();
        router.route(&chat, &callback("other")).await.unwrap();
        assert_eq!(chat.answered().len(), 1);
        assert!(chat.sent().is_empty());
    }

    #[tokio::test]
    async fn test_check_command_and_button_match() {
        let (router, _) = router(FakeMembers::default().with(USER, "@two", MemberStatus::Member));
        let chat = RecordingChat::new();
        router.route(&chat, &text("/check")).await.unwrap();
        router.route(&chat, &text(messages::CHECK_BUTTON)).await.unwrap();

        let texts = chat.texts();
        assert_eq!(texts.len(), 2);
        assert_eq!(texts[0], texts[1]);
        assert!(texts[0].contains("1. @one: ❌ Не подписан"));
        assert!(texts[0].contains("2. @two: ✅ Подписан"));
    }

    #[tokio::test]
    async fn test_help() {
        let (router, _) = subscribed_router();
        let chat = RecordingChat::new();
        router.route(&chat, &text(messages::HELP_BUTTON)).await.unwrap();
        assert!(chat.last_text().contains("/apply"));
    }

    #[tokio::test]
    async fn test_my_applications_empty_and_listed() {
        let (router, store) = subscribed_router();
        let chat = RecordingChat::new();
        router.route(&chat, &text(messages::MY_APPLICATIONS_BUTTON)).await.unwrap();
        assert_eq!(chat.last_text(), messages::NO_APPLICATIONS);

        let first = store.insert_application(USER, "Ivan Ivanov", "Moscow", "9991234567").unwrap();
        let second = store.insert_application(USER, "Ivan Ivanov", "Tula", "9991234567").unwrap();
        router.route(&chat, &text(messages::MY_APPLICATIONS_BUTTON)).await.unwrap();

        let listing = chat.last_text();
        let newest = listing.find(&format!("#{second} ")).unwrap();
        let oldest = listing.find(&format!("#{first} ")).unwrap();
        assert!(newest < oldest);
    }

    #[tokio::test]
    async fn test_form_through_router() {
        let (router, store) = subscribed_router();
        let chat = RecordingChat::new();
        for input in [
            messages::APPLY_BUTTON,
            "Ivan Ivanov",
            "Moscow",
            "+79991234567",
            messages::CONFIRM_BUTTON,
        ] {
            router.route(&chat, &text(input)).await.unwrap();
        }
        let apps = store.list_applications_for_user(USER).unwrap();
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].city, "Moscow");
    }

    #[tokio::test]
    async fn test_menu_label_during_form_is_input() {
        let (router, _) = subscribed_router();
        let chat = RecordingChat::new();
        router.route(&chat, &text("/apply")).await.unwrap();
        router.route(&chat, &text("Ivan Ivanov")).await.unwrap();
        chat.clear();

        // Two characters or more, so it is accepted as a city.
        router.route(&chat, &text(messages::HELP_BUTTON)).await.unwrap();
        assert_eq!(chat.last_text(), messages::ASK_PHONE);
    }

    #[tokio::test]
    async fn test_commands_keep_session_except_cancel() {
        let (router, _) = subscribed_router();
        let chat = RecordingChat::new();
        router.route(&chat, &text("/apply")).await.unwrap();
        router.route(&chat, &text("Ivan Ivanov")).await.unwrap();

        router.route(&chat, &text("/help")).await.unwrap();
        router.route(&chat, &text("Moscow")).await.unwrap();
        assert_eq!(chat.last_text(), messages::ASK_PHONE);

        router.route(&chat, &text("/cancel")).await.unwrap();
        assert_eq!(chat.last_text(), messages::FORM_CANCELLED);

        chat.clear();
        router.route(&chat, &text("+79991234567")).await.unwrap();
        assert!(chat.sent().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_without_session_is_silent() {
        let (router, _) = subscribed_router();
        let chat = RecordingChat::new();
        router.route(&chat, &text("/cancel")).await.unwrap();
        router.route(&chat, &text(messages::CANCEL_BUTTON)).await.unwrap();
        assert!(chat.sent().is_empty());
    }

    #[tokio::test]
    async fn test_apply_denied_when_not_subscribed() {
        let (router, _) = router(FakeMembers::default().failing(USER, "@one"));
        let chat = RecordingChat::new();
        router.route(&chat, &text("/apply")).await.unwrap();
        assert_eq!(chat.last_text(), messages::FORM_DENIED);

        chat.clear();
        router.route(&chat, &text("Ivan Ivanov")).await.unwrap();
        assert!(chat.sent().is_empty());
    }

    #[tokio::test]
    async fn test_refused_apply_ends_open_session() {
        let members = FakeMembers::subscribed(USER, &["@one", "@two"]);
        let (router, _) = router(members.clone());
        let chat = RecordingChat::new();
        router.route(&chat, &text("/apply")).await.unwrap();
        router.route(&chat, &text("Ivan Ivanov")).await.unwrap();
        assert!(router.state.lock().await.has_session(USER));

        members.leave(USER, "@two");
        router.route(&chat, &text("/apply")).await.unwrap();
        assert_eq!(chat.last_text(), messages::FORM_DENIED);
        assert!(!router.state.lock().await.has_session(USER));

        chat.clear();
        router.route(&chat, &text("Moscow")).await.unwrap();
        assert!(chat.sent().is_empty());
    }
}
