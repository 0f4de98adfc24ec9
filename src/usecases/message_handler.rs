//! Message dispatcher: classify -> reply or flow step -> send -> mark read.
//!
//! - Serializes turns per sender, from the state read to the state write
//! - Reads the sender's conversation state before classifying
//! - Writes the state back after a flow step (clears it when the flow ends)
//! - Sends replies in order, stopping at the first failed send
//! - Marks the message read even when replying failed

use crate::domain::{
    ConversationState, DomainError, InboundEvent, InboundKind, OutboundReply, SenderProfile,
};
use crate::ports::{
    AppointmentLogPort, AssistantPort, ConversationStore, DiagnosticsPort, InboundPort,
    MessagingGateway,
};
use crate::usecases::classifier::{self, Action};
use crate::usecases::menu::{self, FlowKind, MenuAction};
use crate::usecases::replies::{self, MediaCatalog};
use crate::usecases::sender_locks::SenderLocks;
use crate::usecases::{appointment_flow, assistant_flow, sender_directory};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Handles one inbound message end to end.
pub struct MessageHandler {
    gateway: Arc<dyn MessagingGateway>,
    assistant: Arc<dyn AssistantPort>,
    store: Arc<dyn ConversationStore>,
    appointments: Arc<dyn AppointmentLogPort>,
    diagnostics: Arc<dyn DiagnosticsPort>,
    media: MediaCatalog,
    turns: SenderLocks,
}

impl MessageHandler {
    pub fn new(
        gateway: Arc<dyn MessagingGateway>,
        assistant: Arc<dyn AssistantPort>,
        store: Arc<dyn ConversationStore>,
        appointments: Arc<dyn AppointmentLogPort>,
        diagnostics: Arc<dyn DiagnosticsPort>,
        media: MediaCatalog,
    ) -> Self {
        Self {
            gateway,
            assistant,
            store,
            appointments,
            diagnostics,
            media,
            turns: SenderLocks::new(),
        }
    }

    /// Work out the replies for `event`, applying any state transition on the way.
    async fn respond(
        &self,
        event: &InboundEvent,
        profile: &SenderProfile,
    ) -> Result<Vec<OutboundReply>, DomainError> {
        // State is keyed by wa_id; the mapper sets it to the message's `from`.
        let sender = profile.wa_id.as_str();
        let _turn = self.turns.acquire(sender).await;
        let state = self.store.get(sender).await?;

        let out = match classifier::classify(event, &state) {
            Action::Ignore => Vec::new(),
            Action::Greet => {
                let name = sender_directory::sender_name(profile);
                vec![
                    OutboundReply::text_reply_to(replies::welcome_text(&name), &event.message_id),
                    menu::main_menu(),
                ]
            }
            Action::SendMedia(kind) => match self.media.reply(kind) {
                Ok(reply) => vec![reply],
                Err(e) => {
                    error!(sender, error = %e, "media catalog has no entry");
                    vec![OutboundReply::text(replies::MEDIA_UNAVAILABLE_TEXT)]
                }
            },
            Action::Echo(body) => vec![OutboundReply::text_reply_to(
                replies::echo_text(&body),
                &event.message_id,
            )],
            Action::AppointmentInput { step, draft, input } => {
                let transition = appointment_flow::advance(sender, step, draft, &input, Utc::now());
                self.persist(sender, transition.next).await?;
                if let Some(record) = &transition.completed {
                    match self.appointments.record(record).await {
                        Ok(()) => info!(sender, pet = %record.pet_name, "appointment recorded"),
                        Err(e) => warn!(sender, error = %e, "failed to record appointment"),
                    }
                }
                vec![transition.reply]
            }
            Action::AssistantInput { step, input } => {
                let turn = assistant_flow::answer(self.assistant.as_ref(), step, &input).await;
                self.persist(sender, turn.next).await?;
                turn.replies
            }
            Action::Menu(MenuAction::Reply(text)) => vec![OutboundReply::text(text)],
            Action::Menu(MenuAction::StartFlow(FlowKind::Appointment)) => {
                let transition = appointment_flow::enter();
                self.persist(sender, transition.next).await?;
                info!(sender, "appointment flow started");
                vec![transition.reply]
            }
            Action::Menu(MenuAction::StartFlow(FlowKind::Assistant)) => {
                let turn = assistant_flow::enter();
                self.persist(sender, turn.next).await?;
                info!(sender, "assistant flow started");
                turn.replies
            }
            Action::UnknownOption(title) => {
                debug!(sender, title = %title, "unknown menu option");
                self.diagnostics.warn(replies::UNKNOWN_OPTION_TEXT);
                vec![OutboundReply::text(replies::UNKNOWN_OPTION_TEXT)]
            }
        };
        Ok(out)
    }

    async fn persist(&self, sender: &str, next: ConversationState) -> Result<(), DomainError> {
        match next {
            ConversationState::Idle => self.store.clear(sender).await,
            state => self.store.set(sender, state).await,
        }
    }

    async fn deliver(&self, to: &str, reply: &OutboundReply) -> Result<(), DomainError> {
        match reply {
            OutboundReply::Text { body, reply_to } => {
                self.gateway.send_text(to, body, reply_to.as_deref()).await
            }
            OutboundReply::Buttons { prompt, options } => {
                self.gateway
                    .send_interactive_buttons(to, prompt, options)
                    .await
            }
            OutboundReply::Media { kind, url, caption } => {
                self.gateway.send_media(to, *kind, url, caption).await
            }
        }
    }
}

#[async_trait::async_trait]
impl InboundPort for MessageHandler {
    async fn handle(&self, event: InboundEvent, profile: SenderProfile) -> Result<(), DomainError> {
        if let InboundKind::Other(kind) = &event.kind {
            debug!(from = %event.from, kind = %kind, "ignoring unsupported message type");
            return Ok(());
        }

        let mut first_err: Option<DomainError> = None;

        match self.respond(&event, &profile).await {
            Ok(replies) => {
                for reply in &replies {
                    if let Err(e) = self.deliver(&event.from, reply).await {
                        warn!(to = %event.from, error = %e, "failed to send reply");
                        first_err = Some(e);
                        break;
                    }
                }
            }
            Err(e) => {
                error!(from = %event.from, error = %e, "failed to process message");
                first_err = Some(e);
            }
        }

        if let Err(e) = self.gateway.mark_read(&event.message_id).await {
            warn!(message_id = %event.message_id, error = %e, "failed to mark message read");
            first_err.get_or_insert(e);
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::MemoryConversationStore;
    use crate::domain::{
        AppointmentDraft, AppointmentRecord, AppointmentStep, AssistantStep, Button, MediaKind,
    };
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Text {
            to: String,
            body: String,
            reply_to: Option<String>,
        },
        Buttons {
            to: String,
            prompt: String,
            options: Vec<Button>,
        },
        Media {
            to: String,
            kind: MediaKind,
            url: String,
            caption: String,
        },
        MarkRead(String),
    }

    #[derive(Default)]
    struct RecordingGateway {
        calls: Mutex<Vec<Call>>,
        fail_sends: bool,
        fail_mark_read: bool,
    }

    impl RecordingGateway {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn push(&self, call: Call, fail: bool) -> Result<(), DomainError> {
            self.calls.lock().unwrap().push(call);
            if fail {
                Err(DomainError::Transport("boom".into()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait::async_trait]
    impl MessagingGateway for RecordingGateway {
        async fn send_text(
            &self,
            to: &str,
            body: &str,
            reply_to: Option<&str>,
        ) -> Result<(), DomainError> {
            let call = Call::Text {
                to: to.into(),
                body: body.into(),
                reply_to: reply_to.map(String::from),
            };
            self.push(call, self.fail_sends)
        }

        async fn send_interactive_buttons(
            &self,
            to: &str,
            prompt: &str,
            options: &[Button],
        ) -> Result<(), DomainError> {
            let call = Call::Buttons {
                to: to.into(),
                prompt: prompt.into(),
                options: options.to_vec(),
            };
            self.push(call, self.fail_sends)
        }

        async fn send_media(
            &self,
            to: &str,
            kind: MediaKind,
            url: &str,
            caption: &str,
        ) -> Result<(), DomainError> {
            let call = Call::Media {
                to: to.into(),
                kind,
                url: url.into(),
                caption: caption.into(),
            };
            self.push(call, self.fail_sends)
        }

        async fn mark_read(&self, message_id: &str) -> Result<(), DomainError> {
            self.push(Call::MarkRead(message_id.into()), self.fail_mark_read)
        }
    }

    struct FixedAssistant;

    #[async_trait::async_trait]
    impl AssistantPort for FixedAssistant {
        async fn answer(&self, question: &str) -> Result<String, DomainError> {
            Ok(format!("answer to {}", question))
        }
    }

    #[derive(Default)]
    struct RecordingLog(Mutex<Vec<AppointmentRecord>>);

    #[async_trait::async_trait]
    impl AppointmentLogPort for RecordingLog {
        async fn record(&self, appointment: &AppointmentRecord) -> Result<(), DomainError> {
            self.0.lock().unwrap().push(appointment.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingDiagnostics(Mutex<Vec<String>>);

    impl DiagnosticsPort for RecordingDiagnostics {
        fn warn(&self, message: &str) {
            self.0.lock().unwrap().push(message.to_string());
        }
    }

    const SENDER: &str = "12345678";
    const CDN: &str = "https://cdn.medpet.test";

    struct Harness {
        gateway: Arc<RecordingGateway>,
        store: Arc<MemoryConversationStore>,
        log: Arc<RecordingLog>,
        diagnostics: Arc<RecordingDiagnostics>,
        handler: MessageHandler,
    }

    fn harness_with(gateway: RecordingGateway, media: MediaCatalog) -> Harness {
        let gateway = Arc::new(gateway);
        let store = Arc::new(MemoryConversationStore::default());
        let log = Arc::new(RecordingLog::default());
        let diagnostics = Arc::new(RecordingDiagnostics::default());
        let handler = MessageHandler::new(
            gateway.clone(),
            Arc::new(FixedAssistant),
            store.clone(),
            log.clone(),
            diagnostics.clone(),
            media,
        );
        Harness {
            gateway,
            store,
            log,
            diagnostics,
            handler,
        }
    }

    fn harness() -> Harness {
        harness_with(RecordingGateway::default(), MediaCatalog::medpet(CDN))
    }

    fn event(kind: InboundKind) -> InboundEvent {
        InboundEvent {
            from: SENDER.into(),
            message_id: "wamid.1".into(),
            timestamp: None,
            kind,
        }
    }

    fn text(body: &str) -> InboundEvent {
        event(InboundKind::Text { body: body.into() })
    }

    fn button(title: &str) -> InboundEvent {
        event(InboundKind::InteractiveReply {
            option_id: Some("option_x".into()),
            option_title: title.into(),
        })
    }

    fn profile(name: Option<&str>) -> SenderProfile {
        SenderProfile {
            name: name.map(String::from),
            wa_id: SENDER.into(),
        }
    }

    fn plain(body: &str) -> Call {
        Call::Text {
            to: SENDER.into(),
            body: body.into(),
            reply_to: None,
        }
    }

    fn menu_call() -> Call {
        let OutboundReply::Buttons { prompt, options } = menu::main_menu() else {
            unreachable!()
        };
        Call::Buttons {
            to: SENDER.into(),
            prompt,
            options,
        }
    }

    fn read() -> Call {
        Call::MarkRead("wamid.1".into())
    }

    #[tokio::test]
    async fn test_greeting_sends_welcome_then_menu() {
        let h = harness();
        h.handler
            .handle(text(" Hello "), profile(Some("John Doe")))
            .await
            .unwrap();
        assert_eq!(
            h.gateway.calls(),
            vec![
                Call::Text {
                    to: SENDER.into(),
                    body: replies::welcome_text("John"),
                    reply_to: Some("wamid.1".into()),
                },
                menu_call(),
                read(),
            ]
        );
    }

    #[tokio::test]
    async fn test_greeting_without_name_uses_sender_id() {
        let h = harness();
        h.handler.handle(text("hola"), profile(None)).await.unwrap();
        let calls = h.gateway.calls();
        assert_eq!(
            calls[0],
            Call::Text {
                to: SENDER.into(),
                body: "Hello 12345678, Welcome to Medpet, your online Pet Shop 🐕🐈🦜. How can I help you, today?".into(),
                reply_to: Some("wamid.1".into()),
            }
        );
    }

    #[tokio::test]
    async fn test_other_text_is_echoed_without_menu() {
        let h = harness();
        h.handler
            .handle(text("Do you sell cat food?"), profile(None))
            .await
            .unwrap();
        assert_eq!(
            h.gateway.calls(),
            vec![
                Call::Text {
                    to: SENDER.into(),
                    body: "Echo: Do you sell cat food?".into(),
                    reply_to: Some("wamid.1".into()),
                },
                read(),
            ]
        );
    }

    #[tokio::test]
    async fn test_media_keyword_sends_catalog_entry() {
        let h = harness();
        h.handler.handle(text("audio"), profile(None)).await.unwrap();
        assert_eq!(
            h.gateway.calls(),
            vec![
                Call::Media {
                    to: SENDER.into(),
                    kind: MediaKind::Audio,
                    url: format!("{}/medpet-audio.aac", CDN),
                    caption: "Welcome 🔉".into(),
                },
                read(),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_media_entry_sends_apology() {
        let h = harness_with(RecordingGateway::default(), MediaCatalog::default());
        h.handler.handle(text("video"), profile(None)).await.unwrap();
        assert_eq!(
            h.gateway.calls(),
            vec![plain(replies::MEDIA_UNAVAILABLE_TEXT), read()]
        );
    }

    #[tokio::test]
    async fn test_unsupported_event_makes_no_calls() {
        let h = harness();
        h.handler
            .handle(event(InboundKind::Other("sticker".into())), profile(None))
            .await
            .unwrap();
        assert!(h.gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_menu_canned_replies() {
        let cases = [
            ("location 📍", "This is our location"),
            (
                "emergency 🚨",
                "If this is an emergency, we invite you to call our attention line",
            ),
        ];
        for (title, expected) in cases {
            let h = harness();
            h.handler.handle(button(title), profile(None)).await.unwrap();
            assert_eq!(h.gateway.calls(), vec![plain(expected), read()]);
            assert_eq!(h.store.get(SENDER).await.unwrap(), ConversationState::Idle);
        }
    }

    #[tokio::test]
    async fn test_schedule_option_enters_appointment_flow() {
        let h = harness();
        h.handler
            .handle(button("sheduled ✅"), profile(None))
            .await
            .unwrap();
        assert_eq!(
            h.gateway.calls(),
            vec![plain("Please, could you type your name?"), read()]
        );
        assert_eq!(
            h.store.get(SENDER).await.unwrap(),
            ConversationState::Appointment {
                step: AppointmentStep::Name,
                draft: AppointmentDraft::default(),
            }
        );
    }

    #[tokio::test]
    async fn test_request_option_enters_assistant_flow() {
        let h = harness();
        h.handler
            .handle(button("Request 🤔"), profile(None))
            .await
            .unwrap();
        assert_eq!(h.gateway.calls(), vec![plain("What is your request?"), read()]);
        assert_eq!(
            h.store.get(SENDER).await.unwrap(),
            ConversationState::Assistant {
                step: Some(AssistantStep::Question),
            }
        );
    }

    #[tokio::test]
    async fn test_unknown_option_replies_and_warns_with_same_text() {
        let h = harness();
        h.handler
            .handle(button("fake option"), profile(None))
            .await
            .unwrap();
        assert_eq!(
            h.gateway.calls(),
            vec![plain("Sorry, we didn't understand that option"), read()]
        );
        assert_eq!(
            *h.diagnostics.0.lock().unwrap(),
            vec!["Sorry, we didn't understand that option".to_string()]
        );
    }

    #[tokio::test]
    async fn test_name_step_asks_for_pet_name() {
        let h = harness();
        h.store
            .set(
                SENDER,
                ConversationState::Appointment {
                    step: AppointmentStep::Name,
                    draft: AppointmentDraft::default(),
                },
            )
            .await
            .unwrap();
        h.handler.handle(text("name"), profile(None)).await.unwrap();
        assert_eq!(
            h.gateway.calls(),
            vec![plain("What is your pet's name?"), read()]
        );
    }

    #[tokio::test]
    async fn test_full_appointment_is_recorded_and_state_cleared() {
        let h = harness();
        h.handler
            .handle(button("Sheduled ✅"), profile(None))
            .await
            .unwrap();
        // A greeting word mid-flow is an answer, not a greeting.
        for answer in ["Hello", "Rocky", "dog", "Limping since Monday"] {
            h.handler.handle(text(answer), profile(None)).await.unwrap();
        }

        assert_eq!(h.store.get(SENDER).await.unwrap(), ConversationState::Idle);
        let records = h.log.0.lock().unwrap().clone();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Hello");
        assert_eq!(records[0].pet_name, "Rocky");
        assert_eq!(records[0].pet_type, "dog");
        assert_eq!(records[0].reason, "Limping since Monday");

        let texts: Vec<Call> = h
            .gateway
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Text { .. }))
            .collect();
        assert_eq!(
            texts,
            vec![
                plain("Please, could you type your name?"),
                plain("What is your pet's name?"),
                plain("What type of pet do you have? for example: dog, cat, bird"),
                plain("Which is the reason for your request?"),
                plain(&appointment_flow::confirmation_text(&records[0])),
            ]
        );
    }

    /// Yields inside `get` so a second turn can interleave between read and write.
    struct YieldingStore(MemoryConversationStore);

    #[async_trait::async_trait]
    impl ConversationStore for YieldingStore {
        async fn get(&self, sender_id: &str) -> Result<ConversationState, DomainError> {
            let state = self.0.get(sender_id).await;
            tokio::task::yield_now().await;
            state
        }

        async fn set(&self, sender_id: &str, state: ConversationState) -> Result<(), DomainError> {
            self.0.set(sender_id, state).await
        }

        async fn clear(&self, sender_id: &str) -> Result<(), DomainError> {
            self.0.clear(sender_id).await
        }
    }

    #[tokio::test]
    async fn test_concurrent_answers_from_one_sender_each_advance_the_flow() {
        let gateway = Arc::new(RecordingGateway::default());
        let store = Arc::new(YieldingStore(MemoryConversationStore::default()));
        store
            .set(
                SENDER,
                ConversationState::Appointment {
                    step: AppointmentStep::Name,
                    draft: AppointmentDraft::default(),
                },
            )
            .await
            .unwrap();
        let handler = MessageHandler::new(
            gateway.clone(),
            Arc::new(FixedAssistant),
            store.clone(),
            Arc::new(RecordingLog::default()),
            Arc::new(RecordingDiagnostics::default()),
            MediaCatalog::medpet(CDN),
        );

        let (a, b) = tokio::join!(
            handler.handle(text("Ana"), profile(None)),
            handler.handle(text("Rocky"), profile(None)),
        );
        a.unwrap();
        b.unwrap();

        assert_eq!(
            store.get(SENDER).await.unwrap(),
            ConversationState::Appointment {
                step: AppointmentStep::PetType,
                draft: AppointmentDraft {
                    name: Some("Ana".into()),
                    pet_name: Some("Rocky".into()),
                    ..Default::default()
                },
            }
        );
        let prompts: Vec<Call> = gateway
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Text { .. }))
            .collect();
        assert_eq!(
            prompts,
            vec![
                plain("What is your pet's name?"),
                plain("What type of pet do you have? for example: dog, cat, bird"),
            ]
        );
    }

    #[tokio::test]
    async fn test_state_is_keyed_by_wa_id() {
        let h = harness();
        let event = InboundEvent {
            from: "15550001".into(),
            ..button("Sheduled ✅")
        };
        h.handler.handle(event, profile(None)).await.unwrap();
        assert!(h.store.get(SENDER).await.unwrap().is_active());
        assert_eq!(h.store.get("15550001").await.unwrap(), ConversationState::Idle);
    }

    #[tokio::test]
    async fn test_assistant_without_step_answers_and_shows_menu() {
        let h = harness();
        h.store
            .set(SENDER, ConversationState::Assistant { step: None })
            .await
            .unwrap();
        h.handler
            .handle(text("Is chocolate bad for dogs?"), profile(None))
            .await
            .unwrap();
        assert_eq!(
            h.gateway.calls(),
            vec![
                plain("answer to Is chocolate bad for dogs?"),
                menu_call(),
                read(),
            ]
        );
        assert_eq!(h.store.get(SENDER).await.unwrap(), ConversationState::Idle);
    }

    #[tokio::test]
    async fn test_send_failure_still_marks_read() {
        let gateway = RecordingGateway {
            fail_sends: true,
            ..Default::default()
        };
        let h = harness_with(gateway, MediaCatalog::medpet(CDN));
        let result = h.handler.handle(text("hi"), profile(None)).await;
        assert!(matches!(result, Err(DomainError::Transport(_))));
        // Welcome failed, so the menu is not attempted; the read receipt still is.
        let calls = h.gateway.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1], read());
    }

    #[tokio::test]
    async fn test_mark_read_failure_does_not_suppress_reply() {
        let gateway = RecordingGateway {
            fail_mark_read: true,
            ..Default::default()
        };
        let h = harness_with(gateway, MediaCatalog::medpet(CDN));
        let result = h.handler.handle(button("location 📍"), profile(None)).await;
        assert!(result.is_err());
        assert_eq!(
            h.gateway.calls(),
            vec![plain("This is our location"), read()]
        );
    }

    #[tokio::test]
    async fn test_senders_do_not_share_state() {
        let h = harness();
        h.handler
            .handle(button("sheduled ✅"), profile(None))
            .await
            .unwrap();
        let other = InboundEvent {
            from: "999".into(),
            ..text("hi")
        };
        h.handler
            .handle(
                other,
                SenderProfile {
                    name: None,
                    wa_id: "999".into(),
                },
            )
            .await
            .unwrap();
        let calls = h.gateway.calls();
        assert!(calls.iter().any(|c| matches!(c, Call::Buttons { to, .. } if to == "999")));
        assert!(h.store.get(SENDER).await.unwrap().is_active());
        assert_eq!(h.store.get("999").await.unwrap(), ConversationState::Idle);
    }
}
