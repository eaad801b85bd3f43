//! Save control driven end to end: request, classification and recovery.

mod common;

use async_trait::async_trait;
use common::{data, errors, harness, MockGraphQl};
use liff_editor::recovery::affordance::{EDITED_LABEL, FAILED_LABEL, SAVED_LABEL};
use liff_editor::session::{InMemoryProvider, ProviderCall};
use liff_editor::{Affordance, SaveDriver, SaveState, SaveTarget, Ui, UiDelays};
use serde_json::json;
use std::sync::Mutex;
use std::time::Duration;

struct RecordingUi {
    answer: bool,
    renders: Mutex<Vec<Affordance>>,
    alerts: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
}

impl RecordingUi {
    fn answering(answer: bool) -> Self {
        Self {
            answer,
            renders: Mutex::new(Vec::new()),
            alerts: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn labels(&self) -> Vec<String> {
        self.renders
            .lock()
            .unwrap()
            .iter()
            .map(|a| a.label.clone())
            .collect()
    }

    fn prompts(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl Ui for RecordingUi {
    fn render(&self, affordance: &Affordance) {
        self.renders.lock().unwrap().push(affordance.clone());
    }

    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }

    async fn confirm(&self, message: &str) -> bool {
        self.prompts.lock().unwrap().push(message.to_string());
        self.answer
    }
}

fn edit_existing() -> SaveTarget {
    SaveTarget::EditExisting {
        message_id: "m1".into(),
    }
}

fn edited_body() -> serde_json::Value {
    data(json!({ "editMessage": { "id": "m1", "text": "new", "userId": "U1" } }))
}

#[tokio::test]
async fn success_in_client_closes_the_window() {
    let mut gql = MockGraphQl::new().await;
    let _mock = gql.mock_field("editMessage", 200, edited_body()).await;
    let h = harness(
        gql.config(),
        InMemoryProvider::logged_in("tok", "U1").in_client(true),
    );
    h.client.session().set_current_user_id(Some("U1".into()));
    let ui = RecordingUi::answering(false);

    let mut driver = SaveDriver::new(&h.client, &ui, edit_existing());
    assert_eq!(driver.submit("new").await, SaveState::Closed);

    assert_eq!(
        ui.labels(),
        vec![
            Affordance::idle().label,
            Affordance::busy().label,
            EDITED_LABEL.to_string()
        ]
    );
    assert_eq!(h.provider.count(&ProviderCall::CloseWindow), 1);
}

#[tokio::test]
async fn success_outside_client_resets_the_form() {
    let mut gql = MockGraphQl::new().await;
    let _mock = gql
        .mock_field(
            "editTextMessage",
            200,
            data(json!({ "editTextMessage": { "success": true } })),
        )
        .await;
    let h = harness(gql.config(), InMemoryProvider::logged_in("tok", "U1"));
    h.client.session().set_current_user_id(Some("U1".into()));
    let ui = RecordingUi::answering(false);

    let mut driver = SaveDriver::new(&h.client, &ui, SaveTarget::EditText);
    assert_eq!(driver.submit("new").await, SaveState::Idle);

    let renders = ui.renders.lock().unwrap().clone();
    assert_eq!(renders[2].label, SAVED_LABEL);
    assert_eq!(renders.last(), Some(&Affordance::idle()));
    assert_eq!(h.provider.count(&ProviderCall::CloseWindow), 0);
}

#[tokio::test]
async fn expired_auth_confirmed_forces_relogin_without_retry() {
    let mut gql = MockGraphQl::new().await;
    let mock = gql
        .server
        .mock("POST", "/graphql")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    let h = harness(gql.config(), InMemoryProvider::logged_in("tok", "U1"));
    h.client.session().set_current_user_id(Some("U1".into()));
    let ui = RecordingUi::answering(true);

    let mut driver = SaveDriver::new(&h.client, &ui, edit_existing());
    assert_eq!(driver.submit("new").await, SaveState::Reauthenticating);

    assert_eq!(ui.prompts(), 1);
    assert!(ui
        .labels()
        .contains(&Affordance::session_expired().label));
    let calls = h.provider.calls();
    assert!(calls.contains(&ProviderCall::Logout));
    assert_eq!(h.provider.login_count(), 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn expired_auth_declined_keeps_the_draft() {
    let mut gql = MockGraphQl::new().await;
    let mock = gql
        .server
        .mock("POST", "/graphql")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(errors("auth header rejected").to_string())
        .expect(1)
        .create_async()
        .await;
    let h = harness(gql.config(), InMemoryProvider::logged_in("tok", "U1"));
    h.client.session().set_current_user_id(Some("U1".into()));
    let ui = RecordingUi::answering(false);

    let mut driver = SaveDriver::new(&h.client, &ui, SaveTarget::EditText);
    assert_eq!(driver.submit("my draft").await, SaveState::Idle);

    assert_eq!(driver.input(), "my draft");
    assert_eq!(ui.prompts(), 1);
    assert_eq!(h.provider.login_count(), 0);
    assert_eq!(h.host.reloads(), 0);
    mock.assert_async().await;
}

#[tokio::test]
async fn generic_failure_resets_without_prompt_or_retry() {
    let mut gql = MockGraphQl::new().await;
    let mock = gql
        .server
        .mock("POST", "/graphql")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(errors("Message not found").to_string())
        .expect(1)
        .create_async()
        .await;
    let h = harness(gql.config(), InMemoryProvider::logged_in("tok", "U1"));
    h.client.session().set_current_user_id(Some("U1".into()));
    let ui = RecordingUi::answering(true);

    let mut driver = SaveDriver::new(&h.client, &ui, edit_existing());
    assert_eq!(driver.submit("new").await, SaveState::Failed);
    assert!(driver.has_pending_reset());
    assert_eq!(driver.settle().await, SaveState::Idle);
    assert!(!driver.has_pending_reset());

    assert_eq!(
        ui.labels(),
        vec![
            Affordance::idle().label,
            Affordance::busy().label,
            FAILED_LABEL.to_string(),
            Affordance::idle().label,
        ]
    );
    assert_eq!(ui.prompts(), 0);
    mock.assert_async().await;
}

#[tokio::test]
async fn missing_user_id_fails_without_prompt() {
    let mut gql = MockGraphQl::new().await;
    let mock = gql
        .server
        .mock("POST", "/graphql")
        .expect(0)
        .create_async()
        .await;
    let h = harness(gql.config(), InMemoryProvider::logged_in("tok", "U1"));
    let ui = RecordingUi::answering(true);

    let mut driver = SaveDriver::new(&h.client, &ui, SaveTarget::EditText);
    assert_eq!(driver.submit("new").await, SaveState::Failed);
    assert_eq!(
        ui.labels(),
        vec![
            Affordance::idle().label,
            Affordance::busy().label,
            FAILED_LABEL.to_string(),
        ]
    );
    assert_eq!(driver.settle().await, SaveState::Idle);

    assert_eq!(ui.labels().last(), Some(&Affordance::idle().label));
    assert!(!ui
        .labels()
        .contains(&Affordance::session_expired().label));
    assert_eq!(ui.prompts(), 0);
    assert_eq!(h.provider.login_count(), 0);
    assert_eq!(h.host.reloads(), 0);
    mock.assert_async().await;
}

#[tokio::test]
async fn blank_input_only_alerts() {
    let mut gql = MockGraphQl::new().await;
    let mock = gql
        .server
        .mock("POST", "/graphql")
        .expect(0)
        .create_async()
        .await;
    let h = harness(gql.config(), InMemoryProvider::logged_in("tok", "U1"));
    let ui = RecordingUi::answering(true);

    let mut driver = SaveDriver::new(&h.client, &ui, SaveTarget::EditText);
    assert_eq!(driver.submit("   ").await, SaveState::Idle);

    assert_eq!(
        ui.alerts.lock().unwrap().as_slice(),
        ["Please enter a message".to_string()]
    );
    assert_eq!(ui.labels(), vec![Affordance::idle().label]);
    mock.assert_async().await;
}

#[tokio::test]
async fn ocr_success_resets_even_inside_client() {
    let mut gql = MockGraphQl::new().await;
    let _send = gql
        .mock_field(
            "sendTextMessage",
            200,
            data(json!({ "sendTextMessage": { "success": true } })),
        )
        .await;
    let _add = gql
        .mock_field(
            "addMessage",
            200,
            data(json!({ "addMessage": { "success": true } })),
        )
        .await;
    let h = harness(
        gql.config(),
        InMemoryProvider::logged_in("tok", "U2").in_client(true),
    );
    let ui = RecordingUi::answering(false);

    let mut driver = SaveDriver::new(&h.client, &ui, SaveTarget::SendText);
    assert_eq!(driver.submit("fixed ocr").await, SaveState::Idle);

    assert!(ui.labels().contains(&SAVED_LABEL.to_string()));
    assert_eq!(h.provider.count(&ProviderCall::CloseWindow), 0);
}

#[tokio::test]
async fn resubmitting_after_failure_sends_a_new_request() {
    let mut gql = MockGraphQl::new().await;
    let mock = gql
        .server
        .mock("POST", "/graphql")
        .with_status(500)
        .expect(2)
        .create_async()
        .await;
    let h = harness(gql.config(), InMemoryProvider::logged_in("tok", "U1"));
    h.client.session().set_current_user_id(Some("U1".into()));
    let ui = RecordingUi::answering(false);

    let mut driver = SaveDriver::new(&h.client, &ui, SaveTarget::EditText);
    assert_eq!(driver.submit("first").await, SaveState::Failed);
    assert_eq!(driver.submit("second").await, SaveState::Failed);
    assert_eq!(driver.input(), "second");
    assert_eq!(driver.settle().await, SaveState::Idle);
    mock.assert_async().await;
}

#[tokio::test]
async fn resubmit_before_reset_supersedes_it() {
    let mut gql = MockGraphQl::new().await;
    let mock = gql
        .server
        .mock("POST", "/graphql")
        .with_status(500)
        .expect(2)
        .create_async()
        .await;
    let config = gql.config().with_delays(UiDelays {
        failure_reset: Duration::from_secs(60),
        ..UiDelays::immediate()
    });
    let h = harness(config, InMemoryProvider::logged_in("tok", "U1"));
    h.client.session().set_current_user_id(Some("U1".into()));
    let ui = RecordingUi::answering(false);

    let mut driver = SaveDriver::new(&h.client, &ui, SaveTarget::EditText);
    let started = std::time::Instant::now();
    assert_eq!(driver.submit("first").await, SaveState::Failed);
    assert!(driver.has_pending_reset());
    assert_eq!(driver.submit("second").await, SaveState::Failed);
    assert!(started.elapsed() < Duration::from_secs(30));

    assert_eq!(
        ui.labels(),
        vec![
            Affordance::idle().label,
            Affordance::busy().label,
            FAILED_LABEL.to_string(),
            Affordance::busy().label,
            FAILED_LABEL.to_string(),
        ]
    );
    assert_eq!(ui.prompts(), 0);
    mock.assert_async().await;
}

#[tokio::test]
async fn blank_resubmit_keeps_the_pending_reset() {
    let mut gql = MockGraphQl::new().await;
    let mock = gql
        .server
        .mock("POST", "/graphql")
        .with_status(500)
        .expect(1)
        .create_async()
        .await;
    let config = gql.config().with_delays(UiDelays {
        failure_reset: Duration::from_secs(60),
        ..UiDelays::immediate()
    });
    let h = harness(config, InMemoryProvider::logged_in("tok", "U1"));
    h.client.session().set_current_user_id(Some("U1".into()));
    let ui = RecordingUi::answering(false);

    let mut driver = SaveDriver::new(&h.client, &ui, SaveTarget::EditText);
    assert_eq!(driver.submit("first").await, SaveState::Failed);
    assert_eq!(driver.submit(" ").await, SaveState::Failed);

    assert!(driver.has_pending_reset());
    assert_eq!(ui.alerts.lock().unwrap().len(), 1);
    mock.assert_async().await;
}
