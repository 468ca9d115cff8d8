use std::sync::Arc;
use std::time::Duration;

use enhancer_core_types::{NotificationKind, ReadyState, Rect};
use extensions_bridge::{runtime_channel, BackgroundResponder, BridgeState, HttpEnhancementService};
use host_page::{DomEvent, HostPage, InMemoryPage, NodeSpec};
use prompt_enhancer_cli::{Config, ContentScript, ContentScriptHandle};
use serde_json::json;
use tokio::time::{sleep, timeout};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn eventually<F: Fn() -> bool>(what: &str, ready: F) {
    timeout(Duration::from_secs(5), async {
        while !ready() {
            sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {what}"));
}

fn start(server: &MockServer) -> (Arc<InMemoryPage>, ContentScriptHandle) {
    let mut config = Config::default();
    config.service.base_url = server.uri();
    config.page.debounce_ms = 20;

    let service = HttpEnhancementService::new(config.endpoint().unwrap()).unwrap();
    let (channel, inbox) = runtime_channel(4);
    tokio::spawn(BackgroundResponder::new(Arc::new(service)).run(inbox));

    let (page, signals) = InMemoryPage::new(ReadyState::Loading);
    let script = ContentScript::new(
        page.clone(),
        config.page_settings().unwrap(),
        Arc::new(channel),
    );
    let handle = script.handle();
    script.spawn(signals);
    (page, handle)
}

#[tokio::test]
async fn rich_editable_prompt_is_rewritten_from_the_service() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/enhance-prompt"))
        .and(body_json(json!({"prompt": "hello"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"enhanced": "Hello, world!"})))
        .expect(1)
        .mount(&server)
        .await;

    let (page, script) = start(&server);
    let editor = page.insert(
        NodeSpec::new("div")
            .attr("contenteditable", "true")
            .attr("data-id", "root")
            .text("hello")
            .rect(Rect::new(500.0, 40.0, 720.0, 48.0)),
    );
    eventually("control", || script.control().is_some()).await;

    let control = script.control().unwrap();
    assert!(page.click_control(control));
    eventually("reply", || !page.notifications().is_empty()).await;

    assert_eq!(page.text_content(editor).as_deref(), Some("Hello, world!"));
    assert_eq!(page.dispatched_events(editor), vec![DomEvent::Input]);
    assert_eq!(page.notifications()[0].kind, NotificationKind::Success);
    eventually("idle", || script.bridge_state() == BridgeState::Idle).await;
}

#[tokio::test]
async fn unreachable_service_reports_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/enhance-prompt"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let (page, script) = start(&server);
    let input = page.insert(
        NodeSpec::new("textarea")
            .attr("data-id", "root")
            .value("keep me")
            .rect(Rect::new(500.0, 40.0, 720.0, 48.0)),
    );
    eventually("control", || script.control().is_some()).await;

    page.click_control(script.control().unwrap());
    eventually("reply", || !page.notifications().is_empty()).await;

    assert_eq!(page.value(input).as_deref(), Some("keep me"));
    assert!(page.dispatched_events(input).is_empty());
    let note = &page.notifications()[0];
    assert_eq!(note.kind, NotificationKind::Error);
    assert_eq!(note.class_name, "ai-enhancer-notification error");
}
