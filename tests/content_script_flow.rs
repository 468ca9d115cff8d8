use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use enhancer_core_types::{ElementId, NotificationKind, ReadyState, Rect};
use extensions_bridge::{
    runtime_channel, BackgroundResponder, BridgeState, EnhancementService, ServiceError,
};
use host_page::{HostPage, InMemoryPage, NodeSpec};
use input_locator::{BUSY_LABEL, IDLE_LABEL};
use prompt_enhancer_cli::{ContentScript, ContentScriptHandle, PageSettings};
use tokio::time::sleep;

const SERVICE_LATENCY: Duration = Duration::from_secs(1);

/// Stands in for the HTTP service: `"hello"` becomes `"Hello, world!"`.
struct FakeService {
    calls: AtomicUsize,
    fail: bool,
}

#[async_trait]
impl EnhancementService for FakeService {
    async fn enhance(&self, prompt: &str) -> Result<String, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        sleep(SERVICE_LATENCY).await;
        if self.fail {
            return Err(ServiceError::Status(500));
        }
        Ok(match prompt {
            "hello" => "Hello, world!".to_string(),
            other => format!("{other} (enhanced)"),
        })
    }

    async fn health(&self) -> Result<(), ServiceError> {
        Ok(())
    }
}

struct Harness {
    page: Arc<InMemoryPage>,
    script: ContentScriptHandle,
    service: Arc<FakeService>,
}

fn chat_input() -> NodeSpec {
    NodeSpec::new("textarea")
        .attr("id", "prompt-textarea")
        .attr("placeholder", "Message ChatGPT")
        .rect(Rect::new(600.0, 80.0, 700.0, 52.0))
}

fn start(ready_state: ReadyState, fail: bool) -> Harness {
    let (page, signals) = InMemoryPage::new(ready_state);
    let service = Arc::new(FakeService {
        calls: AtomicUsize::new(0),
        fail,
    });
    let (channel, inbox) = runtime_channel(8);
    tokio::spawn(BackgroundResponder::new(service.clone()).run(inbox));

    let script = ContentScript::new(page.clone(), PageSettings::default(), Arc::new(channel));
    let handle = script.handle();
    script.spawn(signals);
    Harness {
        page,
        script: handle,
        service,
    }
}

/// Mounts the chat input and lets the debounced reconcile attach a control.
async fn mount_input(harness: &Harness) -> ElementId {
    let input = harness.page.insert(chat_input());
    sleep(Duration::from_millis(250)).await;
    input
}

#[tokio::test(start_paused = true)]
async fn mutation_burst_collapses_into_one_reconcile() {
    let harness = start(ReadyState::Loading, false);

    // Rendered first but never laid out.
    let hidden = harness
        .page
        .insert(NodeSpec::new("textarea").attr("id", "prompt-textarea"));
    sleep(Duration::from_millis(50)).await;
    for i in 0..3 {
        harness
            .page
            .insert(NodeSpec::new("div").attr("class", format!("message-{i}")));
        sleep(Duration::from_millis(50)).await;
    }
    let visible = harness.page.insert(chat_input());
    sleep(Duration::from_millis(100)).await;
    assert_eq!(harness.script.reconcile_count(), 0);

    sleep(Duration::from_millis(150)).await;

    assert_eq!(harness.script.reconcile_count(), 1);
    let target = harness.script.target().expect("target after burst");
    assert_eq!(target.element, visible);
    assert_ne!(target.element, hidden);
    assert_eq!(harness.page.controls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn rerenders_never_leave_two_controls() {
    let harness = start(ReadyState::Loading, false);
    let mut input = mount_input(&harness).await;

    let mut seen = HashSet::new();
    for _ in 0..4 {
        let control = harness.script.control().expect("control mounted");
        assert!(seen.insert(control), "control reused across targets");
        assert_eq!(harness.page.controls().len(), 1);

        input = harness.page.replace(input, chat_input()).expect("re-render");
        for _ in 0..10 {
            sleep(Duration::from_millis(40)).await;
            assert!(harness.page.controls().len() <= 1);
        }
        assert_eq!(harness.script.target().map(|t| t.element), Some(input));
    }

    harness.page.remove(input);
    sleep(Duration::from_millis(500)).await;
    // Transient absence keeps the existing control rather than flickering it away.
    assert_eq!(harness.page.controls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn initial_reconcile_runs_after_the_startup_delay() {
    let (page, mut signals) = InMemoryPage::new(ReadyState::Complete);
    page.insert(chat_input());
    while signals.try_recv().is_ok() {}

    let (channel, _inbox) = runtime_channel(1);
    let script = ContentScript::new(page.clone(), PageSettings::default(), Arc::new(channel));
    let handle = script.handle();
    script.spawn(signals);

    sleep(Duration::from_millis(1_100)).await;
    assert!(page.controls().is_empty());

    sleep(Duration::from_millis(150)).await;
    assert!(handle.target().is_some());
    assert_eq!(page.controls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn loaded_signal_triggers_reconcile_while_loading() {
    let harness = start(ReadyState::Loading, false);
    harness.page.insert(chat_input());
    harness.page.finish_loading();

    sleep(Duration::from_millis(250)).await;
    assert_eq!(harness.script.reconcile_count(), 1);
    assert!(harness.script.control().is_some());
}

#[tokio::test(start_paused = true)]
async fn round_trip_rewrites_the_prompt() {
    let harness = start(ReadyState::Loading, false);
    let input = mount_input(&harness).await;
    let control = harness.script.control().expect("control");

    harness.page.type_text(input, "hello");
    assert!(harness.page.click_control(control));

    sleep(Duration::from_millis(10)).await;
    assert_eq!(harness.script.bridge_state(), BridgeState::Requesting);
    let busy = harness.page.control(control).expect("control");
    assert_eq!(busy.label, BUSY_LABEL);
    assert!(busy.disabled);

    sleep(SERVICE_LATENCY).await;

    assert_eq!(harness.page.value(input).as_deref(), Some("Hello, world!"));
    assert_eq!(harness.script.bridge_state(), BridgeState::Idle);
    let idle = harness.page.control(control).expect("control");
    assert_eq!(idle.label, IDLE_LABEL);
    assert!(!idle.disabled);

    let notes = harness.page.notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].message, "Enhanced in 1s! ✨");
    assert_eq!(notes[0].class_name, "ai-enhancer-notification success");

    sleep(Duration::from_millis(2_600)).await;
    assert!(harness.page.notifications().is_empty());
}

#[tokio::test(start_paused = true)]
async fn service_failure_keeps_the_prompt() {
    let harness = start(ReadyState::Loading, true);
    let input = mount_input(&harness).await;
    let control = harness.script.control().expect("control");

    harness.page.type_text(input, "hello");
    harness.page.click_control(control);
    sleep(SERVICE_LATENCY + Duration::from_millis(50)).await;

    assert_eq!(harness.page.value(input).as_deref(), Some("hello"));
    assert_eq!(harness.script.bridge_state(), BridgeState::Idle);
    assert!(!harness.page.control(control).expect("control").disabled);
    let notes = harness.page.notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].kind, NotificationKind::Error);
    assert_eq!(notes[0].message, "Enhancement failed. Check backend.");

    // Retry is simply another activation.
    assert!(harness.page.click_control(control));
    sleep(SERVICE_LATENCY + Duration::from_millis(50)).await;
    assert_eq!(harness.service.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn activations_during_a_request_do_not_send_again() {
    let harness = start(ReadyState::Loading, false);
    let input = mount_input(&harness).await;
    let control = harness.script.control().expect("control");

    harness.page.type_text(input, "hello");
    assert!(harness.page.click_control(control));
    sleep(Duration::from_millis(10)).await;

    // The disabled control swallows further clicks.
    assert!(!harness.page.click_control(control));
    assert!(!harness.page.click_control(control));

    sleep(SERVICE_LATENCY).await;
    assert_eq!(harness.service.calls.load(Ordering::SeqCst), 1);
    assert_eq!(harness.page.value(input).as_deref(), Some("Hello, world!"));
}

#[tokio::test(start_paused = true)]
async fn blank_prompt_only_warns() {
    let harness = start(ReadyState::Loading, false);
    let input = mount_input(&harness).await;
    let control = harness.script.control().expect("control");

    for text in ["", "   "] {
        harness.page.type_text(input, text);
        harness.page.click_control(control);
        sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(harness.service.calls.load(Ordering::SeqCst), 0);
    let notes = harness.page.notifications();
    assert_eq!(notes.len(), 2);
    assert!(notes
        .iter()
        .all(|note| note.kind == NotificationKind::Warning
            && note.message == "Please write a prompt first!"));
    assert!(!harness.page.control(control).expect("control").disabled);
}

#[tokio::test(start_paused = true)]
async fn blur_hides_after_grace_unless_hovered_or_refocused() {
    let harness = start(ReadyState::Loading, false);
    let input = mount_input(&harness).await;
    let control = harness.script.control().expect("control");
    let visible = |harness: &Harness| harness.page.control(control).expect("control").visible;

    harness.page.blur(input);
    sleep(Duration::from_millis(50)).await;
    assert!(visible(&harness));
    sleep(Duration::from_millis(100)).await;
    assert!(!visible(&harness));

    harness.page.focus(input);
    sleep(Duration::from_millis(10)).await;
    assert!(visible(&harness));

    harness.page.hover_control(control, true);
    harness.page.blur(input);
    sleep(Duration::from_millis(200)).await;
    assert!(visible(&harness));

    harness.page.hover_control(control, false);
    harness.page.blur(input);
    sleep(Duration::from_millis(50)).await;
    harness.page.focus(input);
    sleep(Duration::from_millis(200)).await;
    assert!(visible(&harness));
}

#[tokio::test(start_paused = true)]
async fn scroll_follows_the_target() {
    let harness = start(ReadyState::Loading, false);
    let input = mount_input(&harness).await;
    let control = harness.script.control().expect("control");

    harness
        .page
        .set_rect(input, Rect::new(300.0, 80.0, 700.0, 52.0));
    harness.page.scroll();
    sleep(Duration::from_millis(10)).await;

    let position = harness
        .page
        .control(control)
        .and_then(|snapshot| snapshot.position)
        .expect("positioned");
    assert_eq!(position.top, 255.0);
    assert_eq!(position.right, 20.0);
    assert_eq!(position.z_index, 10_000);
}
