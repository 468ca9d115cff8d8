//! Page-context event loop.
//!
//! Wires the input locator and the page half of the bridge to one host document. All document
//! work happens on the loop task or in the activation task it spawns; the injector sits behind a
//! mutex only so the activation task can flip the control's busy state.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use enhancer_core_types::{ControlId, NotificationKind};
use extensions_bridge::{BridgeState, EnhanceController, PromptSurface, RuntimeMessenger};
use host_page::{notify::DEFAULT_NOTIFICATION_LIFETIME, HostPage, Notifier, PageSignal};
use input_locator::{
    read_text, write_text, Debouncer, Injector, ObserverTiming, Placement, ReconcileOutcome,
    SelectorChain, TargetElement,
};
use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

/// Everything the content script needs to know about the host page.
#[derive(Debug, Clone)]
pub struct PageSettings {
    pub chain: SelectorChain,
    pub timing: ObserverTiming,
    pub placement: Placement,
    pub notification_lifetime: Duration,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            chain: SelectorChain::default(),
            timing: ObserverTiming::default(),
            placement: Placement::default(),
            notification_lifetime: DEFAULT_NOTIFICATION_LIFETIME,
        }
    }
}

struct Shared {
    page: Arc<dyn HostPage>,
    injector: Mutex<Injector>,
    notifier: Notifier,
    controller: EnhanceController,
    reconciles: AtomicUsize,
}

impl Shared {
    fn target(&self) -> Option<TargetElement> {
        self.injector.lock().target()
    }
}

impl PromptSurface for Shared {
    fn read_prompt(&self) -> Option<String> {
        let target = self.target()?;
        Some(read_text(&*self.page, &target))
    }

    fn write_prompt(&self, text: &str) -> bool {
        // Resolved at reply time: the host may have swapped the input while we waited.
        let Some(target) = self.target() else {
            return false;
        };
        write_text(&*self.page, &target, text).is_ok()
    }

    fn set_busy(&self, busy: bool) {
        self.injector.lock().set_busy(busy);
    }

    fn notify(&self, message: &str, kind: NotificationKind) {
        self.notifier.show(message, kind);
    }
}

/// Read-only view of a running content script.
#[derive(Clone)]
pub struct ContentScriptHandle {
    shared: Arc<Shared>,
}

impl ContentScriptHandle {
    pub fn target(&self) -> Option<TargetElement> {
        self.shared.target()
    }

    pub fn control(&self) -> Option<ControlId> {
        self.shared.injector.lock().control()
    }

    pub fn bridge_state(&self) -> BridgeState {
        self.shared.controller.state()
    }

    /// Number of reconcile passes run so far.
    pub fn reconcile_count(&self) -> usize {
        self.shared.reconciles.load(Ordering::SeqCst)
    }
}

pub struct ContentScript {
    shared: Arc<Shared>,
    chain: SelectorChain,
    timing: ObserverTiming,
}

impl ContentScript {
    pub fn new(
        page: Arc<dyn HostPage>,
        settings: PageSettings,
        messenger: Arc<dyn RuntimeMessenger>,
    ) -> Self {
        let shared = Shared {
            injector: Mutex::new(Injector::new(page.clone(), settings.placement)),
            notifier: Notifier::new(page.clone(), settings.notification_lifetime),
            controller: EnhanceController::new(messenger),
            reconciles: AtomicUsize::new(0),
            page,
        };
        Self {
            shared: Arc::new(shared),
            chain: settings.chain,
            timing: settings.timing,
        }
    }

    pub fn handle(&self) -> ContentScriptHandle {
        ContentScriptHandle {
            shared: self.shared.clone(),
        }
    }

    /// Runs the loop on a new task.
    pub fn spawn(self, signals: UnboundedReceiver<PageSignal>) -> JoinHandle<()> {
        tokio::spawn(self.run(signals))
    }

    /// Processes page signals until the page goes away.
    pub async fn run(self, mut signals: UnboundedReceiver<PageSignal>) {
        info!("AI Prompt Enhancer: content script loaded");

        let mut observer = Debouncer::new(self.timing.debounce);
        let mut initial = Debouncer::new(self.timing.initial_delay);
        let mut blur_hide = Debouncer::new(self.timing.blur_grace);
        let mut loading = self.shared.page.ready_state().is_loading();
        if !loading {
            initial.arm();
        }

        loop {
            tokio::select! {
                signal = signals.recv() => {
                    let Some(signal) = signal else { break };
                    self.on_signal(signal, &mut loading, &mut observer, &mut blur_hide);
                }
                _ = initial.fired() => observer.arm(),
                collapsed = observer.fired() => {
                    if self.reconcile(collapsed) {
                        blur_hide.cancel();
                    }
                }
                _ = blur_hide.fired() => {
                    self.shared.injector.lock().conceal_unless_hovered();
                }
            }
        }
        debug!("page signal stream closed, content script stopping");
        self.shared.injector.lock().detach();
    }

    fn on_signal(
        &self,
        signal: PageSignal,
        loading: &mut bool,
        observer: &mut Debouncer,
        blur_hide: &mut Debouncer,
    ) {
        trace!(?signal, "page signal");
        match signal {
            PageSignal::Loaded => {
                if std::mem::take(loading) {
                    observer.arm();
                }
            }
            PageSignal::Mutation => observer.arm(),
            PageSignal::Scroll => {
                self.shared.injector.lock().reposition();
            }
            PageSignal::Focus(element) => {
                if self.shared.injector.lock().reveal(element) {
                    blur_hide.cancel();
                }
            }
            PageSignal::Blur(element) => {
                if self.shared.injector.lock().is_target(element) {
                    blur_hide.arm();
                }
            }
            PageSignal::ControlActivated(control) => self.activate(control),
        }
    }

    /// One debounced pass: locate against the current document and reconcile the control.
    /// Returns `true` when a new control was mounted.
    fn reconcile(&self, collapsed: usize) -> bool {
        self.shared.reconciles.fetch_add(1, Ordering::SeqCst);
        let located = self.chain.locate(&*self.shared.page);
        let outcome = self.shared.injector.lock().reconcile(located);
        debug!(collapsed, ?outcome, "reconciled");
        matches!(outcome, ReconcileOutcome::Attached { .. })
    }

    fn activate(&self, control: ControlId) {
        if self.shared.injector.lock().control() != Some(control) {
            debug!(%control, "activation from a stale control ignored");
            return;
        }
        let shared = self.shared.clone();
        tokio::spawn(async move {
            let outcome = shared.controller.activate(&*shared).await;
            debug!(?outcome, "activation finished");
        });
    }
}
