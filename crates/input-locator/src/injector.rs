//! Control injection and reconciliation
//!
//! The injector is a two-state machine, `NoTarget` and `HasTarget`, driven by the results of
//! [`SelectorChain::locate`](crate::SelectorChain::locate). A target identity change destroys
//! the old control and mounts a fresh one on `document.body`; the host is free to replace the
//! target's subtree wholesale, so the control never lives inside it. A transient miss keeps
//! whatever is mounted.

use std::sync::Arc;

use enhancer_core_types::{ControlId, ElementId};
use host_page::{ControlPatch, ControlSpec, HostPage};
use tracing::{debug, info};

use crate::types::{
    Placement, TargetElement, BUSY_LABEL, CONTROL_DOM_ID, CONTROL_TITLE, IDLE_LABEL,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tracking {
    NoTarget,
    HasTarget {
        target: TargetElement,
        control: ControlId,
    },
}

/// What a reconcile tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Nothing located and nothing tracked.
    Idle,
    /// The tracked target (and its control) were left in place.
    Retained,
    /// A new control was mounted for a new target.
    Attached {
        target: TargetElement,
        control: ControlId,
        replaced: Option<ControlId>,
    },
}

pub struct Injector {
    page: Arc<dyn HostPage>,
    placement: Placement,
    tracking: Tracking,
    busy: bool,
}

impl Injector {
    pub fn new(page: Arc<dyn HostPage>, placement: Placement) -> Self {
        Self {
            page,
            placement,
            tracking: Tracking::NoTarget,
            busy: false,
        }
    }

    pub fn tracking(&self) -> Tracking {
        self.tracking
    }

    pub fn target(&self) -> Option<TargetElement> {
        match self.tracking {
            Tracking::HasTarget { target, .. } => Some(target),
            Tracking::NoTarget => None,
        }
    }

    pub fn control(&self) -> Option<ControlId> {
        match self.tracking {
            Tracking::HasTarget { control, .. } => Some(control),
            Tracking::NoTarget => None,
        }
    }

    pub fn is_target(&self, element: ElementId) -> bool {
        self.target()
            .map(|target| target.element == element)
            .unwrap_or(false)
    }

    pub fn reconcile(&mut self, located: Option<TargetElement>) -> ReconcileOutcome {
        let Some(located) = located else {
            return match self.tracking {
                Tracking::NoTarget => ReconcileOutcome::Idle,
                Tracking::HasTarget { .. } => ReconcileOutcome::Retained,
            };
        };

        let replaced = match self.tracking {
            Tracking::HasTarget { target, .. } if target.same_as(&located) => {
                return ReconcileOutcome::Retained;
            }
            Tracking::HasTarget { control, .. } => {
                self.page.remove_control(control);
                Some(control)
            }
            Tracking::NoTarget => None,
        };

        let control = self.page.append_control(&ControlSpec {
            dom_id: CONTROL_DOM_ID.to_string(),
            label: self.label().to_string(),
            title: CONTROL_TITLE.to_string(),
            disabled: self.busy,
        });
        self.tracking = Tracking::HasTarget {
            target: located,
            control,
        };
        self.place(located, control);

        info!(
            element = %located.element,
            kind = located.kind.name(),
            %control,
            replaced = replaced.is_some(),
            "enhance control attached"
        );
        ReconcileOutcome::Attached {
            target: located,
            control,
            replaced,
        }
    }

    /// Moves the control to the target's current rectangle and shows it. Used on scroll.
    pub fn reposition(&self) -> bool {
        match self.tracking {
            Tracking::HasTarget { target, control } => self.place(target, control),
            Tracking::NoTarget => false,
        }
    }

    /// Focus handler: shows and repositions the control when `element` is the target.
    pub fn reveal(&self, element: ElementId) -> bool {
        if !self.is_target(element) {
            return false;
        }
        self.reposition()
    }

    /// Blur handler, run once the grace delay has elapsed. A hovered control stays up so a
    /// click that caused the blur still lands.
    pub fn conceal_unless_hovered(&self) -> bool {
        let Tracking::HasTarget { control, .. } = self.tracking else {
            return false;
        };
        if self.page.is_control_hovered(control) {
            debug!(%control, "control hovered; keeping it visible");
            return false;
        }
        self.page.update_control(control, &ControlPatch::hide());
        true
    }

    /// Switches the control between its idle and in-progress appearance. The state also
    /// applies to controls mounted later, until it is switched back.
    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
        if let Some(control) = self.control() {
            self.page
                .update_control(control, &ControlPatch::busy_state(self.label(), busy));
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Removes the control and forgets the target.
    pub fn detach(&mut self) {
        if let Some(control) = self.control() {
            self.page.remove_control(control);
        }
        self.tracking = Tracking::NoTarget;
    }

    fn label(&self) -> &'static str {
        if self.busy {
            BUSY_LABEL
        } else {
            IDLE_LABEL
        }
    }

    fn place(&self, target: TargetElement, control: ControlId) -> bool {
        let Some(rect) = self.page.bounding_rect(target.element) else {
            return false;
        };
        self.page.update_control(
            control,
            &ControlPatch::show_at(self.placement.position_for(rect)),
        );
        true
    }
}
