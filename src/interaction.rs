//! The interaction state machine: keyboard steps, pointer-held repeat, and
//! the single-slot session record behind continuous adjustment.
//!
//! A pointer press over an arrow moves the machine from Idle to Repeating and
//! schedules the first repeat check after a long delay that separates a
//! deliberate hold from a plain click; subsequent ticks run on a fast
//! cadence. Release anywhere returns to Idle. Ticks re-check the session flag
//! before acting, so a tick that fires after release is a no-op; no timer is
//! ever cancelled explicitly.

use std::rc::Rc;

use crate::affordance::{DOWN_CLASS, UP_CLASS};
use crate::dom::NodeId;
use crate::events::{EventState, ListenerSlot};
use crate::scheduler::TimerCallback;
use crate::{Page, Result};

/// Key code mapped to an increment, re-fired by the host's own key repeat.
pub const KEY_CODE_UP: u32 = 38;
/// Key code mapped to a decrement.
pub const KEY_CODE_DOWN: u32 = 40;

/// Delay before the first repeat tick of a held pointer, long enough to
/// tell a deliberate hold from a plain click.
pub const INITIAL_REPEAT_DELAY_MS: i64 = 750;
/// Cadence of subsequent repeat ticks while the pointer stays held.
pub const REPEAT_INTERVAL_MS: i64 = 100;

/// At most one continuous-adjustment session exists per page.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct RepeatSession {
    pub(crate) active: bool,
    pub(crate) direction: i32,
    pub(crate) target: Option<NodeId>,
}

impl RepeatSession {
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

fn direction_for_key(key_code: u32) -> Option<i32> {
    match key_code {
        KEY_CODE_UP => Some(1),
        KEY_CODE_DOWN => Some(-1),
        _ => None,
    }
}

fn direction_for_arrow(page: &Page, node: NodeId) -> Option<i32> {
    for token in page.dom.class_tokens(node) {
        if token == UP_CLASS {
            return Some(1);
        }
        if token == DOWN_CLASS {
            return Some(-1);
        }
    }
    None
}

impl Page {
    /// Document-wide listeners, registered once at page construction through
    /// the listen shim.
    pub(crate) fn install_interaction_handlers(&mut self) {
        self.shim_listen(
            ListenerSlot::Document,
            "keydown",
            Rc::new(|page, event| page.on_key_down(event)),
        );
        self.shim_listen(
            ListenerSlot::Document,
            "mousedown",
            Rc::new(|page, event| page.on_pointer_down(event)),
        );
        // Release must clear the session no matter where it happens and no
        // matter whether the event can name its origin, so this handler
        // never touches the event.
        self.shim_listen(
            ListenerSlot::Document,
            "mouseup",
            Rc::new(|page, _event| {
                page.session.clear();
                Ok(())
            }),
        );
    }

    fn on_key_down(&mut self, event: &mut EventState) -> Result<()> {
        let target = self.shim_resolve_target(event)?;
        let Some(direction) = event.key_code.and_then(direction_for_key) else {
            return Ok(());
        };
        if !self.is_activated(target) {
            return Ok(());
        }
        self.shim_prevent(event);
        // Holding the key repeats through the host's native key-repeat
        // re-firing keydown; the machine stays Idle.
        self.adjust(direction, target)
    }

    fn on_pointer_down(&mut self, event: &mut EventState) -> Result<()> {
        let target = self.shim_resolve_target(event)?;
        let Some(direction) = direction_for_arrow(self, target) else {
            return Ok(());
        };
        let Some(container) = self.dom.parent(target) else {
            return Ok(());
        };
        let Some(field) = self.dom.next_sibling(container) else {
            return Ok(());
        };
        if !self.is_activated(field) {
            return Ok(());
        }

        self.session = RepeatSession {
            active: true,
            direction,
            target: Some(field),
        };
        self.trace_line(format!(
            "[spin] repeat start field={} dir={direction}",
            self.node_label(field)
        ));
        self.adjust(direction, field)?;
        self.set_timeout(
            INITIAL_REPEAT_DELAY_MS,
            TimerCallback(Rc::new(|page| page.repeat_tick())),
        );
        Ok(())
    }

    fn repeat_tick(&mut self) -> Result<()> {
        // The session flag is the cancellation mechanism: a tick firing
        // after release finds it cleared and schedules nothing further.
        if !self.session.active {
            return Ok(());
        }
        let direction = self.session.direction;
        let Some(field) = self.session.target else {
            return Ok(());
        };
        self.adjust(direction, field)?;
        self.set_timeout(
            REPEAT_INTERVAL_MS,
            TimerCallback(Rc::new(|page| page.repeat_tick())),
        );
        Ok(())
    }

    pub(crate) fn is_activated(&self, node: NodeId) -> bool {
        self.dom
            .attr(node, crate::affordance::ACTIVATED_ATTR)
            .map(|marker| marker == "true")
            .unwrap_or(false)
    }
}
