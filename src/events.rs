//! Event plumbing: the host capability profile, the capability-negotiated
//! shims, the listener store, and synthetic user gestures.
//!
//! Each shim resolves its strategy once from the profile and keeps it for the
//! life of the page; later calls never redetect. Target resolution is the one
//! primitive allowed to fail hard: a host whose events carry neither a
//! `target` nor a `srcElement` property is unsupported, and the error
//! propagates out of the running handler uncaught.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::dom::NodeId;
use crate::{Error, Page, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetProperty {
    Target,
    SrcElement,
    Neither,
}

/// Capabilities of the hosting environment, fixed per page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentProfile {
    /// Whether setting `type="number"` on an input sticks, or silently
    /// coerces back to a plain text control.
    pub native_number_input: bool,
    /// `addEventListener`-style registration vs the legacy `on`-prefixed
    /// attach mechanism.
    pub standard_listeners: bool,
    /// `preventDefault()` vs assigning `returnValue = false`.
    pub standard_prevent_default: bool,
    /// Which property of an event carries the originating element.
    pub target_property: TargetProperty,
}

impl EnvironmentProfile {
    pub fn modern() -> Self {
        Self {
            native_number_input: true,
            standard_listeners: true,
            standard_prevent_default: true,
            target_property: TargetProperty::Target,
        }
    }

    pub fn legacy() -> Self {
        Self {
            native_number_input: false,
            standard_listeners: false,
            standard_prevent_default: false,
            target_property: TargetProperty::SrcElement,
        }
    }

    /// A standards-compliant host that lacks the native numeric control,
    /// which is the environment the emulation exists for.
    pub fn modern_without_number_input() -> Self {
        Self {
            native_number_input: false,
            ..Self::modern()
        }
    }
}

impl Default for EnvironmentProfile {
    fn default() -> Self {
        Self::modern()
    }
}

#[derive(Debug, Clone)]
pub struct EventState {
    pub event_type: String,
    pub(crate) target: Option<NodeId>,
    pub(crate) src_element: Option<NodeId>,
    pub key_code: Option<u32>,
    pub default_prevented: bool,
    pub return_value: bool,
    pub time_stamp_ms: i64,
}

impl EventState {
    pub(crate) fn new(
        event_type: &str,
        origin: Option<NodeId>,
        profile: &EnvironmentProfile,
        key_code: Option<u32>,
        time_stamp_ms: i64,
    ) -> Self {
        let (target, src_element) = match profile.target_property {
            TargetProperty::Target => (origin, None),
            TargetProperty::SrcElement => (None, origin),
            TargetProperty::Neither => (None, None),
        };
        Self {
            event_type: event_type.to_string(),
            target,
            src_element,
            key_code,
            default_prevented: false,
            return_value: true,
            time_stamp_ms,
        }
    }

    /// True when either suppression mechanism fired.
    pub fn default_suppressed(&self) -> bool {
        self.default_prevented || !self.return_value
    }
}

pub(crate) type HandlerFn = Rc<dyn Fn(&mut Page, &mut EventState) -> Result<()>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum ListenerSlot {
    Document,
    Node(NodeId),
}

#[derive(Default)]
pub(crate) struct ListenerStore {
    map: HashMap<ListenerSlot, HashMap<String, Vec<HandlerFn>>>,
}

impl ListenerStore {
    pub(crate) fn add(&mut self, slot: ListenerSlot, event_key: String, handler: HandlerFn) {
        self.map
            .entry(slot)
            .or_default()
            .entry(event_key)
            .or_default()
            .push(handler);
    }

    pub(crate) fn get(&self, slot: ListenerSlot, event_key: &str) -> Vec<HandlerFn> {
        self.map
            .get(&slot)
            .and_then(|events| events.get(event_key))
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn registered_keys(&self, slot: ListenerSlot) -> Vec<String> {
        let mut keys = self
            .map
            .get(&slot)
            .map(|events| events.keys().cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        keys.sort();
        keys
    }
}

impl fmt::Debug for ListenerStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (slot, events) in &self.map {
            let counts = events
                .iter()
                .map(|(key, handlers)| (key.clone(), handlers.len()))
                .collect::<HashMap<_, _>>();
            map.entry(slot, &counts);
        }
        map.finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListenStrategy {
    AddEventListener,
    AttachEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PreventStrategy {
    PreventDefault,
    ReturnValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TargetStrategy {
    TargetProperty,
    SrcElementProperty,
    Unsupported,
}

/// One-shot strategy slots, empty until the primitive is first used.
#[derive(Debug, Default)]
pub(crate) struct EventShims {
    pub(crate) listen: Option<ListenStrategy>,
    pub(crate) prevent: Option<PreventStrategy>,
    pub(crate) target: Option<TargetStrategy>,
}

impl Page {
    pub(crate) fn shim_listen(&mut self, slot: ListenerSlot, event: &str, handler: HandlerFn) {
        let strategy = *self.shims.listen.get_or_insert(
            if self.profile.standard_listeners {
                ListenStrategy::AddEventListener
            } else {
                ListenStrategy::AttachEvent
            },
        );
        let key = match strategy {
            ListenStrategy::AddEventListener => event.to_string(),
            ListenStrategy::AttachEvent => format!("on{event}"),
        };
        self.listeners.add(slot, key, handler);
    }

    pub(crate) fn shim_prevent(&mut self, event: &mut EventState) {
        let strategy = *self.shims.prevent.get_or_insert(
            if self.profile.standard_prevent_default {
                PreventStrategy::PreventDefault
            } else {
                PreventStrategy::ReturnValue
            },
        );
        match strategy {
            PreventStrategy::PreventDefault => event.default_prevented = true,
            PreventStrategy::ReturnValue => event.return_value = false,
        }
    }

    pub(crate) fn shim_resolve_target(&mut self, event: &EventState) -> Result<NodeId> {
        let strategy = *self
            .shims
            .target
            .get_or_insert(match self.profile.target_property {
                TargetProperty::Target => TargetStrategy::TargetProperty,
                TargetProperty::SrcElement => TargetStrategy::SrcElementProperty,
                TargetProperty::Neither => TargetStrategy::Unsupported,
            });
        match strategy {
            TargetStrategy::TargetProperty => event
                .target
                .ok_or_else(|| Error::Runtime("event carries no target".into())),
            TargetStrategy::SrcElementProperty => event
                .src_element
                .ok_or_else(|| Error::Runtime("event carries no srcElement".into())),
            TargetStrategy::Unsupported => Err(Error::UnsupportedEnvironment(
                "event has no target or srcElement property".into(),
            )),
        }
    }

    pub(crate) fn dispatch_gesture(
        &mut self,
        event_type: &str,
        origin: Option<NodeId>,
        key_code: Option<u32>,
    ) -> Result<EventState> {
        let mut event = EventState::new(
            event_type,
            origin,
            &self.profile,
            key_code,
            self.scheduler.now_ms,
        );

        let mut slots = Vec::new();
        let mut cursor = origin;
        while let Some(node) = cursor {
            slots.push(ListenerSlot::Node(node));
            cursor = self.dom.parent(node);
        }
        slots.push(ListenerSlot::Document);

        // Legacy registrations live under the on-prefixed key; both fire for
        // the same gesture.
        let keys = [event_type.to_string(), format!("on{event_type}")];
        for slot in slots {
            for key in &keys {
                for handler in self.listeners.get(slot, key) {
                    handler(self, &mut event)?;
                }
            }
        }
        Ok(event)
    }

    /// Synthetic key-down on the element matched by `selector`.
    pub fn key_down(&mut self, selector: &str, key_code: u32) -> Result<EventState> {
        let target = self.select_one(selector)?;
        self.dispatch_gesture("keydown", Some(target), Some(key_code))
    }

    /// Synthetic primary-button press over the element matched by `selector`.
    pub fn pointer_down(&mut self, selector: &str) -> Result<EventState> {
        let target = self.select_one(selector)?;
        self.dispatch_gesture("mousedown", Some(target), None)
    }

    /// Synthetic button release, anywhere in the document.
    pub fn pointer_up(&mut self) -> Result<EventState> {
        self.dispatch_gesture("mouseup", None, None)
    }
}
