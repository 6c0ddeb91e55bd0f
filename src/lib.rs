//! Numeric spinner emulation for form fields in hosts without native
//! `input[type=number]` support.
//!
//! A [`Page`] holds a small deterministic document model, a virtual-clock
//! timer queue, and the document-wide interaction handlers. Constructing a
//! page probes the host profile for native numeric-input support once;
//! [`Page::activate`] then augments each eligible field in a container with a
//! pair of increment/decrement arrows, unless the probe made the whole thing
//! unnecessary. Synthetic gestures (`key_down`, `pointer_down`, `pointer_up`)
//! and explicit clock control (`advance_time`, `run_due_timers`) drive the
//! machine deterministically, which is what makes the behavior testable.
//!
//! ```
//! use numspin::{EnvironmentProfile, Page};
//!
//! # fn main() -> numspin::Result<()> {
//! let mut page = Page::from_html_with_profile(
//!     "<form id='f'><input id='qty' type='number' value='3' step='5' max='10'></form>",
//!     EnvironmentProfile::modern_without_number_input(),
//! )?;
//! page.activate("#f")?;
//!
//! page.pointer_down(".numspin-up")?;
//! page.assert_value("#qty", "5")?;
//!
//! page.advance_time(750)?; // held long enough for the first repeat tick
//! page.assert_value("#qty", "10")?;
//! page.pointer_up()?;
//! # Ok(())
//! # }
//! ```

use std::fmt;

mod affordance;
mod detect;
mod dom;
mod engine;
mod events;
mod interaction;
mod markup;
pub mod number;
mod scheduler;

use dom::{Dom, NodeId, truncate_chars};
use events::{EventShims, ListenerStore};
use interaction::RepeatSession;
use scheduler::Scheduler;

pub use events::{EnvironmentProfile, EventState, TargetProperty};
pub use interaction::{
    INITIAL_REPEAT_DELAY_MS, KEY_CODE_DOWN, KEY_CODE_UP, REPEAT_INTERVAL_MS,
};
pub use scheduler::PendingTimer;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    MarkupParse(String),
    Runtime(String),
    SelectorNotFound(String),
    UnsupportedSelector(String),
    UnsupportedEnvironment(String),
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MarkupParse(msg) => write!(f, "markup parse error: {msg}"),
            Self::Runtime(msg) => write!(f, "runtime error: {msg}"),
            Self::SelectorNotFound(selector) => write!(f, "selector not found: {selector}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::UnsupportedEnvironment(msg) => write!(f, "unsupported environment: {msg}"),
            Self::AssertionFailed {
                selector,
                expected,
                actual,
                dom_snippet,
            } => write!(
                f,
                "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
            ),
        }
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Default)]
struct TraceState {
    lines: Vec<String>,
}

/// A loaded page: document tree, timer queue, host profile, and the
/// spinner's process-wide interaction state.
#[derive(Debug)]
pub struct Page {
    pub(crate) dom: Dom,
    pub(crate) listeners: ListenerStore,
    pub(crate) scheduler: Scheduler,
    pub(crate) shims: EventShims,
    pub(crate) profile: EnvironmentProfile,
    pub(crate) session: RepeatSession,
    native_number_support: bool,
    trace: TraceState,
}

impl Page {
    /// Parses `html` into a page with the default (fully capable) profile.
    pub fn from_html(html: &str) -> Result<Self> {
        Self::from_html_with_profile(html, EnvironmentProfile::default())
    }

    pub fn from_html_with_profile(html: &str, profile: EnvironmentProfile) -> Result<Self> {
        let mut dom = Dom::new();
        let root = dom.root;
        markup::parse_fragment(&mut dom, root, html)?;
        let native_number_support = detect::supports_native_number_input(&mut dom, &profile);

        let mut page = Self {
            dom,
            listeners: ListenerStore::default(),
            scheduler: Scheduler::default(),
            shims: EventShims::default(),
            profile,
            session: RepeatSession::default(),
            native_number_support,
            trace: TraceState::default(),
        };
        page.install_interaction_handlers();
        Ok(page)
    }

    /// Result of the one-shot capability probe run at construction.
    pub fn supports_native_number(&self) -> bool {
        self.native_number_support
    }

    /// Scans the container matched by `selector` and augments every
    /// `type="number"` form control that is not yet activated. Does nothing
    /// when the host supports the native control. Safe to call repeatedly.
    pub fn activate(&mut self, selector: &str) -> Result<()> {
        let container = self.select_one(selector)?;
        if self.native_number_support {
            return Ok(());
        }

        let controls = self
            .dom
            .descendant_elements(container)
            .into_iter()
            .filter(|node| self.dom.is_form_control(*node))
            .collect::<Vec<_>>();

        for node in controls {
            let is_number = self
                .dom
                .attr(node, "type")
                .map(|t| t == "number")
                .unwrap_or(false);
            if !is_number || self.is_activated(node) {
                continue;
            }
            self.dom.set_attr(node, affordance::ACTIVATED_ATTR, "true")?;
            affordance::build_affordance(&mut self.dom, node)?;
            self.trace_line(format!("[spin] activated field={}", self.node_label(node)));
        }
        Ok(())
    }

    pub(crate) fn select_one(&self, selector: &str) -> Result<NodeId> {
        if let Some(id) = selector.strip_prefix('#') {
            if id.is_empty() {
                return Err(Error::UnsupportedSelector(selector.to_string()));
            }
            return self
                .dom
                .id_index
                .get(id)
                .copied()
                .ok_or_else(|| Error::SelectorNotFound(selector.to_string()));
        }

        self.matching_elements(selector)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    /// Number of elements matching `selector`, in document order.
    pub fn query_count(&self, selector: &str) -> Result<usize> {
        if let Some(id) = selector.strip_prefix('#') {
            if id.is_empty() {
                return Err(Error::UnsupportedSelector(selector.to_string()));
            }
            return Ok(usize::from(self.dom.id_index.contains_key(id)));
        }
        Ok(self.matching_elements(selector)?.len())
    }

    fn matching_elements(&self, selector: &str) -> Result<Vec<NodeId>> {
        let elements = self.dom.descendant_elements(self.dom.root);
        if let Some(class) = selector.strip_prefix('.') {
            if class.is_empty() {
                return Err(Error::UnsupportedSelector(selector.to_string()));
            }
            return Ok(elements
                .into_iter()
                .filter(|node| self.dom.has_class(*node, class))
                .collect());
        }
        if selector.is_empty() || !selector.chars().all(|ch| ch.is_ascii_alphanumeric()) {
            return Err(Error::UnsupportedSelector(selector.to_string()));
        }
        Ok(elements
            .into_iter()
            .filter(|node| {
                self.dom
                    .tag_name(*node)
                    .map(|tag| tag.eq_ignore_ascii_case(selector))
                    .unwrap_or(false)
            })
            .collect())
    }

    /// Current text value of the form control matched by `selector`.
    pub fn value(&self, selector: &str) -> Result<String> {
        let node = self.select_one(selector)?;
        self.dom
            .value(node)
            .ok_or_else(|| Error::Runtime("value target is not an element".into()))
    }

    /// Content attribute of the element matched by `selector`.
    pub fn attr(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let node = self.select_one(selector)?;
        Ok(self.dom.attr(node, name))
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let node = self.select_one(selector)?;
        let actual = self
            .dom
            .value(node)
            .ok_or_else(|| Error::Runtime("value target is not an element".into()))?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: truncate_chars(&self.dom.outer_html(node), 120),
            });
        }
        Ok(())
    }

    /// Drains the accumulated `[spin]` / `[timer]` trace lines.
    pub fn take_trace_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.trace.lines)
    }

    pub(crate) fn trace_line(&mut self, line: String) {
        self.trace.lines.push(line);
    }

    pub(crate) fn node_label(&self, node: NodeId) -> String {
        if let Some(id) = self.dom.attr(node, "id") {
            return format!("#{id}");
        }
        self.dom
            .tag_name(node)
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| "node".to_string())
    }
}
