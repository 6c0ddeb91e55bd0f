//! One-shot probe for native numeric-input support.

use crate::dom::{Dom, NodeId};
use crate::events::EnvironmentProfile;

/// Effective control type of a form element: hosts without the native
/// numeric control silently coerce `type="number"` back to `text`.
pub(crate) fn effective_control_type(
    dom: &Dom,
    node: NodeId,
    profile: &EnvironmentProfile,
) -> String {
    let declared = dom.attr(node, "type").unwrap_or_else(|| "text".to_string());
    if declared.eq_ignore_ascii_case("number") && !profile.native_number_input {
        "text".to_string()
    } else {
        declared
    }
}

/// Creates a throwaway input, asks for `type="number"`, and reports whether
/// the type stuck. Computed once at page construction.
pub(crate) fn supports_native_number_input(dom: &mut Dom, profile: &EnvironmentProfile) -> bool {
    let probe = dom.create_detached_element("input");
    if dom.set_attr(probe, "type", "number").is_err() {
        return false;
    }
    effective_control_type(dom, probe, profile) != "text"
}
