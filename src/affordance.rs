//! Construction of the increment/decrement arrow widget.
//!
//! The widget is a relatively positioned container shifted left over the
//! field, roughly one character wide and three tall at half the inherited
//! font size, holding an up glyph near the top and a down glyph near the
//! bottom. It is inserted as the field's previous sibling, so the controller
//! can resolve the field as the container's next sibling.

use crate::dom::{Dom, NodeId};
use crate::{Error, Result};

pub(crate) const ARROWS_CLASS: &str = "numspin-arrows";
pub(crate) const UP_CLASS: &str = "numspin-up";
pub(crate) const DOWN_CLASS: &str = "numspin-down";

/// Activation marker attribute, set once per field and never cleared.
pub(crate) const ACTIVATED_ATTR: &str = "data-numspin-activated";

const UP_GLYPH: &str = "\u{25B2}";
const DOWN_GLYPH: &str = "\u{25BC}";

const CONTAINER_STYLE: &str = "position: relative; display: inline-block; width: 1em; \
     left: -1.3em; font-size: .5em; height: 3em; vertical-align: middle; cursor: pointer;";
const UP_STYLE: &str = "position: absolute; left: 0; top: .3em;";
const DOWN_STYLE: &str = "position: absolute; left: 0; bottom: .3em;";

pub(crate) fn build_affordance(dom: &mut Dom, field: NodeId) -> Result<()> {
    let parent = dom
        .parent(field)
        .ok_or_else(|| Error::Runtime("field has no parent to hold the affordance".into()))?;

    let container = dom.create_detached_element("span");
    dom.set_attr(container, "class", ARROWS_CLASS)?;
    dom.set_attr(container, "style", CONTAINER_STYLE)?;

    let up = dom.create_detached_element("span");
    dom.set_attr(up, "class", UP_CLASS)?;
    dom.set_attr(up, "style", UP_STYLE)?;
    dom.create_text(up, UP_GLYPH.to_string());
    dom.append_child(container, up)?;

    let down = dom.create_detached_element("span");
    dom.set_attr(down, "class", DOWN_CLASS)?;
    dom.set_attr(down, "style", DOWN_STYLE)?;
    dom.create_text(down, DOWN_GLYPH.to_string());
    dom.append_child(container, down)?;

    dom.insert_before(parent, container, field)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup;

    #[test]
    fn affordance_precedes_the_field_with_both_arrows() -> Result<()> {
        let mut dom = Dom::new();
        let root = dom.root;
        markup::parse_fragment(&mut dom, root, "<form><input id=qty type=number></form>")?;
        let field = *dom.id_index.get("qty").expect("field exists");

        build_affordance(&mut dom, field)?;

        let container = dom.previous_sibling(field).expect("container inserted");
        assert!(dom.has_class(container, ARROWS_CLASS));
        assert_eq!(dom.next_sibling(container), Some(field));

        let arrows = dom.descendant_elements(container);
        assert_eq!(arrows.len(), 2);
        assert!(dom.has_class(arrows[0], UP_CLASS));
        assert!(dom.has_class(arrows[1], DOWN_CLASS));
        Ok(())
    }

    #[test]
    fn detached_field_cannot_hold_an_affordance() {
        let mut dom = Dom::new();
        let field = dom.create_detached_element("input");
        assert!(build_affordance(&mut dom, field).is_err());
    }
}
