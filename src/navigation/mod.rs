//! Navigation aids: heading outline, skip links and long description links.

mod heading;
mod longdesc;
mod skipper;

pub use heading::{
    DATA_HEADING_ANCHOR_FOR, DATA_HEADING_LEVEL, HeadingOutline, ID_CONTAINER_HEADING,
    ID_TEXT_HEADING, heading_level, is_valid_heading_sequence,
};
pub use longdesc::{DATA_LONG_DESCRIPTION_FOR, LongDescriptionLinker};
pub use skipper::{DATA_ANCHOR_FOR, ID_CONTAINER_SKIPPERS, SkipperBuilder};

use crate::dom::ArenaNodeId;
use crate::engine::{Document, Position};

/// Create the jump target for `element`, marked `data_attribute=<element id>`.
///
/// A hyperlink element serves as its own anchor; anything else gets an
/// empty `<a class=anchor_class name=…>` inserted before it. Returns `None`
/// when an anchor for the element already exists or cannot be placed.
pub(crate) fn generate_anchor_for(
    doc: &mut Document,
    element: ArenaNodeId,
    data_attribute: &str,
    anchor_class: &str,
) -> Option<ArenaNodeId> {
    let id = doc.ensure_id(element);
    if doc.dom().elements_with_attr(data_attribute, &id).next().is_some() {
        return None;
    }

    let anchor = if doc.dom().tag_name(element) == Some("a") {
        element
    } else {
        let anchor = doc.dom_mut().create_element("a");
        doc.ensure_id(anchor);
        doc.dom_mut().set_attr(anchor, "class", anchor_class);
        if !doc.place_once(element, anchor, Position::Before) {
            tracing::debug!(id = %id, "no place for anchor, skipping element");
            return None;
        }
        anchor
    };

    let dom = doc.dom_mut();
    if !dom.has_attr(anchor, "name") {
        let name = dom.element_id(anchor).unwrap_or_default().to_string();
        dom.set_attr(anchor, "name", &name);
    }
    dom.set_attr(anchor, data_attribute, &id);
    Some(anchor)
}

/// `#name` link target of an anchor.
pub(crate) fn anchor_href(doc: &Document, anchor: ArenaNodeId) -> String {
    format!("#{}", doc.dom().get_attr(anchor, "name").unwrap_or_default())
}
