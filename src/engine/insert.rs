//! Where an annotation may legally be inserted around a target element.
//!
//! Sibling insertion next to a form control or inside list, table and
//! label semantics is not reliably announced, so annotations are moved
//! into the element (content-absorbing tags) or onto the control's labels.

use crate::dom::{ArenaDom, ArenaNodeId};

/// Side of the target an annotation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    Before,
    After,
}

/// A resolved insertion point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    FirstChild(ArenaNodeId),
    LastChild(ArenaNodeId),
    Before(ArenaNodeId),
    After(ArenaNodeId),
}

/// Tags whose own content is announced together with inserted children.
const CONTENT_ABSORBING: &[&str] = &[
    "body",
    "a",
    "figcaption",
    "caption",
    "li",
    "dt",
    "dd",
    "label",
    "option",
    "td",
    "th",
];

const FORM_CONTROLS: &[&str] = &["input", "select", "textarea"];

/// Every insertion point for an annotation of `target`, in document order.
///
/// A form control resolves to one point per associated label; a control
/// with no label resolves to nothing.
pub fn resolve(dom: &ArenaDom, target: ArenaNodeId, position: Position) -> Vec<Placement> {
    let mut placements = Vec::new();
    resolve_into(dom, target, position, &mut placements);
    placements
}

fn resolve_into(
    dom: &ArenaDom,
    target: ArenaNodeId,
    position: Position,
    placements: &mut Vec<Placement>,
) {
    match dom.tag_name(target) {
        Some("html") => {
            if let Some(body) = dom.body() {
                resolve_into(dom, body, position, placements);
            }
        }
        Some(tag) if CONTENT_ABSORBING.contains(&tag) => placements.push(match position {
            Position::Before => Placement::FirstChild(target),
            Position::After => Placement::LastChild(target),
        }),
        Some(tag) if FORM_CONTROLS.contains(&tag) => {
            for label in labels_for(dom, target) {
                resolve_into(dom, label, position, placements);
            }
        }
        _ => placements.push(match position {
            Position::Before => Placement::Before(target),
            Position::After => Placement::After(target),
        }),
    }
}

/// Labels of a form control: `label[for=<id>]` first, else enclosing labels.
pub fn labels_for(dom: &ArenaDom, control: ArenaNodeId) -> Vec<ArenaNodeId> {
    let mut labels: Vec<ArenaNodeId> = match dom.element_id(control) {
        Some(id) if !id.is_empty() => dom
            .elements_with_attr("for", id)
            .filter(|&node| dom.tag_name(node) == Some("label"))
            .collect(),
        _ => Vec::new(),
    };
    if labels.is_empty() {
        labels = dom
            .ancestors(control)
            .filter(|&node| dom.tag_name(node) == Some("label"))
            .collect();
    }
    labels
}

/// Attach `node` at a resolved insertion point.
pub fn apply(dom: &mut ArenaDom, placement: Placement, node: ArenaNodeId) {
    match placement {
        Placement::FirstChild(parent) => dom.prepend(parent, node),
        Placement::LastChild(parent) => dom.append(parent, node),
        Placement::Before(sibling) => dom.insert_before(sibling, node),
        Placement::After(sibling) => dom.insert_after(sibling, node),
    }
}

/// Insert `node` at every insertion point of `target`; the second and later
/// points receive deep copies. Returns the number of nodes attached.
pub fn place(dom: &mut ArenaDom, target: ArenaNodeId, node: ArenaNodeId, position: Position) -> usize {
    let placements = resolve(dom, target, position);
    if placements.is_empty() {
        tracing::debug!(
            tag = dom.tag_name(target).unwrap_or(""),
            "no insertion point for annotation, skipping"
        );
        return 0;
    }

    for (index, &placement) in placements.iter().enumerate() {
        let inserted = if index == 0 { node } else { dom.deep_clone(node) };
        apply(dom, placement, inserted);
    }
    placements.len()
}
