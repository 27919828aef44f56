//! Annotation primitives shared by every driver.
//!
//! A [`Document`] owns the tree being annotated together with its
//! identifier allocator. Drivers never hold node references across runs:
//! every association between an annotation and its element goes through a
//! link attribute carrying the element's id, looked up again on demand.

pub mod force_read;
pub mod ids;
pub mod insert;
pub mod shortcut;

pub use force_read::{CLASS_FORCE_READ_AFTER, CLASS_FORCE_READ_BEFORE, Templates, is_sentinel};
pub use ids::IdAllocator;
pub use insert::{Placement, Position};
pub use shortcut::{SHORTCUT_KEYS, assign_shortcut, free_shortcut, shortcut_prefix};

use crate::config::Configure;
use crate::dom::{ArenaDom, ArenaNodeId};

/// Authors put this attribute on an element to keep it and its subtree
/// untouched.
pub const DATA_IGNORE: &str = "data-ignoreaccessibilityfix";

/// Parameter naming the prefix of generated ids.
pub const PARAMETER_PREFIX_IDS: &str = "prefix-generated-ids";

/// Ancestors whose content is never annotated.
const INERT_CONTAINERS: &[&str] = &["head", "script", "style", "template"];

/// A tree under annotation.
#[derive(Debug, Clone)]
pub struct Document {
    dom: ArenaDom,
    ids: IdAllocator,
}

impl Document {
    pub fn new(dom: ArenaDom, id_prefix: impl Into<String>) -> Self {
        Self {
            dom,
            ids: IdAllocator::new(id_prefix),
        }
    }

    /// Use the configured id prefix.
    pub fn with_config(dom: ArenaDom, config: &Configure) -> Self {
        Self::new(dom, config.parameter(PARAMETER_PREFIX_IDS))
    }

    pub fn dom(&self) -> &ArenaDom {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut ArenaDom {
        &mut self.dom
    }

    pub fn into_dom(self) -> ArenaDom {
        self.dom
    }

    /// The element's id, generated if missing.
    pub fn ensure_id(&mut self, node: ArenaNodeId) -> String {
        self.ids.ensure_id(&mut self.dom, node)
    }

    /// Insert `node` relative to `target` through the insertion planner,
    /// fanning out copies when the target has several labels.
    pub fn place(&mut self, target: ArenaNodeId, node: ArenaNodeId, position: Position) -> usize {
        insert::place(&mut self.dom, target, node, position)
    }

    /// Insert `node` at the first legal point only. Returns false when the
    /// target has no insertion point.
    pub fn place_once(&mut self, target: ArenaNodeId, node: ArenaNodeId, position: Position) -> bool {
        match insert::resolve(&self.dom, target, position).first() {
            Some(&placement) => {
                insert::apply(&mut self.dom, placement, node);
                true
            }
            None => false,
        }
    }
}

/// Whether a driver may touch this element: connected, not generated by the
/// engine as a sentinel, and not inside an ignored or inert subtree.
pub fn is_valid_element(dom: &ArenaDom, node: ArenaNodeId) -> bool {
    if !dom.is_element(node) || !dom.is_connected(node) {
        return false;
    }
    let blocked = |n: ArenaNodeId| {
        dom.has_attr(n, DATA_IGNORE)
            || is_sentinel(dom, n)
            || dom.tag_name(n).is_some_and(|tag| INERT_CONTAINERS.contains(&tag))
    };
    !blocked(node) && !dom.ancestors(node).any(blocked)
}

/// Text content with sentinel subtrees left out, so text read from the
/// document is the same before and after annotation.
pub fn visible_text(dom: &ArenaDom, node: ArenaNodeId) -> String {
    let mut text = String::new();
    collect_visible_text(dom, node, &mut text);
    text
}

fn collect_visible_text(dom: &ArenaDom, node: ArenaNodeId, text: &mut String) {
    if let Some(own) = dom.text(node) {
        text.push_str(own);
        return;
    }
    for child in dom.children(node) {
        if dom.is_element(child) && is_sentinel(dom, child) {
            continue;
        }
        collect_visible_text(dom, child, text);
    }
}
