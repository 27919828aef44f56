//! Identifier allocation.

use crate::dom::{ArenaDom, ArenaNodeId};

/// Hands out `<prefix><counter>` identifiers that no element of the tree
/// has ever carried.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    prefix: String,
    counter: u64,
}

impl IdAllocator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: 0,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Return the element's `id`, assigning a fresh one first if it has none.
    pub fn ensure_id(&mut self, dom: &mut ArenaDom, node: ArenaNodeId) -> String {
        if let Some(id) = dom.element_id(node)
            && !id.is_empty()
        {
            return id.to_string();
        }

        loop {
            self.counter += 1;
            let candidate = format!("{}{}", self.prefix, self.counter);
            if !dom.is_id_taken(&candidate) {
                dom.set_attr(node, "id", &candidate);
                return candidate;
            }
        }
    }
}
