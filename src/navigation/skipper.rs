//! "Skip to" links for configured page regions.

use crate::config::{Configure, Skipper};
use crate::dom::{ArenaDom, ArenaNodeId, ElementRef, Selector};
use crate::engine::{Document, assign_shortcut, is_valid_element};
use crate::error::Result;

use super::{anchor_href, generate_anchor_for};

pub const ID_CONTAINER_SKIPPERS: &str = "container-skippers";
pub const DATA_ANCHOR_FOR: &str = "data-anchorfor";
pub const CLASS_SKIPPER_ANCHOR: &str = "skipper-anchor";

/// Builds `div#container-skippers > ul` at the start of body, one link per
/// element matched by a configured skipper.
pub struct SkipperBuilder<'c> {
    skippers: Vec<(Selector, &'c Skipper)>,
}

impl<'c> SkipperBuilder<'c> {
    /// Parse every skipper selector up front; an invalid one is an error.
    pub fn new(config: &'c Configure) -> Result<Self> {
        let skippers = config
            .skippers()
            .iter()
            .map(|skipper| Ok((Selector::parse(&skipper.selector)?, skipper)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { skippers })
    }

    /// Add a skip link for `element` using the first skipper that matches
    /// it. Returns false when none matches or the element already has one.
    pub fn provide(&self, doc: &mut Document, element: ArenaNodeId) -> bool {
        let skipper = self
            .skippers
            .iter()
            .find(|(selector, _)| selector.matches(ElementRef::new(doc.dom(), element)))
            .map(|(_, skipper)| *skipper);
        match skipper {
            Some(skipper) => self.provide_with(doc, element, skipper),
            None => false,
        }
    }

    /// Skip links for every skipper in configuration order, each over its
    /// matching elements in document order.
    pub fn provide_all(&self, doc: &mut Document) -> Result<usize> {
        let mut added = 0;
        for (selector, _) in &self.skippers {
            let elements = doc.dom().find_selector(selector).list_results();
            for element in elements {
                if is_valid_element(doc.dom(), element) && self.provide(doc, element) {
                    added += 1;
                }
            }
        }
        tracing::info!(links = added, "built skip links");
        Ok(added)
    }

    fn provide_with(&self, doc: &mut Document, element: ArenaNodeId, skipper: &Skipper) -> bool {
        let Some(anchor) = generate_anchor_for(doc, element, DATA_ANCHOR_FOR, CLASS_SKIPPER_ANCHOR)
        else {
            return false;
        };
        let Some(list) = skipper_list(doc.dom_mut()) else {
            tracing::debug!("document has no body, skip link not listed");
            return false;
        };

        let href = anchor_href(doc, anchor);
        let dom = doc.dom_mut();
        let item = dom.create_element("li");
        let link = dom.create_element("a");
        dom.set_attr(link, "href", &href);
        dom.append_text(link, &skipper.description);
        dom.append(item, link);
        dom.append(list, item);

        if let Some(key) = skipper.first_shortcut() {
            assign_shortcut(dom, link, key);
        }
        doc.ensure_id(link);
        true
    }
}

/// The skip link list, created before body's first element on first use.
fn skipper_list(dom: &mut ArenaDom) -> Option<ArenaNodeId> {
    let container = match dom.get_by_id(ID_CONTAINER_SKIPPERS) {
        Some(container) => container,
        None => {
            let body = dom.body()?;
            let container = dom.create_element("div");
            dom.set_attr(container, "id", ID_CONTAINER_SKIPPERS);
            let first = dom.element_children(body).next();
            match first {
                Some(first) => dom.insert_before(first, container),
                None => dom.append(body, container),
            }
            container
        }
    };

    let existing = dom.element_children(container).find(|&c| dom.tag_name(c) == Some("ul"));
    Some(match existing {
        Some(list) => list,
        None => {
            let list = dom.create_element("ul");
            dom.append(container, list);
            list
        }
    })
}
