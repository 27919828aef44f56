//! Visible list of the page's keyboard shortcuts.

use crate::config::Configure;
use crate::dom::{ArenaDom, ArenaNodeId};
use crate::engine::{Document, is_valid_element, shortcut_prefix, visible_text};
use crate::error::Result;
use crate::util::{normalize_whitespace, tokens};

use super::PARAMETER_SHORTCUT_DEFAULT;

pub const ID_CONTAINER_SHORTCUTS: &str = "container-shortcuts";
pub const ID_TEXT_SHORTCUTS: &str = "text-shortcuts";
/// Marks a list item with the (uppercase) key it describes.
pub const DATA_SHORTCUT_OF: &str = "data-shortcutof";

/// Builds `div#container-shortcuts > ul` with one item per key.
pub struct ShortcutList<'c> {
    config: &'c Configure,
    prefix: String,
}

impl<'c> ShortcutList<'c> {
    pub fn new(config: &'c Configure) -> Self {
        Self {
            config,
            prefix: config.parameter(PARAMETER_SHORTCUT_DEFAULT).to_string(),
        }
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.prefix = shortcut_prefix(Some(user_agent), self.config.parameter(PARAMETER_SHORTCUT_DEFAULT));
        self
    }

    /// List the shortcuts of one element. A missing `title` is set to the
    /// element's description. Returns the number of list items added.
    pub fn display(&self, doc: &mut Document, node: ArenaNodeId) -> usize {
        let Some(accesskey) = doc.dom().get_attr(node, "accesskey") else {
            return 0;
        };
        let keys: Vec<String> = tokens(accesskey).map(str::to_uppercase).collect();

        let text = description(doc.dom(), node);
        if !doc.dom().has_attr(node, "title") {
            doc.dom_mut().set_attr(node, "title", &text);
        }

        let Some(list) = self.list(doc.dom_mut()) else {
            tracing::debug!("document has no body, shortcut list not built");
            return 0;
        };

        let mut added = 0;
        for key in keys {
            let dom = doc.dom_mut();
            if dom
                .element_children(list)
                .any(|item| dom.get_attr(item, DATA_SHORTCUT_OF) == Some(key.as_str()))
            {
                continue;
            }
            let item = dom.create_element("li");
            dom.set_attr(item, DATA_SHORTCUT_OF, &key);
            dom.append_text(item, &format!("{} + {}: {}", self.prefix, key, text));
            dom.append(list, item);
            added += 1;
        }
        added
    }

    /// List the shortcuts of every valid element with an `accesskey`.
    pub fn display_all(&self, doc: &mut Document) -> Result<usize> {
        let nodes = doc.dom().find("[accesskey]")?.list_results();
        let mut added = 0;
        for node in nodes {
            if is_valid_element(doc.dom(), node) {
                added += self.display(doc, node);
            }
        }
        tracing::info!(items = added, "listed shortcuts");
        Ok(added)
    }

    /// The shortcut list, created on first use. The container goes at the
    /// start of body when the "before" shortcut text is configured, else at
    /// the end.
    fn list(&self, dom: &mut ArenaDom) -> Option<ArenaNodeId> {
        let container = match dom.get_by_id(ID_CONTAINER_SHORTCUTS) {
            Some(container) => container,
            None => {
                let body = dom.body()?;
                let container = dom.create_element("div");
                dom.set_attr(container, "id", ID_CONTAINER_SHORTCUTS);
                let heading = dom.create_element("span");
                dom.set_attr(heading, "id", ID_TEXT_SHORTCUTS);
                dom.append(container, heading);

                let before = format!(
                    "{}{}",
                    self.config.parameter("attribute-accesskey-prefix-before"),
                    self.config.parameter("attribute-accesskey-suffix-before"),
                );
                if before.is_empty() {
                    let after = format!(
                        "{}{}",
                        self.config.parameter("attribute-accesskey-prefix-after"),
                        self.config.parameter("attribute-accesskey-suffix-after"),
                    );
                    dom.append_text(heading, &after);
                    dom.append(body, container);
                } else {
                    dom.append_text(heading, &before);
                    dom.prepend(body, container);
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
}

/// Human-readable name of an element: `title`, `aria-label`, `alt`,
/// `label`, the text of its `aria-labelledby` or `aria-describedby`
/// targets, a button's `value`, then its own text. Whitespace collapsed.
pub fn description(dom: &ArenaDom, node: ArenaNodeId) -> String {
    let attribute = ["title", "aria-label", "alt", "label"]
        .into_iter()
        .find_map(|name| dom.get_attr(node, name).map(str::to_string));

    let text = attribute
        .or_else(|| {
            let ids = dom
                .get_attr(node, "aria-labelledby")
                .or_else(|| dom.get_attr(node, "aria-describedby"))?;
            tokens(ids)
                .find_map(|id| dom.get_by_id(id))
                .map(|target| visible_text(dom, target))
        })
        .or_else(|| button_value(dom, node))
        .unwrap_or_else(|| visible_text(dom, node));

    normalize_whitespace(&text)
}

fn button_value(dom: &ArenaDom, node: ArenaNodeId) -> Option<String> {
    if dom.tag_name(node) != Some("input") {
        return None;
    }
    let kind = dom.get_attr(node, "type")?.to_ascii_lowercase();
    if matches!(kind.as_str(), "button" | "submit" | "reset") {
        dom.get_attr(node, "value").map(str::to_string)
    } else {
        None
    }
}
