//! Heading outline: a nested `ol` of links mirroring the h1–h6 hierarchy.

use crate::config::Configure;
use crate::dom::{ArenaDom, ArenaNodeId};
use crate::engine::{Document, is_valid_element, visible_text};
use crate::error::Result;

use super::{anchor_href, generate_anchor_for};

pub const ID_CONTAINER_HEADING: &str = "container-heading";
pub const ID_TEXT_HEADING: &str = "text-heading";
pub const DATA_HEADING_ANCHOR_FOR: &str = "data-headinganchorfor";
pub const DATA_HEADING_LEVEL: &str = "data-headinglevel";
pub const CLASS_HEADING_ANCHOR: &str = "heading-anchor";

const HEADING_SELECTOR: &str = "h1,h2,h3,h4,h5,h6";

/// Level of an `h1`–`h6` element.
pub fn heading_level(dom: &ArenaDom, node: ArenaNodeId) -> Option<u8> {
    match dom.tag_name(node)? {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// A heading sequence is valid when it starts at level 1, holds a single
/// level-1 heading, and never goes more than one level deeper than the
/// heading before it.
pub fn is_valid_heading_sequence(levels: impl IntoIterator<Item = u8>) -> bool {
    let mut last = 0;
    let mut seen_main = false;
    for level in levels {
        if level == 1 {
            if seen_main {
                return false;
            }
            seen_main = true;
        }
        if level > last + 1 {
            return false;
        }
        last = level;
    }
    true
}

/// Builds `div#container-heading > span#text-heading + ol` at the end of
/// body. Disabled entirely when the document's headings are not properly
/// nested.
pub struct HeadingOutline<'c> {
    config: &'c Configure,
    valid: Option<bool>,
}

impl<'c> HeadingOutline<'c> {
    pub fn new(config: &'c Configure) -> Self {
        Self {
            config,
            valid: None,
        }
    }

    /// Heading structure check, computed on first use.
    pub fn is_valid(&mut self, dom: &ArenaDom) -> Result<bool> {
        if let Some(valid) = self.valid {
            return Ok(valid);
        }
        let levels: Vec<u8> = dom
            .find(HEADING_SELECTOR)?
            .list_results()
            .into_iter()
            .filter(|&node| is_valid_element(dom, node))
            .filter_map(|node| heading_level(dom, node))
            .collect();
        let valid = is_valid_heading_sequence(levels.iter().copied());
        if !valid {
            tracing::warn!(?levels, "heading levels are not properly nested, outline disabled");
        }
        self.valid = Some(valid);
        Ok(valid)
    }

    /// Add one heading to the outline. Returns false when the outline is
    /// disabled, the heading is already listed, or it has no parent entry.
    pub fn provide(&mut self, doc: &mut Document, heading: ArenaNodeId) -> Result<bool> {
        if !self.is_valid(doc.dom())? {
            return Ok(false);
        }
        let Some(level) = heading_level(doc.dom(), heading) else {
            return Ok(false);
        };
        let parent = if level == 1 {
            if doc.dom().body().is_none() {
                tracing::debug!("document has no body, heading outline not built");
                return Ok(false);
            }
            None
        } else {
            let Some(item) = parent_entry(doc.dom(), level - 1)? else {
                tracing::debug!(level, "heading has no parent entry, left out of outline");
                return Ok(false);
            };
            Some(item)
        };
        // Nothing is added to the outline until the heading has its own anchor.
        let Some(anchor) =
            generate_anchor_for(doc, heading, DATA_HEADING_ANCHOR_FOR, CLASS_HEADING_ANCHOR)
        else {
            return Ok(false);
        };
        let list = match parent {
            Some(item) => child_list(doc.dom_mut(), item),
            None => {
                let Some(list) = self.root_list(doc.dom_mut()) else {
                    return Ok(false);
                };
                list
            }
        };

        let href = anchor_href(doc, anchor);
        let text = visible_text(doc.dom(), heading);
        let dom = doc.dom_mut();
        let item = dom.create_element("li");
        dom.set_attr(item, DATA_HEADING_LEVEL, &level.to_string());
        let link = dom.create_element("a");
        dom.set_attr(link, "href", &href);
        dom.append_text(link, text.trim());
        dom.append(item, link);
        dom.append(list, item);
        Ok(true)
    }

    /// Outline every valid heading in document order.
    pub fn provide_all(&mut self, doc: &mut Document) -> Result<usize> {
        let headings = doc.dom().find(HEADING_SELECTOR)?.list_results();
        let mut added = 0;
        for heading in headings {
            if is_valid_element(doc.dom(), heading) && self.provide(doc, heading)? {
                added += 1;
            }
        }
        tracing::info!(entries = added, "built heading outline");
        Ok(added)
    }

    fn root_list(&self, dom: &mut ArenaDom) -> Option<ArenaNodeId> {
        let container = match dom.get_by_id(ID_CONTAINER_HEADING) {
            Some(container) => container,
            None => {
                let body = dom.body()?;
                let container = dom.create_element("div");
                dom.set_attr(container, "id", ID_CONTAINER_HEADING);
                let text = dom.create_element("span");
                dom.set_attr(text, "id", ID_TEXT_HEADING);
                dom.append_text(text, self.config.parameter("elements-heading-before"));
                dom.append(container, text);
                dom.append(body, container);
                container
            }
        };
        Some(child_list(dom, container))
    }
}

/// The last outline entry of `parent_level`.
fn parent_entry(dom: &ArenaDom, parent_level: u8) -> Result<Option<ArenaNodeId>> {
    let Some(container) = dom.get_by_id(ID_CONTAINER_HEADING) else {
        return Ok(None);
    };
    Ok(dom
        .query(container)
        .find_descendants(&format!("[{DATA_HEADING_LEVEL}=\"{parent_level}\"]"))?
        .last_result())
}

/// The `ol` under `parent`, created on demand.
fn child_list(dom: &mut ArenaDom, parent: ArenaNodeId) -> ArenaNodeId {
    let existing = dom.element_children(parent).find(|&c| dom.tag_name(c) == Some("ol"));
    if let Some(list) = existing {
        return list;
    }
    let list = dom.create_element("ol");
    dom.append(parent, list);
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    #[test]
    fn test_sequence_validity() {
        assert!(is_valid_heading_sequence([1, 2, 3, 2]));
        assert!(is_valid_heading_sequence([1, 2, 3, 3, 2, 3]));
        assert!(is_valid_heading_sequence([]));
        assert!(!is_valid_heading_sequence([1, 3]));
        assert!(!is_valid_heading_sequence([1, 2, 1, 2, 1]));
        assert!(!is_valid_heading_sequence([2, 3]));
    }

    fn config() -> Configure {
        let mut config = Configure::default();
        config.set_parameter("elements-heading-before", "Headings");
        config.set_parameter("prefix-generated-ids", "h-");
        config
    }

    #[test]
    fn test_nested_outline() {
        let config = config();
        let mut outline = HeadingOutline::new(&config);
        let mut doc = Document::with_config(
            parse_html("<h1>Title</h1><h2>A</h2><h3>A.1</h3><h2>B</h2>"),
            &config,
        );
        assert_eq!(outline.provide_all(&mut doc).unwrap(), 4);

        let dom = doc.dom();
        let root = dom.find("#container-heading > ol").unwrap().list_results();
        assert_eq!(root.len(), 1);
        let top = dom.query(root[0]).find_children("li").unwrap().list_results();
        assert_eq!(top.len(), 1);
        let second = dom.find("li[data-headinglevel=\"2\"]").unwrap().list_results();
        assert_eq!(second.len(), 2);
        assert_eq!(dom.query(second[0]).find_descendants("li").unwrap().len(), 1);

        let h3 = dom.find_by_tag("h3").unwrap();
        let anchor = dom
            .elements_with_attr(DATA_HEADING_ANCHOR_FOR, dom.element_id(h3).unwrap())
            .next()
            .unwrap();
        let name = dom.get_attr(anchor, "name").unwrap();
        let link = dom.find("li[data-headinglevel=\"3\"] > a").unwrap().first_result().unwrap();
        assert_eq!(dom.get_attr(link, "href"), Some(format!("#{name}").as_str()));
        assert_eq!(dom.text_content(link), "A.1");
        assert_eq!(dom.text_content(dom.get_by_id(ID_TEXT_HEADING).unwrap()), "Headings");
    }

    #[test]
    fn test_invalid_structure_disables_outline() {
        let config = config();
        let mut outline = HeadingOutline::new(&config);
        let mut doc = Document::with_config(parse_html("<h1>a</h1><h3>b</h3>"), &config);
        assert_eq!(outline.provide_all(&mut doc).unwrap(), 0);
        assert!(doc.dom().get_by_id(ID_CONTAINER_HEADING).is_none());
        assert!(doc.dom().find("a").unwrap().is_empty());
    }

    #[test]
    fn test_rebuild_adds_nothing() {
        let config = config();
        let mut doc = Document::with_config(parse_html("<h1>Title</h1><h2>Part</h2>"), &config);
        HeadingOutline::new(&config).provide_all(&mut doc).unwrap();
        let once = doc.dom().to_html();
        assert_eq!(HeadingOutline::new(&config).provide_all(&mut doc).unwrap(), 0);
        assert_eq!(doc.dom().to_html(), once);
    }

    #[test]
    fn test_rerun_on_nested_outline_is_stable() {
        let config = config();
        let source = "<h1>T</h1><h2>A</h2><h3>A.1</h3><h2>B</h2>";
        let mut outline = HeadingOutline::new(&config);
        let mut doc = Document::with_config(parse_html(source), &config);
        outline.provide_all(&mut doc).unwrap();
        let once = doc.dom().to_html();

        assert_eq!(outline.provide_all(&mut doc).unwrap(), 0);
        assert_eq!(doc.dom().to_html(), once);
        assert!(doc.dom().find("ol:empty").unwrap().is_empty());

        let mut reparsed = Document::with_config(parse_html(&once), &config);
        assert_eq!(HeadingOutline::new(&config).provide_all(&mut reparsed).unwrap(), 0);
        assert_eq!(reparsed.dom().to_html(), once);
    }

    #[test]
    fn test_orphan_heading_is_left_out() {
        let config = config();
        let mut outline = HeadingOutline::new(&config);
        let mut doc = Document::with_config(parse_html("<h1>Title</h1><h2>Part</h2>"), &config);
        let h2 = doc.dom().find_by_tag("h2").unwrap();
        assert!(!outline.provide(&mut doc, h2).unwrap());
        assert!(doc.dom().find(".heading-anchor").unwrap().is_empty());

        // Once its parent is listed the heading can still be added.
        assert_eq!(outline.provide_all(&mut doc).unwrap(), 2);
    }
}
