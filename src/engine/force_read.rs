//! Sentinel text around annotated elements.
//!
//! A sentinel is `<span class="force-read-before" data-…of="<id>">text</span>`
//! (or `force-read-after`). The link attribute names the kind of annotation
//! and its value is the annotated element's id, so a later run finds and
//! replaces the sentinel instead of adding a second one.

use crate::config::Configure;
use crate::dom::{ArenaDom, ArenaNodeId};

use super::Document;
use super::insert::Position;

pub const CLASS_FORCE_READ_BEFORE: &str = "force-read-before";
pub const CLASS_FORCE_READ_AFTER: &str = "force-read-after";

impl Position {
    /// Sentinel class for this side.
    pub fn sentinel_class(self) -> &'static str {
        match self {
            Position::Before => CLASS_FORCE_READ_BEFORE,
            Position::After => CLASS_FORCE_READ_AFTER,
        }
    }
}

/// True for spans written by [`Document::force_read`].
pub fn is_sentinel(dom: &ArenaDom, node: ArenaNodeId) -> bool {
    dom.tag_name(node) == Some("span")
        && (dom.has_class(node, CLASS_FORCE_READ_BEFORE) || dom.has_class(node, CLASS_FORCE_READ_AFTER))
}

/// Prefix and suffix text for both sides of a value annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Templates {
    pub prefix_before: String,
    pub suffix_before: String,
    pub prefix_after: String,
    pub suffix_after: String,
}

impl Templates {
    /// Read `<stem>-prefix-before`, `<stem>-suffix-before`,
    /// `<stem>-prefix-after` and `<stem>-suffix-after`.
    pub fn from_config(config: &Configure, stem: &str) -> Self {
        Self {
            prefix_before: config.parameter(&format!("{stem}-prefix-before")).to_string(),
            suffix_before: config.parameter(&format!("{stem}-suffix-before")).to_string(),
            prefix_after: config.parameter(&format!("{stem}-prefix-after")).to_string(),
            suffix_after: config.parameter(&format!("{stem}-suffix-after")).to_string(),
        }
    }

    /// Before and after texts for `value`. A side whose prefix and suffix
    /// are both empty renders as an empty string.
    pub fn render(&self, value: &str) -> (String, String) {
        (
            wrap(&self.prefix_before, value, &self.suffix_before),
            wrap(&self.prefix_after, value, &self.suffix_after),
        )
    }
}

fn wrap(prefix: &str, value: &str, suffix: &str) -> String {
    if prefix.is_empty() && suffix.is_empty() {
        String::new()
    } else {
        format!("{prefix}{value}{suffix}")
    }
}

impl Document {
    /// Write `before` and `after` sentinels for `target`, replacing any
    /// earlier sentinels with the same link attribute. Empty text skips that
    /// side. Returns the number of sentinels attached.
    pub fn force_read(&mut self, target: ArenaNodeId, before: &str, after: &str, link: &str) -> usize {
        if before.is_empty() && after.is_empty() {
            return 0;
        }
        let id = self.ensure_id(target);

        let mut written = 0;
        for (position, text) in [(Position::Before, before), (Position::After, after)] {
            if text.is_empty() {
                continue;
            }
            self.remove_sentinels(link, &id, position);

            let span = self.dom.create_element("span");
            self.dom.set_attr(span, "class", position.sentinel_class());
            self.dom.set_attr(span, link, &id);
            self.dom.append_text(span, text);
            written += self.place(target, span, position);
        }
        written
    }

    /// [`Document::force_read`] with texts composed from `templates`.
    pub fn force_read_templated(
        &mut self,
        target: ArenaNodeId,
        value: &str,
        templates: &Templates,
        link: &str,
    ) -> usize {
        let (before, after) = templates.render(value);
        self.force_read(target, &before, &after, link)
    }

    /// Detach every sentinel of one side linked to `id` through `link`,
    /// including copies fanned out to several labels.
    fn remove_sentinels(&mut self, link: &str, id: &str, position: Position) {
        let class = position.sentinel_class();
        let stale: Vec<_> = self
            .dom
            .elements_with_attr(link, id)
            .filter(|&node| self.dom.has_class(node, class))
            .collect();
        for node in stale {
            self.dom.detach(node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    fn document(html: &str) -> Document {
        Document::new(parse_html(html), "id-")
    }

    fn sentinels(doc: &Document, link: &str) -> Vec<(String, String)> {
        doc.dom()
            .find(&format!("[{link}]"))
            .unwrap()
            .list_results()
            .into_iter()
            .map(|n| {
                (
                    doc.dom().get_attr(n, "class").unwrap_or("").to_string(),
                    doc.dom().text_content(n),
                )
            })
            .collect()
    }

    #[test]
    fn test_writes_both_sides() {
        let mut doc = document("<p id='p'>text</p>");
        let p = doc.dom().get_by_id("p").unwrap();
        assert_eq!(doc.force_read(p, "<start>", "<end>", "data-testof"), 2);
        assert_eq!(
            sentinels(&doc, "data-testof"),
            vec![
                ("force-read-before".to_string(), "<start>".to_string()),
                ("force-read-after".to_string(), "<end>".to_string()),
            ]
        );
        let span = doc.dom().find("[data-testof]").unwrap().first_result().unwrap();
        assert_eq!(doc.dom().get_attr(span, "data-testof"), Some("p"));
    }

    #[test]
    fn test_rewrite_replaces_instead_of_accumulating() {
        let mut doc = document("<p id='p'>text</p>");
        let p = doc.dom().get_by_id("p").unwrap();
        doc.force_read(p, "", "<Checked>", "data-ariacheckedof");
        doc.force_read(p, "", "<Unchecked>", "data-ariacheckedof");
        assert_eq!(
            sentinels(&doc, "data-ariacheckedof"),
            vec![("force-read-after".to_string(), "<Unchecked>".to_string())]
        );
    }

    #[test]
    fn test_empty_text_writes_nothing_and_allocates_no_id() {
        let mut doc = document("<p>text</p>");
        let p = doc.dom().find_by_tag("p").unwrap();
        assert_eq!(doc.force_read(p, "", "", "data-testof"), 0);
        assert_eq!(doc.dom().element_id(p), None);
    }

    #[test]
    fn test_fan_out_copies_are_all_replaced() {
        let mut doc = document(
            "<label for='f'>One</label><label for='f'>Two</label><input id='f' aria-required='true'>",
        );
        let input = doc.dom().get_by_id("f").unwrap();
        assert_eq!(doc.force_read(input, "", "<Required>", "data-ariarequiredof"), 2);
        assert_eq!(doc.force_read(input, "", "<Required>", "data-ariarequiredof"), 2);
        assert_eq!(sentinels(&doc, "data-ariarequiredof").len(), 2);
    }

    #[test]
    fn test_templates_skip_unconfigured_side() {
        let templates = Templates {
            prefix_before: String::new(),
            suffix_before: String::new(),
            prefix_after: "<Level ".to_string(),
            suffix_after: ">".to_string(),
        };
        assert_eq!(templates.render("2"), (String::new(), "<Level 2>".to_string()));
    }

    #[test]
    fn test_templates_from_config() {
        let mut config = Configure::default();
        config.set_parameter("aria-level-prefix-after", "<Level ");
        config.set_parameter("aria-level-suffix-after", ">");
        let templates = Templates::from_config(&config, "aria-level");
        assert_eq!(templates.prefix_after, "<Level ");
        assert!(templates.prefix_before.is_empty());
    }
}
