//! Visible links to the long description of images (`longdesc`).

use crate::config::Configure;
use crate::dom::ArenaNodeId;
use crate::engine::{Document, Position, Templates, is_valid_element};
use crate::error::Result;

pub const DATA_LONG_DESCRIPTION_FOR: &str = "data-longdescriptionfor";
pub const CLASS_LONG_DESCRIPTION_LINK: &str = "longdescription-link";

/// Inserts `<a href=longdesc target=_blank>` links around images.
pub struct LongDescriptionLinker {
    templates: Templates,
}

impl LongDescriptionLinker {
    pub fn new(config: &Configure) -> Self {
        Self {
            templates: Templates::from_config(config, "attribute-longdescription"),
        }
    }

    /// Link one image. Returns the number of links inserted: zero when the
    /// image has no `longdesc`, no alternative text, or is already linked.
    pub fn link(&self, doc: &mut Document, image: ArenaNodeId) -> usize {
        let Some(longdesc) = doc.dom().get_attr(image, "longdesc").map(str::to_string) else {
            return 0;
        };
        let id = doc.ensure_id(image);
        if doc
            .dom()
            .elements_with_attr(DATA_LONG_DESCRIPTION_FOR, &id)
            .next()
            .is_some()
        {
            return 0;
        }
        let Some(alt) = doc
            .dom()
            .get_attr(image, "alt")
            .map(str::trim)
            .filter(|alt| !alt.is_empty())
            .map(str::to_string)
        else {
            tracing::debug!(id = %id, "image with longdesc has no alternative text");
            return 0;
        };

        // Links never nest: inside a hyperlink they go beside the outermost one.
        let dom = doc.dom();
        let enclosing_link = std::iter::once(image)
            .chain(dom.ancestors(image))
            .filter(|&node| dom.tag_name(node) == Some("a"))
            .last();

        let t = &self.templates;
        let sides = [
            (Position::Before, &t.prefix_before, &t.suffix_before),
            (Position::After, &t.prefix_after, &t.suffix_after),
        ];
        let mut inserted = 0;
        for (position, prefix, suffix) in sides {
            if prefix.is_empty() && suffix.is_empty() {
                continue;
            }
            let text = format!("{prefix} {alt} {suffix}");
            let dom = doc.dom_mut();
            let link = dom.create_element("a");
            dom.set_attr(link, "href", &longdesc);
            dom.set_attr(link, "target", "_blank");
            dom.set_attr(link, DATA_LONG_DESCRIPTION_FOR, &id);
            dom.set_attr(link, "class", CLASS_LONG_DESCRIPTION_LINK);
            dom.append_text(link, text.trim());
            inserted += match (enclosing_link, position) {
                (Some(outer), Position::Before) => {
                    dom.insert_before(outer, link);
                    1
                }
                (Some(outer), Position::After) => {
                    dom.insert_after(outer, link);
                    1
                }
                (None, _) => doc.place(image, link, position),
            };
        }
        inserted
    }

    /// Link every valid element with a `longdesc`.
    pub fn link_all(&self, doc: &mut Document) -> Result<usize> {
        let images = doc.dom().find("[longdesc]")?.list_results();
        let mut inserted = 0;
        for image in images {
            if is_valid_element(doc.dom(), image) {
                inserted += self.link(doc, image);
            }
        }
        tracing::info!(links = inserted, "linked long descriptions");
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    fn config() -> Configure {
        let mut config = Configure::default();
        config.set_parameter("attribute-longdescription-prefix-after", "Description of");
        config.set_parameter("attribute-longdescription-suffix-after", "(new window)");
        config
    }

    #[test]
    fn test_link_after_image() {
        let config = config();
        let linker = LongDescriptionLinker::new(&config);
        let mut doc = Document::new(
            parse_html("<p><img id='chart' alt='Sales chart' longdesc='chart.html'></p>"),
            "id-",
        );
        assert_eq!(linker.link_all(&mut doc).unwrap(), 1);

        let dom = doc.dom();
        let img = dom.get_by_id("chart").unwrap();
        let link = dom.find(".longdescription-link").unwrap().first_result().unwrap();
        assert_eq!(dom.get_attr(link, "href"), Some("chart.html"));
        assert_eq!(dom.get_attr(link, "target"), Some("_blank"));
        assert_eq!(dom.get_attr(link, DATA_LONG_DESCRIPTION_FOR), Some("chart"));
        assert_eq!(dom.text_content(link), "Description of Sales chart (new window)");
        assert_eq!(dom.get(img).unwrap().next_sibling, link);
    }

    #[test]
    fn test_already_linked_and_missing_alt() {
        let config = config();
        let linker = LongDescriptionLinker::new(&config);
        let mut doc = Document::new(
            parse_html("<img alt='A' longdesc='a.html'><img longdesc='b.html'>"),
            "id-",
        );
        assert_eq!(linker.link_all(&mut doc).unwrap(), 1);
        assert_eq!(linker.link_all(&mut doc).unwrap(), 0);
        assert_eq!(doc.dom().find("[data-longdescriptionfor]").unwrap().len(), 1);
    }

    #[test]
    fn test_both_sides_when_configured() {
        let mut config = config();
        config.set_parameter("attribute-longdescription-prefix-before", "Read about");
        let linker = LongDescriptionLinker::new(&config);
        let mut doc = Document::new(parse_html("<img alt='Map' longdesc='map.html'>"), "id-");
        assert_eq!(linker.link_all(&mut doc).unwrap(), 2);
        let texts: Vec<_> = doc
            .dom()
            .find("a")
            .unwrap()
            .list_results()
            .into_iter()
            .map(|a| doc.dom().text_content(a))
            .collect();
        assert_eq!(texts, vec!["Read about Map", "Description of Map (new window)"]);
    }

    #[test]
    fn test_link_goes_beside_an_enclosing_link() {
        let config = config();
        let linker = LongDescriptionLinker::new(&config);
        let mut doc = Document::new(
            parse_html("<p><a id='home' href='/'><img alt='Logo' longdesc='logo.html'></a></p>"),
            "id-",
        );
        assert_eq!(linker.link_all(&mut doc).unwrap(), 1);

        let dom = doc.dom();
        let home = dom.get_by_id("home").unwrap();
        let link = dom.find(".longdescription-link").unwrap().first_result().unwrap();
        assert_eq!(dom.get(home).unwrap().next_sibling, link);
        assert!(dom.find("a a").unwrap().is_empty());

        let reparsed = parse_html(&dom.to_html());
        assert_eq!(reparsed.to_html(), dom.to_html());
    }
}
