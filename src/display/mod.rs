//! Making element state audible: ARIA states, roles, titles, languages,
//! table headers, shortcuts and link behaviour become sentinel text.

mod image;
mod shortcuts;
mod table;

pub use image::{
    DATA_ATTRIBUTE_TITLE_OF, display_all_alternative_text_images, display_alternative_text_image,
};
pub use shortcuts::{ShortcutList, description};

use crate::config::Configure;
use crate::dom::ArenaNodeId;
use crate::engine::{Document, Templates, is_valid_element, shortcut_prefix};
use crate::error::Result;

use table::{Rule, STATE_RULES};

/// Parameter holding the modifier keys shown when the browser is unknown.
pub const PARAMETER_SHORTCUT_DEFAULT: &str = "attribute-accesskey-default";

/// Writes sentinels for every recognized attribute of an element.
pub struct StateAnnotator<'c> {
    config: &'c Configure,
    shortcut_prefix: String,
}

impl<'c> StateAnnotator<'c> {
    pub fn new(config: &'c Configure) -> Self {
        Self {
            config,
            shortcut_prefix: config.parameter(PARAMETER_SHORTCUT_DEFAULT).to_string(),
        }
    }

    /// Describe shortcuts with the modifier keys of this browser.
    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.shortcut_prefix =
            shortcut_prefix(Some(user_agent), self.config.parameter(PARAMETER_SHORTCUT_DEFAULT));
        self
    }

    pub fn config(&self) -> &'c Configure {
        self.config
    }

    pub fn shortcut_prefix(&self) -> &str {
        &self.shortcut_prefix
    }

    /// Annotate one element. Unrecognized values and unconfigured templates
    /// produce nothing. Returns the number of sentinels written.
    pub fn annotate(&self, doc: &mut Document, node: ArenaNodeId) -> usize {
        if doc.dom().get_attr(node, "aria-hidden") == Some("true") {
            return 0;
        }

        let mut written = 0;
        for state in STATE_RULES {
            if !state.applies_to(doc.dom(), node) {
                continue;
            }
            let Some(value) = doc.dom().get_attr(node, state.attribute) else {
                continue;
            };
            let value = value.to_string();

            written += match &state.rule {
                Rule::Enumerated(values) => match values.iter().find(|(v, _)| *v == value) {
                    Some((_, stem)) => self.force_read_pair(doc, node, stem, state.link),
                    None => 0,
                },
                Rule::Present(stem) => self.force_read_pair(doc, node, stem, state.link),
                Rule::Valued(stem) => {
                    let templates = Templates::from_config(self.config, stem);
                    doc.force_read_templated(node, &value, &templates, state.link)
                }
                Rule::Derived(stem, derive) => match derive(self, doc.dom(), node, &value) {
                    Some(text) => {
                        let templates = Templates::from_config(self.config, stem);
                        doc.force_read_templated(node, &text, &templates, state.link)
                    }
                    None => 0,
                },
            };
        }
        written
    }

    /// Annotate every valid element carrying a recognized attribute, in
    /// document order. Returns the number of elements visited.
    pub fn annotate_all(&self, doc: &mut Document) -> Result<usize> {
        let nodes = doc.dom().find(&table::state_selector())?.list_results();

        let mut visited = 0;
        let mut written = 0;
        for node in nodes {
            if is_valid_element(doc.dom(), node) {
                written += self.annotate(doc, node);
                visited += 1;
            }
        }
        tracing::info!(elements = visited, sentinels = written, "annotated element states");
        Ok(visited)
    }

    fn force_read_pair(&self, doc: &mut Document, node: ArenaNodeId, stem: &str, link: &str) -> usize {
        let before = self.config.parameter(&format!("{stem}-before"));
        let after = self.config.parameter(&format!("{stem}-after"));
        doc.force_read(node, before, after, link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    fn config() -> Configure {
        let mut config = Configure::default();
        for (name, value) in [
            ("attribute-accesskey-default", "ALT"),
            ("aria-checked-true-after", "<Checked>"),
            ("aria-checked-false-after", "<Unchecked>"),
            ("aria-busy-true-before", "<Busy>"),
            ("aria-level-prefix-after", "<Level "),
            ("aria-level-suffix-after", ">"),
            ("aria-autocomplete-inline-after", "<Inline>"),
            ("aria-autocomplete-list-after", "<List>"),
            ("role-navigation", "Navigation"),
            ("attribute-role-prefix-before", "<"),
            ("attribute-role-suffix-before", ">"),
            ("attribute-headers-prefix-before", "<Headers: "),
            ("attribute-headers-suffix-before", ">"),
            ("attribute-accesskey-prefix-after", "<Shortcut: "),
            ("attribute-accesskey-suffix-after", ">"),
            ("attribute-title-prefix-after", "<Title: "),
            ("attribute-title-suffix-after", ">"),
            ("language-pt", "Portuguese"),
            ("attribute-language-prefix-before", "<Language: "),
            ("attribute-language-suffix-before", ">"),
            ("attribute-download-after", "<Download>"),
            ("attribute-target-blank-after", "<New window>"),
        ] {
            config.set_parameter(name, value);
        }
        config
    }

    fn sentinel_texts(doc: &Document, link: &str) -> Vec<String> {
        doc.dom()
            .find(&format!("[{link}]"))
            .unwrap()
            .list_results()
            .into_iter()
            .map(|n| doc.dom().text_content(n))
            .collect()
    }

    #[test]
    fn test_enumerated_values() {
        let config = config();
        let annotator = StateAnnotator::new(&config);
        let mut doc = Document::with_config(
            parse_html("<div role='checkbox' aria-checked='true'>Agree</div><div aria-checked='maybe'>?</div>"),
            &config,
        );
        assert_eq!(annotator.annotate_all(&mut doc).unwrap(), 2);
        assert_eq!(sentinel_texts(&doc, "data-ariacheckedof"), vec!["<Checked>"]);
        // No template for "checkbox": role stays unannotated.
        assert!(sentinel_texts(&doc, "data-roleof").is_empty());
    }

    #[test]
    fn test_state_change_replaces_sentinel() {
        let config = config();
        let annotator = StateAnnotator::new(&config);
        let mut doc = Document::with_config(parse_html("<p aria-checked='true'>x</p>"), &config);
        let p = doc.dom().find_by_tag("p").unwrap();

        annotator.annotate(&mut doc, p);
        doc.dom_mut().set_attr(p, "aria-checked", "false");
        annotator.annotate(&mut doc, p);
        assert_eq!(sentinel_texts(&doc, "data-ariacheckedof"), vec!["<Unchecked>"]);
    }

    #[test]
    fn test_valued_and_role() {
        let config = config();
        let annotator = StateAnnotator::new(&config);
        let mut doc = Document::with_config(
            parse_html("<nav role='navigation' aria-level='2'>menu</nav>"),
            &config,
        );
        annotator.annotate_all(&mut doc).unwrap();
        assert_eq!(sentinel_texts(&doc, "data-arialevelof"), vec!["<Level 2>"]);
        assert_eq!(sentinel_texts(&doc, "data-roleof"), vec!["<Navigation>"]);
    }

    #[test]
    fn test_autocomplete_values_map_to_their_own_templates() {
        let config = config();
        let annotator = StateAnnotator::new(&config);
        let mut doc = Document::with_config(
            parse_html("<p aria-autocomplete='inline'>a</p><p aria-autocomplete='list'>b</p>"),
            &config,
        );
        annotator.annotate_all(&mut doc).unwrap();
        assert_eq!(
            sentinel_texts(&doc, "data-ariaautocompleteof"),
            vec!["<Inline>", "<List>"]
        );
    }

    #[test]
    fn test_headers_text_in_attribute_order() {
        let config = config();
        let annotator = StateAnnotator::new(&config);
        let mut doc = Document::with_config(
            parse_html(
                "<table><tr><th id='h2'>Age</th><th id='h1'> Name </th></tr>\
                 <tr><td id='cell' headers='h1 h2 missing'>42</td></tr></table>",
            ),
            &config,
        );
        annotator.annotate_all(&mut doc).unwrap();
        assert_eq!(sentinel_texts(&doc, "data-headersof"), vec!["<Headers: Name Age>"]);

        let cell = doc.dom().get_by_id("cell").unwrap();
        let first = doc.dom().children(cell).next().unwrap();
        assert!(doc.dom().has_class(first, "force-read-before"));
    }

    #[test]
    fn test_accesskey_uses_agent_prefix() {
        let config = config();
        let annotator = StateAnnotator::new(&config).with_user_agent("Opera/9.80 (X11; Linux)");
        let mut doc = Document::with_config(parse_html("<a href='#' accesskey='s'>Search</a>"), &config);
        annotator.annotate_all(&mut doc).unwrap();
        assert_eq!(
            sentinel_texts(&doc, "data-accesskeyof"),
            vec!["<Shortcut: SHIFT + ESC + S>"]
        );
    }

    #[test]
    fn test_title_language_and_link_attributes() {
        let config = config();
        let annotator = StateAnnotator::new(&config);
        let mut doc = Document::with_config(
            parse_html(
                "<abbr title='HyperText'>HTML</abbr><img title='Logo' alt='Logo'>\
                 <span lang='pt-BR'>Olá</span>\
                 <a href='f.zip' download>file</a><a href='/' target='_blank'>home</a>",
            ),
            &config,
        );
        annotator.annotate_all(&mut doc).unwrap();
        assert_eq!(sentinel_texts(&doc, "data-titleof"), vec!["<Title: HyperText>"]);
        assert_eq!(sentinel_texts(&doc, "data-languageof"), vec!["<Language: Portuguese>"]);
        assert_eq!(sentinel_texts(&doc, "data-downloadof"), vec!["<Download>"]);
        assert_eq!(sentinel_texts(&doc, "data-targetof"), vec!["<New window>"]);
    }

    #[test]
    fn test_long_description_links_keep_their_own_window_notice() {
        let config = config();
        let annotator = StateAnnotator::new(&config);
        let mut doc = Document::with_config(
            parse_html(
                "<a href='d.html' target='_blank' data-longdescriptionfor='chart'>\
                 Description (opens in a new window)</a>",
            ),
            &config,
        );
        annotator.annotate_all(&mut doc).unwrap();
        assert!(sentinel_texts(&doc, "data-targetof").is_empty());
    }

    #[test]
    fn test_hidden_and_ignored_elements_are_skipped() {
        let config = config();
        let annotator = StateAnnotator::new(&config);
        let mut doc = Document::with_config(
            parse_html(
                "<p aria-hidden='true' aria-busy='true'>a</p>\
                 <div data-ignoreaccessibilityfix><p aria-busy='true'>b</p></div>",
            ),
            &config,
        );
        annotator.annotate_all(&mut doc).unwrap();
        assert!(sentinel_texts(&doc, "data-ariabusyof").is_empty());
    }

    #[test]
    fn test_annotate_twice_is_stable() {
        let config = config();
        let annotator = StateAnnotator::new(&config);
        let mut doc = Document::with_config(
            parse_html("<ul><li aria-busy='true' aria-checked='true' role='navigation'>x</li></ul>"),
            &config,
        );
        annotator.annotate_all(&mut doc).unwrap();
        let once = doc.dom().to_html();
        annotator.annotate_all(&mut doc).unwrap();
        assert_eq!(doc.dom().to_html(), once);
    }
}
