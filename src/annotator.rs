//! One-stop annotation of a whole document.

use std::fmt;
use std::str::FromStr;

use crate::config::Configure;
use crate::display::{self, ShortcutList, StateAnnotator};
use crate::dom::{ArenaDom, ArenaNodeId, parse_html};
use crate::engine::Document;
use crate::error::{Error, Result};
use crate::form;
use crate::navigation::{HeadingOutline, LongDescriptionLinker, SkipperBuilder};

/// A group of annotations that can be run on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Forms,
    Headings,
    Skippers,
    LongDescriptions,
    Shortcuts,
    Images,
    States,
}

impl Feature {
    /// Every feature, in the order [`Annotator::run`] applies them.
    pub const ALL: [Feature; 7] = [
        Feature::Forms,
        Feature::Headings,
        Feature::Skippers,
        Feature::LongDescriptions,
        Feature::Shortcuts,
        Feature::Images,
        Feature::States,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Feature::Forms => "forms",
            Feature::Headings => "headings",
            Feature::Skippers => "skippers",
            Feature::LongDescriptions => "longdesc",
            Feature::Shortcuts => "shortcuts",
            Feature::Images => "images",
            Feature::States => "states",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "forms" | "form" => Ok(Feature::Forms),
            "headings" | "heading" | "outline" => Ok(Feature::Headings),
            "skippers" | "skipper" => Ok(Feature::Skippers),
            "longdesc" | "long-descriptions" => Ok(Feature::LongDescriptions),
            "shortcuts" | "shortcut" => Ok(Feature::Shortcuts),
            "images" | "image" => Ok(Feature::Images),
            "states" | "state" => Ok(Feature::States),
            _ => Err(Error::Config(format!("unknown feature: {s}"))),
        }
    }
}

/// What one [`Annotator::run`] did, per feature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct Report {
    pub form_fields: usize,
    pub headings: usize,
    /// `None` when headings were not run.
    pub heading_outline_valid: Option<bool>,
    pub skippers: usize,
    pub long_descriptions: usize,
    pub shortcuts: usize,
    pub images: usize,
    pub states: usize,
}

/// A document together with every annotation driver, sharing one
/// configuration and one identifier allocator.
///
/// ```
/// use hatch::{Annotator, Configure};
///
/// let config = Configure::english().unwrap();
/// let mut annotator = Annotator::from_html(
///     "<main><h1>Title</h1><input type='checkbox' aria-checked='true'></main>",
///     &config,
/// )
/// .unwrap();
/// annotator.run_all().unwrap();
/// assert!(annotator.to_html().contains("container-skippers"));
/// ```
pub struct Annotator<'c> {
    config: &'c Configure,
    doc: Document,
    states: StateAnnotator<'c>,
    shortcuts: ShortcutList<'c>,
    headings: HeadingOutline<'c>,
    skippers: SkipperBuilder<'c>,
    long_descriptions: LongDescriptionLinker,
}

impl<'c> Annotator<'c> {
    /// Fails when a configured skipper selector does not parse.
    pub fn new(dom: ArenaDom, config: &'c Configure) -> Result<Self> {
        Ok(Self {
            config,
            doc: Document::with_config(dom, config),
            states: StateAnnotator::new(config),
            shortcuts: ShortcutList::new(config),
            headings: HeadingOutline::new(config),
            skippers: SkipperBuilder::new(config)?,
            long_descriptions: LongDescriptionLinker::new(config),
        })
    }

    pub fn from_html(html: &str, config: &'c Configure) -> Result<Self> {
        Self::new(parse_html(html), config)
    }

    /// Describe shortcuts with the modifier keys of this browser.
    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.states = StateAnnotator::new(self.config).with_user_agent(user_agent);
        self.shortcuts = ShortcutList::new(self.config).with_user_agent(user_agent);
        self
    }

    pub fn config(&self) -> &'c Configure {
        self.config
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn dom(&self) -> &ArenaDom {
        self.doc.dom()
    }

    pub fn into_dom(self) -> ArenaDom {
        self.doc.into_dom()
    }

    pub fn to_html(&self) -> String {
        self.doc.dom().to_html()
    }

    pub fn annotate_state(&mut self, node: ArenaNodeId) -> usize {
        self.states.annotate(&mut self.doc, node)
    }

    pub fn annotate_all_states(&mut self) -> Result<usize> {
        self.states.annotate_all(&mut self.doc)
    }

    pub fn provide_heading(&mut self, heading: ArenaNodeId) -> Result<bool> {
        self.headings.provide(&mut self.doc, heading)
    }

    pub fn build_heading_outline(&mut self) -> Result<usize> {
        self.headings.provide_all(&mut self.doc)
    }

    pub fn provide_skipper(&mut self, element: ArenaNodeId) -> bool {
        self.skippers.provide(&mut self.doc, element)
    }

    pub fn build_all_skippers(&mut self) -> Result<usize> {
        self.skippers.provide_all(&mut self.doc)
    }

    pub fn link_long_description(&mut self, image: ArenaNodeId) -> usize {
        self.long_descriptions.link(&mut self.doc, image)
    }

    pub fn link_all_long_descriptions(&mut self) -> Result<usize> {
        self.long_descriptions.link_all(&mut self.doc)
    }

    pub fn display_shortcut(&mut self, node: ArenaNodeId) -> usize {
        self.shortcuts.display(&mut self.doc, node)
    }

    pub fn display_all_shortcuts(&mut self) -> Result<usize> {
        self.shortcuts.display_all(&mut self.doc)
    }

    pub fn display_alternative_text_image(&mut self, image: ArenaNodeId) {
        display::display_alternative_text_image(&mut self.doc, image)
    }

    pub fn display_all_alternative_text_images(&mut self) -> Result<usize> {
        display::display_all_alternative_text_images(&mut self.doc)
    }

    /// Required, range and autocomplete markers. Returns the number of
    /// fields visited, summed over the three passes.
    pub fn mark_all_fields(&mut self) -> Result<usize> {
        let dom = self.doc.dom_mut();
        Ok(form::mark_all_required_fields(dom)?
            + form::mark_all_range_fields(dom)?
            + form::mark_all_autocomplete_fields(dom)?)
    }

    /// Run the given features in their fixed order, whatever the order of
    /// `features`. Running the same features again changes nothing.
    pub fn run(&mut self, features: &[Feature]) -> Result<Report> {
        let mut report = Report::default();
        for feature in Feature::ALL {
            if !features.contains(&feature) {
                continue;
            }
            tracing::debug!(%feature, "running feature");
            match feature {
                Feature::Forms => report.form_fields = self.mark_all_fields()?,
                Feature::Headings => {
                    report.headings = self.build_heading_outline()?;
                    report.heading_outline_valid = Some(self.headings.is_valid(self.doc.dom())?);
                }
                Feature::Skippers => report.skippers = self.build_all_skippers()?,
                Feature::LongDescriptions => {
                    report.long_descriptions = self.link_all_long_descriptions()?
                }
                Feature::Shortcuts => report.shortcuts = self.display_all_shortcuts()?,
                Feature::Images => report.images = self.display_all_alternative_text_images()?,
                Feature::States => report.states = self.annotate_all_states()?,
            }
        }
        Ok(report)
    }

    pub fn run_all(&mut self) -> Result<Report> {
        self.run(&Feature::ALL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_names() {
        for feature in Feature::ALL {
            assert_eq!(feature.name().parse::<Feature>().unwrap(), feature);
        }
        assert_eq!(" Long-Descriptions ".parse::<Feature>().unwrap(), Feature::LongDescriptions);
        assert!(matches!("colors".parse::<Feature>(), Err(Error::Config(_))));
    }

    #[test]
    fn test_run_only_selected_features() {
        let config = Configure::english().unwrap();
        let mut annotator =
            Annotator::from_html("<main><h1>A</h1><img alt='x'></main>", &config).unwrap();
        let report = annotator.run(&[Feature::Images]).unwrap();

        assert_eq!(report.images, 1);
        assert_eq!(report.heading_outline_valid, None);
        assert!(annotator.dom().get_by_id("container-heading").is_none());
        assert!(annotator.dom().get_by_id("container-skippers").is_none());
    }

    #[test]
    fn test_run_all_twice_is_stable() {
        let config = Configure::english().unwrap();
        let mut annotator = Annotator::from_html(
            "<header><a href='/' accesskey='1'>Home</a></header>\
             <main><h1>Title</h1><h2>Part</h2>\
             <input type='checkbox' aria-checked='true' required></main>\
             <footer>f</footer>",
            &config,
        )
        .unwrap();
        let report = annotator.run_all().unwrap();
        assert_eq!(report.heading_outline_valid, Some(true));
        assert_eq!(report.headings, 2);

        let once = annotator.to_html();
        annotator.run_all().unwrap();
        assert_eq!(annotator.to_html(), once);
    }
}
