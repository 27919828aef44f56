//! Engine configuration: localized text templates and skipper definitions.
//!
//! The configuration is read once from an XML file and is immutable
//! afterwards; every driver borrows the same [`Configure`].
//!
//! ```xml
//! <configure>
//!     <parameters>
//!         <parameter name="aria-checked-true-after">&lt;Checked&gt;</parameter>
//!     </parameters>
//!     <skippers>
//!         <skipper selector="main" description="Skip to content" shortcut="1"/>
//!     </skippers>
//! </configure>
//! ```

use std::collections::HashMap;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};

const DEFAULT_CONFIGURE: &str = include_str!("../../config/hatch-configure.xml");

/// A configured "skip to" link: elements matching `selector` get an entry
/// labelled `description`, optionally bound to `shortcut`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipper {
    pub selector: String,
    pub description: String,
    /// Space-separated shortcut keys; only the first one is assigned.
    pub shortcut: String,
}

impl Skipper {
    /// First declared shortcut key, if any.
    pub fn first_shortcut(&self) -> Option<&str> {
        crate::util::tokens(&self.shortcut).next()
    }
}

/// Parameters and skippers loaded from XML.
#[derive(Debug, Clone, Default)]
pub struct Configure {
    parameters: HashMap<String, String>,
    skippers: Vec<Skipper>,
}

impl Configure {
    /// Parse a `<configure>` document.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let mut configure = Self::default();
        configure.load(xml, Root::Configure)?;
        Ok(configure)
    }

    /// Read and parse a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let xml = String::from_utf8(bytes)?;
        let configure = Self::from_xml(&xml)?;
        tracing::debug!(
            path = %path.display(),
            parameters = configure.parameters.len(),
            skippers = configure.skippers.len(),
            "loaded configuration"
        );
        Ok(configure)
    }

    /// Replace the skipper list with the one in a `<skippers>` document.
    pub fn with_skippers_xml(mut self, xml: &str) -> Result<Self> {
        let mut loaded = Self::default();
        loaded.load(xml, Root::Skippers)?;
        self.skippers = loaded.skippers;
        Ok(self)
    }

    /// Like [`Configure::with_skippers_xml`], reading the skippers from a file.
    pub fn with_skippers_path(self, path: impl AsRef<Path>) -> Result<Self> {
        let xml = String::from_utf8(std::fs::read(path)?)?;
        self.with_skippers_xml(&xml)
    }

    /// Template text for `name`, or an empty string when it is not configured.
    pub fn parameter(&self, name: &str) -> &str {
        match self.parameters.get(name) {
            Some(value) => value,
            None => {
                tracing::trace!(name, "missing configuration parameter");
                ""
            }
        }
    }

    pub fn get_parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    /// Set or replace one parameter.
    pub fn set_parameter(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parameters.insert(name.into(), value.into());
    }

    pub fn parameters(&self) -> &HashMap<String, String> {
        &self.parameters
    }

    /// Skippers in configuration order.
    pub fn skippers(&self) -> &[Skipper] {
        &self.skippers
    }

    /// The embedded English configuration.
    pub fn english() -> Result<Self> {
        Self::from_xml(DEFAULT_CONFIGURE)
    }

    fn load(&mut self, xml: &str, root: Root) -> Result<()> {
        let mut reader = Reader::from_str(xml);

        let mut seen_root = false;
        let mut current: Option<(String, String)> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let name = lowercase_name(&e);
                    if !seen_root {
                        root.check(&name)?;
                        seen_root = true;
                    } else if name == "parameter" {
                        if let Some(key) = attribute(&e, "name")? {
                            current = Some((key, String::new()));
                        }
                    } else if name == "skipper" {
                        self.push_skipper(&e)?;
                    }
                }
                Ok(Event::Empty(e)) => {
                    let name = lowercase_name(&e);
                    if !seen_root {
                        root.check(&name)?;
                        seen_root = true;
                    } else if name == "parameter" {
                        if let Some(key) = attribute(&e, "name")? {
                            self.parameters.insert(key, String::new());
                        }
                    } else if name == "skipper" {
                        self.push_skipper(&e)?;
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some((_, text)) = current.as_mut() {
                        text.push_str(&String::from_utf8_lossy(e.as_ref()));
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some((_, text)) = current.as_mut() {
                        text.push_str(&String::from_utf8_lossy(&e));
                    }
                }
                Ok(Event::GeneralRef(e)) => {
                    if let Some((_, text)) = current.as_mut() {
                        let entity = String::from_utf8_lossy(e.as_ref());
                        match resolve_entity(&entity) {
                            Some(resolved) => text.push(resolved),
                            None => {
                                return Err(Error::Config(format!(
                                    "unknown entity &{entity}; in configuration"
                                )));
                            }
                        }
                    }
                }
                Ok(Event::End(e)) => {
                    if e.name().as_ref().eq_ignore_ascii_case(b"parameter")
                        && let Some((key, value)) = current.take()
                    {
                        self.parameters.insert(key, value);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::Xml(e)),
                _ => {}
            }
        }

        if !seen_root {
            return Err(Error::Config("empty configuration document".to_string()));
        }
        Ok(())
    }

    fn push_skipper(&mut self, e: &BytesStart<'_>) -> Result<()> {
        let selector = attribute(e, "selector")?;
        let description = match attribute(e, "description")? {
            Some(description) => Some(description),
            None => attribute(e, "default-text")?,
        };
        let shortcut = attribute(e, "shortcut")?;

        match (selector, description, shortcut) {
            (Some(selector), Some(description), Some(shortcut)) => {
                self.skippers.push(Skipper {
                    selector,
                    description,
                    shortcut,
                });
            }
            _ => tracing::debug!("ignoring skipper without selector, description or shortcut"),
        }
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum Root {
    Configure,
    Skippers,
}

impl Root {
    fn check(self, name: &str) -> Result<()> {
        let expected = match self {
            Root::Configure => "configure",
            Root::Skippers => "skippers",
        };
        if name == expected {
            Ok(())
        } else {
            Err(Error::Config(format!(
                "expected <{expected}> root element, found <{name}>"
            )))
        }
    }
}

fn lowercase_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase()
}

/// Unescaped value of an attribute.
fn attribute(e: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == name.as_bytes() {
            let raw = String::from_utf8_lossy(&attr.value);
            let value = quick_xml::escape::unescape(&raw)
                .map_err(|err| Error::Config(format!("attribute {name}: {err}")))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Resolve a predefined or numeric XML entity.
fn resolve_entity(entity: &str) -> Option<char> {
    match entity {
        "apos" => return Some('\''),
        "quot" => return Some('"'),
        "lt" => return Some('<'),
        "gt" => return Some('>'),
        "amp" => return Some('&'),
        _ => {}
    }

    let code = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        entity.strip_prefix('#')?.parse().ok()?
    };
    char::from_u32(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_keep_whitespace_and_entities() {
        let configure = Configure::from_xml(
            r#"<configure><parameters>
                <parameter name="aria-level-prefix-after">&lt;Level </parameter>
                <parameter name="empty"/>
                <parameter name="numeric">&#65;&#x42;</parameter>
            </parameters></configure>"#,
        )
        .unwrap();

        assert_eq!(configure.parameter("aria-level-prefix-after"), "<Level ");
        assert_eq!(configure.get_parameter("empty"), Some(""));
        assert_eq!(configure.parameter("numeric"), "AB");
        assert!(!configure.has_parameter("role-button"));
        assert_eq!(configure.parameter("role-button"), "");
    }

    #[test]
    fn test_skippers_in_order() {
        let configure = Configure::from_xml(
            r#"<configure><skippers>
                <skipper selector="main" description="Skip to content" shortcut="1 c"/>
                <skipper selector="nav" default-text="Skip to menu" shortcut=""/>
                <skipper selector="footer" shortcut="0"/>
            </skippers></configure>"#,
        )
        .unwrap();

        let skippers = configure.skippers();
        assert_eq!(skippers.len(), 2);
        assert_eq!(skippers[0].selector, "main");
        assert_eq!(skippers[0].first_shortcut(), Some("1"));
        assert_eq!(skippers[1].description, "Skip to menu");
        assert_eq!(skippers[1].first_shortcut(), None);
    }

    #[test]
    fn test_with_skippers_xml_replaces_list() {
        let configure = Configure::english()
            .unwrap()
            .with_skippers_xml(
                r#"<skippers><skipper selector="article" description="Skip to article" shortcut="a"/></skippers>"#,
            )
            .unwrap();
        assert_eq!(configure.skippers().len(), 1);
        assert_eq!(configure.skippers()[0].selector, "article");
        assert!(configure.has_parameter("prefix-generated-ids"));
    }

    #[test]
    fn test_wrong_root_is_rejected() {
        let err = Configure::from_xml("<skippers/>").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        let err = Configure::default()
            .with_skippers_xml("<configure/>")
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_malformed_xml() {
        assert!(Configure::from_xml("<configure><parameters></configure>").is_err());
        assert!(Configure::from_xml("").is_err());
    }

    #[test]
    fn test_english_defaults() {
        let configure = Configure::english().unwrap();
        assert_eq!(configure.parameter("aria-checked-true-after"), "<Checked>");
        assert_eq!(configure.parameter("role-button"), "Button");
        assert_eq!(configure.parameter("language-pt"), "Portuguese");
        assert!(!configure.skippers().is_empty());
    }
}
