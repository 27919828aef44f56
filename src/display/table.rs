//! Attribute-to-template table driving the state annotator.
//!
//! Each row names an attribute, the link attribute of its sentinels, and
//! how the attribute value turns into text. Rows are applied in table order.

use crate::dom::{ArenaDom, ArenaNodeId};
use crate::engine::visible_text;
use crate::navigation::DATA_LONG_DESCRIPTION_FOR;
use crate::util::tokens;

use super::StateAnnotator;

/// Computes the value wrapped by a row's templates; `None` skips the row.
pub(crate) type Derive = fn(&StateAnnotator<'_>, &ArenaDom, ArenaNodeId, &str) -> Option<String>;

pub(crate) enum Rule {
    /// Recognized values and their template stem; the sentinel texts are the
    /// `<stem>-before` and `<stem>-after` parameters.
    Enumerated(&'static [(&'static str, &'static str)]),
    /// The raw value inside `<stem>-prefix-*` and `<stem>-suffix-*`.
    Valued(&'static str),
    /// Any value: `<stem>-before` and `<stem>-after`.
    Present(&'static str),
    /// A computed value inside `<stem>-prefix-*` and `<stem>-suffix-*`.
    Derived(&'static str, Derive),
}

pub(crate) struct StateRule {
    pub attribute: &'static str,
    pub link: &'static str,
    pub rule: Rule,
    /// Elements carrying this attribute already say what the row would.
    pub unless: Option<&'static str>,
}

impl StateRule {
    const fn unless(self, attribute: &'static str) -> Self {
        Self {
            unless: Some(attribute),
            ..self
        }
    }

    pub fn applies_to(&self, dom: &ArenaDom, node: ArenaNodeId) -> bool {
        self.unless.is_none_or(|attribute| !dom.has_attr(node, attribute))
    }
}

const fn row(attribute: &'static str, link: &'static str, rule: Rule) -> StateRule {
    StateRule {
        attribute,
        link,
        rule,
        unless: None,
    }
}

pub(crate) const STATE_RULES: &[StateRule] = &[
    row(
        "aria-busy",
        "data-ariabusyof",
        Rule::Enumerated(&[("true", "aria-busy-true")]),
    ),
    row(
        "aria-checked",
        "data-ariacheckedof",
        Rule::Enumerated(&[
            ("true", "aria-checked-true"),
            ("false", "aria-checked-false"),
            ("mixed", "aria-checked-mixed"),
        ]),
    ),
    row(
        "aria-dropeffect",
        "data-ariadropeffectof",
        Rule::Enumerated(&[
            ("copy", "aria-dropeffect-copy"),
            ("move", "aria-dropeffect-move"),
            ("link", "aria-dropeffect-link"),
            ("execute", "aria-dropeffect-execute"),
            ("popup", "aria-dropeffect-popup"),
        ]),
    ),
    row(
        "aria-expanded",
        "data-ariaexpandedof",
        Rule::Enumerated(&[
            ("true", "aria-expanded-true"),
            ("false", "aria-expanded-false"),
        ]),
    ),
    row(
        "aria-grabbed",
        "data-ariagrabbedof",
        Rule::Enumerated(&[
            ("true", "aria-grabbed-true"),
            ("false", "aria-grabbed-false"),
        ]),
    ),
    row(
        "aria-haspopup",
        "data-ariahaspopupof",
        Rule::Enumerated(&[("true", "aria-haspopup-true")]),
    ),
    row("aria-level", "data-arialevelof", Rule::Valued("aria-level")),
    row(
        "aria-orientation",
        "data-ariaorientationof",
        Rule::Enumerated(&[
            ("vertical", "aria-orientation-vertical"),
            ("horizontal", "aria-orientation-horizontal"),
        ]),
    ),
    row(
        "aria-pressed",
        "data-ariapressedof",
        Rule::Enumerated(&[
            ("true", "aria-pressed-true"),
            ("false", "aria-pressed-false"),
            ("mixed", "aria-pressed-mixed"),
        ]),
    ),
    row(
        "aria-selected",
        "data-ariaselectedof",
        Rule::Enumerated(&[
            ("true", "aria-selected-true"),
            ("false", "aria-selected-false"),
        ]),
    ),
    row(
        "aria-sort",
        "data-ariasortof",
        Rule::Enumerated(&[
            ("ascending", "aria-sort-ascending"),
            ("descending", "aria-sort-descending"),
            ("other", "aria-sort-other"),
        ]),
    ),
    row(
        "aria-required",
        "data-ariarequiredof",
        Rule::Enumerated(&[("true", "aria-required-true")]),
    ),
    row(
        "aria-valuemin",
        "data-ariavalueminof",
        Rule::Valued("aria-value-minimum"),
    ),
    row(
        "aria-valuemax",
        "data-ariavaluemaxof",
        Rule::Valued("aria-value-maximum"),
    ),
    row(
        "aria-autocomplete",
        "data-ariaautocompleteof",
        Rule::Enumerated(&[
            ("both", "aria-autocomplete-both"),
            ("inline", "aria-autocomplete-inline"),
            ("list", "aria-autocomplete-list"),
        ]),
    ),
    row(
        "role",
        "data-roleof",
        Rule::Derived("attribute-role", role_name),
    ),
    row(
        "title",
        "data-titleof",
        Rule::Derived("attribute-title", title_text),
    ),
    row(
        "lang",
        "data-languageof",
        Rule::Derived("attribute-language", language_name),
    ),
    row(
        "hreflang",
        "data-hreflangof",
        Rule::Derived("attribute-hreflang", language_name),
    ),
    row(
        "headers",
        "data-headersof",
        Rule::Derived("attribute-headers", header_text),
    ),
    row(
        "accesskey",
        "data-accesskeyof",
        Rule::Derived("attribute-accesskey", shortcut_text),
    ),
    row(
        "download",
        "data-downloadof",
        Rule::Present("attribute-download"),
    ),
    row(
        "target",
        "data-targetof",
        Rule::Enumerated(&[("_blank", "attribute-target-blank")]),
    )
    .unless(DATA_LONG_DESCRIPTION_FOR),
];

/// Selector list matching any element carrying a table attribute.
pub(crate) fn state_selector() -> String {
    STATE_RULES
        .iter()
        .map(|rule| format!("[{}]", rule.attribute))
        .collect::<Vec<_>>()
        .join(",")
}

fn role_name(
    annotator: &StateAnnotator<'_>,
    _dom: &ArenaDom,
    _node: ArenaNodeId,
    role: &str,
) -> Option<String> {
    let name = annotator.config().parameter(&format!("role-{}", role.trim()));
    if name.is_empty() {
        tracing::debug!(role, "no template for role");
        None
    } else {
        Some(name.to_string())
    }
}

/// Image titles are handled together with the alternative text.
fn title_text(
    _annotator: &StateAnnotator<'_>,
    dom: &ArenaDom,
    node: ArenaNodeId,
    title: &str,
) -> Option<String> {
    let title = title.trim();
    if dom.tag_name(node) == Some("img") || title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

/// Language name for a code, trying the full code then its primary subtag.
fn language_name(
    annotator: &StateAnnotator<'_>,
    _dom: &ArenaDom,
    _node: ArenaNodeId,
    code: &str,
) -> Option<String> {
    let code = code.trim().to_ascii_lowercase();
    if code.is_empty() {
        return None;
    }
    let config = annotator.config();
    let primary = code.split(['-', '_']).next().unwrap_or(&code);
    [code.as_str(), primary]
        .into_iter()
        .map(|candidate| config.parameter(&format!("language-{candidate}")))
        .find(|name| !name.is_empty())
        .map(str::to_string)
}

/// Text of the referenced header cells, in attribute order.
fn header_text(
    _annotator: &StateAnnotator<'_>,
    dom: &ArenaDom,
    _node: ArenaNodeId,
    headers: &str,
) -> Option<String> {
    let text = tokens(headers)
        .filter_map(|id| dom.get_by_id(id))
        .map(|header| visible_text(dom, header).trim().to_string())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!text.is_empty()).then_some(text)
}

fn shortcut_text(
    annotator: &StateAnnotator<'_>,
    _dom: &ArenaDom,
    _node: ArenaNodeId,
    accesskey: &str,
) -> Option<String> {
    tokens(accesskey)
        .next()
        .map(|key| format!("{} + {}", annotator.shortcut_prefix(), key.to_uppercase()))
}
