//! Selector matching over [`ArenaDom`] elements.
//!
//! Only what annotation selectors and configured skippers need: type, id,
//! class and attribute selectors, combinators, `:not`, `:is`/`:where` and
//! the structural pseudo-classes. Other pseudo-classes and all
//! pseudo-elements fail to parse.
//!
//! HTML elements follow the HTML rules for attribute case: names are
//! matched lowercased, and values of the attributes HTML lists as
//! case-insensitive (`type`, `target`, `lang`, ...) ignore ASCII case.
//! Generated `data-*` link attributes always compare exactly.

use std::fmt;

use html5ever::{LocalName, Namespace, ns};
use precomputed_hash::PrecomputedHash;
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::context::MatchingContext;
use selectors::matching::ElementSelectorFlags;
use selectors::parser::SelectorParseErrorKind;
use selectors::{OpaqueElement, SelectorImpl};

use super::arena::{ArenaDom, ArenaNode, ArenaNodeId};

/// Marker tying the `selectors` crate to the arena tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HatchSelectors;

/// Declares a string newtype usable as a selector atom.
macro_rules! css_atom {
    ($(#[$meta:meta])* $name:ident($inner:ty), |$s:ident| $hash:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
        pub struct $name(pub $inner);

        impl PrecomputedHash for $name {
            fn precomputed_hash(&self) -> u32 {
                let $s = &self.0;
                $hash
            }
        }

        impl cssparser::ToCss for $name {
            fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
                dest.write_str(self.as_ref())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl<'a> From<&'a str> for $name {
            fn from(s: &'a str) -> Self {
                Self(<$inner>::from(s))
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(<$inner>::from(s))
            }
        }
    };
}

css_atom!(
    /// Identifiers, attribute values and namespace prefixes.
    CssString(String),
    |s| s.bytes().fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(u32::from(b)))
);
css_atom!(CssLocalName(LocalName), |s| s.precomputed_hash());
css_atom!(CssNamespace(Namespace), |s| s.precomputed_hash());

/// Never constructed: the parser accepts no pseudo-elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PseudoElement {}

impl cssparser::ToCss for PseudoElement {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

impl selectors::parser::PseudoElement for PseudoElement {
    type Impl = HatchSelectors;
}

/// Never constructed: dynamic state such as `:hover` or `:focus` has no
/// meaning on a static document, so the parser rejects it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PseudoClass {}

impl selectors::parser::NonTSPseudoClass for PseudoClass {
    type Impl = HatchSelectors;

    fn is_active_or_hover(&self) -> bool {
        match *self {}
    }

    fn is_user_action_state(&self) -> bool {
        match *self {}
    }
}

impl cssparser::ToCss for PseudoClass {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

impl SelectorImpl for HatchSelectors {
    type ExtraMatchingData<'a> = ();
    type AttrValue = CssString;
    type Identifier = CssString;
    type LocalName = CssLocalName;
    type NamespaceUrl = CssNamespace;
    type NamespacePrefix = CssString;
    type BorrowedLocalName = CssLocalName;
    type BorrowedNamespaceUrl = CssNamespace;
    type NonTSPseudoClass = PseudoClass;
    type PseudoElement = PseudoElement;
}

impl<'i> selectors::parser::Parser<'i> for HatchSelectors {
    type Impl = HatchSelectors;
    type Error = SelectorParseErrorKind<'i>;

    fn parse_is_and_where(&self) -> bool {
        true
    }
}

/// An element of an [`ArenaDom`] as seen by the selector engine.
#[derive(Clone, Copy)]
pub struct ElementRef<'a> {
    pub dom: &'a ArenaDom,
    pub id: ArenaNodeId,
}

impl<'a> ElementRef<'a> {
    pub fn new(dom: &'a ArenaDom, id: ArenaNodeId) -> Self {
        Self { dom, id }
    }

    /// Nearest sibling element in the direction of `step`.
    fn walk(&self, step: impl Fn(&ArenaNode) -> ArenaNodeId) -> Option<Self> {
        let mut current = step(self.dom.get(self.id)?);
        while current.is_some() {
            if self.dom.is_element(current) {
                return Some(Self::new(self.dom, current));
            }
            current = step(self.dom.get(current)?);
        }
        None
    }
}

impl fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ElementRef")
            .field(&self.id)
            .field(&self.dom.tag_name(self.id))
            .finish()
    }
}

impl selectors::Element for ElementRef<'_> {
    type Impl = HatchSelectors;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self)
    }

    fn parent_element(&self) -> Option<Self> {
        self.dom
            .parent(self.id)
            .filter(|&p| self.dom.is_element(p))
            .map(|p| Self::new(self.dom, p))
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.walk(|node| node.prev_sibling)
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.walk(|node| node.next_sibling)
    }

    fn first_element_child(&self) -> Option<Self> {
        self.dom
            .element_children(self.id)
            .next()
            .map(|child| Self::new(self.dom, child))
    }

    /// SVG and MathML content keeps case-sensitive attribute names.
    fn is_html_element_in_html_document(&self) -> bool {
        self.dom.element_namespace(self.id) == Some(&ns!(html))
    }

    fn has_local_name(&self, name: &CssLocalName) -> bool {
        self.dom.element_name(self.id) == Some(&name.0)
    }

    fn has_namespace(&self, ns: &CssNamespace) -> bool {
        self.dom.element_namespace(self.id) == Some(&ns.0)
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.dom.element_name(self.id) == other.dom.element_name(other.id)
            && self.dom.element_namespace(self.id) == other.dom.element_namespace(other.id)
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&CssNamespace>,
        local_name: &CssLocalName,
        operation: &AttrSelectorOperation<&CssString>,
    ) -> bool {
        self.dom.attrs(self.id).iter().any(|attr| {
            attr.name.local == local_name.0
                && match ns {
                    NamespaceConstraint::Any => true,
                    NamespaceConstraint::Specific(ns) => attr.name.ns == ns.0,
                }
                && operation.eval_str(&attr.value)
        })
    }

    fn match_non_ts_pseudo_class(
        &self,
        pc: &PseudoClass,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        match *pc {}
    }

    fn match_pseudo_element(
        &self,
        pe: &PseudoElement,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        match *pe {}
    }

    fn is_link(&self) -> bool {
        matches!(self.dom.tag_name(self.id), Some("a" | "area"))
            && self.dom.has_attr(self.id, "href")
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(&self, id: &CssString, case_sensitivity: CaseSensitivity) -> bool {
        self.dom
            .element_id(self.id)
            .is_some_and(|own| case_sensitivity.eq(own.as_bytes(), id.0.as_bytes()))
    }

    fn has_class(&self, name: &CssString, case_sensitivity: CaseSensitivity) -> bool {
        self.dom
            .element_classes(self.id)
            .any(|class| case_sensitivity.eq(class.as_bytes(), name.0.as_bytes()))
    }

    fn imported_part(&self, _name: &CssString) -> Option<CssString> {
        None
    }

    fn is_part(&self, _name: &CssString) -> bool {
        false
    }

    /// No element children and no non-empty text.
    fn is_empty(&self) -> bool {
        self.dom
            .children(self.id)
            .all(|child| {
                !self.dom.is_element(child) && self.dom.text(child).is_none_or(str::is_empty)
            })
    }

    fn is_root(&self) -> bool {
        self.dom.parent(self.id) == Some(self.dom.document())
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn add_element_unique_hashes(&self, _filter: &mut selectors::bloom::BloomFilter) -> bool {
        false
    }

    fn has_custom_state(&self, _name: &CssString) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Selector, parse_html};

    fn matches(dom: &ArenaDom, id: ArenaNodeId, selector: &str) -> bool {
        Selector::parse(selector)
            .unwrap()
            .matches(ElementRef::new(dom, id))
    }

    #[test]
    fn test_tag_id_and_class() {
        let dom = parse_html(r#"<p id="main" class="intro highlight">Hello</p>"#);
        let p = dom.find_by_tag("p").unwrap();

        assert!(matches(&dom, p, "p#main.intro"));
        assert!(matches(&dom, p, ".highlight"));
        assert!(!matches(&dom, p, "div"));
        assert!(!matches(&dom, p, "#Main"));
    }

    #[test]
    fn test_attribute_selectors() {
        let dom = parse_html(r#"<table><tr><td headers="a b" aria-busy="true">x</td></tr></table>"#);
        let td = dom.find_by_tag("td").unwrap();

        assert!(matches(&dom, td, "[headers]"));
        assert!(matches(&dom, td, "[headers~=b]"));
        assert!(matches(&dom, td, "[aria-busy=true]"));
        assert!(!matches(&dom, td, "[aria-busy=false]"));
        assert!(matches(&dom, td, "td[headers],th[headers]"));
    }

    #[test]
    fn test_html_attribute_case_rules() {
        let dom = parse_html(
            r#"<a href="/" target="_blank" data-headinganchorfor="Intro">x</a><svg viewBox="0 0 1 1"></svg>"#,
        );
        let a = dom.find_by_tag("a").unwrap();
        let svg = dom.find_by_tag("svg").unwrap();

        assert!(matches(&dom, a, "[DATA-HEADINGANCHORFOR]"));
        assert!(matches(&dom, a, "[target=_BLANK]"));
        assert!(matches(&dom, a, "[data-headinganchorfor=Intro]"));
        assert!(!matches(&dom, a, "[data-headinganchorfor=intro]"));
        assert!(matches(&dom, svg, "[viewBox]"));
    }

    #[test]
    fn test_combinators_and_logical_pseudo_classes() {
        let dom = parse_html("<main><div><span><p>Nested</p></span></div></main>");
        let p = dom.find_by_tag("p").unwrap();

        assert!(matches(&dom, p, "div p"));
        assert!(matches(&dom, p, "span > p"));
        assert!(!matches(&dom, p, "div > p"));
        assert!(matches(&dom, p, ":is(main, [role=main]) p"));
        assert!(matches(&dom, p, "p:not(.hidden)"));
        assert!(matches(&dom, p, "p:first-child:last-child"));
    }

    #[test]
    fn test_dynamic_pseudo_classes_are_rejected() {
        assert!(Selector::parse("a:hover").is_err());
        assert!(Selector::parse("p::before").is_err());
    }
}
