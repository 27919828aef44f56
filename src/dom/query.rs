//! Selector-driven queries over an ArenaDom.
//!
//! A [`Query`] is a snapshot of matching node ids. It borrows the tree
//! immutably, so callers collect results with [`Query::list_results`] before
//! mutating and re-query afterwards; later queries always observe earlier
//! mutations.

use std::collections::HashSet;
use std::fmt;

use selectors::context::{MatchingContext, SelectorCaches};
use selectors::parser::{ParseRelative, SelectorList};

use super::arena::{ArenaDom, ArenaNodeId};
use super::element_ref::{ElementRef, HatchSelectors};
use crate::error::{Error, Result};

/// A parsed, comma-separated selector list.
#[derive(Clone)]
pub struct Selector {
    list: SelectorList<HatchSelectors>,
    source: String,
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Selector").field(&self.source).finish()
    }
}

impl Selector {
    /// Parse a selector list such as `td[headers],th[headers]`.
    pub fn parse(source: &str) -> Result<Self> {
        let mut input = cssparser::ParserInput::new(source);
        let mut parser = cssparser::Parser::new(&mut input);
        let list = SelectorList::parse(&HatchSelectors, &mut parser, ParseRelative::No)
            .map_err(|_| Error::InvalidSelector(source.to_string()))?;
        Ok(Self {
            list,
            source: source.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True if any selector of the list matches the element.
    pub fn matches(&self, elem: ElementRef<'_>) -> bool {
        if !elem.dom.is_element(elem.id) {
            return false;
        }
        let mut caches = SelectorCaches::default();
        let mut context = MatchingContext::new(
            selectors::matching::MatchingMode::Normal,
            None,
            &mut caches,
            selectors::context::QuirksMode::NoQuirks,
            selectors::matching::NeedsSelectorFlags::No,
            selectors::matching::MatchingForInvalidation::No,
        );
        self.list.slice().iter().any(|selector| {
            selectors::matching::matches_selector(selector, 0, None, &elem, &mut context)
        })
    }
}

/// Ordered result set of a query.
#[derive(Debug, Clone)]
pub struct Query<'a> {
    dom: &'a ArenaDom,
    nodes: Vec<ArenaNodeId>,
}

impl ArenaDom {
    /// All connected elements matching `selector`, in document order.
    pub fn find(&self, selector: &str) -> Result<Query<'_>> {
        let selector = Selector::parse(selector)?;
        Ok(self.find_selector(&selector))
    }

    /// Like [`ArenaDom::find`] with an already parsed selector.
    pub fn find_selector(&self, selector: &Selector) -> Query<'_> {
        let nodes = self
            .descendants(self.document())
            .filter(|&id| selector.matches(ElementRef::new(self, id)))
            .collect();
        Query { dom: self, nodes }
    }

    /// A result set holding exactly one node.
    pub fn query(&self, node: ArenaNodeId) -> Query<'_> {
        Query {
            dom: self,
            nodes: vec![node],
        }
    }
}

impl<'a> Query<'a> {
    /// Element children of the current results that match `selector`.
    pub fn find_children(&self, selector: &str) -> Result<Query<'a>> {
        let selector = Selector::parse(selector)?;
        let dom = self.dom;
        let nodes = self
            .nodes
            .iter()
            .flat_map(|&node| dom.element_children(node))
            .filter(|&child| selector.matches(ElementRef::new(dom, child)))
            .collect();
        Ok(Query { dom, nodes })
    }

    /// Descendants of the current results that match `selector`, in
    /// document order without duplicates.
    pub fn find_descendants(&self, selector: &str) -> Result<Query<'a>> {
        let selector = Selector::parse(selector)?;
        let dom = self.dom;
        let mut seen = HashSet::new();
        let mut nodes = Vec::new();
        for &root in &self.nodes {
            for node in dom.descendants(root) {
                if selector.matches(ElementRef::new(dom, node)) && seen.insert(node) {
                    nodes.push(node);
                }
            }
        }
        Ok(Query { dom, nodes })
    }

    /// Ancestors of the current results that match `selector`, nearest
    /// first.
    pub fn find_ancestors(&self, selector: &str) -> Result<Query<'a>> {
        let selector = Selector::parse(selector)?;
        let dom = self.dom;
        let mut seen = HashSet::new();
        let mut nodes = Vec::new();
        for &node in &self.nodes {
            for ancestor in dom.ancestors(node) {
                if selector.matches(ElementRef::new(dom, ancestor)) && seen.insert(ancestor) {
                    nodes.push(ancestor);
                }
            }
        }
        Ok(Query { dom, nodes })
    }

    pub fn first_result(&self) -> Option<ArenaNodeId> {
        self.nodes.first().copied()
    }

    pub fn last_result(&self) -> Option<ArenaNodeId> {
        self.nodes.last().copied()
    }

    pub fn list_results(self) -> Vec<ArenaNodeId> {
        self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
