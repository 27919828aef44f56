//! Mutable HTML document tree.
//!
//! Parsing goes through html5ever into an arena ([`ArenaDom`]); queries use
//! the `selectors` crate ([`Selector`], [`Query`]); output goes back through
//! html5ever's serializer.
//!
//! ```
//! use hatch::dom::parse_html;
//!
//! let mut dom = parse_html("<p id='intro'>Hello</p>");
//! let p = dom.find("#intro").unwrap().first_result().unwrap();
//! dom.set_attr(p, "title", "greeting");
//! assert!(dom.to_html().contains(r#"title="greeting""#));
//! ```

mod arena;
mod element_ref;
mod query;
mod serialize;
mod tree_sink;

pub use arena::{ArenaDom, ArenaNode, ArenaNodeData, ArenaNodeId, Attribute};
pub use element_ref::{ElementRef, HatchSelectors};
pub use query::{Query, Selector};
pub use serialize::SerializableNode;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;

use tree_sink::ArenaSink;

/// Parse an HTML document into an arena tree.
pub fn parse_html(html: &str) -> ArenaDom {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: false,
            ..Default::default()
        },
        ..Default::default()
    };
    let sink = parse_document(ArenaSink::new(), opts)
        .from_utf8()
        .one(html.as_bytes());
    let dom = sink.into_dom();
    tracing::debug!(nodes = dom.len(), "parsed html document");
    dom
}

/// Parse HTML bytes, detecting the encoding from a `<meta charset>` or XML
/// declaration and falling back to Windows-1252 for malformed UTF-8.
pub fn parse_html_bytes(html: &[u8]) -> ArenaDom {
    let hint = crate::util::sniff_encoding(html);
    let text = crate::util::decode_text(html, hint.as_deref());
    parse_html(&text)
}
