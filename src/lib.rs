//! # hatch
//!
//! HTML accessibility annotation: makes state that is only visual or
//! implicit in markup explicit to assistive technologies.
//!
//! ## Features
//!
//! - ARIA states, roles, titles, languages, table headers and shortcuts
//!   spoken through hidden-to-sight "force read" text
//! - Heading outline and "skip to" links with conflict-free access keys
//! - Long description links and alternative text for images
//! - Form constraints mirrored as ARIA attributes
//! - Every operation is idempotent: annotating twice equals annotating once
//!
//! ## Quick Start
//!
//! ```
//! use hatch::{Annotator, Configure};
//!
//! let config = Configure::english().unwrap();
//! let mut annotator = Annotator::from_html(
//!     "<table><tr><th id='n'>Name</th><th id='a'>Age</th></tr>\
//!      <tr><td headers='n a'>Ada</td><td>36</td></tr></table>",
//!     &config,
//! )
//! .unwrap();
//! annotator.annotate_all_states().unwrap();
//! assert!(annotator.to_html().contains("Name Age"));
//! ```
//!
//! ## Working with Drivers
//!
//! Each feature also exists as a standalone driver operating on a
//! [`engine::Document`], for callers that need a single annotation:
//!
//! ```
//! use hatch::Configure;
//! use hatch::display::StateAnnotator;
//! use hatch::dom::parse_html;
//! use hatch::engine::Document;
//!
//! let config = Configure::english().unwrap();
//! let mut doc = Document::with_config(parse_html("<p aria-busy='true'>x</p>"), &config);
//! let node = doc.dom().find_by_tag("p").unwrap();
//! StateAnnotator::new(&config).annotate(&mut doc, node);
//! ```

pub mod annotator;
pub mod config;
pub mod display;
pub mod dom;
pub mod engine;
pub mod error;
pub mod form;
pub mod navigation;
pub(crate) mod util;

pub use annotator::{Annotator, Feature, Report};
pub use config::{Configure, Skipper};
pub use dom::{ArenaDom, ArenaNodeId, parse_html, parse_html_bytes};
pub use engine::Document;
pub use error::{Error, Result};
