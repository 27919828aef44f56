//! Alternative text of images.

use crate::dom::ArenaNodeId;
use crate::engine::{Document, is_valid_element};
use crate::error::Result;

/// Links an image to itself once its `alt` and `title` agree.
pub const DATA_ATTRIBUTE_TITLE_OF: &str = "data-attributetitleof";

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Make an image's alternative text available both as `alt` and `title`.
///
/// An image with neither is treated as decorative: it gets an empty `alt`,
/// `role="presentation"` and `aria-hidden="true"`.
pub fn display_alternative_text_image(doc: &mut Document, image: ArenaNodeId) {
    let dom = doc.dom();
    let alt = non_empty(dom.get_attr(image, "alt"));
    let title = non_empty(dom.get_attr(image, "title"));

    if alt.is_none() && title.is_none() {
        let dom = doc.dom_mut();
        dom.set_attr(image, "alt", "");
        dom.set_attr(image, "role", "presentation");
        dom.set_attr(image, "aria-hidden", "true");
        return;
    }

    let dom = doc.dom_mut();
    match (alt, title) {
        (Some(alt), None) => dom.set_attr(image, "title", &alt),
        (None, Some(title)) => dom.set_attr(image, "alt", &title),
        _ => {}
    }
    let id = doc.ensure_id(image);
    doc.dom_mut().set_attr(image, DATA_ATTRIBUTE_TITLE_OF, &id);
}

/// [`display_alternative_text_image`] for every valid `img`.
pub fn display_all_alternative_text_images(doc: &mut Document) -> Result<usize> {
    let images = doc.dom().find("img")?.list_results();
    let mut count = 0;
    for image in images {
        if is_valid_element(doc.dom(), image) {
            display_alternative_text_image(doc, image);
            count += 1;
        }
    }
    tracing::info!(images = count, "displayed alternative text of images");
    Ok(count)
}
