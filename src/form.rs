//! Form markers: native constraints mirrored as ARIA attributes so the state
//! annotator can announce them.

use crate::dom::{ArenaDom, ArenaNodeId};
use crate::engine::is_valid_element;
use crate::error::Result;

/// Input types that take no typed value, so autocompletion never applies.
const VALUELESS_INPUTS: &[&str] = &["button", "checkbox", "file", "hidden", "image", "radio", "reset", "submit"];

/// `required` becomes `aria-required="true"`.
pub fn mark_required_field(dom: &mut ArenaDom, field: ArenaNodeId) {
    if dom.has_attr(field, "required") {
        dom.set_attr(field, "aria-required", "true");
    }
}

pub fn mark_all_required_fields(dom: &mut ArenaDom) -> Result<usize> {
    mark_all(dom, "[required]", mark_required_field, "required")
}

/// `min` and `max` become `aria-valuemin` and `aria-valuemax`.
pub fn mark_range_field(dom: &mut ArenaDom, field: ArenaNodeId) {
    for (native, aria) in [("min", "aria-valuemin"), ("max", "aria-valuemax")] {
        if let Some(value) = dom.get_attr(field, native).map(str::to_string) {
            dom.set_attr(field, aria, &value);
        }
    }
}

pub fn mark_all_range_fields(dom: &mut ArenaDom) -> Result<usize> {
    mark_all(dom, "input[min],input[max]", mark_range_field, "range")
}

/// Set `aria-autocomplete` from the field's effective `autocomplete`
/// setting and its `list` attribute. Fields with neither are left alone.
pub fn mark_autocomplete_field(dom: &mut ArenaDom, field: ArenaNodeId) {
    if let Some(value) = aria_autocomplete(dom, field) {
        dom.set_attr(field, "aria-autocomplete", value);
    }
}

pub fn mark_all_autocomplete_fields(dom: &mut ArenaDom) -> Result<usize> {
    mark_all(dom, "input,textarea", mark_autocomplete_field, "autocomplete")
}

fn aria_autocomplete(dom: &ArenaDom, field: ArenaNodeId) -> Option<&'static str> {
    if dom.tag_name(field) == Some("input")
        && let Some(kind) = dom.get_attr(field, "type")
        && VALUELESS_INPUTS.contains(&kind.trim().to_ascii_lowercase().as_str())
    {
        return None;
    }

    let has_list = dom.has_attr(field, "list");
    match autocomplete_setting(dom, field).as_deref() {
        Some("on") if has_list => Some("both"),
        Some("on") => Some("inline"),
        Some("off") => Some("none"),
        _ if has_list => Some("list"),
        _ => None,
    }
}

/// The field's own `autocomplete`, else its owner form's: the form named by
/// the `form` attribute, or the nearest enclosing one.
fn autocomplete_setting(dom: &ArenaDom, field: ArenaNodeId) -> Option<String> {
    let read = |node| {
        dom.get_attr(node, "autocomplete")
            .map(|value| value.trim().to_ascii_lowercase())
    };
    if let Some(own) = read(field) {
        return Some(own);
    }

    let owner = match dom.get_attr(field, "form") {
        Some(id) => dom.get_by_id(id).filter(|&form| dom.tag_name(form) == Some("form")),
        None => dom.ancestors(field).find(|&a| dom.tag_name(a) == Some("form")),
    };
    owner.and_then(read)
}

fn mark_all(
    dom: &mut ArenaDom,
    selector: &str,
    mark: fn(&mut ArenaDom, ArenaNodeId),
    kind: &str,
) -> Result<usize> {
    let fields = dom.find(selector)?.list_results();
    let mut count = 0;
    for field in fields {
        if is_valid_element(dom, field) {
            mark(dom, field);
            count += 1;
        }
    }
    tracing::info!(fields = count, kind, "marked form fields");
    Ok(count)
}
