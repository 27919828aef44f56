//! Keyboard shortcut (`accesskey`) collision handling.

use crate::dom::{ArenaDom, ArenaNodeId};
use crate::util::contains_token;

/// Keys handed out when a shortcut has to move, in preference order.
pub const SHORTCUT_KEYS: &str = "1234567890abcdefghijklmnopqrstuvwxyz";

/// Connected elements declaring an `accesskey`, in document order.
fn elements_with_shortcuts(dom: &ArenaDom) -> Vec<ArenaNodeId> {
    dom.descendants(dom.document())
        .filter(|&node| dom.has_attr(node, "accesskey"))
        .collect()
}

fn key_in_use(dom: &ArenaDom, elements: &[ArenaNodeId], key: &str) -> bool {
    elements
        .iter()
        .any(|&node| contains_token(dom.get_attr(node, "accesskey").unwrap_or(""), key))
}

/// Move every element currently bound to `key` onto the first key of
/// [`SHORTCUT_KEYS`] that no element uses. When the alphabet is exhausted
/// the element keeps its shortcut. Returns the reassignments made.
pub fn free_shortcut(dom: &mut ArenaDom, key: &str) -> Vec<(ArenaNodeId, char)> {
    let elements = elements_with_shortcuts(dom);
    let mut moved = Vec::new();

    for &node in &elements {
        if !contains_token(dom.get_attr(node, "accesskey").unwrap_or(""), key) {
            continue;
        }
        let free = SHORTCUT_KEYS.chars().find(|candidate| {
            let candidate = candidate.to_string();
            !candidate.eq_ignore_ascii_case(key) && !key_in_use(dom, &elements, &candidate)
        });
        match free {
            Some(candidate) => {
                dom.set_attr(node, "accesskey", &candidate.to_string());
                moved.push((node, candidate));
            }
            None => tracing::debug!(key, "no free shortcut key left, keeping collision"),
        }
    }

    if !moved.is_empty() {
        tracing::debug!(key, moved = moved.len(), "reassigned conflicting shortcuts");
    }
    moved
}

/// Bind `key` to `node`, moving any element that already uses it.
pub fn assign_shortcut(dom: &mut ArenaDom, node: ArenaNodeId, key: &str) {
    dom.remove_attr(node, "accesskey");
    free_shortcut(dom, key);
    dom.set_attr(node, "accesskey", key);
}

/// Modifier keys a browser needs to trigger an `accesskey`, guessed from
/// its user agent string. Unknown agents get `default`.
pub fn shortcut_prefix(user_agent: Option<&str>, default: &str) -> String {
    let Some(user_agent) = user_agent else {
        return default.to_string();
    };
    let agent = user_agent.to_ascii_lowercase();

    let opera = agent.contains("opera");
    let mac = agent.contains("mac");
    let konqueror = agent.contains("konqueror");
    let spoofer = agent.contains("spoofer");
    let safari = agent.contains("applewebkit");
    let windows = agent.contains("windows");
    let chrome = agent.contains("chrome");
    let firefox = old_firefox(&agent);
    let ie = agent.contains("msie") || agent.contains("trident");

    let prefix = if opera {
        "SHIFT + ESC"
    } else if chrome && mac && !spoofer {
        "CTRL + OPTION"
    } else if safari && !windows && !spoofer {
        "CTRL + ALT"
    } else if !windows && (safari || mac || konqueror) {
        "CTRL"
    } else if firefox {
        "ALT + SHIFT"
    } else if chrome || ie {
        "ALT"
    } else {
        default
    };
    prefix.to_string()
}

/// Firefox 2 to 9, or the Minefield 3 nightlies.
fn old_firefox(agent: &str) -> bool {
    let single_digit_version = |marker: &str, versions: &[u8]| {
        agent.match_indices(marker).any(|(pos, _)| {
            let rest = &agent.as_bytes()[pos + marker.len()..];
            matches!(rest.first(), Some(d) if versions.contains(d))
                && !matches!(rest.get(1), Some(d) if d.is_ascii_digit())
        })
    };
    single_digit_version("firefox/", b"23456789") || single_digit_version("minefield/", b"3")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    #[test]
    fn test_conflict_moves_to_first_free_key() {
        let mut dom = parse_html("<a id='e1' accesskey='x'>one</a><a id='e2'>two</a>");
        let e1 = dom.get_by_id("e1").unwrap();
        let e2 = dom.get_by_id("e2").unwrap();

        assign_shortcut(&mut dom, e2, "x");
        assert_eq!(dom.get_attr(e1, "accesskey"), Some("1"));
        assert_eq!(dom.get_attr(e2, "accesskey"), Some("x"));
    }

    #[test]
    fn test_skips_used_keys_and_ignores_case() {
        let mut dom = parse_html(
            "<a id='a' accesskey='A'></a><a id='b' accesskey='1'></a><a id='c' accesskey='2 3'></a>",
        );
        let a = dom.get_by_id("a").unwrap();
        let moved = free_shortcut(&mut dom, "a");
        assert_eq!(moved, vec![(a, '4')]);
    }

    #[test]
    fn test_every_holder_is_moved() {
        let mut dom = parse_html("<a id='e1' accesskey='a'></a><a id='e2' accesskey='a'></a>");
        free_shortcut(&mut dom, "a");
        let e1 = dom.get_by_id("e1").unwrap();
        let e2 = dom.get_by_id("e2").unwrap();
        assert_eq!(dom.get_attr(e1, "accesskey"), Some("1"));
        assert_eq!(dom.get_attr(e2, "accesskey"), Some("2"));
    }

    #[test]
    fn test_exhausted_alphabet_keeps_shortcut() {
        let mut html = String::from("<a id='target' accesskey='a'></a>");
        for key in SHORTCUT_KEYS.chars().filter(|&c| c != 'a') {
            html.push_str(&format!("<a accesskey='{key}'></a>"));
        }
        let mut dom = parse_html(&html);
        assert!(free_shortcut(&mut dom, "a").is_empty());
        let target = dom.get_by_id("target").unwrap();
        assert_eq!(dom.get_attr(target, "accesskey"), Some("a"));
    }

    #[test]
    fn test_shortcut_prefix_by_agent() {
        let chrome_windows = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
        let chrome_mac = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
        let safari_mac = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15";
        let firefox_old = "Mozilla/5.0 (Windows NT 6.1; rv:9.0) Gecko/20100101 Firefox/9.0";
        let firefox_new = "Mozilla/5.0 (Windows NT 10.0; rv:121.0) Gecko/20100101 Firefox/121.0";

        assert_eq!(shortcut_prefix(Some(chrome_windows), "ALT"), "ALT");
        assert_eq!(shortcut_prefix(Some(chrome_mac), "ALT"), "CTRL + OPTION");
        assert_eq!(shortcut_prefix(Some(safari_mac), "ALT"), "CTRL + ALT");
        assert_eq!(shortcut_prefix(Some("Opera/9.80"), "ALT"), "SHIFT + ESC");
        assert_eq!(shortcut_prefix(Some(firefox_old), "X"), "ALT + SHIFT");
        assert_eq!(shortcut_prefix(Some(firefox_new), "X"), "X");
        assert_eq!(shortcut_prefix(None, "ALT"), "ALT");
    }
}
