//! HTML serialization of an ArenaDom through html5ever's serializer.

use std::io;

use html5ever::serialize::{Serialize, SerializeOpts, Serializer, TraversalScope, serialize};

use super::arena::{ArenaDom, ArenaNodeData, ArenaNodeId};

/// A node of an ArenaDom that html5ever can serialize.
pub struct SerializableNode<'a> {
    dom: &'a ArenaDom,
    id: ArenaNodeId,
}

impl<'a> SerializableNode<'a> {
    pub fn new(dom: &'a ArenaDom, id: ArenaNodeId) -> Self {
        Self { dom, id }
    }

    fn write_node<S: Serializer>(&self, serializer: &mut S, id: ArenaNodeId) -> io::Result<()> {
        let Some(node) = self.dom.get(id) else {
            return Ok(());
        };
        match &node.data {
            ArenaNodeData::Document => self.write_children(serializer, id),
            ArenaNodeData::Element { name, attrs } => {
                serializer.start_elem(
                    name.clone(),
                    attrs.iter().map(|a| (&a.name, a.value.as_str())),
                )?;
                self.write_children(serializer, id)?;
                serializer.end_elem(name.clone())
            }
            ArenaNodeData::Text(text) => serializer.write_text(text),
            ArenaNodeData::Comment(text) => serializer.write_comment(text),
            ArenaNodeData::Doctype { name, .. } => serializer.write_doctype(name),
        }
    }

    fn write_children<S: Serializer>(&self, serializer: &mut S, id: ArenaNodeId) -> io::Result<()> {
        for child in self.dom.children(id) {
            self.write_node(serializer, child)?;
        }
        Ok(())
    }
}

impl Serialize for SerializableNode<'_> {
    fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        match traversal_scope {
            TraversalScope::IncludeNode => self.write_node(serializer, self.id),
            TraversalScope::ChildrenOnly(_) => self.write_children(serializer, self.id),
        }
    }
}

impl ArenaDom {
    /// Serialize the whole document to an HTML string.
    pub fn to_html(&self) -> String {
        self.serialize_with(self.document(), TraversalScope::ChildrenOnly(None))
    }

    /// Serialize one node, including its own tag.
    pub fn outer_html(&self, id: ArenaNodeId) -> String {
        self.serialize_with(id, TraversalScope::IncludeNode)
    }

    fn serialize_with(&self, id: ArenaNodeId, traversal_scope: TraversalScope) -> String {
        let mut bytes = Vec::new();
        let opts = SerializeOpts {
            traversal_scope,
            ..Default::default()
        };
        // Writing into a Vec cannot fail.
        let _ = serialize(&mut bytes, &SerializableNode::new(self, id), opts);
        String::from_utf8(bytes).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::parse_html;

    #[test]
    fn test_round_trip_keeps_attributes() {
        let dom = parse_html(r#"<!DOCTYPE html><html><body><p id="x" class="y">Hi &amp; bye</p></body></html>"#);
        let html = dom.to_html();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<p id="x" class="y">Hi &amp; bye</p>"#));
    }

    #[test]
    fn test_outer_html_of_created_element() {
        let mut dom = parse_html("<body></body>");
        let body = dom.body().unwrap();
        let span = dom.create_element("span");
        dom.set_attr(span, "class", "force-read-before");
        dom.append_text(span, "checked");
        dom.append(body, span);
        assert_eq!(
            dom.outer_html(span),
            r#"<span class="force-read-before">checked</span>"#
        );
    }
}
