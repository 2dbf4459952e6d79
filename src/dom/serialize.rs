use super::parse::{is_raw_text_element, is_void_element};
use super::{Dom, NodeId, NodeKind};

/// Pending work for the serializer, which walks with an explicit stack.
enum Step {
    Open(NodeId),
    Close(NodeId),
}

impl Dom {
    /// Markup for `id` and its subtree. Document nodes emit only their
    /// children.
    pub fn to_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut pending = vec![Step::Open(id)];
        while let Some(step) = pending.pop() {
            match step {
                Step::Open(id) => self.write_open(id, &mut out, &mut pending),
                Step::Close(id) => {
                    if let Some(element) = self.element(id) {
                        write_end_tag(&element.name, &mut out);
                    }
                }
            }
        }
        out
    }

    fn write_open(&self, id: NodeId, out: &mut String, pending: &mut Vec<Step>) {
        match self.kind(id) {
            NodeKind::Document => self.schedule_children(id, pending),
            NodeKind::Doctype(body) => {
                out.push_str("<!");
                out.push_str(body);
                out.push('>');
            }
            NodeKind::Comment(body) => {
                out.push_str("<!--");
                out.push_str(body);
                out.push_str("-->");
            }
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element(element) => {
                out.push('<');
                out.push_str(&element.name);
                for (name, value) in element.attrs.iter() {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&value.replace('"', "&quot;"));
                    out.push('"');
                }
                out.push('>');
                if is_void_element(&element.name) {
                    return;
                }
                if is_raw_text_element(&element.name) {
                    out.push_str(&self.text_content(id));
                    write_end_tag(&element.name, out);
                } else {
                    pending.push(Step::Close(id));
                    self.schedule_children(id, pending);
                }
            }
        }
    }

    fn schedule_children(&self, id: NodeId, pending: &mut Vec<Step>) {
        pending.extend(self.children(id).iter().rev().map(|child| Step::Open(*child)));
    }
}

fn write_end_tag(name: &str, out: &mut String) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

/// Escape plain text so it can be stored in a text node.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}
