use super::{Turn, WRAPPER_ID};
use crate::assets;
use crate::dom::{Dom, Element, NodeId, escape_text};

/// Build the output document in the same arena and return its root.
///
/// The original head is moved over (scripts removed), the original body
/// contributes only its attributes, and the turns are moved, in order, into
/// the wrapper `div`.
pub fn assemble(dom: &mut Dom, turns: &[Turn], title: Option<&str>) -> NodeId {
    let source = dom.root();
    let old_head = dom.find_first(source, |e| e.is("head"));
    let body_attrs = dom
        .find_first(source, |e| e.is("body"))
        .and_then(|body| dom.element(body))
        .map(|body| body.attrs.clone())
        .unwrap_or_default();

    let root = dom.create_document();
    let doctype = dom.create_doctype("DOCTYPE html");
    dom.append_child(root, doctype);

    let mut html = Element::new("html");
    html.attrs.set("lang", "en");
    let html = dom.create_element_with(html);
    dom.append_child(root, html);

    let head = old_head.unwrap_or_else(|| dom.create_element("head"));
    dom.append_child(html, head);
    for script in dom.find_all(head, |e| e.is("script")) {
        dom.remove(script);
    }
    if let Some(title) = title {
        set_title(dom, head, title);
    }
    let style = raw_text_element(dom, "style", assets::STYLE);
    dom.append_child(head, style);

    let body = dom.create_element_with(Element {
        name: "body".into(),
        attrs: body_attrs,
    });
    dom.append_child(html, body);
    let script = raw_text_element(dom, "script", assets::SCRIPT);
    dom.append_child(body, script);

    let mut wrapper = Element::new("div");
    wrapper.attrs.set("id", WRAPPER_ID);
    let wrapper = dom.create_element_with(wrapper);
    for turn in turns {
        dom.append_child(wrapper, turn.id);
    }
    dom.append_child(body, wrapper);

    root
}

fn raw_text_element(dom: &mut Dom, name: &str, content: &str) -> NodeId {
    let element = dom.create_element(name);
    dom.set_text(element, content);
    element
}

/// Replace the text of the head's first `<title>`, or add one.
fn set_title(dom: &mut Dom, head: NodeId, title: &str) {
    let existing = dom.find_first(head, |e| e.is("title"));
    let node = match existing {
        Some(node) => node,
        None => {
            let node = dom.create_element("title");
            dom.append_child(head, node);
            node
        }
    };
    dom.set_text(node, &escape_text(title));
}
