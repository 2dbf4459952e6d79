use super::{Dom, Element, NodeId};

/// Elements whose content is raw text up to the matching end tag.
const RAW_TEXT: &[&str] = &["script", "style", "textarea", "title"];

/// Build a [`Dom`] from markup.
///
/// Never fails. Unclosed elements are closed at end of input, stray end tags
/// are ignored, and a `<` that does not start a tag is kept as text.
pub fn parse(html: &str) -> Dom {
    let mut dom = Dom::new();
    let mut stack = vec![dom.root()];
    let bytes = html.as_bytes();
    let mut text_start = 0usize;
    let mut i = 0usize;

    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }
        let Some((token, next)) = scan_markup(html, i) else {
            i += 1;
            continue;
        };

        let parent = current(&stack);
        push_text(&mut dom, parent, &html[text_start..i]);
        i = next;

        match token {
            Token::Comment(body) => {
                let node = dom.create_comment(body);
                dom.append_child(parent, node);
            }
            Token::Doctype(body) => {
                let node = dom.create_doctype(body);
                dom.append_child(parent, node);
            }
            Token::EndTag(name) => {
                if let Some(depth) = stack
                    .iter()
                    .skip(1)
                    .rposition(|id| dom.tag_name(*id) == Some(name.as_str()))
                {
                    stack.truncate(depth + 1);
                }
            }
            Token::StartTag {
                element,
                self_closing,
            } => {
                let name = element.name.clone();
                close_implied(&dom, &mut stack, &name);
                let parent = current(&stack);
                let node = dom.create_element_with(element);
                dom.append_child(parent, node);
                let opens = !self_closing && !is_void_element(&name);
                if opens && is_raw_text_element(&name) {
                    let (content_end, after) = find_raw_text_end(html, i, &name);
                    push_text(&mut dom, node, &html[i..content_end]);
                    i = after;
                } else if opens {
                    stack.push(node);
                }
            }
        }
        text_start = i;
    }

    let parent = current(&stack);
    push_text(&mut dom, parent, &html[text_start..]);
    dom
}

type Family = &'static [&'static str];

/// Open elements a start tag of `name` implicitly ends, and the elements
/// that stop the search for them.
fn implied_end(name: &str) -> Option<(Family, Family)> {
    const LIST: Family = &["ul", "ol", "menu"];
    const DEFS: Family = &["dl"];
    const TABLE: Family = &["table"];
    const ROW: Family = &["tr", "table"];
    const SELECT: Family = &["select", "datalist"];
    const P_SCOPE: Family = &["button", "table", "td", "th", "caption", "object", "template"];

    const ITEM: Family = &["li"];
    const TERM: Family = &["dt", "dd"];
    const ROW_CONTENT: Family = &["tr", "td", "th"];
    const CELL: Family = &["td", "th"];
    const SECTION: Family = &["thead", "tbody", "tfoot", "tr", "td", "th"];
    const OPTION: Family = &["option"];
    const GROUP: Family = &["option", "optgroup"];
    const PARAGRAPH: Family = &["p"];

    match name {
        "li" => Some((ITEM, LIST)),
        "dt" | "dd" => Some((TERM, DEFS)),
        "tr" => Some((ROW_CONTENT, TABLE)),
        "td" | "th" => Some((CELL, ROW)),
        "thead" | "tbody" | "tfoot" => Some((SECTION, TABLE)),
        "option" => Some((OPTION, SELECT)),
        "optgroup" => Some((GROUP, SELECT)),
        _ if closes_paragraph(name) => Some((PARAGRAPH, P_SCOPE)),
        _ => None,
    }
}

fn closes_paragraph(name: &str) -> bool {
    matches!(
        name,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "details"
            | "div"
            | "dl"
            | "fieldset"
            | "figcaption"
            | "figure"
            | "footer"
            | "form"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "header"
            | "hr"
            | "main"
            | "nav"
            | "ol"
            | "p"
            | "pre"
            | "section"
            | "table"
            | "ul"
    )
}

/// Pop the open elements whose optional end tag is implied by a start tag of
/// `name`: the outermost match below the nearest boundary, and everything
/// above it.
fn close_implied(dom: &Dom, stack: &mut Vec<NodeId>, name: &str) {
    let Some((closes, boundaries)) = implied_end(name) else {
        return;
    };
    let mut outermost = None;
    for depth in (1..stack.len()).rev() {
        let Some(open) = dom.tag_name(stack[depth]) else {
            continue;
        };
        if closes.contains(&open) {
            outermost = Some(depth);
        } else if boundaries.contains(&open) {
            break;
        }
    }
    if let Some(depth) = outermost {
        stack.truncate(depth);
    }
}

fn current(stack: &[NodeId]) -> NodeId {
    // The document root is never popped.
    stack[stack.len() - 1]
}

fn push_text(dom: &mut Dom, parent: NodeId, text: &str) {
    if !text.is_empty() {
        let node = dom.create_text(text);
        dom.append_child(parent, node);
    }
}

// ===================================================================
// Tokenizer
// ===================================================================

enum Token<'a> {
    StartTag { element: Element, self_closing: bool },
    EndTag(String),
    Comment(&'a str),
    Doctype(&'a str),
}

/// Scan one markup construct starting at the `<` at `at`. Returns the token
/// and the byte offset just past it, or `None` when the `<` is plain text.
fn scan_markup(html: &str, at: usize) -> Option<(Token<'_>, usize)> {
    let bytes = html.as_bytes();
    let rest = &html[at..];

    if rest.starts_with("<!--") {
        return Some(match rest[4..].find("-->") {
            Some(end) => (Token::Comment(&rest[4..4 + end]), at + 4 + end + 3),
            None => (Token::Comment(&rest[4..]), html.len()),
        });
    }
    if rest.starts_with("<!") {
        let end = rest.find('>').map_or(html.len(), |e| at + e);
        let body = &html[at + 2..end];
        let next = (end + 1).min(html.len());
        let doctype = body
            .as_bytes()
            .get(..7)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(b"doctype"));
        if doctype {
            return Some((Token::Doctype(body), next));
        }
        return Some((Token::Comment(body), next));
    }
    if rest.starts_with("<?") {
        let end = rest.find('>').map_or(html.len(), |e| at + e);
        return Some((Token::Comment(&html[at + 1..end]), (end + 1).min(html.len())));
    }
    if rest.starts_with("</") {
        if !bytes.get(at + 2).is_some_and(u8::is_ascii_alphabetic) {
            return None;
        }
        let name_end = scan_name(bytes, at + 2);
        let name = html[at + 2..name_end].to_ascii_lowercase();
        let close = html[name_end..].find('>')?;
        return Some((Token::EndTag(name), name_end + close + 1));
    }
    if !bytes.get(at + 1).is_some_and(u8::is_ascii_alphabetic) {
        return None;
    }
    scan_start_tag(html, at)
}

fn scan_start_tag(html: &str, at: usize) -> Option<(Token<'_>, usize)> {
    let bytes = html.as_bytes();
    let name_end = scan_name(bytes, at + 1);
    let mut element = Element::new(&html[at + 1..name_end]);
    let mut i = name_end;

    loop {
        skip_ws(bytes, &mut i);
        match bytes.get(i)? {
            b'>' => {
                return Some((
                    Token::StartTag {
                        element,
                        self_closing: false,
                    },
                    i + 1,
                ));
            }
            b'/' if bytes.get(i + 1) == Some(&b'>') => {
                return Some((
                    Token::StartTag {
                        element,
                        self_closing: true,
                    },
                    i + 2,
                ));
            }
            b'/' => {
                i += 1;
                continue;
            }
            _ => {}
        }

        let (name, value) = scan_attribute(html, &mut i)?;
        element.attrs.insert_if_absent(name, value);
    }
}

fn scan_attribute(html: &str, i: &mut usize) -> Option<(String, String)> {
    let bytes = html.as_bytes();
    let name_start = *i;
    // The first character is always consumed so a stray `=` cannot stall us.
    *i += 1;
    while let Some(b) = bytes.get(*i) {
        if b.is_ascii_whitespace() || matches!(b, b'/' | b'>' | b'=') {
            break;
        }
        *i += 1;
    }
    let name = html[name_start..*i].to_ascii_lowercase();

    let mut j = *i;
    skip_ws(bytes, &mut j);
    if bytes.get(j) != Some(&b'=') {
        return Some((name, String::new()));
    }
    j += 1;
    skip_ws(bytes, &mut j);

    let value = match bytes.get(j)? {
        quote @ (b'"' | b'\'') => {
            let start = j + 1;
            let len = html[start..].find(*quote as char)?;
            j = start + len + 1;
            html[start..start + len].to_string()
        }
        _ => {
            let start = j;
            while let Some(b) = bytes.get(j) {
                if b.is_ascii_whitespace() || *b == b'>' {
                    break;
                }
                j += 1;
            }
            html[start..j].to_string()
        }
    };
    *i = j;
    Some((name, value))
}

fn scan_name(bytes: &[u8], mut i: usize) -> usize {
    while let Some(b) = bytes.get(i) {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.') {
            i += 1;
        } else {
            break;
        }
    }
    i
}

fn skip_ws(bytes: &[u8], i: &mut usize) {
    while bytes.get(*i).is_some_and(u8::is_ascii_whitespace) {
        *i += 1;
    }
}

/// Locate `</name` (case-insensitive, followed by a non-name byte) at or
/// after `from`. Returns the content end and the offset past the end tag;
/// without an end tag the content runs to end of input.
fn find_raw_text_end(html: &str, from: usize, name: &str) -> (usize, usize) {
    let bytes = html.as_bytes();
    let needle = name.as_bytes();
    let mut i = from;
    while let Some(offset) = html[i..].find("</") {
        let start = i + offset;
        let name_start = start + 2;
        let name_end = name_start + needle.len();
        let matches_name = bytes
            .get(name_start..name_end)
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(needle));
        let terminated = bytes
            .get(name_end)
            .is_none_or(|b| !b.is_ascii_alphanumeric() && *b != b'-');
        if matches_name && terminated {
            let after = html[name_end..]
                .find('>')
                .map_or(html.len(), |e| name_end + e + 1);
            return (start, after);
        }
        i = start + 2;
    }
    (html.len(), html.len())
}

pub(super) fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

pub(super) fn is_raw_text_element(name: &str) -> bool {
    RAW_TEXT.contains(&name)
}
