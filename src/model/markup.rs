//! HTML fragment tokenizing.
//!
//! Rich-text editors emit HTML, not XML: void elements are never closed,
//! entities like `&nbsp;` appear freely and end tags occasionally come out of
//! order. The tokenizer is quick-xml with end-name checking off and unmatched
//! end tags allowed; the tree building here papers over the rest.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{Element, MarkupNode};

/// Elements that never have children or an end tag in HTML.
const VOID_ELEMENTS: &[&str] = &[
    "br", "img", "hr", "input", "meta", "link", "wbr", "col", "source", "area",
];

impl MarkupNode {
    /// Parse an HTML fragment into a tree rooted at a synthetic `body` element.
    ///
    /// Never fails. A `<` that cannot open a tag is text, end tags that
    /// match nothing are dropped, and if the tokenizer gives up (an
    /// unterminated tag or comment) the tree built so far is kept and the
    /// remaining input becomes text.
    pub fn parse_html(html: &str) -> MarkupNode {
        let escaped = escape_stray_lt(html);
        let html: &str = &escaped;
        let mut reader = Reader::from_str(html);
        let config = reader.config_mut();
        config.check_end_names = false;
        config.allow_unmatched_ends = true;

        // Open elements, innermost last. Index 0 is the synthetic root.
        let mut stack: Vec<Element> = vec![Element {
            tag: "body".to_string(),
            class: None,
            style: None,
            children: vec![],
        }];

        loop {
            let consumed = usize::try_from(reader.buffer_position()).unwrap_or(html.len());
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let element = element_from(&e);
                    if VOID_ELEMENTS.contains(&element.tag.as_str()) {
                        append(&mut stack, MarkupNode::Element(element));
                    } else {
                        stack.push(element);
                    }
                }
                Ok(Event::Empty(e)) => {
                    append(&mut stack, MarkupNode::Element(element_from(&e)));
                }
                Ok(Event::End(e)) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase();
                    close(&mut stack, &name);
                }
                Ok(Event::Text(e)) => {
                    let raw = String::from_utf8_lossy(&e);
                    append(&mut stack, MarkupNode::text(&decode_entities(&raw)));
                }
                Ok(Event::CData(e)) => {
                    let raw = String::from_utf8_lossy(&e);
                    append(&mut stack, MarkupNode::text(&raw));
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    log::debug!("markup tokenizing stopped at byte {}: {}", consumed, e);
                    // Keep the `<` that opened the failed markup.
                    let from = if consumed > 0 && html.as_bytes().get(consumed - 1) == Some(&b'<') {
                        consumed - 1
                    } else {
                        consumed
                    };
                    let rest = html.get(from..).unwrap_or_default();
                    if !rest.is_empty() {
                        append(&mut stack, MarkupNode::text(&decode_entities(rest)));
                    }
                    break;
                }
            }
        }

        // Close whatever the fragment left open.
        while stack.len() > 1 {
            close_innermost(&mut stack);
        }
        let root = stack.pop().unwrap_or(Element {
            tag: "body".to_string(),
            class: None,
            style: None,
            children: vec![],
        });
        MarkupNode::Element(root)
    }
}

/// HTML reads a `<` that cannot open a tag as text. Escape those so the
/// tokenizer does not take `a < b > c` for an element.
fn escape_stray_lt(html: &str) -> Cow<'_, str> {
    let opens_markup = |next: Option<&u8>| {
        matches!(next, Some(b) if b.is_ascii_alphabetic() || matches!(b, b'/' | b'!' | b'?'))
    };
    let bytes = html.as_bytes();
    let stray = |i: usize| bytes[i] == b'<' && !opens_markup(bytes.get(i + 1));
    if !(0..bytes.len()).any(stray) {
        return Cow::Borrowed(html);
    }
    let mut out = String::with_capacity(html.len() + 8);
    for (i, ch) in html.char_indices() {
        if ch == '<' && stray(i) {
            out.push_str("&lt;");
        } else {
            out.push(ch);
        }
    }
    Cow::Owned(out)
}

fn element_from(e: &BytesStart) -> Element {
    Element {
        tag: String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase(),
        class: get_attr(e, "class"),
        style: get_attr(e, "style"),
        children: vec![],
    }
}

fn get_attr(e: &BytesStart, name: &str) -> Option<String> {
    for attr in e.html_attributes().flatten() {
        if attr.key.as_ref().eq_ignore_ascii_case(name.as_bytes()) {
            return String::from_utf8(attr.value.to_vec())
                .ok()
                .map(|v| decode_entities(&v));
        }
    }
    None
}

fn append(stack: &mut [Element], node: MarkupNode) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

fn close_innermost(stack: &mut Vec<Element>) {
    if let Some(done) = stack.pop() {
        append(stack, MarkupNode::Element(done));
    }
}

/// Close `name` and everything opened inside it. An end tag with no
/// matching open element is dropped.
fn close(stack: &mut Vec<Element>, name: &str) {
    let Some(pos) = stack.iter().rposition(|el| el.tag == name) else {
        return;
    };
    if pos == 0 {
        return;
    }
    while stack.len() > pos {
        close_innermost(stack);
    }
}

/// Decode the named entities editors actually emit plus numeric references.
/// Unknown entities are left verbatim.
fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').filter(|&end| end <= 10).and_then(|end| {
            let entity = &tail[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ => {
                    let code = if let Some(hex) =
                        entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X"))
                    {
                        u32::from_str_radix(hex, 16).ok()
                    } else {
                        entity.strip_prefix('#').and_then(|dec| dec.parse::<u32>().ok())
                    };
                    code.and_then(char::from_u32)
                }
            };
            ch.map(|c| (c, end))
        });
        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn children(node: &MarkupNode) -> &[MarkupNode] {
        match node {
            MarkupNode::Element(el) => &el.children,
            _ => panic!("expected element"),
        }
    }

    fn tag(node: &MarkupNode) -> &str {
        match node {
            MarkupNode::Element(el) => &el.tag,
            _ => panic!("expected element"),
        }
    }

    #[test]
    fn parses_nested_inline_markup() {
        let root = MarkupNode::parse_html("<p>Hello <b>world</b></p>");
        assert_eq!(tag(&root), "body");
        let p = &children(&root)[0];
        assert_eq!(tag(p), "p");
        assert_eq!(children(p)[0], MarkupNode::text("Hello "));
        assert_eq!(tag(&children(p)[1]), "b");
    }

    #[test]
    fn void_elements_do_not_swallow_siblings() {
        let root = MarkupNode::parse_html("<p>a<br>b<img src=\"x.png\">c</p>");
        let p = &children(&root)[0];
        let kids = children(p);
        assert_eq!(kids.len(), 5);
        assert_eq!(tag(&kids[1]), "br");
        assert_eq!(kids[2], MarkupNode::text("b"));
        assert_eq!(tag(&kids[3]), "img");
    }

    #[test]
    fn keeps_class_and_style() {
        let root = MarkupNode::parse_html(
            "<p class=\"ql-align-center\" style=\"color: red\">x</p>",
        );
        match &children(&root)[0] {
            MarkupNode::Element(el) => {
                assert_eq!(el.class.as_deref(), Some("ql-align-center"));
                assert_eq!(el.style.as_deref(), Some("color: red"));
            }
            _ => panic!("expected element"),
        }
    }

    #[test]
    fn tolerates_unclosed_and_misordered_tags() {
        let root = MarkupNode::parse_html("<p><b>bold <i>both</b> tail</p><p>open");
        let kids = children(&root);
        assert_eq!(kids.len(), 2);
        assert_eq!(kids[1].text_content(), "open");
        assert_eq!(kids[0].text_content(), "bold both tail");
    }

    #[test]
    fn stray_end_tag_is_ignored() {
        let root = MarkupNode::parse_html("a</div>b");
        assert_eq!(root.text_content(), "ab");
    }

    #[test]
    fn repeated_end_tag_keeps_paragraph() {
        let root = MarkupNode::parse_html("<p>a</p></p>");
        let kids = children(&root);
        assert_eq!(kids.len(), 1);
        assert_eq!(tag(&kids[0]), "p");
        assert_eq!(root.text_content(), "a");
    }

    #[test]
    fn bare_less_than_becomes_text() {
        let root = MarkupNode::parse_html("a < b");
        assert_eq!(root.text_content(), "a < b");
    }

    #[test]
    fn less_than_before_later_tag_stays_text() {
        let root = MarkupNode::parse_html("<p>x < 16 and y > 2</p><p>next</p>");
        let kids = children(&root);
        assert_eq!(kids.len(), 2);
        assert_eq!(kids[0].text_content(), "x < 16 and y > 2");
        assert_eq!(kids[1].text_content(), "next");
    }

    #[test]
    fn text_after_tokenizer_error_is_kept() {
        let root = MarkupNode::parse_html("<p>one</p>two <b");
        let kids = children(&root);
        assert_eq!(tag(&kids[0]), "p");
        assert_eq!(root.text_content(), "onetwo <b");
    }

    #[test]
    fn unquoted_attribute_values() {
        let root = MarkupNode::parse_html("<p class=ql-align-center>x</p>");
        match &children(&root)[0] {
            MarkupNode::Element(el) => assert_eq!(el.class.as_deref(), Some("ql-align-center")),
            _ => panic!("expected element"),
        }
    }

    #[test]
    fn decodes_entities() {
        assert_eq!(decode_entities("a&nbsp;b &amp; c"), "a b & c");
        assert_eq!(decode_entities("&#65;&#x42;"), "AB");
        assert_eq!(decode_entities("fish & chips"), "fish & chips");
        assert_eq!(decode_entities("&unknown;"), "&unknown;");
    }

    #[test]
    fn uppercase_tags_are_normalized() {
        let root = MarkupNode::parse_html("<P>x</P>");
        assert_eq!(tag(&children(&root)[0]), "p");
    }
}
