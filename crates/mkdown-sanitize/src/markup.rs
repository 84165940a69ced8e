//! HTML serialization helpers shared by the tree-walking serializers.

/// Elements serialized without a closing tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose first newline is dropped by the HTML parser.
pub const LEADING_NEWLINE_ELEMENTS: &[&str] = &["listing", "pre", "textarea"];

/// Elements whose content is raw text rather than markup.
pub const RAW_TEXT_ELEMENTS: &[&str] = &[
    "iframe", "noembed", "noframes", "plaintext", "script", "style", "xmp",
];

/// Escape `text` for use as element content.
pub fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

/// Escape `value` for use inside a double-quoted attribute.
pub fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

/// Re-insert the newline the parser drops after `<pre>`, `<textarea>` and
/// `<listing>` start tags.
///
/// A serializer that writes the content right after the start tag loses one
/// leading newline per parse, so content starting with `\n` gets an extra
/// one. `html` must be serializer output: attributes double-quoted and `<`
/// escaped in text.
#[must_use]
pub fn restore_leading_newlines(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];

        let Some(end) = tag_end(rest) else {
            break;
        };
        let tag = &rest[..end];
        out.push_str(tag);
        rest = &rest[end..];

        let name = start_tag_name(tag);
        if LEADING_NEWLINE_ELEMENTS.contains(&name.as_str()) && rest.starts_with('\n') {
            out.push('\n');
        } else if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            let close = format!("</{name}");
            let raw_end = rest.to_ascii_lowercase().find(&close).unwrap_or(rest.len());
            out.push_str(&rest[..raw_end]);
            rest = &rest[raw_end..];
        }
    }
    out.push_str(rest);
    out
}

/// Byte length of the tag at the start of `html`, honoring quoted attributes.
fn tag_end(html: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in html.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return Some(i + 1),
            (None, _) => {}
        }
    }
    None
}

/// Lowercased element name of a start tag, or an empty string for anything
/// else (end tags, comments, doctypes).
fn start_tag_name(tag: &str) -> String {
    tag.trim_start_matches('<')
        .chars()
        .take_while(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_ascii_lowercase()
}
