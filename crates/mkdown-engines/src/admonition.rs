//! `MkDocs` admonition pre-processing.
//!
//! Rewrites
//!
//! ```text
//! !!! warning "Careful"
//!     Indented body
//! ```
//!
//! into a GitHub alert blockquote that both backends render natively:
//!
//! ```text
//! > [!WARNING] Careful
//! > Indented body
//! ```

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static ADMONITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^!!! (\w+)(?:[ \t]+"([^"\n]*)")?[ \t]*\n((?:(?:[ \t]*\n)*    .*(?:\n|$))*)"#)
        .expect("admonition pattern is valid")
});

/// Map an admonition type onto one of the five alert kinds.
fn alert_kind(kind: &str) -> &'static str {
    match kind.to_ascii_lowercase().as_str() {
        "tip" | "hint" => "TIP",
        "important" => "IMPORTANT",
        "warning" | "caution" => "WARNING",
        "danger" | "error" => "CAUTION",
        _ => "NOTE",
    }
}

/// Convert every `!!!` admonition in `markdown` to an alert blockquote.
///
/// The body is every following line indented by four spaces. Blank lines
/// stay inside the body only when more indented lines follow them.
///
/// Returns the input unchanged (borrowed) when it holds no admonition.
pub fn convert_admonitions(markdown: &str) -> Cow<'_, str> {
    if !markdown.contains("!!! ") {
        return Cow::Borrowed(markdown);
    }
    ADMONITION_RE.replace_all(markdown, |caps: &Captures<'_>| {
        let mut out = format!("> [!{}]", alert_kind(&caps[1]));
        if let Some(title) = caps.get(2).map(|m| m.as_str()).filter(|t| !t.is_empty()) {
            out.push(' ');
            out.push_str(title);
        }
        out.push('\n');

        let body = &caps[3];
        for line in body.strip_suffix('\n').unwrap_or(body).split('\n') {
            let line = line.strip_prefix("    ").unwrap_or(line);
            if line.trim().is_empty() {
                out.push_str(">\n");
            } else {
                out.push_str("> ");
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_plain_markdown_is_borrowed() {
        let input = "# Title\n\nNo admonitions here.\n";
        assert!(matches!(convert_admonitions(input), Cow::Borrowed(_)));
    }

    #[test]
    fn test_admonition_with_title() {
        let input = "!!! warning \"Careful\"\n    First line\n    Second line\n";

        assert_eq!(
            convert_admonitions(input),
            "> [!WARNING] Careful\n> First line\n> Second line\n"
        );
    }

    #[test]
    fn test_admonition_type_mapping() {
        let cases = [
            ("note", "NOTE"),
            ("info", "NOTE"),
            ("tip", "TIP"),
            ("hint", "TIP"),
            ("important", "IMPORTANT"),
            ("warning", "WARNING"),
            ("caution", "WARNING"),
            ("danger", "CAUTION"),
            ("error", "CAUTION"),
            ("abstract", "NOTE"),
        ];
        for (kind, expected) in cases {
            let converted = convert_admonitions(&format!("!!! {kind}\n    Body\n")).into_owned();
            assert_eq!(converted, format!("> [!{expected}]\n> Body\n"), "type {kind}");
        }
    }

    #[test]
    fn test_blank_body_lines_and_following_paragraph() {
        let input = "Intro\n\n!!! note\n    One\n\n    Two\n\nAfter\n";

        assert_eq!(
            convert_admonitions(input),
            "Intro\n\n> [!NOTE]\n> One\n>\n> Two\n\nAfter\n"
        );
    }

    #[test]
    fn test_body_at_end_of_input_without_newline() {
        assert_eq!(convert_admonitions("!!! tip\n    Last"), "> [!TIP]\n> Last\n");
    }
}
