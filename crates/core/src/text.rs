//! Plain-text to HTML conversion for user-submitted comment bodies.

/// Render `text` as HTML paragraphs, one per non-blank line, with markup and
/// quote characters escaped.
pub fn text_to_html(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| format!("<p>{}</p>", escape(line)))
        .collect()
}

fn escape(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    for c in line.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_are_dropped() {
        assert_eq!(text_to_html("one\n\n  \ntwo"), "<p>one</p><p>two</p>");
    }

    #[test]
    fn markup_is_escaped() {
        assert_eq!(
            text_to_html("<script>a & b</script>"),
            "<p>&lt;script&gt;a &amp; b&lt;/script&gt;</p>"
        );
    }

    #[test]
    fn quotes_are_escaped() {
        assert_eq!(
            text_to_html(r#"say "hi" it's <b>"#),
            "<p>say &quot;hi&quot; it&#x27;s &lt;b&gt;</p>"
        );
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert_eq!(text_to_html(""), "");
    }
}
