//! Resume Highlighter: HTML-escaped resume text with matched keywords wrapped in `<mark>`.
//!
//! Unlike the scorer, a highlight only lands on whole words: the match must start at the
//! beginning of the text or after a non-alphanumeric character, and end at the end of the
//! text or before one. Scanning is left to right and never overlaps.

const MARK_OPEN: &str = "<mark>";
const MARK_CLOSE: &str = "</mark>";

/// Escapes `& < > " '` for safe embedding in HTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        push_escaped(&mut out, c);
    }
    out
}

/// Renders `text` as escaped markup with every boundary-respecting keyword match marked.
pub fn highlight<S: AsRef<str>>(text: &str, keywords: &[S]) -> String {
    let mut needles: Vec<Vec<char>> = keywords
        .iter()
        .map(|k| k.as_ref().trim())
        .filter(|k| !k.is_empty())
        .map(|k| k.chars().collect())
        .collect();

    if text.is_empty() || needles.is_empty() {
        return escape_html(text);
    }

    // Longest keyword wins at any given position.
    needles.sort_by(|a, b| b.len().cmp(&a.len()));

    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 16);
    let mut i = 0;

    while i < chars.len() {
        let starts_word = i == 0 || !chars[i - 1].is_alphanumeric();
        let hit = if starts_word {
            needles.iter().find(|n| matches_at(&chars, i, n))
        } else {
            None
        };

        match hit {
            Some(needle) => {
                out.push_str(MARK_OPEN);
                for &c in &chars[i..i + needle.len()] {
                    push_escaped(&mut out, c);
                }
                out.push_str(MARK_CLOSE);
                i += needle.len();
            }
            None => {
                push_escaped(&mut out, chars[i]);
                i += 1;
            }
        }
    }

    out
}

fn matches_at(chars: &[char], start: usize, needle: &[char]) -> bool {
    let end = start + needle.len();
    if end > chars.len() {
        return false;
    }
    let same = chars[start..end]
        .iter()
        .zip(needle)
        .all(|(&a, &b)| chars_eq_ignore_case(a, b));
    same && (end == chars.len() || !chars[end].is_alphanumeric())
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#39;"),
        _ => out.push(c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_all_metacharacters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn test_email_and_script_example() {
        let out = highlight("Email sales@x.com <script>", &["sales"]);
        assert_eq!(out, "Email <mark>sales</mark>@x.com &lt;script&gt;");
        let stripped = out.replace(MARK_OPEN, "").replace(MARK_CLOSE, "");
        assert!(!stripped.contains('<'));
        assert!(!stripped.contains('>'));
    }

    #[test]
    fn test_no_partial_word_highlight() {
        let out = highlight("JavaScript and Java", &["java"]);
        assert_eq!(out, "JavaScript and <mark>Java</mark>");
    }

    #[test]
    fn test_case_insensitive_preserves_original_case() {
        let out = highlight("Knows SQL, sql and Sql.", &["sql"]);
        assert_eq!(
            out,
            "Knows <mark>SQL</mark>, <mark>sql</mark> and <mark>Sql</mark>."
        );
    }

    #[test]
    fn test_multi_word_keyword() {
        let out = highlight("Led project planning for Q3", &["Project Planning"]);
        assert_eq!(out, "Led <mark>project planning</mark> for Q3");
    }

    #[test]
    fn test_longest_keyword_wins_without_overlap() {
        let out = highlight("node.js developer", &["node", "node.js"]);
        assert_eq!(out, "<mark>node.js</mark> developer");
    }

    #[test]
    fn test_keyword_with_metacharacters_is_escaped_inside_mark() {
        let out = highlight("R&D lead", &["R&D"]);
        assert_eq!(out, "<mark>R&amp;D</mark> lead");
    }

    #[test]
    fn test_empty_inputs_return_escaped_text() {
        let none: [&str; 0] = [];
        assert_eq!(highlight("a < b", &none), "a &lt; b");
        assert_eq!(highlight("a < b", &["", "  "]), "a &lt; b");
        assert_eq!(highlight("", &["sql"]), "");
    }

    #[test]
    fn test_non_ascii_text() {
        let out = highlight("Café Python résumé", &["python"]);
        assert_eq!(out, "Café <mark>Python</mark> résumé");
    }
}
