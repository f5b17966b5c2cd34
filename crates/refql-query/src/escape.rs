//! Escaping of query syntax characters.

/// Characters with a meaning in the query syntax.
const SYNTAX_CHARS: &[char] = &[
    '\\', '+', '-', '!', '(', ')', ':', '=', '^', '[', ']', '"', '{', '}', '~', '*', '?', '|',
    '&', '/', '#',
];

/// Backslash-escapes every syntax character and whitespace so `text` parses as one literal term.
///
/// ```
/// assert_eq!(refql_query::escape("a:b (c)"), r"a\:b\ \(c\)");
/// ```
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if SYNTAX_CHARS.contains(&ch) || ch.is_whitespace() {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Removes escaping backslashes, keeping the escaped characters.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => out.extend(chars.next()),
            _ => out.push(ch),
        }
    }
    out
}

/// Strips the surrounding quotes of a quoted-string image and unescapes its content.
pub fn unquote(image: &str) -> String {
    let inner = image
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(image);
    unescape(inner)
}

/// Escapes a term for serialization, also protecting words that would read as operators.
pub fn escape_term(text: &str) -> String {
    let is_keyword = ["AND", "OR", "NOT"]
        .iter()
        .any(|k| text.eq_ignore_ascii_case(k));
    if is_keyword {
        format!("\\{text}")
    } else {
        escape(text)
    }
}

/// Escapes the content of a phrase for serialization between double quotes.
pub fn escape_phrase(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
