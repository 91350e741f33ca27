use crate::tree::css_tree::Node;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};

/// Comparison-safe form of `text`.
///
/// Declarations go through [`canonicalize`] first; selector and at-rule
/// context only gets quote unification and trimming, so it has to match
/// structurally.
pub fn normalize(text: &str, declaration: bool) -> String {
    let text = if declaration {
        canonicalize(text)
    } else {
        text.to_string()
    };
    unify_quotes(text.trim())
}

/// Normalized `prop: value` text of a declaration node.
pub fn declaration_key(node: &Node) -> Option<String> {
    node.as_declaration()
        .map(|decl| normalize(&decl.to_text(), true))
}

/// Minify a single declaration body (`color: #000000` -> `color:#000`).
///
/// The declaration is wrapped in a throwaway rule and run through
/// lightningcss. Text lightningcss rejects or drops falls back to
/// whitespace-collapsed input so the result is always defined.
pub fn canonicalize(declaration: &str) -> String {
    match minify_declaration(declaration) {
        Some(minified) if !minified.is_empty() => minified,
        _ => collapse_whitespace(declaration),
    }
}

fn minify_declaration(declaration: &str) -> Option<String> {
    let wrapped = format!("a{{{}}}", declaration);
    let mut sheet = StyleSheet::parse(&wrapped, ParserOptions::default()).ok()?;
    sheet.minify(MinifyOptions::default()).ok()?;
    let printed = sheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .ok()?;
    let body = printed.code.strip_prefix("a{")?.strip_suffix('}')?;
    Some(body.to_string())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Rewrites every string token with single-quote delimiters.
///
/// Escaped quotes inside a string are unescaped first and only `'` is
/// escaped again, so `"a \"b\""` and `'a "b"'` come out the same.
/// An unterminated string is copied as is.
fn unify_quotes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices();
    while let Some((start, c)) = chars.next() {
        if c == '\\' {
            out.push(c);
            if let Some((_, escaped)) = chars.next() {
                out.push(escaped);
            }
            continue;
        }
        if c != '"' && c != '\'' {
            out.push(c);
            continue;
        }

        let mut content = String::new();
        let mut closed = false;
        while let Some((_, inner)) = chars.next() {
            match inner {
                '\\' => match chars.next() {
                    Some((_, quote @ ('"' | '\''))) => content.push(quote),
                    Some((_, other)) => {
                        content.push('\\');
                        content.push(other);
                    }
                    None => content.push('\\'),
                },
                _ if inner == c => {
                    closed = true;
                    break;
                }
                _ => content.push(inner),
            }
        }

        if !closed {
            out.push_str(&text[start..]);
            break;
        }
        out.push('\'');
        out.push_str(&content.replace('\'', "\\'"));
        out.push('\'');
    }
    out
}
