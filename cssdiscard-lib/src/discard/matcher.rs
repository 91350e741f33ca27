use crate::error::{BoxError, DiscardError};
use crate::tree::css_tree::Node;
use regex::Regex;
use std::fmt;
use std::rc::Rc;

/// User supplied matcher, called with the node under test and the string being checked.
pub type Predicate = Rc<dyn Fn(&Node, &str) -> Result<bool, BoxError>>;

/// One ignore pattern.
#[derive(Clone)]
pub enum Pattern {
    /// Matches by exact string equality.
    Literal(String),
    /// Matches when the expression finds a match, except in strict mode.
    Regex(Regex),
    /// Matches when the closure returns `Ok(true)`; an `Err` aborts the run.
    Predicate(Predicate),
}

impl Pattern {
    pub fn literal(value: impl Into<String>) -> Self {
        Pattern::Literal(value.into())
    }

    pub fn regex(source: &str) -> Result<Self, DiscardError> {
        Ok(Pattern::Regex(Regex::new(source)?))
    }

    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&Node, &str) -> Result<bool, BoxError> + 'static,
    {
        Pattern::Predicate(Rc::new(predicate))
    }

    /// Command line form: `/source/flags` is a regular expression, anything else a literal.
    ///
    /// Flags `i`, `m`, `s` and `x` become inline flags; `g` and `u` are accepted and ignored.
    /// An empty expression (`//`) is taken literally rather than matching everything.
    pub fn from_cli(arg: &str) -> Result<Self, DiscardError> {
        if let Some(body) = arg.strip_prefix('/') {
            if let Some(end) = body.rfind('/').filter(|&end| end > 0) {
                let (source, flags) = (&body[..end], &body[end + 1..]);
                if flags.chars().all(|c| "imsxgu".contains(c)) {
                    let inline: String = flags.chars().filter(|c| "imsx".contains(*c)).collect();
                    return if inline.is_empty() {
                        Pattern::regex(source)
                    } else {
                        Pattern::regex(&format!("(?{}){}", inline, source))
                    };
                }
            }
        }
        Ok(Pattern::literal(arg))
    }

    fn is_match(&self, node: &Node, value: &str, strict: bool) -> Result<bool, DiscardError> {
        match self {
            Pattern::Predicate(predicate) => predicate(node, value).map_err(DiscardError::Predicate),
            Pattern::Regex(regex) => Ok(!strict && regex.is_match(value)),
            Pattern::Literal(literal) => Ok(literal == value),
        }
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Literal(literal) => f.debug_tuple("Literal").field(literal).finish(),
            Pattern::Regex(regex) => f.debug_tuple("Regex").field(&regex.as_str()).finish(),
            Pattern::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<&str> for Pattern {
    fn from(value: &str) -> Self {
        Pattern::literal(value)
    }
}

impl From<String> for Pattern {
    fn from(value: String) -> Self {
        Pattern::Literal(value)
    }
}

impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self {
        Pattern::Regex(regex)
    }
}

/// Ordered list of patterns; any match wins.
#[derive(Clone, Debug, Default)]
pub struct PatternSet(Vec<Pattern>);

impl PatternSet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.0.iter()
    }
}

impl From<Pattern> for PatternSet {
    fn from(pattern: Pattern) -> Self {
        PatternSet(vec![pattern])
    }
}

impl From<&str> for PatternSet {
    fn from(value: &str) -> Self {
        PatternSet::from(Pattern::literal(value))
    }
}

impl From<Regex> for PatternSet {
    fn from(regex: Regex) -> Self {
        PatternSet::from(Pattern::Regex(regex))
    }
}

impl From<Vec<Pattern>> for PatternSet {
    fn from(patterns: Vec<Pattern>) -> Self {
        PatternSet(patterns)
    }
}

impl FromIterator<Pattern> for PatternSet {
    fn from_iter<T: IntoIterator<Item = Pattern>>(iter: T) -> Self {
        PatternSet(iter.into_iter().collect())
    }
}

/// True if any pattern in `patterns` matches `value`.
///
/// With `strict` set, regular expressions never match; literals and
/// predicates still do. Used for at-rule names and property names.
pub fn matches(
    node: &Node,
    value: &str,
    patterns: &PatternSet,
    strict: bool,
) -> Result<bool, DiscardError> {
    for pattern in patterns.iter() {
        if pattern.is_match(node, value, strict)? {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::css_tree::new_declaration;
    use std::cell::Cell;

    fn decl() -> crate::tree::css_tree::NodeRef {
        new_declaration("color".to_string(), "red".to_string())
    }

    #[test]
    fn test_literal_is_exact() {
        let node = decl();
        let patterns = PatternSet::from("color");
        assert!(matches(&node.borrow(), "color", &patterns, true).unwrap());
        assert!(!matches(&node.borrow(), "background-color", &patterns, false).unwrap());
    }

    #[test]
    fn test_strict_disables_regex() {
        let node = decl();
        let patterns = PatternSet::from(Regex::new("col").unwrap());
        assert!(matches(&node.borrow(), "color", &patterns, false).unwrap());
        assert!(!matches(&node.borrow(), "color", &patterns, true).unwrap());
    }

    #[test]
    fn test_predicate_runs_in_strict_mode() {
        let node = decl();
        let patterns = PatternSet::from(Pattern::predicate(|node, value| {
            Ok(node.as_declaration().is_some() && value == "color")
        }));
        assert!(matches(&node.borrow(), "color", &patterns, true).unwrap());
        assert!(!matches(&node.borrow(), "red", &patterns, true).unwrap());
    }

    #[test]
    fn test_first_match_wins() {
        let node = decl();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let patterns: PatternSet = vec![
            Pattern::literal("red"),
            Pattern::predicate(move |_, _| {
                counter.set(counter.get() + 1);
                Ok(false)
            }),
        ]
        .into();
        assert!(matches(&node.borrow(), "red", &patterns, false).unwrap());
        assert_eq!(calls.get(), 0);
        assert!(!matches(&node.borrow(), "blue", &patterns, false).unwrap());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_predicate_error_propagates() {
        let node = decl();
        let patterns = PatternSet::from(Pattern::predicate(|_, _| Err("boom".into())));
        let err = matches(&node.borrow(), "color", &patterns, false).unwrap_err();
        assert!(matches!(err, DiscardError::Predicate(_)));
    }

    #[test]
    fn test_from_cli() {
        assert!(matches!(Pattern::from_cli("@font-face").unwrap(), Pattern::Literal(_)));
        assert!(matches!(Pattern::from_cli("/body/").unwrap(), Pattern::Regex(_)));
        match Pattern::from_cli("/PRINT/i").unwrap() {
            Pattern::Regex(regex) => assert!(regex.is_match("only print")),
            other => panic!("expected a regex, got {:?}", other),
        }
        // An unknown flag means it was never meant as a regex.
        assert!(matches!(Pattern::from_cli("/a/b").unwrap(), Pattern::Literal(_)));
        match Pattern::from_cli("//").unwrap() {
            Pattern::Literal(literal) => assert_eq!(literal, "//"),
            other => panic!("expected a literal, got {:?}", other),
        }
        assert!(matches!(Pattern::from_cli("//i").unwrap(), Pattern::Literal(_)));
        assert!(matches!(
            Pattern::from_cli("/(/").unwrap_err(),
            DiscardError::InvalidPattern(_)
        ));
    }
}
