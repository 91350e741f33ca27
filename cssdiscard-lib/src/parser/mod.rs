pub mod css_parse;

pub use css_parse::{parse, parse_file};

use crate::tree::css_tree::NodeRef;

/// Print a tree back to stylesheet text.
pub fn serialize(root: &NodeRef) -> String {
    root.borrow().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_serialize_layout() {
        let root = parse(
            "@charset \"utf-8\";html,body{margin:0;padding:0}@media print{h1{color:#000}}",
        )
        .unwrap();
        let expected = r#"@charset "utf-8";

html, body {
  margin: 0;
  padding: 0;
}

@media print {
  h1 {
    color: #000;
  }
}
"#;
        assert_eq!(serialize(&root), expected);
    }

    #[test]
    fn test_serialize_is_stable() {
        let once = serialize(&parse("a{color:red}@font-face{font-family:'X'}").unwrap());
        let twice = serialize(&parse(&once).unwrap());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_stylesheet() {
        assert_eq!(serialize(&parse("").unwrap()), "");
    }
}
