use cssdiscard_lib::parser::{parse, serialize};
use cssdiscard_lib::{discard, prune, DiscardError, DiscardOptions, Pattern, PatternSet};
use pretty_assertions::assert_eq;
use regex::Regex;

const STYLES: &str = r#"
html,body {
  margin: 0;
  padding: 0;
}

@font-face {
  font-family: 'Glyphicons Halflings';
}

.my.awesome.selector {
  width: 100%;
  background: url('/myImage.jpg');
}

main h1 > p {
  font-size: 1.2rem;
}

@media only screen and (max-width: 768px) {
  .test {
    display: block;
  }

  main h1 > p {
    font-size: 1rem;
  }
}

@media only print {
  h1 {
    color: #000;
  }
}

@supports not (font-variation-settings: 'XHGT' 0.7) {
  .testa {
    display: block;
  }
  @media only screen and (max-width: 768px) {
    .testa {
      display: none;
    }
  }
}
"#;

fn regex(source: &str) -> Regex {
    Regex::new(source).unwrap()
}

fn run(options: DiscardOptions) -> String {
    discard(STYLES, &options).unwrap()
}

#[test]
fn test_returns_unchanged_css() {
    let untouched = serialize(&parse(STYLES).unwrap());
    assert_eq!(run(DiscardOptions::new()), untouched);
}

#[test]
fn test_removes_supports_at_rule() {
    let css = run(DiscardOptions::new().with_atrule(vec![Pattern::literal("@supports")]));
    assert!(css.contains("@font-face"));
    assert!(css.contains("font-family: 'Glyphicons Halflings'"));
    assert!(css.contains("html"));
    assert!(css.contains(".my.awesome.selector"));
    assert!(css.contains("main h1 > p"));
    assert!(css.contains(".test"));
    assert!(css.contains("only print"));
    assert!(!css.contains("@supports"));
    assert!(!css.contains(".testa"));
}

#[test]
fn test_removes_font_face_at_rule() {
    let css = run(DiscardOptions::new().with_atrule("@font-face"));
    assert!(!css.contains("@font-face"));
    assert!(!css.contains("Glyphicons Halflings"));
    assert!(css.contains("html"));
    assert!(css.contains(".my.awesome.selector"));
    assert!(css.contains("main h1 > p"));
    assert!(css.contains(".test"));
    assert!(css.contains("only print"));
}

#[test]
fn test_rule_regex_only_drops_matching_selector() {
    let css = run(DiscardOptions::new().with_rule(regex("body")));
    assert!(!css.contains("body"));
    assert!(css.contains("html {\n  margin: 0;\n  padding: 0;\n}"));
    assert!(css.contains("font-face"));
    assert!(css.contains(".my.awesome.selector"));
    assert!(css.contains("main h1 > p"));
    assert!(css.contains(".test"));
    assert!(css.contains("only print"));
}

#[test]
fn test_removes_everything() {
    assert_eq!(run(DiscardOptions::new().with_decl(regex(".*"))), "");
}

#[test]
fn test_removes_all_rules() {
    assert_eq!(
        run(DiscardOptions::new().with_rule(regex(".*"))),
        "@font-face {\n  font-family: 'Glyphicons Halflings';\n}\n"
    );
}

#[test]
fn test_removes_media_queries_by_params() {
    let expected = r#"html, body {
  margin: 0;
  padding: 0;
}

@font-face {
  font-family: 'Glyphicons Halflings';
}

.my.awesome.selector {
  width: 100%;
  background: url('/myImage.jpg');
}

main h1 > p {
  font-size: 1.2rem;
}

@media only print {
  h1 {
    color: #000;
  }
}

@supports not (font-variation-settings: 'XHGT' 0.7) {
  .testa {
    display: block;
  }
}
"#;
    assert_eq!(
        run(DiscardOptions::new().with_atrule(regex("max-width: 768px"))),
        expected
    );
}

#[test]
fn test_removes_declarations_by_predicate() {
    let filter = Pattern::predicate(|node, value| {
        let width = node
            .as_declaration()
            .map_or(false, |decl| decl.property == "width");
        Ok(width || value == "url('/myImage.jpg')")
    });
    let css = run(DiscardOptions::new().with_decl(filter));
    assert!(css.contains("body"));
    assert!(css.contains("html"));
    assert!(css.contains("font-face"));
    assert!(!css.contains(".my.awesome.selector"));
    assert!(css.contains("main h1 > p"));
    assert!(css.contains(".test"));
    assert!(css.contains("only print"));
    assert!(css.contains("@supports not (font-variation-setting"));
}

#[test]
fn test_removes_font_face_and_print() {
    let atrules: PatternSet = vec![Pattern::literal("@font-face"), Pattern::from(regex("print"))].into();
    let css = run(DiscardOptions::new().with_atrule(atrules));
    assert!(css.contains("body"));
    assert!(css.contains("html"));
    assert!(!css.contains("font-face"));
    assert!(!css.contains("@media only print"));
    assert!(!css.contains("color: #000"));
    assert!(!css.contains("Glyphicons Halflings"));
    assert!(css.contains("main h1 > p"));
    assert!(css.contains(".test"));
    assert!(css.contains("@supports not (font-variation-setting"));
}

#[test]
fn test_pruning_is_idempotent() {
    let options = DiscardOptions::new()
        .with_rule(regex("^\\.test$"))
        .with_decl("font-size");
    let once = run(options.clone());
    let twice = discard(&once, &options).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_predicate_failure_produces_no_output() {
    let options = DiscardOptions::new()
        .with_atrule(Pattern::predicate(|_, _| Err("refusing to look at at-rules".into())));
    let err = discard(STYLES, &options).unwrap_err();
    assert!(matches!(err, DiscardError::Predicate(_)));
}

#[test]
fn test_malformed_input_is_a_parse_error() {
    let err = discard("a { color: red } b", &DiscardOptions::new()).unwrap_err();
    assert!(matches!(err, DiscardError::Parse { .. }));
}

#[test]
fn test_ie_hacks_survive_and_can_be_discarded() {
    let css_text = ".clearfix { *zoom: 1; color: red }";
    assert_eq!(
        discard(css_text, &DiscardOptions::new()).unwrap(),
        ".clearfix {\n  *zoom: 1;\n  color: red;\n}\n"
    );
    assert_eq!(
        discard(css_text, &DiscardOptions::new().with_decl("*zoom")).unwrap(),
        ".clearfix {\n  color: red;\n}\n"
    );
}

#[test]
fn test_prune_mutates_in_place() {
    let root = parse("a { color: red } b { color: blue }").unwrap();
    let report = prune(&root, &DiscardOptions::new().with_rule("a")).unwrap();
    assert_eq!(report.rules, 1);
    assert_eq!(serialize(&root), "b {\n  color: blue;\n}\n");
}
