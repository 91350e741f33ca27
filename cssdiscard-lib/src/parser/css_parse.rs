//! Builds the `css_tree` from stylesheet text.
//!
//! Uses cssparser's rule/declaration parsers so that blocks, strings and
//! functions are tokenized correctly, while the tree itself keeps every
//! prelude and value as trimmed source text. Selectors and at-rule params are
//! compared structurally later on, so nothing is reinterpreted here.

use crate::error::DiscardError;
use crate::tree::css_tree::{
    append_child, new_at_rule, new_declaration, new_root, new_rule, NodeRef,
};
use cssparser::{
    AtRuleParser, BasicParseErrorKind, CowRcStr, DeclarationParser, ParseError, ParseErrorKind,
    Parser, ParserInput, ParserState, QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser,
    StyleSheetParser, Token,
};
use log::warn;
use std::fs;
use std::path::Path;

/// Parse stylesheet text into a tree. The first malformed rule fails the whole parse.
pub fn parse(css_text: &str) -> Result<NodeRef, DiscardError> {
    let mut input = ParserInput::new(css_text);
    let mut parser = Parser::new(&mut input);
    let mut builder = TreeBuilder;

    let root = new_root();
    for item in StyleSheetParser::new(&mut parser, &mut builder) {
        let node = item.map_err(|(error, _)| to_discard_error(error))?;
        append_child(&root, node);
    }
    Ok(root)
}

/// Read and parse a stylesheet from disk.
pub fn parse_file(path: &Path) -> Result<NodeRef, DiscardError> {
    let css_text = fs::read_to_string(path).map_err(|source| DiscardError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&css_text)
}

fn to_discard_error(error: ParseError<'_, ()>) -> DiscardError {
    let message = match error.kind {
        ParseErrorKind::Basic(BasicParseErrorKind::EndOfInput) => {
            "unexpected end of input".to_string()
        }
        ParseErrorKind::Basic(BasicParseErrorKind::UnexpectedToken(token)) => {
            format!("unexpected token {:?}", token)
        }
        ParseErrorKind::Basic(BasicParseErrorKind::AtRuleInvalid(name)) => {
            format!("invalid at-rule @{}", &*name)
        }
        other => format!("{:?}", other),
    };
    DiscardError::Parse {
        // cssparser lines are 0-based, columns 1-based.
        line: error.location.line + 1,
        column: error.location.column,
        message,
    }
}

/// Consume whatever is left of the (delimited) input and return it as trimmed source text.
fn remaining_source(input: &mut Parser<'_, '_>) -> String {
    let start = input.position();
    while input.next().is_ok() {}
    input.slice_from(start).trim().to_string()
}

fn parse_body<'i>(parent: &NodeRef, input: &mut Parser<'i, '_>) -> Result<(), ParseError<'i, ()>> {
    let mut builder = TreeBuilder;
    for item in RuleBodyParser::new(input, &mut builder) {
        let node = match item {
            Ok(node) => node,
            Err((error, source)) => match recover_declaration(source) {
                Some(node) => node,
                None => return Err(error),
            },
        };
        append_child(parent, node);
    }
    Ok(())
}

/// Legacy hacks such as `*zoom: 1` or `_height: 1px` are not valid
/// declarations for cssparser. Keep them as raw `prop: value` text.
/// Anything with a block is a broken rule and stays an error.
fn recover_declaration(source: &str) -> Option<NodeRef> {
    let source = source.trim().trim_end_matches(';').trim_end();
    if source.contains(['{', '}']) {
        return None;
    }
    let (property, value) = source.split_once(':')?;
    let property = property.trim();
    if property.is_empty() || property.contains(char::is_whitespace) {
        return None;
    }
    warn!("keeping unparsed declaration `{}`", source);
    Some(new_declaration(property.to_string(), value.trim().to_string()))
}

struct TreeBuilder;

impl<'i> QualifiedRuleParser<'i> for TreeBuilder {
    type Prelude = Vec<String>;
    type QualifiedRule = NodeRef;
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Vec<String>, ParseError<'i, ()>> {
        input.parse_comma_separated(|input| {
            let selector = remaining_source(input);
            if selector.is_empty() {
                return Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid));
            }
            Ok(selector)
        })
    }

    fn parse_block<'t>(
        &mut self,
        selectors: Vec<String>,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<NodeRef, ParseError<'i, ()>> {
        let rule = new_rule(selectors);
        parse_body(&rule, input)?;
        Ok(rule)
    }
}

impl<'i> AtRuleParser<'i> for TreeBuilder {
    type Prelude = (String, String);
    type AtRule = NodeRef;
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<(String, String), ParseError<'i, ()>> {
        Ok((name.to_string(), remaining_source(input)))
    }

    fn rule_without_block(
        &mut self,
        (name, params): (String, String),
        _start: &ParserState,
    ) -> Result<NodeRef, ()> {
        Ok(new_at_rule(name, params, false))
    }

    fn parse_block<'t>(
        &mut self,
        (name, params): (String, String),
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<NodeRef, ParseError<'i, ()>> {
        let at_rule = new_at_rule(name, params, true);
        parse_body(&at_rule, input)?;
        Ok(at_rule)
    }
}

impl<'i> DeclarationParser<'i> for TreeBuilder {
    type Declaration = NodeRef;
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<NodeRef, ParseError<'i, ()>> {
        let custom_property = name.starts_with("--");
        let start = input.position();
        while let Ok(token) = input.next() {
            // `a:hover { ... }` inside a block is a nested rule, not a declaration.
            let nested_block = matches!(token, Token::CurlyBracketBlock);
            if nested_block && !custom_property {
                return Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid));
            }
        }
        let value = input.slice_from(start).trim().to_string();
        Ok(new_declaration(name.to_string(), value))
    }
}

impl<'i> RuleBodyItemParser<'i, NodeRef, ()> for TreeBuilder {
    fn parse_declarations(&self) -> bool {
        true
    }

    fn parse_qualified(&self) -> bool {
        true
    }
}
