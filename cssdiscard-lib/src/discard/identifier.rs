use crate::discard::normalize::normalize;
use crate::tree::css_tree::{Node, NodeRef};

/// Structural key of a node: the normalized chain of ancestor selectors and
/// `@name params` labels from the root down.
///
/// Declarations share the key of their parent. The root has an empty key.
pub fn identify(node: &NodeRef) -> String {
    identify_with(node, None)
}

/// Like [`identify`], but a rule contributes `selector` instead of its full
/// selector list. Used to key each selector of a multi-selector rule on its own.
pub fn identify_with(node: &NodeRef, selector: Option<&str>) -> String {
    let node = node.borrow();
    match &*node {
        Node::Root(_) => String::new(),
        Node::Declaration(_) => normalize(&parent_identifier(&node), false),
        Node::Rule(rule) => {
            let own = match selector {
                Some(selector) => selector.to_string(),
                None => rule.selector(),
            };
            normalize(&format!("{} {}", parent_identifier(&node), own), false)
        }
        Node::AtRule(at_rule) => normalize(
            &format!(
                "{} @{} {}",
                parent_identifier(&node),
                at_rule.name,
                at_rule.params
            ),
            false,
        ),
    }
}

fn parent_identifier(node: &Node) -> String {
    node.parent()
        .map(|parent| identify(&parent))
        .unwrap_or_default()
}
