use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

pub mod css_tree {
    use super::*;

    /// Owning handle to a stylesheet node. Parents own their children.
    pub type NodeRef = Rc<RefCell<Node>>;
    /// Non-owning back link from a child to its parent, only used to walk upwards.
    pub type WeakNodeRef = Weak<RefCell<Node>>;

    #[derive(Debug)]
    pub enum Node {
        Root(RootNode),
        Rule(RuleNode),
        AtRule(AtRuleNode),
        Declaration(DeclarationNode),
    }

    #[derive(Debug, Default)]
    pub struct RootNode {
        pub children: Vec<NodeRef>,
    }

    #[derive(Debug)]
    pub struct RuleNode {
        /// e.g. ["html", "body"] for `html, body { ... }`
        pub selectors: Vec<String>,
        pub children: Vec<NodeRef>,
        pub parent: Option<WeakNodeRef>,
    }

    #[derive(Debug)]
    pub struct AtRuleNode {
        pub name: String,
        pub params: String,
        /// `None` for statement at-rules such as `@import`; `Some` for block at-rules.
        pub children: Option<Vec<NodeRef>>,
        pub parent: Option<WeakNodeRef>,
    }

    #[derive(Debug)]
    pub struct DeclarationNode {
        pub property: String,
        pub value: String,
        pub parent: Option<WeakNodeRef>,
    }

    impl RuleNode {
        /// The full selector list as one string, used for declaration identifiers.
        pub fn selector(&self) -> String {
            self.selectors.join(",")
        }
    }

    impl AtRuleNode {
        /// `@name params`, or just `@name` when there are no params.
        pub fn header(&self) -> String {
            if self.params.is_empty() {
                format!("@{}", self.name)
            } else {
                format!("@{} {}", self.name, self.params)
            }
        }

        pub fn has_block(&self) -> bool {
            self.children.is_some()
        }
    }

    impl DeclarationNode {
        pub fn to_text(&self) -> String {
            format!("{}: {}", self.property, self.value)
        }
    }

    impl Node {
        pub fn children(&self) -> Option<&Vec<NodeRef>> {
            match self {
                Node::Root(root) => Some(&root.children),
                Node::Rule(rule) => Some(&rule.children),
                Node::AtRule(at_rule) => at_rule.children.as_ref(),
                Node::Declaration(_) => None,
            }
        }

        pub fn children_mut(&mut self) -> Option<&mut Vec<NodeRef>> {
            match self {
                Node::Root(root) => Some(&mut root.children),
                Node::Rule(rule) => Some(&mut rule.children),
                Node::AtRule(at_rule) => at_rule.children.as_mut(),
                Node::Declaration(_) => None,
            }
        }

        /// Upgrades the back link. `None` for the root and for detached nodes.
        pub fn parent(&self) -> Option<NodeRef> {
            let weak = match self {
                Node::Root(_) => return None,
                Node::Rule(rule) => rule.parent.as_ref(),
                Node::AtRule(at_rule) => at_rule.parent.as_ref(),
                Node::Declaration(decl) => decl.parent.as_ref(),
            };
            weak.and_then(Weak::upgrade)
        }

        fn set_parent(&mut self, parent: Option<WeakNodeRef>) {
            match self {
                Node::Root(_) => {}
                Node::Rule(rule) => rule.parent = parent,
                Node::AtRule(at_rule) => at_rule.parent = parent,
                Node::Declaration(decl) => decl.parent = parent,
            }
        }

        pub fn as_rule(&self) -> Option<&RuleNode> {
            match self {
                Node::Rule(rule) => Some(rule),
                _ => None,
            }
        }

        pub fn as_rule_mut(&mut self) -> Option<&mut RuleNode> {
            match self {
                Node::Rule(rule) => Some(rule),
                _ => None,
            }
        }

        pub fn as_at_rule(&self) -> Option<&AtRuleNode> {
            match self {
                Node::AtRule(at_rule) => Some(at_rule),
                _ => None,
            }
        }

        pub fn as_declaration(&self) -> Option<&DeclarationNode> {
            match self {
                Node::Declaration(decl) => Some(decl),
                _ => None,
            }
        }
    }

    pub fn new_root() -> NodeRef {
        Rc::new(RefCell::new(Node::Root(RootNode::default())))
    }

    pub fn new_rule(selectors: Vec<String>) -> NodeRef {
        Rc::new(RefCell::new(Node::Rule(RuleNode {
            selectors,
            children: Vec::new(),
            parent: None,
        })))
    }

    pub fn new_at_rule(name: String, params: String, has_block: bool) -> NodeRef {
        Rc::new(RefCell::new(Node::AtRule(AtRuleNode {
            name,
            params,
            children: has_block.then(Vec::new),
            parent: None,
        })))
    }

    pub fn new_declaration(property: String, value: String) -> NodeRef {
        Rc::new(RefCell::new(Node::Declaration(DeclarationNode {
            property,
            value,
            parent: None,
        })))
    }

    /// Appends `child` to `parent` and points the child's back link at it.
    /// A statement at-rule gains a block the first time something is appended.
    pub fn append_child(parent: &NodeRef, child: NodeRef) {
        child.borrow_mut().set_parent(Some(Rc::downgrade(parent)));
        let mut parent_node = parent.borrow_mut();
        match &mut *parent_node {
            Node::AtRule(at_rule) => at_rule.children.get_or_insert_with(Vec::new).push(child),
            other => {
                if let Some(children) = other.children_mut() {
                    children.push(child);
                }
            }
        }
    }

    /// Removes `node` from its parent's child list. Returns false when it was already detached.
    pub fn detach(node: &NodeRef) -> bool {
        let Some(parent) = node.borrow().parent() else {
            return false;
        };
        if let Some(children) = parent.borrow_mut().children_mut() {
            children.retain(|child| !Rc::ptr_eq(child, node));
        }
        node.borrow_mut().set_parent(None);
        true
    }

    /// True while `node` can still reach `ancestor` through its back links.
    pub fn is_attached_to(node: &NodeRef, ancestor: &NodeRef) -> bool {
        let mut current = node.borrow().parent();
        while let Some(parent) = current {
            if Rc::ptr_eq(&parent, ancestor) {
                return true;
            }
            current = parent.borrow().parent();
        }
        false
    }

    /// Snapshot of the direct children, safe to hold while the tree is mutated.
    pub fn child_nodes(node: &NodeRef) -> Vec<NodeRef> {
        node.borrow().children().cloned().unwrap_or_default()
    }

    /// Every declaration below `node`, in document order.
    pub fn walk_decls(node: &NodeRef) -> Vec<NodeRef> {
        let mut found = Vec::new();
        collect_descendants(node, &mut found, |n| matches!(n, Node::Declaration(_)));
        found
    }

    /// Every rule below `node`, in document order.
    pub fn walk_rules(node: &NodeRef) -> Vec<NodeRef> {
        let mut found = Vec::new();
        collect_descendants(node, &mut found, |n| matches!(n, Node::Rule(_)));
        found
    }

    /// Every at-rule below `node`, in document order.
    pub fn walk_at_rules(node: &NodeRef) -> Vec<NodeRef> {
        let mut found = Vec::new();
        collect_descendants(node, &mut found, |n| matches!(n, Node::AtRule(_)));
        found
    }

    fn collect_descendants(node: &NodeRef, found: &mut Vec<NodeRef>, keep: fn(&Node) -> bool) {
        for child in child_nodes(node) {
            if keep(&*child.borrow()) {
                found.push(Rc::clone(&child));
            }
            collect_descendants(&child, found, keep);
        }
    }
}

use css_tree::{Node, NodeRef};

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(f, self, 0)
    }
}

fn write_node(f: &mut fmt::Formatter<'_>, node: &Node, depth: usize) -> fmt::Result {
    let indent = "  ".repeat(depth);
    match node {
        Node::Root(root) => {
            for (index, child) in root.children.iter().enumerate() {
                if index > 0 {
                    writeln!(f)?;
                }
                write_node(f, &child.borrow(), depth)?;
            }
            Ok(())
        }
        Node::Rule(rule) => write_block(f, &indent, &rule.selectors.join(", "), &rule.children, depth),
        Node::AtRule(at_rule) => match &at_rule.children {
            Some(children) => write_block(f, &indent, &at_rule.header(), children, depth),
            None => writeln!(f, "{}{};", indent, at_rule.header()),
        },
        Node::Declaration(decl) => writeln!(f, "{}{};", indent, decl.to_text()),
    }
}

fn write_block(
    f: &mut fmt::Formatter<'_>,
    indent: &str,
    header: &str,
    children: &[NodeRef],
    depth: usize,
) -> fmt::Result {
    writeln!(f, "{}{} {{", indent, header)?;
    for child in children {
        write_node(f, &child.borrow(), depth + 1)?;
    }
    writeln!(f, "{}}}", indent)
}
