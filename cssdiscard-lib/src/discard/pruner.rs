use crate::discard::identifier::{identify, identify_with};
use crate::discard::matcher::matches;
use crate::discard::normalize::declaration_key;
use crate::discard::options::DiscardOptions;
use crate::discard::reference::ReferenceMapping;
use crate::error::DiscardError;
use crate::tree::css_tree::{
    child_nodes, detach, is_attached_to, walk_decls, walk_rules, AtRuleNode, NodeRef,
};
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::AddAssign;

static CUSTOM_MEDIA_PARAMS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(--[A-Za-z_][\w-]*)\s+([\W\w]+)\s*$").expect("custom media regex"));

/// How many nodes a run removed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub declarations: usize,
    pub rules: usize,
    /// Selectors dropped from rules that otherwise survived or were removed.
    pub selectors: usize,
    pub at_rules: usize,
}

impl PruneReport {
    pub fn total(&self) -> usize {
        self.declarations + self.rules + self.selectors + self.at_rules
    }
}

impl AddAssign for PruneReport {
    fn add_assign(&mut self, other: PruneReport) {
        self.declarations += other.declarations;
        self.rules += other.rules;
        self.selectors += other.selectors;
        self.at_rules += other.at_rules;
    }
}

/// Build the reference mapping from `options` (if any) and prune `root` in place.
pub fn prune(root: &NodeRef, options: &DiscardOptions) -> Result<PruneReport, DiscardError> {
    let mapping = match &options.reference {
        Some(source) => Some(ReferenceMapping::build(source, options.missing_reference)?),
        None => None,
    };
    prune_with_mapping(root, options, mapping.as_ref())
}

/// Prune `root` against an already built mapping, e.g. one shared by many targets.
pub fn prune_with_mapping(
    root: &NodeRef,
    options: &DiscardOptions,
    mapping: Option<&ReferenceMapping>,
) -> Result<PruneReport, DiscardError> {
    let mut report = PruneReport::default();
    // Dropping selectors changes the identifiers of the declarations below
    // them, which can expose new matches. Repeat until nothing moves.
    loop {
        let mut pruner = Pruner {
            options,
            mapping,
            report: PruneReport::default(),
        };
        pruner.prune_container(root)?;
        if pruner.report.total() == 0 {
            break;
        }
        report += pruner.report;
    }
    info!(
        "removed {} declarations, {} rules, {} selectors, {} at-rules",
        report.declarations, report.rules, report.selectors, report.at_rules
    );
    Ok(report)
}

struct Pruner<'a> {
    options: &'a DiscardOptions,
    mapping: Option<&'a ReferenceMapping>,
    report: PruneReport,
}

impl<'a> Pruner<'a> {
    /// Declarations, then rules, then at-rules (children before parents).
    fn prune_container(&mut self, container: &NodeRef) -> Result<(), DiscardError> {
        self.prune_declarations(container)?;
        self.prune_rules(container)?;
        self.sweep_at_rules(container)
    }

    fn prune_declarations(&mut self, container: &NodeRef) -> Result<(), DiscardError> {
        for decl in walk_decls(container) {
            if !is_attached_to(&decl, container) {
                continue;
            }
            let identifier = identify(&decl);
            let ignored = {
                let node = decl.borrow();
                let Some(declaration) = node.as_declaration() else {
                    continue;
                };
                let patterns = &self.options.decl;
                matches(&node, &declaration.to_text(), patterns, false)?
                    || matches(&node, &declaration.property, patterns, true)?
                    || matches(&node, &declaration.value, patterns, false)?
            };
            if ignored || self.in_reference(&identifier, &decl) {
                debug!("removing declaration under `{}`", identifier);
                detach(&decl);
                self.report.declarations += 1;
            }
        }
        Ok(())
    }

    fn prune_rules(&mut self, container: &NodeRef) -> Result<(), DiscardError> {
        for rule in walk_rules(container) {
            if !is_attached_to(&rule, container) {
                continue;
            }
            let (selectors, empty) = match rule.borrow().as_rule() {
                Some(node) => (node.selectors.clone(), node.children.is_empty()),
                None => continue,
            };
            if empty {
                debug!("removing empty rule `{}`", identify(&rule));
                detach(&rule);
                self.report.rules += 1;
                continue;
            }

            let keys: Vec<String> = match self.mapping {
                Some(_) => walk_decls(&rule)
                    .iter()
                    .filter_map(|decl| declaration_key(&decl.borrow()))
                    .collect(),
                None => Vec::new(),
            };

            let mut kept = Vec::with_capacity(selectors.len());
            for selector in &selectors {
                let identifier = identify_with(&rule, Some(selector));
                let dropped = self.covers_all(&identifier, &keys)
                    || matches(&rule.borrow(), selector, &self.options.rule, false)?;
                if dropped {
                    debug!("dropping selector `{}`", identifier);
                    self.report.selectors += 1;
                } else {
                    kept.push(selector.clone());
                }
            }

            if kept.is_empty() {
                detach(&rule);
                self.report.rules += 1;
            } else if kept.len() != selectors.len() {
                if let Some(node) = rule.borrow_mut().as_rule_mut() {
                    node.selectors = kept;
                }
            }
        }
        Ok(())
    }

    /// Post-order: block at-rules have their own contents pruned before
    /// their emptiness is judged. Rules are descended into for nested at-rules.
    fn sweep_at_rules(&mut self, container: &NodeRef) -> Result<(), DiscardError> {
        for child in child_nodes(container) {
            let (is_rule, block) = {
                let node = child.borrow();
                (
                    node.as_rule().is_some(),
                    node.as_at_rule().map(AtRuleNode::has_block),
                )
            };

            if is_rule {
                self.sweep_at_rules(&child)?;
                let emptied = child.borrow().children().map_or(false, Vec::is_empty);
                if emptied {
                    debug!("removing rule `{}` emptied by at-rule removal", identify(&child));
                    detach(&child);
                    self.report.rules += 1;
                }
                continue;
            }

            let Some(has_block) = block else {
                continue;
            };
            if has_block {
                self.prune_container(&child)?;
            }
            if self.at_rule_removable(&child)? {
                debug!("removing at-rule `{}`", identify(&child));
                detach(&child);
                self.report.at_rules += 1;
            }
        }
        Ok(())
    }

    fn at_rule_removable(&self, at_rule: &NodeRef) -> Result<bool, DiscardError> {
        let node = at_rule.borrow();
        let Some(at) = node.as_at_rule() else {
            return Ok(false);
        };
        let emptied = at.children.as_ref().map_or(false, Vec::is_empty);
        if emptied && !is_custom_media(at) {
            return Ok(true);
        }
        let patterns = &self.options.atrule;
        Ok(matches(&node, &format!("@{}", at.name), patterns, true)?
            || matches(&node, &at.params, patterns, false)?)
    }

    fn in_reference(&self, identifier: &str, decl: &NodeRef) -> bool {
        let Some(mapping) = self.mapping else {
            return false;
        };
        declaration_key(&decl.borrow()).map_or(false, |key| mapping.contains(identifier, &key))
    }

    /// A selector is covered when the reference holds every declaration of
    /// its rule. A rule without declarations is never covered.
    fn covers_all(&self, identifier: &str, keys: &[String]) -> bool {
        match self.mapping {
            Some(mapping) if !keys.is_empty() => {
                keys.iter().all(|key| mapping.contains(identifier, key))
            }
            _ => false,
        }
    }
}

/// `@custom-media --name <query>` defines a name and legitimately has no contents.
fn is_custom_media(at_rule: &AtRuleNode) -> bool {
    at_rule.name.eq_ignore_ascii_case("custom-media") && CUSTOM_MEDIA_PARAMS.is_match(&at_rule.params)
}
