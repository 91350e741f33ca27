use crate::discard::identifier::{identify, identify_with};
use crate::discard::normalize::declaration_key;
use crate::discard::options::{MissingReferencePolicy, ReferenceSource};
use crate::error::DiscardError;
use crate::parser::{parse, parse_file};
use crate::tree::css_tree::{walk_decls, walk_rules, NodeRef};
use log::{debug, warn};
use std::collections::HashMap;
use std::path::Path;

/// Identifier -> normalized declarations found under it in the reference stylesheet.
#[derive(Clone, Debug, Default)]
pub struct ReferenceMapping {
    entries: HashMap<String, Vec<String>>,
}

impl ReferenceMapping {
    /// Load the reference and build its mapping once, before any pruning.
    pub fn build(
        source: &ReferenceSource,
        policy: MissingReferencePolicy,
    ) -> Result<Self, DiscardError> {
        match (load_reference(source), policy) {
            (Ok(root), _) => Ok(Self::from_root(&root)),
            (Err(err @ DiscardError::ReferenceNotFound(_)), MissingReferencePolicy::Ignore) => {
                warn!("{}; pruning with explicit patterns only", err);
                Ok(Self::default())
            }
            (Err(err), _) => Err(err),
        }
    }

    /// Every declaration is filed under its own identifier, and again under
    /// the per-selector identifier of every rule above it, so `a, b { x }`
    /// covers `a { x }` and `b { x }` in the target.
    pub fn from_root(root: &NodeRef) -> Self {
        let mut mapping = ReferenceMapping::default();

        for decl in walk_decls(root) {
            let identifier = identify(&decl);
            if let Some(key) = declaration_key(&decl.borrow()) {
                mapping.insert(identifier, key);
            }
        }

        for rule in walk_rules(root) {
            let selectors = match rule.borrow().as_rule() {
                Some(rule) => rule.selectors.clone(),
                None => continue,
            };
            let keys: Vec<String> = walk_decls(&rule)
                .iter()
                .filter_map(|decl| declaration_key(&decl.borrow()))
                .collect();
            for selector in &selectors {
                let identifier = identify_with(&rule, Some(selector));
                for key in &keys {
                    mapping.insert(identifier.clone(), key.clone());
                }
            }
        }

        debug!("reference mapping holds {} identifiers", mapping.len());
        mapping
    }

    /// True if `normalized` was seen under `identifier` in the reference.
    pub fn contains(&self, identifier: &str, normalized: &str) -> bool {
        self.entries
            .get(identifier)
            .map_or(false, |keys| keys.iter().any(|key| key == normalized))
    }

    pub fn get(&self, identifier: &str) -> Option<&[String]> {
        self.entries.get(identifier).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, identifier: String, normalized: String) {
        self.entries.entry(identifier).or_default().push(normalized);
    }
}

fn load_reference(source: &ReferenceSource) -> Result<NodeRef, DiscardError> {
    match source {
        ReferenceSource::Text(css_text) => parse(css_text),
        ReferenceSource::Path(path) => {
            if !path.is_file() {
                return Err(DiscardError::ReferenceNotFound(Box::new(DiscardError::Io {
                    path: path.clone(),
                    source: std::io::ErrorKind::NotFound.into(),
                })));
            }
            parse_file(path)
        }
        ReferenceSource::Auto(source) => match parse(source) {
            Ok(root) => Ok(root),
            Err(parse_error) => {
                let path = Path::new(source.trim());
                if path.is_file() {
                    debug!("reading reference stylesheet from {}", path.display());
                    parse_file(path)
                } else {
                    Err(DiscardError::ReferenceNotFound(Box::new(parse_error)))
                }
            }
        },
    }
}
