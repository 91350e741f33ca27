use crate::discard::matcher::PatternSet;
use std::path::PathBuf;

/// Where the reference ("already covered") stylesheet comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReferenceSource {
    /// Parsed as CSS text first; if that fails and the string names an existing file, the file is read.
    Auto(String),
    Text(String),
    Path(PathBuf),
}

/// What to do when the reference is neither valid CSS nor an existing file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MissingReferencePolicy {
    /// Abort with `DiscardError::ReferenceNotFound`.
    #[default]
    Fail,
    /// Log a warning and prune with the explicit patterns only.
    Ignore,
}

/// Options for one discard run. Built fresh per invocation and never mutated while pruning.
#[derive(Clone, Debug, Default)]
pub struct DiscardOptions {
    /// Matched against `@name` (strict) and against the params.
    pub atrule: PatternSet,
    /// Matched against every single selector of a rule.
    pub rule: PatternSet,
    /// Matched against `prop: value`, the property (strict) and the value.
    pub decl: PatternSet,
    pub reference: Option<ReferenceSource>,
    pub missing_reference: MissingReferencePolicy,
}

impl DiscardOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_atrule(mut self, patterns: impl Into<PatternSet>) -> Self {
        self.atrule = patterns.into();
        self
    }

    pub fn with_rule(mut self, patterns: impl Into<PatternSet>) -> Self {
        self.rule = patterns.into();
        self
    }

    pub fn with_decl(mut self, patterns: impl Into<PatternSet>) -> Self {
        self.decl = patterns.into();
        self
    }

    /// Reference given as CSS text or a path, guessed like [`ReferenceSource::Auto`].
    pub fn with_css(self, source: impl Into<String>) -> Self {
        self.with_reference(ReferenceSource::Auto(source.into()))
    }

    pub fn with_reference(mut self, source: ReferenceSource) -> Self {
        self.reference = Some(source);
        self
    }

    pub fn with_missing_reference(mut self, policy: MissingReferencePolicy) -> Self {
        self.missing_reference = policy;
        self
    }
}
