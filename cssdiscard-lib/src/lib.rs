pub mod discard;
pub mod error;
pub mod parser;
pub mod tree;

pub use discard::matcher::{Pattern, PatternSet};
pub use discard::options::{DiscardOptions, MissingReferencePolicy, ReferenceSource};
pub use discard::pruner::{prune, prune_with_mapping, PruneReport};
pub use discard::reference::ReferenceMapping;
pub use error::{BoxError, DiscardError};

/// Parse `css_text`, prune it with `options` and print the result.
///
/// Either the whole stylesheet is processed or an error is returned; there is
/// no partial output.
pub fn discard(css_text: &str, options: &DiscardOptions) -> Result<String, DiscardError> {
    let root = parser::parse(css_text)?;
    prune(&root, options)?;
    Ok(parser::serialize(&root))
}
