//! Discarding rules, declarations and at-rules from a stylesheet tree, either
//! by ignore patterns or by subtracting a reference stylesheet.

pub mod identifier;
pub mod matcher;
pub mod normalize;
pub mod options;
pub mod pruner;
pub mod reference;
