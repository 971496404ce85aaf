//! Commitment structures backing the registry and the message log.
//!
//! Two shapes live here: a fixed-height append-only tree whose root commits
//! to an ordered leaf list, and a sparse authenticated map whose root
//! commits to a scalar-keyed value table. Both hash with the workspace
//! Poseidon, so a root from one can never be confused with a raw leaf.

use thiserror::Error;

pub mod map;
pub mod tree;

pub use map::{empty_map_root, MapPath, SparseMerkleMap, MAP_KEY_BITS};
pub use tree::{
    empty_tree_root, CommitmentTree, EligibilityDomain, EligibilityPath, MerklePath,
    MessageDomain, MessagePath, TreeDomain, TREE_CAPACITY, TREE_HEIGHT,
};

/// Structural failures in tree and map plumbing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MerkleError {
    #[error("commitment tree has no free leaf slot")]
    TreeFull,
    #[error("sibling path has {got} levels, expected {expected}")]
    PathLength { expected: usize, got: usize },
}
