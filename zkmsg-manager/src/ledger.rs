//! Boundary between the validator and whoever tracks nullifier state.

use halo2curves_axiom::bn256::Fr;
use zkmsg_merkle::{MapPath, SparseMerkleMap};

/// Map value for a key whose nullifier has never been consumed. This is
/// the map default, so unseen keys are spendable by construction.
pub fn unused_marker() -> Fr {
    Fr::zero()
}

/// Map value recorded when a nullifier is consumed.
pub fn used_marker() -> Fr {
    Fr::one()
}

/// Source of nullifier-map sibling paths.
///
/// Implementations are advisory: the validator folds each path back to a
/// root and compares against the pinned commitment, so a wrong or stale
/// path can only make an operation fail, never pass.
pub trait NullifierLedger {
    fn witness_for(&self, key: &Fr) -> MapPath;
}

impl NullifierLedger for SparseMerkleMap {
    fn witness_for(&self, key: &Fr) -> MapPath {
        self.path_for(key)
    }
}
