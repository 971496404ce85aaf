//! Sparse authenticated key-value map over scalar keys.
//!
//! Every bn256 scalar addresses its own leaf through its little-endian
//! bits, so the map never needs explicit insertion order and an untouched
//! key provably holds the default zero value. Only populated nodes are
//! stored; everything absent is an empty subtree from the cache.

use std::collections::HashMap;

use halo2curves_axiom::bn256::Fr;
use num_bigint::BigUint;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use zkmsg_common::{fr_to_bytes, hash_pair, serde_fr_vec};

use crate::MerkleError;

/// Levels in the map: every scalar key fits in this many bits.
pub const MAP_KEY_BITS: usize = 254;

static EMPTY_MAP_SUBTREES: Lazy<Vec<Fr>> = Lazy::new(|| {
    let mut nodes = Vec::with_capacity(MAP_KEY_BITS + 1);
    let mut node = Fr::zero();
    nodes.push(node);
    for _ in 0..MAP_KEY_BITS {
        node = hash_pair(node, node);
        nodes.push(node);
    }
    nodes
});

/// Root of the map with every key at its default zero value.
pub fn empty_map_root() -> Fr {
    EMPTY_MAP_SUBTREES[MAP_KEY_BITS]
}

fn leaf_index(key: &Fr) -> BigUint {
    BigUint::from_bytes_le(&fr_to_bytes(key))
}

/// Sibling path for one key of the map.
///
/// The path carries siblings only; direction bits always come from the
/// verifier's own key, so a substituted path can produce a wrong root but
/// never redirect the lookup to a different key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapPath {
    #[serde(with = "serde_fr_vec")]
    siblings: Vec<Fr>,
}

impl MapPath {
    pub fn new(siblings: Vec<Fr>) -> Self {
        Self { siblings }
    }

    pub fn siblings(&self) -> &[Fr] {
        &self.siblings
    }

    /// Fold `value` at `key`'s leaf up to the root this path implies.
    pub fn compute_root(&self, key: &Fr, value: Fr) -> Result<Fr, MerkleError> {
        if self.siblings.len() != MAP_KEY_BITS {
            return Err(MerkleError::PathLength {
                expected: MAP_KEY_BITS,
                got: self.siblings.len(),
            });
        }
        let index = leaf_index(key);
        let mut node = value;
        for (level, sibling) in self.siblings.iter().enumerate() {
            node = if index.bit(level as u64) {
                hash_pair(*sibling, node)
            } else {
                hash_pair(node, *sibling)
            };
        }
        Ok(node)
    }
}

/// Off-chain mirror of the authenticated map.
#[derive(Clone, Debug, Default)]
pub struct SparseMerkleMap {
    // populated nodes keyed by (level, index within level)
    nodes: HashMap<(usize, BigUint), Fr>,
}

impl SparseMerkleMap {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
        }
    }

    pub fn root(&self) -> Fr {
        self.node(MAP_KEY_BITS, &BigUint::from(0u8))
    }

    /// Current value under `key`, zero if never written.
    pub fn get(&self, key: &Fr) -> Fr {
        self.node(0, &leaf_index(key))
    }

    /// Write `value` under `key` and rehash the spine to the root.
    pub fn set(&mut self, key: &Fr, value: Fr) {
        let mut index = leaf_index(key);
        self.nodes.insert((0, index.clone()), value);
        for level in 0..MAP_KEY_BITS {
            let node = self.node(level, &index);
            let sibling = self.node(level, &(index.clone() ^ BigUint::from(1u8)));
            let parent = if index.bit(0) {
                hash_pair(sibling, node)
            } else {
                hash_pair(node, sibling)
            };
            index >>= 1;
            self.nodes.insert((level + 1, index.clone()), parent);
        }
    }

    /// Sibling path for `key` against the current map contents.
    pub fn path_for(&self, key: &Fr) -> MapPath {
        let mut siblings = Vec::with_capacity(MAP_KEY_BITS);
        let mut index = leaf_index(key);
        for level in 0..MAP_KEY_BITS {
            siblings.push(self.node(level, &(index.clone() ^ BigUint::from(1u8))));
            index >>= 1;
        }
        MapPath::new(siblings)
    }

    fn node(&self, level: usize, index: &BigUint) -> Fr {
        self.nodes
            .get(&(level, index.clone()))
            .copied()
            .unwrap_or(EMPTY_MAP_SUBTREES[level])
    }
}
