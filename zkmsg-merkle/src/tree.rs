//! Fixed-height append-only commitment tree with typed membership paths.
//!
//! The eligibility registry and the message log are both instances of this
//! tree, distinguished by a zero-sized domain marker so a path produced for
//! one can never be handed to a verifier expecting the other.

use std::marker::PhantomData;

use halo2curves_axiom::bn256::Fr;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use zkmsg_common::{hash_pair, serde_fr_array};

use crate::MerkleError;

/// Sibling levels in every commitment tree.
pub const TREE_HEIGHT: usize = 8;
/// Leaf capacity of a height-[`TREE_HEIGHT`] tree.
pub const TREE_CAPACITY: usize = 1 << TREE_HEIGHT;

// EMPTY_SUBTREES[level] is the node value of an all-empty subtree of that
// height, with EMPTY_SUBTREES[0] the empty leaf.
static EMPTY_SUBTREES: Lazy<[Fr; TREE_HEIGHT + 1]> = Lazy::new(|| {
    let mut nodes = [Fr::zero(); TREE_HEIGHT + 1];
    for level in 0..TREE_HEIGHT {
        nodes[level + 1] = hash_pair(nodes[level], nodes[level]);
    }
    nodes
});

/// Root of a tree with every leaf still empty.
pub fn empty_tree_root() -> Fr {
    EMPTY_SUBTREES[TREE_HEIGHT]
}

/// Marker tying a tree and its paths to one logical domain.
pub trait TreeDomain: Clone + Copy + std::fmt::Debug + PartialEq + Eq {}

/// Domain of the eligible-address registry tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EligibilityDomain;

/// Domain of the deposited-message tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MessageDomain;

impl TreeDomain for EligibilityDomain {}
impl TreeDomain for MessageDomain {}

/// Authentication path from one leaf slot to the root.
///
/// The index doubles as the direction word: bit `level` (LSB first) says
/// whether the running node is the right child at that level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerklePath<D: TreeDomain> {
    index: u8,
    #[serde(with = "serde_fr_array")]
    siblings: [Fr; TREE_HEIGHT],
    #[serde(skip)]
    _domain: PhantomData<D>,
}

/// Path into the eligible-address registry tree.
pub type EligibilityPath = MerklePath<EligibilityDomain>;
/// Path into the deposited-message tree.
pub type MessagePath = MerklePath<MessageDomain>;

impl<D: TreeDomain> MerklePath<D> {
    pub fn new(index: u8, siblings: [Fr; TREE_HEIGHT]) -> Self {
        Self {
            index,
            siblings,
            _domain: PhantomData,
        }
    }

    /// Leaf slot this path claims to authenticate.
    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn siblings(&self) -> &[Fr; TREE_HEIGHT] {
        &self.siblings
    }

    /// Fold `leaf` up the path to the root it implies.
    pub fn compute_root(&self, leaf: Fr) -> Fr {
        let mut node = leaf;
        for (level, sibling) in self.siblings.iter().enumerate() {
            node = if (self.index >> level) & 1 == 0 {
                hash_pair(node, *sibling)
            } else {
                hash_pair(*sibling, node)
            };
        }
        node
    }
}

/// In-memory tree kept by the off-chain collaborator to build paths.
///
/// Nodes are stored per level with empty subtrees materialized, so updates
/// and path reads touch one node per level.
#[derive(Clone, Debug)]
pub struct CommitmentTree<D: TreeDomain> {
    // nodes[level][i]; level 0 holds the leaves, the top level the root
    nodes: Vec<Vec<Fr>>,
    next_index: usize,
    _domain: PhantomData<D>,
}

impl<D: TreeDomain> CommitmentTree<D> {
    pub fn new() -> Self {
        let nodes = (0..=TREE_HEIGHT)
            .map(|level| vec![EMPTY_SUBTREES[level]; TREE_CAPACITY >> level])
            .collect();
        Self {
            nodes,
            next_index: 0,
            _domain: PhantomData,
        }
    }

    pub fn root(&self) -> Fr {
        self.nodes[TREE_HEIGHT][0]
    }

    /// Leaves occupied so far; also the next free slot.
    pub fn leaf_count(&self) -> usize {
        self.next_index
    }

    pub fn leaf(&self, index: u8) -> Fr {
        self.nodes[0][index as usize]
    }

    /// Path for `index` against the current tree contents. Valid for empty
    /// slots too, which is exactly what an insertion needs.
    pub fn witness(&self, index: u8) -> MerklePath<D> {
        let mut siblings = [Fr::zero(); TREE_HEIGHT];
        let mut idx = index as usize;
        for (level, sibling) in siblings.iter_mut().enumerate() {
            *sibling = self.nodes[level][idx ^ 1];
            idx >>= 1;
        }
        MerklePath::new(index, siblings)
    }

    /// Overwrite one leaf and rehash its spine.
    pub fn set_leaf(&mut self, index: u8, leaf: Fr) {
        let mut idx = index as usize;
        self.nodes[0][idx] = leaf;
        for level in 0..TREE_HEIGHT {
            let parent = idx >> 1;
            let left = self.nodes[level][parent * 2];
            let right = self.nodes[level][parent * 2 + 1];
            self.nodes[level + 1][parent] = hash_pair(left, right);
            idx = parent;
        }
        self.next_index = self.next_index.max(index as usize + 1);
    }

    /// Place `leaf` in the next free slot, returning the slot index.
    pub fn append(&mut self, leaf: Fr) -> Result<u8, MerkleError> {
        if self.next_index >= TREE_CAPACITY {
            return Err(MerkleError::TreeFull);
        }
        let index = self.next_index as u8;
        self.set_leaf(index, leaf);
        Ok(index)
    }
}

impl<D: TreeDomain> Default for CommitmentTree<D> {
    fn default() -> Self {
        Self::new()
    }
}
