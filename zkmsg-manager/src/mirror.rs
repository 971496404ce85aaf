//! Off-chain mirror of the three committed structures.

use anyhow::{ensure, Context, Result};
use halo2curves_axiom::bn256::Fr;
use tracing::debug;
use zkmsg_merkle::{
    CommitmentTree, EligibilityDomain, EligibilityPath, MapPath, MessageDomain, MessagePath,
    SparseMerkleMap, TREE_CAPACITY,
};

use crate::ledger::{used_marker, NullifierLedger};
use crate::manager::MAX_ELIGIBLE;
use crate::types::{Address, Message};

/// Full copies of the registry, the message log and the nullifier map,
/// kept by whoever submits operations.
///
/// Staging methods only read; the matching `record_*` method is called
/// after the store accepted the operation, which keeps the mirror roots
/// in lock-step with the pinned commitments. A mirror that misses a
/// record hands out stale paths and the validator rejects them.
#[derive(Clone, Debug, Default)]
pub struct LedgerMirror {
    eligibility: CommitmentTree<EligibilityDomain>,
    messages: CommitmentTree<MessageDomain>,
    nullifiers: SparseMerkleMap,
}

impl LedgerMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insertion path for the next free registry slot.
    pub fn stage_registration(&self) -> Result<EligibilityPath> {
        let slot = self.eligibility.leaf_count();
        ensure!(
            (slot as u64) < MAX_ELIGIBLE,
            "local registry already holds {MAX_ELIGIBLE} addresses"
        );
        Ok(self.eligibility.witness(slot as u8))
    }

    /// Fold a registration the store accepted into the local registry.
    pub fn record_registration(&mut self, address: &Address) -> Result<()> {
        let index = self.eligibility.append(address.hash())?;
        debug!(index, "mirror recorded registration");
        Ok(())
    }

    /// Membership path for a previously recorded address.
    pub fn eligibility_path(&self, address: &Address) -> Result<EligibilityPath> {
        let target = address.hash();
        let index = (0..self.eligibility.leaf_count())
            .find(|slot| self.eligibility.leaf(*slot as u8) == target)
            .context("address was never recorded in the mirror")?;
        Ok(self.eligibility.witness(index as u8))
    }

    /// Insertion path for the next free message-log slot.
    pub fn stage_message(&self) -> Result<MessagePath> {
        let slot = self.messages.leaf_count();
        ensure!(slot < TREE_CAPACITY, "local message log is full");
        Ok(self.messages.witness(slot as u8))
    }

    /// Fold an accepted deposit into the local log and mark its nullifier
    /// key consumed.
    pub fn record_deposit(&mut self, message: &Message, key: &Fr) -> Result<()> {
        let index = self.messages.append(message.hash())?;
        self.nullifiers.set(key, used_marker());
        debug!(index, "mirror recorded deposit");
        Ok(())
    }

    pub fn eligibility_root(&self) -> Fr {
        self.eligibility.root()
    }

    pub fn messages_root(&self) -> Fr {
        self.messages.root()
    }

    pub fn nullifier_root(&self) -> Fr {
        self.nullifiers.root()
    }
}

impl NullifierLedger for LedgerMirror {
    fn witness_for(&self, key: &Fr) -> MapPath {
        self.nullifiers.path_for(key)
    }
}
