//! Registrar and validator transitions over the commitment store.

use serde::{Deserialize, Serialize};
use tracing::debug;
use zkmsg_merkle::{EligibilityPath, MessagePath};
use zkmsg_nullifier::Nullifier;

use crate::error::ManagerError;
use crate::events::{EventLog, MessageDeposited};
use crate::flags::MessageFlags;
use crate::ledger::{unused_marker, used_marker, NullifierLedger};
use crate::store::CommitmentStore;
use crate::types::{Address, Message};

/// Registry slots available for eligible addresses.
pub const MAX_ELIGIBLE: u64 = 100;

/// Owner of the commitment store, exposing the two state transitions.
///
/// Both operations read the store slots they depend on once, validate the
/// caller-supplied witnesses against those pinned values, and write back
/// only when every precondition held. A failed call leaves the store and
/// the event log exactly as they were.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MessageManager {
    store: CommitmentStore,
    events: EventLog,
}

impl MessageManager {
    /// Fresh deployment over the empty structures.
    pub fn deploy() -> Self {
        MessageManager {
            store: CommitmentStore::deploy(),
            events: EventLog::new(),
        }
    }

    pub fn store(&self) -> &CommitmentStore {
        &self.store
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Register `address` at the registry slot the witness points at.
    ///
    /// The witness is a trusted input: this operation checks the slot
    /// bound but not that the witness extends the currently committed
    /// registry, so the caller is responsible for building it against the
    /// latest accepted state.
    pub fn add_eligible_address(
        &mut self,
        address: &Address,
        witness: &EligibilityPath,
    ) -> Result<(), ManagerError> {
        let index = u64::from(witness.index());
        if index >= MAX_ELIGIBLE {
            return Err(ManagerError::CapacityExceeded);
        }
        let new_root = witness.compute_root(address.hash());
        self.store.set_eligible_addresses_commitment(new_root);
        debug!(index, "eligible address registered");
        Ok(())
    }

    /// Validate and commit one message deposit.
    ///
    /// Preconditions run in a fixed order and each aborts the whole call:
    /// the nullifier must belong to the depositing address and carry a
    /// valid derivation proof, be unconsumed under the pinned ledger
    /// root, the address must sit in the committed registry, and
    /// `message.data` must satisfy the three flag rules. On success the
    /// nullifier and message roots advance together and a
    /// `MessageDeposited` event is emitted.
    pub fn deposit_message(
        &mut self,
        ledger: &impl NullifierLedger,
        address: &Address,
        message: &Message,
        address_witness: &EligibilityPath,
        message_witness: &MessagePath,
        nullifier: &Nullifier,
    ) -> Result<(), ManagerError> {
        let pinned_nullifier_root = self.store.nullifier_root();
        let pinned_nullifier_message = self.store.nullifier_message();

        nullifier.verify_for(&address.public_key, pinned_nullifier_message)?;

        let key = nullifier.key();
        let path = ledger.witness_for(&key);
        let unused_root = path.compute_root(&key, unused_marker())?;
        let used_root = path.compute_root(&key, used_marker())?;
        if unused_root != pinned_nullifier_root {
            return Err(if used_root == pinned_nullifier_root {
                ManagerError::NullifierAlreadyUsed
            } else {
                ManagerError::NullifierLedgerMismatch
            });
        }
        // Consuming the key means flipping its leaf along the same path.
        let new_nullifier_root = used_root;

        let pinned_eligibility = self.store.eligible_addresses_commitment();
        if address_witness.compute_root(address.hash()) != pinned_eligibility {
            return Err(ManagerError::AddressNotEligible);
        }

        MessageFlags::decode(&message.data).check_rules()?;

        let new_messages_commitment = message_witness.compute_root(message.hash());

        self.store.set_nullifier_root(new_nullifier_root);
        self.store.set_messages_commitment(new_messages_commitment);
        self.events.emit(MessageDeposited { data: message.data });
        debug!(event_index = self.events.len() - 1, "message deposited");
        Ok(())
    }
}

impl Default for MessageManager {
    fn default() -> Self {
        Self::deploy()
    }
}
