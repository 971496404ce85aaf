//! The four-slot commitment store that anchors every operation.

use halo2curves_axiom::bn256::Fr;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use zkmsg_common::{domain_scalar, serde_fr};
use zkmsg_merkle::empty_map_root;

/// Fixed scalar every deposit nullifier must be derived against. Pinning
/// one message per deployment is what makes a nullifier single-use.
pub static NULLIFIER_MESSAGE: Lazy<Fr> = Lazy::new(|| domain_scalar("zkmsg/v1/deposit-domain"));

/// The committed state: three structure roots plus the deposit domain
/// scalar. Operations read these slots once up front and validate every
/// supplied path against the pinned values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommitmentStore {
    #[serde(with = "serde_fr")]
    eligible_addresses_commitment: Fr,
    #[serde(with = "serde_fr")]
    messages_commitment: Fr,
    #[serde(with = "serde_fr")]
    nullifier_root: Fr,
    #[serde(with = "serde_fr")]
    nullifier_message: Fr,
}

impl CommitmentStore {
    /// Initial state: empty registry and log, all-unused nullifier map,
    /// and the fixed deposit domain scalar.
    pub fn deploy() -> Self {
        CommitmentStore {
            eligible_addresses_commitment: Fr::zero(),
            messages_commitment: Fr::zero(),
            nullifier_root: empty_map_root(),
            nullifier_message: *NULLIFIER_MESSAGE,
        }
    }

    pub fn eligible_addresses_commitment(&self) -> Fr {
        self.eligible_addresses_commitment
    }

    pub fn messages_commitment(&self) -> Fr {
        self.messages_commitment
    }

    pub fn nullifier_root(&self) -> Fr {
        self.nullifier_root
    }

    pub fn nullifier_message(&self) -> Fr {
        self.nullifier_message
    }

    pub(crate) fn set_eligible_addresses_commitment(&mut self, root: Fr) {
        self.eligible_addresses_commitment = root;
    }

    pub(crate) fn set_messages_commitment(&mut self, root: Fr) {
        self.messages_commitment = root;
    }

    pub(crate) fn set_nullifier_root(&mut self, root: Fr) {
        self.nullifier_root = root;
    }
}
