//! Participant-facing payload types and their leaf commitments.

use halo2curves_axiom::bn256::Fr;
use serde::{Deserialize, Serialize};
use zkmsg_common::{poseidon_hash, serde_fr};
use zkmsg_nullifier::PublicKey;

/// A participant identity, committed into the eligibility registry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub public_key: PublicKey,
}

impl Address {
    pub fn new(public_key: PublicKey) -> Self {
        Address { public_key }
    }

    /// Registry leaf commitment: the hash of both key coordinates.
    pub fn hash(&self) -> Fr {
        self.public_key.hash()
    }
}

/// A deposited message: the sender's key plus a payload scalar whose low
/// six bits are the behavior flags.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub public_key: PublicKey,
    #[serde(with = "serde_fr")]
    pub data: Fr,
}

impl Message {
    pub fn new(public_key: PublicKey, data: Fr) -> Self {
        Message { public_key, data }
    }

    /// Message-log leaf commitment, binding the payload to the sender.
    pub fn hash(&self) -> Fr {
        let (x, y) = self.public_key.hash_fields();
        poseidon_hash(&[x, y, self.data])
    }
}
