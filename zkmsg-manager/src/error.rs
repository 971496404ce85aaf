//! Rejection reasons surfaced by the commitment-store operations.

use thiserror::Error;
use zkmsg_merkle::MerkleError;
use zkmsg_nullifier::NullifierError;

/// Why the store refused a registration or a deposit.
///
/// Deposits check their preconditions in a fixed order (nullifier proof,
/// ledger path, eligibility, flag rules), so the variant reported for an
/// operation with several defects is the first one in that order.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManagerError {
    /// The eligibility registry already holds its maximum number of slots.
    #[error("eligible address registry is full")]
    CapacityExceeded,

    /// The supplied eligibility path does not connect the depositor to the
    /// committed registry root.
    #[error("address is not in the committed eligible addresses tree")]
    AddressNotEligible,

    /// The deposit nullifier failed its proof of correct derivation.
    #[error("malformed nullifier: {0}")]
    NullifierMalformed(#[from] NullifierError),

    /// The nullifier key is already marked consumed under the committed
    /// ledger root.
    #[error("nullifier was already consumed")]
    NullifierAlreadyUsed,

    /// The supplied ledger path proves neither the unused nor the used
    /// state of the key against the committed root.
    #[error("nullifier ledger path does not match the committed root")]
    NullifierLedgerMismatch,

    /// Flag one claims exclusivity while another flag is set.
    #[error("flag rule 1 violated: flag 1 excludes every other flag")]
    FlagRule1Violated,

    /// Flag two is set without the flag three it requires.
    #[error("flag rule 2 violated: flag 2 requires flag 3")]
    FlagRule2Violated,

    /// Flag four is set together with flag five or six.
    #[error("flag rule 3 violated: flag 4 excludes flags 5 and 6")]
    FlagRule3Violated,
}

impl From<MerkleError> for ManagerError {
    fn from(_: MerkleError) -> Self {
        // The only structural paths a deposit folds are ledger paths, so a
        // malformed one is indistinguishable from a desynchronized ledger.
        ManagerError::NullifierLedgerMismatch
    }
}
