//! Commitment-store state transitions for an eligibility-gated message
//! log with single-use deposit rights.
//!
//! The authoritative state is four scalars:
//!
//! ```text
//!   CommitmentStore
//!   +--------------------------------+
//!   | eligible_addresses_commitment  |  root of the registry tree
//!   | messages_commitment            |  root of the message log tree
//!   | nullifier_root                 |  root of the consumed-key map
//!   | nullifier_message              |  fixed deposit domain scalar
//!   +--------------------------------+
//! ```
//!
//! Two transitions move it. [`MessageManager::add_eligible_address`]
//! registers a participant into the bounded registry. Deposits go through
//! [`MessageManager::deposit_message`], which verifies the sender's
//! nullifier against the pinned domain scalar, consumes it under the
//! ledger root, checks registry membership and the payload flag rules,
//! and only then advances the nullifier and message roots together.
//!
//! The full structures behind those roots live off to the side: callers
//! keep a [`LedgerMirror`] in lock-step with accepted operations and feed
//! its witnesses back in. The store never trusts the mirror beyond what a
//! witness proves against a pinned root.

pub mod error;
pub mod events;
pub mod flags;
pub mod ledger;
pub mod manager;
pub mod mirror;
pub mod store;
pub mod types;

pub use error::ManagerError;
pub use events::{EventLog, MessageDeposited};
pub use flags::MessageFlags;
pub use ledger::{unused_marker, used_marker, NullifierLedger};
pub use manager::{MessageManager, MAX_ELIGIBLE};
pub use mirror::LedgerMirror;
pub use store::{CommitmentStore, NULLIFIER_MESSAGE};
pub use types::{Address, Message};
