//! Full scenarios across the registrar, the validator and the off-chain
//! mirror, driven only through the public API.

use halo2curves_axiom::bn256::Fr;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use zkmsg_manager::{Address, LedgerMirror, ManagerError, Message, MessageManager, MAX_ELIGIBLE};
use zkmsg_merkle::{CommitmentTree, EligibilityDomain, MessageDomain};
use zkmsg_nullifier::{Keypair, NullifierError};

// === Test Fixtures ===

fn sample_keypair(seed: u64) -> Keypair {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    Keypair::generate(&mut rng)
}

fn register(manager: &mut MessageManager, mirror: &mut LedgerMirror, address: &Address) {
    let path = mirror.stage_registration().unwrap();
    manager.add_eligible_address(address, &path).unwrap();
    mirror.record_registration(address).unwrap();
}

fn deposit(
    manager: &mut MessageManager,
    mirror: &mut LedgerMirror,
    keypair: &Keypair,
    data: Fr,
) -> Result<(), ManagerError> {
    let address = Address::new(*keypair.public_key());
    let message = Message::new(*keypair.public_key(), data);
    let nullifier = keypair.derive_nullifier(manager.store().nullifier_message());
    let address_witness = mirror.eligibility_path(&address).unwrap();
    let message_witness = mirror.stage_message().unwrap();
    let result = manager.deposit_message(
        mirror,
        &address,
        &message,
        &address_witness,
        &message_witness,
        &nullifier,
    );
    if result.is_ok() {
        mirror.record_deposit(&message, &nullifier.key()).unwrap();
    }
    result
}

// === Scenarios ===

#[test]
fn the_first_hundred_registrations_fill_the_registry() {
    let mut manager = MessageManager::deploy();
    // Drive the registry straight off a local tree so the test can reach
    // past the bound the mirror itself refuses to stage.
    let mut registry = CommitmentTree::<EligibilityDomain>::new();

    for seed in 0..MAX_ELIGIBLE {
        let address = Address::new(*sample_keypair(seed).public_key());
        let path = registry.witness(registry.leaf_count() as u8);
        manager.add_eligible_address(&address, &path).unwrap();
        registry.append(address.hash()).unwrap();
        assert_eq!(
            manager.store().eligible_addresses_commitment(),
            registry.root()
        );
    }

    let extra = Address::new(*sample_keypair(MAX_ELIGIBLE).public_key());
    let path = registry.witness(MAX_ELIGIBLE as u8);
    assert_eq!(
        manager.add_eligible_address(&extra, &path),
        Err(ManagerError::CapacityExceeded)
    );
    assert_eq!(
        manager.store().eligible_addresses_commitment(),
        registry.root()
    );
}

#[test]
fn a_registered_sender_deposits_exactly_once() {
    let mut manager = MessageManager::deploy();
    let mut mirror = LedgerMirror::new();
    let keypair = sample_keypair(1);
    let address = Address::new(*keypair.public_key());

    register(&mut manager, &mut mirror, &address);
    let roots_before = (
        manager.store().messages_commitment(),
        manager.store().nullifier_root(),
    );

    deposit(&mut manager, &mut mirror, &keypair, Fr::from(32u64)).unwrap();
    assert_ne!(manager.store().messages_commitment(), roots_before.0);
    assert_ne!(manager.store().nullifier_root(), roots_before.1);
    assert_eq!(manager.events().range(0, 1)[0].data, Fr::from(32u64));

    // Replay with fresh witnesses still trips on the consumed nullifier.
    let result = deposit(&mut manager, &mut mirror, &keypair, Fr::from(32u64));
    assert_eq!(result, Err(ManagerError::NullifierAlreadyUsed));
    assert_eq!(manager.events().len(), 1);

    // Nor does a throwaway keypair reopen the account: the nullifier has
    // to come from the registered signer itself.
    let throwaway = sample_keypair(2);
    let foreign = throwaway.derive_nullifier(manager.store().nullifier_message());
    let message = Message::new(*keypair.public_key(), Fr::from(8u64));
    let result = manager.deposit_message(
        &mirror,
        &address,
        &message,
        &mirror.eligibility_path(&address).unwrap(),
        &mirror.stage_message().unwrap(),
        &foreign,
    );
    assert_eq!(
        result,
        Err(ManagerError::NullifierMalformed(
            NullifierError::SignerMismatch
        ))
    );
    assert_eq!(manager.events().len(), 1);
}

#[test]
fn stale_mirror_paths_are_rejected_after_a_race() {
    let mut manager = MessageManager::deploy();
    let mut mirror = LedgerMirror::new();
    let first = sample_keypair(2);
    let second = sample_keypair(3);
    register(&mut manager, &mut mirror, &Address::new(*first.public_key()));
    register(
        &mut manager,
        &mut mirror,
        &Address::new(*second.public_key()),
    );

    // Both senders prepared against the same state; the first lands.
    let stale = mirror.clone();
    deposit(&mut manager, &mut mirror, &first, Fr::from(32u64)).unwrap();

    // The second sender's ledger path predates the race and no longer
    // folds to the committed nullifier root.
    let address = Address::new(*second.public_key());
    let message = Message::new(*second.public_key(), Fr::from(8u64));
    let nullifier = second.derive_nullifier(manager.store().nullifier_message());
    let result = manager.deposit_message(
        &stale,
        &address,
        &message,
        &stale.eligibility_path(&address).unwrap(),
        &stale.stage_message().unwrap(),
        &nullifier,
    );
    assert_eq!(result, Err(ManagerError::NullifierLedgerMismatch));

    // Rebuilt against the current mirror, the same deposit goes through.
    deposit(&mut manager, &mut mirror, &second, Fr::from(8u64)).unwrap();
    assert_eq!(manager.events().len(), 2);
}

#[test]
fn the_log_and_roots_match_an_independent_rebuild() {
    let mut manager = MessageManager::deploy();
    let mut mirror = LedgerMirror::new();
    let payloads = [32u64, 8, 1];
    let keypairs: Vec<Keypair> = (10..13).map(sample_keypair).collect();

    for keypair in &keypairs {
        register(
            &mut manager,
            &mut mirror,
            &Address::new(*keypair.public_key()),
        );
    }
    for (keypair, payload) in keypairs.iter().zip(payloads) {
        deposit(&mut manager, &mut mirror, keypair, Fr::from(payload)).unwrap();
    }

    // A bystander replaying the event log regrows the same message tree.
    let mut rebuilt = CommitmentTree::<MessageDomain>::new();
    for (keypair, event) in keypairs.iter().zip(manager.events().range(0, 3)) {
        let message = Message::new(*keypair.public_key(), event.data);
        rebuilt.append(message.hash()).unwrap();
    }
    assert_eq!(manager.store().messages_commitment(), rebuilt.root());

    let observed: Vec<Fr> = manager
        .events()
        .range(0, manager.events().len())
        .iter()
        .map(|event| event.data)
        .collect();
    let expected: Vec<Fr> = payloads.iter().map(|value| Fr::from(*value)).collect();
    assert_eq!(observed, expected);
    assert_eq!(manager.events().range(1, 3).len(), 2);
}
