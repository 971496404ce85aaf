//! Replay-protection nullifiers over bn256 G1.
//!
//! A nullifier lets a key holder prove "this key speaks for this domain
//! message" exactly once. The holder of `sk` publishes `N = sk * H(msg)`
//! for a hash-to-curve base `H(msg)`, together with a Chaum-Pedersen proof
//! that the same exponent links `pk = sk * G` and `N`. Because `N` is a
//! pure function of `(sk, msg)`, its Poseidon image works as a one-shot
//! ledger key: a second submission from the same key lands on the same
//! leaf. The proof nonce is derived from the secret and the message, so
//! derivation needs no randomness and repeats bit-for-bit.

use group::{Curve, Group, GroupEncoding};
use halo2curves_axiom::bn256::{Fr, G1, G1Affine};
use halo2curves_axiom::ff::Field;
use halo2curves_axiom::CurveExt;
use once_cell::sync::Lazy;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zkmsg_common::{domain_scalar, fq_to_fr, fr_to_bytes, poseidon_hash, reduce_be_bytes_to_fr};

/// Separates the nullifier hash-to-curve from any other bn256 use.
const NULLIFIER_BASE_DOMAIN: &str = "zkmsg/v1/nullifier-base";
const CHALLENGE_DOMAIN: &[u8] = b"zkmsg/v1/nullifier-challenge";

static NONCE_DOMAIN: Lazy<Fr> = Lazy::new(|| domain_scalar("zkmsg/v1/nullifier-nonce"));

/// Why a nullifier failed verification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NullifierError {
    #[error("nullifier carries an identity point")]
    IdentityPoint,
    #[error("nullifier belongs to a different signer")]
    SignerMismatch,
    #[error("discrete-log equality proof does not verify")]
    ProofRejected,
}

/// bn256 G1 public key.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PublicKey(#[serde(with = "serde_g1")] G1Affine);

impl PublicKey {
    pub fn point(&self) -> &G1Affine {
        &self.0
    }

    /// Coordinates reduced into the scalar field, in hashing order.
    pub fn hash_fields(&self) -> (Fr, Fr) {
        (fq_to_fr(&self.0.x), fq_to_fr(&self.0.y))
    }

    /// Poseidon image of the point, the registry leaf value for this key.
    pub fn hash(&self) -> Fr {
        let (x, y) = self.hash_fields();
        poseidon_hash(&[x, y])
    }
}

/// Signing key with its public counterpart.
#[derive(Clone, Debug)]
pub struct Keypair {
    secret: Fr,
    public: PublicKey,
}

impl Keypair {
    /// Sample a fresh keypair.
    pub fn generate(rng: &mut impl RngCore) -> Self {
        Self::from_secret(Fr::random(&mut *rng))
    }

    /// Keypair for an existing secret scalar.
    pub fn from_secret(secret: Fr) -> Self {
        let public = PublicKey((G1::generator() * secret).to_affine());
        Self { secret, public }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Derive this key's nullifier for `message`.
    pub fn derive_nullifier(&self, message: Fr) -> Nullifier {
        let base = message_base(message);
        let point = (base * self.secret).to_affine();

        // derived nonce: repeatable, never reused across messages
        let nonce = poseidon_hash(&[*NONCE_DOMAIN, self.secret, message]);
        let commitment_g = (G1::generator() * nonce).to_affine();
        let commitment_m = (base * nonce).to_affine();
        let challenge = challenge_scalar(
            &self.public.0,
            &point,
            &commitment_g,
            &commitment_m,
            message,
        );
        let response = nonce + challenge * self.secret;

        Nullifier {
            public_key: self.public,
            point,
            challenge,
            response,
        }
    }
}

/// A nullifier point plus the proof it was honestly derived.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Nullifier {
    pub public_key: PublicKey,
    #[serde(with = "serde_g1")]
    point: G1Affine,
    #[serde(with = "zkmsg_common::serde_fr")]
    challenge: Fr,
    #[serde(with = "zkmsg_common::serde_fr")]
    response: Fr,
}

impl Nullifier {
    pub fn point(&self) -> &G1Affine {
        &self.point
    }

    /// Check the Chaum-Pedersen proof against `message`.
    pub fn verify(&self, message: Fr) -> Result<(), NullifierError> {
        let pk = G1::from(self.public_key.0);
        let point = G1::from(self.point);
        if bool::from(pk.is_identity()) || bool::from(point.is_identity()) {
            return Err(NullifierError::IdentityPoint);
        }

        let base = message_base(message);
        let commitment_g = (G1::generator() * self.response - pk * self.challenge).to_affine();
        let commitment_m = (base * self.response - point * self.challenge).to_affine();
        let expected = challenge_scalar(
            &self.public_key.0,
            &self.point,
            &commitment_g,
            &commitment_m,
            message,
        );
        if expected != self.challenge {
            return Err(NullifierError::ProofRejected);
        }
        Ok(())
    }

    /// [`verify`](Self::verify), plus the check that the nullifier was
    /// derived by `signer` and not by some other key. An honestly derived
    /// foreign nullifier passes the proof check on its own, so anyone
    /// consuming nullifiers on behalf of a known signer must use this
    /// entry point.
    pub fn verify_for(&self, signer: &PublicKey, message: Fr) -> Result<(), NullifierError> {
        if self.public_key != *signer {
            return Err(NullifierError::SignerMismatch);
        }
        self.verify(message)
    }

    /// Ledger lookup key: Poseidon image of the nullifier point.
    pub fn key(&self) -> Fr {
        poseidon_hash(&[fq_to_fr(&self.point.x), fq_to_fr(&self.point.y)])
    }
}

fn message_base(message: Fr) -> G1 {
    let hasher = G1::hash_to_curve(NULLIFIER_BASE_DOMAIN);
    hasher(&fr_to_bytes(&message))
}

fn challenge_scalar(
    public_key: &G1Affine,
    point: &G1Affine,
    commitment_g: &G1Affine,
    commitment_m: &G1Affine,
    message: Fr,
) -> Fr {
    let mut hasher = blake3::Hasher::new();
    hasher.update(CHALLENGE_DOMAIN);
    for p in [public_key, point, commitment_g, commitment_m] {
        hasher.update(p.to_bytes().as_ref());
    }
    hasher.update(&fr_to_bytes(&message));
    reduce_be_bytes_to_fr(hasher.finalize().as_bytes())
}

/// Serde adapter for compressed G1 points as hex strings.
mod serde_g1 {
    use std::fmt;

    use group::GroupEncoding;
    use halo2curves_axiom::bn256::G1Affine;
    use serde::{de, Deserializer, Serializer};

    pub fn serialize<S>(point: &G1Affine, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let hex_str = format!("0x{}", hex::encode(point.to_bytes().as_ref()));
        serializer.serialize_str(&hex_str)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<G1Affine, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PointVisitor;

        impl de::Visitor<'_> for PointVisitor {
            type Value = G1Affine;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a compressed bn256 point as hex (with or without 0x prefix)")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                let hex_str = v.strip_prefix("0x").unwrap_or(v);
                let mut repr = <G1Affine as GroupEncoding>::Repr::default();
                let expected_len = repr.as_ref().len() * 2;
                if hex_str.len() != expected_len {
                    return Err(E::custom(format!(
                        "expected {} hex chars, got {}",
                        expected_len,
                        hex_str.len()
                    )));
                }
                hex::decode_to_slice(hex_str, repr.as_mut()).map_err(E::custom)?;
                Option::from(G1Affine::from_bytes(&repr))
                    .ok_or_else(|| E::custom("invalid bn256 point encoding"))
            }
        }

        deserializer.deserialize_str(PointVisitor)
    }
}
