//! Shared bn256 field helpers for the zkmsg workspace.
//!
//! Every commitment in the system is a BN254 scalar produced by the same
//! native Poseidon sponge; this crate owns those parameters together with
//! the byte-level scalar conversions and serde adapters the other crates
//! share.

use anyhow::{anyhow, Result};
use halo2curves_axiom::{
    bn256::{Fq, Fr},
    ff::{Field, PrimeField},
};
use poseidon_primitives::poseidon::primitives::{ConstantLength, Hash as PoseidonHash, Spec};

const POSEIDON_T: usize = 6;
const POSEIDON_RATE: usize = 5;
const POSEIDON_FULL_ROUNDS: usize = 8;
const POSEIDON_PARTIAL_ROUNDS: usize = 57;

/// Poseidon hash of a fixed-length scalar input.
pub fn poseidon_hash<const L: usize>(values: &[Fr; L]) -> Fr {
    PoseidonHash::<Fr, MsgPoseidonSpec, ConstantLength<L>, POSEIDON_T, POSEIDON_RATE>::init()
        .hash(*values)
}

/// One tree level: parent = Poseidon(left, right).
pub fn hash_pair(left: Fr, right: Fr) -> Fr {
    poseidon_hash(&[left, right])
}

/// Domain-separated scalar derived from a tag string.
pub fn domain_scalar(tag: &str) -> Fr {
    reduce_be_bytes_to_fr(blake3::hash(tag.as_bytes()).as_bytes())
}

pub fn fr_to_bytes(fr: &Fr) -> [u8; 32] {
    let repr = fr.to_repr();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(repr.as_ref());
    bytes
}

pub fn fr_from_bytes(bytes: &[u8; 32]) -> Result<Fr> {
    Fr::from_bytes(bytes)
        .into_option()
        .ok_or_else(|| anyhow!("invalid bn256 scalar encoding"))
}

/// Interpret 32 big-endian bytes as an integer and reduce it into the
/// scalar field.
pub fn reduce_be_bytes_to_fr(bytes: &[u8; 32]) -> Fr {
    let mut acc = Fr::zero();
    let base = Fr::from(256);
    for byte in bytes.iter() {
        acc = acc * base + Fr::from(*byte as u64);
    }
    acc
}

/// Reduce a base-field coordinate into the scalar field.
pub fn fq_to_fr(fq: &Fq) -> Fr {
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(fq.to_repr().as_ref());
    bytes.reverse();
    reduce_be_bytes_to_fr(&bytes)
}

#[derive(Debug)]
struct MsgPoseidonSpec;

impl Spec<Fr, POSEIDON_T, POSEIDON_RATE> for MsgPoseidonSpec {
    fn full_rounds() -> usize {
        POSEIDON_FULL_ROUNDS
    }

    fn partial_rounds() -> usize {
        POSEIDON_PARTIAL_ROUNDS
    }

    fn sbox(val: Fr) -> Fr {
        val.pow_vartime([5])
    }

    fn secure_mds() -> usize {
        0
    }
}

/// Serde adapter for `Fr` as 32-byte hex (little-endian, matching halo2's
/// `to_repr`).
pub mod serde_fr {
    use std::fmt;

    use halo2curves_axiom::bn256::Fr;
    use halo2curves_axiom::ff::PrimeField;
    use serde::{de, Deserializer, Serializer};

    use super::fr_to_bytes;

    pub fn serialize<S>(fr: &Fr, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let hex_str = format!("0x{}", hex::encode(fr_to_bytes(fr)));
        serializer.serialize_str(&hex_str)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fr, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FrVisitor;

        impl de::Visitor<'_> for FrVisitor {
            type Value = Fr;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a 32-byte hex string (with or without 0x prefix)")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                let hex_str = v.strip_prefix("0x").unwrap_or(v);
                if hex_str.len() != 64 {
                    return Err(E::custom(format!(
                        "expected 64 hex chars, got {}",
                        hex_str.len()
                    )));
                }
                let mut bytes = [0u8; 32];
                hex::decode_to_slice(hex_str, &mut bytes).map_err(E::custom)?;
                Fr::from_repr(bytes)
                    .into_option()
                    .ok_or_else(|| E::custom("invalid field element encoding"))
            }
        }

        deserializer.deserialize_str(FrVisitor)
    }
}

/// Serde adapter for `Vec<Fr>`, one [`serde_fr`] hex string per element.
pub mod serde_fr_vec {
    use halo2curves_axiom::bn256::Fr;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Hex(#[serde(with = "super::serde_fr")] Fr);

    pub fn serialize<S>(values: &[Fr], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let wrapped: Vec<Hex> = values.iter().copied().map(Hex).collect();
        wrapped.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Fr>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wrapped = Vec::<Hex>::deserialize(deserializer)?;
        Ok(wrapped.into_iter().map(|h| h.0).collect())
    }
}

/// Serde adapter for fixed-length `Fr` arrays such as sibling paths.
pub mod serde_fr_array {
    use halo2curves_axiom::bn256::Fr;
    use serde::{de, Deserializer, Serializer};

    pub fn serialize<S, const N: usize>(values: &[Fr; N], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        super::serde_fr_vec::serialize(values, serializer)
    }

    pub fn deserialize<'de, D, const N: usize>(deserializer: D) -> Result<[Fr; N], D::Error>
    where
        D: Deserializer<'de>,
    {
        let values = super::serde_fr_vec::deserialize(deserializer)?;
        if values.len() != N {
            return Err(de::Error::invalid_length(
                values.len(),
                &"a full sibling path",
            ));
        }
        let mut out = [Fr::zero(); N];
        out.copy_from_slice(&values);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Serialize, Deserialize)]
    struct HexFr(#[serde(with = "serde_fr")] Fr);

    #[test]
    fn fr_bytes_round_trip() {
        let value = Fr::from(2024u64);
        let bytes = fr_to_bytes(&value);
        let reconstructed = fr_from_bytes(&bytes).unwrap();
        assert_eq!(value, reconstructed);
    }

    #[test]
    fn reduce_reads_big_endian() {
        let mut bytes = [0u8; 32];
        bytes[31] = 7;
        assert_eq!(reduce_be_bytes_to_fr(&bytes), Fr::from(7u64));
        bytes[30] = 1;
        assert_eq!(reduce_be_bytes_to_fr(&bytes), Fr::from(263u64));
    }

    #[test]
    fn poseidon_arity_separates_inputs() {
        let two = poseidon_hash(&[Fr::from(1u64), Fr::from(2u64)]);
        assert_eq!(two, hash_pair(Fr::from(1u64), Fr::from(2u64)));
        assert_ne!(
            two,
            poseidon_hash(&[Fr::from(1u64), Fr::from(2u64), Fr::zero()])
        );
    }

    #[test]
    fn domain_scalars_differ_by_tag() {
        assert_eq!(domain_scalar("zkmsg/test/a"), domain_scalar("zkmsg/test/a"));
        assert_ne!(domain_scalar("zkmsg/test/a"), domain_scalar("zkmsg/test/b"));
    }

    #[test]
    fn small_coordinates_reduce_to_the_same_scalar() {
        assert_eq!(fq_to_fr(&Fq::from(5u64)), Fr::from(5u64));
        assert_ne!(fq_to_fr(&Fq::from(1u64)), fq_to_fr(&Fq::from(2u64)));
    }

    #[test]
    fn serde_fr_emits_prefixed_hex() {
        let json = serde_json::to_string(&HexFr(Fr::from(2024u64))).unwrap();
        assert!(json.starts_with("\"0x"));
        let decoded: HexFr = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.0, Fr::from(2024u64));
    }

    #[test]
    fn serde_fr_rejects_short_hex() {
        assert!(serde_json::from_str::<HexFr>("\"0x1234\"").is_err());
    }
}
