//! Flag window of a message payload and the rules tying the flags together.

use halo2curves_axiom::bn256::Fr;
use halo2curves_axiom::ff::PrimeField;

use crate::error::ManagerError;

/// The six behavior flags carried in the low bits of a message payload.
///
/// Flag one has bit weight 32 and flag six has bit weight 1, so the
/// payload `0b100000` sets flag one alone. Bits above the window carry
/// free-form payload and are ignored here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MessageFlags {
    pub f1: bool,
    pub f2: bool,
    pub f3: bool,
    pub f4: bool,
    pub f5: bool,
    pub f6: bool,
}

impl MessageFlags {
    /// Read the six-bit flag window out of a payload scalar.
    pub fn decode(data: &Fr) -> Self {
        let low = data.to_repr().as_ref()[0];
        MessageFlags {
            f1: low & 0b10_0000 != 0,
            f2: low & 0b01_0000 != 0,
            f3: low & 0b00_1000 != 0,
            f4: low & 0b00_0100 != 0,
            f5: low & 0b00_0010 != 0,
            f6: low & 0b00_0001 != 0,
        }
    }

    /// Enforce the three flag rules, reporting the first one broken.
    ///
    /// Rule 1: flag one set means no other flag may be set.
    /// Rule 2: flag two set requires flag three.
    /// Rule 3: flag four set means flags five and six must be clear.
    pub fn check_rules(&self) -> Result<(), ManagerError> {
        if self.f1 && (self.f2 || self.f3 || self.f4 || self.f5 || self.f6) {
            return Err(ManagerError::FlagRule1Violated);
        }
        if self.f2 && !self.f3 {
            return Err(ManagerError::FlagRule2Violated);
        }
        if self.f4 && (self.f5 || self.f6) {
            return Err(ManagerError::FlagRule3Violated);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags_of(value: u64) -> MessageFlags {
        MessageFlags::decode(&Fr::from(value))
    }

    #[test]
    fn decode_matches_the_bit_weights() {
        for value in 0u64..64 {
            let flags = flags_of(value);
            assert_eq!(flags, flags_of(value));
            assert_eq!(flags.f1, value & 32 != 0);
            assert_eq!(flags.f2, value & 16 != 0);
            assert_eq!(flags.f3, value & 8 != 0);
            assert_eq!(flags.f4, value & 4 != 0);
            assert_eq!(flags.f5, value & 2 != 0);
            assert_eq!(flags.f6, value & 1 != 0);
        }
    }

    #[test]
    fn rules_follow_the_implication_table() {
        for value in 0u64..64 {
            let f1 = value & 32 != 0;
            let f2 = value & 16 != 0;
            let f3 = value & 8 != 0;
            let f4 = value & 4 != 0;
            let f5 = value & 2 != 0;
            let f6 = value & 1 != 0;
            let expected = if f1 && (f2 || f3 || f4 || f5 || f6) {
                Err(ManagerError::FlagRule1Violated)
            } else if f2 && !f3 {
                Err(ManagerError::FlagRule2Violated)
            } else if f4 && (f5 || f6) {
                Err(ManagerError::FlagRule3Violated)
            } else {
                Ok(())
            };
            assert_eq!(flags_of(value).check_rules(), expected, "payload {value}");
        }
    }

    #[test]
    fn the_canonical_payloads_split_as_expected() {
        assert_eq!(flags_of(32).check_rules(), Ok(()));
        assert_eq!(
            flags_of(33).check_rules(),
            Err(ManagerError::FlagRule1Violated)
        );
        assert_eq!(
            flags_of(16).check_rules(),
            Err(ManagerError::FlagRule2Violated)
        );
        assert_eq!(
            flags_of(5).check_rules(),
            Err(ManagerError::FlagRule3Violated)
        );
    }

    #[test]
    fn bits_above_the_window_do_not_reach_the_decoder() {
        assert_eq!(flags_of(96), flags_of(32));
        let shifted = MessageFlags::decode(&Fr::from_raw([33, 0, 0, 1]));
        assert_eq!(shifted, flags_of(33));
    }
}
