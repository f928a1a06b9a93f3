//! Parameter sets for the MPC-in-the-Head engine.
//!
//! The presets follow the AIMer-style 2-round instantiation and are sized for
//! the NIST levels: seeds of λ bits, `τ · log2 N ≥ λ`, and digests of 2λ bits.
//! - `PARAMS_L1_N16` / `PARAMS_L1_N256`: Level-1-sized (λ = 128)
//! - `PARAMS_L3_N16`: Level-3-sized (λ = 192)
//! - `PARAMS_L5_N16`: Level-5-sized (λ = 256)
//!
//! Sizing is not a security claim. The soundness of a preset also depends on
//! the relation it is used with: the bundled bilinear demo relation has a
//! single check value per repetition and has not been analysed against
//! Fiat-Shamir grinding, so it falls well short of λ bits.
//!
//! `PARAMS_TEST` is tiny and NOT secure; it exists for fast tests.

use crate::error::{MpcithError, Result};

/// Largest supported party count; keeps every tree node index within a `u16`.
pub const MAX_PARTIES: usize = 1 << 15;

/// Engine parameters for one security level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Params {
    /// Seed length S in bytes (16, 24 or 32)
    pub security_bytes: usize,

    /// Number of virtual parties N (power of two)
    pub num_parties: usize,

    /// Number of parallel repetitions τ
    pub repetitions: usize,

    /// Digest length D in bytes (h1, h2, commitments)
    pub digest_bytes: usize,

    /// Salt length in bytes
    pub salt_bytes: usize,

    /// NIST level the sizes target (1, 3, or 5; 0 for test parameters)
    pub security_level: usize,
}

impl Params {
    /// Creates and validates a parameter set.
    pub fn new(
        security_bytes: usize,
        num_parties: usize,
        repetitions: usize,
        digest_bytes: usize,
        salt_bytes: usize,
        security_level: usize,
    ) -> Result<Self> {
        let params = Params {
            security_bytes,
            num_parties,
            repetitions,
            digest_bytes,
            salt_bytes,
            security_level,
        };
        params.validate()?;
        Ok(params)
    }

    /// Checks the structural constraints the engine relies on.
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.security_bytes, 16 | 24 | 32) {
            return Err(MpcithError::InvalidParams {
                reason: "security_bytes must be 16, 24 or 32",
            });
        }
        if self.num_parties < 2 || !self.num_parties.is_power_of_two() {
            return Err(MpcithError::InvalidParams {
                reason: "num_parties must be a power of two >= 2",
            });
        }
        if self.num_parties > MAX_PARTIES {
            return Err(MpcithError::InvalidParams {
                reason: "num_parties exceeds 2^15",
            });
        }
        if self.repetitions == 0 || self.repetitions > u16::MAX as usize {
            return Err(MpcithError::InvalidParams {
                reason: "repetitions must be in 1..=65535",
            });
        }
        if self.digest_bytes < self.security_bytes {
            return Err(MpcithError::InvalidParams {
                reason: "digest_bytes must be at least security_bytes",
            });
        }
        if self.salt_bytes == 0 {
            return Err(MpcithError::InvalidParams {
                reason: "salt_bytes must be non-zero",
            });
        }
        Ok(())
    }

    /// Hypercube dimension d = log2(N).
    pub const fn depth(&self) -> usize {
        self.num_parties.trailing_zeros() as usize
    }

    /// Number of nodes in one seed tree (2N − 1).
    pub const fn tree_nodes(&self) -> usize {
        2 * self.num_parties - 1
    }

    /// Size of one co-path in bytes: log2(N) · S.
    pub const fn copath_bytes(&self) -> usize {
        self.depth() * self.security_bytes
    }

    /// Bytes drawn from the CSPRNG per signing attempt: salt ‖ master seed.
    pub const fn randomness_bytes(&self) -> usize {
        self.salt_bytes + self.security_bytes
    }

    /// Size of the fixed signature header: salt ‖ h1 ‖ h2.
    pub const fn header_bytes(&self) -> usize {
        self.salt_bytes + 2 * self.digest_bytes
    }
}

// ============================================================================
// Parameter presets
// ============================================================================

/// Small parameters for fast testing (NOT secure).
pub const PARAMS_TEST: Params = Params {
    security_bytes: 16,
    num_parties: 4,
    repetitions: 4,
    digest_bytes: 32,
    salt_bytes: 32,
    security_level: 0,
};

/// Level-1-sized, 16 parties, 33 repetitions (demo relation not analysed).
pub const PARAMS_L1_N16: Params = Params {
    security_bytes: 16,
    num_parties: 16,
    repetitions: 33,
    digest_bytes: 32,
    salt_bytes: 32,
    security_level: 1,
};

/// Level-1-sized, 256 parties, 17 repetitions (shorter, slower; demo relation not analysed).
pub const PARAMS_L1_N256: Params = Params {
    security_bytes: 16,
    num_parties: 256,
    repetitions: 17,
    digest_bytes: 32,
    salt_bytes: 32,
    security_level: 1,
};

/// Level-3-sized, 16 parties, 49 repetitions (demo relation not analysed).
pub const PARAMS_L3_N16: Params = Params {
    security_bytes: 24,
    num_parties: 16,
    repetitions: 49,
    digest_bytes: 48,
    salt_bytes: 48,
    security_level: 3,
};

/// Level-5-sized, 16 parties, 65 repetitions (demo relation not analysed).
pub const PARAMS_L5_N16: Params = Params {
    security_bytes: 32,
    num_parties: 16,
    repetitions: 65,
    digest_bytes: 64,
    salt_bytes: 64,
    security_level: 5,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        for p in [
            PARAMS_TEST,
            PARAMS_L1_N16,
            PARAMS_L1_N256,
            PARAMS_L3_N16,
            PARAMS_L5_N16,
        ] {
            assert!(p.validate().is_ok(), "{:?}", p);
        }
    }

    #[test]
    fn test_presets_sized_for_their_level() {
        for (p, lambda) in [
            (PARAMS_L1_N16, 128),
            (PARAMS_L1_N256, 128),
            (PARAMS_L3_N16, 192),
            (PARAMS_L5_N16, 256),
        ] {
            assert_eq!(p.security_bytes * 8, lambda, "{:?}", p);
            assert_eq!(p.digest_bytes * 8, 2 * lambda, "{:?}", p);
            assert!(p.repetitions * p.depth() >= lambda, "{:?}", p);
        }
    }

    #[test]
    fn test_l1_n16_sizes() {
        let p = PARAMS_L1_N16;
        assert_eq!(p.depth(), 4);
        assert_eq!(p.tree_nodes(), 31);
        assert_eq!(p.copath_bytes(), 64);
        assert_eq!(p.header_bytes(), 96);
        assert_eq!(p.randomness_bytes(), 48);
    }

    #[test]
    fn test_l1_n256_depth() {
        assert_eq!(PARAMS_L1_N256.depth(), 8);
        assert_eq!(PARAMS_L1_N256.copath_bytes(), 128);
    }

    #[test]
    fn test_rejects_non_power_of_two_parties() {
        let err = Params::new(16, 12, 10, 32, 32, 1).unwrap_err();
        assert!(matches!(err, MpcithError::InvalidParams { .. }));
    }

    #[test]
    fn test_rejects_single_party() {
        assert!(Params::new(16, 1, 10, 32, 32, 1).is_err());
    }

    #[test]
    fn test_rejects_too_many_parties() {
        assert!(Params::new(16, 1 << 16, 10, 32, 32, 1).is_err());
        assert!(Params::new(16, MAX_PARTIES, 10, 32, 32, 1).is_ok());
    }

    #[test]
    fn test_rejects_bad_seed_size() {
        assert!(Params::new(20, 16, 10, 32, 32, 1).is_err());
    }

    #[test]
    fn test_rejects_short_digest() {
        assert!(Params::new(32, 16, 10, 16, 32, 5).is_err());
    }

    #[test]
    fn test_rejects_zero_repetitions() {
        assert!(Params::new(16, 16, 0, 32, 32, 1).is_err());
    }
}
