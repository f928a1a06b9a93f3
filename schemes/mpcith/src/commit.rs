//! Party commitments.
//!
//! commit = SHAKE(Commit ‖ salt ‖ u16(repetition) ‖ u16(party) ‖ seed ‖ state, D)
//!
//! `state` is empty for every party except the last one, whose forced witness
//! and correction shares are bound here.

use crate::hash::{Domain, Xof, XofX4};
use crate::params::Params;

/// Commits to one party's seed and public state.
pub fn commit(
    seed: &[u8],
    state: &[u8],
    salt: &[u8],
    repetition: u16,
    party: u16,
    params: &Params,
) -> Vec<u8> {
    let mut xof = Xof::with_domain(params.digest_bytes, Domain::Commit);
    xof.absorb(salt)
        .absorb_u16(repetition)
        .absorb_u16(party)
        .absorb(seed)
        .absorb(state);
    xof.digest(params.digest_bytes)
}

/// Four commitments at once; identical to four calls to [`commit`].
pub fn commit_x4(
    seeds: [&[u8]; 4],
    states: [&[u8]; 4],
    salt: &[u8],
    repetition: u16,
    parties: [u16; 4],
    params: &Params,
) -> [Vec<u8>; 4] {
    let d = params.digest_bytes;
    let mut x4 = XofX4::with_domain(d, Domain::Commit);
    x4.absorb_all(salt)
        .absorb_u16_each([repetition; 4])
        .absorb_u16_each(parties)
        .absorb_each(seeds)
        .absorb_each(states);

    let mut out = [(); 4].map(|_| vec![0u8; d]);
    {
        let [a, b, c, e] = &mut out;
        x4.finalize()
            .squeeze_each([&mut a[..], &mut b[..], &mut c[..], &mut e[..]]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{PARAMS_L1_N16, PARAMS_L3_N16};

    #[test]
    fn test_commit_length() {
        for p in [PARAMS_L1_N16, PARAMS_L3_N16] {
            let salt = vec![0u8; p.salt_bytes];
            let c = commit(&[1u8; 16], b"", &salt, 0, 0, &p);
            assert_eq!(c.len(), p.digest_bytes);
        }
    }

    #[test]
    fn test_commit_binds_every_input() {
        let p = PARAMS_L1_N16;
        let salt = vec![0u8; p.salt_bytes];
        let base = commit(&[1u8; 16], b"state", &salt, 3, 5, &p);

        let mut other_salt = salt.clone();
        other_salt[31] = 1;
        assert_ne!(base, commit(&[2u8; 16], b"state", &salt, 3, 5, &p));
        assert_ne!(base, commit(&[1u8; 16], b"statf", &salt, 3, 5, &p));
        assert_ne!(base, commit(&[1u8; 16], b"state", &other_salt, 3, 5, &p));
        assert_ne!(base, commit(&[1u8; 16], b"state", &salt, 4, 5, &p));
        assert_ne!(base, commit(&[1u8; 16], b"state", &salt, 3, 6, &p));
    }

    #[test]
    fn test_x4_matches_sequential() {
        let p = PARAMS_L3_N16;
        let salt = vec![7u8; p.salt_bytes];
        let seeds = [[0u8; 24], [1u8; 24], [2u8; 24], [3u8; 24]];
        let states: [&[u8]; 4] = [b"", b"", b"x", b"longer state"];
        let parties = [0u16, 1, 2, 15];

        let batched = commit_x4(
            [&seeds[0][..], &seeds[1][..], &seeds[2][..], &seeds[3][..]],
            states,
            &salt,
            9,
            parties,
            &p,
        );
        for i in 0..4 {
            assert_eq!(batched[i], commit(&seeds[i], states[i], &salt, 9, parties[i], &p));
        }
    }
}
