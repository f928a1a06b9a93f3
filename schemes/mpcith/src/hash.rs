//! Domain-separated SHAKE hashing for the MPC-in-the-Head engine.
//!
//! Every hash in the protocol goes through [`Xof`]. SHAKE128 is used when the
//! digest is at most 32 bytes and SHAKE256 otherwise. Each call site absorbs a
//! one-byte [`Domain`] prefix first, except the challenge expansion which
//! squeezes directly from a transcript digest.
//!
//! [`XofX4`] is the 4-lane batched shape: four independent hashes driven in
//! lockstep, producing exactly what four sequential [`Xof`]s would.

use sha3::{
    digest::{ExtendableOutput, Update, XofReader},
    Shake128, Shake128Reader, Shake256, Shake256Reader,
};

/// One-byte domain separators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Domain {
    /// First Fiat-Shamir transcript hash.
    H1 = 1,
    /// Second Fiat-Shamir transcript hash.
    H2 = 2,
    /// Seed tree node expansion.
    Tree = 3,
    /// Party commitments.
    Commit = 4,
    /// Per-party random tapes.
    Tape = 5,
    /// Root seed derivation from the master seed.
    RootSeeds = 6,
    /// Public matrix expansion from a key seed.
    Instance = 7,
}

/// An absorbing SHAKE instance.
#[derive(Clone)]
pub enum Xof {
    /// SHAKE128, used for digests up to 32 bytes.
    Shake128(Shake128),
    /// SHAKE256, used for longer digests.
    Shake256(Shake256),
}

impl Xof {
    /// Creates an XOF sized for `digest_bytes`, without a domain prefix.
    pub fn new(digest_bytes: usize) -> Self {
        if digest_bytes <= 32 {
            Xof::Shake128(Shake128::default())
        } else {
            Xof::Shake256(Shake256::default())
        }
    }

    /// Creates an XOF sized for `digest_bytes` with `domain` already absorbed.
    pub fn with_domain(digest_bytes: usize, domain: Domain) -> Self {
        let mut xof = Self::new(digest_bytes);
        xof.absorb(&[domain as u8]);
        xof
    }

    /// Absorbs raw bytes.
    pub fn absorb(&mut self, data: &[u8]) -> &mut Self {
        match self {
            Xof::Shake128(h) => Update::update(h, data),
            Xof::Shake256(h) => Update::update(h, data),
        }
        self
    }

    /// Absorbs a 16-bit counter in little-endian order.
    pub fn absorb_u16(&mut self, value: u16) -> &mut Self {
        self.absorb(&value.to_le_bytes())
    }

    /// Switches to squeezing.
    pub fn finalize(self) -> XofStream {
        match self {
            Xof::Shake128(h) => XofStream::Shake128(h.finalize_xof()),
            Xof::Shake256(h) => XofStream::Shake256(h.finalize_xof()),
        }
    }

    /// Convenience: finalize and squeeze `len` bytes.
    pub fn digest(self, len: usize) -> Vec<u8> {
        let mut out = vec![0u8; len];
        self.finalize().read(&mut out);
        out
    }
}

/// A squeezing SHAKE instance.
pub enum XofStream {
    /// SHAKE128 output stream.
    Shake128(Shake128Reader),
    /// SHAKE256 output stream.
    Shake256(Shake256Reader),
}

impl XofReader for XofStream {
    fn read(&mut self, buffer: &mut [u8]) {
        match self {
            XofStream::Shake128(r) => r.read(buffer),
            XofStream::Shake256(r) => r.read(buffer),
        }
    }
}

/// Four XOF lanes absorbed and squeezed in lockstep.
#[derive(Clone)]
pub struct XofX4 {
    lanes: [Xof; 4],
}

impl XofX4 {
    /// Creates four lanes with the same domain prefix.
    pub fn with_domain(digest_bytes: usize, domain: Domain) -> Self {
        XofX4 {
            lanes: [(); 4].map(|_| Xof::with_domain(digest_bytes, domain)),
        }
    }

    /// Absorbs the same bytes into every lane.
    pub fn absorb_all(&mut self, data: &[u8]) -> &mut Self {
        for lane in &mut self.lanes {
            lane.absorb(data);
        }
        self
    }

    /// Absorbs one input per lane.
    pub fn absorb_each(&mut self, data: [&[u8]; 4]) -> &mut Self {
        for (lane, d) in self.lanes.iter_mut().zip(data) {
            lane.absorb(d);
        }
        self
    }

    /// Absorbs one little-endian counter per lane.
    pub fn absorb_u16_each(&mut self, values: [u16; 4]) -> &mut Self {
        for (lane, v) in self.lanes.iter_mut().zip(values) {
            lane.absorb_u16(v);
        }
        self
    }

    /// Switches all lanes to squeezing.
    pub fn finalize(self) -> XofStreamX4 {
        XofStreamX4 {
            lanes: self.lanes.map(Xof::finalize),
        }
    }
}

/// Four output streams squeezed in lockstep.
pub struct XofStreamX4 {
    lanes: [XofStream; 4],
}

impl XofStreamX4 {
    /// Fills one output buffer per lane.
    pub fn squeeze_each(&mut self, out: [&mut [u8]; 4]) {
        for (lane, o) in self.lanes.iter_mut().zip(out) {
            lane.read(o);
        }
    }
}
