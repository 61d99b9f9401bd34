//! Lookup tables shared by the EDC and ECC computations.
//!
//! The ECC tables implement arithmetic in GF(2^8) with the generator polynomial
//! x^8 + x^4 + x^3 + x^2 + 1 (0x11d) used by the CD-ROM product code (see section 14 and annex A
//! of [ECMA-130](http://www.ecma-international.org/publications/files/ECMA-ST/Ecma-130.pdf)).
//! The EDC table implements a byte-wise reflected CRC with feedback constant 0xd8018001, which is
//! the bit-reversed form of the ECMA-130 EDC polynomial
//! (x^16 + x^15 + x^2 + 1) * (x^16 + x^2 + x + 1).

/// GF(2^8) generator polynomial
pub const GF8_POLY: u16 = 0x11d;

/// Reflected EDC feedback constant
pub const EDC_POLY: u32 = 0xd801_8001;

/// The three 256-entry tables used by [`edc_update`](crate::edc::edc_update) and
/// [`check_parity`](crate::ecc::check_parity). They only depend on the table index so they're
/// built once and never modified afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct Tables {
    /// `forward[x]` is `x` multiplied by 2 in GF(2^8)
    forward: [u8; 256],
    /// `inverse[x ^ forward[x]] == x`, i.e. division by 3 in GF(2^8)
    inverse: [u8; 256],
    /// EDC lookup table
    edc: [u32; 256],
}

impl Tables {
    /// Build all the tables
    pub fn build() -> Tables {
        let mut forward = [0; 256];
        let mut inverse = [0; 256];
        let mut edc = [0; 256];

        for i in 0..256 {
            let mut j = (i << 1) as u16;

            if i & 0x80 != 0 {
                j ^= GF8_POLY;
            }

            // Bit 8 is always cleared by the reduction above
            let j = j as u8;

            forward[i] = j;
            inverse[i ^ usize::from(j)] = i as u8;

            let mut e = i as u32;

            for _ in 0..8 {
                e = (e >> 1) ^ if e & 1 != 0 { EDC_POLY } else { 0 };
            }

            edc[i] = e;
        }

        Tables {
            forward,
            inverse,
            edc,
        }
    }

    /// GF(2^8) doubling map
    pub fn forward(&self) -> &[u8; 256] {
        &self.forward
    }

    /// Inverse of `x -> x ^ forward[x]`
    pub fn inverse(&self) -> &[u8; 256] {
        &self.inverse
    }

    /// EDC lookup table
    pub fn edc(&self) -> &[u32; 256] {
        &self.edc
    }
}

impl Default for Tables {
    fn default() -> Tables {
        Tables::build()
    }
}

#[cfg(test)]
mod test {
    use super::Tables;

    #[test]
    fn deterministic() {
        let a = Tables::build();
        let b = Tables::build();

        assert!(a == b);
    }

    #[test]
    fn forward_is_gf8_doubling() {
        let t = Tables::build();

        assert_eq!(t.forward()[0x00], 0x00);
        assert_eq!(t.forward()[0x01], 0x02);
        assert_eq!(t.forward()[0x40], 0x80);
        // 0x80 * 2 = 0x100, reduced by 0x11d
        assert_eq!(t.forward()[0x80], 0x1d);
        assert_eq!(t.forward()[0xff], 0xe3);
    }

    #[test]
    fn inverse_undoes_forward() {
        let t = Tables::build();

        for x in 0..=255u8 {
            let y = x ^ t.forward()[usize::from(x)];

            assert_eq!(t.inverse()[usize::from(y)], x);
        }
    }

    #[test]
    fn inverse_is_a_permutation() {
        let t = Tables::build();
        let mut seen = [false; 256];

        for &v in t.inverse().iter() {
            assert!(!seen[usize::from(v)]);
            seen[usize::from(v)] = true;
        }
    }

    #[test]
    fn edc_table() {
        let t = Tables::build();

        assert_eq!(t.edc()[0], 0);
        // Seven zero shifts then a single feedback
        assert_eq!(t.edc()[0x80], super::EDC_POLY);

        // The table of a CRC is linear over XOR
        for a in 0..256 {
            for b in 0..256 {
                assert_eq!(t.edc()[a ^ b], t.edc()[a] ^ t.edc()[b]);
            }
        }
    }
}
