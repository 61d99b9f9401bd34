//! Error Correction Code verification.
//!
//! Mode 1 and Mode 2 Form 1 sectors carry 276 bytes of Reed-Solomon product code parity,
//! computed over a 2064 byte virtual stream made of a 4 byte address followed by the sector data.
//! The stream is seen as a 2 x 24 x 43 array and protected twice:
//!
//! * the P code covers the 86 columns (24 bytes each) and stores 2 x 86 parity bytes,
//! * the Q code covers the 52 diagonals (43 bytes each, *including* the P parity) and stores
//!   2 x 52 parity bytes right after P.
//!
//! See section 14.5 and annex A of ECMA-130. This module only verifies the parity, it never
//! attempts to correct anything.

use crate::tables::Tables;

/// Length of the address prefix of the ECC virtual stream
pub const ECC_ADDRESS_LEN: usize = 4;

/// Number of sector bytes covered by the P code, following the address
pub const ECC_DATA_LEN: usize = 0x80c;

/// Total length of the P and Q parity
pub const ECC_PARITY_LEN: usize = 276;

/// Length of the area protected by [`check_sector`]: the data followed by the parity
pub const ECC_DOMAIN_LEN: usize = ECC_DATA_LEN + ECC_PARITY_LEN;

/// Address used in place of the header for Mode 2 sectors
pub const ZERO_ADDRESS: [u8; ECC_ADDRESS_LEN] = [0; ECC_ADDRESS_LEN];

/// Geometry of one of the two interleaved codes
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct PqCode {
    /// Number of parity rows (each row yields two parity bytes)
    pub major_count: usize,
    /// Number of stream bytes folded into each row
    pub minor_count: usize,
    /// Stream offset between two consecutive pairs of rows
    pub major_mult: usize,
    /// Stream offset between two consecutive bytes of a row, modulo the code size
    pub minor_inc: usize,
    /// Offset of the stored parity from the start of the ECC area
    pub parity_offset: usize,
}

impl PqCode {
    /// Number of bytes in the virtual stream covered by this code
    pub const fn size(&self) -> usize {
        self.major_count * self.minor_count
    }

    /// Number of stored parity bytes for this code
    pub const fn parity_len(&self) -> usize {
        self.major_count * 2
    }

    /// Compute both parity bytes of row `major` over `address ++ data`.
    ///
    /// Panics if `data` is shorter than `self.size() - 4`.
    pub fn row(&self, tables: &Tables, address: &[u8; 4], data: &[u8], major: usize) -> (u8, u8) {
        let forward = tables.forward();
        let size = self.size();

        let mut index = (major >> 1) * self.major_mult + (major & 1);
        let mut ecc_a = 0u8;
        let mut ecc_b = 0u8;

        for _ in 0..self.minor_count {
            let b = if index < ECC_ADDRESS_LEN {
                address[index]
            } else {
                data[index - ECC_ADDRESS_LEN]
            };

            index += self.minor_inc;
            if index >= size {
                index -= size;
            }

            ecc_a ^= b;
            ecc_b ^= b;
            ecc_a = forward[usize::from(ecc_a)];
        }

        let ecc_a = tables.inverse()[usize::from(forward[usize::from(ecc_a)] ^ ecc_b)];

        (ecc_a, ecc_a ^ ecc_b)
    }
}

/// P code: 86 columns of 24 bytes
pub const P_CODE: PqCode = PqCode {
    major_count: 86,
    minor_count: 24,
    major_mult: 2,
    minor_inc: 86,
    parity_offset: 0,
};

/// Q code: 52 diagonals of 43 bytes
pub const Q_CODE: PqCode = PqCode {
    major_count: 52,
    minor_count: 43,
    major_mult: 86,
    minor_inc: 88,
    parity_offset: 0xac,
};

/// Check one code against the `stored` parity. Returns true only if every row matches exactly.
///
/// `data` must cover the code's virtual stream past the address (`code.size() - 4` bytes) and
/// `stored` must hold `code.parity_len()` bytes, otherwise this function panics.
pub fn check_parity(
    tables: &Tables,
    address: &[u8; 4],
    data: &[u8],
    code: &PqCode,
    stored: &[u8],
) -> bool {
    assert!(data.len() + ECC_ADDRESS_LEN >= code.size());
    assert!(stored.len() >= code.parity_len());

    (0..code.major_count).all(|major| {
        let (a, b) = code.row(tables, address, data, major);

        stored[major] == a && stored[major + code.major_count] == b
    })
}

/// Check the P and Q parity of a sector. `domain` is the `ECC_DATA_LEN` bytes following the
/// address immediately followed by the 276 bytes of parity. The Q code covers the P parity, so
/// both must live in the same contiguous area.
pub fn check_sector(tables: &Tables, address: &[u8; 4], domain: &[u8; ECC_DOMAIN_LEN]) -> bool {
    let ecc = array_ref![domain, ECC_DATA_LEN, ECC_PARITY_LEN];

    check_parity(
        tables,
        address,
        domain,
        &P_CODE,
        &ecc[P_CODE.parity_offset..],
    ) && check_parity(
        tables,
        address,
        domain,
        &Q_CODE,
        &ecc[Q_CODE.parity_offset..],
    )
}

/// Fill in the P and Q parity of `domain` so that `check_sector` passes. Used to forge test
/// sectors.
#[cfg(test)]
pub(crate) fn generate_parity(
    tables: &Tables,
    address: &[u8; 4],
    domain: &mut [u8; ECC_DOMAIN_LEN],
) {
    // Q covers the P parity so P must be computed first
    for code in [P_CODE, Q_CODE] {
        let base = ECC_DATA_LEN + code.parity_offset;

        for major in 0..code.major_count {
            let (a, b) = code.row(tables, address, &domain[..], major);

            domain[base + major] = a;
            domain[base + major + code.major_count] = b;
        }
    }
}
