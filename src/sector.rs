//! Raw CD-ROM sector views.
//!
//! Mode 1
//!
//! ```text
//!        0  1  2  3  4  5  6  7  8  9  A  B  C  D  E  F
//! 0000h 00 FF FF FF FF FF FF FF FF FF FF 00 [-ADDR-] 01
//! 0010h [---DATA...
//! ...
//! 0800h                                     ...DATA---]
//! 0810h [---EDC---] 00 00 00 00 00 00 00 00 [---ECC...
//! ...
//! 0920h                                      ...ECC---]
//! ```
//!
//! Mode 2 (XA), form 1
//!
//! ```text
//!        0  1  2  3  4  5  6  7  8  9  A  B  C  D  E  F
//! 0000h 00 FF FF FF FF FF FF FF FF FF FF 00 [-ADDR-] 02
//! 0010h [--FLAGS--] [--FLAGS--] [---DATA...
//! ...
//! 0810h             ...DATA---] [---EDC---] [---ECC...
//! ...
//! 0920h                                      ...ECC---]
//! ```
//!
//! Mode 2 (XA), form 2
//!
//! ```text
//!        0  1  2  3  4  5  6  7  8  9  A  B  C  D  E  F
//! 0000h 00 FF FF FF FF FF FF FF FF FF FF 00 [-ADDR-] 02
//! 0010h [--FLAGS--] [--FLAGS--] [---DATA...
//! ...
//! 0920h                         ...DATA---] [---EDC---]
//! ```
//!
//! All the views below are built on top of fixed size arrays so every field access is checked at
//! construction time.

use std::fmt;

use crate::ecc::ECC_DOMAIN_LEN;
use crate::msf::Msf;
use crate::{CheckError, CheckResult};

/// Size of a raw CD sector, without subchannel data
pub const SECTOR_SIZE: usize = 2352;

/// Size of a Mode 2 sector without the 16 byte sync + header
pub const MODE2_SECTOR_SIZE: usize = 2336;

/// Sync pattern found at the start of every CD-ROM sector
pub const SYNC_PATTERN: [u8; 12] = [
    0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00,
];

/// A view into a full 2352 byte sector
#[derive(Copy, Clone)]
pub struct RawSector<'a>(&'a [u8; SECTOR_SIZE]);

impl<'a> RawSector<'a> {
    /// Build a view of the first `SECTOR_SIZE` bytes of `buf`. Returns `None` if `buf` is too
    /// short.
    pub fn new(buf: &'a [u8]) -> Option<RawSector<'a>> {
        if buf.len() < SECTOR_SIZE {
            None
        } else {
            Some(RawSector(array_ref![buf, 0, SECTOR_SIZE]))
        }
    }

    /// Returns true if the sector starts with the CD-ROM sync pattern
    pub fn has_sync(&self) -> bool {
        *array_ref![self.0, 0, 12] == SYNC_PATTERN
    }

    /// Raw header address bytes
    pub fn address(&self) -> SectorAddress {
        SectorAddress(*array_ref![self.0, 0xc, 3])
    }

    /// The 4 bytes protected by the ECC in front of the data: the address and the mode byte
    pub fn ecc_address(&self) -> &'a [u8; 4] {
        array_ref![self.0, 0xc, 4]
    }

    /// Parse the CD-ROM header. Fails if the sync pattern is missing or if the mode is not one of
    /// 0, 1 or 2.
    pub fn header(&self) -> CheckResult<CdRomHeader> {
        if !self.has_sync() {
            return Err(CheckError::BadSyncPattern);
        }

        let mode = match self.0[0xf] {
            0 => CdRomMode::Mode0,
            1 => CdRomMode::Mode1,
            2 => CdRomMode::Mode2,
            m => return Err(CheckError::UnknownMode(m)),
        };

        Ok(CdRomHeader {
            address: self.address(),
            mode,
        })
    }

    /// Everything after the header, which should be zero in a Mode 0 sector
    pub fn mode0_payload(&self) -> &'a [u8; MODE2_SECTOR_SIZE] {
        array_ref![self.0, 0x10, MODE2_SECTOR_SIZE]
    }

    /// Area covered by the Mode 1 EDC: sync, header and user data
    pub fn mode1_edc_area(&self) -> &'a [u8; 0x810] {
        array_ref![self.0, 0, 0x810]
    }

    /// Stored Mode 1 EDC
    pub fn mode1_edc(&self) -> &'a [u8; 4] {
        array_ref![self.0, 0x810, 4]
    }

    /// The 8 bytes between the EDC and ECC that must be zero in Mode 1
    pub fn mode1_reserved(&self) -> &'a [u8; 8] {
        array_ref![self.0, 0x814, 8]
    }

    /// Data, EDC, reserved bytes and parity: everything the Mode 1 ECC covers after the header
    pub fn mode1_ecc_domain(&self) -> &'a [u8; ECC_DOMAIN_LEN] {
        array_ref![self.0, 0x10, ECC_DOMAIN_LEN]
    }

    /// Mode 2 view of the sector (everything past the header)
    pub fn mode2(&self) -> Mode2Sector<'a> {
        Mode2Sector(array_ref![self.0, 0x10, MODE2_SECTOR_SIZE])
    }
}

/// A view into a 2336 byte Mode 2 sector, starting with the XA subheader
#[derive(Copy, Clone)]
pub struct Mode2Sector<'a>(&'a [u8; MODE2_SECTOR_SIZE]);

impl<'a> Mode2Sector<'a> {
    /// Build a view of the first `MODE2_SECTOR_SIZE` bytes of `buf`. Returns `None` if `buf` is
    /// too short.
    pub fn new(buf: &'a [u8]) -> Option<Mode2Sector<'a>> {
        if buf.len() < MODE2_SECTOR_SIZE {
            None
        } else {
            Some(Mode2Sector(array_ref![buf, 0, MODE2_SECTOR_SIZE]))
        }
    }

    /// Retrieve the CD-ROM XA subheader
    pub fn subheader(&self) -> XaSubHeader {
        XaSubHeader(*array_ref![self.0, 0, 8])
    }

    /// Area covered by the Form 1 EDC: subheader and user data
    pub fn form1_edc_area(&self) -> &'a [u8; 0x808] {
        array_ref![self.0, 0, 0x808]
    }

    /// Stored Form 1 EDC
    pub fn form1_edc(&self) -> &'a [u8; 4] {
        array_ref![self.0, 0x808, 4]
    }

    /// Subheader, data, EDC and parity: everything the Form 1 ECC covers
    pub fn form1_ecc_domain(&self) -> &'a [u8; ECC_DOMAIN_LEN] {
        self.0
    }

    /// Area covered by the Form 2 EDC: subheader and user data
    pub fn form2_edc_area(&self) -> &'a [u8; 0x91c] {
        array_ref![self.0, 0, 0x91c]
    }

    /// Stored Form 2 EDC
    pub fn form2_edc(&self) -> &'a [u8; 4] {
        array_ref![self.0, 0x91c, 4]
    }
}

/// The 3 BCD address bytes of a CD-ROM header. They're kept raw so that corrupted addresses can
/// still be displayed.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct SectorAddress(pub [u8; 3]);

impl SectorAddress {
    /// Decode the address, returns `None` if it's not a valid MSF
    pub fn msf(self) -> Option<Msf> {
        let [m, s, f] = self.0;

        Msf::from_bcd(m, s, f)
    }
}

impl fmt::Display for SectorAddress {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let [m, s, f] = self.0;

        write!(fmt, "{:02X}:{:02X}:{:02X}", m, s, f)
    }
}

impl fmt::Debug for SectorAddress {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", self)
    }
}

/// Decoded CD-ROM sector header
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct CdRomHeader {
    /// Sector address as stored in the header
    pub address: SectorAddress,
    /// CD-ROM mode for this sector
    pub mode: CdRomMode,
}

/// Mode for a CD-ROM sector
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum CdRomMode {
    /// Mode 0 (blank sector, all zeroes past the header)
    Mode0 = 0,
    /// Mode1 ("Regular" CD-ROM)
    Mode1 = 1,
    /// Mode2 (Used for various other sub-formats, such as CD-ROM XA)
    Mode2 = 2,
}

/// Mode 2 XA sub-header (from the CDi "green book"):
///
///   byte 0: File Number
///   byte 1: Channel Number
///   byte 2: Submode
///   byte 3: Coding Information
///   byte 4: File Number
///   byte 5: Channel Number
///   byte 6: Submode
///   byte 7: Coding Information
///
/// The data is copied twice for data integrity but both copies should be identical
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct XaSubHeader(pub [u8; 8]);

impl XaSubHeader {
    /// Return the first Submode
    pub fn submode(&self) -> XaSubmode {
        XaSubmode(self.0[2])
    }

    /// Returns true if both copies of the subheader are identical
    pub fn flags_match(&self) -> bool {
        self.0[..4] == self.0[4..]
    }
}

/// The Submode byte in a Mode 2 XA sub-header
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct XaSubmode(pub u8);

impl XaSubmode {
    /// Return the sector form
    pub fn form(self) -> XaForm {
        let form2 = self.0 & (1 << 5) != 0;

        if form2 {
            XaForm::Form2
        } else {
            XaForm::Form1
        }
    }
}

/// CD-ROM XA Mode 2 sectors have two possible forms (advertised in the subheader)
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum XaForm {
    /// Mode 2 Form 1: 2048 bytes of data, 4 bytes of error detection and 276 bytes of error
    /// correction
    Form1 = 0,
    /// Mode 2 Form 2: 2324 bytes of data, 4 bytes of "quality control".
    ///
    /// The CDi spec says that those bytes are reserved and ignored by the system and *recommends*
    /// to use the same algorithm as for the Form 1 error detection code.
    Form2 = 1,
}

/// The category a sector falls in
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SectorKind {
    /// Not a CD-ROM sector: missing sync, unknown mode or truncated buffer
    NonData,
    /// Mode 0 (blank)
    Mode0,
    /// Mode 1
    Mode1,
    /// Mode 2 Form 1
    Mode2Form1,
    /// Mode 2 Form 2
    Mode2Form2,
}

impl fmt::Display for SectorKind {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            SectorKind::NonData => "Non-data",
            SectorKind::Mode0 => "Mode 0",
            SectorKind::Mode1 => "Mode 1",
            SectorKind::Mode2Form1 => "Mode 2 form 1",
            SectorKind::Mode2Form2 => "Mode 2 form 2",
        };

        fmt.write_str(s)
    }
}

/// Outcome of the classification of one sector
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Verdict {
    /// Sector category
    pub kind: SectorKind,
    /// False if the EDC, ECC or one of the fixed fields didn't match. Always true for `NonData`.
    pub valid: bool,
}

impl Verdict {
    /// Verdict for anything that's not a CD-ROM sector
    pub const NON_DATA: Verdict = Verdict {
        kind: SectorKind::NonData,
        valid: true,
    };

    /// Build a verdict for `kind`
    pub fn new(kind: SectorKind, valid: bool) -> Verdict {
        Verdict { kind, valid }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn synced() -> [u8; SECTOR_SIZE] {
        let mut s = [0; SECTOR_SIZE];
        s[..12].copy_from_slice(&SYNC_PATTERN);
        s
    }

    #[test]
    fn too_short() {
        assert!(RawSector::new(&[0; SECTOR_SIZE - 1]).is_none());
        assert!(RawSector::new(&[0; SECTOR_SIZE]).is_some());
        assert!(Mode2Sector::new(&[0; MODE2_SECTOR_SIZE - 1]).is_none());
        assert!(Mode2Sector::new(&[0; SECTOR_SIZE]).is_some());
    }

    #[test]
    fn header() {
        let mut s = synced();
        s[0xc..0x10].copy_from_slice(&[0x00, 0x02, 0x16, 0x01]);

        let h = RawSector::new(&s).unwrap().header().unwrap();
        assert_eq!(h.mode, CdRomMode::Mode1);
        assert_eq!(h.address.to_string(), "00:02:16");
        assert_eq!(h.address.msf().and_then(|m| m.lba()), Some(16));

        s[0xf] = 3;
        match RawSector::new(&s).unwrap().header() {
            Err(CheckError::UnknownMode(3)) => (),
            _ => panic!("mode 3 accepted"),
        }

        s[0xf] = 2;
        s[5] = 0xfe;
        match RawSector::new(&s).unwrap().header() {
            Err(CheckError::BadSyncPattern) => (),
            _ => panic!("bad sync accepted"),
        }
    }

    #[test]
    fn address_display() {
        // Not valid BCD but must still be printable
        let a = SectorAddress([0xab, 0x0f, 0xff]);

        assert_eq!(a.to_string(), "AB:0F:FF");
        assert!(a.msf().is_none());
    }

    #[test]
    fn mode2_views() {
        let mut s = synced();
        s[0xf] = 2;
        s[0x10..0x18].copy_from_slice(&[1, 2, 0x20, 4, 1, 2, 0x20, 4]);

        let m2 = RawSector::new(&s).unwrap().mode2();
        let sh = m2.subheader();

        assert!(sh.flags_match());
        assert_eq!(sh.submode().form(), XaForm::Form2);

        s[0x16] = 0;
        let sh = RawSector::new(&s).unwrap().mode2().subheader();
        assert!(!sh.flags_match());
        // Only the first copy is used for the form
        assert_eq!(sh.submode().form(), XaForm::Form2);
    }

    #[test]
    fn field_offsets() {
        let mut s = [0u8; SECTOR_SIZE];
        for (i, b) in s.iter_mut().enumerate() {
            *b = i as u8;
        }

        let r = RawSector::new(&s).unwrap();
        assert_eq!(r.mode1_edc()[0], 0x10);
        assert_eq!(r.mode1_reserved()[0], 0x14);
        assert_eq!(r.mode1_ecc_domain()[0], 0x10);
        assert_eq!(r.ecc_address()[3], 0x0f);

        let m2 = r.mode2();
        // 0x10 + 0x808 = 0x818
        assert_eq!(m2.form1_edc()[0], 0x18);
        // 0x10 + 0x91c = 0x92c
        assert_eq!(m2.form2_edc()[0], 0x2c);
    }
}
