//! Compact discs were originally meant for storing music so positions on the disc are stored in
//! "minute:second:frame" format, where frame means sector.
//!
//! There are 75 frames/sectors in a second, 60 seconds in a minute. All three components are
//! stored as BCD in the header of every CD-ROM sector.

use std::fmt;

use crate::bcd::Bcd;

/// CD "minute:second:frame" timestamp, given as triplet of *BCD* encoded bytes. In this context
/// "frame" is synonymous with "sector".
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Msf(Bcd, Bcd, Bcd);

impl Msf {
    /// MSF for 00:00:00
    pub const ZERO: Msf = Msf(Bcd::ZERO, Bcd::ZERO, Bcd::ZERO);

    /// Number of sectors in the 2 second pregap of track 01. MSF 00:02:00 is logical block 0.
    pub const PREGAP_SECTORS: u32 = 150;

    /// Build an MSF from a BCD triplet. Returns `None` if `s` is greater than 0x59 or if `f` is
    /// greater than 0x74.
    pub const fn new(m: Bcd, s: Bcd, f: Bcd) -> Option<Msf> {
        // There are only 75 frames per second and obviously 60 seconds per minute
        if s.bcd() < 0x60 && f.bcd() < 0x75 {
            Some(Msf(m, s, f))
        } else {
            None
        }
    }

    /// Convenience function to build an MSF from BCD values stored in an `u8`. Returns none if one
    /// of the values is not valid BCD of if it's not a valid Msf
    pub const fn from_bcd(m: u8, s: u8, f: u8) -> Option<Msf> {
        let m = match Bcd::from_bcd(m) {
            Some(b) => b,
            None => return None,
        };

        let s = match Bcd::from_bcd(s) {
            Some(b) => b,
            None => return None,
        };

        let f = match Bcd::from_bcd(f) {
            Some(b) => b,
            None => return None,
        };

        Msf::new(m, s, f)
    }

    /// Return the internal BCD triplet
    pub const fn into_bcd(self) -> (Bcd, Bcd, Bcd) {
        (self.0, self.1, self.2)
    }

    /// Convert an MSF into a sector index. In this convention sector index 0 is MSF 00:00:00
    pub const fn sector_index(self) -> u32 {
        let Msf(m, s, f) = self;

        let m = m.binary() as u32;
        let s = s.binary() as u32;
        let f = f.binary() as u32;

        // 60 seconds in a minute, 75 sectors(frames) in a second
        (60 * 75 * m) + (75 * s) + f
    }

    /// Logical block address of this MSF, or `None` if it lies within the track 01 pregap.
    pub const fn lba(self) -> Option<u32> {
        self.sector_index().checked_sub(Msf::PREGAP_SECTORS)
    }

    /// Build an MSF from a sector index. Returns None if the index is out of range.
    pub fn from_sector_index(si: u32) -> Option<Msf> {
        let m = si / (60 * 75);

        if m > 99 {
            return None;
        }

        let si = si % (60 * 75);

        let s = si / 75;
        let f = si % 75;

        let m = Bcd::from_binary(m as u8)?;
        let s = Bcd::from_binary(s as u8)?;
        let f = Bcd::from_binary(f as u8)?;

        Some(Msf(m, s, f))
    }
}

impl fmt::Display for Msf {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let Msf(m, s, f) = *self;

        write!(fmt, "{}:{}:{}", m, s, f)
    }
}

impl fmt::Debug for Msf {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", self)
    }
}

#[cfg(test)]
mod test {
    use super::Msf;

    #[test]
    fn conversions() {
        for &(m, s, f) in &[
            (0x00, 0x00, 0x00),
            (0x01, 0x00, 0x00),
            (0x00, 0x01, 0x00),
            (0x00, 0x00, 0x01),
            (0x12, 0x34, 0x56),
            (0x99, 0x59, 0x74),
        ] {
            let m = Msf::from_bcd(m, s, f).unwrap();

            assert!(m == Msf::from_sector_index(m.sector_index()).unwrap());
        }

        assert!(Msf::from_sector_index(100 * 60 * 75).is_none());
    }

    #[test]
    fn bad_bcd() {
        assert!(Msf::from_bcd(0x00, 0x60, 0x00).is_none());
        assert!(Msf::from_bcd(0x00, 0x00, 0x75).is_none());
        assert!(Msf::from_bcd(0x0a, 0x00, 0x00).is_none());
        assert!(Msf::from_bcd(0xff, 0xff, 0xff).is_none());
    }

    #[test]
    fn lba() {
        assert_eq!(Msf::from_bcd(0x00, 0x02, 0x00).unwrap().lba(), Some(0));
        assert_eq!(Msf::from_bcd(0x00, 0x02, 0x16).unwrap().lba(), Some(16));
        assert_eq!(Msf::from_bcd(0x00, 0x01, 0x74).unwrap().lba(), None);
    }

    #[test]
    fn format() {
        let m = Msf::from_bcd(0x12, 0x34, 0x56).unwrap();

        assert_eq!(m.to_string(), "12:34:56");
        assert_eq!(format!("{:?}", Msf::ZERO), "00:00:00");
    }
}
