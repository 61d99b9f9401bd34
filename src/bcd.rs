//! The CD format uses binary-coded decimal (BCD) for the sector addresses stored in every CD-ROM
//! header, probably in order to make it easier to display those informations on the first CD
//! players.

use std::fmt;

/// A single packed BCD value in the range 0-99 (2 digits, 4bits per digit).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bcd(u8);

impl Bcd {
    /// BCD for 0
    pub const ZERO: Bcd = Bcd(0);

    /// Build a `Bcd` from an `u8` in BCD format. Returns `None` if the value provided is not valid
    /// BCD.
    pub const fn from_bcd(b: u8) -> Option<Bcd> {
        if b <= 0x99 && (b & 0xf) <= 0x9 {
            Some(Bcd(b))
        } else {
            None
        }
    }

    /// Build a `Bcd` from a binary `u8`. Returns `None` if the value is greater than 99.
    pub const fn from_binary(b: u8) -> Option<Bcd> {
        if b > 99 {
            None
        } else {
            Some(Bcd(((b / 10) << 4) | (b % 10)))
        }
    }

    /// Returns the BCD as an u8
    pub const fn bcd(self) -> u8 {
        self.0
    }

    /// Convert the BCD as a binary byte
    pub const fn binary(self) -> u8 {
        let b = self.0;

        (b >> 4) * 10 + (b & 0xf)
    }
}

impl fmt::Display for Bcd {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02x}", self.0)
    }
}

impl fmt::Debug for Bcd {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

#[test]
fn conversions() {
    assert!(Bcd::from_bcd(0) == Some(Bcd(0)));
    assert!(Bcd::from_bcd(1) == Some(Bcd(1)));
    assert!(Bcd::from_bcd(0x42) == Some(Bcd(0x42)));
    assert!(Bcd::from_bcd(0x1a).is_none());
    assert!(Bcd::from_bcd(0xf2).is_none());

    assert!(Bcd::from_binary(0) == Some(Bcd(0)));
    assert!(Bcd::from_binary(1) == Some(Bcd(1)));
    assert!(Bcd::from_binary(42) == Some(Bcd(0x42)));
    assert!(Bcd::from_binary(100).is_none());
    assert!(Bcd::from_binary(0xff).is_none());

    for b in 0..100 {
        assert_eq!(Bcd::from_binary(b).unwrap().binary(), b);
    }
}

#[test]
fn format() {
    assert_eq!(Bcd::ZERO.to_string(), "00");
    assert_eq!(Bcd::from_binary(7).unwrap().to_string(), "07");
    assert_eq!(Bcd::from_binary(59).unwrap().to_string(), "59");
}
