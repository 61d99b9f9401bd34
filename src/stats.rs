//! Per-category sector tallies.

use std::fmt;

use crate::sector::{SectorKind, Verdict};

/// Number of sectors seen in a category and how many of them failed verification
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tally {
    /// Sectors classified in this category
    pub sectors: u64,
    /// Sectors in this category that failed verification
    pub errors: u64,
}

impl Tally {
    fn record(&mut self, valid: bool) {
        self.sectors += 1;
        if !valid {
            self.errors += 1;
        }
    }

    fn merge(self, other: Tally) -> Tally {
        Tally {
            sectors: self.sectors + other.sectors,
            errors: self.errors + other.errors,
        }
    }
}

/// Statistics for a whole image. Owned by the caller and updated once per sector; two partial
/// results can be combined with `merge` in any order.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Statistics {
    /// Sectors without a valid sync pattern or with an unknown mode
    pub non_data: u64,
    /// Mode 0 sectors
    pub mode0: Tally,
    /// Mode 1 sectors
    pub mode1: Tally,
    /// Mode 2 Form 1 sectors
    pub mode2_form1: Tally,
    /// Mode 2 Form 2 sectors
    pub mode2_form2: Tally,
}

impl Statistics {
    /// Empty statistics
    pub fn new() -> Statistics {
        Statistics::default()
    }

    /// Statistics for a single sector
    pub fn from_verdict(verdict: Verdict) -> Statistics {
        let mut s = Statistics::new();
        s.record(verdict);
        s
    }

    /// Account for one classified sector
    pub fn record(&mut self, verdict: Verdict) {
        match verdict.kind {
            SectorKind::NonData => self.non_data += 1,
            SectorKind::Mode0 => self.mode0.record(verdict.valid),
            SectorKind::Mode1 => self.mode1.record(verdict.valid),
            SectorKind::Mode2Form1 => self.mode2_form1.record(verdict.valid),
            SectorKind::Mode2Form2 => self.mode2_form2.record(verdict.valid),
        }
    }

    /// Combine two sets of statistics
    pub fn merge(self, other: Statistics) -> Statistics {
        Statistics {
            non_data: self.non_data + other.non_data,
            mode0: self.mode0.merge(other.mode0),
            mode1: self.mode1.merge(other.mode1),
            mode2_form1: self.mode2_form1.merge(other.mode2_form1),
            mode2_form2: self.mode2_form2.merge(other.mode2_form2),
        }
    }

    /// Tally for a data sector category, `None` for `NonData`
    pub fn tally(&self, kind: SectorKind) -> Option<Tally> {
        let t = match kind {
            SectorKind::NonData => return None,
            SectorKind::Mode0 => self.mode0,
            SectorKind::Mode1 => self.mode1,
            SectorKind::Mode2Form1 => self.mode2_form1,
            SectorKind::Mode2Form2 => self.mode2_form2,
        };

        Some(t)
    }

    fn tallies(&self) -> [Tally; 4] {
        [self.mode0, self.mode1, self.mode2_form1, self.mode2_form2]
    }

    /// Total number of sectors processed, including non-data ones
    pub fn total_sectors(&self) -> u64 {
        self.non_data + self.tallies().iter().map(|t| t.sectors).sum::<u64>()
    }

    /// Total number of sectors that failed verification
    pub fn total_errors(&self) -> u64 {
        self.tallies().iter().map(|t| t.errors).sum()
    }

    /// Returns true if no sector failed verification
    pub fn is_clean(&self) -> bool {
        self.total_errors() == 0
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        writeln!(fmt, "Non-data sectors........ {}", self.non_data)?;

        let rows = [
            ("Mode 0 sectors..........", self.mode0),
            ("Mode 1 sectors..........", self.mode1),
            ("Mode 2 form 1 sectors...", self.mode2_form1),
            ("Mode 2 form 2 sectors...", self.mode2_form2),
        ];

        for (label, t) in rows.iter() {
            writeln!(fmt, "{} {}", label, t.sectors)?;
            writeln!(fmt, "\twith errors..... {}", t.errors)?;
        }

        writeln!(fmt, "Total sectors........... {}", self.total_sectors())?;
        writeln!(fmt, "Total errors............ {}", self.total_errors())
    }
}
