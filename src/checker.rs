//! Sector classification and verification.

use std::io::Read;

use rayon::prelude::*;

use crate::ecc::{self, ZERO_ADDRESS};
use crate::edc::edc_matches;
use crate::reader::SectorReader;
use crate::sector::{
    CdRomMode, Mode2Sector, RawSector, SectorKind, Verdict, XaForm, MODE2_SECTOR_SIZE,
    SECTOR_SIZE,
};
use crate::stats::Statistics;
use crate::tables::Tables;
use crate::CheckResult;

/// How sectors are laid out in the image
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum SectorLayout {
    /// Full 2352 byte sectors with sync and header (".bin" images)
    #[default]
    Raw,
    /// 2336 byte Mode 2 sectors without sync and header
    Mode2Headerless,
}

impl SectorLayout {
    /// Size of one sector in this layout
    pub fn sector_size(self) -> usize {
        match self {
            SectorLayout::Raw => SECTOR_SIZE,
            SectorLayout::Mode2Headerless => MODE2_SECTOR_SIZE,
        }
    }
}

/// Runtime options for a check
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct CheckOptions {
    /// Sector layout of the image
    pub layout: SectorLayout,
    /// Verify sectors on the rayon thread pool. Only used for in-memory buffers.
    pub parallel: bool,
}

/// Position of the reader within the image, passed to the progress callback
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Progress {
    /// Bytes read so far
    pub bytes_read: u64,
    /// Total length of the image in bytes
    pub total_bytes: u64,
}

impl Progress {
    /// Rounded completion percentage
    pub fn percent(&self) -> u32 {
        let read = (self.bytes_read + 64) / 128;
        let total = ((self.total_bytes + 64) / 128).max(1);

        ((100 * read) / total).min(100) as u32
    }
}

/// The verification engine. Holds the EDC/ECC lookup tables, which are built once when the
/// checker is created.
pub struct Checker {
    tables: Tables,
}

impl Checker {
    /// Build the lookup tables and return a new checker
    pub fn new() -> Checker {
        Checker {
            tables: Tables::build(),
        }
    }

    /// Lookup tables used by this checker
    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    /// Classify and verify a full 2352 byte sector. Buffers shorter than that (typically the end
    /// of an image whose size isn't a multiple of the sector size) are `NonData`.
    pub fn classify(&self, buf: &[u8]) -> Verdict {
        let sector = match RawSector::new(buf) {
            Some(s) => s,
            None => return Verdict::NON_DATA,
        };

        let header = match sector.header() {
            Ok(h) => h,
            // No sync or unknown mode
            Err(_) => return Verdict::NON_DATA,
        };

        match header.mode {
            CdRomMode::Mode0 => {
                let valid = sector.mode0_payload().iter().all(|&b| b == 0);

                Verdict::new(SectorKind::Mode0, valid)
            }
            CdRomMode::Mode1 => {
                let valid = ecc::check_sector(
                    &self.tables,
                    sector.ecc_address(),
                    sector.mode1_ecc_domain(),
                ) && edc_matches(&self.tables, sector.mode1_edc_area(), sector.mode1_edc())
                    && sector.mode1_reserved().iter().all(|&b| b == 0);

                Verdict::new(SectorKind::Mode1, valid)
            }
            CdRomMode::Mode2 => self.verify_mode2(sector.mode2()),
        }
    }

    /// Classify and verify a 2336 byte Mode 2 sector from a stream without sync and headers. Since
    /// there's no sync pattern to look for, a sector whose two subheader copies differ is
    /// considered `NonData`.
    pub fn classify_headerless(&self, buf: &[u8]) -> Verdict {
        let sector = match Mode2Sector::new(buf) {
            Some(s) => s,
            None => return Verdict::NON_DATA,
        };

        if !sector.subheader().flags_match() {
            return Verdict::NON_DATA;
        }

        self.verify_mode2(sector)
    }

    /// Classify a sector using `layout`
    pub fn classify_layout(&self, buf: &[u8], layout: SectorLayout) -> Verdict {
        match layout {
            SectorLayout::Raw => self.classify(buf),
            SectorLayout::Mode2Headerless => self.classify_headerless(buf),
        }
    }

    fn verify_mode2(&self, sector: Mode2Sector) -> Verdict {
        match sector.subheader().submode().form() {
            XaForm::Form1 => {
                // Mode 2 sectors don't include the header in the ECC
                let valid =
                    ecc::check_sector(&self.tables, &ZERO_ADDRESS, sector.form1_ecc_domain())
                        && edc_matches(&self.tables, sector.form1_edc_area(), sector.form1_edc());

                Verdict::new(SectorKind::Mode2Form1, valid)
            }
            XaForm::Form2 => {
                let valid = edc_matches(&self.tables, sector.form2_edc_area(), sector.form2_edc());

                Verdict::new(SectorKind::Mode2Form2, valid)
            }
        }
    }

    /// Verify every sector of an in-memory image
    pub fn check_buffer(&self, image: &[u8], options: &CheckOptions) -> Statistics {
        let layout = options.layout;
        let sector_size = layout.sector_size();

        if options.parallel {
            image
                .par_chunks(sector_size)
                .enumerate()
                .map(|(index, buf)| {
                    let verdict = self.classify_layout(buf, layout);
                    report_error(index as u64, buf, verdict, layout);
                    Statistics::from_verdict(verdict)
                })
                .reduce(Statistics::new, Statistics::merge)
        } else {
            let mut stats = Statistics::new();

            for (index, buf) in image.chunks(sector_size).enumerate() {
                let verdict = self.classify_layout(buf, layout);
                report_error(index as u64, buf, verdict, layout);
                stats.record(verdict);
            }

            stats
        }
    }

    /// Verify every sector read from `reader`. `total_bytes` is only used for progress reporting:
    /// before fetching a sector, `progress` is called with the number of bytes read so far if it
    /// lies in a different MiB than the previous report. The first report is always at offset 0.
    pub fn check_reader<R, P>(
        &self,
        reader: R,
        total_bytes: u64,
        layout: SectorLayout,
        mut progress: P,
    ) -> CheckResult<Statistics>
    where
        R: Read,
        P: FnMut(Progress),
    {
        let mut reader = SectorReader::new(reader, layout.sector_size());
        let mut stats = Statistics::new();
        let mut index = 0;
        let mut last_mib = None;

        loop {
            let bytes_read = reader.bytes_read();
            let mib = bytes_read >> 20;

            if last_mib != Some(mib) {
                last_mib = Some(mib);
                progress(Progress {
                    bytes_read,
                    total_bytes,
                });
            }

            let buf = match reader.next_sector()? {
                Some(b) => b,
                None => break,
            };

            let verdict = self.classify_layout(buf, layout);
            report_error(index, buf, verdict, layout);
            stats.record(verdict);
            index += 1;
        }

        log::debug!("{} sectors checked", index);

        Ok(stats)
    }
}

impl Default for Checker {
    fn default() -> Checker {
        Checker::new()
    }
}

fn report_error(index: u64, buf: &[u8], verdict: Verdict, layout: SectorLayout) {
    if verdict.valid {
        return;
    }

    match (layout, RawSector::new(buf)) {
        (SectorLayout::Raw, Some(sector)) => {
            let address = sector.address();

            match address.msf().and_then(|msf| msf.lba()) {
                Some(lba) => log::warn!(
                    "{} sector with error at address: {} (LBA {})",
                    verdict.kind,
                    address,
                    lba
                ),
                None => log::warn!(
                    "{} sector with error at address: {}",
                    verdict.kind,
                    address
                ),
            }
        }
        _ => log::warn!("{} sector with error at sector {}", verdict.kind, index),
    }
}
