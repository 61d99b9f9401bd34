//! Integrity checker for raw CD-ROM images.
//!
//! Every CD-ROM data sector carries an Error Detection Code (a 32bit CRC) and, for Mode 1 and
//! Mode 2 Form 1, 276 bytes of Reed-Solomon product code parity. This crate recomputes both and
//! compares them with the values stored in the sector, tallying the results per sector mode. It
//! never attempts to repair anything.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use cdcheck::{CheckOptions, Checker, ImageSource};
//!
//! let checker = Checker::new();
//! let mut image = ImageSource::open(Path::new("game.bin"), None).unwrap();
//!
//! let stats = image.check(&checker, &CheckOptions::default(), |_| ()).unwrap();
//!
//! print!("{}", stats);
//! ```

#![warn(missing_docs)]

#[macro_use]
extern crate arrayref;
extern crate thiserror;

pub use checker::{CheckOptions, Checker, Progress, SectorLayout};
pub use msf::Msf;
pub use reader::{ImageSource, SectorReader};
pub use sector::{SectorKind, Verdict};
pub use stats::{Statistics, Tally};
pub use tables::Tables;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub mod bcd;
pub mod checker;
pub mod ecc;
pub mod edc;
pub mod msf;
pub mod reader;
pub mod sector;
pub mod stats;
pub mod tables;


/// Error type for image checks. Corrupted sectors are not errors, they're reported in the
/// `Statistics`.
#[allow(missing_docs)]
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("Generic I/O error")]
    Io(#[from] io::Error),
    #[error("Zip archive error")]
    Zip(#[from] zip::result::ZipError),
    #[error("Archive `{0}` doesn't contain any file")]
    EmptyArchive(PathBuf),
    #[error("Archive `{path}` has no entry named `{entry}`")]
    ArchiveEntryNotFound { path: PathBuf, entry: String },
    #[error(
        "The sync pattern at the start of a CD-ROM sector (0x00, 0xff * 10, 0x00) was invalid"
    )]
    BadSyncPattern,
    #[error("Unknown CD-ROM sector mode {0}")]
    UnknownMode(u8),
}

/// Convenience type alias for a `Result<R, CheckError>`
pub type CheckResult<R> = std::result::Result<R, CheckError>;

#[test]
fn checkerror_display() {
    // Make sure that CheckError implements Display. This should be true if we set an
    // `#[error("...")]` for every variant
    println!("{}", CheckError::BadSyncPattern);
    assert_eq!(
        CheckError::UnknownMode(3).to_string(),
        "Unknown CD-ROM sector mode 3"
    );
}
