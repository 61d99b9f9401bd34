//! Streaming access to disc images.
//!
//! Images can be several hundred megabytes long so they're never loaded whole: `SectorReader`
//! refills a fixed size queue from the underlying reader and hands out one sector at a time.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::checker::{CheckOptions, Checker, Progress};
use crate::stats::Statistics;
use crate::{CheckError, CheckResult};

/// Size of the read queue, must be at least as big as a sector
pub const QUEUE_SIZE: usize = 0x40000;

/// Splits a byte stream into sector sized chunks
pub struct SectorReader<R> {
    /// Underlying reader
    inner: R,
    /// Read queue
    queue: Box<[u8]>,
    /// Offset of the first unconsumed byte in `queue`
    start: usize,
    /// Number of unconsumed bytes in `queue`
    available: usize,
    /// Size of a sector in bytes
    sector_size: usize,
    /// Total number of bytes read from `inner`
    bytes_read: u64,
    /// True once `inner` returned EOF
    eof: bool,
}

impl<R: Read> SectorReader<R> {
    /// Create a new reader for sectors of `sector_size` bytes
    pub fn new(inner: R, sector_size: usize) -> SectorReader<R> {
        assert!(sector_size > 0 && sector_size <= QUEUE_SIZE);

        SectorReader {
            inner,
            queue: vec![0; QUEUE_SIZE].into_boxed_slice(),
            start: 0,
            available: 0,
            sector_size,
            bytes_read: 0,
            eof: false,
        }
    }

    /// Total number of bytes read from the underlying reader so far
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Return the next sector. The last sector returned may be shorter than the sector size if
    /// the stream length isn't a multiple of it. Returns `None` at the end of the stream.
    pub fn next_sector(&mut self) -> CheckResult<Option<&[u8]>> {
        if self.available < self.sector_size && !self.eof {
            self.refill()?;
        }

        if self.available == 0 {
            return Ok(None);
        }

        let len = self.available.min(self.sector_size);
        let start = self.start;

        self.start += len;
        self.available -= len;

        Ok(Some(&self.queue[start..start + len]))
    }

    /// Move the unconsumed bytes to the front of the queue and fill it up
    fn refill(&mut self) -> io::Result<()> {
        if self.start > 0 {
            self.queue
                .copy_within(self.start..self.start + self.available, 0);
            self.start = 0;
        }

        while self.available < self.queue.len() {
            match self.inner.read(&mut self.queue[self.available..]) {
                Ok(0) => {
                    self.eof = true;
                    break;
                }
                Ok(n) => {
                    self.available += n;
                    self.bytes_read += n as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => (),
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }
}

/// A disc image to be checked: either a plain file or a file stored in a zip archive
pub enum ImageSource {
    /// Plain image file and its length
    File(File, u64),
    /// Zip archive with the index of the entry to check and its uncompressed length
    Zip(ZipArchive<File>, usize, u64),
}

impl ImageSource {
    /// Open the image at `path`. Files with a `.zip` extension are opened as archives, in which
    /// case `entry` selects the file to check (by default the first regular file in the archive).
    pub fn open(path: &Path, entry: Option<&str>) -> CheckResult<ImageSource> {
        let file = File::open(path)?;

        let is_zip = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("zip"))
            .unwrap_or(false);

        if !is_zip {
            let len = file.metadata()?.len();

            return Ok(ImageSource::File(file, len));
        }

        let mut archive = ZipArchive::new(file)?;

        for i in 0..archive.len() {
            let f = archive.by_index(i)?;

            if f.is_dir() {
                continue;
            }

            let selected = match entry {
                Some(name) => f.name() == name,
                None => true,
            };

            if selected {
                log::info!("Using archive entry {}", f.name());
                let len = f.size();
                drop(f);

                return Ok(ImageSource::Zip(archive, i, len));
            }
        }

        match entry {
            Some(name) => Err(CheckError::ArchiveEntryNotFound {
                path: PathBuf::from(path),
                entry: name.to_string(),
            }),
            None => Err(CheckError::EmptyArchive(PathBuf::from(path))),
        }
    }

    /// Length of the image in bytes
    pub fn len(&self) -> u64 {
        match *self {
            ImageSource::File(_, len) => len,
            ImageSource::Zip(_, _, len) => len,
        }
    }

    /// Returns true if the image is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check every sector of the image. In parallel mode the whole image is loaded in RAM first
    /// and no progress is reported.
    pub fn check<P>(
        &mut self,
        checker: &Checker,
        options: &CheckOptions,
        progress: P,
    ) -> CheckResult<Statistics>
    where
        P: FnMut(Progress),
    {
        let total = self.len();

        match self {
            ImageSource::File(file, _) => check_read(file, total, checker, options, progress),
            ImageSource::Zip(archive, index, _) => {
                let f = archive.by_index(*index)?;

                check_read(f, total, checker, options, progress)
            }
        }
    }
}

fn check_read<R, P>(
    mut reader: R,
    total: u64,
    checker: &Checker,
    options: &CheckOptions,
    progress: P,
) -> CheckResult<Statistics>
where
    R: Read,
    P: FnMut(Progress),
{
    if options.parallel {
        // `total` comes from the archive header for zip entries and can't be trusted for
        // allocation
        let mut image = Vec::new();
        reader.read_to_end(&mut image)?;

        Ok(checker.check_buffer(&image, options))
    } else {
        checker.check_reader(reader, total, options.layout, progress)
    }
}
