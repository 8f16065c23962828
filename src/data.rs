//! Sample sources.
//!
//! The training loop pulls fixed-width samples one at a time and restarts the
//! source at the beginning of every epoch. A [`SampleSource`] only provides the
//! samples; it knows nothing about the network that consumes them.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::warn;

use crate::{Error, Result};

/// A restartable, finite sequence of fixed-width samples.
pub trait SampleSource {
    /// Starts a new pass over the samples.
    ///
    /// Every call begins again at the first sample.
    fn samples(&mut self) -> Result<Box<dyn Iterator<Item = Result<Vec<f32>>> + '_>>;
}

/// In-memory samples.
///
/// Stored as a contiguous buffer with row-major layout:
/// - `data.len() == len * width`
#[derive(Debug, Clone)]
pub struct Samples {
    data: Vec<f32>,
    width: usize,
}

impl Samples {
    /// Creates an empty set of samples of the given width.
    pub fn new(width: usize) -> Result<Self> {
        Self::from_flat(Vec::new(), width)
    }

    /// Build samples from a flat buffer with shape `(len, width)`.
    pub fn from_flat(data: Vec<f32>, width: usize) -> Result<Self> {
        if width == 0 {
            return Err(Error::InvalidData("sample width must be > 0".to_owned()));
        }
        if !data.len().is_multiple_of(width) {
            return Err(Error::InvalidData(format!(
                "data length {} is not divisible by width {width}",
                data.len()
            )));
        }
        Ok(Self { data, width })
    }

    /// Build samples from per-sample rows.
    ///
    /// This is a convenience constructor (it copies into contiguous storage).
    pub fn from_rows(width: usize, rows: &[Vec<f32>]) -> Result<Self> {
        let mut samples = Self::new(width)?;
        for row in rows {
            samples.push(row)?;
        }
        Ok(samples)
    }

    pub fn push(&mut self, sample: &[f32]) -> Result<()> {
        if sample.len() != self.width {
            return Err(Error::InvalidShape(format!(
                "sample has len {}, expected {}",
                sample.len(),
                self.width
            )));
        }
        self.data.extend_from_slice(sample);
        Ok(())
    }

    #[inline]
    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.data.len() / self.width
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    /// Returns the `idx`-th sample.
    ///
    /// Panics if `idx >= len`.
    pub fn sample(&self, idx: usize) -> &[f32] {
        let start = idx * self.width;
        &self.data[start..start + self.width]
    }
}

impl SampleSource for Samples {
    fn samples(&mut self) -> Result<Box<dyn Iterator<Item = Result<Vec<f32>>> + '_>> {
        Ok(Box::new(
            self.data
                .chunks_exact(self.width)
                .map(|s| Ok::<_, Error>(s.to_vec())),
        ))
    }
}

/// Samples read from a flat text file.
///
/// Each non-empty line holds one or more numbers separated by commas or
/// whitespace. Values are streamed in order and grouped into samples of
/// `width` consecutive values, so a file with one value per line yields one
/// sample per `width` lines. An incomplete trailing sample is dropped.
///
/// The file is reopened on every pass.
#[derive(Debug, Clone)]
pub struct LineFile {
    path: PathBuf,
    width: usize,
}

impl LineFile {
    pub fn new(path: impl AsRef<Path>, width: usize) -> Result<Self> {
        if width == 0 {
            return Err(Error::InvalidData("sample width must be > 0".to_owned()));
        }
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            width,
        })
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }
}

impl SampleSource for LineFile {
    fn samples(&mut self) -> Result<Box<dyn Iterator<Item = Result<Vec<f32>>> + '_>> {
        let file = File::open(&self.path)?;
        Ok(Box::new(LineSamples {
            lines: BufReader::new(file).lines(),
            line_no: 0,
            pending: Vec::new(),
            window: Vec::with_capacity(self.width),
            width: self.width,
            path: &self.path,
            done: false,
        }))
    }
}

struct LineSamples<'a> {
    lines: std::io::Lines<BufReader<File>>,
    line_no: usize,
    /// Values parsed from the current line that have not been consumed yet.
    pending: Vec<f32>,
    window: Vec<f32>,
    width: usize,
    path: &'a Path,
    done: bool,
}

impl LineSamples<'_> {
    fn read_line(&mut self) -> Option<Result<()>> {
        let line = match self.lines.next()? {
            Ok(line) => line,
            Err(err) => return Some(Err(err.into())),
        };
        self.line_no += 1;

        for field in line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|f| !f.is_empty())
        {
            match field.parse::<f32>() {
                Ok(v) => self.pending.push(v),
                Err(_) => {
                    return Some(Err(Error::InvalidData(format!(
                        "{}:{}: cannot parse {field:?} as a number",
                        self.path.display(),
                        self.line_no
                    ))));
                }
            }
        }
        // Stored in reverse so values can be popped in file order.
        self.pending.reverse();
        Some(Ok(()))
    }
}

impl Iterator for LineSamples<'_> {
    type Item = Result<Vec<f32>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            while let Some(v) = self.pending.pop() {
                self.window.push(v);
                if self.window.len() == self.width {
                    let fresh = Vec::with_capacity(self.width);
                    let sample = std::mem::replace(&mut self.window, fresh);
                    return Some(Ok(sample));
                }
            }

            match self.read_line() {
                Some(Ok(())) => {}
                Some(Err(err)) => {
                    self.done = true;
                    return Some(Err(err));
                }
                None => {
                    self.done = true;
                    if !self.window.is_empty() {
                        warn!(
                            "{}: dropping incomplete trailing sample ({} of {} values)",
                            self.path.display(),
                            self.window.len(),
                            self.width
                        );
                    }
                    return None;
                }
            }
        }
    }
}
