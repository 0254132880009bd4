//! Size units and the size filtering predicate.
//!
//! Sizes are entered by the user as a magnitude plus a unit and converted to
//! bytes with 1024-based multipliers. The value `0` is a sentinel meaning
//! "no bound on that side", so an actual zero-byte minimum cannot be
//! expressed; callers wanting "everything" simply leave both bounds at zero.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A unit in which the user expresses file size bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum SizeUnit {
    /// Plain bytes.
    Bytes,
    /// 1024 bytes.
    Kilobytes,
    /// 1024² bytes.
    Megabytes,
    /// 1024³ bytes.
    Gigabytes,
}

impl SizeUnit {
    /// Returns the number of bytes in one of this unit.
    pub fn multiplier(self) -> u64 {
        match self {
            SizeUnit::Bytes => 1,
            SizeUnit::Kilobytes => 1024,
            SizeUnit::Megabytes => 1024 * 1024,
            SizeUnit::Gigabytes => 1024 * 1024 * 1024,
        }
    }

    /// Converts a magnitude in this unit to bytes. Fractional results truncate.
    ///
    /// # Examples
    ///
    /// ```
    /// use dirsift::size::SizeUnit;
    ///
    /// assert_eq!(SizeUnit::Bytes.to_bytes(500.0), 500);
    /// assert_eq!(SizeUnit::Kilobytes.to_bytes(2.0), 2048);
    /// assert_eq!(SizeUnit::Megabytes.to_bytes(1.5), 1_572_864);
    /// ```
    pub fn to_bytes(self, magnitude: f64) -> u64 {
        (magnitude * self.multiplier() as f64) as u64
    }

    /// Parses a unit label leniently, matching the recognized labels
    /// case-sensitively and treating anything else as [`SizeUnit::Bytes`].
    ///
    /// The fallback mirrors the historical behavior of configuration values:
    /// an unrecognized unit does not fail, the magnitude is taken as already
    /// being in bytes. The strict surface is the clap `ValueEnum` used on the
    /// command line.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Bytes" => SizeUnit::Bytes,
            "Kilobytes" => SizeUnit::Kilobytes,
            "Megabytes" => SizeUnit::Megabytes,
            "Gigabytes" => SizeUnit::Gigabytes,
            _ => SizeUnit::Bytes,
        }
    }
}

/// Inclusive size bounds in bytes, with `0` meaning "unbounded" on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeBounds {
    /// Minimum size in bytes; `0` disables the lower bound.
    pub min_bytes: u64,
    /// Maximum size in bytes; `0` disables the upper bound.
    pub max_bytes: u64,
}

impl SizeBounds {
    /// Creates bounds from user magnitudes and a unit.
    pub fn from_magnitudes(min: f64, max: f64, unit: SizeUnit) -> Self {
        Self {
            min_bytes: unit.to_bytes(min),
            max_bytes: unit.to_bytes(max),
        }
    }

    /// Returns true if a file of `size_bytes` passes the filter.
    ///
    /// Both bounds are inclusive: a file exactly at the minimum or maximum is
    /// kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use dirsift::size::SizeBounds;
    ///
    /// let bounds = SizeBounds { min_bytes: 200, max_bytes: 0 };
    /// assert!(!bounds.includes(100));
    /// assert!(bounds.includes(200));
    /// assert!(bounds.includes(5_000_000));
    /// ```
    pub fn includes(&self, size_bytes: u64) -> bool {
        if self.min_bytes != 0 && size_bytes < self.min_bytes {
            return false;
        }
        if self.max_bytes != 0 && size_bytes > self.max_bytes {
            return false;
        }
        true
    }
}
