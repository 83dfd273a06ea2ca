//! Test utilities for dleapp
//!
//! Fixture images shared by the unit tests.

#![cfg(test)]

use anyhow::Result;
use std::fs;
use tempfile::TempDir;

/// Creates a small extracted image:
///
/// - `logs/flight1.csv`, `logs/flight2.csv`
/// - `DJI/FlightRecord/DJIFlightRecord_01.txt`
/// - `DJI/FLY001.DAT`
pub fn create_test_image() -> Result<TempDir> {
    let temp_dir = TempDir::new()?;
    let base_path = temp_dir.path();

    fs::create_dir_all(base_path.join("logs"))?;
    fs::create_dir_all(base_path.join("DJI/FlightRecord"))?;

    fs::write(base_path.join("logs/flight1.csv"), b"time,alt\n0,0\n")?;
    fs::write(base_path.join("logs/flight2.csv"), b"time,alt\n0,0\n1,12\n")?;
    fs::write(
        base_path.join("DJI/FlightRecord/DJIFlightRecord_01.txt"),
        b"encrypted record",
    )?;
    fs::write(base_path.join("DJI/FLY001.DAT"), [0u8, 1, 2, 3])?;

    Ok(temp_dir)
}
