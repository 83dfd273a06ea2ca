//! Utility functions shared by the seeker, the parsers and the report.
//!
//! ## Components
//!
//! - **Hashing**: SHA-256 calculation for file integrity
//! - **CPU time**: processor time of the run
//! - **Long paths**: Windows `\\?\` marker handling
//! - **Output**: layout of the per-run report folder
//!
//! ## Common Use Cases
//!
//! ### Generating File Hashes
//!
//! ```no_run
//! use rust_dleapp::utils::hash::calculate_sha256;
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let file_path = Path::new("/evidence/FLY001.DAT");
//! let max_size = 1024; // 1GB limit
//!
//! match calculate_sha256(file_path, max_size)? {
//!     Some(hash) => println!("SHA-256: {}", hash),
//!     None => println!("File exceeds size limit"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Preparing a Report Folder
//!
//! ```no_run
//! use rust_dleapp::utils::output::OutputLayout;
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let layout = OutputLayout::create(Path::new("/cases/2024-117"))?;
//! println!("Writing to {}", layout.report_folder_base.display());
//! # Ok(())
//! # }
//! ```

/// Process CPU time measurement
pub mod cpu_time;

/// Cryptographic hash calculation utilities
pub mod hash;

/// Windows long-path marker handling
pub mod long_path;

/// Report folder layout
pub mod output;
