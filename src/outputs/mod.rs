//! Output generation for analysis results.
//!
//! # Submodules
//!
//! - [`report`]: Renders a `BatchResult` for the terminal, with a random sample
//!   of articles colored by sentiment
//! - [`json`]: Writes the full result to a JSON file for later consumption
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── electric-cars.json
//!     └── interest-rates.json
//! ```

pub mod json;
pub mod report;
