//! # Voxel Filler Entry Point
//!
//! Runs the search and prints the best fill as JSON. All of the work happens
//! in the library's `run()` function.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- filler.json
//! ```

use std::process::ExitCode;

fn main() -> ExitCode {
    match voxel_filler::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("voxel-filler: {err}");
            ExitCode::FAILURE
        }
    }
}
