//! # Introduction
//!
//! linkfix mechanically refactors the C sources of a Plan 9 style linker
//! (`7l`) into library form. It parses every input file, builds a symbol
//! catalog and a dependency graph over file-scope declarations, and applies
//! a fixed sequence of whole-program transformations, emitting the program
//! after each one so the stages can be compared.
//!
//! ## Pipeline
//!
//! ```text
//! Sources → Lexer → Parser → Program → Catalog + Graph → Transforms → Stages → Patches
//! ```
//!
//! 1. [`parser`] tokenises and parses each file into declarations.
//! 2. [`program`] links the files into one arena of declarations and
//!    resolves every name reference.
//! 3. [`analysis`] indexes the program: [`analysis::Catalog`],
//!    [`analysis::Graph`] and [`analysis::FileTable`].
//! 4. [`transform`] extracts the reachable subset, staticizes, renames,
//!    threads context parameters and replaces legacy sentinels.
//! 5. [`emit`] prints each stage to `l.<n>` and writes patches.
//! 6. [`ui`] browses the recorded stages; not part of the stable library API.

pub mod analysis;
pub mod config;
pub mod emit;
pub mod errors;
pub mod parser;
pub mod pipeline;
pub mod program;
pub mod transform;
pub mod ui;

use tracing_subscriber::EnvFilter;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the log subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("linkfix=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
