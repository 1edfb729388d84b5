//! Support code for the `compdb-relink` binary.
//!
//! The binary itself lives in `src/main.rs`; this library only holds pieces
//! that are worth unit testing without spawning the executable.

pub mod logging;
