//! Rewrite `compile_commands.json` paths so they go through a symbolic link.
//!
//! Build directories are often reached through a stable symlink (`/proj/current`)
//! that points at a directory whose name changes between builds
//! (`/proj/builds/2023-10-01`). Compilers record the resolved location, which
//! leaves tools reading the compilation database with stale paths once the link
//! moves. This crate rewrites each record's `file` (and optionally
//! `directory`) so the link target prefix is replaced by the link path.
//!
//! ```no_run
//! use compdb_relink::{CompilationDatabase, ResolvedSymlink, RewriteOptions};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut db = CompilationDatabase::load(Path::new("compile_commands.json"))?;
//! let symlink = ResolvedSymlink::resolve("./build")?;
//! let report = db.rewrite(&symlink, &RewriteOptions::default());
//! db.write(Path::new("compile_commands.relinked.json"))?;
//! println!("rewrote {} of {} records", report.rewritten(), report.records);
//! # Ok(())
//! # }
//! ```
//!
//! Only POSIX paths are supported; the separator is always `/`.

mod document;
mod error;
mod fs;
mod report;
pub mod rewrite;
mod symlink;

pub use document::CompilationDatabase;
pub use error::{RelinkError, Result, SymlinkError};
pub use report::{RewriteReport, SkipReason, SkippedRecord, Strategy};
pub use rewrite::RewriteOptions;
pub use symlink::{ResolvedSymlink, SymlinkSpec};

pub(crate) const SEPARATOR: char = '/';
