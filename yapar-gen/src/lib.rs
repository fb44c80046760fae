//! Copyright (c) 2005–2025 IKH Software, Inc.
//!
//! Released under the terms of the GNU Lesser General Public License, version 3.0
//! or (at your option) any later version (LGPL-3.0-or-later).
//!
//! SLR(1) parser generator.
//!
//! `yapar-gen` turns a context-free grammar into the ACTION/GOTO tables
//! consumed by the [`yapar`] runtime:
//!  * [`grammar`]: the grammar model, built in code or read from `.yalp` text
//!  * [`sets`]: FIRST and FOLLOW sets
//!  * [`lr0`]: the augmented grammar and the canonical LR(0) collection
//!  * [`slr`]: table construction, failing on any conflict
//!  * [`generate`]: the whole pipeline plus JSON or Rust artifacts
//!  * [`report`]: text dumps of each stage
//!
//! ```
//! use yapar::Parser;
//! use yapar_gen::{GenConfig, Grammar, build};
//!
//! let grammar: Grammar = "
//!     %token NUMBER PLUS SEMICOLON
//!     %%
//!     s : p SEMICOLON ;
//!     p : NUMBER PLUS NUMBER ;
//! "
//! .parse()?;
//! let tables = build(&grammar, &GenConfig::default())?.tables;
//! let parser = Parser::new(&tables);
//! assert!(parser.parse(["NUMBER", "PLUS", "NUMBER", "SEMICOLON"]).is_ok());
//! assert!(parser.parse(["NUMBER", "PLUS", "SEMICOLON"]).is_err());
//! # Ok::<(), yapar_gen::GenError>(())
//! ```

mod error;
mod yalp;

pub mod generate;
pub mod grammar;
pub mod lr0;
pub mod report;
pub mod sets;
pub mod slr;

pub use crate::error::{ConflictKind, GenError};
pub use crate::generate::{
    ArtifactFormat, Build, DEFAULT_MAX_STATES, GenConfig, build, generate, render_rust,
    write_artifact,
};
pub use crate::grammar::{Grammar, GrammarBuilder};
