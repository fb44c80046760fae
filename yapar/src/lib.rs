//! Copyright (c) 2005–2025 IKH Software, Inc.
//!
//! Released under the terms of the GNU Lesser General Public License, version 3.0
//! or (at your option) any later version (LGPL-3.0-or-later).
//!
//! Runtime support for SLR(1) parsers produced by `yapar-gen`.
//!
//! A generated parser is a [`ParseTables`] value: ACTION and GOTO tables
//! plus the production list they refer to. [`Parser`] drives those tables
//! over any sequence of terminal names and either accepts the input or
//! reports the first position where no action applies.
//!
//! ```
//! use yapar::{Action, ParseTables, Parser};
//!
//! // S -> a
//! let tables = ParseTables::from_static(
//!     "S",
//!     3,
//!     &[("S", &["a"])],
//!     &[
//!         (0, "a", Action::Shift(1)),
//!         (1, "$", Action::Reduce(0)),
//!         (2, "$", Action::Accept),
//!     ],
//!     &[(0, "S", 2)],
//!     &[],
//! );
//! assert!(Parser::new(&tables).parse(["a"]).is_ok());
//! assert!(Parser::new(&tables).parse(["a", "a"]).is_err());
//! ```

mod error;
mod parser;
mod table;

pub use crate::error::{ParseError, TableError};
pub use crate::parser::{Parser, ParserStats, Step, Token};
pub use crate::table::{Action, ParseTables, Production};

/// Index of an automaton state. State `0` is the start state.
pub type StateId = usize;

/// Index of a production in [`ParseTables::productions`].
pub type ProdId = usize;

/// Terminal appended to every input to mark its end.
pub const END_MARKER: &str = "$";

/// Token names the engine treats as the end of input.
pub const END_OF_INPUT_ALIASES: &[&str] = &[END_MARKER, "EOF"];
