//! Grammar-to-tables pipeline and artifact output.
//!
//! [`build`] runs the whole construction on an in-memory [`Grammar`];
//! [`generate`] adds reading a `.yalp` file and writing the artifact, which
//! is what a `build.rs` script calls.

use crate::error::GenError;
use crate::grammar::Grammar;
use crate::lr0::{AugmentedGrammar, Automaton};
use crate::sets::{self, SymbolSets};
use crate::slr;
use std::fmt;
use std::fs;
use std::path::Path;
use yapar::{Action, ParseTables};

/// Default ceiling on the number of LR(0) states.
pub const DEFAULT_MAX_STATES: usize = 65_536;

/// Generation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenConfig {
    /// Fail with [`GenError::ResourceExceeded`] once the automaton would
    /// grow past this many states. `None` disables the check.
    pub max_states: Option<usize>,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            max_states: Some(DEFAULT_MAX_STATES),
        }
    }
}

/// Encoding of a written artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArtifactFormat {
    /// Pretty-printed JSON, loadable with [`ParseTables::load`].
    #[default]
    Json,
    /// A Rust module to be `include!`d, see [`render_rust`].
    Rust,
}

impl ArtifactFormat {
    /// `Rust` for paths ending in `.rs`, `Json` otherwise.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some("rs") => ArtifactFormat::Rust,
            _ => ArtifactFormat::Json,
        }
    }
}

/// Every intermediate result of a successful construction.
#[derive(Debug, Clone)]
pub struct Build {
    pub augmented: AugmentedGrammar,
    pub first: SymbolSets,
    pub follow: SymbolSets,
    pub automaton: Automaton,
    pub tables: ParseTables,
}

/// Runs set computation, automaton construction and table construction.
///
/// # Parameters
/// - `grammar`: A validated grammar.
/// - `config`: Generation settings.
///
/// # Returns
/// All intermediate results, or the first [`GenError`]. Nothing is
/// returned for a grammar that is not SLR(1).
pub fn build(grammar: &Grammar, config: &GenConfig) -> Result<Build, GenError> {
    let first = sets::first_sets(grammar);
    let follow = sets::follow_sets(grammar, grammar.start(), &first);
    let augmented = AugmentedGrammar::new(grammar);
    let automaton = Automaton::build(&augmented, config.max_states)?;
    let tables = slr::construct(&automaton, &augmented, &follow)?.with_ignore(grammar.ignores());
    log::debug!(
        "built {} productions into {} states",
        tables.productions().len(),
        tables.state_count()
    );
    Ok(Build {
        augmented,
        first,
        follow,
        automaton,
        tables,
    })
}

/// Renders `tables` as a self-contained Rust module.
///
/// The module defines the constants `START`, `N_STATES`, `PRODUCTIONS`,
/// `ACTION`, `GOTO` and `IGNORE`, a `tables()` accessor that builds the
/// [`ParseTables`] once, and a `parse(tokens)` entry point. It expects the
/// `yapar` crate to be available to the including crate.
pub fn render_rust(tables: &ParseTables) -> String {
    RustModule(tables).to_string()
}

struct RustModule<'a>(&'a ParseTables);

impl fmt::Display for RustModule<'_> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tables = self.0;
        writeln!(out, "/*")?;
        writeln!(out, "Produced by parser generator yapar")?;
        writeln!(out)?;
        for (i, prod) in tables.productions().iter().enumerate() {
            writeln!(out, "{}: {}", i, prod)?;
        }
        writeln!(out, "*/\n")?;

        writeln!(out, "use yapar::{{Action, ParseTables}};\n")?;
        writeln!(out, "pub const START: &str = {:?};", tables.start())?;
        writeln!(out, "pub const N_STATES: usize = {};\n", tables.state_count())?;

        writeln!(out, "pub const PRODUCTIONS: &[(&str, &[&str])] = &[")?;
        for (i, prod) in tables.productions().iter().enumerate() {
            let rhs: Vec<String> = prod.rhs.iter().map(|s| format!("{:?}", s.as_str())).collect();
            writeln!(
                out,
                "    ({:?}, &[{}]), // {}",
                prod.lhs.as_str(),
                rhs.join(", "),
                i
            )?;
        }
        writeln!(out, "];\n")?;

        writeln!(out, "pub const ACTION: &[(usize, &str, Action)] = &[")?;
        for state in 0..tables.state_count() {
            for (terminal, action) in tables.actions(state) {
                let action = match action {
                    Action::Shift(s) => format!("Action::Shift({})", s),
                    Action::Reduce(p) => format!("Action::Reduce({})", p),
                    Action::Accept => "Action::Accept".to_string(),
                };
                writeln!(out, "    ({}, {:?}, {}),", state, terminal, action)?;
            }
        }
        writeln!(out, "];\n")?;

        writeln!(out, "pub const GOTO: &[(usize, &str, usize)] = &[")?;
        for state in 0..tables.state_count() {
            for (nonterminal, target) in tables.gotos(state) {
                writeln!(out, "    ({}, {:?}, {}),", state, nonterminal, target)?;
            }
        }
        writeln!(out, "];\n")?;

        let ignore: Vec<String> = tables.ignored().map(|t| format!("{:?}", t)).collect();
        writeln!(out, "pub const IGNORE: &[&str] = &[{}];\n", ignore.join(", "))?;

        writeln!(out, "/// The parse tables, built on first use.")?;
        writeln!(out, "pub fn tables() -> &'static ParseTables {{")?;
        writeln!(
            out,
            "    static TABLES: std::sync::OnceLock<ParseTables> = std::sync::OnceLock::new();"
        )?;
        writeln!(out, "    TABLES.get_or_init(|| {{")?;
        writeln!(
            out,
            "        ParseTables::from_static(START, N_STATES, PRODUCTIONS, ACTION, GOTO, IGNORE)"
        )?;
        writeln!(out, "    }})")?;
        writeln!(out, "}}\n")?;

        writeln!(out, "/// Runs the parser over `tokens`.")?;
        writeln!(
            out,
            "pub fn parse<I, T>(tokens: I) -> Result<yapar::ParserStats, yapar::ParseError>"
        )?;
        writeln!(out, "where")?;
        writeln!(out, "    I: IntoIterator<Item = T>,")?;
        writeln!(out, "    T: yapar::Token,")?;
        writeln!(out, "{{")?;
        writeln!(out, "    yapar::Parser::new(tables()).parse(tokens)")?;
        writeln!(out, "}}")
    }
}

/// Writes `tables` to `path`, replacing any previous artifact.
///
/// The content goes to a sibling temporary file first, which is then
/// renamed over `path`; on failure `path` is left as it was.
pub fn write_artifact<P: AsRef<Path>>(
    path: P,
    tables: &ParseTables,
    format: ArtifactFormat,
) -> Result<(), GenError> {
    let path = path.as_ref();
    let contents = match format {
        ArtifactFormat::Json => tables.to_json()?,
        ArtifactFormat::Rust => render_rust(tables),
    };
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, contents)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    log::debug!("wrote {:?} artifact to {}", format, path.display());
    Ok(())
}

/// Generates a parser artifact from a `.yalp` grammar file.
///
/// # Parameters
/// - `grammar_path`: The grammar file.
/// - `out_path`: Where to write the artifact.
/// - `format`: Artifact encoding.
/// - `config`: Generation settings.
///
/// # Returns
/// The construction results. On any error no artifact is written.
pub fn generate<P, Q>(
    grammar_path: P,
    out_path: Q,
    format: ArtifactFormat,
    config: &GenConfig,
) -> Result<Build, GenError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let text = fs::read_to_string(grammar_path.as_ref())?;
    let grammar = Grammar::from_yalp(&text)?;
    let result = build(&grammar, config)?;
    write_artifact(out_path, &result.tables, format)?;
    Ok(result)
}
