//! Command-line interface for the `yapar` parser generator.
//!
//! `yapar generate <grammar>` reads a `.yalp` grammar, builds its SLR(1)
//! tables and, when `--output` is given, writes them as a JSON or Rust
//! artifact. The `--show-*` flags print the intermediate results to
//! standard output.
//!
//! Exit status: `0` on success, `1` when the grammar file is missing or
//! invalid, `2` when table generation or writing the artifact fails.

#[cfg(feature = "cli")]
mod real {
    use anyhow::Context;
    use clap::{Parser, Subcommand, ValueEnum};
    use std::io::{self, Write};
    use std::path::{Path, PathBuf};
    use std::process::ExitCode;
    use yapar_gen::{ArtifactFormat, GenConfig, Grammar, report};

    #[derive(Parser)]
    #[command(about = "Generate SLR(1) parse tables from a .yalp grammar")]
    struct Args {
        #[command(subcommand)]
        command: Command,

        /// Enable debug logging (off by default).
        #[arg(short = 'd', long, global = true)]
        debug: bool,
    }

    #[derive(Subcommand)]
    enum Command {
        /// Build the tables for a grammar file.
        Generate(GenerateArgs),
    }

    #[derive(clap::Args)]
    struct GenerateArgs {
        /// Path to the input .yalp grammar file
        grammar: PathBuf,

        /// Path of the artifact to write; nothing is written when omitted
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Artifact encoding; derived from the output extension when omitted
        #[arg(long, value_enum)]
        format: Option<Format>,

        /// Maximum number of LR(0) states (0 disables the limit)
        #[arg(long, default_value_t = yapar_gen::DEFAULT_MAX_STATES)]
        max_states: usize,

        /// Print the numbered productions
        #[arg(long)]
        show_grammar: bool,

        /// Print FIRST and FOLLOW sets
        #[arg(long)]
        show_first_follow: bool,

        /// Print the LR(0) item sets and transitions
        #[arg(long)]
        show_automaton: bool,

        /// Print the ACTION and GOTO tables
        #[arg(long)]
        show_tables: bool,
    }

    #[derive(Clone, Copy, ValueEnum)]
    enum Format {
        Json,
        Rust,
    }

    impl From<Format> for ArtifactFormat {
        fn from(format: Format) -> Self {
            match format {
                Format::Json => ArtifactFormat::Json,
                Format::Rust => ArtifactFormat::Rust,
            }
        }
    }

    fn load(path: &Path) -> anyhow::Result<Grammar> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read grammar file {}", path.display()))?;
        Grammar::from_yalp(&text).with_context(|| format!("in {}", path.display()))
    }

    fn run(args: &GenerateArgs, grammar: &Grammar) -> anyhow::Result<()> {
        let config = GenConfig {
            max_states: (args.max_states > 0).then_some(args.max_states),
        };
        let result = yapar_gen::build(grammar, &config)?;

        let stdout = io::stdout();
        let mut out = stdout.lock();
        if args.show_grammar {
            report::write_grammar(&mut out, &result.augmented)?;
            writeln!(out)?;
        }
        if args.show_first_follow {
            report::write_first_follow(&mut out, &result.first, &result.follow)?;
        }
        if args.show_automaton {
            report::write_automaton(&mut out, &result.automaton, &result.augmented)?;
        }
        if args.show_tables {
            report::write_tables(&mut out, &result.tables)?;
            writeln!(out)?;
        }

        if let Some(output) = &args.output {
            let format = args
                .format
                .map(ArtifactFormat::from)
                .unwrap_or_else(|| ArtifactFormat::from_path(output));
            yapar_gen::write_artifact(output, &result.tables, format)
                .with_context(|| format!("cannot write {}", output.display()))?;
        }
        Ok(())
    }

    pub fn main() -> ExitCode {
        let args = Args::parse();
        let level = if args.debug { "debug" } else { "warn" };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

        let Command::Generate(cmd) = &args.command;
        let grammar = match load(&cmd.grammar) {
            Ok(grammar) => grammar,
            Err(e) => {
                eprintln!("error: {:#}", e);
                return ExitCode::from(1);
            }
        };
        match run(cmd, &grammar) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {:#}", e);
                ExitCode::from(2)
            }
        }
    }
}

#[cfg(feature = "cli")]
fn main() -> std::process::ExitCode {
    real::main()
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("yapar disabled (compiled without `cli` feature)");
}
