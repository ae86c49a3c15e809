use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use git_picker::{
    ConflictSelectionState, PickerError, Selection, TransformOptions, modify_patch_for_hunk,
    modify_patch_for_line, modify_patch_for_range, parse_patch,
};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "git-picker", version)]
#[command(about = "Line-level patch rewriting and merge-conflict resolution")]
struct Cli {
    /// Log engine decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List hunk headers and stageable lines of a diff with their indices
    Hunks {
        /// Diff to read, `-` or omitted for stdin
        patch: Option<PathBuf>,
    },
    /// Print a patch staging only the change at one line index
    StageLine {
        /// 0-based index of the `+` or `-` line in the diff
        #[arg(short, long)]
        line: usize,
        patch: Option<PathBuf>,
    },
    /// Print a patch containing only the hunk around a line index
    StageHunk {
        /// 0-based index of any line in the hunk
        #[arg(short, long)]
        line: usize,
        patch: Option<PathBuf>,
    },
    /// Print a patch for an inclusive range of line indices
    StageRange {
        #[arg(long)]
        first: usize,
        #[arg(long)]
        last: usize,
        /// Build the reverse patch, for unstaging from the index
        #[arg(short, long)]
        reverse: bool,
        /// Replace the diff's header block with `--- a/F` and `+++ b/F`
        #[arg(long)]
        filename: Option<String>,
        patch: Option<PathBuf>,
    },
    /// List merge conflicts in a file
    Conflicts {
        file: PathBuf,
    },
    /// Print a file with one conflict resolved (the file is not modified)
    Resolve {
        file: PathBuf,
        /// 1-based conflict number, as listed by `conflicts`
        #[arg(short, long, default_value_t = 1)]
        conflict: usize,
        /// Region of the conflict to keep
        #[arg(short, long, value_enum)]
        pick: Pick,
    },
    /// Generate shell completions
    Completions {
        shell: Shell,
    },
    /// Generate a man page
    Man,
}

#[derive(Clone, Copy, ValueEnum)]
enum Pick {
    Top,
    Middle,
    Bottom,
    All,
}

impl From<Pick> for Selection {
    fn from(pick: Pick) -> Self {
        match pick {
            Pick::Top => Selection::Top,
            Pick::Middle => Selection::Middle,
            Pick::Bottom => Selection::Bottom,
            Pick::All => Selection::All,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("GIT_PICKER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), PickerError> {
    let mut out = io::stdout().lock();

    match cli.command {
        Commands::Hunks { patch } => {
            let patch = read_input(patch.as_deref())?;
            let parsed = parse_patch(&patch);
            let lines: Vec<&str> = patch.split_terminator('\n').collect();
            let mut positions: Vec<usize> = parsed
                .hunk_starts
                .iter()
                .chain(&parsed.stageable_lines)
                .copied()
                .collect();
            positions.sort_unstable();

            for index in positions {
                if let Some(line) = lines.get(index) {
                    writeln!(out, "{index}\t{line}")?;
                }
            }
        }
        Commands::StageLine { line, patch } => {
            let patch = read_input(patch.as_deref())?;
            out.write_all(modify_patch_for_line(&patch, line)?.as_bytes())?;
        }
        Commands::StageHunk { line, patch } => {
            let patch = read_input(patch.as_deref())?;
            let parsed = parse_patch(&patch);
            out.write_all(modify_patch_for_hunk(&patch, &parsed.hunk_starts, line)?.as_bytes())?;
        }
        Commands::StageRange {
            first,
            last,
            reverse,
            filename,
            patch,
        } => {
            let patch = read_input(patch.as_deref())?;
            let options = TransformOptions {
                reverse,
                keep_original_header: filename.is_none(),
                filename: filename.as_deref().unwrap_or_default(),
            };
            let rewritten = modify_patch_for_range(&patch, first, last, &options)?;
            if rewritten.is_empty() {
                debug!(first, last, "selection contains no changes");
            }
            out.write_all(rewritten.as_bytes())?;
        }
        Commands::Conflicts { file } => {
            let state = load_conflicts(&file)?;
            for (number, conflict) in state.conflicts().iter().enumerate() {
                let style = if conflict.has_ancestor() { "3-way" } else { "2-way" };
                writeln!(
                    out,
                    "{}\t{}-{}\t{style}",
                    number + 1,
                    conflict.start + 1,
                    conflict.end + 1
                )?;
            }
        }
        Commands::Resolve {
            file,
            conflict,
            pick,
        } => {
            let mut state = load_conflicts(&file)?;
            let no_such_conflict = || PickerError::NoSuchConflict {
                number: conflict,
                path: file.display().to_string(),
            };
            if conflict == 0 || conflict > state.conflicts().len() {
                return Err(no_such_conflict());
            }
            for _ in 1..conflict {
                state.select_next_conflict();
            }

            let content = state
                .content_after_conflict_resolve(pick.into())?
                .ok_or_else(no_such_conflict)?;
            out.write_all(content.as_bytes())?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "git-picker", &mut out);
        }
        Commands::Man => {
            clap_mangen::Man::new(Cli::command()).render(&mut out)?;
        }
    }

    Ok(())
}

/// Read a whole input file, with `-` or no path meaning stdin
fn read_input(path: Option<&Path>) -> io::Result<String> {
    match path {
        Some(path) if path != Path::new("-") => fs::read_to_string(path),
        _ => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

fn load_conflicts(file: &Path) -> io::Result<ConflictSelectionState> {
    let mut state = ConflictSelectionState::new();
    state.set_content(fs::read_to_string(file)?, file);
    Ok(state)
}
