use clap::Parser;
use std::path::PathBuf;

/// Turn an exported chat transcript into a self-contained, printable page.
#[derive(Parser, Debug)]
#[command(name = "simplify-transcript", version, about)]
pub struct Cli {
    /// Exported transcript to read
    #[arg(default_value = "transcript2.html")]
    pub input: PathBuf,

    /// Where to write the simplified document (overwritten if present)
    #[arg(short, long, default_value = "transcript_simplified.html")]
    pub out: PathBuf,

    /// Document title template; overrides `title` from the config file
    #[arg(short, long)]
    pub title: Option<String>,

    /// Preferences file (TOML); created with defaults if missing
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    pub fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        }
    }
}
