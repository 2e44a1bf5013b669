use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI для QuiverSnip: сниппеты в файле базы <-> папка со скриптами
#[derive(Parser, Debug)]
#[command(name = "quiversnip", version, about = "QuiverSnip CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Create an empty database file
    Init {
        #[arg(long)]
        path: PathBuf,
    },
    /// Import snippets from a folder, replacing the current ones
    ///
    /// Без --folder используется <каталог базы>/.snippets (создаётся при отсутствии).
    /// Явно указанная папка должна существовать.
    Load {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        folder: Option<PathBuf>,
    },
    /// Export snippets into a folder (one <name>.<ext> file per snippet)
    Save {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        folder: Option<PathBuf>,
    },
    /// Delete all snippets
    Delete {
        #[arg(long)]
        path: PathBuf,
    },
    /// List snippets in slot order
    List {
        #[arg(long)]
        path: PathBuf,
        /// Print snippet bodies too
        #[arg(long, default_value_t = false)]
        body: bool,
        /// JSON output (array)
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Delete the snippet at one slot
    Rm {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        slot: u64,
    },
    /// Print store/index summary
    Status {
        #[arg(long)]
        path: PathBuf,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Cli as Parser>::parse()
    }
}
