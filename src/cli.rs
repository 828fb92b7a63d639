use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::inspection::Outcome;
use crate::model::{DataType, RecordId};
use crate::store::DEFAULT_DB_FILE_NAME;

#[derive(Parser, Debug)]
#[command(
    name = "qa-inspect",
    version,
    about = "Reproducible sample inspection and reporting for Q&A datasets"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate dataset quality metrics against acceptance criteria
    Metrics(MetricsArgs),
    /// Draw a reproducible sample and register it as a session
    Sample(SampleArgs),
    /// List sampled sessions and their inspection state
    Sessions(SessionsArgs),
    /// Print one item of a session
    Show(ShowArgs),
    /// Record a judgment on one item of a session
    Judge(JudgeArgs),
    /// Persist the inspected session
    Save(SaveArgs),
    /// Aggregate saved sessions and dataset metrics into a report
    Report(ReportArgs),
    /// Export a saved session as CSV
    Export(ExportArgs),
}

#[derive(Args, Debug, Clone)]
pub struct WorkspaceArgs {
    #[arg(long, default_value = ".cache/inspection")]
    pub workspace_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long)]
    pub criteria_path: Option<PathBuf>,
}

impl WorkspaceArgs {
    pub fn db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| self.workspace_root.join(DEFAULT_DB_FILE_NAME))
    }
}

#[derive(Args, Debug, Clone)]
pub struct MetricsArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    #[arg(long, value_enum)]
    pub data_type: DataType,

    #[arg(long)]
    pub dataset: PathBuf,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SampleArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    #[arg(long, value_enum)]
    pub data_type: DataType,

    #[arg(long)]
    pub dataset: PathBuf,

    #[arg(long)]
    pub sample_size: usize,

    #[arg(long = "round", default_value_t = 1)]
    pub round_num: u32,

    #[arg(long, default_value_t = 42, allow_hyphen_values = true)]
    pub seed: i64,
}

#[derive(Args, Debug, Clone)]
pub struct SessionsArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    #[arg(long)]
    pub session: String,

    /// 1-based item position; defaults to the reviewer cursor
    #[arg(long, conflicts_with = "record_id")]
    pub item: Option<usize>,

    /// Selects the item by dataset record id instead of position
    #[arg(long)]
    pub record_id: Option<RecordId>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum StatusArg {
    Pass,
    Fail,
}

impl From<StatusArg> for Outcome {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Pass => Outcome::Pass,
            StatusArg::Fail => Outcome::Fail,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum FlagArg {
    Yes,
    No,
    Unset,
}

impl FlagArg {
    pub fn as_option(self) -> Option<bool> {
        match self {
            Self::Yes => Some(true),
            Self::No => Some(false),
            Self::Unset => None,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct JudgeArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    #[arg(long)]
    pub session: String,

    /// 1-based item position; defaults to the reviewer cursor
    #[arg(long, conflicts_with = "record_id")]
    pub item: Option<usize>,

    /// Selects the item by dataset record id instead of position
    #[arg(long)]
    pub record_id: Option<RecordId>,

    #[arg(long, value_enum)]
    pub status: Option<StatusArg>,

    #[arg(long)]
    pub comment: Option<String>,

    #[arg(long, value_enum)]
    pub ad: Option<FlagArg>,

    #[arg(long, value_enum)]
    pub fake: Option<FlagArg>,

    /// Similarity pair judgment as `<check>=yes|no` (1-based check); repeating
    /// the stored value clears it
    #[arg(long = "similar")]
    pub similar: Vec<String>,

    #[arg(long)]
    pub inspector: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct SaveArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    #[arg(long)]
    pub session: String,
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    #[arg(long)]
    pub preprocessed_dataset: Option<PathBuf>,

    #[arg(long)]
    pub labeled_dataset: Option<PathBuf>,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    #[arg(long)]
    pub session: String,

    #[arg(long)]
    pub output: Option<PathBuf>,
}
