use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Log at debug level unless RUST_LOG is set.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Structure raw generated text into a document (JSON).
    Structure(StructureArgs),
    /// Generate content for a site analysis and structure it.
    Generate(GenerateArgs),
    /// Export a structured document to another format.
    Export(ExportArgs),
    /// Inspect saved documents.
    Store {
        #[command(subcommand)]
        command: StoreCommand,
    },
}

#[derive(Debug, Args)]
pub struct StructureArgs {
    /// Raw text file (`-` for stdin).
    #[arg(long)]
    pub input: String,

    /// Content type label (e.g. sustainability, technical, blog).
    #[arg(long)]
    pub content_type: String,

    /// Output file for the document JSON (default: stdout).
    #[arg(long)]
    pub out: Option<String>,

    /// Overwrite the output file if it exists.
    #[arg(long, default_value_t = false)]
    pub force: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LlmEngine {
    Noop,
    Command,
    Openai,
}

impl LlmEngine {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::Command => "command",
            Self::Openai => "openai",
        }
    }
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Site analysis file (JSON, or YAML with a .yaml/.yml extension).
    #[arg(long)]
    pub analysis: String,

    /// Content type label (e.g. sustainability, technical, blog).
    #[arg(long)]
    pub content_type: String,

    /// Writing tone passed to the generator.
    #[arg(long, default_value = "professional")]
    pub tone: String,

    /// Text generation engine.
    #[arg(long, value_enum, default_value_t = LlmEngine::Noop)]
    pub engine: LlmEngine,

    /// Program to run when --engine=command (prompt on stdin, text on stdout).
    #[arg(long)]
    pub command: Option<String>,

    /// Arguments for --command.
    #[arg(last = true)]
    pub command_args: Vec<String>,

    /// Extra attempts for the OpenAI engine.
    #[arg(long, default_value_t = 2)]
    pub retries: usize,

    /// Output file for the document JSON (default: stdout).
    #[arg(long)]
    pub out: Option<String>,

    /// Overwrite the output file if it exists.
    #[arg(long, default_value_t = false)]
    pub force: bool,

    /// Also save the document in this store directory.
    #[arg(long)]
    pub store: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Md,
    Html,
    Csv,
    Json,
    Pdf,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Structured document JSON (as written by `structure`/`generate`).
    #[arg(long)]
    pub input: String,

    #[arg(long, value_enum)]
    pub format: ExportFormat,

    /// Output file path.
    #[arg(long)]
    pub out: String,

    /// Overwrite the output file if it exists.
    #[arg(long, default_value_t = false)]
    pub force: bool,

    /// pandoc executable used for PDF export.
    #[arg(long, default_value = "pandoc")]
    pub pandoc: String,

    /// PDF engine for pandoc (default: try weasyprint, then tectonic).
    #[arg(long)]
    pub pdf_engine: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum StoreCommand {
    /// List saved documents, oldest first.
    List(StoreListArgs),
    /// Print a saved document as JSON.
    Show(StoreShowArgs),
}

#[derive(Debug, Args)]
pub struct StoreListArgs {
    /// Store directory.
    #[arg(long)]
    pub dir: String,
}

#[derive(Debug, Args)]
pub struct StoreShowArgs {
    /// Store directory.
    #[arg(long)]
    pub dir: String,

    /// Document id (UUID).
    #[arg(long)]
    pub id: String,
}
