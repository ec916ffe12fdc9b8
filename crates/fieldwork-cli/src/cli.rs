use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "fieldwork")]
#[command(about = "Work orders for field technicians, from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// CLI profile name (defaults to FIELDWORK_PROFILE, then the active profile)
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,

    /// Override the work order API base URL for this invocation
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in, sign out, or show the current user
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Today's agenda and upcoming work
    #[command(alias = "home")]
    Dashboard {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List work orders
    #[command(alias = "ls")]
    List {
        /// All, Today, or a status such as "Waiting on Parts"
        #[arg(short, long, default_value = "All")]
        status: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Month view with scheduled orders per day
    Calendar {
        /// Month to show as YYYY-MM (defaults to the selected day's month)
        #[arg(long, value_name = "YYYY-MM")]
        month: Option<String>,
        /// Day whose orders are listed as YYYY-MM-DD (defaults to today)
        #[arg(long, value_name = "YYYY-MM-DD")]
        day: Option<String>,
    },
    /// Show one work order with notes and attachments
    Show {
        /// Work order ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change a work order's status
    Status {
        /// Work order ID
        id: String,
        /// New status
        status: String,
    },
    /// Create a work order
    #[command(alias = "new")]
    Create {
        #[command(flatten)]
        fields: FormArgs,
        #[command(flatten)]
        files: FileArgs,
    },
    /// Edit a work order; omitted fields keep their current values
    Edit {
        /// Work order ID
        id: String,
        #[command(flatten)]
        fields: FormArgs,
        #[command(flatten)]
        files: FileArgs,
    },
    /// Add a note to a work order
    Note {
        /// Work order ID
        id: String,
        /// Note text
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Manage work order photos
    Photo {
        #[command(subcommand)]
        command: PhotoCommands,
    },
    /// Download, attach, or annotate work order PDFs
    Pdf {
        #[command(subcommand)]
        command: PdfCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct FormArgs {
    /// PO number
    #[arg(long, value_name = "TEXT")]
    pub po: Option<String>,
    /// Customer name
    #[arg(long, value_name = "TEXT")]
    pub customer: Option<String>,
    /// Site location
    #[arg(long, value_name = "TEXT")]
    pub site: Option<String>,
    /// Billing address
    #[arg(long, value_name = "TEXT")]
    pub billing: Option<String>,
    /// Problem description
    #[arg(long, value_name = "TEXT")]
    pub problem: Option<String>,
    /// Status
    #[arg(long, value_name = "STATUS")]
    pub status: Option<String>,
}

#[derive(Args, Debug, Default, Clone)]
pub struct FileArgs {
    /// Photo to attach (repeatable)
    #[arg(long = "photo", value_name = "PATH")]
    pub photos: Vec<PathBuf>,
    /// PDF to attach
    #[arg(long, value_name = "PATH")]
    pub pdf: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Sign in and store the session in the OS keychain
    Login {
        /// Account username
        #[arg(long, value_name = "NAME")]
        username: String,
        /// Account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Show the signed-in user
    Whoami,
    /// Forget the stored session
    Logout,
}

#[derive(Subcommand)]
pub enum PhotoCommands {
    /// Upload photos (downscaled to 1600px JPEG)
    Add {
        /// Work order ID
        id: String,
        /// Image files
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Delete a photo by storage key
    Delete {
        /// Work order ID
        id: String,
        /// Storage key as shown by `fieldwork show`
        key: String,
    },
    /// Render a stroke script onto a blank page and upload it as a photo
    Sketch {
        /// Work order ID
        id: String,
        /// JSON sketch script
        #[arg(long, value_name = "PATH")]
        strokes: PathBuf,
        /// Write the drawing here instead of uploading
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum PdfCommands {
    /// Download a work order's PDF into the cache directory
    Download {
        /// Work order ID
        id: String,
        /// Optional output path
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Attach or replace a work order's PDF
    Attach {
        /// Work order ID
        id: String,
        /// PDF file
        path: PathBuf,
    },
    /// Print the page canvases used for annotation
    Layout {
        /// Local PDF file
        path: PathBuf,
        /// Use read-only viewer sizes instead of annotator sizes
        #[arg(long)]
        viewer: bool,
    },
    /// Flatten ink strokes into a PDF and upload the signed copy
    Annotate {
        /// Work order ID (required unless --input and --output are both given)
        id: Option<String>,
        /// JSON stroke script
        #[arg(long, value_name = "PATH")]
        strokes: PathBuf,
        /// Annotate a local PDF instead of the order's stored PDF
        #[arg(long, value_name = "PATH")]
        input: Option<PathBuf>,
        /// Write the result here instead of uploading
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update a profile
    Init {
        /// Work order API base URL
        #[arg(long, value_name = "URL")]
        api_base_url: Option<String>,
        /// Usernames offered the create command (comma separated, advisory)
        #[arg(long, value_name = "NAMES")]
        allowed_creators: Option<String>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
    /// Print the resolved profile
    Show,
}
