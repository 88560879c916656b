use chaospad::state::{PageRequest, Sort};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Returns the version string, including the git hash for non-release builds.
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{}", VERSION, GIT_HASH)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "chaospad", bin_name = "chaospad", version = get_version())]
#[command(about = "Manage chaospad pads from the terminal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Dashboard URL (overrides config and CHAOSPAD_URL)
    #[arg(long, global = true, help_heading = "Options")]
    pub url: Option<String>,

    /// Directory holding config.json
    #[arg(long, global = true, help_heading = "Options")]
    pub config_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List pads (the default command)
    #[command(alias = "ls")]
    List(PageArgs),

    /// Show a single pad
    #[command(alias = "v")]
    Show {
        /// Pad id
        id: String,
    },

    /// Create a new pad
    #[command(alias = "n")]
    Create {
        /// Name of the pad
        name: String,

        /// Content of the pad
        #[arg(short, long)]
        content: Option<String>,
    },

    /// Change a pad's name or content
    #[command(alias = "e")]
    Edit {
        /// Pad id
        id: String,

        /// New name
        #[arg(short, long)]
        name: Option<String>,

        /// New content
        #[arg(short, long)]
        content: Option<String>,
    },

    /// Delete a pad
    #[command(alias = "rm")]
    Delete {
        /// Pad id
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Export the listed page to pads_YYYY-MM-DD.csv
    Export {
        #[command(flatten)]
        page: PageArgs,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Get or set configuration
    Config {
        /// Configuration key (e.g. server-url)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}

/// Which page of the table to load.
#[derive(Args, Debug, Clone, Default)]
pub struct PageArgs {
    /// Only pads whose name or content contains this text
    #[arg(short, long)]
    pub search: Option<String>,

    /// Page number, starting at 1
    #[arg(short, long)]
    pub page: Option<usize>,

    /// Rows per page
    #[arg(long)]
    pub per_page: Option<usize>,

    /// Sort field (name, content, created_at, updated_at)
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort ascending instead of descending
    #[arg(long)]
    pub asc: bool,
}

impl PageArgs {
    /// Pagination overrides, resolved against the configured sort field.
    pub fn page_request(&self, current: &Sort) -> PageRequest {
        let sort = match (&self.sort, self.asc) {
            (Some(field), asc) => Some(Sort {
                field: field.clone(),
                descending: !asc,
            }),
            (None, true) => Some(Sort {
                field: current.field.clone(),
                descending: false,
            }),
            (None, false) => None,
        };
        PageRequest {
            sort,
            page: self.page,
            page_size: self.per_page,
        }
    }
}
