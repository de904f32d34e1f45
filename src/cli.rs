use clap::builder::styling::AnsiColor;
use clap::builder::Styles;
use clap::{Parser, Subcommand};

pub use platekey::VERSION;

const INFO_STRING: &str = "
🧪 platekey version ";
const AFTER_STRING: &str = "
   ──────────────────────────────────
   plate layouts and index-barcode key resolution for ancient DNA libraries";

// colouring of the help
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().bold())
    .usage(AnsiColor::BrightMagenta.on_default().bold())
    .literal(AnsiColor::BrightMagenta.on_default())
    .placeholder(AnsiColor::White.on_default());

#[derive(Parser)]
#[command(
    version = VERSION,
    about = format!("{}{}{}", INFO_STRING, VERSION, AFTER_STRING),
    arg_required_else_help = true,
    flatten_help = true,
    styles = STYLES
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert between well names and linear well indices
    #[command(arg_required_else_help = true)]
    Locate {
        /// wells (e.g. `C4`) or linear indices 0-95 (e.g. `26`)
        positions: Vec<String>,
    },

    /// Write the p5/p7 Q-barcode assignment for every well of a plate
    Layout {
        /// even offset applied to p7 labels relative to p5 labels
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        offset: i32,

        /// the output .tsv
        #[arg(short)]
        output: Option<String>,
    },

    /// Write the double-stranded i5/i7 index numbers for every well of a plate
    #[command(arg_required_else_help = true)]
    Indices {
        /// p5 index used for rows A-D; rows E-H use the next index
        #[arg(long)]
        p5_start: u32,

        /// the output .tsv
        #[arg(short)]
        output: Option<String>,
    },

    /// Rotate a plate layout by 180°
    #[command(arg_required_else_help = true)]
    Rotate {
        /// the layout .tsv, with columns `id`, `position` and optionally `control`
        #[arg(long)]
        layout: String,

        /// the batch name of the layout, e.g. `CAP.42_DS`
        #[arg(long)]
        name: String,

        /// the layout is already rotated
        #[arg(long, action)]
        rotated: bool,

        /// the output .tsv
        #[arg(short)]
        output: Option<String>,
    },

    /// Print the name of a batch's rotated counterpart
    #[command(arg_required_else_help = true)]
    PairName {
        /// batch name of the form <family>.<number>[.U][.NE<n>]_<type>
        name: String,
    },

    /// Check a plate layout for wells claimed by more than one occupant
    #[command(arg_required_else_help = true)]
    Check {
        /// the layout .tsv, with columns `id`, `position` and optionally `control`
        #[arg(long)]
        layout: String,
    },

    /// Resolve demultiplexed index-barcode keys against a sample sheet
    #[command(arg_required_else_help = true)]
    Resolve {
        /// the tab-delimited sample sheet
        #[arg(long)]
        sheet: String,

        /// file of discovered keys, one `i5_i7_p5_p7` key per line
        #[arg(long)]
        keys: String,

        /// the output report .tsv
        #[arg(short)]
        output: Option<String>,
    },
}
