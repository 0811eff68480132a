use crate::core::export::ExportFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "dorm-dashboard")]
#[command(about = "Dormitory occupancy dashboard: statistics, room edits, export and assistant")]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Roster snapshot (JSON). Loaded when present, written back after edits
    #[arg(long)]
    pub roster: Option<PathBuf>,

    /// Seed for the mock data generator, for reproducible rosters
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the export output directory
    #[arg(long)]
    pub output_path: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Generate a fresh mock roster and write it to the --roster file
    Seed,

    /// Occupancy figures and charts for all dormitories or one of them
    Stats {
        #[arg(long)]
        dorm: Option<u32>,
    },

    /// Room grid of one dormitory, or the occupants of a single room
    Rooms {
        dorm: u32,
        room: Option<u32>,
    },

    /// Find students by name across every dormitory
    Search { query: String },

    /// Assign a new student to a room
    Add {
        dorm: u32,
        room: u32,
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = 1)]
        course: u8,
        #[arg(long)]
        group: String,
        #[arg(long)]
        faculty: String,
        #[arg(long)]
        direction: String,
        /// Used when --direction is "Boshqa"
        #[arg(long)]
        custom_direction: Option<String>,
        /// Picture file; resized and stored inline
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Move a student out of a room
    Remove {
        dorm: u32,
        room: u32,
        student_id: String,
    },

    /// Write the roster spreadsheet to the output directory
    Export {
        #[arg(long)]
        dorm: Option<u32>,
        #[arg(long, value_enum, default_value_t = ExportFormat::Xlsx)]
        format: ExportFormat,
    },

    /// Ask the assistant a single question
    Ask { question: String },

    /// Interactive chat with the assistant on stdin
    Chat,

    /// Generate a written occupancy report
    Analyze {
        #[arg(long)]
        dorm: Option<u32>,
    },
}
