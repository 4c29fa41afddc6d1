//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};

use crate::application::OrderAction;
use crate::domain::TermId;

/// Category tree ordering: sibling ranks, promote/demote, cycle-safe reparenting and layout hints
#[derive(Parser, Debug)]
#[command(name = "catorder")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Term store file (default: store_path from config)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the full category tree
    Tree {
        /// Print the JSON response instead of a tree
        #[arg(long)]
        json: bool,
    },

    /// List top-level categories
    Roots {
        /// Print the JSON response
        #[arg(long)]
        json: bool,
    },

    /// List categories without subcategories
    Childless {
        /// Only top-level categories
        #[arg(long)]
        roots: bool,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Tree and childless ids as one JSON document
    Snapshot,

    /// Move a category among its siblings or across levels
    Move {
        /// Category id
        id: TermId,
        /// up/down: swap with neighbor; left: promote; right: nest under preceding sibling
        #[arg(value_enum)]
        direction: Direction,
        /// Print the JSON response
        #[arg(long)]
        json: bool,
    },

    /// Set the rank of a category
    SetOrder {
        /// Category id
        id: TermId,
        /// New rank
        #[arg(allow_negative_numbers = true)]
        order: i64,
        /// Print the JSON response
        #[arg(long)]
        json: bool,
    },

    /// Reparent a category (0 for top level)
    SetParent {
        /// Category id
        id: TermId,
        /// New parent id
        parent: TermId,
        /// Print the JSON response
        #[arg(long)]
        json: bool,
    },

    /// Show or change the layout hint
    Position {
        /// Category id
        id: TermId,
        /// left or right (omit to show the current value)
        #[arg(conflicts_with = "clear")]
        value: Option<String>,
        /// Remove the hint
        #[arg(long)]
        clear: bool,
    },

    /// Apply a raw update-order request
    Update {
        /// JSON body, e.g. '{"category_id": 3, "action": "move_up"}'
        request: String,
    },

    /// Apply a bulk reorder from a JSON array of {id, parent, order}
    Bulk {
        /// Input file, '-' for stdin
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl From<Direction> for OrderAction {
    fn from(d: Direction) -> Self {
        match d {
            Direction::Up => OrderAction::MoveUp,
            Direction::Down => OrderAction::MoveDown,
            Direction::Left => OrderAction::MoveLeft,
            Direction::Right => OrderAction::MoveRight,
        }
    }
}
