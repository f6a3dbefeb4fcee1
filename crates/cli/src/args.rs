use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use schoolgrid_core::types::{DbId, GridContext};

#[derive(Debug, Parser)]
#[command(name = "schoolgrid", version, about = "Edit class and teacher timetables")]
pub struct Cli {
    /// Bearer token, overriding `SCHOOLGRID_TOKEN`.
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the timetable grid and workload.
    Show {
        #[command(flatten)]
        target: Target,
    },
    /// Print daily and weekly assignment counts.
    Workload {
        #[command(flatten)]
        target: Target,
    },
    /// Apply a JSON file of edits and save the result.
    Apply {
        #[command(flatten)]
        target: Target,
        /// JSON array of edits.
        #[arg(long)]
        edits: PathBuf,
        /// Date the saved timetable takes effect (YYYY-MM-DD).
        #[arg(long)]
        effect_from: NaiveDate,
        /// Publish the saved timetable.
        #[arg(long)]
        publish: bool,
        /// Answer yes to every confirmation.
        #[arg(long, short)]
        yes: bool,
        /// Show the planned requests without sending them.
        #[arg(long)]
        dry_run: bool,
    },
}

/// Exactly one of `--class` / `--teacher`.
#[derive(Debug, Clone, Copy, Args)]
#[group(required = true, multiple = false)]
pub struct Target {
    /// Edit this class's timetable.
    #[arg(long)]
    pub class: Option<DbId>,
    /// Edit this teacher's timetable.
    #[arg(long)]
    pub teacher: Option<DbId>,
}

impl Target {
    pub fn context(&self) -> anyhow::Result<GridContext> {
        match (self.class, self.teacher) {
            (Some(class_id), None) => Ok(GridContext::Class(class_id)),
            (None, Some(teacher_id)) => Ok(GridContext::Teacher(teacher_id)),
            _ => anyhow::bail!("pass exactly one of --class or --teacher"),
        }
    }
}
