//! `schoolgrid` -- view and edit class and teacher timetables.
//!
//! Loads reference data and existing rows from the timetable backend,
//! applies edit scripts to the grid, and saves the differences back.
//!
//! # Environment variables
//!
//! | Variable                          | Required | Default                     | Description                      |
//! |-----------------------------------|----------|-----------------------------|----------------------------------|
//! | `SCHOOLGRID_API_URL`              | no       | `http://localhost:8080/api` | Backend base URL                 |
//! | `SCHOOLGRID_TOKEN`                | no       | --                          | Bearer token sent with requests  |
//! | `SCHOOLGRID_REQUEST_TIMEOUT_SECS` | no       | `30`                        | Per-request timeout in seconds   |
//! | `RUST_LOG`                        | no       | `schoolgrid=info,schoolgrid_client=info` | Log filter          |

mod args;
mod edits;
mod prompt;
mod render;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use schoolgrid_client::api::HttpTimetableApi;
use schoolgrid_client::config::ClientConfig;
use schoolgrid_client::loader::{load_reference, refresh_records};
use schoolgrid_client::save::SaveReconciler;
use schoolgrid_client::session::{Session, SessionHandle};
use schoolgrid_core::reconcile::{plan_save, SaveOptions};
use schoolgrid_core::types::GridContext;
use schoolgrid_core::week_fill::GridEditor;
use schoolgrid_core::workload::{Workload, WorkloadMemo};

use crate::args::{Cli, Command};
use crate::prompt::TerminalPrompter;
use crate::render::Labels;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "schoolgrid=info,schoolgrid_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = ClientConfig::from_env().context("invalid client configuration")?;
    tracing::info!(
        api_url = %config.api_url,
        authenticated = config.token.is_some() || cli.token.is_some(),
        timeout_secs = config.request_timeout.as_secs(),
        "Starting schoolgrid",
    );

    let session = SessionHandle::new(Session::new(config.token.clone()));
    if let Some(token) = cli.token {
        session.set_token(token).await;
    }
    let api = HttpTimetableApi::new(&config, session).context("building HTTP client")?;

    match cli.command {
        Command::Show { target } => {
            let context = target.context()?;
            let data = load_reference(&api, context).await;
            let grid = data.grid();
            print!("{}", render::grid_table(&grid, &Labels::new(&data)));
            println!("{}", render::workload_line(&Workload::compute(&grid)));
            if let GridContext::Class(class_id) = context {
                print!("{}", render::subject_legend(&data.association_index(), class_id));
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Workload { target } => {
            let context = target.context()?;
            let data = load_reference(&api, context).await;
            println!("{}", render::workload_line(&Workload::compute(&data.grid())));
            Ok(ExitCode::SUCCESS)
        }
        Command::Apply {
            target,
            edits: edits_path,
            effect_from,
            publish,
            yes,
            dry_run,
        } => {
            let context = target.context()?;
            let script = edits::load(&edits_path)?;
            let data = load_reference(&api, context).await;

            let mut editor = GridEditor::new(data.grid(), TerminalPrompter::new(yes));
            let summary = edits::apply(&mut editor, &script)?;
            tracing::info!(
                applied = summary.applied,
                week_fills = summary.week_fills,
                week_clears = summary.week_clears,
                "Edits applied",
            );
            if let GridContext::Class(class_id) = context {
                for pair in edits::unlisted_pairs(editor.grid(), &data.association_index(), class_id) {
                    tracing::warn!(%pair, "Pair is not in the class's subject list");
                }
            }

            let mut workload = WorkloadMemo::default();
            println!("{}", render::workload_line(workload.get(editor.grid())));

            let options = SaveOptions {
                context,
                effect_from,
                published: publish,
            };

            if dry_run {
                let plan = plan_save(editor.grid(), &options)?;
                print!("{}", render::plan_summary(&plan));
                return Ok(ExitCode::SUCCESS);
            }

            let (grid, prompter) = editor.parts_mut();
            match SaveReconciler::new(&api).save(grid, &options, prompter).await {
                Ok(outcome) => {
                    println!("{}", outcome.message());
                    // Show what the backend now stores.
                    if let Err(e) = refresh_records(&api, context, grid).await {
                        tracing::warn!(error = %e, "Could not reload timetable after save");
                    }
                    print!("{}", render::grid_table(grid, &Labels::new(&data)));
                    println!("{}", render::workload_line(workload.get(grid)));
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Save failed");
                    eprintln!("{}", e.user_message());
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}
