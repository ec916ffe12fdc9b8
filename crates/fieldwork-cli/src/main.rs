//! Fieldwork CLI - work orders from the terminal
//!
//! A thin front-end over the work order API: list and schedule jobs, edit
//! orders, attach photos and PDFs, and sign PDFs with scripted ink.

mod auth;
mod cli;
mod commands;
mod config_profiles;
mod error;

#[cfg(test)]
mod tests;

use clap::{CommandFactory, Parser};

use crate::cli::{Cli, Commands};
use crate::commands::common::GlobalArgs;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        if let Some(hint) = error.login_hint() {
            eprintln!("{hint}");
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "fieldwork=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let global = GlobalArgs {
        profile: cli.profile.as_deref(),
        api_url: cli.api_url.as_deref(),
    };

    match cli.command {
        Some(Commands::Auth { command }) => commands::auth_cmd::run_auth(command, global).await?,
        Some(Commands::Dashboard { json }) => commands::list::run_dashboard(json, global).await?,
        Some(Commands::List { status, json }) => {
            commands::list::run_list(&status, json, global).await?;
        }
        Some(Commands::Calendar { month, day }) => {
            commands::calendar::run_calendar(month.as_deref(), day.as_deref(), global).await?;
        }
        Some(Commands::Show { id, json }) => commands::show::run_show(&id, json, global).await?,
        Some(Commands::Status { id, status }) => {
            commands::show::run_status(&id, &status, global).await?;
        }
        Some(Commands::Create { fields, files }) => {
            commands::form::run_create(&fields, &files, global).await?;
        }
        Some(Commands::Edit { id, fields, files }) => {
            commands::form::run_edit(&id, &fields, &files, global).await?;
        }
        Some(Commands::Note { id, text }) => commands::note::run_note(&id, &text, global).await?,
        Some(Commands::Photo { command }) => commands::photo::run_photo(command, global).await?,
        Some(Commands::Pdf { command }) => commands::pdf::run_pdf(command, global).await?,
        Some(Commands::Completions { shell, output }) => {
            commands::completions::run_completions(shell, output.as_deref())?;
        }
        Some(Commands::Config { command }) => commands::config::run_config(command, global)?,
        None => {
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
