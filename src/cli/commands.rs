//! Command dispatch

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::QuerySession;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::cli::render::render_json;
use crate::cli::shell::{print_fields, print_operators, print_tree, run_interactive, run_script};
use crate::config::{expand_path, global_config_path, Settings};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    debug!("settings: seed={}, {} field(s)", settings.seed, settings.fields.len());

    match &cli.command {
        Some(Commands::Show { json }) => cmd_show(&settings, *json),
        Some(Commands::Shell) | None => cmd_shell(&settings),
        Some(Commands::Run { script, json }) => cmd_run(&settings, script, *json),
        Some(Commands::Fields) => {
            print_fields(&QuerySession::from_settings(&settings));
            Ok(())
        }
        Some(Commands::Operators) => {
            print_operators();
            Ok(())
        }
        Some(Commands::Config { command }) => cmd_config(cli, &settings, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}

fn print_session(session: &QuerySession, json: bool) -> CliResult<()> {
    if json {
        output::info(&render_json(session.root())?);
    } else {
        print_tree(session);
    }
    Ok(())
}

#[instrument(level = "debug", skip(settings))]
fn cmd_show(settings: &Settings, json: bool) -> CliResult<()> {
    print_session(&QuerySession::from_settings(settings), json)
}

#[instrument(level = "debug", skip(settings))]
fn cmd_shell(settings: &Settings) -> CliResult<()> {
    let mut session = QuerySession::from_settings(settings);
    output::info("querytree shell, 'help' lists commands");
    run_interactive(&mut session, io::stdin().lock())
}

#[instrument(level = "debug", skip(settings))]
fn cmd_run(settings: &Settings, script: &Path, json: bool) -> CliResult<()> {
    let path = expand_path(script);
    let file = File::open(&path)
        .map_err(|e| CliError::io(format!("open script {}", path.display()), e))?;
    let mut session = QuerySession::from_settings(settings);
    run_script(&mut session, BufReader::new(file))?;
    print_session(&session, json)
}

fn cmd_config(cli: &Cli, settings: &Settings, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Path => {
            match cli.config.as_deref().map(expand_path).or_else(global_config_path) {
                Some(path) => output::info(&path.display()),
                None => output::warning("no config directory available on this platform"),
            }
            Ok(())
        }
        ConfigCommands::Init { force } => {
            let path = global_config_path().ok_or_else(|| {
                CliError::Usage("no config directory available on this platform".into())
            })?;
            if path.exists() && !force {
                return Err(CliError::Usage(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)
                    .map_err(|e| CliError::io(format!("create {}", dir.display()), e))?;
            }
            std::fs::write(&path, Settings::default().to_toml()?)
                .map_err(|e| CliError::io(format!("write {}", path.display()), e))?;
            output::success(&format!("created {}", path.display()));
            Ok(())
        }
    }
}
