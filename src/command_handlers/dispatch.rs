use crate::cli::Commands;
use crate::command_handlers::install;
use crate::config::Settings;
use crate::installer;
use anyhow::Result;

pub fn dispatch(cmd: Option<Commands>, settings: &Settings) -> Result<()> {
    let cmd = cmd.unwrap_or(Commands::Install {
        force: false,
        pin: None,
    });
    match cmd {
        Commands::Install { force, pin } => install::run_install(install::InstallArgs {
            force,
            pin: pin.as_deref(),
            settings,
        }),
        Commands::Plan => installer::plan(settings),
        Commands::Status => installer::status(settings),
        Commands::Versions { limit } => installer::versions(limit),
        Commands::Uninstall => installer::uninstall(settings),
    }
}
