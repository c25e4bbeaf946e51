use crate::config::Settings;
use crate::installer;
use anyhow::Result;

pub struct InstallArgs<'a> {
    pub force: bool,
    pub pin: Option<&'a str>,
    pub settings: &'a Settings,
}

pub fn run_install(args: InstallArgs) -> Result<()> {
    // A --pin on the command line wins over a version pinned in config.
    let pin = args.pin.or(args.settings.pinned_version.as_deref());
    installer::install(args.settings, args.force, pin)
}
