use anyhow::Result;

use webchord::cli::CliArgs;

fn main() -> Result<()> {
    webchord::tracing::init();

    let mut config = CliArgs::parse_startup();
    config.system_clipboard = true;
    tracing::debug!("startup: {:?}", config);

    let stdout = std::io::stdout();
    webchord::headless::run(&config, &mut stdout.lock())?;
    Ok(())
}
