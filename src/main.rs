use color_eyre::{eyre::WrapErr, Result};
use tracing::error;

use outlinetodo::{logging, App, Config, TodoStore};

fn main() -> Result<()> {
    color_eyre::install()?;
    let config = Config::load()?;
    logging::init_logging(&config)?;

    // nothing to show without a store
    let store = TodoStore::open_file(config.store_path())
        .inspect_err(|err| error!(error = %err, "cannot open todo store"))
        .wrap_err_with(|| format!("opening {}", config.store_path().display()))?;

    let terminal = ratatui::init();
    let app_result = App::new(store, &config).run(terminal);
    ratatui::restore();
    app_result
}
