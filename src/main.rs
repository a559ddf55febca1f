use std::error::Error;

use clap::Parser;
use tracing::{error, info};

pub mod core;
use crate::core::app::App;
use crate::core::config::Config;
use crate::core::logging;
use crate::core::store::NoteStore;

fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::parse();
    logging::init(&config.log_file, config.verbose)?;
    info!(store = %config.file.display(), "starting");

    let store = NoteStore::open(&config.file)?;
    let mut app = App::new(store)?;

    let terminal = ratatui::init();
    let result = app.run(terminal);
    ratatui::restore();

    if let Err(err) = &result {
        error!(%err, "exiting on error");
    }
    result?;

    Ok(())
}
