//! The `lengua score` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use lengua_core::score::{JsonFileStore, ScoreStore};
use lengua_loader::config::load_config_from;

pub fn execute(reset: bool, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let path = config.score_path();
    let mut store = ScoreStore::new(JsonFileStore::new(&path));
    let mut tracker = store.load();

    if reset {
        tracker.reset();
        store.save(&tracker.snapshot());
        println!("Score reset ({}).", path.display());
    }

    let snapshot = tracker.snapshot();
    let mut table = Table::new();
    table.set_header(vec!["Correct", "Incorrect", "Total", "Accuracy"]);
    table.add_row(vec![
        Cell::new(snapshot.correct),
        Cell::new(snapshot.incorrect()),
        Cell::new(snapshot.total),
        Cell::new(format!("{:.1}%", snapshot.accuracy())),
    ]);

    println!("{table}");
    Ok(())
}
