//! The `lengua validate` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use lengua_core::ingest::{
    ingest_conjugations, ingest_devices, ingest_spelling, parse_records, IngestWarning,
};
use lengua_core::model::Category;
use lengua_core::tense::{resolve, ResolverPolicy};

struct FileSummary {
    category: Category,
    records: usize,
    usable: usize,
    /// Ungradable spelling items or unclassifiable conjugations.
    limited: usize,
    warnings: Vec<IngestWarning>,
}

pub fn execute(data: PathBuf, category: Option<Category>) -> Result<()> {
    let files = if data.is_dir() {
        let found: Vec<(Category, PathBuf)> = Category::ALL
            .iter()
            .map(|&c| (c, data.join(format!("{}.json", c.file_stem()))))
            .filter(|(c, path)| category.map_or(true, |wanted| wanted == *c) && path.exists())
            .collect();
        if found.is_empty() {
            anyhow::bail!("no data files found in {}", data.display());
        }
        found
    } else {
        let category = match category {
            Some(c) => c,
            None => infer_category(&data)?,
        };
        vec![(category, data)]
    };

    let mut table = Table::new();
    table.set_header(vec!["File", "Records", "Usable", "Limited", "Warnings"]);
    let mut total_warnings = 0;

    for (category, path) in &files {
        let summary = validate_file(*category, path)?;

        println!("{} ({})", path.display(), summary.category);
        for w in &summary.warnings {
            println!("  [#{}] WARNING: {}", w.index, w.message);
        }
        total_warnings += summary.warnings.len();

        table.add_row(vec![
            Cell::new(path.display()),
            Cell::new(summary.records),
            Cell::new(summary.usable),
            Cell::new(summary.limited),
            Cell::new(summary.warnings.len()),
        ]);
    }

    println!("\n{table}");
    if total_warnings == 0 {
        println!("All data files valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}

fn infer_category(path: &Path) -> Result<Category> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    stem.parse::<Category>().map_err(|_| {
        anyhow::anyhow!(
            "cannot infer category from {}; pass --category",
            path.display()
        )
    })
}

fn validate_file(category: Category, path: &Path) -> Result<FileSummary> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let records =
        parse_records(&content).with_context(|| format!("failed to load {}", path.display()))?;

    let summary = match category {
        Category::Spelling => {
            let out = ingest_spelling(&records);
            FileSummary {
                category,
                records: records.len(),
                usable: out.items.len(),
                limited: out.items.iter().filter(|i| !i.is_gradable()).count(),
                warnings: out.warnings,
            }
        }
        Category::LiteraryDevice => {
            let out = ingest_devices(&records);
            FileSummary {
                category,
                records: records.len(),
                usable: out.items.len(),
                limited: 0,
                warnings: out.warnings,
            }
        }
        Category::Conjugation => {
            let out = ingest_conjugations(&records);
            let limited = out
                .items
                .iter()
                .filter(|i| {
                    resolve(i.mood.as_deref(), i.tense.as_deref(), ResolverPolicy::Lenient)
                        .is_err()
                })
                .count();
            FileSummary {
                category,
                records: records.len(),
                usable: out.items.len(),
                limited,
                warnings: out.warnings,
            }
        }
    };

    Ok(summary)
}
