//! The `lengua classify` command.

use anyhow::Result;

use lengua_core::tense::{resolve, ResolverPolicy};

pub fn execute(mood: &str, tense: &str, strict: bool) -> Result<()> {
    let policy = if strict {
        ResolverPolicy::Strict
    } else {
        ResolverPolicy::Lenient
    };

    let classification = resolve(Some(mood), Some(tense), policy)?;

    println!("Modo:          {}", classification.mood);
    println!("Tiempo:        {}", classification.group);
    println!("Tiempo exacto: {}", classification.exact);

    Ok(())
}
