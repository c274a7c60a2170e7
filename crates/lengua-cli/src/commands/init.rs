//! The `lengua init` command.

use std::path::Path;

use anyhow::{Context, Result};

use lengua_core::model::Category;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("lengua.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("data").context("failed to create data directory")?;
    for category in Category::ALL {
        let path = Path::new("data").join(format!("{}.json", category.file_stem()));
        let sample = match category {
            Category::Spelling => SAMPLE_BV,
            Category::LiteraryDevice => SAMPLE_RECURSOS,
            Category::Conjugation => SAMPLE_CONJUGACIONES,
        };
        write_if_missing(&path, sample)?;
    }

    println!("\nNext steps:");
    println!("  1. Add your own items to the files in data/");
    println!("  2. Run: lengua validate --data data");
    println!("  3. Run: lengua play --mode spelling");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# lengua configuration

timeout_secs = 10
max_draw_attempts = 20
strict_classification = false
data_dir = "data"
# score_file = "${HOME}/.config/lengua/score.json"

# Per-category sources; unset categories read <data_dir>/<name>.json.
# [sources.conjugaciones]
# type = "http"
# url = "https://${LENGUA_HOST}/data/conjugaciones.json"
"#;

const SAMPLE_BV: &str = r#"[
  { "pattern": "_uscar", "missing": "b", "word": "buscar" },
  { "pattern": "_aca", "missing": "v", "word": "vaca" },
  { "pattern": "hu_o", "missing": "b", "word": "hubo" },
  { "pattern": "ha_lar", "missing": "b", "word": "hablar" },
  { "pattern": "_ivir", "missing": "v", "word": "vivir" },
  { "pattern": "nue_o", "missing": "v", "word": "nuevo" }
]
"#;

const SAMPLE_RECURSOS: &str = r#"[
  {
    "text": "Sus ojos eran dos luceros",
    "options": ["Símil", "Metáfora", "Hipérbole", "Personificación"],
    "answer": "Metáfora"
  },
  {
    "text": "Blanca como la nieve",
    "options": ["Símil", "Metáfora", "Anáfora"],
    "answer": "Símil"
  },
  {
    "text": "El viento susurraba entre los árboles",
    "options": ["Personificación", "Aliteración", "Epíteto"],
    "answer": "Personificación"
  },
  {
    "text": "Te lo he dicho un millón de veces",
    "answer": "Hipérbole"
  }
]
"#;

const SAMPLE_CONJUGACIONES: &str = r#"[
  {
    "forma": "cantaba",
    "verbo": "cantar",
    "pronombre": "yo",
    "modo": "Indicativo",
    "grupo": "primera",
    "tipo": "Pretérito imperfecto",
    "persona": 1,
    "numero": "singular"
  },
  {
    "frase": "Ojalá haya cantado bien.",
    "forma": "haya cantado",
    "verbo": "cantar",
    "pronombre": "él",
    "modo": "Subjuntivo",
    "grupo": "primera",
    "tipo": "Pretérito perfecto compuesto",
    "persona": 3,
    "numero": "singular"
  },
  {
    "forma": "comeremos",
    "verbo": "comer",
    "pronombre": "nosotros",
    "modo": "Indicativo",
    "grupo": "segunda",
    "tipo": "Futuro simple",
    "persona": 1,
    "numero": "plural"
  },
  {
    "forma": "habrían vivido",
    "verbo": "vivir",
    "pronombre": "ellos",
    "modo": "Indicativo",
    "grupo": "tercera",
    "tipo": "Condicional compuesto",
    "persona": 3,
    "numero": "plural"
  },
  {
    "forma": "canta",
    "verbo": "cantar",
    "pronombre": "tú",
    "modo": "Imperativo",
    "grupo": "primera",
    "tipo": "Imperativo afirmativo",
    "persona": 2,
    "numero": "singular"
  }
]
"#;
