//! Item repository: the loaded items per category and random selection.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::{Category, ConjugationItem, DeviceItem, SpellingItem};

/// Uniformly pick one item. Immediate repeats are possible.
pub fn pick_random<'a, T, R: Rng + ?Sized>(items: &'a [T], rng: &mut R) -> Option<&'a T> {
    items.choose(rng)
}

/// Draw up to `max_attempts` items looking for one that satisfies
/// `predicate`, then fall back to an unconstrained draw.
pub fn pick_with_constraint<'a, T, R, P>(
    items: &'a [T],
    predicate: P,
    max_attempts: usize,
    rng: &mut R,
) -> Option<&'a T>
where
    R: Rng + ?Sized,
    P: Fn(&T) -> bool,
{
    for _ in 0..max_attempts {
        let item = pick_random(items, rng)?;
        if predicate(item) {
            return Some(item);
        }
    }
    tracing::debug!(max_attempts, "no item met the constraint, drawing unconstrained");
    pick_random(items, rng)
}

/// All loaded items, by category. Immutable once loaded.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub spelling: Vec<SpellingItem>,
    pub devices: Vec<DeviceItem>,
    pub conjugations: Vec<ConjugationItem>,
}

impl Catalog {
    pub fn len(&self, category: Category) -> usize {
        match category {
            Category::Spelling => self.spelling.len(),
            Category::LiteraryDevice => self.devices.len(),
            Category::Conjugation => self.conjugations.len(),
        }
    }

    pub fn is_empty(&self, category: Category) -> bool {
        self.len(category) == 0
    }
}
