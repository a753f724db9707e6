use lazy_static::lazy_static;
use std::fmt;
use std::sync::{PoisonError, RwLock};
pub use string_cache::DefaultAtom as Atom;

lazy_static! {
    static ref STIMULUS_IDS: RwLock<Vec<Atom>> = RwLock::new(Vec::new());
}

/// Process-wide handle for a stimulus identifier such as `"T2"` or `"dot3"`.
///
/// Tasks name their visual and aural items with short strings; interning
/// turns every later comparison (moving an item, clearing it, looking it up
/// on the stage) into an integer compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StimulusId(usize);

impl StimulusId {
    /// Intern `name` and return its handle. The same name always maps to the
    /// same handle for the life of the process.
    pub fn intern(name: &str) -> Self {
        Self(intern_id(name))
    }

    pub fn name(self) -> String {
        id_name(self.0)
    }
}

impl From<&str> for StimulusId {
    fn from(name: &str) -> Self {
        Self::intern(name)
    }
}

impl fmt::Display for StimulusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Intern a string and return its index
pub fn intern_id(s: &str) -> usize {
    let atom = Atom::from(s);
    if let Some(idx) = STIMULUS_IDS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .position(|a| *a == atom)
    {
        return idx;
    }

    let mut v = STIMULUS_IDS
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    // Another caller may have pushed the same atom between the two locks.
    match v.iter().position(|a| *a == atom) {
        Some(idx) => idx,
        None => {
            v.push(atom);
            v.len() - 1
        }
    }
}

/// Current count of unique identifiers
pub fn id_count() -> usize {
    STIMULUS_IDS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .len()
}

/// Name behind an interned index; empty for an index never handed out.
pub fn id_name(idx: usize) -> String {
    STIMULUS_IDS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(idx)
        .map(|a| a.to_string())
        .unwrap_or_default()
}
