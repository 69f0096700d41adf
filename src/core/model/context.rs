//! Keys and identifier interning for the model builder.
//!
//! Identifiers are interned once before the build loop so the
//! O(sections·subjects·weeks·days·periods) pass hashes small integers
//! instead of strings. Assignments, occupancies, and elective masters are
//! flat records referencing each other by index, all owned by the built
//! model.

use crate::core::solve::VarId;
use std::collections::HashMap;

/// Interned identifier handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sym(pub u32);

/// String-to-symbol interner; symbols are dense and ordered by first use
#[derive(Debug, Default, Clone)]
pub struct Interner {
    names: Vec<String>,
    index: HashMap<String, Sym>,
}

impl Interner {
    /// Create an empty interner
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a name, returning its stable symbol
    pub fn intern(&mut self, name: &str) -> Sym {
        if let Some(&sym) = self.index.get(name) {
            return sym;
        }
        let sym = Sym(u32::try_from(self.names.len()).unwrap_or(u32::MAX));
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), sym);
        sym
    }

    /// Look up an already-interned name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Sym> {
        self.index.get(name).copied()
    }

    /// Resolve a symbol back to its name
    #[must_use]
    pub fn resolve(&self, sym: Sym) -> &str {
        self.names
            .get(sym.0 as usize)
            .map_or("", String::as_str)
    }

    /// Number of interned names
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether nothing has been interned yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// One `(week, day, period)` timeslot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotKey {
    /// Week index
    pub week: u32,
    /// Day index within the week
    pub day: u32,
    /// Period index within the day
    pub period: u32,
}

/// Key of one assignment decision: this `(section, subject)` block starts
/// at this slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssignKey {
    /// Section teaching the block
    pub section: Sym,
    /// Subject taught
    pub subject: Sym,
    /// Start slot of the block
    pub slot: SlotKey,
}

/// One assignment decision variable with its metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    /// Decision key
    pub key: AssignKey,
    /// Faculty delivering the block
    pub faculty: Sym,
    /// Consecutive periods covered (1 for theory, 2 for labs)
    pub length: u32,
    /// Decision variable in the model
    pub var: VarId,
}

impl Assignment {
    /// Periods this block covers when chosen, as slot keys
    #[must_use]
    pub fn cover(&self) -> Vec<SlotKey> {
        (0..self.length)
            .map(|offset| SlotKey {
                week: self.key.slot.week,
                day: self.key.slot.day,
                period: self.key.slot.period + offset,
            })
            .collect()
    }
}

/// One elective master boolean: shared decision of all virtual copies of
/// an elective option at one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElectiveMaster {
    /// Semester of the elective group
    pub semester: Sym,
    /// Elective group label
    pub group: Sym,
    /// Subject option within the group
    pub subject: Sym,
    /// Timeslot
    pub slot: SlotKey,
    /// Master variable in the model
    pub var: VarId,
}
