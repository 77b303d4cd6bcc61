//! Persistent environments.
//!
//! Environments map names to entries, and are extended by creating new
//! environments that share structure with the old ones. Taking a snapshot of
//! an environment is a cheap clone, and extending the snapshot never changes
//! what the original observes. This is what lets the type checker try a
//! check speculatively and then carry on with the environment it had before.
//!
//! Names are looked up from the most recently bound entry, so later entries
//! shadow earlier ones.

use std::fmt;

use crate::symbol::Symbol;

/// A persistent environment with structural sharing.
#[derive(Clone)]
pub struct SharedEnv<Entry> {
    // An `rpds::Vector` is used instead of an `im::Vector` as it's a bit
    // more compact, and environments are captured by every closure.
    entries: rpds::VectorSync<(Symbol, Entry)>,
}

impl<Entry> SharedEnv<Entry> {
    /// Construct a new, empty environment.
    pub fn new() -> SharedEnv<Entry> {
        SharedEnv {
            entries: rpds::Vector::new_sync(),
        }
    }

    /// The number of entries in the environment.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Push an entry onto the environment.
    pub fn push(&mut self, name: Symbol, entry: Entry) {
        self.entries.push_back_mut((name, entry));
    }

    /// Pop an entry off the environment.
    pub fn pop(&mut self) {
        self.entries.drop_last_mut();
    }

    /// Lookup the most recently bound entry with the given name.
    pub fn get(&self, name: Symbol) -> Option<&Entry> {
        (self.entries.iter().rev())
            .find(|(entry_name, _)| *entry_name == name)
            .map(|(_, entry)| entry)
    }

    pub fn contains(&self, name: Symbol) -> bool {
        self.get(name).is_some()
    }

    /// Iterate over the entries in the environment, from the least recently
    /// bound.
    pub fn iter<'this>(
        &'this self,
    ) -> impl 'this + DoubleEndedIterator<Item = (Symbol, &'this Entry)> {
        self.entries.iter().map(|(name, entry)| (*name, entry))
    }

    /// Iterate over the names bound in the environment.
    pub fn names<'this>(&'this self) -> impl 'this + DoubleEndedIterator<Item = Symbol> {
        self.entries.iter().map(|(name, _)| *name)
    }
}

impl<Entry: Clone> SharedEnv<Entry> {
    /// Return a new environment with an extra entry, leaving this one as it
    /// was.
    pub fn extend(&self, name: Symbol, entry: Entry) -> SharedEnv<Entry> {
        let mut env = self.clone();
        env.push(name, entry);
        env
    }

    /// Return a copy of the environment with every entry named `name` removed.
    pub fn remove(&self, name: Symbol) -> SharedEnv<Entry> {
        let mut env = SharedEnv::new();
        for (entry_name, entry) in self.iter().filter(|(entry_name, _)| *entry_name != name) {
            env.push(entry_name, entry.clone());
        }
        env
    }
}

impl<Entry> Default for SharedEnv<Entry> {
    fn default() -> SharedEnv<Entry> {
        SharedEnv::new()
    }
}

impl<Entry> FromIterator<(Symbol, Entry)> for SharedEnv<Entry> {
    fn from_iter<T: IntoIterator<Item = (Symbol, Entry)>>(iter: T) -> SharedEnv<Entry> {
        let mut env = SharedEnv::new();
        for (name, entry) in iter {
            env.push(name, entry);
        }
        env
    }
}

impl<Entry: fmt::Debug> fmt::Debug for SharedEnv<Entry> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedEnv")
            .field("entries", &DebugEntries(&self.entries))
            .finish()
    }
}

struct DebugEntries<'a, Entry>(&'a rpds::VectorSync<(Symbol, Entry)>);

impl<'a, Entry: fmt::Debug> fmt::Debug for DebugEntries<'a, Entry> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.0.iter().map(|(name, entry)| (name, entry)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_entries_shadow_earlier_ones() {
        let x = Symbol::intern("x");
        let env = SharedEnv::new().extend(x, 1).extend(x, 2);
        assert_eq!(env.get(x), Some(&2));
        assert_eq!(env.len(), 2);
    }

    #[test]
    fn extending_leaves_the_original_untouched() {
        let x = Symbol::intern("x");
        let y = Symbol::intern("y");
        let original = SharedEnv::new().extend(x, "x");
        let extended = original.extend(y, "y");

        assert_eq!(original.get(y), None);
        assert_eq!(original.len(), 1);
        assert_eq!(extended.get(y), Some(&"y"));
        assert_eq!(extended.get(x), Some(&"x"));
    }

    #[test]
    fn remove_preserves_order() {
        let [a, b, c] = ["a", "b", "c"].map(Symbol::intern);
        let env: SharedEnv<u32> = [(a, 0), (b, 1), (c, 2)].into_iter().collect();
        let removed = env.remove(b);

        assert_eq!(removed.names().collect::<Vec<_>>(), vec![a, c]);
        assert_eq!(env.names().collect::<Vec<_>>(), vec![a, b, c]);
    }
}
