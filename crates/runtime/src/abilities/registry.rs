use std::collections::BTreeMap;
use std::sync::Arc;

use super::Ability;

/// Static table mapping ability id to implementation, built once at startup.
#[derive(Clone, Default)]
pub struct AbilityRegistry {
    abilities: BTreeMap<&'static str, Arc<dyn Ability>>,
}

impl AbilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every ability in [`super::builtin`].
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for ability in super::builtin::all() {
            registry.register(ability);
        }
        registry
    }

    /// Adds an ability, replacing any previous one with the same id.
    pub fn register(&mut self, ability: Arc<dyn Ability>) -> Option<Arc<dyn Ability>> {
        self.abilities.insert(ability.id(), ability)
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Ability>> {
        self.abilities.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.abilities.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.abilities.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }
}

impl std::fmt::Debug for AbilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.abilities.keys()).finish()
    }
}
