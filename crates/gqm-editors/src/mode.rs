//! Editor modes and the predefined-option picker

use serde::{Deserialize, Serialize};

/// Where an editor session stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    /// Choosing between catalog and custom
    #[default]
    Pick,
    /// A catalog entry is selected
    Predefined,
    /// Free-text form
    Custom,
}

/// Catalog options offered by an editor, with the current selection
#[derive(Debug, Clone)]
pub struct Picker<T> {
    options: Vec<T>,
    selected: Option<usize>,
}

impl<T> Default for Picker<T> {
    fn default() -> Self {
        Self {
            options: Vec::new(),
            selected: None,
        }
    }
}

impl<T: Clone> Picker<T> {
    #[inline]
    #[must_use]
    pub fn new(options: Vec<T>) -> Self {
        Self {
            options,
            selected: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn options(&self) -> &[T] {
        &self.options
    }

    /// Select the first option whose natural key equals `key`
    pub fn select(&mut self, key: &str, key_of: impl Fn(&T) -> &str) -> bool {
        match self.options.iter().position(|o| key_of(o) == key) {
            Some(idx) => {
                self.selected = Some(idx);
                true
            }
            None => false,
        }
    }

    /// Make sure an option is offered, then select it
    ///
    /// Used when editing a node whose catalog entry was filtered out because
    /// it is already in use by that very node.
    pub fn ensure_selected(&mut self, option: T, key_of: impl Fn(&T) -> &str) {
        let key = key_of(&option).to_string();
        if !self.select(&key, &key_of) {
            self.options.insert(0, option);
            self.selected = Some(0);
        }
    }

    #[inline]
    #[must_use]
    pub fn selected(&self) -> Option<&T> {
        self.selected.and_then(|idx| self.options.get(idx))
    }

    #[inline]
    pub fn clear(&mut self) {
        self.selected = None;
    }
}
