//! Transient view state
//!
//! Which view is showing and which pet the history is filtered to. Nothing
//! here is persisted.

use crate::storage::{Change, PetId};
use std::fmt;
use std::str::FromStr;

/// Pet selection for the history view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PetFilter {
    #[default]
    All,
    Pet(PetId),
}

impl PetFilter {
    pub fn matches(&self, pet_id: &PetId) -> bool {
        match self {
            PetFilter::All => true,
            PetFilter::Pet(id) => id == pet_id,
        }
    }
}

/// Top-level views
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Dashboard,
    History,
    Charts,
    Settings,
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Dashboard => write!(f, "dashboard"),
            ViewMode::History => write!(f, "history"),
            ViewMode::Charts => write!(f, "charts"),
            ViewMode::Settings => write!(f, "settings"),
        }
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dashboard" => Ok(ViewMode::Dashboard),
            "history" => Ok(ViewMode::History),
            "charts" | "chart" => Ok(ViewMode::Charts),
            "settings" => Ok(ViewMode::Settings),
            other => Err(format!("Unknown view: {}", other)),
        }
    }
}

/// Current view plus its selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub mode: ViewMode,
    pub filter: PetFilter,
}

impl ViewState {
    pub fn new(mode: ViewMode) -> Self {
        Self {
            mode,
            filter: PetFilter::All,
        }
    }

    /// Builder: filter to one pet
    pub fn with_filter(mut self, filter: PetFilter) -> Self {
        self.filter = filter;
        self
    }

    /// React to a store change. Deleting the filtered pet resets the filter.
    pub fn apply(&mut self, change: &Change) {
        if let (Change::PetDeleted { id, .. }, PetFilter::Pet(selected)) = (change, &self.filter) {
            if selected == id {
                tracing::debug!(pet_id = %id, "Filtered pet deleted, showing all pets");
                self.filter = PetFilter::All;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, Store};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_filter_matches() {
        let p1 = PetId::from("p1");
        assert!(PetFilter::All.matches(&p1));
        assert!(PetFilter::Pet(p1.clone()).matches(&p1));
        assert!(!PetFilter::Pet(PetId::from("p2")).matches(&p1));
    }

    #[test]
    fn test_view_mode_parse() {
        assert_eq!("History".parse::<ViewMode>(), Ok(ViewMode::History));
        assert_eq!("chart".parse::<ViewMode>(), Ok(ViewMode::Charts));
        assert!("graph".parse::<ViewMode>().is_err());
        assert_eq!(ViewMode::Settings.to_string(), "settings");
    }

    #[test]
    fn test_deleting_filtered_pet_resets_filter() {
        let mut store = Store::load(MemoryStore::new());
        let view = Rc::new(RefCell::new(
            ViewState::new(ViewMode::History).with_filter(PetFilter::Pet(PetId::from("p1"))),
        ));
        let handle = Rc::clone(&view);
        store.subscribe(move |change| handle.borrow_mut().apply(change));

        store.delete_pet(&PetId::from("p2")).unwrap();
        assert_eq!(view.borrow().filter, PetFilter::Pet(PetId::from("p1")));

        store.delete_pet(&PetId::from("p1")).unwrap();
        assert_eq!(view.borrow().filter, PetFilter::All);
        assert_eq!(view.borrow().mode, ViewMode::History);
    }
}
