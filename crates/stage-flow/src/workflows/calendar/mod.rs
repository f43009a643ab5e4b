//! Academic term arithmetic and the per-actor term selection.

mod preference;
mod term;

pub use preference::{
    persist, restore, ActorKey, MemoryPreferenceStore, PreferenceError, PreferenceStore,
    TermSelection, ANONYMOUS_KEY, LEGACY_KEY,
};
pub use term::{
    current_term, filter_by_term, matches, next_term, previous_term, window, Season, Term,
    TermParseError, TermValue, WINDOW_SIZE,
};
