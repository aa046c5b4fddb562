//! Preference domain module

mod preference_set;

pub use preference_set::{default_preferences, PreferenceSet, DESTINATION_KEY};
