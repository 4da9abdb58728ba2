use phrasedeck_core::{profiles, CoreError, ProfileId, ProfilesState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Reset,
    Import,
}

/// Line shown after a change that writes both per-profile records.
pub fn saved_notice(change: Change, learn_saved: bool, stats_saved: bool) -> &'static str {
    match (change, learn_saved && stats_saved) {
        (Change::Reset, true) => "Current profile progress reset.",
        (Change::Reset, false) => "Reset could not be saved.",
        (Change::Import, true) => "Import successful.",
        (Change::Import, false) => "Import could not be saved.",
    }
}

/// Profile id for a `profile switch` selector (id or name).
pub fn switch_target(state: &ProfilesState, selector: &str) -> Result<ProfileId, CoreError> {
    profiles::find(state, selector)
        .map(|p| p.id.clone())
        .ok_or(CoreError::NotFound("Profile not found."))
}
