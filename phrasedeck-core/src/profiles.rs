use crate::storage::keys::{self, profile_record, ProfileRecord};
use crate::{CoreError, Profile, ProfilesState, Storage};
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

/// Result of a registry mutation. `state` is always safe to render, even when
/// `error` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub state: ProfilesState,
    pub error: Option<CoreError>,
}

impl Outcome {
    fn ok(state: ProfilesState) -> Self {
        Self { state, error: None }
    }

    fn failed(state: ProfilesState, error: CoreError) -> Self {
        Self {
            state,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<ProfilesState, CoreError> {
        match self.error {
            None => Ok(self.state),
            Some(e) => Err(e),
        }
    }
}

fn to_base36(mut n: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

pub fn slugify(name: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;
    for c in name.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "profile".to_string()
    } else {
        slug
    }
}

/// `<slug>-<base36 millis>-<base36 random>`.
pub fn generate_profile_id(name: &str) -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u128;
    let random = Uuid::new_v4().as_u128() % 1_000_000;
    format!("{}-{}-{}", slugify(name), to_base36(millis), to_base36(random))
}

fn clean_field(value: Option<&Value>) -> Option<String> {
    let s = value?.as_str()?.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Drops malformed entries, guarantees at least one profile and a resolvable
/// active id.
pub fn normalize(raw: Option<&Value>) -> ProfilesState {
    let Some(Value::Object(obj)) = raw else {
        return ProfilesState::default();
    };

    let mut profiles: Vec<Profile> = match obj.get("profiles") {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(|entry| {
                let entry = entry.as_object()?;
                Some(Profile {
                    id: clean_field(entry.get("id"))?,
                    name: clean_field(entry.get("name"))?,
                })
            })
            .collect(),
        _ => Vec::new(),
    };

    if profiles.is_empty() {
        profiles.push(Profile::guest());
    }

    let requested = obj.get("activeProfileId").and_then(Value::as_str);
    let active_profile_id = match requested {
        Some(id) if profiles.iter().any(|p| p.id == id) => id.to_string(),
        _ => profiles[0].id.clone(),
    };

    ProfilesState {
        active_profile_id,
        profiles,
    }
}

/// Resolves a profile by exact id, then by case-insensitive name.
pub fn find<'s>(state: &'s ProfilesState, selector: &str) -> Option<&'s Profile> {
    let sel = selector.trim();
    state
        .profiles
        .iter()
        .find(|p| p.id == sel)
        .or_else(|| state.profiles.iter().find(|p| p.name.eq_ignore_ascii_case(sel)))
}

pub struct ProfileRegistry<'a> {
    storage: &'a Storage,
}

impl<'a> ProfileRegistry<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn load(&self) -> ProfilesState {
        let raw = self.storage.read_document(keys::PROFILES);
        let state = normalize(raw.as_ref());
        self.save(&state);
        self.migrate_legacy(&state);
        state
    }

    fn save(&self, state: &ProfilesState) -> bool {
        self.storage.write(keys::PROFILES, state)
    }

    /// Copies pre-profile single-user records into the first profile, once.
    fn migrate_legacy(&self, state: &ProfilesState) {
        if self.storage.read_raw(keys::LEGACY_MIGRATED).as_deref() == Some("true") {
            return;
        }

        let owner = state
            .profiles
            .first()
            .map(|p| p.id.clone())
            .unwrap_or_else(|| Profile::guest().id);

        let copies = [
            (keys::LEGACY_LEARN_PROGRESS, ProfileRecord::LearnProgress),
            (keys::LEGACY_QUIZ_STATS, ProfileRecord::QuizStats),
        ];
        for (legacy_key, record) in copies {
            let target = profile_record(&owner, record);
            if self.storage.read_raw(&target).is_some() {
                continue;
            }
            if let Some(legacy) = self.storage.read_raw(legacy_key) {
                info!(profile_id = %owner, legacy_key, "migrating legacy record");
                self.storage.write_raw(&target, &legacy);
            }
        }

        self.storage.write_raw(keys::LEGACY_MIGRATED, "true");
    }

    pub fn switch_active(&self, profile_id: &str) -> ProfilesState {
        let state = self.load();
        if !state.contains(profile_id) {
            return state;
        }
        let next = ProfilesState {
            active_profile_id: profile_id.to_string(),
            ..state
        };
        self.save(&next);
        debug!(profile_id, "active profile switched");
        next
    }

    pub fn create(&self, name: &str) -> Outcome {
        let state = self.load();
        let clean = name.trim();
        if clean.is_empty() {
            return Outcome::failed(state, CoreError::Validation("Profile name is required."));
        }
        if state.profiles.iter().any(|p| p.name.to_lowercase() == clean.to_lowercase()) {
            return Outcome::failed(state, CoreError::Validation("Profile name already exists."));
        }

        let mut id = generate_profile_id(clean);
        while state.contains(&id) {
            id = generate_profile_id(clean);
        }

        let profile = Profile {
            id,
            name: clean.to_string(),
        };
        info!(profile_id = %profile.id, name = %profile.name, "profile created");

        let mut profiles = state.profiles;
        let active_profile_id = profile.id.clone();
        profiles.push(profile);
        let next = ProfilesState {
            active_profile_id,
            profiles,
        };
        self.save(&next);
        Outcome::ok(next)
    }

    /// Removes the profile and both of its records.
    pub fn delete(&self, profile_id: &str) -> Outcome {
        let state = self.load();
        if !state.contains(profile_id) {
            return Outcome::failed(state, CoreError::NotFound("Profile not found."));
        }

        self.storage
            .remove(&profile_record(profile_id, ProfileRecord::LearnProgress));
        self.storage
            .remove(&profile_record(profile_id, ProfileRecord::QuizStats));

        let mut profiles: Vec<Profile> = state
            .profiles
            .into_iter()
            .filter(|p| p.id != profile_id)
            .collect();
        if profiles.is_empty() {
            profiles.push(Profile::guest());
        }

        let active_profile_id = if profiles.iter().any(|p| p.id == state.active_profile_id) {
            state.active_profile_id
        } else {
            profiles[0].id.clone()
        };

        info!(profile_id, "profile deleted");
        let next = ProfilesState {
            active_profile_id,
            profiles,
        };
        self.save(&next);
        Outcome::ok(next)
    }
}
