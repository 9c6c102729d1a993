//! Mood profiles: each mood maps to a set of catalog genre ids and the
//! keyword phrase that seeds the music search. Built-in profiles can be
//! extended or overridden from `[moods.<name>]` in the configuration.

use std::collections::HashMap;

use crate::config::MoodOverride;

/// A resolved mood profile.
#[derive(Debug, Clone, PartialEq)]
pub struct MoodProfile {
    /// Canonical (lowercase) mood name.
    pub name: String,
    /// Display label.
    pub label: String,
    /// Catalog genre ids used for discovery and genre-overlap scoring.
    pub genres: Vec<u32>,
    /// Keyword phrase seeding media search queries.
    pub keywords: String,
}

/// Lookup table of mood profiles, resolved case-insensitively.
#[derive(Debug, Clone)]
pub struct MoodTable {
    profiles: HashMap<String, MoodProfile>,
}

const BUILTIN: &[(&str, &str, &[u32], &str)] = &[
    ("happy", "Happy", &[35, 10751], "happy upbeat pop cheerful"),
    ("romantic", "Romantic", &[10749, 18], "romantic love ballad emotional"),
    ("sad", "Sad", &[18, 10749, 10751], "sad emotional melancholy uplifting"),
    ("comedy", "Comedy", &[35], "funny comedy upbeat"),
    ("action", "Action", &[28, 12], "action epic powerful intense"),
    ("thriller", "Thriller", &[53, 80, 9648], "thriller suspense dark tension"),
    ("horror", "Horror", &[27], "horror scary dark creepy"),
    ("sci-fi", "Sci-Fi", &[878, 12], "scifi electronic futuristic space"),
    ("adventure", "Adventure", &[12, 14], "adventure epic journey quest"),
    ("mystery", "Mystery", &[9648, 53, 80], "mystery suspense detective"),
    ("chill", "Chill", &[10749, 35, 10751, 18], "chill relaxing ambient calm"),
    ("inspiring", "Inspiring", &[18, 36, 10751], "inspiring motivational uplifting epic"),
];

impl MoodTable {
    /// Table with only the built-in profiles.
    pub fn builtin() -> Self {
        let profiles = BUILTIN
            .iter()
            .map(|(name, label, genres, keywords)| {
                (
                    name.to_string(),
                    MoodProfile {
                        name: name.to_string(),
                        label: label.to_string(),
                        genres: genres.to_vec(),
                        keywords: keywords.to_string(),
                    },
                )
            })
            .collect();
        Self { profiles }
    }

    /// Built-in table with config overrides applied. An override whose name
    /// matches a built-in mood replaces it; other names add new moods.
    pub fn with_overrides(overrides: &HashMap<String, MoodOverride>) -> Self {
        let mut table = Self::builtin();
        for (name, over) in overrides {
            let key = name.to_lowercase();
            let label = over
                .label
                .clone()
                .unwrap_or_else(|| capitalize(&key));
            table.profiles.insert(
                key.clone(),
                MoodProfile {
                    name: key,
                    label,
                    genres: over.genres.clone(),
                    keywords: over.keywords.clone(),
                },
            );
        }
        table
    }

    /// Case-insensitive lookup. None means the mood is unknown and the
    /// request must fail; moods are never silently substituted.
    pub fn resolve(&self, name: &str) -> Option<&MoodProfile> {
        self.profiles.get(&name.trim().to_lowercase())
    }

    /// Sorted list of known mood names.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
