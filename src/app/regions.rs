//! Region presets and region name resolution
//!
//! A region preset is a named bounding box used for coarse geographic
//! filtering. Users may type the canonical Danish key (`sjælland`), an
//! ASCII spelling (`sjaelland`), or an English alias (`zealand`); all of
//! them resolve to the same canonical key.

use serde::{Deserialize, Serialize};

/// A named bounding box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionPreset {
    /// Canonical key, e.g. `sjælland`
    pub name: String,
    /// Inclusive latitude range (min, max)
    pub latitude_range: (f64, f64),
    /// Inclusive longitude range (min, max)
    pub longitude_range: (f64, f64),
}

impl RegionPreset {
    /// Create a preset from its bounds
    pub fn new(name: &str, lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Self {
        Self {
            name: name.to_string(),
            latitude_range: (lat_min, lat_max),
            longitude_range: (lon_min, lon_max),
        }
    }

    /// Whether a coordinate lies inside the box, edges included
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        let (lat_min, lat_max) = self.latitude_range;
        let (lon_min, lon_max) = self.longitude_range;
        (lat_min..=lat_max).contains(&latitude) && (lon_min..=lon_max).contains(&longitude)
    }
}

/// Immutable set of region presets plus their aliases
///
/// Presets and aliases keep their declaration order, which decides the
/// winner when loose matching finds more than one candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionCatalog {
    presets: Vec<RegionPreset>,
    /// Normalized ASCII alias -> canonical key
    aliases: Vec<(String, String)>,
}

impl RegionCatalog {
    /// Build a catalog from presets and `(alias, canonical key)` pairs
    ///
    /// Aliases are stored normalized, so they can be written in any case.
    pub fn new(
        presets: impl IntoIterator<Item = RegionPreset>,
        aliases: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        Self {
            presets: presets.into_iter().collect(),
            aliases: aliases
                .into_iter()
                .map(|(alias, key)| (normalize_ascii(&alias), key))
                .collect(),
        }
    }

    /// The Danish shelter regions
    pub fn denmark() -> Self {
        let presets = [
            RegionPreset::new("sjælland", 54.60, 55.95, 11.00, 12.80),
            RegionPreset::new("fyn", 55.00, 55.60, 9.60, 10.80),
            RegionPreset::new("jylland", 54.55, 57.80, 8.00, 10.60),
            RegionPreset::new("bornholm", 55.00, 55.40, 14.60, 15.30),
            RegionPreset::new("lolland-falster", 54.50, 54.95, 11.05, 12.30),
            RegionPreset::new("møn", 54.85, 55.08, 12.15, 12.60),
            RegionPreset::new("amager", 55.55, 55.75, 12.45, 12.75),
        ];
        let aliases = [
            ("sjaelland", "sjælland"),
            ("zealand", "sjælland"),
            ("sjalland", "sjælland"),
            ("fyn", "fyn"),
            ("funen", "fyn"),
            ("jylland", "jylland"),
            ("jutland", "jylland"),
            ("jyland", "jylland"),
            ("bornholm", "bornholm"),
            ("lolland", "lolland-falster"),
            ("falster", "lolland-falster"),
            ("lolland-falster", "lolland-falster"),
            ("moen", "møn"),
            ("mon", "møn"),
            ("møn", "møn"),
            ("amager", "amager"),
        ]
        .map(|(alias, key)| (alias.to_string(), key.to_string()));

        Self::new(presets, aliases)
    }

    /// Preset by canonical key
    pub fn get(&self, key: &str) -> Option<&RegionPreset> {
        self.presets.iter().find(|preset| preset.name == key)
    }

    /// Canonical keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        let mut keys: Vec<&str> = self.presets.iter().map(|p| p.name.as_str()).collect();
        keys.sort_unstable();
        keys.into_iter()
    }

    /// Map user input to a canonical preset key
    ///
    /// Tried in order: exact key, normalized alias, loose substring against
    /// the keys, loose substring against the aliases. Loose matches take the
    /// first candidate in declaration order.
    pub fn resolve(&self, input: &str) -> Option<&str> {
        let raw = input.trim().to_lowercase();
        if raw.is_empty() {
            return None;
        }
        if let Some(preset) = self.get(&raw) {
            return Some(preset.name.as_str());
        }

        let normalized = normalize_ascii(&raw);
        if let Some((_, key)) = self.aliases.iter().find(|(alias, _)| *alias == normalized) {
            return self.canonical(key);
        }

        if let Some(preset) = self.presets.iter().find(|preset| {
            preset.name.contains(raw.as_str()) || raw.contains(preset.name.as_str())
        }) {
            return Some(preset.name.as_str());
        }

        if normalized.is_empty() {
            return None;
        }
        self.aliases
            .iter()
            .find(|(alias, _)| alias.contains(normalized.as_str()) || normalized.contains(alias.as_str()))
            .and_then(|(_, key)| self.canonical(key))
    }

    /// Resolve several names, dropping unknown ones, deduplicated and sorted
    ///
    /// Returns the resolved keys and the inputs that did not resolve.
    pub fn resolve_all<'a, I, S>(&'a self, inputs: I) -> (Vec<&'a str>, Vec<String>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut resolved = Vec::new();
        let mut unknown = Vec::new();
        for input in inputs {
            match self.resolve(input.as_ref()) {
                Some(key) => resolved.push(key),
                None => unknown.push(input.as_ref().to_string()),
            }
        }
        resolved.sort_unstable();
        resolved.dedup();
        (resolved, unknown)
    }

    fn canonical(&self, key: &str) -> Option<&str> {
        self.get(key).map(|preset| preset.name.as_str())
    }
}

impl Default for RegionCatalog {
    fn default() -> Self {
        Self::denmark()
    }
}

/// Lowercase, transliterate Danish letters, strip spaces, `_` and `-`
pub fn normalize_ascii(input: &str) -> String {
    input
        .trim()
        .to_lowercase()
        .replace('æ', "ae")
        .replace('ø', "oe")
        .replace('å', "aa")
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .collect()
}
