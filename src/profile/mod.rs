//! Candidate and role profiles.
//!
//! A [`Profile`] is a named bag of short text attributes grouped by [`Category`].
//! Categories that are absent read as empty lists; unknown category keys coming
//! from upstream JSON are dropped rather than rejected.

#[cfg(test)]
mod tests;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Attribute group scored independently and then combined by weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Skills,
    Experience,
    Education,
    Certifications,
    Languages,
}

impl Category {
    /// Every known category, in scoring order.
    pub const ALL: [Category; 5] = [
        Category::Skills,
        Category::Experience,
        Category::Education,
        Category::Certifications,
        Category::Languages,
    ];

    /// Lower-case key used in JSON and configuration strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Skills => "skills",
            Category::Experience => "experience",
            Category::Education => "education",
            Category::Certifications => "certifications",
            Category::Languages => "languages",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "skills" | "skill" => Ok(Self::Skills),
            "experience" | "experiences" => Ok(Self::Experience),
            "education" => Ok(Self::Education),
            "certifications" | "certification" => Ok(Self::Certifications),
            "languages" | "language" => Ok(Self::Languages),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

/// A candidate or role described by category-keyed attribute lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawProfile")]
pub struct Profile {
    /// Display name (candidate name, role title). Not used for scoring.
    pub name: String,
    attributes: BTreeMap<Category, Vec<String>>,
}

impl Profile {
    /// Creates an empty profile.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style helper that appends `values` to `category`.
    pub fn with<I, S>(mut self, category: Category, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extend(category, values);
        self
    }

    /// Appends trimmed, non-empty `values` to `category`.
    pub fn extend<I, S>(&mut self, category: Category, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = self.attributes.entry(category).or_default();
        list.extend(values.into_iter().filter_map(|v| {
            let v = v.into();
            let trimmed = v.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }));
    }

    /// Attributes for `category` (empty when the category is absent).
    pub fn attributes(&self, category: Category) -> &[String] {
        self.attributes
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Categories that hold at least one attribute.
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.attributes
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(category, _)| *category)
    }

    /// Union of non-empty category keys across two profiles.
    pub fn category_union(a: &Profile, b: &Profile) -> BTreeSet<Category> {
        a.categories().chain(b.categories()).collect()
    }

    /// Total attribute count across every category.
    pub fn attribute_count(&self) -> usize {
        self.attributes.values().map(Vec::len).sum()
    }

    /// Returns `true` if no category holds any attribute.
    pub fn is_empty(&self) -> bool {
        self.attribute_count() == 0
    }
}

#[derive(Deserialize)]
struct RawProfile {
    #[serde(default)]
    name: String,
    #[serde(default)]
    attributes: BTreeMap<String, Vec<String>>,
}

impl From<RawProfile> for Profile {
    fn from(raw: RawProfile) -> Self {
        let mut profile = Profile::new(raw.name);
        for (key, values) in raw.attributes {
            match key.parse::<Category>() {
                Ok(category) => profile.extend(category, values),
                Err(_) => debug!(category = %key, "Ignoring unknown profile category"),
            }
        }
        profile
    }
}
