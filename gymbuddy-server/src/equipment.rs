use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::slice::Iter;

/// Zero-width characters that show up in the imported dataset
static ZERO_WIDTH_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x{200B}\x{200C}\x{200D}\x{2060}\x{FEFF}]")
        .expect("Failed to compile zero-width regex")
});

static WHITESPACE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Failed to compile whitespace regex"));

/// Fixed equipment buckets used for filtering and dropdowns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EquipmentCategory {
    SelfAssisted,
    Assisted,
    Barbell,
    BodyWeight,
    Cable,
    Dumbbell,
    Kettlebell,
    Lever,
    Sled,
    Smith,
    Suspension,
    Band,
    Weighted,
    Plyometric,
    Isometric,
    Stretch,
}

impl EquipmentCategory {
    /// All categories in match order. Self-Assisted must precede Assisted.
    pub fn iter() -> Iter<'static, EquipmentCategory> {
        static CATEGORIES: [EquipmentCategory; 16] = [
            EquipmentCategory::SelfAssisted,
            EquipmentCategory::Assisted,
            EquipmentCategory::Barbell,
            EquipmentCategory::BodyWeight,
            EquipmentCategory::Cable,
            EquipmentCategory::Dumbbell,
            EquipmentCategory::Kettlebell,
            EquipmentCategory::Lever,
            EquipmentCategory::Sled,
            EquipmentCategory::Smith,
            EquipmentCategory::Suspension,
            EquipmentCategory::Band,
            EquipmentCategory::Weighted,
            EquipmentCategory::Plyometric,
            EquipmentCategory::Isometric,
            EquipmentCategory::Stretch,
        ];
        CATEGORIES.iter()
    }

    pub fn label(self) -> &'static str {
        match self {
            EquipmentCategory::SelfAssisted => "Self-Assisted",
            EquipmentCategory::Assisted => "Assisted",
            EquipmentCategory::Barbell => "Barbell",
            EquipmentCategory::BodyWeight => "Body Weight",
            EquipmentCategory::Cable => "Cable",
            EquipmentCategory::Dumbbell => "Dumbbell",
            EquipmentCategory::Kettlebell => "Kettlebell",
            EquipmentCategory::Lever => "Lever",
            EquipmentCategory::Sled => "Sled",
            EquipmentCategory::Smith => "Smith",
            EquipmentCategory::Suspension => "Suspension",
            EquipmentCategory::Band => "Band",
            EquipmentCategory::Weighted => "Weighted",
            EquipmentCategory::Plyometric => "Plyometric",
            EquipmentCategory::Isometric => "Isometric",
            EquipmentCategory::Stretch => "Stretch",
        }
    }

    /// Case-insensitive prefix match against an already cleaned string
    pub fn classify(cleaned: &str) -> Option<EquipmentCategory> {
        let lowered = cleaned.to_lowercase();
        Self::iter()
            .copied()
            .find(|category| lowered.starts_with(&category.label().to_lowercase()))
    }

    /// Exact (case-insensitive) lookup by label
    pub fn from_label(label: &str) -> Option<EquipmentCategory> {
        Self::iter()
            .copied()
            .find(|category| category.label().eq_ignore_ascii_case(label.trim()))
    }
}

/// Strip zero-width characters, collapse runs of whitespace and trim
pub fn clean(raw: &str) -> String {
    let stripped = ZERO_WIDTH_REGEX.replace_all(raw, "");
    WHITESPACE_REGEX
        .replace_all(&stripped, " ")
        .trim()
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEquipment {
    pub cleaned: String,
    pub category: Option<EquipmentCategory>,
}

impl NormalizedEquipment {
    /// Category name when matched, otherwise the cleaned text
    pub fn label(&self) -> &str {
        match self.category {
            Some(category) => category.label(),
            None => &self.cleaned,
        }
    }
}

pub fn normalize(raw: &str) -> NormalizedEquipment {
    let cleaned = clean(raw);
    let category = EquipmentCategory::classify(&cleaned);
    NormalizedEquipment { cleaned, category }
}

/// Sorted, de-duplicated dropdown labels for a set of raw equipment values
pub fn unique_labels<I, S>(raws: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raws.into_iter()
        .map(|raw| normalize(raw.as_ref()))
        .filter(|normalized| !normalized.cleaned.is_empty())
        .map(|normalized| normalized.label().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// SQL fragment plus its bound parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlFilter {
    pub clause: String,
    pub params: Vec<String>,
}

fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Equipment filter selected from the dropdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    Category(EquipmentCategory),
    Raw(String),
}

impl CategoryFilter {
    /// Returns None for blank input
    pub fn parse(value: &str) -> Option<Self> {
        let cleaned = clean(value);
        if cleaned.is_empty() {
            return None;
        }
        Some(match EquipmentCategory::from_label(&cleaned) {
            Some(category) => CategoryFilter::Category(category),
            None => CategoryFilter::Raw(cleaned),
        })
    }

    fn label(&self) -> &str {
        match self {
            CategoryFilter::Category(category) => category.label(),
            CategoryFilter::Raw(value) => value,
        }
    }

    /// Narrow rows in SQL. Results still go through [`CategoryFilter::matches`].
    ///
    /// A category contains its own label and excludes every other category
    /// whose label embeds it, so `Assisted` skips `Self-Assisted` rows.
    pub fn sql(&self, column: &str) -> SqlFilter {
        let mut clauses = vec![format!("{column} LIKE ? ESCAPE '\\'")];
        let mut params = vec![format!("%{}%", escape_like(self.label()))];

        if let CategoryFilter::Category(selected) = self {
            let needle = selected.label().to_lowercase();
            for other in EquipmentCategory::iter().copied() {
                if other != *selected && other.label().to_lowercase().contains(&needle) {
                    clauses.push(format!("{column} NOT LIKE ? ESCAPE '\\'"));
                    params.push(format!("%{}%", escape_like(other.label())));
                }
            }
        }

        SqlFilter {
            clause: clauses.join(" AND "),
            params,
        }
    }

    pub fn matches(&self, raw: &str) -> bool {
        let normalized = normalize(raw);
        match self {
            CategoryFilter::Category(category) => normalized.category == Some(*category),
            CategoryFilter::Raw(value) => {
                normalized.category.is_none() && normalized.cleaned.eq_ignore_ascii_case(value)
            }
        }
    }
}
