//! Postings and their category tags.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Category tag of a posting, used by the quota rules.
///
/// Tags are parsed case-insensitively. Besides the English names, the color
/// words of the original rule set are accepted: black (`noir`) marks a
/// restricted posting, red (`rouge`) a discouraged one and green (`vert`) a
/// preferred one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Category {
    /// No quota applies.
    #[default]
    Unrestricted,

    /// Counted together with restricted postings.
    Discouraged,

    /// Capped individually and together with discouraged postings.
    Restricted,

    /// Subject to a minimum count.
    Preferred,
}

impl Category {
    /// All categories in declaration order.
    pub const ALL: [Category; 4] = [
        Category::Unrestricted,
        Category::Discouraged,
        Category::Restricted,
        Category::Preferred,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Category::Unrestricted => "unrestricted",
            Category::Discouraged => "discouraged",
            Category::Restricted => "restricted",
            Category::Preferred => "preferred",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a tag is outside the closed category set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTag(pub String);

impl fmt::Display for UnknownTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized category tag '{}'", self.0)
    }
}

impl std::error::Error for UnknownTag {}

impl FromStr for Category {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "unrestricted" | "none" => Ok(Category::Unrestricted),
            "discouraged" | "red" | "rouge" => Ok(Category::Discouraged),
            "restricted" | "black" | "noir" => Ok(Category::Restricted),
            "preferred" | "green" | "vert" => Ok(Category::Preferred),
            _ => Err(UnknownTag(s.to_string())),
        }
    }
}

/// A raw row of the posting table, as handed over by the ingestion layer.
///
/// Capacity is signed because the input may carry zero or negative values;
/// such rows are skipped when the catalog is built.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PostingRecord {
    pub name: String,
    pub capacity: i64,
    pub category: String,
}

impl PostingRecord {
    pub fn new(name: impl Into<String>, capacity: i64, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capacity,
            category: category.into(),
        }
    }
}

/// A capacity-bearing placement site.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Posting {
    pub name: String,
    /// Always at least 1.
    pub capacity: u32,
    pub category: Category,
}

impl Posting {
    /// Converts a raw record, returning `Ok(None)` for non-positive capacity.
    pub(crate) fn from_record(record: &PostingRecord) -> Result<Option<Self>, ConfigError> {
        let category =
            record
                .category
                .parse::<Category>()
                .map_err(|UnknownTag(tag)| ConfigError::UnknownCategory {
                    posting: record.name.clone(),
                    tag,
                })?;

        if record.capacity <= 0 {
            return Ok(None);
        }

        let capacity = u32::try_from(record.capacity).map_err(|_| {
            ConfigError::InvalidParameter(format!(
                "capacity of {} exceeds {}",
                record.name,
                u32::MAX
            ))
        })?;

        Ok(Some(Self {
            name: record.name.trim().to_string(),
            capacity,
            category,
        }))
    }
}
