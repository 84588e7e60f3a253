use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smallvec::SmallVec;

/// Number of simulated years in a complete profile.
pub const LIFETIME_YEARS: usize = 100;
pub const MIN_AGE: i32 = 1;
pub const MAX_AGE: i32 = 100;

/// Period label for years before the first named epoch starts.
pub const PRE_EPOCH_PERIOD: &str = "童限";

/// Fixed number of birth pillars (year, month, day, hour).
pub const PILLAR_COUNT: usize = 4;

pub type Pillars = SmallVec<[String; PILLAR_COUNT]>;

/// Candle direction for one simulated year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trend {
    Bullish,
    Bearish,
}

impl Trend {
    /// Parses the loose trend tags upstream generators emit.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "bullish" | "up" | "rise" | "吉" => Some(Self::Bullish),
            "bearish" | "down" | "fall" | "凶" => Some(Self::Bearish),
            _ => None,
        }
    }

    #[must_use]
    pub fn from_prices(open: f64, close: f64) -> Self {
        if close >= open {
            Self::Bullish
        } else {
            Self::Bearish
        }
    }
}

/// Passthrough attributes attached to a year; never validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PointExtras {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lucky_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lucky_direction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ten_god: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub interactions: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shen_sha: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy: Option<String>,
}

/// One simulated year on the 0..=100 fortune scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePoint {
    pub age: i32,
    pub year: i32,
    pub stem_branch: String,
    pub period: String,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub score: f64,
    pub narrative: String,
    #[serde(default)]
    pub extras: PointExtras,
}

impl TimelinePoint {
    /// Explicit trend tag if present, otherwise `close >= open`.
    #[must_use]
    pub fn trend(&self) -> Trend {
        self.extras
            .trend
            .unwrap_or_else(|| Trend::from_prices(self.open, self.close))
    }

    /// Flat years (`open == close`) carry no movement and are skipped by statistics.
    #[must_use]
    pub fn is_flat(&self) -> bool {
        self.open == self.close
    }
}

/// The six scorecard dimensions, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    Overall,
    Career,
    Wealth,
    Relationship,
    Health,
    Kinship,
}

impl Dimension {
    pub const ALL: [Self; 6] = [
        Self::Overall,
        Self::Career,
        Self::Wealth,
        Self::Relationship,
        Self::Health,
        Self::Kinship,
    ];

    /// Field name used in validation paths.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Overall => "overall",
            Self::Career => "career",
            Self::Wealth => "wealth",
            Self::Relationship => "relationship",
            Self::Health => "health",
            Self::Kinship => "kinship",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub label: String,
    pub score: f64,
}

impl DimensionScore {
    #[must_use]
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scorecard {
    pub overall: DimensionScore,
    pub career: DimensionScore,
    pub wealth: DimensionScore,
    pub relationship: DimensionScore,
    pub health: DimensionScore,
    pub kinship: DimensionScore,
    pub pillars: Pillars,
}

impl Scorecard {
    #[must_use]
    pub fn dimension(&self, dimension: Dimension) -> &DimensionScore {
        match dimension {
            Dimension::Overall => &self.overall,
            Dimension::Career => &self.career,
            Dimension::Wealth => &self.wealth,
            Dimension::Relationship => &self.relationship,
            Dimension::Health => &self.health,
            Dimension::Kinship => &self.kinship,
        }
    }

    pub fn dimensions(&self) -> impl Iterator<Item = (Dimension, &DimensionScore)> {
        Dimension::ALL
            .into_iter()
            .map(move |dimension| (dimension, self.dimension(dimension)))
    }
}

/// Normalized result every downstream view consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalResult {
    pub timeline: Vec<TimelinePoint>,
    pub scorecard: Scorecard,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<Map<String, Value>>,
}

impl CanonicalResult {
    /// Display name carried by the upstream payload, if any.
    #[must_use]
    pub fn subject_name(&self) -> Option<&str> {
        self.extras
            .as_ref()?
            .get("userName")?
            .as_str()
            .filter(|name| !name.trim().is_empty())
    }
}
