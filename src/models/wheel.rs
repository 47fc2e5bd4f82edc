// src/models/wheel.rs
// DOCUMENTATION: Spin wheel data structures
// PURPOSE: Cuisine records, wheel segments, filters and spin outcomes

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Sentinel filter value meaning "every cuisine"
pub const ALL_CATEGORY: &str = "all";

/// Labels the product uses for the "all" pseudo-category
const ALL_ALIASES: [&str; 3] = ["all", "الكل", "كل"];

/// Returns true when a cuisine name or filter denotes the "all" pseudo-category
pub fn is_all_category(name: &str) -> bool {
    let trimmed = name.trim();
    trimmed.is_empty() || ALL_ALIASES.iter().any(|a| trimmed.eq_ignore_ascii_case(a))
}

/// A cuisine record as stored by the data service
/// DOCUMENTATION: `display_name` is the localized label shown on the wheel;
/// when absent the raw `name` is used
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cuisine {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl Cuisine {
    pub fn new(name: &str, icon: &str) -> Self {
        Self {
            name: name.to_string(),
            display_name: None,
            icon: Some(icon.to_string()),
            color: None,
        }
    }

    /// Label before synonym merging
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| self.name.trim())
    }
}

/// One wedge of the spin wheel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategorySegment {
    pub display_name: String,
    pub icon: String,
    pub color: String,
}

/// Active category filter of the wheel
/// DOCUMENTATION: Travels over the wire as a plain string; "all" (or blank)
/// means every cuisine, anything else forces that category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WheelFilter {
    #[default]
    All,
    Category(String),
}

impl WheelFilter {
    pub fn is_all(&self) -> bool {
        matches!(self, WheelFilter::All)
    }
}

impl From<String> for WheelFilter {
    fn from(value: String) -> Self {
        if is_all_category(&value) {
            WheelFilter::All
        } else {
            WheelFilter::Category(value.trim().to_string())
        }
    }
}

impl From<&str> for WheelFilter {
    fn from(value: &str) -> Self {
        WheelFilter::from(value.to_string())
    }
}

impl From<WheelFilter> for String {
    fn from(filter: WheelFilter) -> Self {
        match filter {
            WheelFilter::All => ALL_CATEGORY.to_string(),
            WheelFilter::Category(name) => name,
        }
    }
}

/// Result of one spin
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpinOutcome {
    /// Winning segment label, the forced category, or "all" for an empty forced wheel
    pub selected_category: String,
    /// Absolute wheel rotation after this spin
    pub final_rotation_degrees: f64,
    /// Index of the winning wedge (None when the category was forced)
    pub segment_index: Option<usize>,
}

/// Observable state of one caller's wheel
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct WheelState {
    pub is_spinning: bool,
    pub rotation_degrees: f64,
}

/// Request body for POST /wheel/segments and POST /wheel/spin
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct WheelRequest {
    #[validate(length(max = 200))]
    #[serde(default)]
    pub cuisines: Vec<Cuisine>,
    #[serde(default)]
    pub active_filter: WheelFilter,
    /// Caller key for the wheel; falls back to the X-Client-Id header
    #[validate(length(min = 1, max = 128))]
    #[serde(default)]
    pub client_id: Option<String>,
    /// Rotation the caller's wheel currently shows
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub current_rotation_degrees: Option<f64>,
}

/// Query string for GET /wheel/state
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WheelStateQuery {
    pub client_id: Option<String>,
}

/// Restaurant offered to the anti-repeat picker
/// DOCUMENTATION: Only `id` is interpreted; every other field is echoed back
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PickCandidate {
    pub id: String,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// Request body for POST /wheel/pick
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PickRequest {
    #[validate(length(max = 1000))]
    #[serde(default)]
    pub candidates: Vec<PickCandidate>,
}
