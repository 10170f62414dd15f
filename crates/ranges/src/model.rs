use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::{RangeError, Sec};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct RangeId(pub Uuid);

impl RangeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RangeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Half-open `[start, end)` span on the playback timeline. Two spans that
/// touch at a single boundary point do not overlap.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RangeSpan {
    pub start: Sec,
    pub end: Sec,
}

impl RangeSpan {
    pub fn new(start: Sec, end: Sec) -> Self {
        Self { start, end }
    }

    pub fn width(&self) -> Sec {
        self.end - self.start
    }

    pub fn contains(&self, t: Sec) -> bool {
        t >= self.start && t < self.end
    }

    pub fn overlaps(&self, other: &RangeSpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

fn default_color() -> String {
    "darkseagreen".to_string()
}

fn default_name() -> String {
    "Range".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Range {
    pub id: RangeId,
    pub span: RangeSpan,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub editable: bool,
    #[serde(default)]
    pub class_name: Option<String>,
}

impl Range {
    pub fn start(&self) -> Sec {
        self.span.start
    }

    pub fn end(&self) -> Sec {
        self.span.end
    }
}

/// One configuration entry. Validated independently of its siblings so a
/// malformed descriptor rejects only itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RangeDescriptor {
    pub start: Option<f64>,
    pub end: Option<f64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub editable: Option<bool>,
    #[serde(default)]
    pub class_name: Option<String>,
}

impl RangeDescriptor {
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Self::default()
        }
    }

    pub fn named(start: f64, end: f64, name: impl Into<String>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = Some(editable);
        self
    }

    pub fn validate(&self) -> Result<Range, RangeError> {
        let (start, end) = match (self.start, self.end) {
            (Some(start), Some(end)) => (start, end),
            _ => return Err(RangeError::MissingBounds),
        };
        if !start.is_finite() || !end.is_finite() || start < 0.0 || start >= end {
            return Err(RangeError::InvalidBounds { start, end });
        }
        Ok(Range {
            id: RangeId::new(),
            span: RangeSpan::new(start, end),
            name: self.name.clone().unwrap_or_else(default_name),
            color: self.color.clone().unwrap_or_else(default_color),
            editable: self.editable.unwrap_or(false),
            class_name: self.class_name.clone(),
        })
    }
}
