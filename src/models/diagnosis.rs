use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnosis {
    issue_type: String,
    tone: String,
    urgency: Urgency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Diagnosis {
    pub fn new(issue_type: impl Into<String>, tone: impl Into<String>, urgency: Urgency) -> Self {
        Self {
            issue_type: issue_type.into(),
            tone: tone.into(),
            urgency,
        }
    }

    /// Builds a diagnosis from untrusted model output; every field must be present.
    pub fn from_parts(issue_type: &str, tone: &str, urgency: &str) -> Result<Self> {
        let issue_type = required("issueType", issue_type)?;
        let tone = required("tone", tone)?;
        let urgency = required("urgency", urgency)?.parse()?;

        Ok(Self {
            issue_type,
            tone,
            urgency,
        })
    }

    pub fn issue_type(&self) -> &str {
        &self.issue_type
    }

    pub fn tone(&self) -> &str {
        &self.tone
    }

    pub fn urgency(&self) -> Urgency {
        self.urgency
    }
}

fn required(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::ParseError(format!("Diagnosis field '{}' is empty", field)));
    }
    Ok(value.to_string())
}

impl FromStr for Urgency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Urgency::Low),
            "medium" => Ok(Urgency::Medium),
            "high" => Ok(Urgency::High),
            other => Err(Error::ParseError(format!("Unknown urgency '{}'", other))),
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Urgency::Low => write!(f, "low"),
            Urgency::Medium => write!(f, "medium"),
            Urgency::High => write!(f, "high"),
        }
    }
}
