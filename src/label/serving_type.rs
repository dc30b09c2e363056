use std::{fmt, str::FromStr};

/// How a reviewed beer was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServingType {
    Bottle,
    Can,
    Draft,
    Unknown,
    /// Placeholder for rows still waiting on a label. Never accepted from an
    /// operator.
    NotSet,
}

impl ServingType {
    /// Labels an operator may assign.
    pub const ACCEPTED: [ServingType; 4] = [
        ServingType::Bottle,
        ServingType::Can,
        ServingType::Draft,
        ServingType::Unknown,
    ];

    pub const NOT_SET: &'static str = "not_set";

    pub fn as_str(self) -> &'static str {
        match self {
            ServingType::Bottle => "bottle",
            ServingType::Can => "can",
            ServingType::Draft => "draft",
            ServingType::Unknown => "unknown",
            ServingType::NotSet => Self::NOT_SET,
        }
    }

    /// Parse operator input: trimmed, case-insensitive, one of `ACCEPTED`.
    pub fn parse_label(input: &str) -> Result<Self, String> {
        let wanted = input.trim().to_ascii_lowercase();
        Self::ACCEPTED
            .iter()
            .copied()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| {
                let choices: Vec<&str> = Self::ACCEPTED.iter().map(|t| t.as_str()).collect();
                format!(
                    "invalid serving type {:?}, expected one of {}",
                    input.trim(),
                    choices.join(", ")
                )
            })
    }
}

impl fmt::Display for ServingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServingType {
    type Err = String;

    /// Accepts every stored value, including `not_set`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim() == Self::NOT_SET {
            Ok(ServingType::NotSet)
        } else {
            Self::parse_label(s)
        }
    }
}
