//! Semantic roles an input can play in a multi-input job.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Closed set of roles an input file can be classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaRole {
    /// Any audio track (paired with an image)
    Audio,
    /// Still image looped as a video source
    Image,
    /// Instrumental bed in a vocals mix
    Background,
    /// Voice track laid over a background
    Vocals,
    /// Nothing matched
    Unclassified,
}

impl MediaRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaRole::Audio => "audio",
            MediaRole::Image => "image",
            MediaRole::Background => "background",
            MediaRole::Vocals => "vocals",
            MediaRole::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for MediaRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown media role: {0}")]
pub struct ParseRoleError(pub String);

impl FromStr for MediaRole {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "audio" => Ok(MediaRole::Audio),
            "image" => Ok(MediaRole::Image),
            "background" | "bg" | "instrumental" => Ok(MediaRole::Background),
            "vocals" | "vocal" | "voice" => Ok(MediaRole::Vocals),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role_aliases() {
        assert_eq!("Background".parse::<MediaRole>().unwrap(), MediaRole::Background);
        assert_eq!("bg".parse::<MediaRole>().unwrap(), MediaRole::Background);
        assert_eq!("voice".parse::<MediaRole>().unwrap(), MediaRole::Vocals);
        assert!("file".parse::<MediaRole>().is_err());
    }

    #[test]
    fn test_role_serde() {
        let json = serde_json::to_string(&MediaRole::Vocals).unwrap();
        assert_eq!(json, "\"vocals\"");
    }
}
