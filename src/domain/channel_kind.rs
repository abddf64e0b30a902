use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a notification channel reaches its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelKind {
    #[serde(rename = "e")]
    Email,
    #[serde(rename = "t")]
    Text,
    #[serde(rename = "p")]
    Push,
}

impl ChannelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "e",
            Self::Text => "t",
            Self::Push => "p",
        }
    }
}

impl FromStr for ChannelKind {
    type Err = String;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        match code {
            "e" => Ok(Self::Email),
            "t" => Ok(Self::Text),
            "p" => Ok(Self::Push),
            other => Err(format!("{} is not a notification type", other)),
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
