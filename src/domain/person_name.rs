use std::fmt;
use std::str::FromStr;

use unicode_segmentation::UnicodeSegmentation;

const MAX_GRAPHEMES: usize = 128;
const MARKUP_CHARS: &[char] = &['<', '>', '{', '}', '\\', '"', '/'];

/// Display name a user registers with. Runs of whitespace are collapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl FromStr for PersonName {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let name = value.split_whitespace().collect::<Vec<_>>().join(" ");

        if name.is_empty() {
            return Err("Name cannot be empty".into());
        }
        if name.graphemes(true).count() > MAX_GRAPHEMES {
            return Err(format!("Name is longer than {} characters", MAX_GRAPHEMES));
        }
        if name
            .chars()
            .any(|c| c.is_control() || MARKUP_CHARS.contains(&c))
        {
            return Err("Name contains invalid characters".into());
        }

        Ok(Self(name))
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
