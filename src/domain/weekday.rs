use std::str::FromStr;

use serde::Serialize;

/// Day of the week a subscription is active on, parsed from the client's
/// three/four letter codes (`Mon`, `Tue`, `Wed`, `Thur`, `Fri`, `Sat`, `Sun`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl FromStr for Weekday {
    type Err = String;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        match code {
            "Mon" => Ok(Self::Monday),
            "Tue" => Ok(Self::Tuesday),
            "Wed" => Ok(Self::Wednesday),
            "Thur" => Ok(Self::Thursday),
            "Fri" => Ok(Self::Friday),
            "Sat" => Ok(Self::Saturday),
            "Sun" => Ok(Self::Sunday),
            other => Err(format!("{} is not a day code", other)),
        }
    }
}

/// The seven per-day flags of a subscription, all unset by default
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WeekdaySet {
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
}

impl WeekdaySet {
    /// Build the flags from requested day codes.
    /// Unrecognized codes are skipped.
    pub fn from_codes<S: AsRef<str>>(codes: &[S]) -> Self {
        codes
            .iter()
            .filter_map(|code| code.as_ref().parse::<Weekday>().ok())
            .fold(Self::default(), |mut days, day| {
                days.insert(day);
                days
            })
    }

    pub fn insert(&mut self, day: Weekday) {
        match day {
            Weekday::Monday => self.monday = true,
            Weekday::Tuesday => self.tuesday = true,
            Weekday::Wednesday => self.wednesday = true,
            Weekday::Thursday => self.thursday = true,
            Weekday::Friday => self.friday = true,
            Weekday::Saturday => self.saturday = true,
            Weekday::Sunday => self.sunday = true,
        }
    }

    #[cfg(test)]
    pub fn contains(&self, day: Weekday) -> bool {
        match day {
            Weekday::Monday => self.monday,
            Weekday::Tuesday => self.tuesday,
            Weekday::Wednesday => self.wednesday,
            Weekday::Thursday => self.thursday,
            Weekday::Friday => self.friday,
            Weekday::Saturday => self.saturday,
            Weekday::Sunday => self.sunday,
        }
    }
}
