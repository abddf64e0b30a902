mod channel_kind;
mod email_address;
mod person_name;
mod weekday;

pub use channel_kind::ChannelKind;
pub use email_address::EmailAddress;
pub use person_name::PersonName;
pub use weekday::{Weekday, WeekdaySet};
