//! Closed value sets stored as upper-case strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!(EventType {
    Conference => "CONFERENCE",
    Workshop => "WORKSHOP",
    Seminar => "SEMINAR",
    Webinar => "WEBINAR",
    Meeting => "MEETING",
    Exposition => "EXPOSITION",
    Festival => "FESTIVAL",
    SportingEvent => "SPORTING_EVENT",
    Concert => "CONCERT",
    Gala => "GALA",
    Symposium => "SYMPOSIUM",
    Summit => "SUMMIT",
    Other => "OTHER",
});

string_enum!(EventStatus {
    Draft => "DRAFT",
    Scheduled => "SCHEDULED",
    Published => "PUBLISHED",
    Active => "ACTIVE",
    Completed => "COMPLETED",
    Cancelled => "CANCELLED",
    Archived => "ARCHIVED",
});

string_enum!(EventFormat {
    Online => "ONLINE",
    InPerson => "IN_PERSON",
    Hybrid => "HYBRID",
    Other => "OTHER",
});

string_enum!(
    /// ISO 4217 codes accepted for event pricing.
    Currency {
        Usd => "USD",
        Eur => "EUR",
        Jpy => "JPY",
        Gbp => "GBP",
        Cad => "CAD",
        Inr => "INR",
        Fbu => "FBU",
        Aud => "AUD",
        Chf => "CHF",
        Cny => "CNY",
        Brl => "BRL",
        Rub => "RUB",
        Zar => "ZAR",
        Krw => "KRW",
        Sgd => "SGD",
        Nzd => "NZD",
        Mxn => "MXN",
        Hkd => "HKD",
        Sek => "SEK",
        Nok => "NOK",
        Try => "TRY",
        Aed => "AED",
        Sar => "SAR",
        Thb => "THB",
    }
);

string_enum!(SessionType {
    Keynote => "KEYNOTE",
    Workshop => "WORKSHOP",
    PanelDiscussion => "PANEL_DISCUSSION",
    Break => "BREAK",
    Lunch => "LUNCH",
    Networking => "NETWORKING",
    ClosingRemarks => "CLOSING_REMARKS",
    Other => "OTHER",
    Session => "SESSION",
});

string_enum!(SpeakerType {
    Speaker => "SPEAKER",
    Moderator => "MODERATOR",
    Panelist => "PANELIST",
    Presenter => "PRESENTER",
    Guest => "GUEST",
    KeynoteSpeaker => "KEYNOTE_SPEAKER",
    Vip => "VIP",
    Facilitator => "FACILITATOR",
    WorkshopLeader => "WORKSHOP_LEADER",
    Trainer => "TRAINER",
    GuestOfHonor => "GUEST_OF_HONOR",
    Analyst => "ANALYST",
    Influencer => "INFLUENCER",
    RoundtableHost => "ROUNDTABLE_HOST",
});
