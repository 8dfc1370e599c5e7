//! Enumerations stored on records.
//!
//! Each enum serializes as its lowercase `snake_case` name, the same string
//! [`Label::as_str`] returns.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of string-labelled values.
pub trait Label: Copy + Ord + fmt::Debug + Send + Sync + 'static {
    /// Every variant, in declaration order.
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;
}

macro_rules! label_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl Label for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
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

label_enum! {
    /// Kind of calendar entry a series or replacement record represents.
    EntryType {
        Meeting => "meeting",
        Event => "event",
        Deadline => "deadline",
        Reminder => "reminder",
        Engagement => "engagement",
        Holiday => "holiday",
        Other => "other",
    }
}

label_enum! {
    /// Intake request category.
    RequestType {
        Engagement => "engagement",
        Position => "position",
        MouAction => "mou_action",
        Foresight => "foresight",
    }
}

label_enum! {
    Sensitivity {
        Public => "public",
        Internal => "internal",
        Confidential => "confidential",
        Secret => "secret",
    }
}

label_enum! {
    Urgency {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

label_enum! {
    /// Derived from urgency and sensitivity, never scored directly.
    Priority {
        Low => "low",
        Medium => "medium",
        High => "high",
        Urgent => "urgent",
    }
}
