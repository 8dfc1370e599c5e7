//! English/Arabic message pairs carried by user-facing errors and explanations.

use serde::{Deserialize, Serialize};

/// A message rendered in both supported locales so clients can pick one
/// without a second round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bilingual {
    pub en: String,
    pub ar: String,
}

impl Bilingual {
    #[must_use]
    pub fn new(en: impl Into<String>, ar: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            ar: ar.into(),
        }
    }
}

impl std::fmt::Display for Bilingual {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.en)
    }
}

/// Builds a [`Bilingual`] from two string expressions, formatting both with
/// the same arguments.
#[macro_export]
macro_rules! bilingual {
    ($en:expr, $ar:expr $(,)?) => {
        $crate::bilingual::Bilingual::new($en, $ar)
    };
    ($en:literal, $ar:literal, $($arg:tt)+) => {
        $crate::bilingual::Bilingual::new(format!($en, $($arg)+), format!($ar, $($arg)+))
    };
}
