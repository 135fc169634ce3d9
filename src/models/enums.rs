use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(Urgency {
    Low => "low",
    Moderate => "moderate",
    High => "high",
    Critical => "critical",
});

str_enum!(Impact {
    Low => "low",
    Moderate => "moderate",
    High => "high",
});

impl Urgency {
    /// Urgency tier for a 0-100 severity score.
    ///
    /// Scores at or below 40 fall through to `otherwise`, which lets the
    /// demonstration scorer keep an archetype's baseline urgency for mild
    /// presentations.
    pub fn from_severity_or(severity: u8, otherwise: Urgency) -> Urgency {
        if severity > 85 {
            Urgency::Critical
        } else if severity > 65 {
            Urgency::High
        } else if severity > 40 {
            Urgency::Moderate
        } else {
            otherwise
        }
    }

    pub fn from_severity(severity: u8) -> Urgency {
        Self::from_severity_or(severity, Urgency::Low)
    }
}
