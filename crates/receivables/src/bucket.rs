use serde::{Deserialize, Serialize};

/// Days-overdue range an outstanding balance is reported under.
///
/// Boundaries are inclusive on both ends: 30 days overdue is still `Days1To30`,
/// 31 is `Days31To60`. Anything not yet past due (zero or negative) is `Current`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgingBucket {
    #[serde(rename = "current")]
    Current,
    #[serde(rename = "days_1_to_30")]
    Days1To30,
    #[serde(rename = "days_31_to_60")]
    Days31To60,
    #[serde(rename = "days_61_to_90")]
    Days61To90,
    #[serde(rename = "over_90_days")]
    Over90Days,
}

impl AgingBucket {
    /// All buckets, youngest first.
    pub const ALL: [AgingBucket; 5] = [
        AgingBucket::Current,
        AgingBucket::Days1To30,
        AgingBucket::Days31To60,
        AgingBucket::Days61To90,
        AgingBucket::Over90Days,
    ];

    pub fn classify(days_overdue: i64) -> Self {
        match days_overdue {
            i64::MIN..=0 => AgingBucket::Current,
            1..=30 => AgingBucket::Days1To30,
            31..=60 => AgingBucket::Days31To60,
            61..=90 => AgingBucket::Days61To90,
            _ => AgingBucket::Over90Days,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgingBucket::Current => "current",
            AgingBucket::Days1To30 => "1-30",
            AgingBucket::Days31To60 => "31-60",
            AgingBucket::Days61To90 => "61-90",
            AgingBucket::Over90Days => "90+",
        }
    }
}

impl core::fmt::Display for AgingBucket {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}
