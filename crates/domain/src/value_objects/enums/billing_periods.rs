use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BillingPeriod {
    Free,
    Monthly,
    Yearly,
    Lifetime,
}

impl BillingPeriod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            BillingPeriod::Free => "free",
            BillingPeriod::Monthly => "monthly",
            BillingPeriod::Yearly => "yearly",
            BillingPeriod::Lifetime => "lifetime",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "free" => Some(BillingPeriod::Free),
            "monthly" => Some(BillingPeriod::Monthly),
            "yearly" => Some(BillingPeriod::Yearly),
            "lifetime" => Some(BillingPeriod::Lifetime),
            _ => None,
        }
    }

    /// Periods that carry an expiry date. Free and lifetime plans never expire.
    pub fn has_expiry(&self) -> bool {
        matches!(self, BillingPeriod::Monthly | BillingPeriod::Yearly)
    }
}

impl Display for BillingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
