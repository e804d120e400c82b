//! Plan, discount and payment method definitions.

use serde::{Deserialize, Serialize};

/// Subscription plan type. Determines price and entitlement set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanType {
    Standard,
    Expert,
}

impl PlanType {
    pub const ALL: [PlanType; 2] = [PlanType::Standard, PlanType::Expert];

    /// Base price per yearly term in minor currency units.
    pub fn base_price(&self) -> i64 {
        match self {
            PlanType::Standard => 120_000,
            PlanType::Expert => 240_000,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Standard => "STANDARD",
            PlanType::Expert => "EXPERT",
        }
    }

    /// Parses the persisted or wire form, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STANDARD" => Some(PlanType::Standard),
            "EXPERT" => Some(PlanType::Expert),
            _ => None,
        }
    }
}

impl std::fmt::Display for PlanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discount applied to the base price at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    None,
    EarlyBird,
    Nonprofit,
    Partner,
}

impl DiscountType {
    pub const ALL: [DiscountType; 4] = [
        DiscountType::None,
        DiscountType::EarlyBird,
        DiscountType::Nonprofit,
        DiscountType::Partner,
    ];

    /// Discount percentage, 0..=100.
    pub fn percent(&self) -> i64 {
        match self {
            DiscountType::None => 0,
            DiscountType::EarlyBird => 10,
            DiscountType::Nonprofit => 20,
            DiscountType::Partner => 15,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::None => "NONE",
            DiscountType::EarlyBird => "EARLY_BIRD",
            DiscountType::Nonprofit => "NONPROFIT",
            DiscountType::Partner => "PARTNER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NONE" | "" => Some(DiscountType::None),
            "EARLY_BIRD" => Some(DiscountType::EarlyBird),
            "NONPROFIT" => Some(DiscountType::Nonprofit),
            "PARTNER" => Some(DiscountType::Partner),
            _ => None,
        }
    }
}

impl Default for DiscountType {
    fn default() -> Self {
        DiscountType::None
    }
}

/// How the subscription is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Confirmed asynchronously by the payment gateway.
    Card,
    /// Settled offline against an open invoice.
    BankTransfer,
}

impl PaymentMethod {
    /// Returns true if the gateway must confirm payment before activation.
    pub fn requires_external_confirmation(&self) -> bool {
        matches!(self, PaymentMethod::Card)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "CARD",
            PaymentMethod::BankTransfer => "BANK_TRANSFER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CARD" => Some(PaymentMethod::Card),
            "BANK_TRANSFER" => Some(PaymentMethod::BankTransfer),
            _ => None,
        }
    }
}

/// Named feature flag granted by a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    MemberDirectory,
    EventRegistration,
    Newsletter,
    ConsultingDesk,
    AdvancedReports,
    PrioritySupport,
}

impl Feature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::MemberDirectory => "member_directory",
            Feature::EventRegistration => "event_registration",
            Feature::Newsletter => "newsletter",
            Feature::ConsultingDesk => "consulting_desk",
            Feature::AdvancedReports => "advanced_reports",
            Feature::PrioritySupport => "priority_support",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "member_directory" => Some(Feature::MemberDirectory),
            "event_registration" => Some(Feature::EventRegistration),
            "newsletter" => Some(Feature::Newsletter),
            "consulting_desk" => Some(Feature::ConsultingDesk),
            "advanced_reports" => Some(Feature::AdvancedReports),
            "priority_support" => Some(Feature::PrioritySupport),
            _ => None,
        }
    }
}
