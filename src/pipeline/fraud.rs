use serde::Serialize;

/// Phrases that commonly appear in social-engineering attempts.
const FRAUD_PATTERNS: &[&str] = &[
    "give me your password",
    "social security",
    "credit card number",
    "wire transfer",
    "send money",
    "account number",
    "routing number",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FraudCheck {
    pub risk_level: RiskLevel,
    pub patterns_detected: Vec<&'static str>,
    pub flagged: bool,
}

/// Scan a message for fraud phrases. One hit is medium risk, two or more high.
pub fn check(text: &str, conversation_id: &str) -> FraudCheck {
    let lower = text.to_lowercase();
    let detected: Vec<&'static str> = FRAUD_PATTERNS
        .iter()
        .copied()
        .filter(|p| lower.contains(p))
        .collect();

    let risk_level = match detected.len() {
        0 => RiskLevel::Low,
        1 => RiskLevel::Medium,
        _ => RiskLevel::High,
    };
    let flagged = risk_level != RiskLevel::Low;

    if flagged {
        tracing::warn!(
            conversation_id,
            risk = risk_level.as_str(),
            patterns = ?detected,
            "Fraud alert"
        );
    }

    FraudCheck {
        risk_level,
        patterns_detected: detected,
        flagged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_is_low_risk() {
        let result = check("Where is my parcel?", "c1");
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert!(!result.flagged);
        assert!(result.patterns_detected.is_empty());
    }

    #[test]
    fn risk_grows_with_hits() {
        let one = check("Please confirm your Credit Card Number", "c1");
        assert_eq!(one.risk_level, RiskLevel::Medium);
        assert!(one.flagged);

        let two = check("send money by wire transfer today", "c1");
        assert_eq!(two.risk_level, RiskLevel::High);
        assert_eq!(two.patterns_detected, vec!["wire transfer", "send money"]);
    }
}
