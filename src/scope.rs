/// Keyword denylist for topics the companion should decline to discuss.
///
/// This is a coarse substring match, not semantic classification. MindMate is
/// an emotional support companion; shopping and financial advice requests get
/// a fixed refusal instead of being forwarded to the model. False positives
/// and negatives are accepted.
const DENYLIST: &[&str] = &[
    "buy",
    "sell",
    "purchase",
    "price",
    "cost",
    "discount",
    "deal",
    "shopping",
    "stock",
    "invest",
    "crypto",
    "bitcoin",
    "trading",
    "loan",
    "mortgage",
];

/// Returns true when the message is eligible for forwarding to the model.
pub fn is_in_scope(text: &str) -> bool {
    let lowered = text.to_lowercase();
    !DENYLIST.iter().any(|keyword| lowered.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_denylisted_keywords() {
        assert!(!is_in_scope("What's a fair price for a used laptop?"));
        assert!(!is_in_scope("should I buy a new phone"));
        assert!(!is_in_scope("tell me about crypto"));
    }

    #[test]
    fn is_case_insensitive() {
        assert!(!is_in_scope("BITCOIN to the moon"));
        assert!(!is_in_scope("Which STOCK should I pick?"));
    }

    #[test]
    fn accepts_support_topics() {
        assert!(is_in_scope("I've been feeling anxious lately"));
        assert!(is_in_scope("My week has been really hard"));
        assert!(is_in_scope(""));
    }
}
