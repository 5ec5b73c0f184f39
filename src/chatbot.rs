use crate::services::{ChatbotRuleRecord, PortalService, ServiceResult};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^\p{L}\p{N}\s]+").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Strip punctuation and collapse whitespace so "Beasiswa?" matches the rule
/// keyed "beasiswa".
fn normalize(input: &str) -> String {
    let lowered = input.trim().to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, " ");
    WHITESPACE.replace_all(stripped.trim(), " ").to_string()
}

/// First active rule whose keyword appears in the normalized question, in
/// display order.
pub fn match_rule<'a>(rules: &'a [ChatbotRuleRecord], question: &str) -> Option<&'a ChatbotRuleRecord> {
    let question = normalize(question);
    if question.is_empty() {
        return None;
    }
    rules
        .iter()
        .filter(|rule| rule.active)
        .find(|rule| question.contains(&normalize(&rule.keyword)))
}

/// Answer a visitor question from the managed rules, falling back to the
/// configured default reply.
pub fn respond<S: PortalService>(service: &S, question: &str) -> ServiceResult<String> {
    let rules = service.list_chatbot_rules()?;
    match match_rule(&rules, question) {
        Some(rule) => Ok(rule.reply.clone()),
        None => service.chatbot_fallback(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::InMemoryService;

    #[test]
    fn punctuation_and_case_are_ignored() {
        let service = InMemoryService::default();
        let reply = respond(&service, "Bagaimana cara daftar BEASISWA?").unwrap();
        assert!(reply.contains("beasiswa"));
    }

    #[test]
    fn inactive_rules_do_not_match() {
        let service = InMemoryService::default();
        service.set_chatbot_rule_active(1, false).unwrap();
        let reply = respond(&service, "info beasiswa").unwrap();
        assert!(reply.contains("belum dapat dijawab"));
    }

    #[test]
    fn first_match_in_display_order_wins() {
        let rules = vec![
            ChatbotRuleRecord {
                id: 1,
                keyword: "ukm".into(),
                reply: "jawaban ukm".into(),
                display_order: 1,
                active: true,
            },
            ChatbotRuleRecord {
                id: 2,
                keyword: "ukm musik".into(),
                reply: "jawaban ukm musik".into(),
                display_order: 2,
                active: true,
            },
        ];
        let rule = match_rule(&rules, "dimana sekretariat ukm musik").unwrap();
        assert_eq!(rule.id, 1);
    }

    #[test]
    fn empty_question_gets_fallback() {
        let service = InMemoryService::default();
        let reply = respond(&service, "   ").unwrap();
        assert!(reply.contains("belum dapat dijawab"));
    }
}
