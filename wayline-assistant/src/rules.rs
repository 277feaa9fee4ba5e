use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyRule {
    pub name: String,
    pub condition: RuleCondition,
    pub replies: Vec<String>,
    pub priority: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RuleCondition {
    /// Keyword present as a substring
    Keyword(String),
    /// At least one of the keywords present
    AnyOf(Vec<String>),
    /// Every keyword present
    AllOf(Vec<String>),
}

impl RuleCondition {
    fn matches(&self, message: &str) -> bool {
        match self {
            RuleCondition::Keyword(keyword) => message.contains(keyword.as_str()),
            RuleCondition::AnyOf(keywords) => {
                keywords.iter().any(|k| message.contains(k.as_str()))
            }
            RuleCondition::AllOf(keywords) => {
                keywords.iter().all(|k| message.contains(k.as_str()))
            }
        }
    }
}

/// Maps free-text chat input to a canned reply. Rules are evaluated in
/// descending priority order, the first match wins, and random selection is
/// confined to the matched rule's reply set. Inputs are lowercased before
/// matching; the engine holds no per-conversation state.
pub struct ResponseEngine {
    rules: Vec<ReplyRule>,
    default_reply: String,
}

impl ResponseEngine {
    pub fn new(rules: Vec<ReplyRule>, default_reply: impl Into<String>) -> Self {
        let mut rules = rules;
        rules.sort_by_key(|r| -r.priority);
        Self {
            rules,
            default_reply: default_reply.into(),
        }
    }

    /// Engine preloaded with the stock travel-booking reply table
    pub fn with_default_rules() -> Self {
        Self::new(default_rules(), DEFAULT_REPLY)
    }

    pub fn respond(&self, message: &str) -> String {
        let message = message.to_lowercase();

        for rule in &self.rules {
            if !rule.is_active {
                continue;
            }

            if rule.condition.matches(&message) {
                tracing::debug!(rule = %rule.name, "Assistant rule matched");
                if let Some(reply) = rule.replies.choose(&mut rand::thread_rng()) {
                    return reply.clone();
                }
            }
        }

        self.default_reply.clone()
    }
}

const DEFAULT_REPLY: &str =
    "I'm here to help with your travel booking needs. How can I assist you today?";

fn keyword_rule(name: &str, keyword: &str, priority: i32, replies: &[&str]) -> ReplyRule {
    ReplyRule {
        name: name.to_string(),
        condition: RuleCondition::Keyword(keyword.to_string()),
        replies: replies.iter().map(|r| r.to_string()).collect(),
        priority,
        is_active: true,
    }
}

/// The stock reply table. The three override rules outrank every keyword
/// rule, so they win whenever their conditions hold; keyword rules keep
/// their declared relative order via descending priorities.
pub fn default_rules() -> Vec<ReplyRule> {
    vec![
        ReplyRule {
            name: "budget".to_string(),
            condition: RuleCondition::AnyOf(vec!["cheap".to_string(), "economy".to_string()]),
            replies: vec![
                "For budget-friendly options, I recommend checking our bus services or booking in advance for better rates!".to_string(),
            ],
            priority: 100,
            is_active: true,
        },
        ReplyRule {
            name: "departure-times".to_string(),
            condition: RuleCondition::AllOf(vec!["when".to_string(), "depart".to_string()]),
            replies: vec![
                "Departure times vary by route. Use the search filters on the Travel Options page to find specific schedules.".to_string(),
            ],
            priority: 95,
            is_active: true,
        },
        ReplyRule {
            name: "seat-availability".to_string(),
            condition: RuleCondition::AllOf(vec!["how many".to_string(), "seat".to_string()]),
            replies: vec![
                "Seat availability is shown for each travel option. Green numbers indicate available seats!".to_string(),
            ],
            priority: 90,
            is_active: true,
        },
        keyword_rule(
            "hello",
            "hello",
            60,
            &[
                "Hello! How can I help you with your travel plans today?",
                "Hi there! Ready to plan your next adventure?",
            ],
        ),
        keyword_rule(
            "hi",
            "hi",
            59,
            &[
                "Hello! How can I assist you with travel booking?",
                "Hi! What can I help you with today?",
            ],
        ),
        keyword_rule(
            "help",
            "help",
            58,
            &[
                "I can help you with: booking travel, checking availability, managing your bookings, and answering travel questions. What do you need help with?",
            ],
        ),
        keyword_rule(
            "book",
            "book",
            57,
            &[
                "To book travel, go to the 'Travel Options' page, choose your preferred option, and click 'Book Now'.",
                "I can help you book flights, trains, or buses. What type of travel are you looking for?",
            ],
        ),
        keyword_rule(
            "flight",
            "flight",
            56,
            &[
                "We have flights available to various destinations. Check the 'Travel Options' page for current availability.",
                "For flights, you can filter by destination and date on our travel search page.",
            ],
        ),
        keyword_rule(
            "train",
            "train",
            55,
            &[
                "Train bookings are available! Browse our train options with flexible schedules.",
                "We offer comfortable train travel options. Check the travel page for details.",
            ],
        ),
        keyword_rule(
            "bus",
            "bus",
            54,
            &[
                "Affordable bus travel options are available. Great for short to medium distances!",
                "Our bus services provide economical travel. See available routes on the travel page.",
            ],
        ),
        keyword_rule(
            "cancel",
            "cancel",
            53,
            &[
                "To cancel a booking, go to 'My Bookings', find the booking, and click 'Cancel'.",
                "You can cancel bookings from your bookings list. Note that cancellation policies may apply.",
            ],
        ),
        keyword_rule(
            "price",
            "price",
            52,
            &[
                "Prices vary based on travel type, route, and time. Check the travel options page for current pricing.",
                "Our prices are competitive! Browse available options to see specific rates.",
            ],
        ),
        keyword_rule(
            "availability",
            "availability",
            51,
            &[
                "Check real-time availability on the Travel Options page. You can filter by date and destination.",
                "Seat availability updates in real-time. Use our search filters to find available options.",
            ],
        ),
        keyword_rule(
            "thank",
            "thank",
            50,
            &[
                "You're welcome! Happy to help with your travel needs.",
                "My pleasure! Safe travels!",
                "Anytime! Let me know if you need anything else.",
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ResponseEngine {
        ResponseEngine::with_default_rules()
    }

    fn rule_replies(name: &str) -> Vec<String> {
        default_rules()
            .into_iter()
            .find(|r| r.name == name)
            .expect("Rule not found")
            .replies
    }

    #[test]
    fn test_hello_picks_from_declared_replies() {
        let replies = rule_replies("hello");
        for _ in 0..20 {
            let reply = engine().respond("hello");
            assert!(replies.contains(&reply), "Unexpected reply: {reply}");
        }
    }

    #[test]
    fn test_override_beats_keyword_match() {
        // "hi" and "flight" both match keyword rules, but the when+depart
        // override outranks them
        let reply = engine().respond("hi, when do flights depart");
        assert_eq!(reply, rule_replies("departure-times")[0]);
    }

    #[test]
    fn test_budget_override() {
        let reply = engine().respond("any cheap flights to rome?");
        assert_eq!(reply, rule_replies("budget")[0]);

        let reply = engine().respond("Economy class please");
        assert_eq!(reply, rule_replies("budget")[0]);
    }

    #[test]
    fn test_seat_availability_override() {
        let reply = engine().respond("How many seats are left on the train?");
        assert_eq!(reply, rule_replies("seat-availability")[0]);
    }

    #[test]
    fn test_unrecognized_input_yields_default() {
        let reply = engine().respond("zzz qqq");
        assert_eq!(
            reply,
            "I'm here to help with your travel booking needs. How can I assist you today?"
        );
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let replies = rule_replies("train");
        let reply = engine().respond("TRAIN TIMES");
        assert!(replies.contains(&reply));
    }

    #[test]
    fn test_declared_order_breaks_keyword_ties() {
        // Both "hello" and "hi" appear; "hello" is declared first
        let replies = rule_replies("hello");
        let reply = engine().respond("hello hi");
        assert!(replies.contains(&reply));
    }

    #[test]
    fn test_inactive_rules_are_skipped() {
        let mut rules = default_rules();
        for rule in rules.iter_mut().filter(|r| r.name == "hello") {
            rule.is_active = false;
        }
        let engine = ResponseEngine::new(rules, "fallback");
        assert_eq!(engine.respond("hello"), "fallback");
    }
}
