use crate::domain::{email_violations, name_violations, Subscriber};

/// A single violated rule: which field, and what is wrong with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Rule checker over a `Subscriber`. An empty list means the subscriber is valid.
pub trait SubscriberValidation: Send + Sync {
    fn validate(&self, subscriber: &Subscriber) -> Vec<Violation>;
}

/// The default ruleset: a required name of at most 20 graphemes and a syntactically valid email
/// with a dotted domain. Every violated rule is reported, not just the first.
#[derive(Debug, Default, Clone, Copy)]
pub struct SubscriberValidator;

impl SubscriberValidation for SubscriberValidator {
    fn validate(&self, subscriber: &Subscriber) -> Vec<Violation> {
        let name = name_violations(&subscriber.name)
            .into_iter()
            .map(|message| Violation {
                field: "Name",
                message,
            });
        let email = email_violations(&subscriber.email)
            .into_iter()
            .map(|message| Violation {
                field: "Email",
                message,
            });
        name.chain(email).collect()
    }
}

/// Renders violations as `field: message` pairs joined by `, `.
pub fn describe(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
