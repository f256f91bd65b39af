/// The record being persisted, keyed by `email`.
///
/// `name` and `email` are kept as raw strings: a `Subscriber` can be built straight from a form and
/// only becomes trustworthy once it has gone through a `SubscriberValidation`. The email is compared
/// by exact match - no case folding or trimming is applied anywhere in the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Subscriber {
    /// Assigned by the backend on insert; `None` until the record has been persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
}

impl Subscriber {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
        }
    }
}
