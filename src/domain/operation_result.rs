/// Outcome of a workflow-level operation.
///
/// Expected business outcomes (duplicate signup, unknown email, invalid input) are reported as a
/// failed `OperationResult` rather than as an `Err`: the caller always gets a message it can show.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OperationResult {
    pub succeeded: bool,
    pub message: String,
}

impl OperationResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            message: message.into(),
        }
    }
}
