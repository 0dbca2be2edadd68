use std::fmt;

/// Failures reported by the wallet or the chain reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// The requested resource or table entry does not exist.
    NotFound,
    /// The wallet refused to sign (user rejection included).
    Rejected(String),
    /// The node answered with a non-success status.
    Api { status: u16, message: String },
    Network(String),
    /// The transaction was committed but the VM aborted it.
    Aborted(String),
    Timeout,
    Decode(String),
}

impl ChainError {
    /// Message as reported by the collaborator, without our own prefix.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound => "resource not found".to_string(),
            Self::Rejected(message)
            | Self::Network(message)
            | Self::Decode(message)
            | Self::Api { message, .. } => message.clone(),
            Self::Aborted(vm_status) => format!("transaction failed: {vm_status}"),
            Self::Timeout => "timed out waiting for transaction".to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::Rejected(message) => write!(f, "rejected: {message}"),
            Self::Api { status, message } => write!(f, "api error (status={status}): {message}"),
            Self::Network(message) => write!(f, "network: {message}"),
            Self::Aborted(vm_status) => write!(f, "aborted: {vm_status}"),
            Self::Timeout => write!(f, "timeout"),
            Self::Decode(message) => write!(f, "decode: {message}"),
        }
    }
}

impl std::error::Error for ChainError {}

impl From<serde_json::Error> for ChainError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value.to_string())
    }
}

/// Errors surfaced to the user by the task list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    NoWallet,
    EmptyTask,
    External(ChainError),
}

impl ViewError {
    /// Text shown to the user; `fallback` is used when the collaborator
    /// gave no message at all.
    pub fn message_or(&self, fallback: &str) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        }
    }
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoWallet => write!(f, "Please connect your wallet first"),
            Self::EmptyTask => write!(f, "Task cannot be empty"),
            Self::External(err) => write!(f, "{}", err.user_message()),
        }
    }
}

impl std::error::Error for ViewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::External(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ChainError> for ViewError {
    fn from(value: ChainError) -> Self {
        Self::External(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{ChainError, ViewError};

    #[test]
    fn external_messages_are_verbatim() {
        let err = ViewError::from(ChainError::Rejected("User rejected the request".to_string()));
        assert_eq!(err.to_string(), "User rejected the request");
    }

    #[test]
    fn blank_external_message_uses_fallback() {
        let err = ViewError::from(ChainError::Network(String::new()));
        assert_eq!(err.message_or("Failed to add task"), "Failed to add task");
    }
}
