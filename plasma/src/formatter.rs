use colored::*;
use plasma_core::{Payload, client::CallError};

/// A wrapper struct for a formatted, colored string.
///
/// Implements `Display` so it can be printed directly.
pub struct FormattedString(pub String);

impl std::fmt::Display for FormattedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Payload> for FormattedString {
    fn from(payload: Payload) -> Self {
        let event_type = payload.event_type().unwrap_or("<untyped>").to_string();
        FormattedString(format!("{} {}", event_type.cyan().bold(), payload.data))
    }
}

impl From<CallError> for FormattedString {
    fn from(err: CallError) -> Self {
        match err {
            CallError::Status(status) => FormattedString(format!(
                "{} code={:?} message={:?}",
                "Subscription Failed:".red().bold(),
                status.code(),
                status.message()
            )),
            CallError::Cancelled => {
                FormattedString(format!("{}", "Subscription cancelled".yellow()))
            }
            err => FormattedString(format!("{}\n\n'{}'", "Subscription Failed:".red().bold(), err)),
        }
    }
}

impl From<anyhow::Error> for FormattedString {
    fn from(err: anyhow::Error) -> Self {
        FormattedString(format!("{}\n\n'{:#}'", "Error:".red().bold(), err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_shows_type_and_data() {
        colored::control::set_override(false);

        let formatted = FormattedString::from(Payload::new("event:111", "hello"));
        assert_eq!(formatted.to_string(), "event:111 hello");
    }

    #[test]
    fn untyped_payload_is_labelled() {
        colored::control::set_override(false);

        let payload = Payload {
            meta: None,
            data: "raw".to_string(),
        };
        assert_eq!(FormattedString::from(payload).to_string(), "<untyped> raw");
    }
}
