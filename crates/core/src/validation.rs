//! Field-level validation results shared by forms.

/// A form field that failed validation, with the message shown next to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    #[must_use]
    pub const fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Look up the message for a field, if it failed.
#[must_use]
pub fn message_for(errors: &[FieldError], field: &str) -> Option<&'static str> {
    errors
        .iter()
        .find(|error| error.field == field)
        .map(|error| error.message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_for() {
        let errors = [FieldError::new("name", "Please enter a name")];
        assert_eq!(message_for(&errors, "name"), Some("Please enter a name"));
        assert_eq!(message_for(&errors, "city"), None);
    }
}
