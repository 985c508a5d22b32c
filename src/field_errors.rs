//! Field-level validation messages returned by the backend.
//!
//! A 4xx body maps each field name to the messages for that field, in the
//! order the backend produced them.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Parse a response body.
    ///
    /// Lists keep their string entries, a bare string becomes a single
    /// message, anything else is ignored.
    pub fn from_json(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };

        let errors = object
            .iter()
            .filter_map(|(field, messages)| {
                let messages: Vec<String> = match messages {
                    Value::Array(items) => items
                        .iter()
                        .filter_map(|item| item.as_str().map(str::to_string))
                        .collect(),
                    Value::String(message) => vec![message.clone()],
                    _ => Vec::new(),
                };
                (!messages.is_empty()).then(|| (field.clone(), messages))
            })
            .collect();

        Self(errors)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Render the messages for one field: a single message as-is, several as
    /// a bulleted list.
    pub fn render(&self, field: &str) -> Option<String> {
        match self.get(field) {
            [] => None,
            [only] => Some(only.clone()),
            many => Some(
                many.iter()
                    .map(|message| format!("- {}", message))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (field, messages) in &self.0 {
            for message in messages {
                writeln!(f, "{}: {}", field, message)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_lists_and_strings() {
        let errors = FieldErrors::from_json(&json!({
            "password": ["This password is too short.", "This password is too common."],
            "email": "Enter a valid email address.",
            "agreement": 42,
        }));

        assert_eq!(
            errors.get("password"),
            ["This password is too short.", "This password is too common."]
        );
        assert_eq!(errors.get("email"), ["Enter a valid email address."]);
        assert!(errors.get("agreement").is_empty());
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["email", "password"]);
    }

    #[test]
    fn test_non_object_body_has_no_field_errors() {
        assert!(FieldErrors::from_json(&json!(["oops"])).is_empty());
        assert!(FieldErrors::from_json(&json!("oops")).is_empty());
    }

    #[test]
    fn test_render_single_message() {
        let errors = FieldErrors::from_json(&json!({"username": ["Already taken."]}));
        assert_eq!(errors.render("username").as_deref(), Some("Already taken."));
        assert_eq!(errors.render("email"), None);
    }

    #[test]
    fn test_render_multiple_messages_as_list() {
        let errors = FieldErrors::from_json(&json!({"newPassword": ["Too short.", "Too common."]}));
        assert_eq!(
            errors.render("newPassword").as_deref(),
            Some("- Too short.\n- Too common.")
        );
    }

    #[test]
    fn test_display_lists_every_message() {
        let errors = FieldErrors::from_json(&json!({"bio": ["Too long."], "name": ["Required."]}));
        assert_eq!(errors.to_string(), "bio: Too long.\nname: Required.\n");
    }
}
