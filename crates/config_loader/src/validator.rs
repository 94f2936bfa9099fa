//! Account validation
//!
//! Rules:
//! - host non-empty, port > 0, maxConnections >= 1 (derive rules)
//! - auth.user non-empty when auth is present (derive rules)
//! - client name non-empty when set

use contracts::{Account, MailError};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// Validate a resolved account
///
/// Reports every field rule that failed, not only the first.
pub fn validate(account: &Account) -> Result<(), MailError> {
    let mut problems = Vec::new();

    if let Err(errors) = account.validate() {
        collect_problems(&errors, "", &mut problems);
    }
    if matches!(account.name.as_deref(), Some(name) if name.trim().is_empty()) {
        problems.push("name must not be empty when set".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        problems.sort();
        Err(MailError::configuration(format!(
            "invalid account: {}",
            problems.join("; ")
        )))
    }
}

/// Flatten nested validator errors into readable messages
fn collect_problems(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for e in list {
                    match &e.message {
                        Some(message) => out.push(message.to_string()),
                        None => out.push(format!("{path}: {}", e.code)),
                    }
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_problems(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_problems(inner, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}
