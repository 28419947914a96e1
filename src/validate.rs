use crate::api::models::LetterDraft;
use crate::error::{FieldError, StoreError, StoreResult};

const MIN_SUBJECT_CHARS: usize = 2;
const MIN_BODY_CHARS: usize = 5;

/// Checks a compose form before it is handed to the façade.
///
/// Every failing field is reported at once.
pub fn validate_draft(draft: &LetterDraft) -> StoreResult<()> {
    let mut fields = Vec::new();

    if !is_plausible_address(&draft.to_email) {
        fields.push(FieldError {
            field: "to_email",
            message: "recipient must be an address like name@example.com".to_string(),
        });
    }

    if draft.subject.trim().chars().count() < MIN_SUBJECT_CHARS {
        fields.push(FieldError {
            field: "subject",
            message: format!("subject needs at least {MIN_SUBJECT_CHARS} characters"),
        });
    }

    if draft.body.trim().chars().count() < MIN_BODY_CHARS {
        fields.push(FieldError {
            field: "body",
            message: format!("body needs at least {MIN_BODY_CHARS} characters"),
        });
    }

    if fields.is_empty() {
        Ok(())
    } else {
        Err(StoreError::Validation { fields })
    }
}

fn is_plausible_address(raw: &str) -> bool {
    let Some((local, domain)) = raw.trim().split_once('@') else {
        return false;
    };

    !local.is_empty() && !domain.is_empty() && !domain.contains('@')
}
