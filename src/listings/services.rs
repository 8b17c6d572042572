use time::{Duration, OffsetDateTime};

use crate::error::ApiError;
use crate::moderation;

pub const TITLE_MIN: usize = 5;
pub const TITLE_MAX: usize = 200;
pub const CONTENT_MIN: usize = 20;
pub const CONTENT_MAX: usize = 5000;

/// Days an activated listing stays publicly visible.
pub const ACTIVE_DAYS: i64 = 30;

/// Length checks run before the personal-information filter, so an
/// undersized submission is rejected on length no matter what it contains.
pub fn validate_submission(title: &str, content: &str) -> Result<(), ApiError> {
    let title_len = title.chars().count();
    if !(TITLE_MIN..=TITLE_MAX).contains(&title_len) {
        return Err(ApiError::InvalidInput(
            "O título deve ter entre 5 e 200 caracteres".into(),
        ));
    }
    let content_len = content.chars().count();
    if !(CONTENT_MIN..=CONTENT_MAX).contains(&content_len) {
        return Err(ApiError::InvalidInput(
            "A descrição deve ter entre 20 e 5000 caracteres".into(),
        ));
    }

    let issues = moderation::scan_fields([title, content]);
    if !issues.is_empty() {
        return Err(ApiError::Moderation {
            detail: "O anúncio contém informações pessoais não permitidas".into(),
            issues,
        });
    }
    Ok(())
}

pub fn activation_expiry(now: OffsetDateTime) -> OffsetDateTime {
    now + Duration::days(ACTIVE_DAYS)
}

/// Admin decision over a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentAction {
    Verify,
    Reject,
}

impl PaymentAction {
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "verify" => Some(Self::Verify),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }
}

/// Admin decision over a listing itself, independent of its payment axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingAction {
    Approve,
    Reject,
}

impl ListingAction {
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "approve" => Some(Self::Approve),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn long_content() -> String {
        "Descrição longa o bastante para passar na validação.".to_string()
    }

    #[test]
    fn short_title_rejected_even_with_pii() {
        // Length wins over moderation: the PII in the body is never reported.
        let err = validate_submission("oi", "contact me at a@b.com plus padding text")
            .expect_err("short title must fail");
        match err {
            ApiError::InvalidInput(msg) => assert!(msg.contains("título")),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn short_content_rejected() {
        let err = validate_submission("Título válido", "curto demais")
            .expect_err("short content must fail");
        match err {
            ApiError::InvalidInput(msg) => assert!(msg.contains("descrição")),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn title_of_exactly_five_chars_passes_length_check() {
        validate_submission("Cinco", &long_content()).expect("boundary lengths are valid");
    }

    #[test]
    fn pii_in_body_rejected_with_issue_labels() {
        let err = validate_submission(
            "Título válido",
            "Vendo bicicleta, contact me at a@b.com para combinar",
        )
        .expect_err("pii must fail");
        match err {
            ApiError::Moderation { issues, .. } => {
                assert!(issues.contains(&"Email detectado"));
            }
            other => panic!("expected Moderation, got {other:?}"),
        }
    }

    #[test]
    fn pii_in_title_rejected_too() {
        let err = validate_submission("Chama no whatsapp", &long_content())
            .expect_err("pii in title must fail");
        assert!(matches!(err, ApiError::Moderation { .. }));
    }

    #[test]
    fn clean_submission_passes() {
        validate_submission("Aulas de violão", &long_content()).expect("clean text is accepted");
    }

    #[test]
    fn activation_expiry_is_exactly_thirty_days() {
        let now = datetime!(2024-03-01 12:00:00 UTC);
        assert_eq!(activation_expiry(now), datetime!(2024-03-31 12:00:00 UTC));
    }

    #[test]
    fn payment_action_parsing() {
        assert_eq!(PaymentAction::parse("verify"), Some(PaymentAction::Verify));
        assert_eq!(PaymentAction::parse("reject"), Some(PaymentAction::Reject));
        assert_eq!(PaymentAction::parse("approve"), None);
        assert_eq!(PaymentAction::parse(""), None);
    }

    #[test]
    fn listing_action_parsing() {
        assert_eq!(ListingAction::parse("approve"), Some(ListingAction::Approve));
        assert_eq!(ListingAction::parse("reject"), Some(ListingAction::Reject));
        assert_eq!(ListingAction::parse("verify"), None);
    }
}
