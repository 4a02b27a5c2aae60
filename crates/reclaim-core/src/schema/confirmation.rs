//! Validation rules for the confirmation step.

use std::sync::LazyLock;

use crate::booking::Confirmation;

use super::{Rule, Schema};

/// Promo codes issued by the consultancy are at most 21 characters.
pub const PROMO_CODE_MAX: usize = 21;
pub const SPECIAL_REQUESTS_MAX: usize = 500;

/// The confirmation schema.
///
/// The two acknowledgements are independent booleans with their own
/// messages. `promoCode` and `specialRequests` are optional and only
/// length-bounded; `receiveReminders` carries no rule (it defaults on).
pub fn schema() -> &'static Schema<Confirmation> {
    static SCHEMA: LazyLock<Schema<Confirmation>> = LazyLock::new(|| {
        Schema::new(vec![
            Rule::field("detailsConfirmed", "Please confirm your booking details", |c| {
                c.details_confirmed
            }),
            Rule::field(
                "cancellationPolicyAgreed",
                "Please agree to the cancellation policy",
                |c| c.cancellation_policy_agreed,
            ),
            Rule::field("paymentMethod", "Please select a payment method", |c| {
                c.payment_method.is_some()
            }),
            Rule::field(
                "promoCode",
                "Promo code must be at most 21 characters",
                |c| {
                    c.promo_code
                        .as_ref()
                        .is_none_or(|code| code.chars().count() <= PROMO_CODE_MAX)
                },
            ),
            Rule::field(
                "specialRequests",
                "Special requests must be at most 500 characters",
                |c| {
                    c.special_requests
                        .as_ref()
                        .is_none_or(|text| text.chars().count() <= SPECIAL_REQUESTS_MAX)
                },
            ),
        ])
    });
    &SCHEMA
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::PaymentMethod;

    fn complete() -> Confirmation {
        Confirmation {
            details_confirmed: true,
            cancellation_policy_agreed: true,
            payment_method: Some(PaymentMethod::Card),
            ..Confirmation::default()
        }
    }

    #[test]
    fn acknowledged_with_payment_method_passes() {
        assert!(schema().validate(&complete()).is_ok());
    }

    #[test]
    fn acknowledgements_fail_independently() {
        let mut c = complete();
        c.details_confirmed = false;
        let errors = schema().validate(&c).unwrap_err();
        assert_eq!(
            errors["detailsConfirmed"],
            "Please confirm your booking details"
        );
        assert!(!errors.contains_key("cancellationPolicyAgreed"));

        let mut c = complete();
        c.cancellation_policy_agreed = false;
        let errors = schema().validate(&c).unwrap_err();
        assert_eq!(
            errors["cancellationPolicyAgreed"],
            "Please agree to the cancellation policy"
        );
        assert!(!errors.contains_key("detailsConfirmed"));
    }

    #[test]
    fn missing_payment_method_fails() {
        let mut c = complete();
        c.payment_method = None;
        let errors = schema().validate(&c).unwrap_err();
        assert_eq!(errors["paymentMethod"], "Please select a payment method");
    }

    #[test]
    fn promo_code_length_is_bounded() {
        let mut c = complete();
        c.promo_code = Some("X".repeat(21));
        assert!(schema().validate(&c).is_ok());

        c.promo_code = Some("X".repeat(22));
        let errors = schema().validate(&c).unwrap_err();
        assert_eq!(errors["promoCode"], "Promo code must be at most 21 characters");
    }

    #[test]
    fn special_requests_length_is_bounded() {
        let mut c = complete();
        c.special_requests = Some("x".repeat(500));
        assert!(schema().validate(&c).is_ok());

        c.special_requests = Some("x".repeat(501));
        assert!(schema().validate(&c).is_err());
    }

    #[test]
    fn validate_field_checks_promo_code_in_isolation() {
        // The default confirmation fails other rules; a promo check must
        // not surface them.
        let message = schema()
            .validate_field("promoCode", serde_json::json!("X".repeat(22)))
            .unwrap();
        assert_eq!(
            message.as_deref(),
            Some("Promo code must be at most 21 characters")
        );

        let message = schema()
            .validate_field("promoCode", serde_json::json!("X".repeat(21)))
            .unwrap();
        assert_eq!(message, None);
    }
}
