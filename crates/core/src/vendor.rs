//! Vendor onboarding rules: account types, approval lifecycle, and the
//! field requirements for individual and business registrations.

use crate::error::CoreError;

/// Maximum length of an internal vendor note.
pub const MAX_NOTE_LENGTH: usize = 5_000;

/// Maximum length of a rejection reason.
pub const MAX_REJECTION_REASON_LENGTH: usize = 1_000;

text_enum! {
    /// Whether a vendor sells as a person or as a registered company.
    pub enum VendorType("vendor type") {
        Individual => "individual",
        Business => "business",
    }
}

text_enum! {
    /// Approval state of a vendor account.
    pub enum VendorStatus("vendor status") {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Suspended => "suspended",
    }
}

text_enum! {
    /// How a vendor receives cash-outs.
    pub enum PaymentMethodType("payment method type") {
        BankTransfer => "bank_transfer",
        MobileMoney => "mobile_money",
        Paypal => "paypal",
    }
}

impl VendorStatus {
    /// Whether the approval workflow allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: VendorStatus) -> bool {
        use VendorStatus::*;
        matches!(
            (self, next),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Rejected, Approved)
                | (Approved, Suspended)
                | (Suspended, Approved)
        )
    }

    /// Return `next` if the transition is allowed, otherwise a conflict.
    pub fn transition(self, next: VendorStatus) -> Result<VendorStatus, CoreError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::Conflict(format!(
                "Cannot move vendor from '{self}' to '{next}'"
            )))
        }
    }

    /// Only approved vendors may list products or receive subscriptions.
    pub fn can_sell(self) -> bool {
        self == VendorStatus::Approved
    }
}

/// Fields supplied when registering an individual vendor.
#[derive(Debug, Clone, Default)]
pub struct IndividualFields<'a> {
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub national_id: Option<&'a str>,
}

/// Fields supplied when registering a business vendor.
#[derive(Debug, Clone, Default)]
pub struct BusinessFields<'a> {
    pub company_name: Option<&'a str>,
    pub registration_number: Option<&'a str>,
}

fn require(value: Option<&str>, field: &str) -> Result<(), CoreError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(CoreError::Validation(format!("{field} is required"))),
    }
}

/// Individual vendors must supply a full name and a national id.
pub fn validate_individual(fields: &IndividualFields<'_>) -> Result<(), CoreError> {
    require(fields.first_name, "first_name")?;
    require(fields.last_name, "last_name")?;
    require(fields.national_id, "national_id")?;
    Ok(())
}

/// Business vendors must supply a company name and registration number.
pub fn validate_business(fields: &BusinessFields<'_>) -> Result<(), CoreError> {
    require(fields.company_name, "company_name")?;
    require(fields.registration_number, "registration_number")?;
    Ok(())
}

/// Display name shown in lists: the company name for businesses, otherwise
/// "First Last".
pub fn display_name(
    vendor_type: VendorType,
    individual: &IndividualFields<'_>,
    business: &BusinessFields<'_>,
) -> String {
    match vendor_type {
        VendorType::Business => business.company_name.unwrap_or_default().trim().to_string(),
        VendorType::Individual => format!(
            "{} {}",
            individual.first_name.unwrap_or_default().trim(),
            individual.last_name.unwrap_or_default().trim()
        )
        .trim()
        .to_string(),
    }
}

/// A rejection must explain itself.
pub fn validate_rejection_reason(reason: &str) -> Result<(), CoreError> {
    if reason.trim().is_empty() {
        return Err(CoreError::Validation(
            "A rejection reason is required".to_string(),
        ));
    }
    if reason.len() > MAX_REJECTION_REASON_LENGTH {
        return Err(CoreError::Validation(format!(
            "Rejection reason exceeds {MAX_REJECTION_REASON_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Notes must be non-empty and bounded.
pub fn validate_note_body(body: &str) -> Result<(), CoreError> {
    if body.trim().is_empty() {
        return Err(CoreError::Validation("Note body must not be empty".to_string()));
    }
    if body.len() > MAX_NOTE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Note body exceeds {MAX_NOTE_LENGTH} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_parse_vendor_status() {
        assert_eq!("approved".parse::<VendorStatus>().unwrap(), VendorStatus::Approved);
        let err = "archived".parse::<VendorStatus>().unwrap_err();
        assert!(err.to_string().contains("Invalid vendor status 'archived'"));
        assert!(err.to_string().contains("pending, approved, rejected, suspended"));
    }

    #[test]
    fn test_pending_can_be_approved_or_rejected() {
        assert!(VendorStatus::Pending.can_transition_to(VendorStatus::Approved));
        assert!(VendorStatus::Pending.can_transition_to(VendorStatus::Rejected));
        assert!(!VendorStatus::Pending.can_transition_to(VendorStatus::Suspended));
    }

    #[test]
    fn test_rejected_vendor_can_be_reconsidered() {
        assert!(VendorStatus::Rejected.can_transition_to(VendorStatus::Approved));
        assert!(!VendorStatus::Rejected.can_transition_to(VendorStatus::Suspended));
    }

    #[test]
    fn test_suspension_round_trip() {
        assert!(VendorStatus::Approved.can_transition_to(VendorStatus::Suspended));
        assert!(VendorStatus::Suspended.can_transition_to(VendorStatus::Approved));
        assert!(!VendorStatus::Approved.can_transition_to(VendorStatus::Rejected));
    }

    #[test]
    fn test_invalid_transition_is_conflict() {
        assert_matches!(
            VendorStatus::Approved.transition(VendorStatus::Approved),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn test_only_approved_can_sell() {
        assert!(VendorStatus::Approved.can_sell());
        assert!(!VendorStatus::Pending.can_sell());
        assert!(!VendorStatus::Suspended.can_sell());
    }

    #[test]
    fn test_individual_requires_all_fields() {
        let ok = IndividualFields {
            first_name: Some("Ada"),
            last_name: Some("Obi"),
            national_id: Some("A1234567"),
        };
        assert!(validate_individual(&ok).is_ok());

        let missing_id = IndividualFields {
            national_id: Some("  "),
            ..ok.clone()
        };
        let err = validate_individual(&missing_id).unwrap_err();
        assert!(err.to_string().contains("national_id is required"));
    }

    #[test]
    fn test_business_requires_company_and_registration() {
        let missing = BusinessFields {
            company_name: Some("Acme Ltd"),
            registration_number: None,
        };
        assert!(validate_business(&missing).is_err());

        let ok = BusinessFields {
            company_name: Some("Acme Ltd"),
            registration_number: Some("RC-99"),
        };
        assert!(validate_business(&ok).is_ok());
    }

    #[test]
    fn test_display_name() {
        let individual = IndividualFields {
            first_name: Some("Ada"),
            last_name: Some(" Obi "),
            national_id: None,
        };
        let business = BusinessFields {
            company_name: Some("Acme Ltd"),
            registration_number: None,
        };
        assert_eq!(
            display_name(VendorType::Individual, &individual, &business),
            "Ada Obi"
        );
        assert_eq!(
            display_name(VendorType::Business, &individual, &business),
            "Acme Ltd"
        );
    }

    #[test]
    fn test_rejection_reason_required() {
        assert!(validate_rejection_reason("").is_err());
        assert!(validate_rejection_reason("   ").is_err());
        assert!(validate_rejection_reason("Documents unreadable").is_ok());
        assert!(validate_rejection_reason(&"x".repeat(MAX_REJECTION_REASON_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_payment_method_type_strings() {
        assert_eq!(PaymentMethodType::BankTransfer.as_str(), "bank_transfer");
        assert_eq!(
            "mobile_money".parse::<PaymentMethodType>().unwrap(),
            PaymentMethodType::MobileMoney
        );
    }
}
