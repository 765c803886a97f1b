//! Companies linked to customer accounts.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Argentine tax id, `NN-NNNNNNNN-N`
static CUIT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}-\d{8}-\d$").expect("valid CUIT pattern"));

/// Validator hook for CUIT fields.
pub fn validate_cuit(cuit: &str) -> Result<(), ValidationError> {
    if CUIT_PATTERN.is_match(cuit) {
        Ok(())
    } else {
        let mut err = ValidationError::new("cuit");
        err.message = Some("CUIT must look like 30-12345678-9".into());
        Err(err)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Company {
    pub id: i32,
    #[schema(example = "Acme SRL")]
    pub name: String,
    #[schema(example = "rrhh@acme.com")]
    pub email: String,
    pub trade_name: Option<String>,
    #[schema(example = "30-12345678-9")]
    pub cuit: String,
    pub vat_condition: Option<String>,
    pub company_type: Option<String>,
    pub main_activity: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,
    pub user_id: Option<i32>,
    pub active: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCompany {
    #[validate(length(min = 1, message = "Company name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub trade_name: Option<String>,
    #[validate(custom(function = "validate_cuit"))]
    #[schema(example = "30-12345678-9")]
    pub cuit: String,
    pub vat_condition: Option<String>,
    pub company_type: Option<String>,
    pub main_activity: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,
    pub user_id: Option<i32>,
}

/// Editable company fields. Owners use it too, so the linked user is not part of it.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CompanyPatch {
    #[validate(length(min = 1, message = "Company name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub trade_name: Option<String>,
    #[validate(custom(function = "validate_cuit"))]
    pub cuit: Option<String>,
    pub vat_condition: Option<String>,
    pub company_type: Option<String>,
    pub main_activity: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,
}

impl CompanyPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.trade_name.is_none()
            && self.cuit.is_none()
            && self.vat_condition.is_none()
            && self.company_type.is_none()
            && self.main_activity.is_none()
            && self.street_address.is_none()
            && self.city.is_none()
            && self.province.is_none()
            && self.postal_code.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cuit_format() {
        assert!(validate_cuit("30-12345678-9").is_ok());
        assert!(validate_cuit("30123456789").is_err());
        assert!(validate_cuit("3-12345678-9").is_err());
    }

    #[test]
    fn patch_validates_optional_cuit() {
        let patch = CompanyPatch {
            cuit: Some("bad".into()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
        assert!(CompanyPatch::default().validate().is_ok());
    }
}
