//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    auth_handler, company_handler, consultation_handler, credit_handler, hour_handler,
    plan_handler, search_handler, user_handler,
};
use crate::domain::{
    Company, CompanyPatch, Consultation, ConsultationPatch, CreateCompany,
    CreateConsultation, CreateCreditBucket, CreateCreditPurchase, CreateHourPool, CreatePlan,
    CreatePlanPurchase, CreateSearch, CreditBucket, CreditBucketDetail, CreditBucketPatch,
    CreditKind, CreditPurchase, CreditPurchasePatch, HourPool, HourPoolDetail, HourPoolPatch,
    Plan, PlanPatch, PlanPurchase, PlanPurchasePatch, ProfilePatch, RequestState, Search,
    SearchPatch, UserPatch, UserResponse, UserRole,
};
use crate::services::{CreditPurchaseReceipt, PlanAssignment, Session, UserProfile};
use crate::types::PaginationMeta;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Uplin API",
        version = "0.1.0",
        description = "Accounts, plans, credit and consultancy-hour balances, searches and consultations",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        auth_handler::register,
        auth_handler::login,
        auth_handler::logout,
        auth_handler::check,
        auth_handler::change_password,
        auth_handler::forgot_password,
        auth_handler::validate_token,
        auth_handler::reset_password,
        user_handler::get_profile,
        user_handler::update_profile,
        user_handler::list_users,
        user_handler::get_user,
        user_handler::update_user,
        user_handler::enable_user,
        user_handler::disable_user,
        plan_handler::list_plans,
        plan_handler::get_plan,
        plan_handler::create_plan,
        plan_handler::update_plan,
        plan_handler::disable_plan,
        plan_handler::enable_plan,
        plan_handler::renew_plan,
        plan_handler::list_plan_purchases,
        plan_handler::get_plan_purchase,
        plan_handler::create_plan_purchase,
        plan_handler::update_plan_purchase,
        plan_handler::delete_plan_purchase,
        credit_handler::own_buckets,
        credit_handler::list_buckets,
        credit_handler::get_bucket,
        credit_handler::create_bucket,
        credit_handler::update_bucket,
        credit_handler::delete_bucket,
        credit_handler::own_credit_purchases,
        credit_handler::list_credit_purchases,
        credit_handler::get_credit_purchase,
        credit_handler::purchase_credits,
        credit_handler::update_credit_purchase,
        credit_handler::delete_credit_purchase,
        hour_handler::own_pool,
        hour_handler::list_pools,
        hour_handler::get_pool,
        hour_handler::create_pool,
        hour_handler::update_pool,
        hour_handler::delete_pool,
        consultation_handler::create_consultation,
        consultation_handler::own_consultations,
        consultation_handler::list_consultations,
        consultation_handler::get_consultation,
        consultation_handler::update_consultation,
        consultation_handler::delete_consultation,
        search_handler::create_search,
        search_handler::own_searches,
        search_handler::list_searches,
        search_handler::get_search,
        search_handler::update_search,
        search_handler::delete_search,
        company_handler::own_company,
        company_handler::update_own_company,
        company_handler::list_companies,
        company_handler::get_company,
        company_handler::create_company,
        company_handler::update_company,
        company_handler::disable_company,
        company_handler::enable_company,
        company_handler::unlink_company,
    ),
    components(
        schemas(
            // Accounts
            UserRole,
            UserResponse,
            UserPatch,
            ProfilePatch,
            UserProfile,
            Session,
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            auth_handler::PasswordRequest,
            auth_handler::ForgotPasswordRequest,
            auth_handler::ResetTokenRequest,
            auth_handler::ResetPasswordRequest,
            // Plans
            Plan,
            CreatePlan,
            PlanPatch,
            PlanAssignment,
            PlanPurchase,
            CreatePlanPurchase,
            PlanPurchasePatch,
            // Ledger
            CreditKind,
            CreditBucket,
            CreditBucketDetail,
            CreateCreditBucket,
            CreditBucketPatch,
            CreditPurchase,
            CreateCreditPurchase,
            CreditPurchasePatch,
            CreditPurchaseReceipt,
            HourPool,
            HourPoolDetail,
            CreateHourPool,
            HourPoolPatch,
            // Requests
            RequestState,
            Search,
            CreateSearch,
            SearchPatch,
            Consultation,
            CreateConsultation,
            ConsultationPatch,
            // Companies
            Company,
            CreateCompany,
            CompanyPatch,
            PaginationMeta,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, sessions and password recovery"),
        (name = "Users", description = "Profiles and account administration"),
        (name = "Plans", description = "Plan catalogue and renewals"),
        (name = "Plan purchases", description = "Plan sale records"),
        (name = "Credits", description = "Credit buckets"),
        (name = "Credit purchases", description = "Additional credit sales"),
        (name = "Hour pools", description = "Consultancy hour pools"),
        (name = "Consultations", description = "Consultations booked against hour pools"),
        (name = "Searches", description = "Searches paid with credits"),
        (name = "Companies", description = "Client companies")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "JWT from /api/auth/login; the `token` cookie is accepted as well",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_ledger_routes_and_bearer_scheme() {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key("/api/busquedas/{id}"));
        assert!(doc.paths.paths.contains_key("/api/compra-creditos"));
        assert!(doc.paths.paths.contains_key("/api/planes/renew/{user_id}"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.schemas.contains_key("CreditBucketDetail"));
        // Debit steps stay internal to the ledger walk.
        assert!(!components.schemas.contains_key("BucketDebit"));
    }
}
