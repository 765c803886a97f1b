//! Domain layer - Core business entities and rules
//!
//! Entities, value objects and the pure ledger rules. Nothing here performs I/O;
//! persistence and orchestration live in `infra` and `services`.

pub mod company;
pub mod credit;
pub mod hours;
pub mod ledger;
pub mod password;
pub mod password_reset;
pub mod plan;
pub mod purchase;
pub mod usage;
pub mod user;

pub use company::{Company, CompanyPatch, CreateCompany};
pub use credit::{
    CreateCreditBucket, CreditBucket, CreditBucketDetail, CreditBucketPatch, CreditKind,
    NewCreditBucket,
};
pub use hours::{CreateHourPool, HourPool, HourPoolDetail, HourPoolPatch, NewHourPool};
pub use ledger::BucketDebit;
pub use password::Password;
pub use password_reset::{NewPasswordReset, PasswordReset};
pub use plan::{CreatePlan, Plan, PlanGrant, PlanPatch};
pub use purchase::{
    CreateCreditPurchase, CreatePlanPurchase, CreditPurchase, CreditPurchasePatch, PlanPurchase,
    PlanPurchasePatch,
};
pub use usage::{
    Consultation, ConsultationPatch, CreateConsultation, CreateSearch, NewConsultation, NewSearch,
    RequestState, Search, SearchPatch,
};
pub use user::{Actor, NewUser, ProfilePatch, User, UserPatch, UserResponse, UserRole};
