pub mod credentials;
pub mod policy;
pub mod status_sync;
pub mod validation;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, TokenGrant};
pub use auth_service_impl::SeaOrmAuthService;

pub mod user_service;
pub mod user_service_impl;
pub use user_service::{NewUser, PasswordChange, UserError, UserService, UserUpdate, UserWithStats};
pub use user_service_impl::SeaOrmUserService;

pub mod contract_service;
pub mod contract_service_impl;
pub use contract_service::{
    ContractDraft, ContractError, ContractPatch, ContractQuery, ContractService, ContractStats,
    ContractView, StatusCounts,
};
pub use contract_service_impl::SeaOrmContractService;

pub mod company_lookup;
pub use company_lookup::{CompanyInfo, CompanyLookupService, LookupError};
