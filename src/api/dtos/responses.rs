use serde::Serialize;

use crate::domain::models::tenant::{Company, MemberRole};
use crate::domain::models::user::Principal;
use crate::domain::services::session::{DashboardSession, TenantState};

#[derive(Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TenantView {
    NoCompany,
    Active { company: Company, role: MemberRole },
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub success: bool,
    pub principal: Principal,
    #[serde(flatten)]
    pub tenant: TenantView,
}

impl SessionResponse {
    pub async fn from_session(session: &DashboardSession) -> Self {
        let tenant = match session.tenant().await {
            TenantState::NoCompany => TenantView::NoCompany,
            TenantState::Active(ctx) => TenantView::Active {
                company: ctx.company.clone(),
                role: ctx.membership.role,
            },
        };
        Self {
            success: true,
            principal: session.principal.clone(),
            tenant,
        }
    }
}
