use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::domain::models::tenant::{Company, Membership};
use crate::domain::ports::{CompanyRepository, TeamRepository};
use crate::error::AppError;

/// Outcome of mapping a principal to its company.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Terminal state: the dashboard renders "not part of any company" and
    /// nothing tenant-scoped is fetched.
    NoCompany,
    Member { company: Company, membership: Membership },
}

pub struct TenantResolver {
    team: Arc<dyn TeamRepository>,
    companies: Arc<dyn CompanyRepository>,
}

impl TenantResolver {
    pub fn new(team: Arc<dyn TeamRepository>, companies: Arc<dyn CompanyRepository>) -> Self {
        Self { team, companies }
    }

    #[instrument(skip(self))]
    pub async fn resolve(&self, principal_id: &str) -> Result<Resolution, AppError> {
        let Some(membership) = self.team.find_by_user(principal_id).await? else {
            debug!("Principal has no membership");
            return Ok(Resolution::NoCompany);
        };

        match self.companies.find_by_id(&membership.company_id).await? {
            Some(company) => Ok(Resolution::Member { company, membership }),
            None => {
                warn!(company_id = %membership.company_id, "Membership points to a missing company");
                Ok(Resolution::NoCompany)
            }
        }
    }
}
