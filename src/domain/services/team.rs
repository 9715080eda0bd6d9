use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, instrument};

use crate::domain::models::subscription::UsageField;
use crate::domain::models::tenant::{Invitation, InvitationStatus, MemberRole, Membership};
use crate::domain::models::user::Principal;
use crate::domain::ports::{SubscriptionRepository, TeamRepository, UsageRepository};
use crate::domain::services::{billing::BillingService, entitlements, fetch_guard::Scoped, locks::TenantLocks};
use crate::error::AppError;

#[derive(Debug, Serialize, Clone, Default)]
pub struct TeamRoster {
    pub members: Vec<Membership>,
    pub invitations: Vec<Invitation>,
}

/// Membership management of one company, acting as one member.
pub struct TeamService {
    company_id: String,
    actor: Membership,
    repo: Arc<dyn TeamRepository>,
    billing: Arc<BillingService>,
    roster: Scoped<TeamRoster>,
}

impl TeamService {
    pub fn new(actor: Membership, repo: Arc<dyn TeamRepository>, billing: Arc<BillingService>) -> Self {
        Self {
            company_id: actor.company_id.clone(),
            roster: Scoped::new(actor.company_id.clone(), TeamRoster::default()),
            actor,
            repo,
            billing,
        }
    }

    pub fn roster(&self) -> TeamRoster {
        self.roster.snapshot()
    }

    pub async fn refresh(&self) -> Result<(), AppError> {
        let ticket = self.roster.begin();
        let members = self.repo.list_by_company(&self.company_id).await?;
        let invitations = self
            .repo
            .list_invitations(&self.company_id)
            .await?
            .into_iter()
            .filter(|i| i.status == InvitationStatus::Pending)
            .collect();
        self.roster.commit(&ticket, TeamRoster { members, invitations });
        Ok(())
    }

    fn require_manager(&self) -> Result<(), AppError> {
        if !self.actor.role.can_manage_team() {
            return Err(AppError::Forbidden("Only owners and admins can manage the team".into()));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(company_id = %self.company_id))]
    pub async fn invite(&self, email: &str, role: MemberRole) -> Result<Invitation, AppError> {
        self.require_manager()?;
        if role == MemberRole::Owner {
            return Err(AppError::Validation("A company has exactly one owner".into()));
        }
        let email = email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(AppError::Validation("A valid email is required".into()));
        }

        let pending = self.repo.list_invitations(&self.company_id).await?;
        let now = Utc::now();
        if pending.iter().any(|i| i.is_open(now) && i.email == email) {
            return Err(AppError::Conflict(format!("{} already has a pending invitation", email)));
        }
        let _slot = self.billing.reserve(UsageField::TeamMembers).await?;

        let invitation = self
            .repo
            .create_invitation(&Invitation::new(self.company_id.clone(), email, role))
            .await?;
        info!("Invited {} as {}", invitation.email, invitation.role);
        self.refresh().await?;
        Ok(invitation)
    }

    #[instrument(skip(self), fields(company_id = %self.company_id))]
    pub async fn remove(&self, user_id: &str) -> Result<(), AppError> {
        self.require_manager()?;
        if user_id == self.actor.user_id {
            return Err(AppError::Conflict("Cannot remove yourself".into()));
        }
        let target = self
            .repo
            .list_by_company(&self.company_id)
            .await?
            .into_iter()
            .find(|m| m.user_id == user_id)
            .ok_or_else(|| AppError::NotFound("Member not found".into()))?;
        if target.role == MemberRole::Owner {
            return Err(AppError::Forbidden("The company owner cannot be removed".into()));
        }

        self.repo.delete(&self.company_id, user_id).await?;
        self.billing.record_usage(UsageField::TeamMembers, -1).await?;
        info!("Removed member {}", user_id);
        self.refresh().await
    }
}

/// Joins `principal` to the company that issued `token`.
#[instrument(skip(team, subscriptions, usage, locks, token), fields(user_id = %principal.id))]
pub async fn accept_invitation(
    team: &dyn TeamRepository,
    subscriptions: &dyn SubscriptionRepository,
    usage: &dyn UsageRepository,
    locks: &TenantLocks,
    principal: &Principal,
    token: &str,
) -> Result<Membership, AppError> {
    let invitation = team
        .find_invitation(token)
        .await?
        .ok_or_else(|| AppError::NotFound("Invitation not found".into()))?;
    if !invitation.is_open(Utc::now()) {
        return Err(AppError::Conflict("Invitation is no longer valid".into()));
    }
    if !invitation.email.eq_ignore_ascii_case(&principal.email) {
        return Err(AppError::Forbidden("Invitation was issued to another email".into()));
    }
    if team.find_by_user(&principal.id).await?.is_some() {
        return Err(AppError::Conflict("You already belong to a company".into()));
    }

    let company_id = invitation.company_id.clone();
    let _slot = locks.usage(&company_id, UsageField::TeamMembers).await;
    let subscription = subscriptions
        .find_by_company(&company_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No subscription found for this company".into()))?;
    let current = usage
        .find_by_company(&company_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No usage record found for this company".into()))?;
    entitlements::ensure_capacity(UsageField::TeamMembers, &current, subscription.tier()?)?;

    let membership = team
        .create(&Membership::new(principal.id.clone(), company_id.clone(), invitation.role))
        .await?;
    team.set_invitation_status(&invitation.id, InvitationStatus::Accepted).await?;
    usage.increment(&company_id, UsageField::TeamMembers, 1).await?;

    info!("Invitation {} accepted", invitation.id);
    Ok(membership)
}
