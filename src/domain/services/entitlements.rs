use crate::domain::models::subscription::{Limits, Tier, Usage, UsageField};
use crate::error::AppError;

pub const FILE_LIMIT_REACHED: &str = "File limit reached for your subscription tier";
pub const MESSAGE_LIMIT_REACHED: &str = "Message limit reached for your subscription tier";
pub const TEAM_LIMIT_REACHED: &str = "Team member limit reached for your subscription tier";

pub fn tier_limits(tier: Tier) -> Limits {
    let (messages_limit, team_members_limit, files_limit) = match tier {
        Tier::Free => (100, 0, 2),
        Tier::Starter => (600, 3, 10),
        Tier::Professional => (2500, 8, 50),
        Tier::Enterprise => (10000, 50, 500),
    };
    Limits { messages_limit, team_members_limit, files_limit }
}

/// Limits for a tier name as stored by the backend. Any name outside the
/// tier table is an invariant violation.
pub fn limits_for_tier(tier: &str) -> Result<Limits, AppError> {
    Ok(tier_limits(tier.parse()?))
}

impl Limits {
    pub fn for_field(&self, field: UsageField) -> i64 {
        match field {
            UsageField::Messages => self.messages_limit,
            UsageField::Files => self.files_limit,
            UsageField::TeamMembers => self.team_members_limit,
        }
    }
}

pub fn limit_reached_message(field: UsageField) -> &'static str {
    match field {
        UsageField::Messages => MESSAGE_LIMIT_REACHED,
        UsageField::Files => FILE_LIMIT_REACHED,
        UsageField::TeamMembers => TEAM_LIMIT_REACHED,
    }
}

/// Fails when consuming one more unit of `field` would exceed the tier ceiling.
pub fn ensure_capacity(field: UsageField, usage: &Usage, tier: Tier) -> Result<(), AppError> {
    if usage.used(field) >= tier.limits().for_field(field) {
        return Err(AppError::LimitReached(limit_reached_message(field).to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_table() {
        let expected = [
            ("free", 100, 0, 2),
            ("starter", 600, 3, 10),
            ("professional", 2500, 8, 50),
            ("enterprise", 10000, 50, 500),
        ];
        for (tier, messages, team, files) in expected {
            let limits = limits_for_tier(tier).unwrap();
            assert_eq!(limits.messages_limit, messages, "{}", tier);
            assert_eq!(limits.team_members_limit, team, "{}", tier);
            assert_eq!(limits.files_limit, files, "{}", tier);
        }
    }

    #[test]
    fn test_unknown_tier_is_invariant_violation() {
        for bad in ["", "Free", "platinum", " free"] {
            let err = limits_for_tier(bad).unwrap_err();
            assert!(matches!(err, AppError::UnknownTier(_)), "{:?}", bad);
            assert!(err.is_invariant_violation());
        }
    }

    #[test]
    fn test_capacity_check() {
        let mut usage = Usage::fresh("c1".into(), Tier::Free.limits());
        usage.files_used = 1;
        assert!(ensure_capacity(UsageField::Files, &usage, Tier::Free).is_ok());

        usage.files_used = 2;
        let err = ensure_capacity(UsageField::Files, &usage, Tier::Free).unwrap_err();
        assert_eq!(err.to_string(), FILE_LIMIT_REACHED);

        assert!(ensure_capacity(UsageField::Files, &usage, Tier::Starter).is_ok());
        assert!(ensure_capacity(UsageField::TeamMembers, &usage, Tier::Free).is_err());
    }
}
