pub mod rest_company_repo;
pub mod rest_conversation_repo;
pub mod rest_file_repo;
pub mod rest_integration_store;
pub mod rest_subscription_repo;
pub mod rest_tag_repo;
pub mod rest_team_repo;
pub mod rest_usage_repo;
