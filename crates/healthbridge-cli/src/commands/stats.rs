//! Platform statistics CLI command.

use healthbridge_core::error::AppError;
use healthbridge_database::repositories::donation::DonationRepository;
use healthbridge_database::repositories::request::RequestRepository;
use healthbridge_database::repositories::user::UserRepository;
use healthbridge_entity::donation::ApprovalStatus;
use healthbridge_entity::user::UserRole;

use crate::output;

/// Print platform-wide counters.
pub async fn execute(env: &str) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let pool = super::create_db_pool(&config).await?;

    let donation_repo = DonationRepository::new(pool.clone());
    let request_repo = RequestRepository::new(pool.clone());
    let user_repo = UserRepository::new(pool);

    println!("HealthBridge statistics:");
    output::print_kv("Donors", &user_repo.count_by_role(UserRole::Donor).await?.to_string());
    output::print_kv(
        "Recipients",
        &user_repo.count_by_role(UserRole::Recipient).await?.to_string(),
    );
    output::print_kv("Donations (total)", &donation_repo.count_all().await?.to_string());
    output::print_kv(
        "Donations (approved)",
        &donation_repo
            .count_by_approval(ApprovalStatus::Approved)
            .await?
            .to_string(),
    );
    output::print_kv(
        "Donations (pending)",
        &donation_repo
            .count_by_approval(ApprovalStatus::Pending)
            .await?
            .to_string(),
    );
    output::print_kv("Requests (total)", &request_repo.count_all().await?.to_string());
    output::print_kv(
        "Requests (approved)",
        &request_repo
            .count_by_approval(ApprovalStatus::Approved)
            .await?
            .to_string(),
    );
    output::print_kv(
        "Requests (pending)",
        &request_repo
            .count_by_approval(ApprovalStatus::Pending)
            .await?
            .to_string(),
    );

    Ok(())
}
