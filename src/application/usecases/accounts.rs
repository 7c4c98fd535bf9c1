use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::repositories::auth_admin::AuthAdminGateway;
use crate::domain::repositories::profiles::ProfileRepository;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AccountError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        axum::http::StatusCode::INTERNAL_SERVER_ERROR
    }
}

pub type UseCaseResult<T> = std::result::Result<T, AccountError>;

pub struct AccountUseCase<P, A>
where
    P: ProfileRepository + Send + Sync + 'static,
    A: AuthAdminGateway + Send + Sync + 'static,
{
    profile_repo: Arc<P>,
    auth_admin: Arc<A>,
}

impl<P, A> AccountUseCase<P, A>
where
    P: ProfileRepository + Send + Sync + 'static,
    A: AuthAdminGateway + Send + Sync + 'static,
{
    pub fn new(profile_repo: Arc<P>, auth_admin: Arc<A>) -> Self {
        Self {
            profile_repo,
            auth_admin,
        }
    }

    /// Deletes the profile row (the store cascades bands, memberships,
    /// ratings, payments references) and then the auth identity behind it.
    pub async fn delete_account(&self, user_id: Uuid) -> UseCaseResult<()> {
        info!(%user_id, "accounts: account deletion requested");

        let deleted = self
            .profile_repo
            .delete_profile(user_id)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    db_error = ?err,
                    "accounts: failed to delete profile"
                );
                AccountError::Internal(err)
            })?;

        if deleted == 0 {
            // Profile already gone; still remove the auth identity below.
            info!(%user_id, "accounts: no profile row to delete");
        }

        self.auth_admin
            .delete_auth_user(user_id)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    error = ?err,
                    "accounts: profile deleted but auth identity removal failed"
                );
                AccountError::Internal(err)
            })?;

        info!(%user_id, "accounts: account deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::auth_admin::MockAuthAdminGateway;
    use crate::domain::repositories::profiles::MockProfileRepository;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn deletes_profile_and_auth_identity() {
        let user_id = Uuid::new_v4();

        let mut profile_repo = MockProfileRepository::new();
        profile_repo
            .expect_delete_profile()
            .with(eq(user_id))
            .times(1)
            .returning(|_| Box::pin(async { Ok(1) }));

        let mut auth_admin = MockAuthAdminGateway::new();
        auth_admin
            .expect_delete_auth_user()
            .with(eq(user_id))
            .times(1)
            .returning(|_| Box::pin(async { Ok(()) }));

        let usecase = AccountUseCase::new(Arc::new(profile_repo), Arc::new(auth_admin));

        usecase.delete_account(user_id).await.unwrap();
    }

    #[tokio::test]
    async fn auth_identity_failure_surfaces_as_internal() {
        let mut profile_repo = MockProfileRepository::new();
        profile_repo
            .expect_delete_profile()
            .returning(|_| Box::pin(async { Ok(1) }));

        let mut auth_admin = MockAuthAdminGateway::new();
        auth_admin
            .expect_delete_auth_user()
            .returning(|_| Box::pin(async { Err(anyhow::anyhow!("admin api unavailable")) }));

        let usecase = AccountUseCase::new(Arc::new(profile_repo), Arc::new(auth_admin));

        let err = usecase.delete_account(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.status_code().as_u16(), 500);
    }

    #[tokio::test]
    async fn missing_profile_row_still_removes_auth_identity() {
        let mut profile_repo = MockProfileRepository::new();
        profile_repo
            .expect_delete_profile()
            .returning(|_| Box::pin(async { Ok(0) }));

        let mut auth_admin = MockAuthAdminGateway::new();
        auth_admin
            .expect_delete_auth_user()
            .times(1)
            .returning(|_| Box::pin(async { Ok(()) }));

        let usecase = AccountUseCase::new(Arc::new(profile_repo), Arc::new(auth_admin));

        usecase.delete_account(Uuid::new_v4()).await.unwrap();
    }
}
