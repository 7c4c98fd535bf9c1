use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::entities::band_members::{BandMemberEntity, InsertBandMemberEntity};
use crate::domain::repositories::band_memberships::BandMembershipRepository;
use crate::domain::repositories::notifications::MembershipNotifier;
use crate::domain::value_objects::band_memberships::{
    BandMemberDto, InviteMemberModel, JoinRequestModel, ViewerMembership, ViewerMembershipDto,
};
use crate::domain::value_objects::enums::{
    membership_roles::MembershipRole, membership_statuses::MembershipStatus,
};

#[derive(Debug, Error)]
pub enum MembershipError {
    #[error("name is required")]
    MissingName,
    #[error("at least one instrument is required")]
    MissingInstrument,
    #[error("a membership for this profile already exists")]
    AlreadyExists,
    #[error("only the band leader can manage memberships")]
    NotBandLeader,
    #[error("membership not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl MembershipError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            MembershipError::MissingName | MembershipError::MissingInstrument => {
                StatusCode::BAD_REQUEST
            }
            MembershipError::AlreadyExists => StatusCode::CONFLICT,
            MembershipError::NotBandLeader => StatusCode::FORBIDDEN,
            MembershipError::NotFound => StatusCode::NOT_FOUND,
            MembershipError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, MembershipError>;

/// Join-request / invitation state machine:
/// `none -> pending -> approved | rejected` for self requests, and
/// `invited -> approved | rejected` for leader invitations. The leader
/// resolves pending rows; the invitee resolves their own invitation.
pub struct BandMembershipUseCase<M, N>
where
    M: BandMembershipRepository + Send + Sync + 'static,
    N: MembershipNotifier + Send + Sync + 'static,
{
    membership_repo: Arc<M>,
    notifier: Option<Arc<N>>,
}

impl<M, N> BandMembershipUseCase<M, N>
where
    M: BandMembershipRepository + Send + Sync + 'static,
    N: MembershipNotifier + Send + Sync + 'static,
{
    pub fn new(membership_repo: Arc<M>, notifier: Option<Arc<N>>) -> Self {
        Self {
            membership_repo,
            notifier,
        }
    }

    pub async fn request_to_join(
        &self,
        user_id: Uuid,
        band_id: Uuid,
        model: JoinRequestModel,
    ) -> UseCaseResult<Uuid> {
        info!(%user_id, %band_id, "band_memberships: join request received");

        let name = model.name.trim().to_string();
        if name.is_empty() {
            let err = MembershipError::MissingName;
            warn!(
                %user_id,
                %band_id,
                status = err.status_code().as_u16(),
                "band_memberships: join request without a name"
            );
            return Err(err);
        }

        let instruments = model
            .instruments
            .iter()
            .map(|instrument| instrument.trim())
            .filter(|instrument| !instrument.is_empty())
            .map(|instrument| instrument.to_string())
            .collect::<Vec<_>>();
        if instruments.is_empty() {
            let err = MembershipError::MissingInstrument;
            warn!(
                %user_id,
                %band_id,
                status = err.status_code().as_u16(),
                "band_memberships: join request without instruments"
            );
            return Err(err);
        }

        if self.find_membership(band_id, user_id).await?.is_some() {
            let err = MembershipError::AlreadyExists;
            warn!(
                %user_id,
                %band_id,
                status = err.status_code().as_u16(),
                "band_memberships: duplicate join request"
            );
            return Err(err);
        }

        let display_order = self
            .membership_repo
            .next_display_order(band_id)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %band_id,
                    db_error = ?err,
                    "band_memberships: failed to compute display order"
                );
                MembershipError::Internal(err)
            })?;

        let now = Utc::now();
        let membership_id = self
            .membership_repo
            .insert_member(InsertBandMemberEntity {
                band_id,
                profile_id: user_id,
                name: name.clone(),
                instrument: instruments.join(", "),
                role: MembershipRole::Member.to_string(),
                status: MembershipStatus::Pending.to_string(),
                display_order,
                created_at: now,
                updated_at: now,
            })
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %band_id,
                    db_error = ?err,
                    "band_memberships: failed to insert join request"
                );
                MembershipError::Internal(err)
            })?;

        // Best effort only: a lost notification must never fail the request.
        if let Some(notifier) = self.notifier.as_ref() {
            if let Err(err) = notifier
                .notify_join_request(band_id, name, instruments)
                .await
            {
                warn!(
                    %user_id,
                    %band_id,
                    error = %err,
                    "band_memberships: leader notification failed"
                );
            }
        }

        info!(
            %user_id,
            %band_id,
            %membership_id,
            "band_memberships: join request created"
        );

        Ok(membership_id)
    }

    pub async fn invite_member(
        &self,
        leader_id: Uuid,
        band_id: Uuid,
        model: InviteMemberModel,
    ) -> UseCaseResult<Uuid> {
        info!(
            %leader_id,
            %band_id,
            invitee = %model.profile_id,
            "band_memberships: invite requested"
        );

        self.ensure_band_leader(band_id, leader_id).await?;

        let name = model.name.trim().to_string();
        if name.is_empty() {
            return Err(MembershipError::MissingName);
        }
        let instrument = model.instrument.trim().to_string();
        if instrument.is_empty() {
            return Err(MembershipError::MissingInstrument);
        }

        if self
            .find_membership(band_id, model.profile_id)
            .await?
            .is_some()
        {
            let err = MembershipError::AlreadyExists;
            warn!(
                %band_id,
                invitee = %model.profile_id,
                status = err.status_code().as_u16(),
                "band_memberships: invitee already has a membership row"
            );
            return Err(err);
        }

        let display_order = self
            .membership_repo
            .next_display_order(band_id)
            .await
            .map_err(MembershipError::Internal)?;

        let now = Utc::now();
        let membership_id = self
            .membership_repo
            .insert_member(InsertBandMemberEntity {
                band_id,
                profile_id: model.profile_id,
                name,
                instrument,
                role: MembershipRole::Member.to_string(),
                status: MembershipStatus::Invited.to_string(),
                display_order,
                created_at: now,
                updated_at: now,
            })
            .await
            .map_err(|err| {
                error!(
                    %band_id,
                    invitee = %model.profile_id,
                    db_error = ?err,
                    "band_memberships: failed to insert invitation"
                );
                MembershipError::Internal(err)
            })?;

        info!(%band_id, %membership_id, "band_memberships: invitation created");
        Ok(membership_id)
    }

    pub async fn approve_join_request(
        &self,
        leader_id: Uuid,
        band_id: Uuid,
        membership_id: Uuid,
    ) -> UseCaseResult<()> {
        self.resolve_join_request(leader_id, band_id, membership_id, MembershipStatus::Approved)
            .await
    }

    pub async fn decline_join_request(
        &self,
        leader_id: Uuid,
        band_id: Uuid,
        membership_id: Uuid,
    ) -> UseCaseResult<()> {
        self.resolve_join_request(leader_id, band_id, membership_id, MembershipStatus::Rejected)
            .await
    }

    pub async fn accept_invitation(&self, user_id: Uuid, band_id: Uuid) -> UseCaseResult<()> {
        self.resolve_invitation(user_id, band_id, MembershipStatus::Approved)
            .await
    }

    pub async fn decline_invitation(&self, user_id: Uuid, band_id: Uuid) -> UseCaseResult<()> {
        self.resolve_invitation(user_id, band_id, MembershipStatus::Rejected)
            .await
    }

    /// Approved members for everyone; the leader also sees pending requests
    /// and open invitations for the management dashboard.
    pub async fn list_members(
        &self,
        band_id: Uuid,
        viewer_id: Option<Uuid>,
    ) -> UseCaseResult<Vec<BandMemberDto>> {
        let mut statuses = vec![MembershipStatus::Approved];

        if let Some(viewer_id) = viewer_id {
            let viewer = self.find_membership(band_id, viewer_id).await?;
            if viewer.is_some_and(|viewer| Self::is_approved_leader(&viewer)) {
                statuses.push(MembershipStatus::Pending);
                statuses.push(MembershipStatus::Invited);
            }
        }

        let members = self
            .membership_repo
            .list_members(band_id, statuses)
            .await
            .map_err(|err| {
                error!(
                    %band_id,
                    db_error = ?err,
                    "band_memberships: failed to list members"
                );
                MembershipError::Internal(err)
            })?;

        Ok(members.into_iter().map(BandMemberDto::from).collect())
    }

    pub async fn membership_status(
        &self,
        band_id: Uuid,
        viewer_id: Uuid,
    ) -> UseCaseResult<ViewerMembershipDto> {
        let membership = self.find_membership(band_id, viewer_id).await?;

        let status = membership
            .as_ref()
            .map(ViewerMembership::from_membership)
            .unwrap_or(ViewerMembership::None);

        Ok(ViewerMembershipDto { status })
    }

    async fn resolve_join_request(
        &self,
        leader_id: Uuid,
        band_id: Uuid,
        membership_id: Uuid,
        to: MembershipStatus,
    ) -> UseCaseResult<()> {
        info!(
            %leader_id,
            %band_id,
            %membership_id,
            to = %to,
            "band_memberships: resolving join request"
        );

        self.ensure_band_leader(band_id, leader_id).await?;

        let membership = self
            .membership_repo
            .find_membership_by_id(band_id, membership_id)
            .await
            .map_err(MembershipError::Internal)?
            .ok_or(MembershipError::NotFound)?;

        if MembershipStatus::from_str(&membership.status) != Some(MembershipStatus::Pending) {
            let err = MembershipError::NotFound;
            warn!(
                %band_id,
                %membership_id,
                current_status = %membership.status,
                status = err.status_code().as_u16(),
                "band_memberships: join request is not pending"
            );
            return Err(err);
        }

        self.transition(membership_id, MembershipStatus::Pending, to)
            .await
    }

    async fn resolve_invitation(
        &self,
        user_id: Uuid,
        band_id: Uuid,
        to: MembershipStatus,
    ) -> UseCaseResult<()> {
        info!(%user_id, %band_id, to = %to, "band_memberships: resolving invitation");

        let membership = self
            .find_membership(band_id, user_id)
            .await?
            .ok_or(MembershipError::NotFound)?;

        if MembershipStatus::from_str(&membership.status) != Some(MembershipStatus::Invited) {
            let err = MembershipError::NotFound;
            warn!(
                %user_id,
                %band_id,
                current_status = %membership.status,
                status = err.status_code().as_u16(),
                "band_memberships: no open invitation to resolve"
            );
            return Err(err);
        }

        self.transition(membership.id, MembershipStatus::Invited, to)
            .await
    }

    async fn transition(
        &self,
        membership_id: Uuid,
        from: MembershipStatus,
        to: MembershipStatus,
    ) -> UseCaseResult<()> {
        let affected = self
            .membership_repo
            .transition_status(membership_id, from, to)
            .await
            .map_err(|err| {
                error!(
                    %membership_id,
                    from = %from,
                    to = %to,
                    db_error = ?err,
                    "band_memberships: status transition failed"
                );
                MembershipError::Internal(err)
            })?;

        if affected == 0 {
            // Raced with another decision; the row already left `from`.
            warn!(
                %membership_id,
                from = %from,
                to = %to,
                "band_memberships: transition found no matching row"
            );
            return Err(MembershipError::NotFound);
        }

        info!(%membership_id, from = %from, to = %to, "band_memberships: status updated");
        Ok(())
    }

    async fn ensure_band_leader(&self, band_id: Uuid, user_id: Uuid) -> UseCaseResult<()> {
        let membership = self.find_membership(band_id, user_id).await?;

        if !membership.is_some_and(|membership| Self::is_approved_leader(&membership)) {
            let err = MembershipError::NotBandLeader;
            warn!(
                %user_id,
                %band_id,
                status = err.status_code().as_u16(),
                "band_memberships: caller is not the approved band leader"
            );
            return Err(err);
        }

        Ok(())
    }

    async fn find_membership(
        &self,
        band_id: Uuid,
        profile_id: Uuid,
    ) -> UseCaseResult<Option<BandMemberEntity>> {
        self.membership_repo
            .find_membership(band_id, profile_id)
            .await
            .map_err(|err| {
                error!(
                    %band_id,
                    %profile_id,
                    db_error = ?err,
                    "band_memberships: failed to load membership"
                );
                MembershipError::Internal(err)
            })
    }

    fn is_approved_leader(membership: &BandMemberEntity) -> bool {
        MembershipRole::from_str(&membership.role) == Some(MembershipRole::Leader)
            && MembershipStatus::from_str(&membership.status) == Some(MembershipStatus::Approved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::band_memberships::MockBandMembershipRepository;
    use crate::domain::repositories::notifications::MockMembershipNotifier;
    use mockall::predicate::eq;

    fn membership(
        band_id: Uuid,
        profile_id: Uuid,
        role: &str,
        status: &str,
    ) -> BandMemberEntity {
        let now = Utc::now();
        BandMemberEntity {
            id: Uuid::new_v4(),
            band_id,
            profile_id,
            name: "Astrid".to_string(),
            instrument: "drums".to_string(),
            role: role.to_string(),
            status: status.to_string(),
            display_order: 1,
            created_at: now,
            updated_at: now,
        }
    }

    fn usecase(
        membership_repo: MockBandMembershipRepository,
        notifier: Option<MockMembershipNotifier>,
    ) -> BandMembershipUseCase<MockBandMembershipRepository, MockMembershipNotifier> {
        BandMembershipUseCase::new(Arc::new(membership_repo), notifier.map(Arc::new))
    }

    fn join_request() -> JoinRequestModel {
        JoinRequestModel {
            name: "Astrid".to_string(),
            instruments: vec!["drums".to_string(), "vocals".to_string()],
        }
    }

    #[tokio::test]
    async fn join_request_requires_an_instrument() {
        let usecase = usecase(MockBandMembershipRepository::new(), None);

        let err = usecase
            .request_to_join(
                Uuid::new_v4(),
                Uuid::new_v4(),
                JoinRequestModel {
                    name: "Astrid".to_string(),
                    instruments: vec!["   ".to_string()],
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, MembershipError::MissingInstrument));
        assert_eq!(err.status_code().as_u16(), 400);
    }

    #[tokio::test]
    async fn join_request_inserts_one_pending_row_and_notifies() {
        let band_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        let mut membership_repo = MockBandMembershipRepository::new();
        membership_repo
            .expect_find_membership()
            .with(eq(band_id), eq(user_id))
            .returning(|_, _| Box::pin(async { Ok(None) }));
        membership_repo
            .expect_next_display_order()
            .returning(|_| Box::pin(async { Ok(3) }));
        membership_repo
            .expect_insert_member()
            .withf(move |entity| {
                entity.band_id == band_id
                    && entity.profile_id == user_id
                    && entity.status == "pending"
                    && entity.role == "member"
                    && entity.instrument == "drums, vocals"
                    && entity.display_order == 3
            })
            .times(1)
            .returning(|_| Box::pin(async { Ok(Uuid::new_v4()) }));

        let mut notifier = MockMembershipNotifier::new();
        notifier
            .expect_notify_join_request()
            .times(1)
            .returning(|_, _, _| Box::pin(async { Ok(()) }));

        let usecase = usecase(membership_repo, Some(notifier));

        usecase
            .request_to_join(user_id, band_id, join_request())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn duplicate_join_request_is_a_conflict() {
        let band_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        let mut membership_repo = MockBandMembershipRepository::new();
        membership_repo
            .expect_find_membership()
            .returning(|band_id, profile_id| {
                Box::pin(async move {
                    Ok(Some(membership(band_id, profile_id, "member", "pending")))
                })
            });

        let usecase = usecase(membership_repo, None);

        let err = usecase
            .request_to_join(user_id, band_id, join_request())
            .await
            .unwrap_err();

        assert!(matches!(err, MembershipError::AlreadyExists));
        assert_eq!(err.status_code().as_u16(), 409);
    }

    #[tokio::test]
    async fn notification_failure_is_swallowed() {
        let mut membership_repo = MockBandMembershipRepository::new();
        membership_repo
            .expect_find_membership()
            .returning(|_, _| Box::pin(async { Ok(None) }));
        membership_repo
            .expect_next_display_order()
            .returning(|_| Box::pin(async { Ok(1) }));
        membership_repo
            .expect_insert_member()
            .returning(|_| Box::pin(async { Ok(Uuid::new_v4()) }));

        let mut notifier = MockMembershipNotifier::new();
        notifier
            .expect_notify_join_request()
            .returning(|_, _, _| Box::pin(async { Err(anyhow::anyhow!("webhook timed out")) }));

        let usecase = usecase(membership_repo, Some(notifier));

        usecase
            .request_to_join(Uuid::new_v4(), Uuid::new_v4(), join_request())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn non_leader_cannot_invite() {
        let band_id = Uuid::new_v4();
        let caller = Uuid::new_v4();

        let mut membership_repo = MockBandMembershipRepository::new();
        membership_repo
            .expect_find_membership()
            .with(eq(band_id), eq(caller))
            .returning(|band_id, profile_id| {
                Box::pin(async move {
                    Ok(Some(membership(band_id, profile_id, "member", "approved")))
                })
            });

        let usecase = usecase(membership_repo, None);

        let err = usecase
            .invite_member(
                caller,
                band_id,
                InviteMemberModel {
                    profile_id: Uuid::new_v4(),
                    name: "Erik".to_string(),
                    instrument: "bass".to_string(),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, MembershipError::NotBandLeader));
        assert_eq!(err.status_code().as_u16(), 403);
    }

    #[tokio::test]
    async fn leader_approves_a_pending_request() {
        let band_id = Uuid::new_v4();
        let leader_id = Uuid::new_v4();
        let membership_id = Uuid::new_v4();

        let mut membership_repo = MockBandMembershipRepository::new();
        membership_repo
            .expect_find_membership()
            .with(eq(band_id), eq(leader_id))
            .returning(|band_id, profile_id| {
                Box::pin(async move {
                    Ok(Some(membership(band_id, profile_id, "leader", "approved")))
                })
            });
        membership_repo
            .expect_find_membership_by_id()
            .with(eq(band_id), eq(membership_id))
            .returning(move |band_id, membership_id| {
                Box::pin(async move {
                    let mut found = membership(band_id, Uuid::new_v4(), "member", "pending");
                    found.id = membership_id;
                    Ok(Some(found))
                })
            });
        membership_repo
            .expect_transition_status()
            .with(
                eq(membership_id),
                eq(MembershipStatus::Pending),
                eq(MembershipStatus::Approved),
            )
            .returning(|_, _, _| Box::pin(async { Ok(1) }));

        let usecase = usecase(membership_repo, None);

        usecase
            .approve_join_request(leader_id, band_id, membership_id)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn resolved_request_cannot_be_approved_again() {
        let band_id = Uuid::new_v4();
        let leader_id = Uuid::new_v4();
        let membership_id = Uuid::new_v4();

        let mut membership_repo = MockBandMembershipRepository::new();
        membership_repo
            .expect_find_membership()
            .returning(|band_id, profile_id| {
                Box::pin(async move {
                    Ok(Some(membership(band_id, profile_id, "leader", "approved")))
                })
            });
        membership_repo
            .expect_find_membership_by_id()
            .returning(|band_id, membership_id| {
                Box::pin(async move {
                    let mut found = membership(band_id, Uuid::new_v4(), "member", "approved");
                    found.id = membership_id;
                    Ok(Some(found))
                })
            });

        let usecase = usecase(membership_repo, None);

        let err = usecase
            .approve_join_request(leader_id, band_id, membership_id)
            .await
            .unwrap_err();

        assert!(matches!(err, MembershipError::NotFound));
        assert_eq!(err.status_code().as_u16(), 404);
    }

    #[tokio::test]
    async fn invitee_accepts_their_invitation() {
        let band_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        let mut membership_repo = MockBandMembershipRepository::new();
        membership_repo
            .expect_find_membership()
            .with(eq(band_id), eq(user_id))
            .returning(|band_id, profile_id| {
                Box::pin(async move {
                    Ok(Some(membership(band_id, profile_id, "member", "invited")))
                })
            });
        membership_repo
            .expect_transition_status()
            .with(
                mockall::predicate::always(),
                eq(MembershipStatus::Invited),
                eq(MembershipStatus::Approved),
            )
            .returning(|_, _, _| Box::pin(async { Ok(1) }));

        let usecase = usecase(membership_repo, None);

        usecase.accept_invitation(user_id, band_id).await.unwrap();
    }

    #[tokio::test]
    async fn viewer_status_maps_the_leader_row() {
        let band_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        let mut membership_repo = MockBandMembershipRepository::new();
        membership_repo
            .expect_find_membership()
            .returning(|band_id, profile_id| {
                Box::pin(async move {
                    Ok(Some(membership(band_id, profile_id, "leader", "approved")))
                })
            });

        let usecase = usecase(membership_repo, None);

        let dto = usecase.membership_status(band_id, user_id).await.unwrap();
        assert_eq!(dto.status, ViewerMembership::Leader);
    }

    #[tokio::test]
    async fn viewer_status_defaults_to_none() {
        let mut membership_repo = MockBandMembershipRepository::new();
        membership_repo
            .expect_find_membership()
            .returning(|_, _| Box::pin(async { Ok(None) }));

        let usecase = usecase(membership_repo, None);

        let dto = usecase
            .membership_status(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(dto.status, ViewerMembership::None);
    }
}
