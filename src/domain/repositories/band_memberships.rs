use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::band_members::{BandMemberEntity, InsertBandMemberEntity};
use crate::domain::value_objects::enums::membership_statuses::MembershipStatus;

#[async_trait]
#[automock]
pub trait BandMembershipRepository {
    async fn find_membership(
        &self,
        band_id: Uuid,
        profile_id: Uuid,
    ) -> Result<Option<BandMemberEntity>>;

    async fn find_membership_by_id(
        &self,
        band_id: Uuid,
        membership_id: Uuid,
    ) -> Result<Option<BandMemberEntity>>;

    async fn find_approved_leader(&self, band_id: Uuid) -> Result<Option<BandMemberEntity>>;

    /// Insert relies on the (band_id, profile_id) unique constraint; a
    /// duplicate surfaces as a database error the usecase maps to conflict.
    async fn insert_member(&self, entity: InsertBandMemberEntity) -> Result<Uuid>;

    async fn next_display_order(&self, band_id: Uuid) -> Result<i32>;

    /// Compare-and-swap `from -> to`; returns the number of rows moved
    /// (0 when the row already left `from`).
    async fn transition_status(
        &self,
        membership_id: Uuid,
        from: MembershipStatus,
        to: MembershipStatus,
    ) -> Result<usize>;

    async fn list_members(
        &self,
        band_id: Uuid,
        statuses: Vec<MembershipStatus>,
    ) -> Result<Vec<BandMemberEntity>>;
}
