use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::dsl::max;
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::band_members::{BandMemberEntity, InsertBandMemberEntity};
use crate::domain::repositories::band_memberships::BandMembershipRepository;
use crate::domain::value_objects::enums::{
    membership_roles::MembershipRole, membership_statuses::MembershipStatus,
};
use crate::infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::band_members};

pub struct BandMembershipPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl BandMembershipPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl BandMembershipRepository for BandMembershipPostgres {
    async fn find_membership(
        &self,
        band_id: Uuid,
        profile_id: Uuid,
    ) -> Result<Option<BandMemberEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let membership = band_members::table
            .filter(band_members::band_id.eq(band_id))
            .filter(band_members::profile_id.eq(profile_id))
            .select(BandMemberEntity::as_select())
            .first::<BandMemberEntity>(&mut conn)
            .optional()?;

        Ok(membership)
    }

    async fn find_membership_by_id(
        &self,
        band_id: Uuid,
        membership_id: Uuid,
    ) -> Result<Option<BandMemberEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let membership = band_members::table
            .filter(band_members::id.eq(membership_id))
            .filter(band_members::band_id.eq(band_id))
            .select(BandMemberEntity::as_select())
            .first::<BandMemberEntity>(&mut conn)
            .optional()?;

        Ok(membership)
    }

    async fn find_approved_leader(&self, band_id: Uuid) -> Result<Option<BandMemberEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let leader = band_members::table
            .filter(band_members::band_id.eq(band_id))
            .filter(band_members::role.eq(MembershipRole::Leader.to_string()))
            .filter(band_members::status.eq(MembershipStatus::Approved.to_string()))
            .select(BandMemberEntity::as_select())
            .first::<BandMemberEntity>(&mut conn)
            .optional()?;

        Ok(leader)
    }

    async fn insert_member(&self, entity: InsertBandMemberEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let membership_id = insert_into(band_members::table)
            .values(&entity)
            .returning(band_members::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(membership_id)
    }

    async fn next_display_order(&self, band_id: Uuid) -> Result<i32> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let highest = band_members::table
            .filter(band_members::band_id.eq(band_id))
            .select(max(band_members::display_order))
            .first::<Option<i32>>(&mut conn)?;

        Ok(highest.unwrap_or(0) + 1)
    }

    async fn transition_status(
        &self,
        membership_id: Uuid,
        from: MembershipStatus,
        to: MembershipStatus,
    ) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = update(band_members::table)
            .filter(band_members::id.eq(membership_id))
            .filter(band_members::status.eq(from.to_string()))
            .set((
                band_members::status.eq(to.to_string()),
                band_members::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(affected)
    }

    async fn list_members(
        &self,
        band_id: Uuid,
        statuses: Vec<MembershipStatus>,
    ) -> Result<Vec<BandMemberEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let statuses = statuses
            .into_iter()
            .map(|status| status.to_string())
            .collect::<Vec<_>>();

        let members = band_members::table
            .filter(band_members::band_id.eq(band_id))
            .filter(band_members::status.eq_any(statuses))
            .order((
                band_members::display_order.asc(),
                band_members::created_at.asc(),
            ))
            .select(BandMemberEntity::as_select())
            .load::<BandMemberEntity>(&mut conn)?;

        Ok(members)
    }
}
