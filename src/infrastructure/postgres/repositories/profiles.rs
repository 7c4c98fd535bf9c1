use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, delete, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::repositories::profiles::ProfileRepository;
use crate::infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::profiles};

pub struct ProfilePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ProfilePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ProfileRepository for ProfilePostgres {
    async fn find_email(&self, profile_id: Uuid) -> Result<Option<String>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let email = profiles::table
            .filter(profiles::id.eq(profile_id))
            .select(profiles::email)
            .first::<Option<String>>(&mut conn)
            .optional()?;

        Ok(email.flatten())
    }

    async fn delete_profile(&self, profile_id: Uuid) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let deleted = delete(profiles::table)
            .filter(profiles::id.eq(profile_id))
            .execute(&mut conn)?;

        Ok(deleted)
    }
}
