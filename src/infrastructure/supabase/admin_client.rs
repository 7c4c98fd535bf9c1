use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use tracing::error;
use uuid::Uuid;

use crate::domain::repositories::auth_admin::AuthAdminGateway;

/// Thin client for the Supabase Auth admin API (service-role key).
/// https://supabase.com/docs/reference/api/auth-admin
pub struct SupabaseAdminClient {
    http: reqwest::Client,
    project_url: String,
    service_role_key: String,
}

impl SupabaseAdminClient {
    pub fn new(project_url: String, service_role_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            project_url: project_url.trim_end_matches('/').to_string(),
            service_role_key,
        }
    }
}

#[async_trait]
impl AuthAdminGateway for SupabaseAdminClient {
    async fn delete_auth_user(&self, user_id: Uuid) -> Result<()> {
        let resp = self
            .http
            .delete(format!(
                "{}/auth/v1/admin/users/{}",
                self.project_url, user_id
            ))
            .header(AUTHORIZATION, format!("Bearer {}", self.service_role_key))
            .header("apikey", self.service_role_key.clone())
            .send()
            .await?;

        if resp.status().is_success() {
            return Ok(());
        }

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        error!(
            %user_id,
            status = %status,
            response_body = %body,
            "supabase admin: delete auth user failed"
        );

        anyhow::bail!("Supabase auth user deletion failed (status {})", status)
    }
}
