use super::*;

impl PostgresProjectRepository {
    pub(super) async fn insert_client_impl(&self, client: Client) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO clients (id, name, link, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(client.id().as_uuid())
        .bind(client.name())
        .bind(client.link().as_uuid())
        .bind(client.created_at())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            conflict_or_internal(error, "insert client", "client link already exists")
        })?;

        Ok(())
    }

    pub(super) async fn find_client_impl(&self, client_id: ClientId) -> AppResult<Option<Client>> {
        let row = sqlx::query_as::<_, ClientRow>(
            r#"
            SELECT id, name, link, created_at
            FROM clients
            WHERE id = $1
            "#,
        )
        .bind(client_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find client: {error}")))?;

        row.map(Client::try_from).transpose()
    }

    pub(super) async fn find_client_by_link_impl(
        &self,
        link: ClientLink,
    ) -> AppResult<Option<Client>> {
        let row = sqlx::query_as::<_, ClientRow>(
            r#"
            SELECT id, name, link, created_at
            FROM clients
            WHERE link = $1
            "#,
        )
        .bind(link.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find client by link: {error}")))?;

        row.map(Client::try_from).transpose()
    }

    pub(super) async fn list_clients_impl(&self) -> AppResult<Vec<Client>> {
        sqlx::query_as::<_, ClientRow>(
            r#"
            SELECT id, name, link, created_at
            FROM clients
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list clients: {error}")))?
        .into_iter()
        .map(Client::try_from)
        .collect()
    }
}
