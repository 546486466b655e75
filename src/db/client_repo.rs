// src/db/client_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::client::{Client, ClientFilter, ClientPayload},
};

// Sem estado: a conexão (com RLS) chega em cada chamada.
#[derive(Clone, Default)]
pub struct ClientRepository;

impl ClientRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(&self, executor: E, filter: &ClientFilter) -> Result<Vec<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(contains_pattern);

        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT * FROM clients
            WHERE ($1::BOOLEAN IS NULL OR active = $1)
              AND ($2::TEXT IS NULL OR name ILIKE $2 ESCAPE '\' OR phone ILIKE $2 ESCAPE '\')
            ORDER BY name ASC
            "#,
        )
        .bind(filter.active)
        .bind(search)
        .fetch_all(executor)
        .await?;
        Ok(clients)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(client)
    }

    /// Clientes ativos para o formulário de agendamento.
    pub async fn list_active<'e, E>(&self, executor: E) -> Result<Vec<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let clients = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE active ORDER BY name ASC")
            .fetch_all(executor)
            .await?;
        Ok(clients)
    }

    pub async fn create<'e, E>(&self, executor: E, payload: &ClientPayload) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (name, phone, email, birth_date, notes, active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(payload.name.trim())
        .bind(payload.phone.trim())
        .bind(payload.email.as_deref())
        .bind(payload.birth_date)
        .bind(payload.notes.as_deref())
        .bind(payload.active)
        .fetch_one(executor)
        .await?;
        Ok(client)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &ClientPayload,
    ) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients
            SET name = $2, phone = $3, email = $4, birth_date = $5, notes = $6,
                active = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.name.trim())
        .bind(payload.phone.trim())
        .bind(payload.email.as_deref())
        .bind(payload.birth_date)
        .bind(payload.notes.as_deref())
        .bind(payload.active)
        .fetch_optional(executor)
        .await?;
        Ok(client)
    }

    /// Retorna `false` quando nada foi apagado.
    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// "%" e "_" digitados pelo usuário são literais, não curingas.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_term_wildcards_are_literal() {
        assert_eq!(contains_pattern("Ana"), "%Ana%");
        assert_eq!(contains_pattern("50%"), r"%50\%%");
        assert_eq!(contains_pattern("a_b"), r"%a\_b%");
        assert_eq!(contains_pattern(r"c:\x"), r"%c:\\x%");
    }
}
