use crate::common::error::AppError;
use crate::config::AppState;
use crate::middleware::auth::AuthenticatedUser;

// ---
// Helper RLS: A "Chave" para o Banco de Dados
// ---
/// Adquire uma conexão da pool e define `app.user_id` para as políticas RLS.
///
/// Cada requisição usa apenas esta conexão. Um resultado vazio é "nenhuma linha",
/// nunca motivo para repetir a consulta com outro cliente.
pub(crate) async fn get_rls_connection(
    app_state: &AppState,
    user: &AuthenticatedUser,
) -> Result<sqlx::pool::PoolConnection<sqlx::Postgres>, AppError> {
    // O operador '?' converte automaticamente sqlx::Error -> AppError::DatabaseError
    let mut conn = app_state.db_pool.acquire().await?;

    // Escopo de sessão: a conexão volta para a pool com o valor, mas toda
    // requisição redefine antes de usar.
    sqlx::query("SELECT set_config('app.user_id', $1, false)")
        .bind(user.0.id.to_string())
        .execute(&mut *conn)
        .await?;

    Ok(conn)
}
