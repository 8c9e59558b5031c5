//! Startup schema bootstrap.

use sea_orm::{ConnectionTrait, DbConn, DbErr, EntityTrait, Schema};

use super::entity::{post, user};

/// Create the `users` and `posts` tables if they are missing.
///
/// Safe to call on every start. There is no versioning: an existing table is
/// left exactly as it is.
pub async fn ensure_schema(db: &DbConn) -> Result<(), DbErr> {
    create_if_missing(db, user::Entity).await?;
    create_if_missing(db, post::Entity).await?;
    tracing::info!("Database schema ready");
    Ok(())
}

async fn create_if_missing<E: EntityTrait>(db: &DbConn, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let mut stmt = Schema::new(backend).create_table_from_entity(entity);
    stmt.if_not_exists();

    db.execute(backend.build(&stmt)).await?;
    tracing::debug!(table = entity.table_name(), "Ensured table exists");
    Ok(())
}
