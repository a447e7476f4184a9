//! Database configuration module for the gym ledger.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs without hand-written SQL. Creation is
//! idempotent, which lets the service start repeatedly against the same database file.

use crate::entities::{Member, Membership, MembershipPlan, Payment, PaymentTransaction, User};
use crate::errors::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema,
};
use tracing::{debug, info, instrument};

/// Default location of the `SQLite` database file.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://gym_ledger.sqlite?mode=rwc";

/// Establishes a connection pool to the database at `database_url`.
///
/// The returned handle is the only store handle in the process; it is passed
/// explicitly to every operation and closed at shutdown.
#[instrument]
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url.to_string());
    options.sqlx_logging(false);
    let db = Database::connect(options).await?;
    info!("Connected to database");
    Ok(db)
}

async fn create_table_for<E, C>(db: &C, entity: E) -> Result<()>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let table = entity.table_name().to_string();
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    debug!(%table, "Table ensured");
    Ok(())
}

/// Creates all necessary database tables using `SeaORM`'s schema generation from entity definitions.
///
/// Parent tables are created before the tables that reference them so foreign keys resolve.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    create_table_for(db, MembershipPlan).await?;
    create_table_for(db, Member).await?;
    create_table_for(db, Membership).await?;
    create_table_for(db, Payment).await?;
    create_table_for(db, PaymentTransaction).await?;
    create_table_for(db, User).await?;
    Ok(())
}

/// Executes a trivial query to confirm the store is reachable.
pub async fn ping(db: &DatabaseConnection) -> Result<()> {
    db.ping().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        MemberModel, MembershipModel, MembershipPlanModel, PaymentModel, PaymentTransactionModel,
        UserModel,
    };
    use sea_orm::QuerySelect;

    #[tokio::test]
    async fn test_create_connection() -> Result<()> {
        // Use in-memory database for testing to avoid touching a real database file
        let db = create_connection("sqlite::memory:").await?;
        create_tables(&db).await?;
        ping(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<MembershipPlanModel> = MembershipPlan::find().limit(1).all(&db).await?;
        let _: Vec<MemberModel> = Member::find().limit(1).all(&db).await?;
        let _: Vec<MembershipModel> = Membership::find().limit(1).all(&db).await?;
        let _: Vec<PaymentModel> = Payment::find().limit(1).all(&db).await?;
        let _: Vec<PaymentTransactionModel> = PaymentTransaction::find().limit(1).all(&db).await?;
        let _: Vec<UserModel> = User::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
