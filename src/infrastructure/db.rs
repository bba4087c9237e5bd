use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema};

use crate::models::{activity_log, investment, otp_code, product, transaction, user};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    run_migrations(&db).await?;

    Ok(db)
}

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Parents before children so foreign keys resolve on MySQL
    create_table(db, user::Entity).await?;
    create_table(db, otp_code::Entity).await?;
    create_table(db, product::Entity).await?;
    create_table(db, investment::Entity).await?;
    create_table(db, transaction::Entity).await?;
    create_table(db, activity_log::Entity).await?;

    tracing::debug!("Database schema is up to date");
    Ok(())
}

/// Create the table and its indexes for an entity if they don't exist yet
async fn create_table<E>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut table = schema.create_table_from_entity(entity);
    table.if_not_exists();
    db.execute(backend.build(&table)).await?;

    for mut index in schema.create_index_from_entity(entity) {
        index.if_not_exists();
        db.execute(backend.build(&index)).await?;
    }

    Ok(())
}
