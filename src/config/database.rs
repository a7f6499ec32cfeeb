use crate::domain::{
    analysis::entity::investor_pitch,
    daftar::entity::{daftar, daftar_investor},
    notification::entity::{notification, notification_delivery},
    offer::entity::offer,
    pitch::entity::{pitch, pitch_answer, pitch_document, pitch_team},
    scout::entity::{daftar_scout, scout, scout_question},
    user::entity::user,
};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Schema, Statement};
use std::env;
use tracing::info;

pub async fn establish_connection(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;
    info!("Successfully connected to the database.");

    let should_update_schema = env::var("DB_SCHEMA_UPDATE")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or_else(|_| {
            tracing::warn!(
                "Invalid DB_SCHEMA_UPDATE value, defaulting to false. Use 'true' or 'false'."
            );
            false
        });

    if should_update_schema {
        create_tables(&db).await?;
    } else {
        info!("Skipping database schema synchronization (DB_SCHEMA_UPDATE is not true).");
    }

    Ok(db)
}

async fn create_tables(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    info!("Starting database schema synchronization...");

    // Order matters for foreign keys! (Parent first, then Child)

    // 1. Independent Entities
    create_table_if_not_exists(db, &schema, user::Entity).await?;
    create_table_if_not_exists(db, &schema, daftar::Entity).await?;
    create_table_if_not_exists(db, &schema, scout::Entity).await?;

    // 2. Dependent Entities (Level 1)
    create_table_if_not_exists(db, &schema, daftar_investor::Entity).await?;
    create_table_if_not_exists(db, &schema, daftar_scout::Entity).await?;
    create_table_if_not_exists(db, &schema, scout_question::Entity).await?;
    create_table_if_not_exists(db, &schema, pitch::Entity).await?;
    create_table_if_not_exists(db, &schema, notification::Entity).await?;

    // 3. Dependent Entities (Level 2)
    create_table_if_not_exists(db, &schema, pitch_team::Entity).await?;
    create_table_if_not_exists(db, &schema, pitch_answer::Entity).await?;
    create_table_if_not_exists(db, &schema, pitch_document::Entity).await?;
    create_table_if_not_exists(db, &schema, offer::Entity).await?;
    create_table_if_not_exists(db, &schema, investor_pitch::Entity).await?;
    create_table_if_not_exists(db, &schema, notification_delivery::Entity).await?;

    create_indexes(db).await?;

    info!("Database schema synchronization completed.");
    Ok(())
}

async fn create_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // 피치당 PENDING 오퍼는 하나
    create_index_if_not_exists(
        db,
        IndexSpec::unique("uq_offer_single_pending", "offer", &["pitch_id"])
            .partial("offer_status = 'PENDING'"),
    )
    .await?;
    // 탈퇴하지 않은 사용자 사이에서 이메일은 유일
    create_index_if_not_exists(db, active_email_index()).await?;
    create_index_if_not_exists(
        db,
        IndexSpec::unique(
            "uq_investor_pitch_pair",
            "investor_pitch",
            &["pitch_id", "investor_id"],
        ),
    )
    .await?;
    create_index_if_not_exists(
        db,
        IndexSpec::unique("uq_pitch_team_member", "pitch_team", &["pitch_id", "user_id"]),
    )
    .await?;
    create_index_if_not_exists(
        db,
        IndexSpec::unique(
            "uq_daftar_investor_member",
            "daftar_investor",
            &["daftar_id", "investor_id"],
        ),
    )
    .await?;
    create_index_if_not_exists(
        db,
        IndexSpec::unique("uq_daftar_scout_pair", "daftar_scout", &["daftar_id", "scout_id"]),
    )
    .await?;
    create_index_if_not_exists(
        db,
        IndexSpec::unique(
            "uq_pitch_answer_question",
            "pitch_answer",
            &["pitch_id", "question_id"],
        ),
    )
    .await?;
    // 워커의 due 조회용
    create_index_if_not_exists(
        db,
        IndexSpec::plain(
            "idx_notification_delivery_due",
            "notification_delivery",
            &["status", "next_attempt_at"],
        ),
    )
    .await?;

    Ok(())
}

fn active_email_index() -> IndexSpec<'static> {
    IndexSpec::unique("uq_user_active_email", "users", &["email"]).partial("deleted_on IS NULL")
}

/// `CREATE [UNIQUE] INDEX ... [WHERE ...]` definition
#[derive(Debug, Clone, PartialEq, Eq)]
struct IndexSpec<'a> {
    name: &'a str,
    table: &'a str,
    columns: &'a [&'a str],
    unique: bool,
    predicate: Option<&'a str>,
}

impl<'a> IndexSpec<'a> {
    fn plain(name: &'a str, table: &'a str, columns: &'a [&'a str]) -> Self {
        Self {
            name,
            table,
            columns,
            unique: false,
            predicate: None,
        }
    }

    fn unique(name: &'a str, table: &'a str, columns: &'a [&'a str]) -> Self {
        Self {
            unique: true,
            ..Self::plain(name, table, columns)
        }
    }

    fn partial(self, predicate: &'a str) -> Self {
        Self {
            predicate: Some(predicate),
            ..self
        }
    }

    fn to_sql(&self) -> String {
        let mut sql = format!(
            "CREATE {}INDEX IF NOT EXISTS {} ON {} ({})",
            if self.unique { "UNIQUE " } else { "" },
            self.name,
            self.table,
            self.columns.join(", ")
        );
        if let Some(predicate) = self.predicate {
            sql.push_str(" WHERE ");
            sql.push_str(predicate);
        }
        sql
    }
}

async fn create_index_if_not_exists(
    db: &DatabaseConnection,
    spec: IndexSpec<'_>,
) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let stmt = Statement::from_string(backend, spec.to_sql());
    match db.execute(stmt).await {
        Ok(_) => Ok(()),
        Err(e) => {
            let err_str = e.to_string().to_lowercase();
            if err_str.contains("already exists") {
                Ok(())
            } else {
                tracing::error!("Failed to create index {}: {}", spec.name, e);
                Err(e)
            }
        }
    }
}

async fn create_table_if_not_exists<E>(
    db: &DatabaseConnection,
    schema: &Schema,
    entity: E,
) -> Result<(), DbErr>
where
    E: sea_orm::EntityTrait,
{
    let backend = db.get_database_backend();
    let create_stmt: Statement =
        backend.build(schema.create_table_from_entity(entity).if_not_exists());

    match db.execute(create_stmt).await {
        Ok(_) => Ok(()),
        Err(e) => {
            tracing::error!("Failed to create table: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_unique_index_should_carry_predicate() {
        // Arrange
        let spec = IndexSpec::unique("uq_offer_single_pending", "offer", &["pitch_id"])
            .partial("offer_status = 'PENDING'");

        // Act
        let sql = spec.to_sql();

        // Assert
        assert_eq!(
            sql,
            "CREATE UNIQUE INDEX IF NOT EXISTS uq_offer_single_pending ON offer (pitch_id) \
             WHERE offer_status = 'PENDING'"
        );
    }

    #[test]
    fn active_email_index_should_skip_withdrawn_users() {
        let sql = active_email_index().to_sql();

        assert_eq!(
            sql,
            "CREATE UNIQUE INDEX IF NOT EXISTS uq_user_active_email ON users (email) \
             WHERE deleted_on IS NULL"
        );
    }

    #[test]
    fn plain_index_should_join_columns() {
        let spec = IndexSpec::plain(
            "idx_notification_delivery_due",
            "notification_delivery",
            &["status", "next_attempt_at"],
        );

        assert_eq!(
            spec.to_sql(),
            "CREATE INDEX IF NOT EXISTS idx_notification_delivery_due \
             ON notification_delivery (status, next_attempt_at)"
        );
    }
}
