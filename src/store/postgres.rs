use sqlx::{migrate::MigrateError, postgres::PgPoolOptions, Pool, Postgres};

use crate::models::{Entity, Record};

use super::{OrderBy, StoreError};

#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn list<F: Entity>(&self, order: OrderBy) -> Result<Vec<Record<F>>, StoreError> {
        let sql = format!(
            "SELECT * FROM {} ORDER BY {}",
            F::COLLECTION.table(),
            order.clause::<F>()
        );

        let records = sqlx::query_as::<_, Record<F>>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    pub async fn list_where<F: Entity>(
        &self,
        column: &'static str,
        value: &str,
        order: OrderBy,
    ) -> Result<Vec<Record<F>>, StoreError> {
        let sql = format!(
            "SELECT * FROM {} WHERE {} = $1 ORDER BY {}",
            F::COLLECTION.table(),
            column,
            order.clause::<F>()
        );

        let records = sqlx::query_as::<_, Record<F>>(&sql)
            .bind(value)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    pub async fn get<F: Entity>(&self, id: &str) -> Result<Option<Record<F>>, StoreError> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", F::COLLECTION.table());

        let record = sqlx::query_as::<_, Record<F>>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    pub async fn insert<F: Entity>(&self, fields: F) -> Result<Record<F>, StoreError> {
        let sql = insert_sql::<F>();

        let record = fields
            .bind(sqlx::query_as::<_, Record<F>>(&sql))
            .fetch_one(&self.pool)
            .await?;

        Ok(record)
    }

    pub async fn replace<F: Entity>(&self, id: &str, fields: F) -> Result<Option<Record<F>>, StoreError> {
        let sql = update_sql::<F>();

        let record = fields
            .bind(sqlx::query_as::<_, Record<F>>(&sql))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    pub async fn delete<F: Entity>(&self, id: &str) -> Result<(), StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", F::COLLECTION.table());

        sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(())
    }
}

// id and created_at are filled in by column defaults
fn insert_sql<F: Entity>() -> String {
    let placeholders = (1..=F::COLUMNS.len())
        .map(|n| format!("${n}"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
        F::COLLECTION.table(),
        F::COLUMNS.join(", "),
        placeholders
    )
}

fn update_sql<F: Entity>() -> String {
    let assignments = F::COLUMNS
        .iter()
        .enumerate()
        .map(|(n, column)| format!("{column} = ${}", n + 1))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "UPDATE {} SET {} WHERE id = ${} RETURNING *",
        F::COLLECTION.table(),
        assignments,
        F::COLUMNS.len() + 1
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{course::CourseFields, testimonial::TestimonialFields};

    #[test]
    fn insert_statement_binds_every_writable_column() {
        assert_eq!(
            insert_sql::<CourseFields>(),
            "INSERT INTO courses (title, description, duration, instructor_id, image_url, registration_link) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *"
        );
    }

    #[test]
    fn update_statement_puts_the_id_last() {
        assert_eq!(
            update_sql::<TestimonialFields>(),
            "UPDATE testimonials SET name = $1, position = $2, company = $3, content = $4, image_url = $5 \
             WHERE id = $6 RETURNING *"
        );
    }

    #[test]
    fn order_clauses_follow_the_label_column() {
        assert_eq!(OrderBy::Newest.clause::<CourseFields>(), "created_at DESC, seq DESC");
        assert_eq!(OrderBy::Label.clause::<CourseFields>(), "title ASC, seq DESC");
        assert_eq!(OrderBy::Label.clause::<TestimonialFields>(), "name ASC, seq DESC");
    }

    // Runs only when a scratch database is provided.
    #[actix_web::test]
    async fn crud_round_trip_against_postgres() {
        dotenv::dotenv().ok();
        let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
            return;
        };

        let store = PgStore::connect(&database_url, 2).await.expect("Cant connect to the database");
        store.migrate().await.expect("Cant run the migrations");

        let created = store
            .insert(CourseFields {
                title: "Grid Basics".to_string(),
                description: "Intro".to_string(),
                duration: "4 Weeks".to_string(),
                instructor_id: "X".to_string(),
                image_url: "/img.png".to_string(),
                registration_link: None,
            })
            .await
            .unwrap();

        let mut fields = created.fields.clone();
        fields.duration = "5 Weeks".to_string();
        let updated = store.replace(&created.id, fields).await.unwrap().unwrap();
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.fields.duration, "5 Weeks");

        store.delete::<CourseFields>(&created.id).await.unwrap();
        assert!(store.get::<CourseFields>(&created.id).await.unwrap().is_none());
    }
}
