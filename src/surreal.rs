use std::env;

use serde::{Deserialize, Serialize};
use surrealdb::{
    engine::remote::http::{Client, Http},
    opt::auth::Root,
    Surreal,
};
use tracing::info;

pub type SurrealClient = Surreal<Client>;

fn normalize_endpoint(raw: String) -> String {
    let ep = raw.trim().to_string();
    if ep.starts_with("http://") || ep.starts_with("https://") {
        ep
    } else {
        format!("http://{ep}")
    }
}

/// Connect to SurrealDB using environment variables, defaults to local root
/// account.
pub async fn connect_from_env() -> Result<SurrealClient, surrealdb::Error> {
    let endpoint_raw =
        env::var("SURREAL_ENDPOINT").unwrap_or_else(|_| "http://127.0.0.1:8000".into());
    let endpoint = normalize_endpoint(endpoint_raw);
    let ns = env::var("SURREAL_NAMESPACE").unwrap_or_else(|_| "kemahasiswaan".into());
    let db = env::var("SURREAL_DATABASE").unwrap_or_else(|_| "portal".into());
    let user = env::var("SURREAL_USER").unwrap_or_else(|_| "root".into());
    let pass = env::var("SURREAL_PASS").unwrap_or_else(|_| "root".into());

    info!(endpoint, namespace = %ns, database = %db, "connecting to SurrealDB (HTTP)");
    let client = Surreal::new::<Http>(&endpoint).await?;
    client
        .signin(Root {
            username: &user,
            password: &pass,
        })
        .await?;
    client.use_ns(&ns).use_db(&db).await?;
    Ok(client)
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SurrealAchievement {
    pub id: Option<String>,
    pub title: String,
    pub student_name: String,
    pub description: String,
    pub type_name: Option<String>,
    pub achieved_at: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SurrealAspiration {
    pub id: Option<String>,
    pub sender_name: String,
    pub email: String,
    pub subject: String,
    pub body: String,
    pub is_read: bool,
    pub created_at: Option<String>,
}

pub async fn list_achievements(
    client: &SurrealClient,
) -> Result<Vec<SurrealAchievement>, surrealdb::Error> {
    let mut response = client
        .query(
            r#"
            SELECT meta::id(id) as id, title, student_name, description, type_name, achieved_at
            FROM achievements
            ORDER BY achieved_at DESC;
            "#,
        )
        .await?;
    let rows: Vec<SurrealAchievement> = response.take(0)?;
    Ok(rows)
}

pub async fn create_achievement(
    client: &SurrealClient,
    record: SurrealAchievement,
) -> Result<SurrealAchievement, surrealdb::Error> {
    let mut response = client
        .query(
            r#"
            CREATE achievements CONTENT {
                title: $title,
                student_name: $student_name,
                description: $description,
                type_name: $type_name,
                achieved_at: $achieved_at
            } RETURN meta::id(id) as id, title, student_name, description, type_name, achieved_at;
            "#,
        )
        .bind(("title", record.title))
        .bind(("student_name", record.student_name))
        .bind(("description", record.description))
        .bind(("type_name", record.type_name))
        .bind(("achieved_at", record.achieved_at))
        .await?;
    let created: Option<SurrealAchievement> = response.take(0)?;
    Ok(created.unwrap_or_default())
}

pub async fn delete_achievement(client: &SurrealClient, id: &str) -> Result<(), surrealdb::Error> {
    let id = id.to_owned();
    client
        .query("DELETE type::thing('achievements', $id);")
        .bind(("id", id))
        .await?;
    Ok(())
}

pub async fn list_aspirations(
    client: &SurrealClient,
) -> Result<Vec<SurrealAspiration>, surrealdb::Error> {
    let mut response = client
        .query(
            r#"
            SELECT meta::id(id) as id, sender_name, email, subject, body, is_read, created_at
            FROM aspirations
            ORDER BY created_at DESC;
            "#,
        )
        .await?;
    let rows: Vec<SurrealAspiration> = response.take(0)?;
    Ok(rows)
}

pub async fn create_aspiration(
    client: &SurrealClient,
    record: SurrealAspiration,
) -> Result<SurrealAspiration, surrealdb::Error> {
    let mut response = client
        .query(
            r#"
            CREATE aspirations CONTENT {
                sender_name: $sender_name,
                email: $email,
                subject: $subject,
                body: $body,
                is_read: false,
                created_at: time::now()
            } RETURN meta::id(id) as id, sender_name, email, subject, body, is_read, created_at;
            "#,
        )
        .bind(("sender_name", record.sender_name))
        .bind(("email", record.email))
        .bind(("subject", record.subject))
        .bind(("body", record.body))
        .await?;
    let created: Option<SurrealAspiration> = response.take(0)?;
    Ok(created.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_gains_scheme_when_missing() {
        assert_eq!(
            normalize_endpoint("127.0.0.1:8000".into()),
            "http://127.0.0.1:8000"
        );
        assert_eq!(
            normalize_endpoint("https://surreal.kampus.ac.id".into()),
            "https://surreal.kampus.ac.id"
        );
    }
}
