//! CSV fixture loader used by the `import` binary.
//!
//! Every file is optional. Rows keep their ids, so the id sequences are moved
//! past the imported maxima once all rows are in. [`promote`] grants the admin
//! role to an existing user and is how the first administrator is created.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityName, EntityTrait, IntoActiveModel, QueryFilter, Statement, TransactionTrait, UpdateMany,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use yamdb_api_schema::{categories, comments, genres, reviews, title_genres, titles, users};
use yamdb_core::config::Config;
use yamdb_domain::role::Role;

use crate::infra::db::flatten;

/// Environment for the importer; only the database is needed.
#[derive(Debug, Deserialize)]
pub struct ImportConfig {
    pub database_url: String,
}

impl Config for ImportConfig {}

#[derive(Debug, Deserialize, PartialEq)]
pub struct UserRow {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// `category.csv` and `genre.csv` share a layout.
#[derive(Debug, Deserialize, PartialEq)]
pub struct CatalogRow {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct TitleRow {
    pub id: i32,
    pub name: String,
    pub year: i32,
    pub category: Option<i32>,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct TitleGenreRow {
    pub title_id: i32,
    pub genre_id: i32,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct ReviewRow {
    pub id: i32,
    pub title_id: i32,
    pub text: String,
    pub author: i32,
    pub score: i16,
    pub pub_date: DateTime<Utc>,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct CommentRow {
    pub id: i32,
    pub review_id: i32,
    pub text: String,
    pub author: i32,
    pub pub_date: DateTime<Utc>,
}

/// Deserialize every record of a headed CSV stream. Extra columns are ignored.
pub fn read_rows<T: DeserializeOwned>(reader: impl Read) -> anyhow::Result<Vec<T>> {
    let mut reader = csv::Reader::from_reader(reader);
    reader
        .deserialize()
        .enumerate()
        .map(|(i, row)| row.with_context(|| format!("invalid record {}", i + 1)))
        .collect()
}

fn read_file<T: DeserializeOwned>(dir: &Path, name: &str) -> anyhow::Result<Vec<T>> {
    let path = dir.join(name);
    if !path.exists() {
        tracing::info!(file = %path.display(), "fixture file missing, skipping");
        return Ok(Vec::new());
    }
    let file = File::open(&path).with_context(|| format!("failed to open {}", path.display()))?;
    let rows = read_rows(file).with_context(|| format!("failed to parse {}", path.display()))?;
    tracing::info!(file = %path.display(), rows = rows.len(), "fixture file read");
    Ok(rows)
}

/// All fixture rows of a directory, converted to insertable models.
#[derive(Debug, Default)]
pub struct Fixtures {
    pub users: Vec<users::ActiveModel>,
    pub categories: Vec<categories::ActiveModel>,
    pub genres: Vec<genres::ActiveModel>,
    pub titles: Vec<titles::ActiveModel>,
    pub title_genres: Vec<title_genres::ActiveModel>,
    pub reviews: Vec<reviews::ActiveModel>,
    pub comments: Vec<comments::ActiveModel>,
}

impl Fixtures {
    pub fn load(dir: &Path) -> anyhow::Result<Self> {
        let now = Utc::now();
        let users = read_file::<UserRow>(dir, "users.csv")?
            .into_iter()
            .map(|row| user_model(row, now))
            .collect::<anyhow::Result<_>>()?;

        Ok(Self {
            users,
            categories: read_file::<CatalogRow>(dir, "category.csv")?
                .into_iter()
                .map(|row| categories::ActiveModel {
                    id: Set(row.id),
                    name: Set(row.name),
                    slug: Set(row.slug),
                })
                .collect(),
            genres: read_file::<CatalogRow>(dir, "genre.csv")?
                .into_iter()
                .map(|row| genres::ActiveModel {
                    id: Set(row.id),
                    name: Set(row.name),
                    slug: Set(row.slug),
                })
                .collect(),
            titles: read_file::<TitleRow>(dir, "titles.csv")?
                .into_iter()
                .map(|row| titles::ActiveModel {
                    id: Set(row.id),
                    name: Set(row.name),
                    year: Set(row.year),
                    description: Set(None),
                    category_id: Set(row.category),
                })
                .collect(),
            title_genres: read_file::<TitleGenreRow>(dir, "genre_title.csv")?
                .into_iter()
                .map(|row| title_genres::ActiveModel {
                    title_id: Set(row.title_id),
                    genre_id: Set(row.genre_id),
                })
                .collect(),
            reviews: read_file::<ReviewRow>(dir, "review.csv")?
                .into_iter()
                .map(|row| reviews::ActiveModel {
                    id: Set(row.id),
                    title_id: Set(row.title_id),
                    author_id: Set(row.author),
                    text: Set(row.text),
                    score: Set(row.score),
                    pub_date: Set(row.pub_date),
                })
                .collect(),
            comments: read_file::<CommentRow>(dir, "comments.csv")?
                .into_iter()
                .map(|row| comments::ActiveModel {
                    id: Set(row.id),
                    review_id: Set(row.review_id),
                    author_id: Set(row.author),
                    text: Set(row.text),
                    pub_date: Set(row.pub_date),
                })
                .collect(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
            && self.categories.is_empty()
            && self.genres.is_empty()
            && self.titles.is_empty()
            && self.title_genres.is_empty()
            && self.reviews.is_empty()
            && self.comments.is_empty()
    }

    /// Insert everything in dependency order inside one transaction.
    pub async fn insert(self, db: &DatabaseConnection) -> anyhow::Result<()> {
        db.transaction::<_, (), DbErr>(|txn| {
            Box::pin(async move {
                insert_all(txn, self.users).await?;
                insert_all(txn, self.categories).await?;
                insert_all(txn, self.genres).await?;
                insert_all(txn, self.titles).await?;
                insert_all(txn, self.title_genres).await?;
                insert_all(txn, self.reviews).await?;
                insert_all(txn, self.comments).await?;

                for table in SERIAL_TABLES {
                    reset_sequence(txn, table).await?;
                }
                Ok(())
            })
        })
        .await
        .map_err(flatten)
        .context("failed to import fixtures")
    }
}

/// Give `username` the admin role. Fails when no such user exists.
pub async fn promote(db: &DatabaseConnection, username: &str) -> anyhow::Result<()> {
    let result = promote_statement(username)
        .exec(db)
        .await
        .context("failed to promote user")?;
    if result.rows_affected == 0 {
        anyhow::bail!("no user named {username}");
    }
    tracing::info!(username, "user promoted to admin");
    Ok(())
}

fn promote_statement(username: &str) -> UpdateMany<users::Entity> {
    users::Entity::update_many()
        .col_expr(users::Column::Role, Expr::value(Role::Admin.as_str()))
        .filter(users::Column::Username.eq(username))
}

/// Tables with a serial `id` column.
const SERIAL_TABLES: [&str; 6] = [
    "users",
    "categories",
    "genres",
    "titles",
    "reviews",
    "comments",
];

fn user_model(row: UserRow, date_joined: DateTime<Utc>) -> anyhow::Result<users::ActiveModel> {
    let role: Role = row
        .role
        .parse()
        .with_context(|| format!("user {} has an invalid role", row.id))?;
    Ok(users::ActiveModel {
        id: Set(row.id),
        username: Set(row.username),
        email: Set(row.email),
        first_name: Set(row.first_name),
        last_name: Set(row.last_name),
        bio: Set(row.bio),
        role: Set(role.as_str().to_owned()),
        date_joined: Set(date_joined),
    })
}

async fn insert_all<A, C>(conn: &C, models: Vec<A>) -> Result<(), DbErr>
where
    A: ActiveModelTrait,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
    C: ConnectionTrait,
{
    if models.is_empty() {
        return Ok(());
    }
    let count = models.len();
    let entity = A::Entity::default();
    let table = entity.table_name();
    A::Entity::insert_many(models)
        .exec_without_returning(conn)
        .await?;
    tracing::info!(table, rows = count, "fixtures inserted");
    Ok(())
}

async fn reset_sequence<C: ConnectionTrait>(conn: &C, table: &str) -> Result<(), DbErr> {
    let sql = format!(
        "SELECT setval(pg_get_serial_sequence('{table}', 'id'), \
         COALESCE((SELECT MAX(id) FROM {table}), 0) + 1, false)"
    );
    conn.execute(Statement::from_string(conn.get_database_backend(), sql))
        .await?;
    Ok(())
}
