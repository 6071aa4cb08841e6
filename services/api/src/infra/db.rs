use std::collections::HashMap;

use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, ColumnTrait, ConnectionTrait,
    DatabaseConnection, DbErr, EntityTrait, FromQueryResult, IntoActiveModel as _, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, SqlErr, Statement, TransactionError, TransactionTrait,
    Value,
    sea_query::{Expr, Func, IntoColumnRef, OnConflict, SimpleExpr},
};

use yamdb_api_schema::{comments, confirmation_codes, genres, reviews, title_genres, titles, users};
use yamdb_domain::pagination::PageRequest;
use yamdb_domain::rating::mean_score;
use yamdb_domain::role::Role;

use crate::domain::repository::{
    CatalogRepository, CommentRepository, ReviewRepository, SignupRepository, TitleRepository,
    UserRepository,
};
use crate::domain::types::{
    CatalogEntry, CatalogKind, Comment, NewComment, NewReview, NewUser, PendingSignup, Review,
    ReviewChanges, Title, TitleFilter, TitleRecord, User, UserChanges,
};
use crate::domain::validation::DUPLICATE_REVIEW;
use crate::error::{ApiError, FieldErrors};

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Unique violations become a validation error; anything else is internal.
fn write_error(
    err: DbErr,
    context: &'static str,
    conflict: impl FnOnce() -> FieldErrors,
) -> ApiError {
    if is_unique_violation(&err) {
        ApiError::Validation(conflict())
    } else {
        ApiError::Internal(anyhow::Error::new(err).context(context))
    }
}

pub(crate) fn flatten(err: TransactionError<DbErr>) -> DbErr {
    match err {
        TransactionError::Connection(e) | TransactionError::Transaction(e) => e,
    }
}

/// `%needle%` with LIKE metacharacters escaped.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Case-insensitive substring match on `column`.
fn contains_ci(column: impl IntoColumnRef, needle: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(like_pattern(&needle.to_lowercase()))
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model).transpose()?)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
            .context("find user by username")?;
        Ok(model.map(user_from_model).transpose()?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model).transpose()?)
    }

    async fn list(&self, search: Option<&str>, page: PageRequest) -> Result<Vec<User>, ApiError> {
        let mut query = users::Entity::find();
        if let Some(needle) = search {
            query = query.filter(contains_ci(users::Column::Username, needle));
        }
        let models = query
            .order_by_asc(users::Column::Username)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list users")?;
        Ok(models
            .into_iter()
            .map(user_from_model)
            .collect::<anyhow::Result<_>>()?)
    }

    async fn create(&self, user: &NewUser) -> Result<User, ApiError> {
        let model = new_user_model(user)
            .insert(&self.db)
            .await
            .map_err(|e| write_error(e, "create user", user_conflict))?;
        Ok(user_from_model(model)?)
    }

    async fn update(&self, id: i32, changes: &UserChanges) -> Result<Option<User>, ApiError> {
        let Some(model) = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user for update")?
        else {
            return Ok(None);
        };
        let mut am = model.into_active_model();
        if let Some(username) = &changes.username {
            am.username = Set(username.clone());
        }
        if let Some(email) = &changes.email {
            am.email = Set(email.clone());
        }
        if let Some(first_name) = &changes.first_name {
            am.first_name = Set(first_name.clone());
        }
        if let Some(last_name) = &changes.last_name {
            am.last_name = Set(last_name.clone());
        }
        if let Some(bio) = &changes.bio {
            am.bio = Set(bio.clone());
        }
        if let Some(role) = changes.role {
            am.role = Set(role.as_str().to_owned());
        }
        let model = am
            .update(&self.db)
            .await
            .map_err(|e| write_error(e, "update user", user_conflict))?;
        Ok(Some(user_from_model(model)?))
    }

    async fn delete(&self, id: i32) -> Result<bool, ApiError> {
        let result = users::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete user")?;
        Ok(result.rows_affected > 0)
    }
}

fn user_conflict() -> FieldErrors {
    FieldErrors::non_field("a user with this username or email already exists")
}

fn new_user_model(user: &NewUser) -> users::ActiveModel {
    users::ActiveModel {
        id: NotSet,
        username: Set(user.username.clone()),
        email: Set(user.email.clone()),
        first_name: Set(user.first_name.clone()),
        last_name: Set(user.last_name.clone()),
        bio: Set(user.bio.clone()),
        role: Set(user.role.as_str().to_owned()),
        date_joined: Set(Utc::now()),
    }
}

fn user_from_model(model: users::Model) -> anyhow::Result<User> {
    let role: Role = model
        .role
        .parse()
        .with_context(|| format!("user {} has an unknown role", model.id))?;
    Ok(User {
        id: model.id,
        username: model.username,
        email: model.email,
        first_name: model.first_name,
        last_name: model.last_name,
        bio: model.bio,
        role,
    })
}

// ── Signup repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSignupRepository {
    pub db: DatabaseConnection,
}

impl SignupRepository for DbSignupRepository {
    async fn register(&self, user: &NewUser, code: &str) -> Result<PendingSignup, ApiError> {
        let issued_at = Utc::now();
        let model = self
            .db
            .transaction::<_, users::Model, DbErr>(|txn| {
                let user = new_user_model(user);
                let code = code.to_owned();
                Box::pin(async move {
                    let model = user.insert(txn).await?;
                    confirmation_codes::ActiveModel {
                        user_id: Set(model.id),
                        code: Set(code),
                        issued_at: Set(issued_at),
                    }
                    .insert(txn)
                    .await?;
                    Ok(model)
                })
            })
            .await
            .map_err(|e| write_error(flatten(e), "register user", user_conflict))?;
        Ok(PendingSignup {
            user_id: model.id,
            username: model.username,
            email: model.email,
            code: code.to_owned(),
            issued_at,
        })
    }

    async fn upsert(&self, pending: &PendingSignup) -> Result<(), ApiError> {
        confirmation_codes::Entity::insert(confirmation_codes::ActiveModel {
            user_id: Set(pending.user_id),
            code: Set(pending.code.clone()),
            issued_at: Set(pending.issued_at),
        })
        .on_conflict(
            OnConflict::column(confirmation_codes::Column::UserId)
                .update_columns([
                    confirmation_codes::Column::Code,
                    confirmation_codes::Column::IssuedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await
        .context("upsert confirmation code")?;
        Ok(())
    }

    async fn find_by_user(&self, user_id: i32) -> Result<Option<PendingSignup>, ApiError> {
        let row = confirmation_codes::Entity::find_by_id(user_id)
            .find_also_related(users::Entity)
            .one(&self.db)
            .await
            .context("find confirmation code")?;
        Ok(row.and_then(|(code, user)| {
            user.map(|user| PendingSignup {
                user_id: code.user_id,
                username: user.username,
                email: user.email,
                code: code.code,
                issued_at: code.issued_at,
            })
        }))
    }
}

// ── Catalog repository (categories / genres) ─────────────────────────────────

#[derive(Clone)]
pub struct DbCatalogRepository {
    pub db: DatabaseConnection,
    pub kind: CatalogKind,
}

#[derive(Debug, FromQueryResult)]
struct CatalogRow {
    id: i32,
    name: String,
    slug: String,
}

impl From<CatalogRow> for CatalogEntry {
    fn from(row: CatalogRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
        }
    }
}

impl DbCatalogRepository {
    fn table(&self) -> &'static str {
        match self.kind {
            CatalogKind::Category => "categories",
            CatalogKind::Genre => "genres",
        }
    }

    fn statement(&self, sql: &str, values: Vec<Value>) -> Statement {
        Statement::from_sql_and_values(self.db.get_database_backend(), sql, values)
    }
}

impl CatalogRepository for DbCatalogRepository {
    async fn list(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<CatalogEntry>, ApiError> {
        let table = self.table();
        let pattern = search.map(|s| like_pattern(&s.to_lowercase()));
        let sql = format!(
            r#"
            SELECT id, name, slug FROM {table}
            WHERE $1::TEXT IS NULL OR LOWER(name) LIKE $1
            ORDER BY name, id
            LIMIT $2 OFFSET $3
            "#
        );
        let rows = CatalogRow::find_by_statement(self.statement(
            &sql,
            vec![
                pattern.into(),
                (page.limit() as i64).into(),
                (page.offset() as i64).into(),
            ],
        ))
        .all(&self.db)
        .await
        .with_context(|| format!("list {table}"))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<CatalogEntry>, ApiError> {
        let table = self.table();
        let sql = format!("SELECT id, name, slug FROM {table} WHERE slug = $1");
        let row = CatalogRow::find_by_statement(self.statement(&sql, vec![slug.into()]))
            .one(&self.db)
            .await
            .with_context(|| format!("find {table} by slug"))?;
        Ok(row.map(Into::into))
    }

    async fn find_by_slugs(&self, slugs: &[String]) -> Result<Vec<CatalogEntry>, ApiError> {
        if slugs.is_empty() {
            return Ok(vec![]);
        }
        let table = self.table();
        let placeholders = (1..=slugs.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT id, name, slug FROM {table} WHERE slug IN ({placeholders}) ORDER BY name, id"
        );
        let values = slugs.iter().map(|s| s.as_str().into()).collect();
        let rows = CatalogRow::find_by_statement(self.statement(&sql, values))
            .all(&self.db)
            .await
            .with_context(|| format!("find {table} by slugs"))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, name: &str, slug: &str) -> Result<CatalogEntry, ApiError> {
        let table = self.table();
        let sql = format!(
            "INSERT INTO {table} (name, slug) VALUES ($1, $2) RETURNING id, name, slug"
        );
        let statement = self.statement(&sql, vec![name.into(), slug.into()]);
        let row = CatalogRow::find_by_statement(statement)
            .one(&self.db)
            .await
            .map_err(|e| {
                write_error(e, "create catalog entry", || {
                    FieldErrors::single("slug", "an entry with this slug already exists")
                })
            })?
            .with_context(|| format!("insert into {table} returned no row"))?;
        Ok(row.into())
    }

    async fn delete_by_slug(&self, slug: &str) -> Result<bool, ApiError> {
        let table = self.table();
        let sql = format!("DELETE FROM {table} WHERE slug = $1");
        let result = self
            .db
            .execute(self.statement(&sql, vec![slug.into()]))
            .await
            .with_context(|| format!("delete {table} by slug"))?;
        Ok(result.rows_affected() > 0)
    }
}

// ── Title repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTitleRepository {
    pub db: DatabaseConnection,
}

#[derive(Debug, FromQueryResult)]
struct TitleRow {
    id: i32,
    name: String,
    year: i32,
    description: Option<String>,
    category_id: Option<i32>,
    category_name: Option<String>,
    category_slug: Option<String>,
    score_sum: i64,
    review_count: i64,
}

impl DbTitleRepository {
    /// Titles matching `conditions` with category and rating resolved in SQL,
    /// then genres attached from a second query over the returned ids.
    async fn select(
        &self,
        conditions: Vec<String>,
        mut values: Vec<Value>,
        page: Option<PageRequest>,
    ) -> Result<Vec<Title>, ApiError> {
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let page_clause = match page {
            Some(page) => {
                values.push((page.limit() as i64).into());
                values.push((page.offset() as i64).into());
                format!("LIMIT ${} OFFSET ${}", values.len() - 1, values.len())
            }
            None => String::new(),
        };
        let sql = format!(
            r#"
            SELECT t.id, t.name, t.year, t.description,
                   c.id AS category_id, c.name AS category_name, c.slug AS category_slug,
                   COALESCE(SUM(r.score), 0)::BIGINT AS score_sum,
                   COUNT(r.id) AS review_count
            FROM titles t
            LEFT JOIN categories c ON c.id = t.category_id
            LEFT JOIN reviews r ON r.title_id = t.id
            {where_clause}
            GROUP BY t.id, c.id
            ORDER BY t.id
            {page_clause}
            "#
        );
        let rows = TitleRow::find_by_statement(Statement::from_sql_and_values(
            self.db.get_database_backend(),
            &sql,
            values,
        ))
        .all(&self.db)
        .await
        .context("select titles")?;

        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let mut genres_by_title = self.genres_for(&ids).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let genres = genres_by_title.remove(&row.id).unwrap_or_default();
                title_from_row(row, genres)
            })
            .collect())
    }

    async fn genres_for(
        &self,
        title_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<CatalogEntry>>, ApiError> {
        if title_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let links = title_genres::Entity::find()
            .filter(title_genres::Column::TitleId.is_in(title_ids.iter().copied()))
            .find_also_related(genres::Entity)
            .order_by_asc(genres::Column::Name)
            .all(&self.db)
            .await
            .context("load title genres")?;
        let mut out: HashMap<i32, Vec<CatalogEntry>> = HashMap::new();
        for (link, genre) in links {
            if let Some(genre) = genre {
                out.entry(link.title_id).or_default().push(CatalogEntry {
                    id: genre.id,
                    name: genre.name,
                    slug: genre.slug,
                });
            }
        }
        Ok(out)
    }
}

fn title_from_row(row: TitleRow, genres: Vec<CatalogEntry>) -> Title {
    let category = match (row.category_id, row.category_name, row.category_slug) {
        (Some(id), Some(name), Some(slug)) => Some(CatalogEntry { id, name, slug }),
        _ => None,
    };
    Title {
        id: row.id,
        name: row.name,
        year: row.year,
        description: row.description,
        category,
        genres,
        rating: mean_score(row.score_sum, row.review_count),
    }
}

async fn write_genre_links<C: ConnectionTrait>(
    conn: &C,
    title_id: i32,
    genre_ids: &[i32],
) -> Result<(), DbErr> {
    for genre_id in genre_ids {
        title_genres::ActiveModel {
            title_id: Set(title_id),
            genre_id: Set(*genre_id),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

impl TitleRepository for DbTitleRepository {
    async fn list(&self, filter: &TitleFilter, page: PageRequest) -> Result<Vec<Title>, ApiError> {
        let mut conditions = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        if let Some(category) = &filter.category {
            values.push(category.as_str().into());
            conditions.push(format!("c.slug = ${}", values.len()));
        }
        if let Some(genre) = &filter.genre {
            values.push(genre.as_str().into());
            conditions.push(format!(
                "EXISTS (SELECT 1 FROM title_genres tg JOIN genres g ON g.id = tg.genre_id \
                 WHERE tg.title_id = t.id AND g.slug = ${})",
                values.len()
            ));
        }
        if let Some(name) = &filter.name {
            values.push(like_pattern(&name.to_lowercase()).into());
            conditions.push(format!("LOWER(t.name) LIKE ${}", values.len()));
        }
        if let Some(year) = filter.year {
            values.push(year.into());
            conditions.push(format!("t.year = ${}", values.len()));
        }
        self.select(conditions, values, Some(page)).await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Title>, ApiError> {
        let titles = self
            .select(vec!["t.id = $1".to_owned()], vec![id.into()], None)
            .await?;
        Ok(titles.into_iter().next())
    }

    async fn exists(&self, id: i32) -> Result<bool, ApiError> {
        let count = titles::Entity::find_by_id(id)
            .count(&self.db)
            .await
            .context("check title exists")?;
        Ok(count > 0)
    }

    async fn create(&self, record: &TitleRecord) -> Result<i32, ApiError> {
        let id = self
            .db
            .transaction::<_, i32, DbErr>(|txn| {
                let record = record.clone();
                Box::pin(async move {
                    let model = titles::ActiveModel {
                        id: NotSet,
                        name: Set(record.name),
                        year: Set(record.year),
                        description: Set(record.description),
                        category_id: Set(record.category_id),
                    }
                    .insert(txn)
                    .await?;
                    write_genre_links(txn, model.id, &record.genre_ids).await?;
                    Ok(model.id)
                })
            })
            .await
            .context("create title")?;
        Ok(id)
    }

    async fn replace(&self, id: i32, record: &TitleRecord) -> Result<bool, ApiError> {
        let replaced = self
            .db
            .transaction::<_, bool, DbErr>(|txn| {
                let record = record.clone();
                Box::pin(async move {
                    let Some(model) = titles::Entity::find_by_id(id).one(txn).await? else {
                        return Ok(false);
                    };
                    let mut am = model.into_active_model();
                    am.name = Set(record.name);
                    am.year = Set(record.year);
                    am.description = Set(record.description);
                    am.category_id = Set(record.category_id);
                    am.update(txn).await?;

                    title_genres::Entity::delete_many()
                        .filter(title_genres::Column::TitleId.eq(id))
                        .exec(txn)
                        .await?;
                    write_genre_links(txn, id, &record.genre_ids).await?;
                    Ok(true)
                })
            })
            .await
            .context("replace title")?;
        Ok(replaced)
    }

    async fn delete(&self, id: i32) -> Result<bool, ApiError> {
        let result = titles::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete title")?;
        Ok(result.rows_affected > 0)
    }
}

// ── Review repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbReviewRepository {
    pub db: DatabaseConnection,
}

impl DbReviewRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Review>, ApiError> {
        let row = reviews::Entity::find_by_id(id)
            .find_also_related(users::Entity)
            .one(&self.db)
            .await
            .context("find review by id")?;
        Ok(row.map(review_from_models))
    }
}

impl ReviewRepository for DbReviewRepository {
    async fn list_by_title(
        &self,
        title_id: i32,
        page: PageRequest,
    ) -> Result<Vec<Review>, ApiError> {
        let rows = reviews::Entity::find()
            .filter(reviews::Column::TitleId.eq(title_id))
            .find_also_related(users::Entity)
            .order_by_desc(reviews::Column::PubDate)
            .order_by_desc(reviews::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list reviews by title")?;
        Ok(rows.into_iter().map(review_from_models).collect())
    }

    async fn find(&self, title_id: i32, review_id: i32) -> Result<Option<Review>, ApiError> {
        let row = reviews::Entity::find_by_id(review_id)
            .filter(reviews::Column::TitleId.eq(title_id))
            .find_also_related(users::Entity)
            .one(&self.db)
            .await
            .context("find review")?;
        Ok(row.map(review_from_models))
    }

    async fn exists_for_author(&self, title_id: i32, author_id: i32) -> Result<bool, ApiError> {
        let count = reviews::Entity::find()
            .filter(reviews::Column::TitleId.eq(title_id))
            .filter(reviews::Column::AuthorId.eq(author_id))
            .count(&self.db)
            .await
            .context("check existing review")?;
        Ok(count > 0)
    }

    async fn create(&self, review: &NewReview) -> Result<Review, ApiError> {
        let model = reviews::ActiveModel {
            id: NotSet,
            title_id: Set(review.title_id),
            author_id: Set(review.author_id),
            text: Set(review.text.clone()),
            score: Set(review.score),
            pub_date: Set(Utc::now()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            write_error(e, "create review", || FieldErrors::non_field(DUPLICATE_REVIEW))
        })?;
        self.find_by_id(model.id)
            .await?
            .context("review missing after insert")
            .map_err(ApiError::from)
    }

    async fn update(&self, id: i32, changes: &ReviewChanges) -> Result<Option<Review>, ApiError> {
        let Some(model) = reviews::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find review for update")?
        else {
            return Ok(None);
        };
        let mut am = model.into_active_model();
        if let Some(text) = &changes.text {
            am.text = Set(text.clone());
        }
        if let Some(score) = changes.score {
            am.score = Set(score);
        }
        am.update(&self.db).await.context("update review")?;
        self.find_by_id(id).await
    }

    async fn delete(&self, id: i32) -> Result<bool, ApiError> {
        let result = reviews::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete review")?;
        Ok(result.rows_affected > 0)
    }
}

fn review_from_models((model, author): (reviews::Model, Option<users::Model>)) -> Review {
    Review {
        id: model.id,
        title_id: model.title_id,
        author_id: model.author_id,
        author: author.map(|u| u.username).unwrap_or_default(),
        text: model.text,
        score: model.score,
        pub_date: model.pub_date,
    }
}

// ── Comment repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCommentRepository {
    pub db: DatabaseConnection,
}

impl DbCommentRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Comment>, ApiError> {
        let row = comments::Entity::find_by_id(id)
            .find_also_related(users::Entity)
            .one(&self.db)
            .await
            .context("find comment by id")?;
        Ok(row.map(comment_from_models))
    }
}

impl CommentRepository for DbCommentRepository {
    async fn list_by_review(
        &self,
        review_id: i32,
        page: PageRequest,
    ) -> Result<Vec<Comment>, ApiError> {
        let rows = comments::Entity::find()
            .filter(comments::Column::ReviewId.eq(review_id))
            .find_also_related(users::Entity)
            .order_by_desc(comments::Column::PubDate)
            .order_by_desc(comments::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list comments by review")?;
        Ok(rows.into_iter().map(comment_from_models).collect())
    }

    async fn find(&self, review_id: i32, comment_id: i32) -> Result<Option<Comment>, ApiError> {
        let row = comments::Entity::find_by_id(comment_id)
            .filter(comments::Column::ReviewId.eq(review_id))
            .find_also_related(users::Entity)
            .one(&self.db)
            .await
            .context("find comment")?;
        Ok(row.map(comment_from_models))
    }

    async fn create(&self, comment: &NewComment) -> Result<Comment, ApiError> {
        let model = comments::ActiveModel {
            id: NotSet,
            review_id: Set(comment.review_id),
            author_id: Set(comment.author_id),
            text: Set(comment.text.clone()),
            pub_date: Set(Utc::now()),
        }
        .insert(&self.db)
        .await
        .context("create comment")?;
        self.find_by_id(model.id)
            .await?
            .context("comment missing after insert")
            .map_err(ApiError::from)
    }

    async fn update_text(&self, id: i32, text: &str) -> Result<Option<Comment>, ApiError> {
        let am = comments::ActiveModel {
            text: Set(text.to_owned()),
            ..Default::default()
        };
        let result = comments::Entity::update_many()
            .set(am)
            .filter(comments::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("update comment")?;
        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn delete(&self, id: i32) -> Result<bool, ApiError> {
        let result = comments::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete comment")?;
        Ok(result.rows_affected > 0)
    }
}

fn comment_from_models((model, author): (comments::Model, Option<users::Model>)) -> Comment {
    Comment {
        id: model.id,
        review_id: model.review_id,
        author_id: model.author_id,
        author: author.map(|u| u.username).unwrap_or_default(),
        text: model.text,
        pub_date: model.pub_date,
    }
}
