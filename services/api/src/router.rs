use axum::{
    Router,
    routing::{delete, get, post},
};

use yamdb_core::health::healthz;
use yamdb_core::middleware::{request_id_layer, trace_layer};

use crate::handlers::{
    auth::{create_token, signup},
    catalog::{
        create_category, create_genre, delete_category, delete_genre, list_categories, list_genres,
    },
    comments::{create_comment, delete_comment, get_comment, list_comments, update_comment},
    health::readyz,
    reviews::{create_review, delete_review, get_review, list_reviews, update_review},
    titles::{create_title, delete_title, get_title, list_titles, patch_title, replace_title},
    users::{create_user, delete_user, get_me, get_user, list_users, update_me, update_user},
};
use crate::state::AppState;

fn api_v1() -> Router<AppState> {
    Router::new()
        // Auth
        .route("/auth/signup", post(signup))
        .route("/auth/token", post(create_token))
        // Catalog
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/{slug}", delete(delete_category))
        .route("/genres", get(list_genres).post(create_genre))
        .route("/genres/{slug}", delete(delete_genre))
        // Titles
        .route("/titles", get(list_titles).post(create_title))
        .route(
            "/titles/{title_id}",
            get(get_title)
                .put(replace_title)
                .patch(patch_title)
                .delete(delete_title),
        )
        // Reviews
        .route(
            "/titles/{title_id}/reviews",
            get(list_reviews).post(create_review),
        )
        .route(
            "/titles/{title_id}/reviews/{review_id}",
            get(get_review).patch(update_review).delete(delete_review),
        )
        // Comments
        .route(
            "/titles/{title_id}/reviews/{review_id}/comments",
            get(list_comments).post(create_comment),
        )
        .route(
            "/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
            get(get_comment).patch(update_comment).delete(delete_comment),
        )
        // Users
        .route("/users", get(list_users).post(create_user))
        .route("/users/me", get(get_me).patch(update_me))
        .route(
            "/users/{username}",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .nest("/api/v1", api_v1())
        .layer(trace_layer())
        .layer(request_id_layer())
        .with_state(state)
}
