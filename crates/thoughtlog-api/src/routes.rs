//! API route definitions

use crate::handlers::{auth, profiles, thoughts, users};
use crate::state::AppState;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

/// Routes mounted under `/api`
///
/// Protected handlers authenticate through their `Identity` or
/// `AdminIdentity` argument, so no route layer is needed here.
pub fn api_routes() -> Router<Arc<AppState>> {
    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", get(auth::login).post(auth::login))
        .route("/auth/changePassword", put(auth::change_password))
        .route("/auth/changeEmail", put(auth::change_email));

    let user_routes = Router::new()
        .route("/users/getUsers", get(users::get_users))
        .route("/users/getUsers/:userId", get(users::get_user))
        .route("/users/deleteUsers", delete(users::delete_self))
        .route("/users/deleteUsers/:userId", delete(users::delete_user))
        .route("/users/updateName", put(users::update_name));

    let thought_routes = Router::new()
        .route("/thoughts/createThought", post(thoughts::create_thought))
        .route("/thoughts/getThoughts", get(thoughts::get_thoughts))
        .route("/thoughts/getThoughts/:thoughtId", get(thoughts::get_thought))
        .route(
            "/thoughts/updateThoughts/:thoughtId",
            put(thoughts::update_thought),
        )
        .route("/thoughts/deleteThoughts", delete(thoughts::delete_thoughts))
        .route(
            "/thoughts/deleteThoughts/:thoughtId",
            delete(thoughts::delete_thought),
        )
        // Reasons
        .route(
            "/thoughts/updateThoughts/:thoughtId/addReasons",
            put(thoughts::add_reason),
        )
        .route(
            "/thoughts/updateThoughts/:thoughtId/deleteReasons",
            put(thoughts::clear_reasons),
        )
        .route(
            "/thoughts/updateThoughts/:thoughtId/deleteReasons/:reasonId",
            put(thoughts::remove_reason),
        );

    let profile_routes = Router::new()
        .route("/profiles/getProfiles/myProfile", get(profiles::my_profile))
        .route("/profiles/getProfiles/:userId", get(profiles::get_profile));

    Router::new()
        .merge(auth_routes)
        .merge(user_routes)
        .merge(thought_routes)
        .merge(profile_routes)
}
