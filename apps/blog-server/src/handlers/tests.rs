use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::{TimeDelta, Utc};
use serde_json::Value;

use blogicum_core::domain::{Category, Comment, Post, PostContent, User};
use blogicum_infra::{Argon2PasswordService, JwtConfig, JwtTokenService};

use super::configure_routes;
use crate::config::AccountSettings;
use crate::middleware::auth::ACCESS_TOKEN_COOKIE;
use crate::observability::RequestIdMiddleware;
use crate::state::AppState;

fn test_state() -> AppState {
    AppState::in_memory(
        Arc::new(JwtTokenService::new(JwtConfig::default())),
        Arc::new(Argon2PasswordService::new()),
        AccountSettings {
            staff_usernames: vec!["admin".to_string()],
            cookie_secure: false,
        },
    )
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .app_data(web::Data::new($state.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

/// A stored user and the `Authorization` header value for them.
async fn user(state: &AppState, username: &str) -> (User, String) {
    let user = state
        .users
        .create(User::new(
            username.to_string(),
            format!("{username}@example.com"),
            "not-a-hash".to_string(),
        ))
        .await
        .unwrap();
    let token = state.tokens.generate_token(user.id, &user.username).unwrap();
    (user, format!("Bearer {token}"))
}

async fn category(state: &AppState, slug: &str, is_published: bool) -> Category {
    let mut category = Category::new(slug.to_uppercase(), String::new(), slug.to_string());
    category.is_published = is_published;
    state.categories.create(category).await.unwrap()
}

async fn post(
    state: &AppState,
    author: &User,
    category: &Category,
    title: &str,
    age: TimeDelta,
    is_published: bool,
) -> Post {
    let post = Post::new(
        author.id,
        PostContent {
            title: title.to_string(),
            text: "Body".to_string(),
            pub_date: Utc::now() - age,
            is_published,
            category_id: category.id,
            location_id: None,
        },
    );
    state.posts.create(post).await.unwrap()
}

fn location<B>(res: &ServiceResponse<B>) -> String {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn titles(page: &Value) -> Vec<String> {
    page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap().to_string())
        .collect()
}

#[actix_web::test]
async fn test_health() {
    let state = test_state();
    let app = app!(state);

    let res = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn test_unpublished_post_visible_only_to_author() {
    let state = test_state();
    let (author, author_auth) = user(&state, "leo").await;
    let (_, other_auth) = user(&state, "anna").await;
    let travel = category(&state, "travel", true).await;
    let draft = post(&state, &author, &travel, "Draft", TimeDelta::hours(1), false).await;
    let app = app!(state);
    let uri = format!("/posts/{}/", draft.id);

    let req = test::TestRequest::get().uri(&uri).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header((header::AUTHORIZATION, other_auth))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header((header::AUTHORIZATION, author_auth))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["post"]["title"], "Draft");
    assert_eq!(body["is_owner"], true);
}

#[actix_web::test]
async fn test_future_post_hidden_from_listings_but_not_author() {
    let state = test_state();
    let (author, author_auth) = user(&state, "leo").await;
    let travel = category(&state, "travel", true).await;
    post(&state, &author, &travel, "Today", TimeDelta::hours(1), true).await;
    let scheduled = post(&state, &author, &travel, "Tomorrow", TimeDelta::days(-1), true).await;
    let app = app!(state);

    let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(titles(&body), vec!["Today"]);

    let req = test::TestRequest::get().uri("/profile/leo/").to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(titles(&body["posts"]), vec!["Today"]);
    assert_eq!(body["is_owner"], false);

    let req = test::TestRequest::get()
        .uri("/profile/leo/")
        .insert_header((header::AUTHORIZATION, author_auth.clone()))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(titles(&body["posts"]), vec!["Tomorrow", "Today"]);

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/", scheduled.id))
        .insert_header((header::AUTHORIZATION, author_auth))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_unpublished_category_excluded() {
    let state = test_state();
    let (author, _) = user(&state, "leo").await;
    let hidden = category(&state, "hidden", false).await;
    let travel = category(&state, "travel", true).await;
    let buried = post(&state, &author, &hidden, "Buried", TimeDelta::hours(1), true).await;
    post(&state, &author, &travel, "Visible", TimeDelta::hours(2), true).await;
    let app = app!(state);

    let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(titles(&body), vec!["Visible"]);

    let req = test::TestRequest::get().uri("/category/hidden/").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri(&format!("/posts/{}/", buried.id)).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/category/travel/").to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["category"]["slug"], "travel");
    assert_eq!(titles(&body["posts"]), vec!["Visible"]);
}

#[actix_web::test]
async fn test_listing_newest_first() {
    let state = test_state();
    let (author, _) = user(&state, "leo").await;
    let travel = category(&state, "travel", true).await;
    post(&state, &author, &travel, "Three hours", TimeDelta::hours(3), true).await;
    post(&state, &author, &travel, "One hour", TimeDelta::hours(1), true).await;
    post(&state, &author, &travel, "Two hours", TimeDelta::hours(2), true).await;
    let app = app!(state);

    let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(titles(&body), vec!["One hour", "Two hours", "Three hours"]);
}

#[actix_web::test]
async fn test_pagination() {
    let state = test_state();
    let (author, _) = user(&state, "leo").await;
    let travel = category(&state, "travel", true).await;
    for i in 0..11 {
        post(&state, &author, &travel, &format!("Post {i}"), TimeDelta::hours(i + 1), true).await;
    }
    let app = app!(state);

    let req = test::TestRequest::get().uri("/?page=2").to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(titles(&body), vec!["Post 10"]);
    assert_eq!(body["num_pages"], 2);
    assert_eq!(body["has_previous"], true);
    assert_eq!(body["has_next"], false);

    let req = test::TestRequest::get().uri("/?page=last").to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["page"], 2);

    for uri in ["/?page=3", "/?page=0", "/?page=abc"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND,
            "{uri}"
        );
    }
}

#[actix_web::test]
async fn test_anonymous_redirected_to_login() {
    let state = test_state();
    let (author, _) = user(&state, "leo").await;
    let travel = category(&state, "travel", true).await;
    let published = post(&state, &author, &travel, "Hello", TimeDelta::hours(1), true).await;
    let app = app!(state);

    let req = test::TestRequest::get().uri("/posts/create/").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/auth/login/?next=/posts/create/");

    let edit = format!("/posts/{}/edit/", published.id);
    let req = test::TestRequest::post()
        .uri(&edit)
        .set_form([("title", "Hijacked")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("/auth/login/?next={edit}"));

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment/", published.id))
        .set_form([("text", "Hi")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert!(location(&res).starts_with("/auth/login/?next="));

    let req = test::TestRequest::get()
        .uri("/posts/create/")
        .insert_header((header::AUTHORIZATION, "Bearer not-a-token"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
}

#[actix_web::test]
async fn test_create_post() {
    let state = test_state();
    let (_, auth) = user(&state, "leo").await;
    let travel = category(&state, "travel", true).await;
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/posts/create/")
        .insert_header((header::AUTHORIZATION, auth.clone()))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["categories"][0]["slug"], "travel");

    let category_id = travel.id.to_string();
    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .insert_header((header::AUTHORIZATION, auth.clone()))
        .set_form([
            ("title", "Moscow in spring"),
            ("text", "Warm."),
            ("pub_date", "2024-04-01T10:00"),
            ("category", category_id.as_str()),
            ("is_published", "on"),
        ])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/profile/leo/");

    let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(titles(&body), vec!["Moscow in spring"]);
    assert_eq!(body["items"][0]["author"]["username"], "leo");

    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .insert_header((header::AUTHORIZATION, auth))
        .set_form([("title", ""), ("category", "not-an-id")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(res).await;
    let errors = body["errors"].as_array().unwrap();
    assert!(errors.iter().any(|e| e.as_str().unwrap().starts_with("title:")));
    assert!(errors.iter().any(|e| e.as_str().unwrap().starts_with("category:")));
}

#[actix_web::test]
async fn test_non_owner_cannot_change_post() {
    let state = test_state();
    let (author, author_auth) = user(&state, "leo").await;
    let (_, other_auth) = user(&state, "anna").await;
    let travel = category(&state, "travel", true).await;
    let original = post(&state, &author, &travel, "Original", TimeDelta::hours(1), true).await;
    let app = app!(state);
    let detail = format!("/posts/{}/", original.id);
    let category_id = travel.id.to_string();
    let form = [
        ("title", "Rewritten"),
        ("text", "New body"),
        ("pub_date", "2024-04-01T10:00"),
        ("category", category_id.as_str()),
        ("is_published", "on"),
    ];

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/edit/", original.id))
        .insert_header((header::AUTHORIZATION, other_auth.clone()))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), detail);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit/", original.id))
        .insert_header((header::AUTHORIZATION, other_auth.clone()))
        .set_form(form)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(location(&res), detail);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/delete/", original.id))
        .insert_header((header::AUTHORIZATION, other_auth))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), detail);

    let stored = state.posts.find_by_id(original.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Original");

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit/", original.id))
        .insert_header((header::AUTHORIZATION, author_auth.clone()))
        .set_form(form)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(location(&res), detail);
    let stored = state.posts.find_by_id(original.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Rewritten");

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/delete/", original.id))
        .insert_header((header::AUTHORIZATION, author_auth))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(location(&res), "/");
    assert!(state.posts.find_by_id(original.id).await.unwrap().is_none());
}

#[actix_web::test]
async fn test_comment_attaches_viewer_and_post() {
    let state = test_state();
    let (author, _) = user(&state, "leo").await;
    let (reader, reader_auth) = user(&state, "anna").await;
    let travel = category(&state, "travel", true).await;
    let published = post(&state, &author, &travel, "Hello", TimeDelta::hours(1), true).await;
    let draft = post(&state, &author, &travel, "Draft", TimeDelta::hours(1), false).await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment/", published.id))
        .insert_header((header::AUTHORIZATION, reader_auth.clone()))
        .set_form([("text", "  Great read  ")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("/posts/{}/", published.id));

    let comments = state.comments.list_for_post(published.id).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].comment.author_id, reader.id);
    assert_eq!(comments[0].comment.post_id, published.id);
    assert_eq!(comments[0].comment.text, "Great read");

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment/", published.id))
        .insert_header((header::AUTHORIZATION, reader_auth.clone()))
        .set_form([("text", "   ")])
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment/", draft.id))
        .insert_header((header::AUTHORIZATION, reader_auth))
        .set_form([("text", "Sneaky")])
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/", published.id))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["post"]["comment_count"], 1);
    assert_eq!(body["comments"][0]["author"]["username"], "anna");
    assert!(body["comment_form"].is_null());
}

#[actix_web::test]
async fn test_non_owner_cannot_change_comment() {
    let state = test_state();
    let (author, author_auth) = user(&state, "leo").await;
    let (commenter, _) = user(&state, "anna").await;
    let travel = category(&state, "travel", true).await;
    let first = post(&state, &author, &travel, "First", TimeDelta::hours(1), true).await;
    let second = post(&state, &author, &travel, "Second", TimeDelta::hours(2), true).await;
    let comment = state
        .comments
        .create(Comment::new(first.id, commenter.id, "Mine".to_string()))
        .await
        .unwrap();
    let app = app!(state);
    let detail = format!("/posts/{}/", first.id);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit_comment/{}/", first.id, comment.id))
        .insert_header((header::AUTHORIZATION, author_auth.clone()))
        .set_form([("text", "Edited")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), detail);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/delete_comment/{}/", first.id, comment.id))
        .insert_header((header::AUTHORIZATION, author_auth.clone()))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(location(&res), detail);

    let stored = state.comments.find_by_id(comment.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "Mine");

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/edit_comment/{}/", second.id, comment.id))
        .insert_header((header::AUTHORIZATION, author_auth))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_comment_author_edits_and_deletes() {
    let state = test_state();
    let (author, _) = user(&state, "leo").await;
    let (commenter, commenter_auth) = user(&state, "anna").await;
    let travel = category(&state, "travel", true).await;
    let target = post(&state, &author, &travel, "Hello", TimeDelta::hours(1), true).await;
    let comment = state
        .comments
        .create(Comment::new(target.id, commenter.id, "Typo".to_string()))
        .await
        .unwrap();
    let app = app!(state);
    let edit = format!("/posts/{}/edit_comment/{}/", target.id, comment.id);

    let req = test::TestRequest::get()
        .uri(&edit)
        .insert_header((header::AUTHORIZATION, commenter_auth.clone()))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["text"], "Typo");

    let req = test::TestRequest::post()
        .uri(&edit)
        .insert_header((header::AUTHORIZATION, commenter_auth.clone()))
        .set_form([("text", "Fixed")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(location(&res), format!("/posts/{}/", target.id));
    let stored = state.comments.find_by_id(comment.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "Fixed");

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/delete_comment/{}/", target.id, comment.id))
        .insert_header((header::AUTHORIZATION, commenter_auth))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(location(&res), format!("/posts/{}/", target.id));
    assert!(state.comments.find_by_id(comment.id).await.unwrap().is_none());
}

#[actix_web::test]
async fn test_edit_profile() {
    let state = test_state();
    let (leo, leo_auth) = user(&state, "leo").await;
    let (_, anna_auth) = user(&state, "anna").await;
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/profile/leo/edit/")
        .insert_header((header::AUTHORIZATION, anna_auth))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/profile/leo/");

    let req = test::TestRequest::post()
        .uri("/profile/leo/edit/")
        .insert_header((header::AUTHORIZATION, leo_auth.clone()))
        .set_form([("username", "anna"), ("email", "")])
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );

    let req = test::TestRequest::post()
        .uri("/profile/leo/edit/")
        .insert_header((header::AUTHORIZATION, leo_auth))
        .set_form([
            ("first_name", "Lev"),
            ("last_name", "Tolstoy"),
            ("username", "tolstoy"),
            ("email", "lev@example.com"),
        ])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/profile/tolstoy/edit/");

    let stored = state.users.find_by_id(leo.id).await.unwrap().unwrap();
    assert_eq!(stored.username, "tolstoy");
    assert_eq!(stored.display_name(), "Lev Tolstoy");
}

#[actix_web::test]
async fn test_register_and_login_round_trip() {
    let state = test_state();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/auth/registration/")
        .set_form([
            ("username", "leo"),
            ("email", "leo@example.com"),
            ("password", "war-and-peace"),
        ])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/auth/login/");

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_form([("username", "leo"), ("password", "wrong-password")])
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_form([
            ("username", "leo"),
            ("password", "war-and-peace"),
            ("next", "/posts/create/"),
        ])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/posts/create/");
    let token = res
        .response()
        .cookies()
        .find(|c| c.name() == ACCESS_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .unwrap();

    let req = test::TestRequest::get()
        .uri("/posts/create/")
        .cookie(Cookie::new(ACCESS_TOKEN_COOKIE, token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_form([
            ("username", "leo"),
            ("password", "war-and-peace"),
            ("next", "//evil.example/"),
        ])
        .to_request();
    assert_eq!(location(&test::call_service(&app, req).await), "/");
}

#[actix_web::test]
async fn test_registration_rejects_duplicates_and_short_passwords() {
    let state = test_state();
    user(&state, "leo").await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/auth/registration/")
        .set_form([("username", "leo"), ("password", "short")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn test_admin_requires_staff() {
    let state = test_state();
    let (author, author_auth) = user(&state, "leo").await;
    let admin = state
        .users
        .create(User::new("admin".into(), String::new(), "not-a-hash".into()).with_staff(true))
        .await
        .unwrap();
    let admin_auth = format!(
        "Bearer {}",
        state.tokens.generate_token(admin.id, &admin.username).unwrap()
    );
    let travel = category(&state, "travel", true).await;
    let draft = post(&state, &author, &travel, "Draft", TimeDelta::hours(1), false).await;
    let app = app!(state);

    let req = test::TestRequest::get().uri("/admin/posts/").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(location(&res), "/auth/login/?next=/admin/posts/");

    let req = test::TestRequest::get()
        .uri("/admin/posts/")
        .insert_header((header::AUTHORIZATION, author_auth))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri("/admin/posts/?q=dra")
        .insert_header((header::AUTHORIZATION, admin_auth.clone()))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(titles(&body), vec!["Draft"]);

    let category_id = travel.id.to_string();
    let req = test::TestRequest::post()
        .uri(&format!("/admin/posts/{}/", draft.id))
        .insert_header((header::AUTHORIZATION, admin_auth.clone()))
        .set_form([("category", category_id.as_str()), ("is_published", "on")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["is_published"], true);

    let req = test::TestRequest::post()
        .uri("/admin/categories/")
        .insert_header((header::AUTHORIZATION, admin_auth.clone()))
        .set_form([("title", "Food"), ("slug", "food"), ("is_published", "on")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["slug"], "food");

    let req = test::TestRequest::post()
        .uri("/admin/categories/")
        .insert_header((header::AUTHORIZATION, admin_auth))
        .set_form([("title", "Travel again"), ("slug", "travel")])
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[actix_web::test]
async fn test_unknown_and_malformed_paths_are_not_found() {
    let state = test_state();
    let app = app!(state);

    for uri in ["/posts/not-a-uuid/", "/nowhere/", "/profile/ghost/"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}
