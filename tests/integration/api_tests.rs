//! API integration tests
//!
//! Each test drives the full router in-process against its own in-memory
//! SQLite database.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, NaiveDate};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use catalog_server::{
    api,
    config::AppConfig,
    models::{
        author::CreateAuthor,
        book::CreateBook,
        book_instance::{today, CreateBookInstance, LoanStatus},
        user::{CreateUser, Permission, UserClaims},
    },
    repository::{self, Repository},
    AppState,
};

struct TestApp {
    router: Router,
    state: AppState,
}

async fn setup() -> TestApp {
    let mut config = AppConfig::default();
    config.database.url = "sqlite::memory:".to_string();
    config.database.max_connections = 1;
    config.database.min_connections = 1;
    config.auth.jwt_secret = "integration-secret".to_string();

    let pool = repository::connect(&config.database)
        .await
        .expect("Failed to open in-memory database");
    repository::migrate(&pool).await.expect("Failed to migrate");

    let state = AppState::new(config, Repository::new(pool));
    TestApp {
        router: api::router(state.clone()),
        state,
    }
}

impl TestApp {
    fn token(&self, user_id: i64, username: &str, permissions: &[Permission]) -> String {
        UserClaims::new(user_id, username, permissions, self.state.config.auth.jwt_expiration_hours)
            .create_token(&self.state.config.auth.jwt_secret)
            .expect("Failed to sign token")
    }

    fn superuser_token(&self) -> String {
        let mut claims = UserClaims::new(0, "admin", &[], self.state.config.auth.jwt_expiration_hours);
        claims.is_superuser = true;
        claims
            .create_token(&self.state.config.auth.jwt_secret)
            .expect("Failed to sign token")
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, axum::http::HeaderMap, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, headers, body)
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let (status, _, body) = self.send(Method::GET, uri, token, None).await;
        (status, body)
    }

    async fn user(&self, username: &str) -> i64 {
        self.state
            .services
            .users
            .create(CreateUser {
                username: username.to_string(),
                first_name: String::new(),
                last_name: String::new(),
            })
            .await
            .expect("Failed to create user")
            .id
    }

    async fn author(&self, first_name: &str, last_name: &str) -> i64 {
        self.state
            .services
            .authors
            .create(CreateAuthor {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                date_of_birth: None,
                date_of_death: None,
            })
            .await
            .expect("Failed to create author")
            .id
    }

    async fn book(&self, title: &str, isbn: &str, author_id: i64) -> i64 {
        self.state
            .services
            .catalog
            .create_book(CreateBook {
                title: title.to_string(),
                author_id: Some(author_id),
                summary: None,
                isbn: isbn.to_string(),
                genre_ids: vec![],
                language_id: None,
            })
            .await
            .expect("Failed to create book")
            .id
    }

    async fn copy(
        &self,
        book_id: i64,
        status: LoanStatus,
        due_back: Option<NaiveDate>,
        borrower_id: Option<i64>,
    ) -> Uuid {
        self.state
            .services
            .instances
            .create(CreateBookInstance {
                book_id: Some(book_id),
                imprint: "Test imprint, 2016".to_string(),
                due_back,
                status,
                borrower_id,
            })
            .await
            .expect("Failed to create copy")
            .id
    }
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup().await;

    let (status, body) = app.get("/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.get("/api/v1/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_landing_counts_and_visit_counter() {
    let app = setup().await;
    let author = app.author("Bjarne", "Stroustrup").await;
    let book = app.book("Programming: Principles and Practice", "9780321992789", author).await;
    app.book("The Hobbit", "9780261103344", author).await;
    app.copy(book, LoanStatus::Available, None, None).await;
    app.copy(book, LoanStatus::Maintenance, None, None).await;

    let (status, headers, body) = app.send(Method::GET, "/api/v1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["num_books"], 2);
    assert_eq!(body["num_instances"], 2);
    assert_eq!(body["num_instances_available"], 1);
    assert_eq!(body["num_authors"], 1);
    assert_eq!(body["num_books_containing_word"], 1);
    assert_eq!(body["search_word_book"], "programming");
    assert_eq!(body["num_genres_containing_word"], 0);
    assert_eq!(body["num_visits"], 0);

    let set_cookie = headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(set_cookie.starts_with("num_visits=1"));

    let request = Request::builder()
        .uri("/api/v1")
        .header(header::COOKIE, "num_visits=3")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["num_visits"], 3);
}

#[tokio::test]
async fn test_book_list_pagination() {
    let app = setup().await;

    let (status, body) = app.get("/api/v1/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 0);
    assert_eq!(body["num_pages"], 1);

    let author = app.author("Ursula", "Le Guin").await;
    app.book("A Wizard of Earthsea", "9780553383041", author).await;
    app.book("The Dispossessed", "9780061054884", author).await;
    app.book("The Left Hand of Darkness", "9780441478125", author).await;

    let (status, body) = app.get("/api/v1/books?page=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["num_pages"], 2);
    assert_eq!(body["has_previous"], true);
    assert_eq!(body["has_next"], false);
    assert_eq!(body["items"][0]["title"], "The Left Hand of Darkness");

    let (status, _) = app.get("/api/v1/books?page=3", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get("/api/v1/books?page=0", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get("/api/v1/books?page=abc", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get("/api/v1/books?page=last", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 2);
}

#[tokio::test]
async fn test_unknown_ids_are_not_found() {
    let app = setup().await;

    let (status, body) = app.get("/api/v1/books/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NoSuchData");

    let (status, _) = app.get("/api/v1/authors/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/api/v1/bookinstances/{}", Uuid::new_v4());
    let (status, _) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_book_create_defaults_summary() {
    let app = setup().await;
    let author = app.author("Jane", "Austen").await;
    let token = app.token(1, "editor", &[Permission::AddBook]);

    let (status, body) = app.get("/api/v1/books/create", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"], "Enter a brief description of the book");

    let (status, _, body) = app
        .send(
            Method::POST,
            "/api/v1/books",
            Some(&token),
            Some(json!({ "title": "Emma", "author_id": author, "isbn": "9780141439587" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["summary"], "Enter a brief description of the book");
    assert_eq!(body["author"]["last_name"], "Austen");

    let (status, _, _) = app
        .send(
            Method::POST,
            "/api/v1/books",
            Some(&token),
            Some(json!({ "title": "Emma", "author_id": author, "isbn": "12345" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_genre_and_language_ignore_case() {
    let app = setup().await;
    let token = app.superuser_token();

    let (status, _, _) = app
        .send(Method::POST, "/api/v1/genres", Some(&token), Some(json!({ "name": "Fantasy" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, body) = app
        .send(Method::POST, "/api/v1/genres", Some(&token), Some(json!({ "name": "fantasy" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("case insensitive"));

    let (status, _, _) = app
        .send(Method::POST, "/api/v1/languages", Some(&token), Some(json!({ "name": "English" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, _) = app
        .send(Method::POST, "/api/v1/languages", Some(&token), Some(json!({ "name": "ENGLISH" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_duplicate_names_ignore_case_beyond_ascii() {
    let app = setup().await;
    let token = app.superuser_token();

    for (uri, first, second) in [
        ("/api/v1/languages", "Español", "ESPAÑOL"),
        ("/api/v1/genres", "Ästhetik", "ästhetik"),
    ] {
        let (status, _, _) = app
            .send(Method::POST, uri, Some(&token), Some(json!({ "name": first })))
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _, body) = app
            .send(Method::POST, uri, Some(&token), Some(json!({ "name": second })))
            .await;
        assert_eq!(status, StatusCode::CONFLICT, "{} accepted after {}", second, first);
        assert_eq!(body["error"], "ConstraintViolation");

        let (_, listed) = app.get(uri, None).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
    }

    let (_, languages) = app.get("/api/v1/languages", None).await;
    let id = &languages[0]["id"];
    let (status, _, body) = app
        .send(
            Method::PUT,
            &format!("/api/v1/languages/{}", id),
            Some(&token),
            Some(json!({ "name": "español" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "español");
}

#[tokio::test]
async fn test_blocked_deletes_conflict() {
    let app = setup().await;
    let token = app.superuser_token();
    let author = app.author("Terry", "Pratchett").await;
    let book = app.book("Guards! Guards!", "9780552134637", author).await;
    app.copy(book, LoanStatus::Available, None, None).await;

    let (status, _, body) = app
        .send(Method::DELETE, &format!("/api/v1/authors/{}", author), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "ConstraintViolation");

    let (status, _, _) = app
        .send(Method::DELETE, &format!("/api/v1/books/{}", book), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.get(&format!("/api/v1/authors/{}", author), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app.get(&format!("/api/v1/books/{}", book), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["instances"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_genre_delete_unlinks_books() {
    let app = setup().await;
    let token = app.superuser_token();
    let author = app.author("Ursula", "Le Guin").await;

    let (_, _, fantasy) = app
        .send(Method::POST, "/api/v1/genres", Some(&token), Some(json!({ "name": "Fantasy" })))
        .await;
    let (_, _, fiction) = app
        .send(Method::POST, "/api/v1/genres", Some(&token), Some(json!({ "name": "Fiction" })))
        .await;
    let (status, _, book) = app
        .send(
            Method::POST,
            "/api/v1/books",
            Some(&token),
            Some(json!({
                "title": "Tehanu",
                "author_id": author,
                "isbn": "9780689315951",
                "genre_ids": [fantasy["id"], fiction["id"]]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(book["display_genre"], "Fantasy, Fiction");

    let (status, _, _) = app
        .send(
            Method::DELETE,
            &format!("/api/v1/genres/{}", fantasy["id"]),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.get(&format!("/api/v1/books/{}", book["id"]), None).await;
    assert_eq!(status, StatusCode::OK);
    let genres = body["genres"].as_array().unwrap();
    assert_eq!(genres.len(), 1);
    assert_eq!(genres[0]["name"], "Fiction");
}

#[tokio::test]
async fn test_language_delete_keeps_books() {
    let app = setup().await;
    let token = app.superuser_token();
    let author = app.author("Victor", "Hugo").await;

    let (_, _, language) = app
        .send(Method::POST, "/api/v1/languages", Some(&token), Some(json!({ "name": "French" })))
        .await;
    let (status, _, book) = app
        .send(
            Method::POST,
            "/api/v1/books",
            Some(&token),
            Some(json!({
                "title": "Les Misérables",
                "author_id": author,
                "isbn": "9782253096337",
                "language_id": language["id"]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(book["language"]["name"], "French");

    let (status, _, _) = app
        .send(
            Method::DELETE,
            &format!("/api/v1/languages/{}", language["id"]),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.get(&format!("/api/v1/books/{}", book["id"]), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["language"].is_null());
}

#[tokio::test]
async fn test_update_rejects_unknown_fields() {
    let app = setup().await;
    let token = app.superuser_token();
    let author = app.author("Mary", "Shelley").await;
    let book = app.book("Frankenstein", "9780486282114", author).await;
    let copy = app.copy(book, LoanStatus::Available, None, None).await;

    let uri = format!("/api/v1/bookinstances/{}", copy);
    let (status, _, _) = app
        .send(Method::PUT, &uri, Some(&token), Some(json!({ "id": Uuid::new_v4() })))
        .await;
    assert!(status.is_client_error());

    let (status, _, body) = app
        .send(Method::PUT, &uri, Some(&token), Some(json!({ "imprint": "Dover, 1994" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], copy.to_string());
    assert_eq!(body["imprint"], "Dover, 1994");
    assert_eq!(body["status"], "available");
}

#[tokio::test]
async fn test_my_books_lists_only_own_loans() {
    let app = setup().await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    let author = app.author("Frank", "Herbert").await;
    let book = app.book("Dune", "9780441172719", author).await;

    let later = app.copy(book, LoanStatus::OnLoan, Some(today() + Duration::days(10)), Some(alice)).await;
    let sooner = app.copy(book, LoanStatus::OnLoan, Some(today() - Duration::days(2)), Some(alice)).await;
    app.copy(book, LoanStatus::OnLoan, Some(today()), Some(bob)).await;
    app.copy(book, LoanStatus::Reserved, Some(today()), Some(alice)).await;

    let (status, _) = app.get("/api/v1/mybooks", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = app.token(alice, "alice", &[]);
    let (status, body) = app.get("/api/v1/mybooks", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let loans = body.as_array().unwrap();
    assert_eq!(loans.len(), 2);
    assert_eq!(loans[0]["id"], sooner.to_string());
    assert_eq!(loans[0]["is_overdue"], true);
    assert_eq!(loans[1]["id"], later.to_string());
    assert_eq!(loans[1]["is_overdue"], false);
}

#[tokio::test]
async fn test_borrowed_requires_permission() {
    let app = setup().await;
    let alice = app.user("alice").await;
    let author = app.author("Isaac", "Asimov").await;
    let book = app.book("Foundation", "9780553293357", author).await;
    app.copy(book, LoanStatus::OnLoan, Some(today()), Some(alice)).await;
    app.copy(book, LoanStatus::Available, None, None).await;

    let (status, _) = app.get("/api/v1/borrowed", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = app.token(alice, "alice", &[]);
    let (status, _) = app.get("/api/v1/borrowed", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let librarian = app.token(99, "librarian", &[Permission::CanMarkReturned]);
    let (status, body) = app.get("/api/v1/borrowed", Some(&librarian)).await;
    assert_eq!(status, StatusCode::OK);
    let loans = body.as_array().unwrap();
    assert_eq!(loans.len(), 1);
    assert_eq!(loans[0]["borrower_username"], "alice");
}

#[tokio::test]
async fn test_renewal_form_proposes_three_weeks() {
    let app = setup().await;
    let alice = app.user("alice").await;
    let author = app.author("Italo", "Calvino").await;
    let book = app.book("Invisible Cities", "9780156453806", author).await;
    let copy = app.copy(book, LoanStatus::OnLoan, Some(today()), Some(alice)).await;

    let librarian = app.token(99, "librarian", &[Permission::CanMarkReturned]);
    let (status, body) = app
        .get(&format!("/api/v1/bookinstances/{}/renew", copy), Some(&librarian))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["renewal_date"], iso(today() + Duration::days(21)));
    assert_eq!(body["book_instance"]["id"], copy.to_string());
}

#[tokio::test]
async fn test_renewal_validation() {
    let app = setup().await;
    let alice = app.user("alice").await;
    let author = app.author("Italo", "Calvino").await;
    let book = app.book("If on a winter's night a traveler", "9780156439619", author).await;
    let due = today() + Duration::days(3);
    let copy = app.copy(book, LoanStatus::OnLoan, Some(due), Some(alice)).await;

    let librarian = app.token(99, "librarian", &[Permission::CanMarkReturned]);
    let uri = format!("/api/v1/bookinstances/{}/renew", copy);

    let rejected = [
        (json!({}), "This field is required."),
        (json!({ "renewal_date": "not-a-date" }), "Enter a valid date."),
        (
            json!({ "renewal_date": iso(today() - Duration::days(1)) }),
            "Invalid date - renewal in past",
        ),
        (
            json!({ "renewal_date": iso(today() + Duration::days(29)) }),
            "Invalid date - renewal more than 4 weeks ahead",
        ),
    ];
    for (form, message) in rejected {
        let (status, _, body) = app
            .send(Method::POST, &uri, Some(&librarian), Some(form))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"]["renewal_date"][0], message);
    }

    let (_, body) = app.get(&format!("/api/v1/bookinstances/{}", copy), None).await;
    assert_eq!(body["due_back"], iso(due));

    for days in [0, 28] {
        let (status, headers, _) = app
            .send(
                Method::POST,
                &uri,
                Some(&librarian),
                Some(json!({ "renewal_date": iso(today() + Duration::days(days)) })),
            )
            .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers[header::LOCATION], "/api/v1/borrowed");

        let (_, body) = app.get(&format!("/api/v1/bookinstances/{}", copy), None).await;
        assert_eq!(body["due_back"], iso(today() + Duration::days(days)));
        assert_eq!(body["status"], "on_loan");
        assert_eq!(body["borrower_id"], alice);
    }
}

#[tokio::test]
async fn test_renewal_denied_without_mutation() {
    let app = setup().await;
    let alice = app.user("alice").await;
    let author = app.author("Italo", "Calvino").await;
    let book = app.book("Mr. Palomar", "9780156626002", author).await;
    let due = today() + Duration::days(1);
    let copy = app.copy(book, LoanStatus::OnLoan, Some(due), Some(alice)).await;

    let uri = format!("/api/v1/bookinstances/{}/renew", copy);
    let form = json!({ "renewal_date": iso(today() + Duration::days(7)) });

    let (status, _, _) = app.send(Method::POST, &uri, None, Some(form.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let borrower = app.token(alice, "alice", &[]);
    let (status, _, _) = app
        .send(Method::POST, &uri, Some(&borrower), Some(form.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = app.get(&format!("/api/v1/bookinstances/{}", copy), None).await;
    assert_eq!(body["due_back"], iso(due));

    let (status, _, _) = app.send(Method::POST, &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_renewal_checks_caller_and_copy_before_the_body() {
    let app = setup().await;
    let alice = app.user("alice").await;
    let author = app.author("Italo", "Calvino").await;
    let book = app.book("Cosmicomics", "9780156226004", author).await;
    let due = today() + Duration::days(2);
    let copy = app.copy(book, LoanStatus::OnLoan, Some(due), Some(alice)).await;
    let librarian = app.token(99, "librarian", &[Permission::CanMarkReturned]);

    let unknown = format!("/api/v1/bookinstances/{}/renew", Uuid::new_v4());
    let (status, _, _) = app.send(Method::POST, &unknown, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = app.send(Method::POST, &unknown, Some(&librarian), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = app
        .send(
            Method::POST,
            &unknown,
            Some(&librarian),
            Some(json!({ "renewal_date": 20240101 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/api/v1/bookinstances/{}/renew", copy);
    let (status, _, body) = app.send(Method::POST, &uri, Some(&librarian), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["renewal_date"][0], "This field is required.");

    let (status, _, body) = app
        .send(
            Method::POST,
            &uri,
            Some(&librarian),
            Some(json!({ "renewal_date": 20240101 })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["renewal_date"][0], "Enter a valid date.");
    assert_eq!(body["book_instance"]["id"], copy.to_string());

    let (_, body) = app.get(&format!("/api/v1/bookinstances/{}", copy), None).await;
    assert_eq!(body["due_back"], iso(due));
}

#[tokio::test]
async fn test_return_makes_copy_available() {
    let app = setup().await;
    let alice = app.user("alice").await;
    let author = app.author("Octavia", "Butler").await;
    let book = app.book("Kindred", "9780807083697", author).await;
    let copy = app.copy(book, LoanStatus::OnLoan, Some(today()), Some(alice)).await;

    let librarian = app.token(99, "librarian", &[Permission::CanMarkReturned]);
    let uri = format!("/api/v1/bookinstances/{}/return", copy);

    let (status, _, body) = app.send(Method::POST, &uri, Some(&librarian), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "available");
    assert!(body["due_back"].is_null());
    assert!(body["borrower_id"].is_null());

    let (status, _, body) = app.send(Method::POST, &uri, Some(&librarian), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "InvalidState");
}

#[tokio::test]
async fn test_user_delete_clears_borrower() {
    let app = setup().await;
    let alice = app.user("alice").await;
    let author = app.author("Ray", "Bradbury").await;
    let book = app.book("Fahrenheit 451", "9781451673319", author).await;
    let copy = app.copy(book, LoanStatus::OnLoan, Some(today()), Some(alice)).await;

    let token = app.token(1, "staff", &[Permission::DeleteUser]);
    let (status, _, _) = app
        .send(Method::DELETE, &format!("/api/v1/users/{}", alice), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.get(&format!("/api/v1/bookinstances/{}", copy), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["borrower_id"].is_null());
    assert_eq!(body["status"], "on_loan");
}

#[tokio::test]
async fn test_management_requires_permission() {
    let app = setup().await;
    let token = app.token(1, "reader", &[]);

    let (status, _, _) = app
        .send(
            Method::POST,
            "/api/v1/authors",
            Some(&token),
            Some(json!({ "first_name": "Anon", "last_name": "Ymous" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = app
        .send(
            Method::POST,
            "/api/v1/authors",
            None,
            Some(json!({ "first_name": "Anon", "last_name": "Ymous" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, body) = app.get("/api/v1/authors", None).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}
