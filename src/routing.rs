//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{delete, get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{
        auth_guard, auth_guard_hx, get_log_in_page, get_log_out, get_register_page, post_log_in,
        register_user,
    },
    dashboard::get_dashboard_page,
    endpoints,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    person::{create_person_endpoint, delete_person_endpoint, get_people_page},
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_kind_options,
        get_transactions_page,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(endpoints::USERS, post(register_user))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::PEOPLE_VIEW, get(get_people_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // htmx requests need the HX-Redirect header for auth redirects to navigate the whole page.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(endpoints::PEOPLE_API, post(create_person_endpoint))
            .route(endpoints::DELETE_PERSON, delete(delete_person_endpoint))
            .route(
                endpoints::TRANSACTIONS_API,
                post(create_transaction_endpoint),
            )
            .route(
                endpoints::DELETE_TRANSACTION,
                delete(delete_transaction_endpoint),
            )
            .route(endpoints::TRANSACTION_KIND_OPTIONS, get(get_kind_options))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}

#[cfg(test)]
mod root_route_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{endpoints, routing::get_index_page};

    #[tokio::test]
    async fn root_redirects_to_dashboard() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::DASHBOARD_VIEW);
    }
}

#[cfg(test)]
mod router_tests {
    use axum::http::StatusCode;
    use axum_extra::extract::cookie::Cookie;
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{AppState, auth::COOKIE_TOKEN, endpoints, routing::build_router};

    const PASSWORD: &str = "correct horse battery staple 42";

    fn get_test_server() -> TestServer {
        let state = AppState::new(
            Connection::open_in_memory().unwrap(),
            "very secret test secret",
            "Etc/UTC",
        )
        .unwrap();

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    async fn register(server: &TestServer, email: &str) -> Cookie<'static> {
        let response = server
            .post(endpoints::USERS)
            .form(&[
                ("email", email),
                ("password", PASSWORD),
                ("confirm_password", PASSWORD),
            ])
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        response.cookie(COOKIE_TOKEN)
    }

    #[tokio::test]
    async fn pages_redirect_to_log_in_without_cookie() {
        let server = get_test_server();

        for page in [
            endpoints::ROOT,
            endpoints::DASHBOARD_VIEW,
            endpoints::PEOPLE_VIEW,
            endpoints::TRANSACTIONS_VIEW,
        ] {
            let response = server.get(page).await;

            response.assert_status(StatusCode::SEE_OTHER);
            let location = response.header("location");
            assert!(
                location
                    .to_str()
                    .unwrap()
                    .starts_with(endpoints::LOG_IN_VIEW),
                "want {page} to redirect to the log in page, got {location:?}"
            );
        }
    }

    #[tokio::test]
    async fn api_routes_hx_redirect_without_cookie() {
        let server = get_test_server();

        let response = server
            .post(endpoints::PEOPLE_API)
            .form(&[("name", "Ana"), ("age", "30")])
            .await;

        response.assert_status_ok();
        assert!(
            response
                .header("hx-redirect")
                .to_str()
                .unwrap()
                .starts_with(endpoints::LOG_IN_VIEW)
        );
    }

    #[tokio::test]
    async fn public_pages_are_reachable() {
        let server = get_test_server();

        server.get(endpoints::LOG_IN_VIEW).await.assert_status_ok();
        server.get(endpoints::REGISTER_VIEW).await.assert_status_ok();
        server
            .get(endpoints::INTERNAL_ERROR_VIEW)
            .await
            .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server();

        let response = server.get("/does/not/exist").await;

        response.assert_status_not_found();
        response.assert_text_contains("404");
    }

    #[tokio::test]
    async fn signed_in_user_can_add_person_and_transaction() {
        let server = get_test_server();
        let cookie = register(&server, "ana@example.com").await;

        server
            .get(endpoints::ROOT)
            .add_cookie(cookie.clone())
            .await
            .assert_status(StatusCode::SEE_OTHER);

        let response = server
            .post(endpoints::PEOPLE_API)
            .add_cookie(cookie.clone())
            .form(&[("name", "Ana"), ("age", "30")])
            .await;
        response.assert_status_ok();
        response.assert_text_contains("Added Ana");

        let response = server
            .get(&format!("{}?person_id=1", endpoints::TRANSACTION_KIND_OPTIONS))
            .add_cookie(cookie.clone())
            .await;
        response.assert_status_ok();
        response.assert_text_contains("income");

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .add_cookie(cookie.clone())
            .form(&[
                ("person_id", "1"),
                ("kind", "income"),
                ("amount", "1000"),
                ("description", "Salary"),
            ])
            .await;
        response.assert_status_ok();
        response.assert_text_contains("Added income for Ana");

        let response = server
            .get(endpoints::DASHBOARD_VIEW)
            .add_cookie(cookie.clone())
            .await;
        response.assert_status_ok();
        response.assert_text_contains("Ana");
        response.assert_text_contains("ana@example.com");

        server
            .delete(&endpoints::DELETE_TRANSACTION.replace("{transaction_id}", "1"))
            .add_cookie(cookie.clone())
            .await
            .assert_status_ok();
        server
            .delete(&endpoints::DELETE_PERSON.replace("{person_id}", "1"))
            .add_cookie(cookie)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn incomplete_person_form_gets_an_alert() {
        let server = get_test_server();
        let cookie = register(&server, "ana@example.com").await;

        let response = server
            .post(endpoints::PEOPLE_API)
            .add_cookie(cookie)
            .form(&[("name", "Ana")])
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        response.assert_text_contains("Invalid input");
    }

    #[tokio::test]
    async fn users_cannot_see_each_others_people() {
        let server = get_test_server();
        let ana = register(&server, "ana@example.com").await;
        let bruno = register(&server, "bruno@example.com").await;

        server
            .post(endpoints::PEOPLE_API)
            .add_cookie(ana)
            .form(&[("name", "Somebody"), ("age", "30")])
            .await
            .assert_status_ok();

        let response = server
            .get(endpoints::PEOPLE_VIEW)
            .add_cookie(bruno.clone())
            .await;
        response.assert_status_ok();
        assert!(!response.text().contains("Somebody"));

        server
            .delete(&endpoints::DELETE_PERSON.replace("{person_id}", "1"))
            .add_cookie(bruno)
            .await
            .assert_status_not_found();
    }
}
