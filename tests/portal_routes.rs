//! End-to-end dispatch through the portal route table.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use http::{Method, StatusCode};
use portal_gate::middleware::{GateKind, LOGIN_CODE_PATH};
use portal_gate::{Config, MethodFilter, PortalHandlers, Request, build_routes};

use common::{StaticAuth, body, handlers, portal, portal_with};

#[tokio::test]
async fn proxy_no_auth_reaches_proxy_regardless_of_session() {
    for authenticated in [false, true] {
        let svc = portal(authenticated);
        for (method, path) in [(Method::GET, "/"), (Method::POST, "/api/v1/apps"), (Method::GET, "/login/password")] {
            let req = Request::new(method, path).with_header("X-Proxy", "API-NO-AUTH");
            let res = svc.call(req).await;
            assert_eq!(res.status_code(), StatusCode::OK);
            assert_eq!(body(&res), "proxy_api");
        }
    }
}

#[tokio::test]
async fn proxy_api_without_session_is_empty_401() {
    let svc = portal(false);
    let req = Request::new(Method::POST, "/api/v1/org/users").with_header("X-Proxy", "API");
    let res = svc.call(req).await;
    assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);
    assert!(res.body().is_empty());
    assert!(res.header("content-type").is_none());
    assert!(res.header("x-request-id").is_some());
}

#[tokio::test]
async fn proxy_api_with_session_reaches_proxy_undecorated() {
    let svc = portal(true);
    let req = Request::new(Method::POST, "/api/v1/org/users").with_header("X-Proxy", "API");
    let res = svc.call(req).await;
    assert_eq!(body(&res), "proxy_api");
    assert!(res.header("x-seen-user").is_none());
}

#[tokio::test]
async fn login_code_passes_token_gate_without_session() {
    let svc = portal(false);
    let req = Request::new(Method::POST, LOGIN_CODE_PATH).with_header("X-Proxy", "API");
    let res = svc.call(req).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(body(&res), "proxy_api");

    let req = Request::new(Method::POST, "/api/v1/org/login/code/").with_header("X-Proxy", "API");
    assert_eq!(svc.call(req).await.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn otp_is_token_gated() {
    let res = portal(false).call(Request::new(Method::GET, "/_otp")).await;
    assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);
    assert!(res.body().is_empty());

    let res = portal(true).call(Request::new(Method::GET, "/_otp")).await;
    assert_eq!(body(&res), "otp");
}

#[tokio::test]
async fn apps_prefix_is_ungated() {
    let svc = portal(false);
    for path in ["/apps", "/apps/", "/apps/42/forms", "/appstore"] {
        let res = svc.call(Request::new(Method::GET, path)).await;
        assert_eq!(res.status_code(), StatusCode::OK, "{path}");
        assert_eq!(body(&res), "app_manager", "{path}");
    }
}

#[tokio::test]
async fn catch_all_redirects_anonymous_to_login() {
    let svc = portal(false);
    for path in ["/", "/dashboard", "/approvals/list?page=2"] {
        let res = svc.call(Request::new(Method::GET, path)).await;
        assert_eq!(res.status_code(), StatusCode::FOUND, "{path}");
        let location = res.header("location").unwrap();
        assert!(location.starts_with("/login/password?redirectUrl="), "{location}");
        assert_ne!(body(&res), "portal");
        assert!(res.header("x-request-id").is_some());
    }
}

#[tokio::test]
async fn catch_all_decorates_authenticated_request() {
    let res = portal(true).call(Request::new(Method::GET, "/dashboard")).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(body(&res), "portal");
    assert_eq!(res.header("x-seen-user"), Some("alice"));

    let seen = res.header("x-seen-request-id").unwrap();
    assert_eq!(res.header("x-request-id"), Some(seen));
}

#[tokio::test]
async fn reset_password_get_is_gated_and_post_is_not() {
    let svc = portal(false);
    for _ in 0..2 {
        let res = svc.call(Request::new(Method::GET, "/resetPassword")).await;
        assert_eq!(res.status_code(), StatusCode::FOUND);
        assert_eq!(
            res.header("location"),
            Some("/login/password?redirectUrl=%2FresetPassword"),
        );
    }
    for _ in 0..2 {
        let res = svc.call(Request::new(Method::POST, "/resetPassword")).await;
        assert_eq!(body(&res), "reset_password_submit");
    }

    let res = portal(true).call(Request::new(Method::GET, "/resetPassword")).await;
    assert_eq!(body(&res), "reset_password");
    assert_eq!(res.header("x-seen-user"), Some("alice"));
}

#[tokio::test]
async fn open_pages_skip_auth() {
    let svc = portal(false);
    let cases = [
        (Method::GET, "/login/password", "login"),
        (Method::POST, "/login/password", "login_submit"),
        (Method::POST, "/logout", "logout"),
        (Method::GET, "/retrievePassword", "retrieve_password"),
        (Method::POST, "/retrievePassword", "retrieve_password_submit"),
    ];
    for (method, path, expected) in cases {
        let res = svc.call(Request::new(method.clone(), path)).await;
        assert_eq!(res.status_code(), StatusCode::OK, "{method} {path}");
        assert_eq!(body(&res), expected, "{method} {path}");
    }
}

#[tokio::test]
async fn login_type_parameter_reaches_handler() {
    let res = portal(false).call(Request::new(Method::GET, "/login/sms")).await;
    assert_eq!(body(&res), "login");
    assert_eq!(res.header("x-seen-type"), Some("sms"));
}

#[tokio::test]
async fn unmatched_method_is_not_found() {
    let svc = portal(true);
    for (method, path) in [
        (Method::POST, "/dashboard"),
        (Method::DELETE, "/logout"),
        (Method::PUT, "/apps/1"),
        (Method::GET, "/logout"),
    ] {
        let res = svc.call(Request::new(method.clone(), path)).await;
        if method == Method::GET {
            // GET /logout has no rule of its own and lands on the catch-all.
            assert_eq!(body(&res), "portal");
        } else {
            assert_eq!(res.status_code(), StatusCode::NOT_FOUND, "{method} {path}");
            assert!(res.body().is_empty());
        }
        assert!(res.header("x-request-id").is_some());
    }
}

#[tokio::test]
async fn unknown_proxy_value_falls_through_to_paths() {
    let req = Request::new(Method::GET, "/apps").with_header("X-Proxy", "SOMETHING");
    let res = portal(false).call(req).await;
    assert_eq!(body(&res), "app_manager");
}

#[tokio::test]
async fn disabling_proxy_no_auth_removes_bypass() {
    let config = Config::default().with_proxy_no_auth(false);
    let svc = portal_with(false, &config);
    let req = Request::new(Method::GET, "/dashboard").with_header("X-Proxy", "API-NO-AUTH");
    let res = svc.call(req).await;
    assert_eq!(res.status_code(), StatusCode::FOUND);
}

#[tokio::test]
async fn missing_handlers_answer_501() {
    let router = build_routes(PortalHandlers::new(), Arc::new(StaticAuth(true)), &Config::default());
    let res = router.into_service().call(Request::new(Method::GET, "/apps")).await;
    assert_eq!(res.status_code(), StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn concurrent_requests_get_distinct_ids() {
    let svc = portal(true);
    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..64 {
        let svc = svc.clone();
        tasks.spawn(async move {
            let path = format!("/page/{i}");
            let res = svc.call(Request::new(Method::GET, &path)).await;
            res.header("x-request-id").map(str::to_owned)
        });
    }

    let mut ids = HashSet::new();
    while let Some(id) = tasks.join_next().await {
        assert!(ids.insert(id.unwrap().unwrap()));
    }
    assert_eq!(ids.len(), 64);
}

#[test]
fn table_order_is_header_then_paths_then_prefixes() {
    let router = build_routes(handlers(), Arc::new(StaticAuth(false)), &Config::default());
    let routes = router.routes();
    assert_eq!(routes.len(), 12);

    let table: Vec<_> = routes
        .iter()
        .map(|r| (r.priority(), format!("{:?}", r.matcher()), r.gate()))
        .collect();
    assert_eq!(table[0], (0, r#"header x-proxy: "API""#.to_owned(), Some(GateKind::Token)));
    assert_eq!(table[1], (1, r#"header x-proxy: "API-NO-AUTH""#.to_owned(), None));
    assert_eq!(table[2], (2, "path /_otp".to_owned(), Some(GateKind::Token)));
    assert_eq!(table[6], (6, "path /resetPassword".to_owned(), Some(GateKind::Login)));
    assert_eq!(table[10], (10, "prefix /apps".to_owned(), None));
    assert_eq!(table[11], (11, "prefix /".to_owned(), Some(GateKind::Login)));

    assert_eq!(routes[0].methods(), &MethodFilter::Any);
    assert_eq!(routes[11].methods(), &MethodFilter::Only(vec![Method::GET]));
    assert_eq!(routes.iter().filter(|r| r.gate().is_some()).count(), 4);
}

#[test]
fn table_without_bypass_has_eleven_rules() {
    let config = Config::default().with_proxy_no_auth(false);
    let router = build_routes(handlers(), Arc::new(StaticAuth(false)), &config);
    assert_eq!(router.routes().len(), 11);
    let priorities: Vec<_> = router.routes().iter().map(|r| r.priority()).collect();
    assert_eq!(priorities, (0..11).collect::<Vec<_>>());
}
