//! Integration tests for the kernel request pipeline.

mod common;

use axum::http::StatusCode;
use axum::http::header::{ETAG, LOCATION};
use common::{TestApp, path_of};
use orderly_kernel::middleware::RateLimitPolicy;
use orderly_test_utils::{TestRequest, assert, body_bytes, body_json, header_str};

fn app() -> TestApp {
    TestApp::new(55, RateLimitPolicy::new(1000, 3600), false)
}

#[tokio::test]
async fn missing_token_is_rejected() {
    let app = app();
    let response = app.request(TestRequest::get("/widgets/").build()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(header_str(&response, "www-authenticate"), Some("Bearer"));
    assert::error_body(
        &body_json(response).await,
        401,
        "authentication token required",
    );
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let app = app();
    let response = app
        .request(TestRequest::get("/widgets/").bearer("nope").build())
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert::error_body(&body_json(response).await, 401, "invalid authentication token");
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let app = app();
    let token = app.kernel.tokens().issue("tester", -10).unwrap();
    let response = app
        .request(TestRequest::get("/widgets/").bearer(&token).build())
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert::error_body(
        &body_json(response).await,
        401,
        "authentication token has expired",
    );
}

#[tokio::test]
async fn unknown_route_and_method() {
    let app = app();
    let token = app.token();

    let response = app
        .request(TestRequest::get("/nowhere").bearer(&token).build())
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert::error_body(&body_json(response).await, 404, "invalid resource URI");

    let response = app
        .request(TestRequest::delete("/widgets/").bearer(&token).build())
        .await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert::error_body(
        &body_json(response).await,
        405,
        "the method is not supported",
    );
}

#[tokio::test]
async fn pagination_walk() {
    let app = app();
    let token = app.token();

    let response = app
        .request(TestRequest::get("/widgets/").bearer(&token).build())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let widgets = body["widgets"].as_array().unwrap();
    assert_eq!(widgets.len(), 25);
    assert_eq!(widgets[0], "http://widgets.test/widgets/0");
    assert!(body["pages"]["prev_url"].is_null());
    assert_eq!(body["pages"]["total"], 55);
    assert_eq!(body["pages"]["pages"], 3);

    let next = body["pages"]["next_url"].as_str().unwrap().to_string();
    let response = app
        .request(TestRequest::get(path_of(&next)).bearer(&token).build())
        .await;
    let body = body_json(response).await;
    assert_eq!(body["widgets"][0], "http://widgets.test/widgets/25");
    assert!(body["pages"]["prev_url"].is_string());

    let last = body["pages"]["next_url"].as_str().unwrap().to_string();
    let response = app
        .request(TestRequest::get(path_of(&last)).bearer(&token).build())
        .await;
    let body = body_json(response).await;
    assert_eq!(body["widgets"].as_array().unwrap().len(), 5);
    assert!(body["pages"]["next_url"].is_null());
}

#[tokio::test]
async fn nested_collection_links_keep_prefix() {
    let app = app();
    let token = app.token();

    let response = app
        .request(
            TestRequest::get("/v2/widgets/?per_page=20&sort=name")
                .bearer(&token)
                .build(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(
        body["pages"]["first_url"],
        "http://widgets.test/v2/widgets/?sort=name&page=1&per_page=20"
    );
    assert_eq!(
        body["pages"]["last_url"],
        "http://widgets.test/v2/widgets/?sort=name&page=3&per_page=20"
    );

    let next = body["pages"]["next_url"].as_str().unwrap().to_string();
    assert_eq!(
        next,
        "http://widgets.test/v2/widgets/?sort=name&page=2&per_page=20"
    );
    let response = app
        .request(TestRequest::get(path_of(&next)).bearer(&token).build())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["widgets"][0], "http://widgets.test/widgets/20");
    assert_eq!(
        body["pages"]["prev_url"],
        "http://widgets.test/v2/widgets/?sort=name&page=1&per_page=20"
    );
}

#[tokio::test]
async fn expanded_pagination() {
    let app = app();
    let token = app.token();

    let response = app
        .request(
            TestRequest::get("/widgets/?expanded=1&per_page=10")
                .bearer(&token)
                .build(),
        )
        .await;
    let body = body_json(response).await;
    assert_eq!(body["widgets"][0]["name"], "widget0");
    assert_eq!(
        body["pages"]["next_url"],
        "http://widgets.test/widgets/?page=2&per_page=10&expanded=1"
    );
}

#[tokio::test]
async fn etag_round_trip() {
    let app = app();
    let token = app.token();

    let first = app
        .request(TestRequest::get("/widgets/3").bearer(&token).build())
        .await;
    assert_eq!(first.status(), StatusCode::OK);
    let etag = header_str(&first, ETAG.as_str()).unwrap().to_string();

    let second = app
        .request(TestRequest::get("/widgets/3").bearer(&token).build())
        .await;
    assert_eq!(header_str(&second, ETAG.as_str()), Some(etag.as_str()));

    let cached = app
        .request(
            TestRequest::get("/widgets/3")
                .bearer(&token)
                .header("if-none-match", &etag)
                .build(),
        )
        .await;
    assert_eq!(cached.status(), StatusCode::NOT_MODIFIED);
    assert_eq!(header_str(&cached, ETAG.as_str()), Some(etag.as_str()));
    assert!(body_bytes(cached).await.is_empty());

    let conflict = app
        .request(
            TestRequest::get("/widgets/3")
                .bearer(&token)
                .header("if-match", "\"something-else\"")
                .build(),
        )
        .await;
    assert_eq!(conflict.status(), StatusCode::PRECONDITION_FAILED);
    assert::error_body(&body_json(conflict).await, 412, "precondition failed");

    let matched = app
        .request(
            TestRequest::get("/widgets/3")
                .bearer(&token)
                .header("if-match", &etag)
                .build(),
        )
        .await;
    assert_eq!(matched.status(), StatusCode::OK);
}

#[tokio::test]
async fn errors_are_not_tagged() {
    let app = app();
    let token = app.token();
    let response = app
        .request(TestRequest::get("/widgets/999").bearer(&token).build())
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().get(ETAG).is_none());
}

#[tokio::test]
async fn rate_limit_end_to_end() {
    let app = TestApp::new(5, RateLimitPolicy::new(3, 3600), false);
    let token = app.token();

    for expected in ["2", "1", "0"] {
        let response = app
            .request(TestRequest::get("/widgets/").bearer(&token).build())
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header_str(&response, "x-ratelimit-remaining"), Some(expected));
        assert_eq!(header_str(&response, "x-ratelimit-limit"), Some("3"));
    }

    let response = app
        .request(TestRequest::get("/widgets/").bearer(&token).build())
        .await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(header_str(&response, "x-ratelimit-remaining"), Some("0"));
    assert!(header_str(&response, "x-ratelimit-reset").is_some());
    assert::error_body(
        &body_json(response).await,
        429,
        "You have exceeded your request rate",
    );

    // Other operations have their own counters.
    let response = app
        .request(TestRequest::get("/widgets/1").bearer(&token).build())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn background_task_lifecycle() {
    let app = app();
    let token = app.token();

    let response = app
        .request(TestRequest::post("/slow").bearer(&token).build())
        .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let location = header_str(&response, LOCATION.as_str()).unwrap().to_string();
    assert!(location.starts_with("http://widgets.test/tasks/"));
    let task_path = path_of(&location).to_string();

    // Polling while running repeats the same accepted response.
    for _ in 0..3 {
        let response = app
            .request(TestRequest::get(&task_path).bearer(&token).build())
            .await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(header_str(&response, LOCATION.as_str()), Some(location.as_str()));
    }

    let response = app
        .request(TestRequest::delete(&task_path).bearer(&token).build())
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert::error_body(
        &body_json(response).await,
        400,
        "task is still running, cannot delete",
    );

    app.release_one();
    let done = app.wait_for_task(&task_path, &token).await;
    assert_eq!(done.status(), StatusCode::CREATED);
    assert_eq!(
        header_str(&done, LOCATION.as_str()),
        Some("http://widgets.test/widgets/0")
    );

    // Without auto-delete the result can be read again.
    let again = app
        .request(TestRequest::get(&task_path).bearer(&token).build())
        .await;
    assert_eq!(again.status(), StatusCode::CREATED);

    let response = app
        .request(TestRequest::delete(&task_path).bearer(&token).build())
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(TestRequest::get(&task_path).bearer(&token).build())
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn auto_deleted_task_is_read_once() {
    let app = TestApp::new(1, RateLimitPolicy::new(1000, 3600), true);
    let token = app.token();

    let response = app
        .request(TestRequest::post("/slow").bearer(&token).build())
        .await;
    let location = header_str(&response, LOCATION.as_str()).unwrap().to_string();
    let task_path = path_of(&location).to_string();

    app.release_one();
    let done = app.wait_for_task(&task_path, &token).await;
    assert_eq!(done.status(), StatusCode::CREATED);

    let response = app
        .request(TestRequest::get(&task_path).bearer(&token).build())
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.kernel.tasks().len(), 0);
}
