//! Login, registration, token validation, and password change tests

use axum::http::{Method, StatusCode};
use carepoint_accounts::UserStore;
use carepoint_auth::{AuthBackend, Role};
use serde_json::{json, Value};

use crate::common::{auth_config, get, json_request, TestApp, TEST_JWT_SECRET, TEST_PASSWORD};

fn registration(email: &str) -> Value {
    json!({
        "first_name": "Ada",
        "last_name": "Lovelace",
        "mobile_number": "+15550199",
        "email": email,
        "password": "Analytical1",
    })
}

mod test_register {
    use super::*;

    #[tokio::test]
    async fn test_register_patient_issues_token() {
        let app = TestApp::new();

        let response = app
            .send(json_request(
                Method::POST,
                "/v1/auth/register",
                None,
                registration("ada@carepoint.test"),
            ))
            .await;

        assert_eq!(response.status, StatusCode::CREATED);
        let body = response.json();
        assert_eq!(body["registered"], true);
        assert_eq!(body["message"], "User registered successfully");

        let token = body["token"].as_str().unwrap();
        let context = app.auth.authenticate(token).unwrap();
        assert_eq!(context.role, Role::Patient);
        assert_eq!(context.user_id.to_string(), body["id"].as_str().unwrap());
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let app = TestApp::new();
        let first = app
            .send(json_request(
                Method::POST,
                "/v1/auth/register",
                None,
                registration("twice@carepoint.test"),
            ))
            .await;
        assert_eq!(first.status, StatusCode::CREATED);

        let second = app
            .send(json_request(
                Method::POST,
                "/v1/auth/register",
                None,
                registration("twice@carepoint.test"),
            ))
            .await;

        assert_eq!(second.status, StatusCode::CONFLICT);
        assert_eq!(second.json()["registered"], false);
        assert_eq!(second.json()["message"], "Email already exists");
        assert_eq!(app.accounts.user_count(), 1);
    }

    #[tokio::test]
    async fn test_register_staff_role_requires_admin_token() {
        let app = TestApp::new();
        let mut request = registration("doc@carepoint.test");
        request["role"] = json!("DOCTOR");

        let anonymous = app
            .send(json_request(
                Method::POST,
                "/v1/auth/register",
                None,
                request.clone(),
            ))
            .await;
        assert_eq!(anonymous.status, StatusCode::FORBIDDEN);
        assert_eq!(anonymous.error_code(), "FORBIDDEN_ROLE");

        let patient = app.create_user(Role::Patient, "Pat").await;
        let as_patient = app
            .send(json_request(
                Method::POST,
                "/v1/auth/register",
                Some(&patient.token),
                request.clone(),
            ))
            .await;
        assert_eq!(as_patient.status, StatusCode::FORBIDDEN);

        let admin = app.create_user(Role::Admin, "Root").await;
        let as_admin = app
            .send(json_request(
                Method::POST,
                "/v1/auth/register",
                Some(&admin.token),
                request,
            ))
            .await;
        assert_eq!(as_admin.status, StatusCode::CREATED);

        let token = as_admin.json()["token"].as_str().unwrap().to_string();
        assert_eq!(app.auth.authenticate(&token).unwrap().role, Role::Doctor);
    }

    #[tokio::test]
    async fn test_register_rejects_weak_password_and_bad_mobile() {
        let app = TestApp::new();

        let mut weak = registration("weak@carepoint.test");
        weak["password"] = json!("short");
        let response = app
            .send(json_request(Method::POST, "/v1/auth/register", None, weak))
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error_code(), "VALIDATION_ERROR");

        let mut bad_mobile = registration("mobile@carepoint.test");
        bad_mobile["mobile_number"] = json!("call me");
        let response = app
            .send(json_request(
                Method::POST,
                "/v1/auth/register",
                None,
                bad_mobile,
            ))
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);

        assert_eq!(app.accounts.user_count(), 0);
        assert_eq!(app.accounts.credential_count(), 0);
    }
}

mod test_login {
    use super::*;

    fn login_body(email: &str, password: &str) -> Value {
        json!({ "email": email, "password": password })
    }

    #[tokio::test]
    async fn test_login_success_returns_profile_and_token() {
        let app = TestApp::new();
        let doctor = app.create_user(Role::Doctor, "Grey").await;

        let response = app
            .send(json_request(
                Method::POST,
                "/v1/auth/login",
                None,
                login_body(&doctor.user.email, TEST_PASSWORD),
            ))
            .await;

        assert_eq!(response.status, StatusCode::OK);
        let body = response.json();
        assert_eq!(body["validated"], true);
        assert_eq!(body["message"], "Login successful");
        assert_eq!(body["role"], "DOCTOR");
        assert_eq!(body["first_name"], "Grey");
        assert!(body.get("password_hash").is_none());

        let token = body["token"].as_str().unwrap();
        assert_eq!(app.auth.authenticate(token).unwrap().user_id, doctor.id());
    }

    #[tokio::test]
    async fn test_unknown_email_and_wrong_password_look_alike() {
        let app = TestApp::new();
        let patient = app.create_user(Role::Patient, "Pat").await;

        let wrong_password = app
            .send(json_request(
                Method::POST,
                "/v1/auth/login",
                None,
                login_body(&patient.user.email, "NotThePassword1"),
            ))
            .await;
        let unknown_email = app
            .send(json_request(
                Method::POST,
                "/v1/auth/login",
                None,
                login_body("nobody@carepoint.test", TEST_PASSWORD),
            ))
            .await;

        assert_eq!(wrong_password.status, StatusCode::OK);
        assert_eq!(unknown_email.status, StatusCode::OK);
        assert_eq!(wrong_password.json()["validated"], false);
        assert!(wrong_password.json()["token"].is_null());
        assert_eq!(
            wrong_password.json()["message"],
            unknown_email.json()["message"]
        );
    }

    #[tokio::test]
    async fn test_inactive_user_cannot_log_in() {
        let app = TestApp::new();
        let patient = app.create_user(Role::Patient, "Pat").await;

        let mut deactivated = patient.user.clone();
        deactivated.active = false;
        app.accounts.update(&deactivated).await.unwrap();

        let response = app
            .send(json_request(
                Method::POST,
                "/v1/auth/login",
                None,
                login_body(&patient.user.email, TEST_PASSWORD),
            ))
            .await;

        assert_eq!(response.json()["validated"], false);
        assert_eq!(
            response.json()["message"],
            "User is inactive. Please contact support."
        );
    }
}

mod test_tokens {
    use super::*;

    #[tokio::test]
    async fn test_validate_accepts_header_or_query_token() {
        let app = TestApp::new();
        let patient = app.create_user(Role::Patient, "Pat").await;

        let by_header = app
            .send(get("/v1/auth/validate", Some(&patient.token)))
            .await;
        assert_eq!(by_header.json()["valid"], true);

        let by_query = app
            .send(get(
                &format!("/v1/auth/validate?token={}", patient.token),
                None,
            ))
            .await;
        assert_eq!(by_query.json()["valid"], true);
    }

    #[tokio::test]
    async fn test_validate_rejects_garbage_and_missing_tokens() {
        let app = TestApp::new();

        let garbage = app
            .send(get("/v1/auth/validate", Some("not-a-token")))
            .await;
        assert_eq!(garbage.status, StatusCode::OK);
        assert_eq!(garbage.json()["valid"], false);

        let missing = app.send(get("/v1/auth/validate", None)).await;
        assert_eq!(missing.json()["valid"], false);
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let app = TestApp::new();

        let response = app.send(get("/v1/account", None)).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);

        let response = app.send(get("/v1/account", Some("bogus"))).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected_at_the_gate() {
        let app = TestApp::new();
        let patient = app.create_user(Role::Patient, "Pat").await;

        // Same key and issuer, but already past its expiry
        let stale = AuthBackend::new(&auth_config(TEST_JWT_SECRET, chrono::Duration::minutes(-5)))
            .unwrap();
        let token = stale
            .issue_token(patient.id(), &patient.user.mobile_number, Role::Patient)
            .unwrap();

        let response = app.send(get("/v1/account", Some(&token))).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.error_code(), "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn test_token_signed_with_another_secret_is_rejected() {
        let app = TestApp::new();
        let patient = app.create_user(Role::Patient, "Pat").await;

        let foreign = AuthBackend::new(&auth_config("some-other-secret", chrono::Duration::hours(1)))
            .unwrap();
        let token = foreign
            .issue_token(patient.id(), &patient.user.mobile_number, Role::Admin)
            .unwrap();

        let response = app.send(get("/v1/account", Some(&token))).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.error_code(), "INVALID_TOKEN");
    }
}

mod test_change_password {
    use super::*;

    #[tokio::test]
    async fn test_change_password_then_login_with_new_password() {
        let app = TestApp::new();
        let patient = app.create_user(Role::Patient, "Pat").await;

        let response = app
            .send(json_request(
                Method::POST,
                "/v1/auth/password",
                Some(&patient.token),
                json!({ "old_password": TEST_PASSWORD, "new_password": "BrandNewPass2" }),
            ))
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json()["message"], "Password changed successfully");

        let old = app
            .send(json_request(
                Method::POST,
                "/v1/auth/login",
                None,
                json!({ "email": patient.user.email, "password": TEST_PASSWORD }),
            ))
            .await;
        assert_eq!(old.json()["validated"], false);

        let new = app
            .send(json_request(
                Method::POST,
                "/v1/auth/login",
                None,
                json!({ "email": patient.user.email, "password": "BrandNewPass2" }),
            ))
            .await;
        assert_eq!(new.json()["validated"], true);
    }

    #[tokio::test]
    async fn test_change_password_requires_current_password() {
        let app = TestApp::new();
        let patient = app.create_user(Role::Patient, "Pat").await;

        let response = app
            .send(json_request(
                Method::POST,
                "/v1/auth/password",
                Some(&patient.token),
                json!({ "old_password": "WrongGuess99", "new_password": "BrandNewPass2" }),
            ))
            .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error_message(), "Incorrect old password");
    }
}
