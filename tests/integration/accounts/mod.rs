//! Profile and user management endpoint tests

use axum::http::{Method, StatusCode};
use carepoint_accounts::{CredentialStore, UserStore};
use carepoint_auth::Role;
use serde_json::json;

use crate::common::{delete, get, json_request, TestApp, TEST_PASSWORD};

mod test_profile {
    use super::*;

    #[tokio::test]
    async fn test_get_current_user() {
        let app = TestApp::new();
        let patient = app.create_user(Role::Patient, "Pat").await;

        let response = app.send(get("/v1/account", Some(&patient.token))).await;

        assert_eq!(response.status, StatusCode::OK);
        let profile = response.json();
        assert_eq!(profile["id"], patient.id().to_string());
        assert_eq!(profile["email"], patient.user.email);
        assert_eq!(profile["role"], "PATIENT");
        assert!(profile.get("password").is_none());
        assert!(profile.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_token_for_deleted_user_finds_no_profile() {
        let app = TestApp::new();
        let patient = app.create_user(Role::Patient, "Pat").await;
        app.accounts.delete(patient.id()).await.unwrap();

        let response = app.send(get("/v1/account", Some(&patient.token))).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }
}

mod test_listings {
    use super::*;

    #[tokio::test]
    async fn test_list_users_is_admin_only() {
        let app = TestApp::new();
        let admin = app.create_user(Role::Admin, "Root").await;
        let doctor = app.create_user(Role::Doctor, "Grey").await;

        let forbidden = app.send(get("/v1/users", Some(&doctor.token))).await;
        assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
        assert_eq!(forbidden.error_code(), "FORBIDDEN_ROLE");

        let allowed = app.send(get("/v1/users", Some(&admin.token))).await;
        assert_eq!(allowed.status, StatusCode::OK);
        assert_eq!(allowed.json().as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_patients_for_clinic_staff_only() {
        let app = TestApp::new();
        let patient = app.create_user(Role::Patient, "Pat").await;
        let staff = app.create_user(Role::Staff, "Desk").await;
        app.create_user(Role::Doctor, "Grey").await;

        let forbidden = app.send(get("/v1/patients", Some(&patient.token))).await;
        assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

        let allowed = app.send(get("/v1/patients", Some(&staff.token))).await;
        assert_eq!(allowed.status, StatusCode::OK);
        let patients = allowed.json();
        let patients = patients.as_array().unwrap();
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0]["id"], patient.id().to_string());
    }

    #[tokio::test]
    async fn test_list_doctors_hides_contact_details() {
        let app = TestApp::new();
        let patient = app.create_user(Role::Patient, "Pat").await;

        let none = app.send(get("/v1/doctors", Some(&patient.token))).await;
        assert_eq!(none.status, StatusCode::NOT_FOUND);
        assert_eq!(none.error_message(), "No doctors found");

        app.create_user(Role::Doctor, "Grey").await;
        let response = app.send(get("/v1/doctors", Some(&patient.token))).await;
        assert_eq!(response.status, StatusCode::OK);

        let doctors = response.json();
        let doctors = doctors.as_array().unwrap();
        assert_eq!(doctors.len(), 1);
        assert_eq!(doctors[0]["first_name"], "Grey");
        assert!(doctors[0].get("email").is_none());
        assert!(doctors[0].get("mobile_number").is_none());
    }
}

mod test_update_user {
    use super::*;

    #[tokio::test]
    async fn test_user_updates_own_profile() {
        let app = TestApp::new();
        let patient = app.create_user(Role::Patient, "Pat").await;

        let response = app
            .send(json_request(
                Method::PATCH,
                &format!("/v1/users/{}", patient.id()),
                Some(&patient.token),
                json!({ "address": "12 Harbour Rd", "gender": "FEMALE" }),
            ))
            .await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json()["address"], "12 Harbour Rd");
        assert_eq!(response.json()["gender"], "FEMALE");
        assert_eq!(response.json()["first_name"], "Pat");
    }

    #[tokio::test]
    async fn test_user_cannot_edit_someone_else() {
        let app = TestApp::new();
        let patient = app.create_user(Role::Patient, "Pat").await;
        let other = app.create_user(Role::Patient, "Other").await;

        let response = app
            .send(json_request(
                Method::PATCH,
                &format!("/v1/users/{}", other.id()),
                Some(&patient.token),
                json!({ "first_name": "Hijacked" }),
            ))
            .await;

        assert_eq!(response.status, StatusCode::FORBIDDEN);
        let stored = app.accounts.find_by_id(other.id()).await.unwrap().unwrap();
        assert_eq!(stored.first_name, "Other");
    }

    #[tokio::test]
    async fn test_only_admin_changes_role_or_active() {
        let app = TestApp::new();
        let patient = app.create_user(Role::Patient, "Pat").await;
        let admin = app.create_user(Role::Admin, "Root").await;

        let escalation = app
            .send(json_request(
                Method::PATCH,
                &format!("/v1/users/{}", patient.id()),
                Some(&patient.token),
                json!({ "role": "ADMIN" }),
            ))
            .await;
        assert_eq!(escalation.status, StatusCode::FORBIDDEN);

        let promotion = app
            .send(json_request(
                Method::PATCH,
                &format!("/v1/users/{}", patient.id()),
                Some(&admin.token),
                json!({ "role": "STAFF", "active": false }),
            ))
            .await;
        assert_eq!(promotion.status, StatusCode::OK);
        assert_eq!(promotion.json()["role"], "STAFF");
        assert_eq!(promotion.json()["active"], false);
    }

    #[tokio::test]
    async fn test_email_change_moves_login() {
        let app = TestApp::new();
        let patient = app.create_user(Role::Patient, "Pat").await;

        let response = app
            .send(json_request(
                Method::PATCH,
                &format!("/v1/users/{}", patient.id()),
                Some(&patient.token),
                json!({ "email": "pat.new@carepoint.test" }),
            ))
            .await;
        assert_eq!(response.status, StatusCode::OK);

        let credential = CredentialStore::find_by_user_id(app.accounts.as_ref(), patient.id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(credential.email, "pat.new@carepoint.test");

        let login = app
            .send(json_request(
                Method::POST,
                "/v1/auth/login",
                None,
                json!({ "email": "pat.new@carepoint.test", "password": TEST_PASSWORD }),
            ))
            .await;
        assert_eq!(login.json()["validated"], true);
    }

    #[tokio::test]
    async fn test_email_taken_by_another_user_conflicts() {
        let app = TestApp::new();
        let patient = app.create_user(Role::Patient, "Pat").await;
        let other = app.create_user(Role::Patient, "Other").await;

        let response = app
            .send(json_request(
                Method::PATCH,
                &format!("/v1/users/{}", patient.id()),
                Some(&patient.token),
                json!({ "email": other.user.email }),
            ))
            .await;

        assert_eq!(response.status, StatusCode::CONFLICT);
        assert_eq!(response.error_message(), "Email already exists");
    }
}

mod test_delete_user {
    use super::*;

    #[tokio::test]
    async fn test_admin_deletes_user_and_credential() {
        let app = TestApp::new();
        let admin = app.create_user(Role::Admin, "Root").await;
        let patient = app.create_user(Role::Patient, "Pat").await;

        let response = app
            .send(delete(
                &format!("/v1/users/{}", patient.id()),
                Some(&admin.token),
            ))
            .await;
        assert_eq!(response.status, StatusCode::NO_CONTENT);
        assert_eq!(app.accounts.user_count(), 1);
        assert_eq!(app.accounts.credential_count(), 1);

        let again = app
            .send(delete(
                &format!("/v1/users/{}", patient.id()),
                Some(&admin.token),
            ))
            .await;
        assert_eq!(again.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_non_admin_cannot_delete() {
        let app = TestApp::new();
        let doctor = app.create_user(Role::Doctor, "Grey").await;
        let patient = app.create_user(Role::Patient, "Pat").await;

        let response = app
            .send(delete(
                &format!("/v1/users/{}", patient.id()),
                Some(&doctor.token),
            ))
            .await;
        assert_eq!(response.status, StatusCode::FORBIDDEN);
        assert_eq!(app.accounts.user_count(), 2);
    }
}
