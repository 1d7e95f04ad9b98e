//! Patient file endpoint tests: upload, listing, download, view, edit, delete

use axum::http::{header, Method, StatusCode};
use carepoint_auth::Role;
use serde_json::json;
use uuid::Uuid;

use crate::common::{
    delete, get, json_request, multipart_request, upload_request, Part, TestApp, TestResponse,
    UserFixture,
};

struct Clinic {
    app: TestApp,
    patient: UserFixture,
    doctor: UserFixture,
}

async fn clinic() -> Clinic {
    let app = TestApp::new();
    let patient = app.create_user(Role::Patient, "Pat").await;
    let doctor = app.create_user(Role::Doctor, "Grey").await;
    Clinic {
        app,
        patient,
        doctor,
    }
}

async fn upload(c: &Clinic, file_name: &str, content: &[u8]) -> TestResponse {
    c.app
        .send(upload_request(
            Some(&c.doctor.token),
            c.patient.id(),
            file_name,
            content,
        ))
        .await
}

fn id_of(response: &TestResponse) -> String {
    response.json()["id"].as_str().unwrap().to_string()
}

mod test_upload {
    use super::*;

    #[tokio::test]
    async fn test_doctor_uploads_for_patient() {
        let c = clinic().await;

        let response = upload(&c, "blood-panel.txt", b"glucose: 5.1").await;

        assert_eq!(response.status, StatusCode::CREATED);
        let body = response.json();
        assert_eq!(body["owner_user_id"], c.patient.id().to_string());
        assert_eq!(body["uploaded_by_user_id"], c.doctor.id().to_string());
        assert_eq!(body["file_name"], "blood-panel.txt");
        assert_eq!(body["category"], "Lab Results");
        assert_eq!(body["content_type"], "text/plain");
        assert_eq!(body["size_bytes"], 12);
        assert!(body.get("blob_key").is_none());

        let expected_key = format!("patients/{}/{}", c.patient.id(), id_of(&response));
        assert_eq!(c.app.storage.keys(), vec![expected_key]);
        assert_eq!(c.app.files.file_count(), 1);
    }

    #[tokio::test]
    async fn test_rejected_roles_write_nothing() {
        let c = clinic().await;
        let staff = c.app.create_user(Role::Staff, "Desk").await;

        for token in [&c.patient.token, &staff.token] {
            let response = c
                .app
                .send(upload_request(
                    Some(token),
                    c.patient.id(),
                    "notes.txt",
                    b"hello",
                ))
                .await;
            assert_eq!(response.status, StatusCode::FORBIDDEN);
            assert_eq!(response.error_code(), "FORBIDDEN_ROLE");
        }

        assert_eq!(c.app.storage.put_count(), 0);
        assert_eq!(c.app.files.file_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_patient_is_not_found() {
        let c = clinic().await;

        let response = c
            .app
            .send(upload_request(
                Some(&c.doctor.token),
                Uuid::new_v4(),
                "notes.txt",
                b"hello",
            ))
            .await;

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.error_message(), "Patient not found");
        assert_eq!(c.app.storage.put_count(), 0);
    }

    #[tokio::test]
    async fn test_non_patient_owner_is_rejected() {
        let c = clinic().await;

        let response = c
            .app
            .send(upload_request(
                Some(&c.doctor.token),
                c.doctor.id(),
                "notes.txt",
                b"hello",
            ))
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(c.app.storage.put_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_file_is_rejected() {
        let c = clinic().await;

        let response = upload(&c, "empty.txt", b"").await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error_message(), "File is empty");
        assert_eq!(c.app.storage.put_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_parts_are_rejected() {
        let c = clinic().await;

        let no_category = c
            .app
            .send(multipart_request(
                "/v1/files",
                Some(&c.doctor.token),
                &[
                    Part::Text("patient_user_id", c.patient.id().to_string()),
                    Part::File {
                        file_name: "a.txt",
                        content_type: "text/plain",
                        content: b"abc",
                    },
                ],
            ))
            .await;
        assert_eq!(no_category.status, StatusCode::BAD_REQUEST);

        let bad_patient_id = c
            .app
            .send(multipart_request(
                "/v1/files",
                Some(&c.doctor.token),
                &[
                    Part::Text("patient_user_id", "not-a-uuid".to_string()),
                    Part::Text("category", "Imaging".to_string()),
                ],
            ))
            .await;
        assert_eq!(bad_patient_id.status, StatusCode::BAD_REQUEST);

        assert_eq!(c.app.storage.put_count(), 0);
    }

    #[tokio::test]
    async fn test_file_name_is_sanitized() {
        let c = clinic().await;

        let response = upload(&c, "../../etc/passwd", b"root").await;

        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.json()["file_name"], "passwd");
        assert!(c
            .app
            .storage
            .keys()
            .iter()
            .all(|key| key.starts_with(&format!("patients/{}/", c.patient.id()))));
    }

    #[tokio::test]
    async fn test_metadata_failure_removes_blob() {
        let c = clinic().await;
        c.app.files.set_fail_creates(true);

        let response = upload(&c, "scan.txt", b"contents").await;

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(c.app.storage.put_count(), 1);
        assert_eq!(c.app.storage.delete_count(), 1);
        assert_eq!(c.app.storage.object_count(), 0);
        assert_eq!(c.app.files.file_count(), 0);
    }

    #[tokio::test]
    async fn test_storage_failure_is_bad_gateway() {
        let c = clinic().await;
        c.app.storage.set_fail_puts(true);

        let response = upload(&c, "scan.txt", b"contents").await;

        assert_eq!(response.status, StatusCode::BAD_GATEWAY);
        assert_eq!(response.error_code(), "STORAGE_ERROR");
        assert_eq!(c.app.files.file_count(), 0);
    }
}

mod test_listing {
    use super::*;

    #[tokio::test]
    async fn test_patient_lists_own_files() {
        let c = clinic().await;

        let none = c.app.send(get("/v1/files", Some(&c.patient.token))).await;
        assert_eq!(none.status, StatusCode::NOT_FOUND);
        assert_eq!(none.error_message(), "No files found");

        upload(&c, "a.txt", b"a").await;
        upload(&c, "b.txt", b"b").await;

        let mine = c.app.send(get("/v1/files", Some(&c.patient.token))).await;
        assert_eq!(mine.status, StatusCode::OK);
        assert_eq!(mine.json().as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_patient_files_enforces_isolation() {
        let c = clinic().await;
        let other = c.app.create_user(Role::Patient, "Other").await;
        upload(&c, "a.txt", b"a").await;
        let uri = format!("/v1/patients/{}/files", c.patient.id());

        let by_doctor = c.app.send(get(&uri, Some(&c.doctor.token))).await;
        assert_eq!(by_doctor.status, StatusCode::OK);
        assert_eq!(by_doctor.json().as_array().unwrap().len(), 1);

        let by_owner = c.app.send(get(&uri, Some(&c.patient.token))).await;
        assert_eq!(by_owner.status, StatusCode::OK);

        let by_other = c.app.send(get(&uri, Some(&other.token))).await;
        assert_eq!(by_other.status, StatusCode::FORBIDDEN);
    }
}

mod test_download {
    use super::*;

    #[tokio::test]
    async fn test_download_returns_attachment() {
        let c = clinic().await;
        let uploaded = upload(&c, "results.txt", b"all clear").await;

        let response = c
            .app
            .send(get(
                &format!("/v1/files/{}/download", id_of(&uploaded)),
                Some(&c.patient.token),
            ))
            .await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, b"all clear");
        assert_eq!(response.headers[header::CONTENT_TYPE], "text/plain");
        assert_eq!(
            response.headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"results.txt\""
        );
    }

    #[tokio::test]
    async fn test_other_patients_file_looks_missing() {
        let c = clinic().await;
        let other = c.app.create_user(Role::Patient, "Other").await;
        let uploaded = upload(&c, "results.txt", b"private").await;

        for uri in [
            format!("/v1/files/{}/download", id_of(&uploaded)),
            format!("/v1/files/{}/view", id_of(&uploaded)),
        ] {
            let response = c.app.send(get(&uri, Some(&other.token))).await;
            assert_eq!(response.status, StatusCode::NOT_FOUND);
            assert_eq!(response.error_message(), "File not found");
        }
    }

    #[tokio::test]
    async fn test_view_defaults_to_inline() {
        let c = clinic().await;
        let uploaded = upload(&c, "xray.txt", b"image-bytes").await;
        let uri = format!("/v1/files/{}/view", id_of(&uploaded));

        let inline = c.app.send(get(&uri, Some(&c.doctor.token))).await;
        assert_eq!(inline.status, StatusCode::OK);
        assert_eq!(
            inline.headers[header::CONTENT_DISPOSITION],
            "inline; filename=\"xray.txt\""
        );
        assert_eq!(inline.headers[header::X_FRAME_OPTIONS], "SAMEORIGIN");
        assert_eq!(inline.headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");

        let attachment = c
            .app
            .send(get(&format!("{}?mode=attachment", uri), Some(&c.doctor.token)))
            .await;
        assert_eq!(
            attachment.headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"xray.txt\""
        );

        let invalid = c
            .app
            .send(get(&format!("{}?mode=embed", uri), Some(&c.doctor.token)))
            .await;
        assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let c = clinic().await;

        let response = c
            .app
            .send(get(
                &format!("/v1/files/{}/download", Uuid::new_v4()),
                Some(&c.doctor.token),
            ))
            .await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }
}

mod test_modify {
    use super::*;

    #[tokio::test]
    async fn test_update_details_records_editor() {
        let c = clinic().await;
        let admin = c.app.create_user(Role::Admin, "Root").await;
        let uploaded = upload(&c, "a.txt", b"a").await;

        let response = c
            .app
            .send(json_request(
                Method::PATCH,
                &format!("/v1/files/{}", id_of(&uploaded)),
                Some(&admin.token),
                json!({ "file_name": "renamed.txt", "category": "Imaging" }),
            ))
            .await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json()["file_name"], "renamed.txt");
        assert_eq!(response.json()["category"], "Imaging");
        assert_eq!(response.json()["uploaded_by_user_id"], admin.id().to_string());
    }

    #[tokio::test]
    async fn test_patient_cannot_modify_files() {
        let c = clinic().await;
        let uploaded = upload(&c, "a.txt", b"a").await;
        let uri = format!("/v1/files/{}", id_of(&uploaded));

        let update = c
            .app
            .send(json_request(
                Method::PATCH,
                &uri,
                Some(&c.patient.token),
                json!({ "file_name": "mine.txt" }),
            ))
            .await;
        assert_eq!(update.status, StatusCode::FORBIDDEN);

        let removal = c.app.send(delete(&uri, Some(&c.patient.token))).await;
        assert_eq!(removal.status, StatusCode::FORBIDDEN);
        assert_eq!(c.app.storage.object_count(), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_blob_and_metadata() {
        let c = clinic().await;
        let uploaded = upload(&c, "a.txt", b"a").await;
        let uri = format!("/v1/files/{}", id_of(&uploaded));

        let response = c.app.send(delete(&uri, Some(&c.doctor.token))).await;
        assert_eq!(response.status, StatusCode::NO_CONTENT);
        assert_eq!(c.app.storage.object_count(), 0);
        assert_eq!(c.app.files.file_count(), 0);

        let again = c.app.send(delete(&uri, Some(&c.doctor.token))).await;
        assert_eq!(again.status, StatusCode::NOT_FOUND);
    }
}
