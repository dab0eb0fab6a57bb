mod common;

use axum::http::StatusCode;
use common::{TEST_PASSWORD, spawn_app};
use rollcall_db::Store;
use rollcall_models::Role;
use serde_json::json;

fn register_body(unique_id: &str, email: &str, role: &str) -> serde_json::Value {
    json!({
        "name": "Asha Rao",
        "email": email,
        "password": "secret123",
        "uniqueId": unique_id,
        "role": role,
    })
}

#[tokio::test]
async fn test_admin_registers_student_who_can_log_in() {
    let app = spawn_app();
    let admin = app.create_user("ADM001", Role::Admin, None).await;
    let token = app.token_for(&admin);

    let (status, body) = app
        .post(
            "/api/users",
            Some(&token),
            register_body("STU001", "Asha@College.edu", "student"),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["uniqueId"], "STU001");
    assert_eq!(body["user"]["email"], "asha@college.edu");
    assert_eq!(body["user"]["role"], "student");
    assert!(body["user"].get("passwordHash").is_none());

    let (status, body) = app
        .post(
            "/api/users/login",
            None,
            json!({ "uniqueId": "STU001", "password": "secret123" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Asha Rao");

    let student_token = body["token"].as_str().unwrap().to_string();
    let (status, body) = app.get("/api/users/profile", Some(&student_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["uniqueId"], "STU001");
    assert_eq!(body["class"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_unique_id_is_case_insensitive() {
    let app = spawn_app();
    let admin = app.create_user("ADM001", Role::Admin, None).await;
    let token = app.token_for(&admin);

    let (status, body) = app
        .post(
            "/api/users",
            Some(&token),
            register_body("stu007", "lower@college.edu", "student"),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["uniqueId"], "STU007");

    let (status, body) = app
        .post(
            "/api/users/login",
            None,
            json!({ "uniqueId": " Stu007 ", "password": "secret123" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["uniqueId"], "STU007");

    let (status, _) = app
        .post(
            "/api/users",
            Some(&token),
            register_body("STU007", "other@college.edu", "student"),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_failures_share_one_message() {
    let app = spawn_app();
    app.create_user("FAC001", Role::Faculty, None).await;

    let (status, wrong_password) = app
        .post(
            "/api/users/login",
            None,
            json!({ "uniqueId": "FAC001", "password": "not-the-password" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, unknown_id) = app
        .post(
            "/api/users/login",
            None,
            json!({ "uniqueId": "FAC999", "password": TEST_PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(wrong_password["error"], "Invalid ID or password");
    assert_eq!(wrong_password, unknown_id);
    assert_eq!(unknown_id["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_bad_prefixes() {
    let app = spawn_app();
    let admin = app.create_user("ADM001", Role::Admin, None).await;
    let token = app.token_for(&admin);

    let (status, _) = app
        .post(
            "/api/users",
            Some(&token),
            register_body("STU001", "asha@college.edu", "student"),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .post(
            "/api/users",
            Some(&token),
            register_body("STU002", "ASHA@college.edu", "student"),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE_RECORD");

    let (status, _) = app
        .post(
            "/api/users",
            Some(&token),
            register_body("STU001", "other@college.edu", "student"),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .post(
            "/api/users",
            Some(&token),
            register_body("FAC001", "fac@college.edu", "student"),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Student ID must start with STU");
}

#[tokio::test]
async fn test_register_validation_errors() {
    let app = spawn_app();
    let admin = app.create_user("ADM001", Role::Admin, None).await;
    let token = app.token_for(&admin);

    let mut short_password = register_body("STU001", "asha@college.edu", "student");
    short_password["password"] = json!("abc");
    let (status, body) = app.post("/api/users", Some(&token), short_password).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = app
        .post(
            "/api/users",
            Some(&token),
            json!({
                "name": "No Role",
                "email": "x@college.edu",
                "password": "secret123",
                "uniqueId": "STU009",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = app
        .post(
            "/api/users",
            Some(&token),
            register_body("STU001", "asha@college.edu", "principal"),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_updates_and_deletes_user() {
    let app = spawn_app();
    let admin = app.create_user("ADM001", Role::Admin, None).await;
    let student = app.create_user("STU001", Role::Student, None).await;
    let class = app.create_class("CSE", "A").await;
    let token = app.token_for(&admin);

    let (status, body) = app
        .put(
            &format!("/api/users/{}", student.id),
            Some(&token),
            json!({ "name": "Renamed", "classId": class.id }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Renamed");
    assert_eq!(body["class"]["name"], "CSE");

    let (status, body) = app
        .put(
            &format!("/api/users/{}", student.id),
            Some(&token),
            json!({ "role": "faculty" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Faculty ID must start with FAC");

    let (status, body) = app
        .delete(&format!("/api/users/{}", student.id), Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted successfully");

    let (status, _) = app
        .delete(&format!("/api/users/{}", student.id), Some(&token))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .put("/api/users/not-a-uuid", Some(&token), json!({ "name": "X" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_users_resolves_classes() {
    let app = spawn_app();
    let admin = app.create_user("ADM001", Role::Admin, None).await;
    let class = app.create_class("ECE", "B").await;
    app.create_user("STU001", Role::Student, Some(class.id)).await;
    app.create_user("FAC001", Role::Faculty, Some(class.id)).await;

    let (status, body) = app.get("/api/users", Some(&app.token_for(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 3);

    let student = users.iter().find(|u| u["uniqueId"] == "STU001").unwrap();
    assert_eq!(student["class"]["section"], "B");
}

#[tokio::test]
async fn test_password_reset_flow() {
    let app = spawn_app();
    let student = app.create_user("STU001", Role::Student, None).await;

    let (status, body) = app
        .post(
            "/api/users/send-code",
            None,
            json!({ "email": student.email.to_uppercase() }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Verification code sent to email");

    let stored = app
        .store
        .find_user_by_email(&student.email)
        .await
        .unwrap()
        .unwrap();
    let code = stored.reset_code.unwrap();
    assert_eq!(code.len(), 6);

    let wrong_code = if code == "000000" { "111111" } else { "000000" };
    let (status, body) = app
        .post(
            "/api/users/reset-password",
            None,
            json!({ "email": student.email, "code": wrong_code, "newPassword": "brand-new" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Invalid verification code");

    let (status, body) = app
        .post(
            "/api/users/reset-password",
            None,
            json!({ "email": student.email, "code": code, "newPassword": "brand-new" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password updated successfully");

    let (status, _) = app
        .post(
            "/api/users/login",
            None,
            json!({ "uniqueId": "STU001", "password": "brand-new" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .post(
            "/api/users/login",
            None,
            json!({ "uniqueId": "STU001", "password": TEST_PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_send_code_for_unknown_email() {
    let app = spawn_app();
    let (status, body) = app
        .post(
            "/api/users/send-code",
            None,
            json!({ "email": "nobody@college.edu" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}
