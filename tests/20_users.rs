mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::{database_server, error_message, offline_server, token_of, unique_name};

#[tokio::test]
async fn user_routes_reject_anonymous_and_non_admins() -> Result<()> {
    let server = offline_server().await?;
    let bob = server.token_for("bob", false);

    let (status, _) = server.get("/users", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = server.get("/users", Some(&bob)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = server
        .post(
            "/users",
            Some(&bob),
            json!({ "username": "x", "password": "secret", "firstName": "F", "lastName": "L", "isAdmin": true }),
        )
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = server.delete("/users/alice", Some(&bob)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn empty_patch_is_bad_request() -> Result<()> {
    let server = offline_server().await?;
    let bob = server.token_for("bob", false);

    for body in [json!({}), json!({ "nickname": "bobby" })] {
        let (status, body) = server.patch("/users/bob", Some(&bob), body).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_message(&body), "No data");
    }
    Ok(())
}

#[tokio::test]
async fn admin_creates_user_and_receives_token() -> Result<()> {
    let Some(server) = database_server().await? else { return Ok(()) };
    let (_, admin) = server.admin().await?;
    let username = unique_name("made");

    let (status, body) = server
        .post(
            "/users",
            Some(&admin),
            json!({
                "username": username,
                "password": "secret",
                "firstName": "Made",
                "lastName": "ByAdmin",
                "isAdmin": false
            }),
        )
        .await?;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body["user"],
        json!({ "username": username, "firstName": "Made", "lastName": "ByAdmin", "isAdmin": false })
    );

    let token = token_of(&body)?;
    let (status, _) = server.get(&format!("/users/{}", username), Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = server.get("/users", Some(&admin)).await?;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["users"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|u| u["username"].as_str())
        .collect();
    assert!(names.contains(&username.as_str()));
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
    Ok(())
}

#[tokio::test]
async fn users_update_themselves() -> Result<()> {
    let Some(server) = database_server().await? else { return Ok(()) };
    let username = unique_name("dave");
    let token = server.register(&username, "secret").await?;
    let path = format!("/users/{}", username);

    let (status, body) = server
        .patch(&path, Some(&token), json!({ "firstName": "David", "shoeSize": 44 }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["firstName"], "David");
    assert_eq!(body["user"]["lastName"], "Last");

    let (status, _) = server.patch(&path, Some(&token), json!({ "password": "newpass" })).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = server
        .post("/auth/token", None, json!({ "username": username, "password": "secret" }))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = server
        .post("/auth/token", None, json!({ "username": username, "password": "newpass" }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn admin_sees_missing_users_as_not_found() -> Result<()> {
    let Some(server) = database_server().await? else { return Ok(()) };
    let (_, admin) = server.admin().await?;
    let ghost = unique_name("ghost");
    let path = format!("/users/{}", ghost);

    let (status, body) = server.get(&path, Some(&admin)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_message(&body), format!("No user: {}", ghost));

    let (status, _) = server.patch(&path, Some(&admin), json!({ "lastName": "Nobody" })).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = server.delete(&path, Some(&admin)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn deleting_a_user_removes_their_collections() -> Result<()> {
    let Some(server) = database_server().await? else { return Ok(()) };
    let (_, admin) = server.admin().await?;
    let username = unique_name("erin");
    let token = server.register(&username, "secret").await?;

    let (_, body) = server.post("/collections", Some(&token), json!({ "title": "Mine" })).await?;
    let id = body["collection"]["id"].as_i64().unwrap();

    let (status, body) = server.delete(&format!("/users/{}", username), Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "deleted": username }));

    let (status, _) = server.get(&format!("/collections/{}", id), Some(&admin)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
