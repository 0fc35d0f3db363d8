mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::{TestApp, note};

#[tokio::test]
async fn owner_can_do_everything() -> Result<()> {
    let app = TestApp::new()?;
    let owner = app.register("Owner", "owner@example.com").await?;
    let board = app.board(&owner, "Launch").await?;

    let (status, body) = app.get(&format!("/boards/{}", board), &owner.token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "OWNER");
    assert_eq!(body["ownerId"], owner.id.as_str());

    let (status, body) = app
        .patch(
            &format!("/boards/{}", board),
            &owner.token,
            json!({ "name": " Launch v2 ", "description": "final" }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Launch v2");
    assert_eq!(body["description"], "final");

    let (status, body) = app
        .patch(&format!("/boards/{}", board), &owner.token, json!({ "description": null }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["description"].is_null());
    assert_eq!(body["name"], "Launch v2");

    let (status, element) = app
        .post(&format!("/boards/{}/elements", board), &owner.token, note("hi"))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let element_id = element["id"].as_str().unwrap();

    let (status, _) = app
        .put(&format!("/elements/{}", element_id), &owner.token, json!({ "width": 300 }))
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.delete(&format!("/elements/{}", element_id), &owner.token).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.delete(&format!("/boards/{}", board), &owner.token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Board deleted successfully");
    Ok(())
}

#[tokio::test]
async fn outsiders_are_forbidden() -> Result<()> {
    let app = TestApp::new()?;
    let owner = app.register("Owner", "owner@example.com").await?;
    let outsider = app.register("Mallory", "mallory@example.com").await?;
    let board = app.board(&owner, "Private").await?;

    let (_, element) = app
        .post(&format!("/boards/{}/elements", board), &owner.token, note("secret plans"))
        .await?;
    let element_id = element["id"].as_str().unwrap();

    let checks = [
        app.get(&format!("/boards/{}", board), &outsider.token).await?,
        app.get(&format!("/boards/{}/elements", board), &outsider.token).await?,
        app.post(&format!("/boards/{}/elements", board), &outsider.token, note("x")).await?,
        app.patch(&format!("/boards/{}", board), &outsider.token, json!({ "name": "mine" })).await?,
        app.put(&format!("/elements/{}", element_id), &outsider.token, json!({ "width": 1 })).await?,
        app.delete(&format!("/elements/{}", element_id), &outsider.token).await?,
        app.delete(&format!("/boards/{}", board), &outsider.token).await?,
    ];
    for (status, body) in checks {
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", body);
    }

    let (_, boards) = app.get("/boards", &outsider.token).await?;
    assert_eq!(boards, json!([]));
    Ok(())
}

#[tokio::test]
async fn access_is_checked_before_the_payload() -> Result<()> {
    let app = TestApp::new()?;
    let owner = app.register("Owner", "owner@example.com").await?;
    let outsider = app.register("Mallory", "mallory@example.com").await?;
    let board = app.board(&owner, "Private").await?;

    // An invalid element from an outsider is refused, not validated.
    let (status, _) = app
        .post(&format!("/boards/{}/elements", board), &outsider.token, json!({ "type": "NOTE" }))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn viewer_is_read_only() -> Result<()> {
    let app = TestApp::new()?;
    let owner = app.register("Owner", "owner@example.com").await?;
    let viewer = app.register("Vera", "vera@example.com").await?;
    let board = app.board(&owner, "Shared").await?;
    app.share(&owner, &board, "vera@example.com", "VIEWER").await?;

    let (_, element) = app
        .post(&format!("/boards/{}/elements", board), &owner.token, note("read me"))
        .await?;
    let element_id = element["id"].as_str().unwrap();

    let (status, elements) = app.get(&format!("/boards/{}/elements", board), &viewer.token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(elements.as_array().unwrap().len(), 1);
    assert_eq!(elements[0]["data"]["text"], "read me");

    let (status, body) = app.get(&format!("/boards/{}", board), &viewer.token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "VIEWER");

    let (status, _) = app
        .post(&format!("/boards/{}/elements", board), &viewer.token, note("x"))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .put(&format!("/elements/{}", element_id), &viewer.token, json!({ "width": 5 }))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.delete(&format!("/elements/{}", element_id), &viewer.token).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .patch(&format!("/boards/{}", board), &viewer.token, json!({ "name": "Mine now" }))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .post(
            &format!("/boards/{}/collaborators", board),
            &viewer.token,
            json!({ "email": "owner@example.com", "role": "VIEWER" }),
        )
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.delete(&format!("/boards/{}", board), &viewer.token).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.get(&format!("/boards/{}", board), &owner.token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Shared");
    Ok(())
}

#[tokio::test]
async fn editor_manages_elements_but_not_the_board() -> Result<()> {
    let app = TestApp::new()?;
    let owner = app.register("Owner", "owner@example.com").await?;
    let editor = app.register("Eddie", "eddie@example.com").await?;
    let board = app.board(&owner, "Shared").await?;
    app.share(&owner, &board, "eddie@example.com", "EDITOR").await?;

    let (status, element) = app
        .post(&format!("/boards/{}/elements", board), &editor.token, note("draft"))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let element_id = element["id"].as_str().unwrap();

    let (status, updated) = app
        .put(
            &format!("/elements/{}", element_id),
            &editor.token,
            json!({ "data": { "text": "final", "color": "green" } }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["color"], "green");

    let (status, _) = app.delete(&format!("/elements/{}", element_id), &editor.token).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.delete(&format!("/boards/{}", board), &editor.token).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .post(
            &format!("/boards/{}/collaborators", board),
            &editor.token,
            json!({ "email": "owner@example.com", "role": "VIEWER" }),
        )
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, boards) = app.get("/boards", &editor.token).await?;
    assert_eq!(boards[0]["role"], "EDITOR");
    Ok(())
}

#[tokio::test]
async fn deleting_a_board_takes_its_elements_and_grants() -> Result<()> {
    let app = TestApp::new()?;
    let owner = app.register("Owner", "owner@example.com").await?;
    let editor = app.register("Eddie", "eddie@example.com").await?;
    let board = app.board(&owner, "Doomed").await?;
    app.share(&owner, &board, "eddie@example.com", "EDITOR").await?;

    let (_, element) = app
        .post(&format!("/boards/{}/elements", board), &owner.token, note("bye"))
        .await?;
    let element_id = element["id"].as_str().unwrap();

    let (status, _) = app.delete(&format!("/boards/{}", board), &owner.token).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get(&format!("/boards/{}/elements", board), &owner.token).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.delete(&format!("/elements/{}", element_id), &owner.token).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, boards) = app.get("/boards", &editor.token).await?;
    assert_eq!(boards, json!([]));
    Ok(())
}

#[tokio::test]
async fn collaborator_management() -> Result<()> {
    let app = TestApp::new()?;
    let owner = app.register("Owner", "owner@example.com").await?;
    let friend = app.register("Friend", "friend@example.com").await?;
    let board = app.board(&owner, "Shared").await?;
    let uri = format!("/boards/{}/collaborators", board);

    let (status, _) = app
        .post(&uri, &owner.token, json!({ "email": "ghost@example.com", "role": "VIEWER" }))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post(&uri, &owner.token, json!({ "email": "owner@example.com", "role": "EDITOR" }))
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .post(&uri, &owner.token, json!({ "email": "Friend@example.com", "role": "VIEWER" }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["userId"], friend.id.as_str());
    assert_eq!(body["role"], "VIEWER");

    let (status, _) = app
        .post(&uri, &owner.token, json!({ "email": "friend@example.com", "role": "EDITOR" }))
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, list) = app.get(&uri, &friend.token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, _) = app.delete(&format!("{}/{}", uri, friend.id), &owner.token).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get(&format!("/boards/{}", board), &friend.token).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.delete(&format!("{}/{}", uri, friend.id), &owner.token).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn unknown_ids_are_not_found() -> Result<()> {
    let app = TestApp::new()?;
    let owner = app.register("Owner", "owner@example.com").await?;

    let (status, body) = app.get("/boards/not-a-uuid", &owner.token).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Board not found");

    let missing = uuid::Uuid::new_v4();
    let (status, _) = app.put(&format!("/elements/{}", missing), &owner.token, json!({})).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
