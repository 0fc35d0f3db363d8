mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::{Value, json};

use common::TestApp;

fn analysis() -> Value {
    json!({
        "filename": "reference.wav",
        "lufs_integrated": -8.2,
        "true_peak": -0.1,
        "frequency_bands": {
            "sub_bass": -20.0, "bass": -12.5, "low_mids": -10.0,
            "mids": -9.0, "high_mids": -11.0, "highs": -15.0
        },
    })
}

#[tokio::test]
async fn session_with_null_folder_round_trips() -> Result<()> {
    let app = TestApp::new()?;
    let user = app.register("Ada", "ada@example.com").await?;

    let (status, body) = app
        .post("/sessions", &user.token, json!({ "name": "Mix A", "folderId": null }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Session created successfully");
    let id = body["session"]["id"].as_str().unwrap().to_string();

    let (status, session) = app.get(&format!("/sessions/{}", id), &user.token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["name"], "Mix A");
    assert!(session["folderId"].is_null());
    assert!(session["referenceAnalysis"].is_null());
    assert_eq!(session["userId"], user.id.as_str());
    Ok(())
}

#[tokio::test]
async fn folder_can_be_set_and_cleared() -> Result<()> {
    let app = TestApp::new()?;
    let user = app.register("Ada", "ada@example.com").await?;

    let (status, folder) = app.post("/folders", &user.token, json!({ "name": "Album" })).await?;
    assert_eq!(status, StatusCode::CREATED);
    let folder_id = folder["id"].as_str().unwrap().to_string();

    let (_, created) = app
        .post("/sessions", &user.token, json!({ "name": "Track 1", "folderId": folder_id }))
        .await?;
    let uri = format!("/sessions/{}", created["session"]["id"].as_str().unwrap());

    let (_, session) = app.get(&uri, &user.token).await?;
    assert_eq!(session["folderId"], folder_id.as_str());
    assert_eq!(session["folder"]["name"], "Album");

    // Absent leaves it alone.
    let (status, body) = app.patch(&uri, &user.token, json!({ "name": "Track 1 (v2)" })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Session updated successfully");
    assert_eq!(body["session"]["folderId"], folder_id.as_str());

    let (status, body) = app.patch(&uri, &user.token, json!({ "folderId": null })).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["session"]["folderId"].is_null());
    assert_eq!(body["session"]["name"], "Track 1 (v2)");

    let (status, body) = app.patch(&uri, &user.token, json!({ "folderId": "" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["path"], "folderId");
    Ok(())
}

#[tokio::test]
async fn someone_elses_folder_is_not_found() -> Result<()> {
    let app = TestApp::new()?;
    let ada = app.register("Ada", "ada@example.com").await?;
    let bob = app.register("Bob", "bob@example.com").await?;

    let (_, folder) = app.post("/folders", &bob.token, json!({ "name": "Bob's" })).await?;
    let folder_id = folder["id"].as_str().unwrap();

    let (status, body) = app
        .post("/sessions", &ada.token, json!({ "name": "Mix", "folderId": folder_id }))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Folder not found");

    let (status, _) = app
        .patch(&format!("/folders/{}", folder_id), &ada.token, json!({ "name": "Mine" }))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn sessions_are_private() -> Result<()> {
    let app = TestApp::new()?;
    let ada = app.register("Ada", "ada@example.com").await?;
    let bob = app.register("Bob", "bob@example.com").await?;

    let (_, created) = app.post("/sessions", &ada.token, json!({ "name": "Ada's mix" })).await?;
    let uri = format!("/sessions/{}", created["session"]["id"].as_str().unwrap());

    let (status, _) = app.get(&uri, &bob.token).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.patch(&uri, &bob.token, json!({ "name": "stolen" })).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.delete(&uri, &bob.token).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, listed) = app.get("/sessions", &bob.token).await?;
    assert_eq!(listed, json!([]));
    let (_, listed) = app.get("/sessions", &ada.token).await?;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn reference_analysis_can_be_attached_later() -> Result<()> {
    let app = TestApp::new()?;
    let user = app.register("Ada", "ada@example.com").await?;
    let (_, created) = app.post("/sessions", &user.token, json!({ "name": "Master" })).await?;
    let id = created["session"]["id"].as_str().unwrap().to_string();

    let mut bad = analysis();
    bad["frequency_bands"]["mids"] = json!("loud");
    let (status, body) = app
        .patch(&format!("/sessions/{}/reference", id), &user.token, bad)
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["path"], "frequency_bands.mids");

    let (status, body) = app
        .patch(&format!("/sessions/{}/reference", id), &user.token, analysis())
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["referenceAnalysis"]["lufs_integrated"], -8.2);

    let (_, session) = app.get(&format!("/sessions/{}", id), &user.token).await?;
    assert_eq!(session["referenceAnalysis"]["frequency_bands"]["bass"], -12.5);
    Ok(())
}

#[tokio::test]
async fn delete_echoes_the_session() -> Result<()> {
    let app = TestApp::new()?;
    let user = app.register("Ada", "ada@example.com").await?;
    let (_, created) = app
        .post("/sessions", &user.token, json!({ "name": "Gone", "referenceAnalysis": analysis() }))
        .await?;
    let uri = format!("/sessions/{}", created["session"]["id"].as_str().unwrap());

    let (status, body) = app.delete(&uri, &user.token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Session deleted successfully");
    assert_eq!(body["session"]["name"], "Gone");
    assert_eq!(body["session"]["referenceAnalysis"]["filename"], "reference.wav");

    let (status, _) = app.get(&uri, &user.token).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn deleting_a_folder_unfiles_its_sessions() -> Result<()> {
    let app = TestApp::new()?;
    let user = app.register("Ada", "ada@example.com").await?;
    let (_, folder) = app.post("/folders", &user.token, json!({ "name": "Old" })).await?;
    let folder_id = folder["id"].as_str().unwrap().to_string();
    let (_, created) = app
        .post("/sessions", &user.token, json!({ "name": "Keep me", "folderId": folder_id }))
        .await?;
    let uri = format!("/sessions/{}", created["session"]["id"].as_str().unwrap());

    let (status, body) = app.delete(&format!("/folders/{}", folder_id), &user.token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Folder deleted successfully");

    let (status, session) = app.get(&uri, &user.token).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(session["folderId"].is_null());

    let (_, folders) = app.get("/folders", &user.token).await?;
    assert_eq!(folders, json!([]));
    Ok(())
}
