mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

use common::{
    auth_disabled, auth_enabled, create_group, create_site, get, mint_token, post_json, put_json,
    send, spawn_app,
};

/// Project a forest response down to names and nesting, so trees from
/// different stores can be compared without their row ids.
fn shape(nodes: &Value) -> Value {
    let projected: Vec<Value> = nodes
        .as_array()
        .unwrap()
        .iter()
        .map(|node| {
            let sites: Vec<&str> = node["sites"]
                .as_array()
                .unwrap()
                .iter()
                .map(|s| s["name"].as_str().unwrap())
                .collect();
            json!({
                "name": node["name"],
                "sites": sites,
                "children": shape(&node["children"]),
            })
        })
        .collect();
    Value::Array(projected)
}

#[tokio::test]
async fn import_into_an_empty_store_builds_the_tree() {
    let app = spawn_app(auth_disabled()).await;

    let snapshot = json!({
        "version": "1.0.0",
        "exportDate": "2024-06-01T12:00:00Z",
        "groups": [
            { "id": 10, "name": "Tools", "orderNum": 0 },
            { "id": 11, "name": "Build", "parentId": 10, "orderNum": 0 },
        ],
        "sites": [
            { "id": 20, "groupId": 11, "name": "Forge", "url": "https://forge.example.com", "orderNum": 0 },
            // legacy producers emit 0/1 visibility flags
            { "id": 21, "groupId": 10, "name": "Dash", "url": "https://dash.example.com", "orderNum": 1, "isPublic": 0 },
        ],
        "configs": { "site.title": "Home" },
    });

    let (status, report) = send(&app.router, post_json("/api/import", None, &snapshot)).await;
    assert_eq!(status, StatusCode::OK, "import failed: {report}");
    assert_eq!(report["success"], true);
    assert_eq!(
        report["stats"],
        json!({
            "groups": { "total": 2, "created": 2, "merged": 0 },
            "sites": { "total": 2, "created": 2, "updated": 0, "skipped": 0 },
        })
    );

    let (_, forest) = send(&app.router, get("/api/groups-with-sites", None)).await;
    assert_eq!(
        shape(&forest),
        json!([{
            "name": "Tools",
            "sites": ["Dash"],
            "children": [{ "name": "Build", "sites": ["Forge"], "children": [] }],
        }])
    );
    assert_eq!(forest[0]["sites"][0]["isPublic"], false);

    let (_, configs) = send(&app.router, get("/api/configs", None)).await;
    assert_eq!(configs, json!({ "site.title": "Home" }));
}

#[tokio::test]
async fn reimporting_merges_groups_and_updates_matching_sites() {
    let app = spawn_app(auth_disabled()).await;

    let mut snapshot = json!({
        "version": "1.0.0",
        "exportDate": "2024-06-01T12:00:00Z",
        "groups": [
            { "id": 1, "name": "Tools", "orderNum": 0 },
            { "id": 2, "name": "Media", "orderNum": 1 },
        ],
        "sites": [
            { "id": 5, "groupId": 1, "name": "Forge", "url": "https://forge.example.com", "orderNum": 0 },
            { "id": 6, "groupId": 2, "name": "Player", "url": "https://player.example.com", "orderNum": 0 },
        ],
        "configs": {},
    });

    let (status, _) = send(&app.router, post_json("/api/import", None, &snapshot)).await;
    assert_eq!(status, StatusCode::OK);

    // Same URLs in the same groups: the second run must not duplicate.
    snapshot["sites"][0]["name"] = json!("Forge CI");
    snapshot["sites"][0]["notes"] = json!("renamed upstream");
    let (status, report) = send(&app.router, post_json("/api/import", None, &snapshot)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        report["stats"],
        json!({
            "groups": { "total": 2, "created": 0, "merged": 2 },
            "sites": { "total": 2, "created": 0, "updated": 2, "skipped": 0 },
        })
    );

    let (_, groups) = send(&app.router, get("/api/groups", None)).await;
    assert_eq!(groups.as_array().unwrap().len(), 2);
    let (_, sites) = send(&app.router, get("/api/sites", None)).await;
    assert_eq!(sites.as_array().unwrap().len(), 2);
    assert_eq!(sites[0]["name"], "Forge CI");
    assert_eq!(sites[0]["notes"], "renamed upstream");
}

#[tokio::test]
async fn sites_whose_group_is_missing_are_skipped_not_fatal() {
    let app = spawn_app(auth_disabled()).await;

    let snapshot = json!({
        "version": "1.0.0",
        "exportDate": "2024-06-01T12:00:00Z",
        "groups": [{ "id": 1, "name": "Tools", "orderNum": 0 }],
        "sites": [
            { "id": 5, "groupId": 1, "name": "Forge", "url": "https://forge.example.com", "orderNum": 0 },
            { "id": 6, "groupId": 999, "name": "Lost", "url": "https://lost.example.com", "orderNum": 0 },
        ],
        "configs": {},
    });

    let (status, report) = send(&app.router, post_json("/api/import", None, &snapshot)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        report["stats"]["sites"],
        json!({ "total": 2, "created": 1, "updated": 0, "skipped": 1 })
    );

    let (_, sites) = send(&app.router, get("/api/sites", None)).await;
    let names: Vec<&str> = sites
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Forge"]);
}

#[tokio::test]
async fn invalid_snapshots_are_rejected_before_any_write() {
    let app = spawn_app(auth_disabled()).await;

    let snapshot = json!({
        "version": "1.0.0",
        "exportDate": "2024-06-01T12:00:00Z",
        "groups": [{ "id": 1, "name": "", "orderNum": 0 }],
        "sites": [
            { "id": 5, "groupId": 1, "name": "Forge", "url": "not a url", "orderNum": 0 },
        ],
        "configs": {},
    });

    let (status, body) = send(&app.router, post_json("/api/import", None, &snapshot)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION");
    assert_eq!(
        body["error"]["details"],
        json!([
            "groups[0]: name must be a string",
            "sites[0]: invalid URL format",
        ])
    );

    let (_, groups) = send(&app.router, get("/api/groups", None)).await;
    assert_eq!(groups, json!([]));

    // Shape errors never reach validation; the extractor rejects them.
    let malformed = json!({
        "version": "1.0.0",
        "exportDate": "2024-06-01T12:00:00Z",
        "groups": [],
        "sites": [],
    });
    let (status, _) = send(&app.router, post_json("/api/import", None, &malformed)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn parent_links_that_would_close_a_cycle_stay_unlinked() {
    let app = spawn_app(auth_disabled()).await;

    let a = create_group(&app.router, None, json!({ "name": "A", "orderNum": 0 })).await;
    let b = create_group(
        &app.router,
        None,
        json!({ "name": "B", "parentId": a, "orderNum": 0 }),
    )
    .await;

    // Merging by name aliases these onto the existing rows, and the
    // snapshot then asks for A to hang under B.
    let snapshot = json!({
        "version": "1.0.0",
        "exportDate": "2024-06-01T12:00:00Z",
        "groups": [
            { "id": 1, "name": "A", "parentId": 2, "orderNum": 0 },
            { "id": 2, "name": "B", "orderNum": 0 },
        ],
        "sites": [],
        "configs": {},
    });

    let (status, report) = send(&app.router, post_json("/api/import", None, &snapshot)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["stats"]["groups"]["merged"], 2);

    let (_, root) = send(&app.router, get(&format!("/api/groups/{a}"), None)).await;
    assert_eq!(root["parentId"], Value::Null);
    let (_, child) = send(&app.router, get(&format!("/api/groups/{b}"), None)).await;
    assert_eq!(child["parentId"], a);
}

#[tokio::test]
async fn transfer_routes_are_gated_when_auth_is_enabled() {
    let app = spawn_app(auth_enabled()).await;

    let (status, _) = send(&app.router, get("/api/export", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let empty = json!({
        "version": "1.0.0",
        "exportDate": "2024-06-01T12:00:00Z",
        "groups": [],
        "sites": [],
        "configs": {},
    });
    let (status, _) = send(&app.router, post_json("/api/import", None, &empty)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = mint_token();
    create_group(
        &app.router,
        Some(&token),
        json!({ "name": "Secrets", "orderNum": 0, "isPublic": false }),
    )
    .await;

    let (status, snapshot) = send(&app.router, get("/api/export", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["version"], "1.0.0");
    assert!(snapshot["exportDate"].is_string());
    // private rows are part of the dump
    assert_eq!(snapshot["groups"][0]["name"], "Secrets");
    assert_eq!(snapshot["groups"][0]["isPublic"], false);
}

#[tokio::test]
async fn an_export_can_be_imported_into_a_fresh_store() {
    let source = spawn_app(auth_disabled()).await;

    let tools = create_group(&source.router, None, json!({ "name": "Tools", "orderNum": 0 })).await;
    let build = create_group(
        &source.router,
        None,
        json!({ "name": "Build", "parentId": tools, "orderNum": 0 }),
    )
    .await;
    create_site(
        &source.router,
        None,
        json!({ "groupId": build, "name": "Forge", "url": "https://forge.example.com", "orderNum": 0 }),
    )
    .await;
    create_site(
        &source.router,
        None,
        json!({ "groupId": tools, "name": "Dash", "url": "https://dash.example.com", "orderNum": 1 }),
    )
    .await;
    send(
        &source.router,
        put_json("/api/configs/site.title", None, &json!({ "value": "Home" })),
    )
    .await;

    let (status, exported) = send(&source.router, get("/api/export", None)).await;
    assert_eq!(status, StatusCode::OK);

    let destination = spawn_app(auth_disabled()).await;
    let (status, report) = send(
        &destination.router,
        post_json("/api/import", None, &exported),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "import failed: {report}");
    assert_eq!(report["stats"]["groups"]["created"], 2);
    assert_eq!(report["stats"]["sites"]["created"], 2);

    let (_, original) = send(&source.router, get("/api/groups-with-sites", None)).await;
    let (_, restored) = send(&destination.router, get("/api/groups-with-sites", None)).await;
    assert_eq!(shape(&original), shape(&restored));

    let (_, configs) = send(&destination.router, get("/api/configs", None)).await;
    assert_eq!(configs, json!({ "site.title": "Home" }));
}
