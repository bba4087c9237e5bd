mod common;

use axum::http::{StatusCode, header};
use common::{bond_product, etf_product, spawn_app};
use invest_hub::models::investment;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde_json::json;

#[tokio::test]
async fn test_create_investment_records_transaction_and_log() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let product_id = app.create_product(&admin, bond_product()).await;
    let token = app.register_verified("investor@example.com").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/investments",
            Some(&token),
            Some(json!({ "product_id": product_id, "amount": 5000.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let inv = &body["investment"];
    assert_eq!(inv["status"], "active");
    assert_eq!(inv["expected_return"], 7.5);
    let reference = inv["reference"].as_str().unwrap();
    assert!(reference.starts_with("INV-"));
    assert_eq!(reference.len(), 16);
    assert!(reference[4..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    assert!(inv["maturity_date"].as_str().is_some());

    let (_, body) = app.request("GET", "/api/transactions", Some(&token), None).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["transactions"][0]["kind"], "investment");
    assert_eq!(body["transactions"][0]["amount"], 5000.0);
    assert_eq!(body["transactions"][0]["formatted_amount"], "₹5,000.00");
    assert!(body["transactions"][0]["formatted_date"].as_str().is_some());

    let (_, body) = app
        .request("GET", "/api/logs?action=investment_created", Some(&token), None)
        .await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 20);

    let (status, body) = app.request("GET", "/api/investments", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["investments"][0]["product_name"], "Treasury Bond 2030");
    assert_eq!(body["investments"][0]["product_category"], "bond");
    assert_eq!(body["investments"][0]["gain_percentage"], 0.0);
    let today = chrono::Utc::now().format("%d %b %Y").to_string();
    assert_eq!(body["investments"][0]["formatted_invested_at"], today);
    assert!(body["investments"][0]["formatted_maturity_date"].as_str().is_some());
}

#[tokio::test]
async fn test_investment_amount_rules() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let product_id = app.create_product(&admin, bond_product()).await;
    let token = app.register_verified("rules@example.com").await;

    for amount in [0.0, -10.0, 999.0, 100_001.0] {
        let (status, _) = app
            .request(
                "POST",
                "/api/investments",
                Some(&token),
                Some(json!({ "product_id": product_id, "amount": amount })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "amount {amount}");
    }

    let (status, _) = app
        .request(
            "POST",
            "/api/investments",
            Some(&token),
            Some(json!({ "product_id": 9999, "amount": 5000.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Deactivated products take no new money
    let (status, _) = app
        .request("DELETE", &format!("/api/products/{product_id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .request(
            "POST",
            "/api/investments",
            Some(&token),
            Some(json!({ "product_id": product_id, "amount": 5000.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app.request("GET", "/api/transactions", Some(&token), None).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_cancel_refunds_principal_once() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let product_id = app.create_product(&admin, etf_product()).await;
    let token = app.register_verified("cancel@example.com").await;

    let (_, body) = app
        .request(
            "POST",
            "/api/investments",
            Some(&token),
            Some(json!({ "product_id": product_id, "amount": 2500.0 })),
        )
        .await;
    let id = body["investment"]["id"].as_i64().unwrap();

    let (status, body) = app
        .request("POST", &format!("/api/investments/{id}/cancel"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["investment"]["status"], "cancelled");
    assert!(body["investment"]["cancelled_at"].as_str().is_some());

    let (status, _) = app
        .request("POST", &format!("/api/investments/{id}/cancel"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app
        .request("GET", "/api/transactions?kind=refund", Some(&token), None)
        .await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["transactions"][0]["amount"], 2500.0);

    let (_, body) = app
        .request("GET", "/api/investments?status=active", Some(&token), None)
        .await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_investments_are_private() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let product_id = app.create_product(&admin, etf_product()).await;
    let owner = app.register_verified("owner@example.com").await;
    let other = app.register_verified("other@example.com").await;

    let (_, body) = app
        .request(
            "POST",
            "/api/investments",
            Some(&owner),
            Some(json!({ "product_id": product_id, "amount": 1000.0 })),
        )
        .await;
    let id = body["investment"]["id"].as_i64().unwrap();

    let (status, _) = app
        .request("GET", &format!("/api/investments/{id}"), Some(&other), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .request("POST", &format!("/api/investments/{id}/cancel"), Some(&other), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .request("GET", &format!("/api/investments/{id}"), Some(&owner), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["investment"]["amount"], 1000.0);

    let (_, body) = app.request("GET", "/api/transactions", Some(&other), None).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_portfolio_and_dashboard() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let bond = app.create_product(&admin, bond_product()).await;
    let etf = app.create_product(&admin, etf_product()).await;
    let token = app.register_verified("folio@example.com").await;

    for (product_id, amount) in [(bond, 3000.0), (etf, 1000.0), (etf, 500.0)] {
        let (status, _) = app
            .request(
                "POST",
                "/api/investments",
                Some(&token),
                Some(json!({ "product_id": product_id, "amount": amount })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (_, list) = app.request("GET", "/api/investments", Some(&token), None).await;
    // Newest first: the 500 ETF holding
    let newest = list["investments"][0]["id"].as_i64().unwrap();
    app.request("POST", &format!("/api/investments/{newest}/cancel"), Some(&token), None)
        .await;

    let (status, body) = app
        .request("GET", "/api/investments/portfolio", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let p = &body["portfolio"];
    assert_eq!(p["total_invested"], 4000.0);
    assert_eq!(p["active_count"], 2);
    assert_eq!(p["cancelled_count"], 1);
    assert_eq!(p["allocation"][0]["category"], "bond");
    assert_eq!(p["allocation"][0]["percentage"], 75.0);
    assert_eq!(p["formatted"]["total_invested"], "₹4,000.00");

    let (status, body) = app.request("GET", "/api/dashboard", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "folio@example.com");
    assert_eq!(body["portfolio"]["total_invested"], 4000.0);
    assert_eq!(body["recent_transactions"].as_array().unwrap().len(), 4);
    assert_eq!(body["recent_activity"].as_array().unwrap().len(), 5);
    assert_eq!(body["top_products"][0]["name"], "Index ETF");
}

#[tokio::test]
async fn test_matured_investments_are_flagged() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let product_id = app.create_product(&admin, bond_product()).await;
    let token = app.register_verified("mature@example.com").await;

    let (_, body) = app
        .request(
            "POST",
            "/api/investments",
            Some(&token),
            Some(json!({ "product_id": product_id, "amount": 1000.0 })),
        )
        .await;
    let id = body["investment"]["id"].as_i64().unwrap() as i32;

    // Backdate the holding so its maturity lies in the past
    let row = investment::Entity::find_by_id(id)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    let start = chrono::Utc::now() - chrono::Duration::days(730);
    let mut active: investment::ActiveModel = row.into();
    active.invested_at = Set(start.to_rfc3339());
    active.maturity_date = Set(Some((start + chrono::Duration::days(365)).to_rfc3339()));
    active.update(&app.db).await.unwrap();

    let (_, body) = app
        .request("GET", &format!("/api/investments/{id}"), Some(&token), None)
        .await;
    assert_eq!(body["investment"]["status"], "matured");
    // Growth stops at maturity: one year at 7.5%
    assert_eq!(body["investment"]["current_value"], 1075.0);

    let (status, _) = app
        .request("POST", &format!("/api/investments/{id}/cancel"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_transaction_export_and_pagination() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let product_id = app.create_product(&admin, etf_product()).await;
    let token = app.register_verified("export@example.com").await;

    for _ in 0..3 {
        app.request(
            "POST",
            "/api/investments",
            Some(&token),
            Some(json!({ "product_id": product_id, "amount": 600.0 })),
        )
        .await;
    }

    let (_, body) = app
        .request("GET", "/api/transactions?page=2&limit=2", Some(&token), None)
        .await;
    assert_eq!(body["total"], 3);
    assert_eq!(body["page"], 2);
    assert_eq!(body["transactions"].as_array().unwrap().len(), 1);

    let (status, headers, bytes) = app
        .request_raw("GET", "/api/transactions/export", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        headers[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/csv")
    );
    let csv = String::from_utf8(bytes).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "id,date,kind,amount,status,description,investment_id");
    assert_eq!(lines.len(), 4);
    assert!(lines[1].contains(",investment,600.00,completed,"));
}

#[tokio::test]
async fn test_admin_can_list_all_logs() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let user = app.register_verified("logs@example.com").await;

    let (status, _) = app.request("GET", "/api/logs?all=true", Some(&user), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, mine) = app.request("GET", "/api/logs", Some(&user), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, all) = app.request("GET", "/api/logs?all=true", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(all["total"].as_u64().unwrap() > mine["total"].as_u64().unwrap());
}

#[tokio::test]
async fn test_past_maturity_cannot_be_cancelled() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let product_id = app.create_product(&admin, bond_product()).await;
    let token = app.register_verified("late@example.com").await;

    let (_, body) = app
        .request(
            "POST",
            "/api/investments",
            Some(&token),
            Some(json!({ "product_id": product_id, "amount": 2000.0 })),
        )
        .await;
    let id = body["investment"]["id"].as_i64().unwrap() as i32;

    let row = investment::Entity::find_by_id(id)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    let mut active: investment::ActiveModel = row.into();
    active.maturity_date = Set(Some(
        (chrono::Utc::now() - chrono::Duration::days(365)).to_rfc3339(),
    ));
    active.update(&app.db).await.unwrap();

    // No read in between: the cancel itself must notice the maturity
    let (status, _) = app
        .request("POST", &format!("/api/investments/{id}/cancel"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app
        .request("GET", "/api/transactions?kind=refund", Some(&token), None)
        .await;
    assert_eq!(body["total"], 0);

    let (_, body) = app
        .request("GET", &format!("/api/investments/{id}"), Some(&token), None)
        .await;
    assert_eq!(body["investment"]["status"], "matured");
}

#[tokio::test]
async fn test_concurrent_cancels_refund_once() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let product_id = app.create_product(&admin, etf_product()).await;
    let token = app.register_verified("race@example.com").await;

    let (_, body) = app
        .request(
            "POST",
            "/api/investments",
            Some(&token),
            Some(json!({ "product_id": product_id, "amount": 1500.0 })),
        )
        .await;
    let id = body["investment"]["id"].as_i64().unwrap();
    let uri = format!("/api/investments/{id}/cancel");

    let (first, second) = tokio::join!(
        app.request("POST", &uri, Some(&token), None),
        app.request("POST", &uri, Some(&token), None),
    );
    let statuses = [first.0, second.0];
    assert!(statuses.contains(&StatusCode::OK), "{statuses:?}");
    assert!(statuses.contains(&StatusCode::BAD_REQUEST), "{statuses:?}");

    let (_, body) = app
        .request("GET", "/api/transactions?kind=refund", Some(&token), None)
        .await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["transactions"][0]["amount"], 1500.0);
}
