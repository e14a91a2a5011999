use std::sync::Arc;

use chrono::Utc;
use reqwest::StatusCode;
use serde_json::{json, Value};

use cardstock_api::app::{router_with, AppServices};
use cardstock_core::OrgId;
use cardstock_infra::{seed_dev_data, InMemoryStore, Store, DEV_ORG_ID};
use cardstock_listings::ListingPolicy;
use cardstock_pricing::PricingPolicy;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with(AppServices::in_memory()).await
    }

    async fn spawn_with(services: AppServices) -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = router_with(Arc::new(services));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}/api/v0", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn root_url(&self) -> String {
        self.base_url.trim_end_matches("/api/v0").to_string()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Client bound to one organization via the `X-Org-Id` header.
struct OrgClient {
    http: reqwest::Client,
    base_url: String,
    org_id: OrgId,
}

impl OrgClient {
    fn new(srv: &TestServer, org_id: OrgId) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: srv.base_url.clone(),
            org_id,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.http
            .get(self.url(path))
            .header("X-Org-Id", self.org_id.to_string())
            .send()
            .await
            .unwrap()
    }

    async fn send(&self, method: reqwest::Method, path: &str, body: Value) -> reqwest::Response {
        self.http
            .request(method, self.url(path))
            .header("X-Org-Id", self.org_id.to_string())
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn post(&self, path: &str, body: Value) -> reqwest::Response {
        self.send(reqwest::Method::POST, path, body).await
    }

    async fn patch(&self, path: &str, body: Value) -> reqwest::Response {
        self.send(reqwest::Method::PATCH, path, body).await
    }

    async fn patch_without_body(&self, path: &str) -> reqwest::Response {
        self.http
            .patch(self.url(path))
            .header("X-Org-Id", self.org_id.to_string())
            .send()
            .await
            .unwrap()
    }

    async fn create_location(&self, name: &str) -> String {
        let res = self.post("/locations", json!({ "name": name })).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = res.json().await.unwrap();
        body["id"].as_str().unwrap().to_string()
    }

    async fn add_item(&self, location_id: &str, cost: f64) -> String {
        let res = self
            .post(
                "/inventory/items",
                json!({
                    "cardId": OrgId::new().to_string(),
                    "acquisitionCost": cost,
                    "locationId": location_id,
                }),
            )
            .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = res.json().await.unwrap();
        body["id"].as_str().unwrap().to_string()
    }
}

/// Amounts travel as JSON floats; compare to within a fraction of a cent.
fn assert_amount(actual: &Value, expected: f64) {
    let actual = actual.as_f64().unwrap();
    assert!((actual - expected).abs() < 0.001, "{actual} != {expected}");
}

#[tokio::test]
async fn health_needs_no_org() {
    let srv = TestServer::spawn().await;

    let res = reqwest::get(format!("{}/health", srv.root_url())).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["ok"], json!(true));
    assert!(body["at"].is_string());
}

#[tokio::test]
async fn org_context_is_required() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/inventory/items", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "missing_org");

    let res = client
        .get(format!("{}/inventory/items", srv.base_url))
        .header("X-Org-Id", "not-a-uuid")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_org");

    // The query parameter works as well as the header.
    let res = client
        .get(format!(
            "{}/inventory/items?orgId={}",
            srv.base_url,
            OrgId::new()
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn inventory_lifecycle_add_move_status() {
    let srv = TestServer::spawn().await;
    let org = OrgClient::new(&srv, OrgId::new());

    let bin_a = org.create_location("BIN-01").await;
    let bin_b = org.create_location("BIN-02").await;

    let res = org
        .post(
            "/inventory/items",
            json!({
                "cardId": OrgId::new().to_string(),
                "grade": 9.5,
                "acquisitionCost": 4.25,
                "locationId": bin_a,
                "photos": ["front.jpg", "  "],
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let location_header = res
        .headers()
        .get("location")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let item: Value = res.json().await.unwrap();
    let id = item["id"].as_str().unwrap().to_string();
    assert_eq!(item["status"], "ACTIVE");
    assert_eq!(item["condition"], "NM");
    assert_eq!(item["photos"], json!(["front.jpg"]));
    assert!(location_header.ends_with(&format!("/inventory/items/{id}")));

    let res = org.get("/inventory/items").await;
    assert_eq!(res.status(), StatusCode::OK);
    let page: Value = res.json().await.unwrap();
    assert_eq!(page["total"], 1);
    assert_eq!(page["page"], 1);
    assert_eq!(page["pageSize"], 50);

    let res = org
        .patch(&format!("/inventory/items/{id}/move"), json!({ "locationId": bin_b }))
        .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let moved: Value = org.get(&format!("/inventory/items/{id}")).await.json().await.unwrap();
    assert_eq!(moved["locationId"], json!(bin_b));
    assert_eq!(moved["status"], "ACTIVE");

    let res = org
        .patch(
            &format!("/inventory/items/{id}/move"),
            json!({ "locationId": OrgId::new().to_string() }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = org
        .patch(
            &format!("/inventory/items/{}/move", OrgId::new()),
            json!({ "locationId": bin_b }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = org
        .patch(&format!("/inventory/items/{id}/status"), json!({ "status": "SOLD" }))
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = org
        .patch(&format!("/inventory/items/{id}/status"), json!({ "status": "IN_STOCK" }))
        .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_transition");

    let res = org.get("/inventory/items?status=ACTIVE").await;
    let page: Value = res.json().await.unwrap();
    assert_eq!(page["total"], 0);

    let res = org.get("/inventory/items?pageSize=501").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn move_accepts_location_in_query_string() {
    let srv = TestServer::spawn().await;
    let org = OrgClient::new(&srv, OrgId::new());
    let bin_a = org.create_location("BIN-01").await;
    let bin_b = org.create_location("BIN-02").await;
    let id = org.add_item(&bin_a, 3.0).await;

    let res = org
        .patch_without_body(&format!("/inventory/items/{id}/move?locationId={bin_b}"))
        .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let moved: Value = org.get(&format!("/inventory/items/{id}")).await.json().await.unwrap();
    assert_eq!(moved["locationId"], json!(bin_b));

    let res = org
        .patch(
            &format!("/inventory/items/{id}/move?locationId={bin_a}"),
            json!({ "locationId": bin_b }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "location_mismatch");

    let res = org.patch(&format!("/inventory/items/{id}/move"), json!({})).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = org
        .patch_without_body(&format!("/inventory/items/{id}/move?locationId=not-a-uuid"))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn amounts_beyond_storable_range_are_rejected_and_bound_values_are_summed() {
    let srv = TestServer::spawn().await;
    let org = OrgClient::new(&srv, OrgId::new());
    let bin = org.create_location("BIN-01").await;

    let res = org
        .post(
            "/inventory/items",
            json!({
                "cardId": OrgId::new().to_string(),
                "acquisitionCost": 7.0e28,
                "locationId": bin,
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");

    let a = org.add_item(&bin, 999_999_999_999.99).await;
    let b = org.add_item(&bin, 999_999_999_999.99).await;

    let res = org.post("/pricing/evaluate", json!([a, b])).await;
    assert_eq!(res.status(), StatusCode::OK);
    let eval: Value = res.json().await.unwrap();
    assert_amount(&eval["results"][0]["price"], 1_499_999_999_999.98);

    let res = org.get("/inventory/value").await;
    assert_eq!(res.status(), StatusCode::OK);
    let value: Value = res.json().await.unwrap();
    assert_amount(&value["totalValue"], 1_999_999_999_999.98);
    assert_eq!(value["itemCount"], 2);

    let res = org
        .post("/listings", json!([{ "inventoryItemId": a, "price": 7.0e28 }]))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_proposal");

    let res = org
        .send(
            reqwest::Method::PUT,
            "/pricing/policy",
            json!({ "markup": 5000, "floor": 1, "currency": "CAD" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn organizations_are_isolated() {
    let srv = TestServer::spawn().await;
    let org_a = OrgClient::new(&srv, OrgId::new());
    let org_b = OrgClient::new(&srv, OrgId::new());

    let bin = org_a.create_location("BIN-01").await;
    let id = org_a.add_item(&bin, 2.0).await;

    let page: Value = org_b.get("/inventory/items").await.json().await.unwrap();
    assert_eq!(page["total"], 0);

    let res = org_b.get(&format!("/inventory/items/{id}")).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Org B cannot file stock into org A's bin.
    let res = org_b
        .post(
            "/inventory/items",
            json!({
                "cardId": OrgId::new().to_string(),
                "acquisitionCost": 1.0,
                "locationId": bin,
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let eval: Value = org_b
        .post("/pricing/evaluate", json!([id]))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(eval["results"], json!([]));
    assert_eq!(eval["rejected"][0]["inventoryItemId"], json!(id));
}

#[tokio::test]
async fn body_org_must_match_header() {
    let srv = TestServer::spawn().await;
    let org = OrgClient::new(&srv, OrgId::new());

    let res = org
        .post(
            "/locations",
            json!({ "orgId": OrgId::new().to_string(), "name": "BIN-01" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "org_mismatch");
}

#[tokio::test]
async fn pricing_applies_markup_floor_and_reports_unknown_ids() {
    let srv = TestServer::spawn().await;
    let org = OrgClient::new(&srv, OrgId::new());
    let bin = org.create_location("BIN-01").await;
    let ten = org.add_item(&bin, 10.0).await;
    let dime = org.add_item(&bin, 0.10).await;
    let unknown = OrgId::new().to_string();

    let res = org
        .post("/pricing/evaluate", json!([ten, dime, unknown, ten]))
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let eval: Value = res.json().await.unwrap();

    let results = eval["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["inventoryItemId"], json!(ten));
    assert_eq!(results[0]["price"].as_f64(), Some(15.0));
    assert_eq!(results[0]["currency"], "CAD");
    assert_eq!(results[1]["price"].as_f64(), Some(1.0));

    assert_eq!(
        eval["rejected"],
        json!([{ "inventoryItemId": unknown, "reason": "not_found" }])
    );
}

#[tokio::test]
async fn pricing_policy_can_be_replaced() {
    let srv = TestServer::spawn().await;
    let org = OrgClient::new(&srv, OrgId::new());

    let policy: Value = org.get("/pricing/policy").await.json().await.unwrap();
    assert_eq!(policy["markup"].as_f64(), Some(1.5));
    assert_eq!(policy["currency"], "CAD");

    let res = org
        .send(
            reqwest::Method::PUT,
            "/pricing/policy",
            json!({ "markup": 2, "floor": 0.5, "currency": "usd" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let bin = org.create_location("BIN-01").await;
    let id = org.add_item(&bin, 3.0).await;
    let eval: Value = org
        .post("/pricing/evaluate", json!([id]))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(eval["results"][0]["price"].as_f64(), Some(6.0));
    assert_eq!(eval["results"][0]["currency"], "USD");

    let res = org
        .send(
            reqwest::Method::PUT,
            "/pricing/policy",
            json!({ "markup": 0, "floor": 1, "currency": "CAD" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn listing_batch_is_all_or_nothing() {
    let srv = TestServer::spawn().await;
    let org = OrgClient::new(&srv, OrgId::new());
    let bin = org.create_location("BIN-01").await;
    let good = org.add_item(&bin, 5.0).await;
    let missing = OrgId::new().to_string();

    let res = org
        .post(
            "/listings",
            json!([
                { "inventoryItemId": good, "price": 7.5 },
                { "inventoryItemId": missing, "price": 1.0 },
            ]),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "item_not_found");
    assert_eq!(body["inventoryItemId"], json!(missing));

    let rows: Value = org.get("/listings").await.json().await.unwrap();
    assert_eq!(rows, json!([]));

    let res = org
        .post("/listings", json!([{ "inventoryItemId": good, "price": 7.5, "currency": " " }]))
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let listing = &body["listings"][0];
    assert_eq!(listing["inventoryItemId"], json!(good));
    assert_eq!(listing["price"].as_f64(), Some(7.5));
    assert_eq!(listing["currency"], "CAD");
    assert_eq!(listing["status"], "ACTIVE");
    assert_eq!(listing["channel"], "INTERNAL");

    // Empty batches succeed and write nothing.
    let body: Value = org.post("/listings", json!([])).await.json().await.unwrap();
    assert_eq!(body["listings"], json!([]));

    let res = org
        .post("/listings", json!([{ "inventoryItemId": good, "price": -1 }]))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_proposal");
}

#[tokio::test]
async fn non_active_items_are_not_listable() {
    let srv = TestServer::spawn().await;
    let org = OrgClient::new(&srv, OrgId::new());
    let bin = org.create_location("BIN-01").await;
    let id = org.add_item(&bin, 5.0).await;

    org.patch(&format!("/inventory/items/{id}/status"), json!({ "status": "DAMAGED" }))
        .await;

    let res = org
        .post("/listings", json!([{ "inventoryItemId": id, "price": 3.0 }]))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "item_not_listable");
    assert_eq!(body["inventoryItemId"], json!(id));
}

#[tokio::test]
async fn marking_items_listed_prevents_double_listing() {
    let services = AppServices::new(
        Arc::new(InMemoryStore::new()),
        PricingPolicy::default(),
        ListingPolicy {
            mark_items_listed: true,
            ..ListingPolicy::default()
        },
    );
    let srv = TestServer::spawn_with(services).await;
    let org = OrgClient::new(&srv, OrgId::new());
    let bin = org.create_location("BIN-01").await;
    let id = org.add_item(&bin, 5.0).await;

    let res = org
        .post("/listings", json!([{ "inventoryItemId": id, "price": 8.0 }]))
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let item: Value = org.get(&format!("/inventory/items/{id}")).await.json().await.unwrap();
    assert_eq!(item["status"], "LISTED");

    let res = org
        .post("/listings", json!([{ "inventoryItemId": id, "price": 8.0 }]))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "item_not_listable");
}

#[tokio::test]
async fn listing_status_transitions() {
    let srv = TestServer::spawn().await;
    let org = OrgClient::new(&srv, OrgId::new());
    let bin = org.create_location("BIN-01").await;
    let id = org.add_item(&bin, 5.0).await;

    let body: Value = org
        .post("/listings", json!([{ "inventoryItemId": id, "price": 8.0 }]))
        .await
        .json()
        .await
        .unwrap();
    let listing_id = body["listings"][0]["id"].as_str().unwrap().to_string();

    let res = org
        .patch(&format!("/listings/{listing_id}/status"), json!({ "status": "WITHDRAWN" }))
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = org
        .patch(&format!("/listings/{listing_id}/status"), json!({ "status": "SOLD" }))
        .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let withdrawn: Value = org.get("/listings?status=WITHDRAWN").await.json().await.unwrap();
    assert_eq!(withdrawn.as_array().unwrap().len(), 1);
    let active: Value = org.get("/listings?status=ACTIVE").await.json().await.unwrap();
    assert_eq!(active, json!([]));
}

#[tokio::test]
async fn inventory_value_sums_on_hand_cost() {
    let srv = TestServer::spawn().await;
    let org = OrgClient::new(&srv, OrgId::new());
    let bin = org.create_location("BIN-01").await;
    org.add_item(&bin, 2.5).await;
    org.add_item(&bin, 4.0).await;
    let sold = org.add_item(&bin, 100.0).await;
    org.patch(&format!("/inventory/items/{sold}/status"), json!({ "status": "SOLD" }))
        .await;

    let value: Value = org.get("/inventory/value").await.json().await.unwrap();
    assert_eq!(value["totalValue"].as_f64(), Some(6.5));
    assert_eq!(value["itemCount"], 2);
    assert_eq!(value["currency"], "CAD");
}

#[tokio::test]
async fn seeded_store_serves_catalog_and_bins() {
    let store = Arc::new(InMemoryStore::new());
    seed_dev_data(store.as_ref(), Utc::now()).await.unwrap();
    let store: Arc<dyn Store> = store;

    let services = AppServices::new(store, PricingPolicy::default(), ListingPolicy::default());
    let srv = TestServer::spawn_with(services).await;
    let org = OrgClient::new(&srv, DEV_ORG_ID);

    let bins: Value = org.get("/locations").await.json().await.unwrap();
    let bins = bins.as_array().unwrap();
    assert_eq!(bins.len(), 10);
    assert_eq!(bins[0]["name"], "BIN-01");
    assert_eq!(bins[0]["kind"], "BIN");

    let cards: Value = org.get("/cards?search=SPRIG").await.json().await.unwrap();
    let cards = cards.as_array().unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0]["setCode"], "SV1");
    assert_eq!(cards[0]["number"], "001");

    let none: Value = org.get("/cards?search=pikachu").await.json().await.unwrap();
    assert_eq!(none, json!([]));
}
