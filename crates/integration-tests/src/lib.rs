//! Integration test harness for the InMind storefront.
//!
//! Each [`TestApp`] runs the real router (sessions, middleware, services)
//! in-process against an in-memory slot store and a `wiremock` stand-in
//! for the product API. Requests go through `tower::ServiceExt::oneshot`;
//! a [`Client`] carries the session cookie between requests like a browser.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p inmind-integration-tests
//! ```

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use inmind_storefront::config::StorefrontConfig;
use inmind_storefront::state::AppState;
use inmind_storefront::storage::SlotStore;

/// A product as the product API returns it.
#[must_use]
pub fn product_json(id: i64, title: &str, category: &str, price: f64, rate: f64) -> Value {
    json!({
        "id": id,
        "title": title,
        "price": price,
        "description": format!("{title} description"),
        "category": category,
        "image": format!("https://img.example.com/{id}.jpg"),
        "rating": {"rate": rate, "count": 120}
    })
}

/// The catalog every test starts with.
#[must_use]
pub fn sample_catalog() -> Vec<Value> {
    vec![
        product_json(1, "Fjallraven Backpack", "men's clothing", 109.95, 3.9),
        product_json(2, "Slim Fit T-Shirt", "men's clothing", 22.3, 4.1),
        product_json(5, "Dragon Bracelet", "jewelery", 695.0, 4.6),
        product_json(9, "Portable Hard Drive", "electronics", 64.0, 3.3),
        product_json(10, "SanDisk SSD", "electronics", 109.0, 2.9),
    ]
}

/// The storefront router plus its collaborators.
pub struct TestApp {
    pub router: Router,
    pub store: SlotStore,
    pub product_api: MockServer,
}

impl TestApp {
    /// Start with the sample catalog mounted.
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Start with a customized configuration.
    pub async fn spawn_with(configure: impl FnOnce(&mut StorefrontConfig)) -> Self {
        let product_api = MockServer::start().await;
        mount_catalog(&product_api, &sample_catalog()).await;

        let mut config = StorefrontConfig::ephemeral(Url::parse(&product_api.uri()).unwrap());
        configure(&mut config);

        let store = SlotStore::from_config(&config.storage).await.unwrap();
        let state = AppState::with_store(config, store.clone()).unwrap();

        Self {
            router: inmind_storefront::app(state),
            store,
            product_api,
        }
    }

    /// A fresh browser with no cookies.
    #[must_use]
    pub fn client(&self) -> Client {
        Client {
            router: self.router.clone(),
            cookie: None,
            forwarded_for: None,
        }
    }

    /// A browser logged in as the demo shopper.
    pub async fn user_client(&self) -> Client {
        let mut client = self.client();
        client
            .login("user@demo.com", "password123", "user")
            .await
            .assert_status(StatusCode::OK);
        client
    }

    /// A browser logged in as the demo admin.
    pub async fn admin_client(&self) -> Client {
        let mut client = self.client();
        client
            .login("admin@demo.com", "admin123", "admin")
            .await
            .assert_status(StatusCode::OK);
        client
    }
}

/// Mount list, detail, category and category-list endpoints for `products`.
pub async fn mount_catalog(server: &MockServer, products: &[Value]) {
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products))
        .mount(server)
        .await;

    let mut categories: Vec<String> = Vec::new();
    for product in products {
        let id = product["id"].as_i64().unwrap();
        Mock::given(method("GET"))
            .and(path(format!("/products/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(product))
            .mount(server)
            .await;

        let category = product["category"].as_str().unwrap().to_string();
        if !categories.contains(&category) {
            categories.push(category);
        }
    }

    for category in &categories {
        let in_category: Vec<&Value> = products
            .iter()
            .filter(|p| p["category"] == category.as_str())
            .collect();
        let encoded = category.replace('\'', "%27").replace(' ', "%20");
        Mock::given(method("GET"))
            .and(path(format!("/products/category/{encoded}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(in_category))
            .mount(server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/products/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(categories))
        .mount(server)
        .await;
}

/// A cookie-carrying client over the in-process router.
pub struct Client {
    router: Router,
    cookie: Option<String>,
    forwarded_for: Option<String>,
}

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// Panic with the body if the status is not `expected`.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status, expected,
            "unexpected status, body: {}",
            self.body
        );
        self
    }
}

impl Client {
    /// Send every request as if proxied for `ip`.
    #[must_use]
    pub fn with_forwarded_for(mut self, ip: &str) -> Self {
        self.forwarded_for = Some(ip.to_string());
        self
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn patch(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PATCH, uri, Some(body)).await
    }

    pub async fn delete(&mut self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None).await
    }

    pub async fn login(&mut self, email: &str, password: &str, kind: &str) -> TestResponse {
        self.post(
            "/api/auth/login",
            json!({"email": email, "password": password, "kind": kind}),
        )
        .await
    }

    /// Send a request, keeping whatever session cookie the server sets.
    pub async fn send(&mut self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        if let Some(ip) = &self.forwarded_for {
            builder = builder.header("x-forwarded-for", ip);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
        {
            self.cookie = set_cookie.split(';').next().map(str::to_string);
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// A valid checkout form.
#[must_use]
pub fn checkout_form() -> Value {
    json!({
        "shipping": {
            "first_name": "Jane",
            "last_name": "Doe",
            "email": "jane@example.com",
            "phone": "5551234567",
            "address": "1 Main St",
            "city": "Springfield",
            "state": "IL",
            "zip_code": "62701",
            "country": "US"
        },
        "payment": {
            "card_number": "4242424242424242",
            "card_name": "Jane Doe",
            "expiry_date": "12/30",
            "cvv": "123"
        }
    })
}
