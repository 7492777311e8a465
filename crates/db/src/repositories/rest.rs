use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use tracing::debug;

use pricecast_core::config::StoreConfig;
use pricecast_core::domain::product::{ProductId, ProductRecord};
use pricecast_core::store::{ProductStore, ProductUpdate, StoreError};

/// Product table behind a PostgREST-style HTTP API (`/rest/v1/{table}`).
pub struct RestProductStore {
    client: Client,
    base_url: String,
    table: String,
    key: SecretString,
}

impl RestProductStore {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let key = config.access_key().cloned().ok_or_else(|| {
            StoreError::Unsupported("a REST store needs a service or anon key".to_string())
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|error| StoreError::Transport(error.to_string()))?;

        Ok(Self {
            client,
            base_url: config.url.trim().trim_end_matches('/').to_string(),
            table: config.table.clone(),
            key,
        })
    }

    pub fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let key = self.key.expose_secret();
        request.header("apikey", key).bearer_auth(key)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|error| StoreError::Transport(error.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Rejected { status: status.as_u16(), body })
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, StoreError> {
        response.json::<T>().await.map_err(|error| StoreError::Decode(error.to_string()))
    }
}

#[async_trait::async_trait]
impl ProductStore for RestProductStore {
    async fn fetch_all(&self) -> Result<Vec<ProductRecord>, StoreError> {
        let request = self.client.get(self.table_url()).query(&[("select", "*")]);
        let records: Vec<ProductRecord> = Self::decode(self.send(request).await?).await?;
        debug!(event_name = "store.rest.fetched", rows = records.len(), "catalog fetched");
        Ok(records)
    }

    /// Reads the keys of one row. An empty table exposes no columns, so nothing is
    /// reported missing.
    async fn missing_columns(&self, required: &[&str]) -> Result<Vec<String>, StoreError> {
        let request = self.client.get(self.table_url()).query(&[("select", "*"), ("limit", "1")]);
        let rows: Vec<Map<String, Value>> = Self::decode(self.send(request).await?).await?;

        let Some(sample) = rows.first() else {
            debug!(
                event_name = "store.rest.schema_unknown",
                "table is empty; skipping column check"
            );
            return Ok(Vec::new());
        };
        Ok(required
            .iter()
            .filter(|column| !sample.contains_key(**column))
            .map(|column| column.to_string())
            .collect())
    }

    async fn update(&self, id: &ProductId, update: &ProductUpdate) -> Result<(), StoreError> {
        if update.is_empty() {
            return Ok(());
        }

        let request = self
            .client
            .patch(self.table_url())
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(update);
        let updated: Vec<Value> = Self::decode(self.send(request).await?).await?;

        if updated.is_empty() {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use secrecy::SecretString;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    use pricecast_core::config::AppConfig;
    use pricecast_core::domain::product::ProductId;
    use pricecast_core::store::{ProductStore, ProductUpdate, StoreError, PRICING_COLUMNS};

    use super::RestProductStore;

    type Requests = Arc<Mutex<Vec<String>>>;

    /// Answers one connection per canned `(status, body)` and keeps the raw
    /// request text for assertions.
    async fn stub_api(responses: Vec<(u16, &'static str)>) -> (RestProductStore, Requests) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let address = listener.local_addr().expect("address");
        let requests: Requests = Arc::default();
        let seen = Arc::clone(&requests);

        tokio::spawn(async move {
            for (status, body) in responses {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let request = read_request(&mut socket).await;
                seen.lock().expect("requests lock").push(request);
                let reply = format!(
                    "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\n\
                     Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        let store = RestProductStore::new(&config(&format!("http://{address}"))).expect("store");
        (store, requests)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let read = socket.read(&mut chunk).await.unwrap_or(0);
            if read == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..read]);

            let text = String::from_utf8_lossy(&buffer);
            if let Some(end) = text.find("\r\n\r\n") {
                let body_len = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buffer.len() >= end + 4 + body_len {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }

    fn recorded(requests: &Requests) -> Vec<String> {
        requests.lock().expect("requests lock").clone()
    }

    fn config(url: &str) -> pricecast_core::config::StoreConfig {
        let mut store = AppConfig::default().store;
        store.url = url.to_string();
        store.service_key = Some(SecretString::from("service-key".to_string()));
        store.timeout_secs = 2;
        store
    }

    #[test]
    fn table_url_joins_base_and_table() {
        let store = RestProductStore::new(&config("https://catalog.example.test/")).expect("store");
        assert_eq!(store.table_url(), "https://catalog.example.test/rest/v1/products");
    }

    #[test]
    fn missing_key_is_rejected() {
        let mut store_config = config("https://catalog.example.test");
        store_config.service_key = None;

        let error = RestProductStore::new(&store_config).err().expect("no key");
        assert!(matches!(error, StoreError::Unsupported(_)));
    }

    #[tokio::test]
    async fn unreachable_store_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let address = listener.local_addr().expect("address");
        drop(listener);

        let store = RestProductStore::new(&config(&format!("http://{address}"))).expect("store");
        let fetch = store.fetch_all().await.expect_err("nothing listening");
        let update = store
            .update(&ProductId("p-1".to_string()), &ProductUpdate::forecast(1.0))
            .await
            .expect_err("nothing listening");

        assert!(matches!(fetch, StoreError::Transport(_)));
        assert!(matches!(update, StoreError::Transport(_)));
    }

    #[tokio::test]
    async fn empty_update_skips_the_request() {
        let store = RestProductStore::new(&config("http://127.0.0.1:9")).expect("store");
        store
            .update(&ProductId("p-1".to_string()), &ProductUpdate::default())
            .await
            .expect("no-op update");
    }

    #[tokio::test]
    async fn fetch_all_decodes_loosely_typed_rows() {
        let (store, requests) = stub_api(vec![(
            200,
            r#"[{"id":1,"name":"Tea","price":"25.5","is_promo":1},{"id":"p-2"}]"#,
        )])
        .await;

        let records = store.fetch_all().await.expect("fetch");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, ProductId("1".to_string()));
        assert_eq!(records[0].name.as_deref(), Some("Tea"));
        assert_eq!(records[0].price, Some(25.5));
        assert_eq!(records[0].is_promo, Some(true));
        assert_eq!(records[1].id, ProductId("p-2".to_string()));
        assert_eq!(records[1].price, None);

        let sent = recorded(&requests);
        assert!(sent[0].starts_with("GET /rest/v1/products?select=* HTTP/1.1"), "{}", sent[0]);
        assert!(sent[0].to_ascii_lowercase().contains("apikey: service-key"));
    }

    #[tokio::test]
    async fn missing_columns_reads_keys_of_one_row() {
        let (store, requests) =
            stub_api(vec![(200, r#"[{"id":"p-1","suggested_price":null}]"#), (200, "[]")]).await;

        let missing = store.missing_columns(&PRICING_COLUMNS).await.expect("first row");
        assert_eq!(missing, vec!["pricing_reason".to_string()]);

        let empty = store.missing_columns(&PRICING_COLUMNS).await.expect("empty table");
        assert!(empty.is_empty());

        let sent = recorded(&requests);
        assert!(sent[0].contains("limit=1"), "{}", sent[0]);
    }

    #[tokio::test]
    async fn update_patches_one_row_with_credentials() {
        let (store, requests) =
            stub_api(vec![(200, r#"[{"id":"p-1","predicted_sales":12.5}]"#)]).await;

        store
            .update(&ProductId("p-1".to_string()), &ProductUpdate::forecast(12.5))
            .await
            .expect("update");

        let sent = recorded(&requests);
        let request = sent[0].to_ascii_lowercase();
        assert!(request.starts_with("patch /rest/v1/products?id=eq.p-1 http/1.1"), "{request}");
        assert!(request.contains("apikey: service-key"));
        assert!(request.contains("authorization: bearer service-key"));
        assert!(request.contains("prefer: return=representation"));
        assert!(request.contains("\"predicted_sales\""));
    }

    #[tokio::test]
    async fn update_matching_no_row_is_not_found() {
        let (store, _) = stub_api(vec![(200, "[]")]).await;

        let error = store
            .update(&ProductId("p-9".to_string()), &ProductUpdate::forecast(3.0))
            .await
            .expect_err("no row");

        assert!(matches!(error, StoreError::NotFound(id) if id == ProductId("p-9".to_string())));
    }

    #[tokio::test]
    async fn non_success_status_is_rejected_with_body() {
        let (store, _) = stub_api(vec![(401, r#"{"message":"bad key"}"#)]).await;

        let error = store.fetch_all().await.expect_err("unauthorized");

        match error {
            StoreError::Rejected { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("bad key"), "{body}");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }
}
