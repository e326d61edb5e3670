//! PostgREST client for the hosted coffee database.
//!
//! Every collection is a table under `/rest/v1/`. Reads use `select=*`,
//! inserts ask for the stored row back with `Prefer: return=representation`,
//! and deletes filter with `column=eq.value`.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use super::{
    BeanRow, CafeRow, Collection, FavoriteRow, NewFavorite, NewOrder, OrderRow, RemoteStore,
    StoreError,
};
use crate::config::StoreConfig;
use crate::favorites::FavoriteTarget;

/// REST path prefix for table endpoints.
const REST_PREFIX: &str = "rest/v1/";

/// HTTP client for the remote store.
#[derive(Clone)]
pub struct RestStore {
    client: reqwest::Client,
    base_url: Url,
}

impl RestStore {
    /// Create a new REST store client.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();

        let key = config.anon_key.expose_secret();
        headers.insert(
            "apikey",
            HeaderValue::from_str(key)
                .map_err(|e| StoreError::InvalidConfig(format!("Invalid API key format: {e}")))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| StoreError::InvalidConfig(format!("Invalid API key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Endpoint URL for a table.
    fn endpoint(&self, collection: Collection) -> Result<Url, StoreError> {
        self.base_url
            .join(REST_PREFIX)
            .and_then(|rest| rest.join(collection.table()))
            .map_err(|e| StoreError::InvalidConfig(format!("Invalid store URL: {e}")))
    }

    /// Fetch every row of a table, optionally ordered.
    #[instrument(skip(self))]
    async fn select<T: DeserializeOwned>(
        &self,
        collection: Collection,
        order: Option<&str>,
    ) -> Result<Vec<T>, StoreError> {
        let mut url = self.endpoint(collection)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("select", "*");
            if let Some(order) = order {
                query.append_pair("order", order);
            }
        }

        let response = self.client.get(url).send().await?;
        let rows: Vec<T> = rows_from_values(collection, decode(collection, response).await?);

        debug!(%collection, count = rows.len(), "Fetched rows");
        Ok(rows)
    }

    /// Insert one row and return the stored representation.
    #[instrument(skip(self, body))]
    async fn insert<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        collection: Collection,
        body: &B,
    ) -> Result<T, StoreError> {
        let url = self.endpoint(collection)?;

        let response = self
            .client
            .post(url)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;

        let row = decode(collection, response)
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::EmptyInsert(collection))?;
        serde_json::from_value(row).map_err(|e| StoreError::Parse {
            collection,
            message: e.to_string(),
        })
    }

    /// Delete every row where `column` equals `value`.
    #[instrument(skip(self))]
    async fn delete_where(
        &self,
        collection: Collection,
        column: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        let mut url = self.endpoint(collection)?;
        url.query_pairs_mut()
            .append_pair(column, &format!("eq.{value}"));

        let response = self.client.delete(url).send().await?;
        ensure_success(collection, response).await?;
        Ok(())
    }
}

/// Turn a non-success response into [`StoreError::Api`].
async fn ensure_success(
    collection: Collection,
    response: reqwest::Response,
) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(StoreError::Api {
        collection,
        status: status.as_u16(),
        message,
    })
}

/// Check the status and decode a JSON array body into untyped rows.
async fn decode(
    collection: Collection,
    response: reqwest::Response,
) -> Result<Vec<serde_json::Value>, StoreError> {
    let response = ensure_success(collection, response).await?;
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| StoreError::Parse {
        collection,
        message: e.to_string(),
    })
}

/// Convert untyped rows, skipping any that do not fit the row type.
fn rows_from_values<T: DeserializeOwned>(
    collection: Collection,
    values: Vec<serde_json::Value>,
) -> Vec<T> {
    let total = values.len();
    let rows: Vec<T> = values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            serde_json::from_value(value)
                .inspect_err(|e| warn!(%collection, index, error = %e, "Skipping malformed row"))
                .ok()
        })
        .collect();
    if rows.len() < total {
        warn!(%collection, skipped = total - rows.len(), "Some rows could not be read");
    }
    rows
}

#[async_trait]
impl RemoteStore for RestStore {
    async fn list_cafes(&self) -> Result<Vec<CafeRow>, StoreError> {
        self.select(Collection::Cafes, None).await
    }

    async fn list_beans(&self) -> Result<Vec<BeanRow>, StoreError> {
        self.select(Collection::Beans, None).await
    }

    async fn list_favorites(&self) -> Result<Vec<FavoriteRow>, StoreError> {
        self.select(Collection::Favorites, None).await
    }

    async fn list_orders(&self) -> Result<Vec<OrderRow>, StoreError> {
        self.select(Collection::Orders, Some("created_at.desc")).await
    }

    async fn insert_favorite(&self, favorite: &NewFavorite) -> Result<FavoriteRow, StoreError> {
        self.insert(Collection::Favorites, favorite).await
    }

    async fn delete_favorite(&self, target: &FavoriteTarget) -> Result<(), StoreError> {
        let (column, value) = match target {
            FavoriteTarget::Cafe(id) => ("cafe_id", id.as_str()),
            FavoriteTarget::Bean(id) => ("bean_id", id.as_str()),
        };
        self.delete_where(Collection::Favorites, column, value).await
    }

    async fn insert_order(&self, order: &NewOrder) -> Result<OrderRow, StoreError> {
        self.insert(Collection::Orders, order).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;
    use serde_json::json;

    use super::*;

    fn config(base: &str) -> StoreConfig {
        StoreConfig {
            base_url: Url::parse(base).unwrap(),
            anon_key: SecretString::from("anon-test-key"),
            request_timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_endpoint_joins_table_path() {
        let store = RestStore::new(&config("https://abc.supabase.co/")).unwrap();
        let url = store.endpoint(Collection::Orders).unwrap();
        assert_eq!(url.as_str(), "https://abc.supabase.co/rest/v1/orders");
    }

    #[test]
    fn test_rejects_key_with_newline() {
        let mut cfg = config("https://abc.supabase.co/");
        cfg.anon_key = SecretString::from("bad\nkey");
        assert!(matches!(
            RestStore::new(&cfg),
            Err(StoreError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_malformed_rows_are_skipped_individually() {
        let orders: Vec<OrderRow> = rows_from_values(
            Collection::Orders,
            vec![
                json!({
                    "id": 17,
                    "created_at": "2025-11-06T08:00:00Z",
                    "cafe_id": 1,
                    "bean_id": "kenyan-aa",
                    "method": "aeropress"
                }),
                json!({
                    "id": "order-2",
                    "created_at": "2025-11-05T08:00:00Z",
                    "cafe_id": "1",
                    "bean_id": "kenyan-aa",
                    "method": null
                }),
            ],
        );

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id.as_str(), "17");
        assert_eq!(orders[0].cafe_id.as_str(), "1");
    }

    #[test]
    fn test_numeric_favorite_ids_decode() {
        let favorites: Vec<FavoriteRow> =
            rows_from_values(Collection::Favorites, vec![json!({ "id": 1, "cafe_id": "1" })]);
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].id.as_str(), "1");
    }
}
