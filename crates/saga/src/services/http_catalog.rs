//! Product catalog client over HTTP/JSON.
//!
//! `GET {base}/products/{id}` returns `{"id", "price", "stock", ...}` with the
//! price as decimal text. Stock is written with `PUT {base}/products/{id}` and
//! a `{"stock": n}` body.

use std::time::Duration;

use async_trait::async_trait;
use domain::{Money, ProductId};
use reqwest::{Client, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};

use super::catalog::{CatalogError, ProductSnapshot, StockCatalogClient};

const BODY_EXCERPT_LEN: usize = 256;

#[derive(Debug, Deserialize)]
struct ProductDto {
    price: String,
    stock: i64,
}

#[derive(Debug, Serialize)]
struct StockUpdate {
    stock: i64,
}

/// HTTP client for the product catalog.
///
/// `adjust_stock` reads the current stock and writes the new absolute value.
/// The two requests are not atomic, so concurrent adjustments of the same
/// product can overwrite each other.
#[derive(Debug, Clone)]
pub struct HttpStockCatalogClient {
    client: Client,
    base_url: Url,
}

impl HttpStockCatalogClient {
    /// Creates a client for the catalog at `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CatalogError> {
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|e| {
            CatalogError::Unavailable(format!("invalid catalog url '{base_url}': {e}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(CatalogError::Unavailable(format!(
                "catalog url '{base_url}' cannot hold a path"
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Unavailable(format!("http client: {e}")))?;
        Ok(Self { client, base_url })
    }

    /// The catalog base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn product_url(&self, product_id: &ProductId) -> Result<Url, CatalogError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CatalogError::Unavailable(format!("catalog url '{}' cannot hold a path", self.base_url)))?
            .pop_if_empty()
            .push("products")
            .push(product_id.as_str());
        Ok(url)
    }
}

fn transport_error(method: &str, url: &Url, err: reqwest::Error) -> CatalogError {
    if err.is_timeout() {
        CatalogError::Unavailable(format!("{method} {url}: timed out"))
    } else {
        CatalogError::Unavailable(format!("{method} {url}: {err}"))
    }
}

async fn unexpected_status(method: &str, url: &Url, response: Response) -> CatalogError {
    let status = response.status();
    let body: String = response
        .text()
        .await
        .unwrap_or_default()
        .chars()
        .take(BODY_EXCERPT_LEN)
        .collect();
    CatalogError::Unavailable(format!("{method} {url}: status={status} body={body}"))
}

#[async_trait]
impl StockCatalogClient for HttpStockCatalogClient {
    async fn fetch_snapshot(&self, product_id: &ProductId) -> Result<ProductSnapshot, CatalogError> {
        let url = self.product_url(product_id)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| transport_error("GET", &url, e))?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => return Err(CatalogError::NotFound(product_id.clone())),
            _ => return Err(unexpected_status("GET", &url, response).await),
        }

        let dto: ProductDto = response
            .json()
            .await
            .map_err(|e| CatalogError::Malformed(format!("GET {url}: {e}")))?;
        let unit_price: Money = dto
            .price
            .parse()
            .map_err(|e| CatalogError::Malformed(format!("price of {product_id}: {e}")))?;

        Ok(ProductSnapshot {
            product_id: product_id.clone(),
            unit_price,
            stock: dto.stock,
        })
    }

    async fn adjust_stock(&self, product_id: &ProductId, delta: i64) -> Result<(), CatalogError> {
        let current = self.fetch_snapshot(product_id).await?;
        let next = current
            .stock
            .checked_add(delta)
            .ok_or_else(|| CatalogError::Malformed(format!("stock of {product_id} overflows")))?;
        if next < 0 {
            return Err(CatalogError::InsufficientStock {
                product_id: product_id.clone(),
                delta,
            });
        }

        let url = self.product_url(product_id)?;
        let response = self
            .client
            .put(url.clone())
            .json(&StockUpdate { stock: next })
            .send()
            .await
            .map_err(|e| transport_error("PUT", &url, e))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(CatalogError::NotFound(product_id.clone())),
            StatusCode::BAD_REQUEST => Err(CatalogError::InsufficientStock {
                product_id: product_id.clone(),
                delta,
            }),
            _ => Err(unexpected_status("PUT", &url, response).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> HttpStockCatalogClient {
        HttpStockCatalogClient::new(base, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_product_url_appends_to_base_path() {
        let url = client("http://catalog:8081").product_url(&ProductId::new("P1")).unwrap();
        assert_eq!(url.as_str(), "http://catalog:8081/products/P1");

        let url = client("http://catalog/api/").product_url(&ProductId::new("P1")).unwrap();
        assert_eq!(url.as_str(), "http://catalog/api/products/P1");
    }

    #[test]
    fn test_product_id_is_percent_encoded() {
        let url = client("http://catalog").product_url(&ProductId::new("a/b c")).unwrap();
        assert_eq!(url.as_str(), "http://catalog/products/a%2Fb%20c");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let err = HttpStockCatalogClient::new("not a url", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, CatalogError::Unavailable(_)));
    }
}
