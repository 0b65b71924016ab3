//! Wix REST client: pricing-plan orders and contact lookup.

use crate::adapters::http::{read_json, transport_error};
use crate::config::SyncConfig;
use crate::domain::model::{Contact, Order, OrderStatus, Price};
use crate::domain::ports::OrderSource;
use crate::utils::error::{Result, SyncError};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const ORDERS_SERVICE: &str = "Wix Pricing Plans";
const CONTACTS_SERVICE: &str = "Wix Contacts";

#[derive(Debug, Clone)]
pub struct WixClientConfig {
    pub api_key: String,
    pub site_id: String,
    pub base_url: String,
    pub page_size: u32,
    pub timeout: Duration,
    pub max_pages: usize,
}

impl From<&SyncConfig> for WixClientConfig {
    fn from(config: &SyncConfig) -> Self {
        Self {
            api_key: config.commerce.api_key.clone(),
            site_id: config.commerce.site_id.clone(),
            base_url: config.commerce_base_url().to_string(),
            page_size: config.page_size(),
            timeout: config.commerce_timeout(),
            max_pages: config.max_pages(),
        }
    }
}

pub struct WixClient {
    client: Client,
    base_url: Url,
    api_key: String,
    site_id: String,
    page_size: u32,
    max_pages: usize,
}

impl WixClient {
    pub fn new(config: WixClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| SyncError::InvalidConfigValueError {
            field: "commerce.base_url".to_string(),
            value: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SyncError::ConfigError {
                message: format!("cannot build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key,
            site_id: config.site_id,
            page_size: config.page_size,
            max_pages: config.max_pages,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SyncError::InvalidConfigValueError {
                field: "commerce.base_url".to_string(),
                value: self.base_url.to_string(),
                reason: "URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get(&self, url: Url) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header("Authorization", &self.api_key)
            .header("wix-site-id", &self.site_id)
            .header("Accept", "application/json")
    }

    async fn fetch_page(&self, cursor: Option<&str>) -> Result<OrdersPage> {
        let mut url = self.endpoint(&["pricing-plans", "v2", "orders"])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("limit", &self.page_size.to_string());
            if let Some(cursor) = cursor {
                query.append_pair("cursor", cursor);
            }
        }

        tracing::debug!("GET {}", url);
        let response = self
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(ORDERS_SERVICE, e))?;
        read_json(ORDERS_SERVICE, response).await
    }
}

impl OrderSource for WixClient {
    async fn list_orders(&self) -> Result<Vec<Order>> {
        let mut orders = Vec::new();
        let mut cursor: Option<String> = None;

        for page_number in 1..=self.max_pages {
            let page = self.fetch_page(cursor.as_deref()).await?;
            let next = page.next_cursor();
            tracing::debug!(
                "Orders page {} returned {} orders (next cursor: {})",
                page_number,
                page.orders.len(),
                next.is_some()
            );
            orders.extend(page.orders.into_iter().map(WixOrder::into_order));

            match next {
                None => {
                    tracing::info!("Retrieved {} orders in {} page(s)", orders.len(), page_number);
                    return Ok(orders);
                }
                Some(next) if cursor.as_deref() == Some(next.as_str()) => {
                    return Err(SyncError::FatalError {
                        service: ORDERS_SERVICE.to_string(),
                        message: format!("pagination cursor '{}' repeated", next),
                    });
                }
                Some(next) => cursor = Some(next),
            }
        }

        Err(SyncError::FatalError {
            service: ORDERS_SERVICE.to_string(),
            message: format!("still paginating after {} pages", self.max_pages),
        })
    }

    async fn get_contact(&self, contact_id: &str) -> Result<Contact> {
        let url = self.endpoint(&["contacts", "v4", "contacts", contact_id])?;
        tracing::debug!("GET {}", url);

        let response = self
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(CONTACTS_SERVICE, e))?;
        let body: ContactResponse = read_json(CONTACTS_SERVICE, response).await?;
        Ok(body.contact.into_contact(contact_id))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrdersPage {
    #[serde(default)]
    orders: Vec<WixOrder>,
    paging_metadata: Option<PagingMetadata>,
}

impl OrdersPage {
    fn next_cursor(&self) -> Option<String> {
        self.paging_metadata
            .as_ref()
            .and_then(|m| m.cursors.as_ref())
            .and_then(|c| c.next.clone())
            .filter(|next| !next.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct PagingMetadata {
    cursors: Option<Cursors>,
}

#[derive(Debug, Deserialize)]
struct Cursors {
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WixOrder {
    id: String,
    status: Option<String>,
    plan_name: Option<String>,
    buyer: Option<Buyer>,
    start_date: Option<String>,
    end_date: Option<String>,
    created_date: Option<String>,
    pricing: Option<Pricing>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Buyer {
    contact_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Pricing {
    #[serde(default)]
    prices: Vec<PriceEntry>,
}

#[derive(Debug, Deserialize)]
struct PriceEntry {
    price: Option<WixPrice>,
}

#[derive(Debug, Deserialize)]
struct WixPrice {
    total: Option<serde_json::Value>,
    currency: Option<String>,
}

impl WixOrder {
    fn into_order(self) -> Order {
        let price = self
            .pricing
            .and_then(|p| p.prices.into_iter().next())
            .and_then(|entry| entry.price)
            .map(|price| Price {
                total: match price.total {
                    Some(serde_json::Value::String(s)) => s,
                    Some(serde_json::Value::Null) | None => String::new(),
                    Some(other) => other.to_string(),
                },
                currency: price.currency.unwrap_or_default(),
            });

        Order {
            id: self.id,
            status: OrderStatus::parse(self.status.as_deref().unwrap_or_default()),
            plan_name: self.plan_name.unwrap_or_default(),
            subscriber: self
                .buyer
                .and_then(|b| b.contact_id)
                .filter(|id| !id.is_empty()),
            start_date: self.start_date,
            end_date: self.end_date,
            created_date: self.created_date,
            price,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ContactResponse {
    contact: WixContact,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WixContact {
    id: Option<String>,
    info: Option<ContactInfo>,
    primary_email: Option<PrimaryEmail>,
}

#[derive(Debug, Deserialize)]
struct ContactInfo {
    name: Option<ContactName>,
}

#[derive(Debug, Deserialize)]
struct ContactName {
    first: Option<String>,
    last: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PrimaryEmail {
    email: Option<String>,
}

impl WixContact {
    fn into_contact(self, requested_id: &str) -> Contact {
        let (first, last) = self
            .info
            .and_then(|i| i.name)
            .map(|n| (n.first.unwrap_or_default(), n.last.unwrap_or_default()))
            .unwrap_or_default();

        Contact {
            id: self.id.unwrap_or_else(|| requested_id.to_string()),
            name: format!("{} {}", first, last).trim().to_string(),
            email: self
                .primary_email
                .and_then(|e| e.email)
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_mapping() {
        let raw = serde_json::json!({
            "id": "ord-1",
            "planName": "Online Pilates",
            "status": "ACTIVE",
            "buyer": {"contactId": "c-9", "memberId": "m-1"},
            "startDate": "2024-01-01T00:00:00Z",
            "endDate": "2024-12-31T00:00:00Z",
            "createdDate": "2023-12-30T08:00:00Z",
            "pricing": {"prices": [{"price": {"total": "19.00", "currency": "USD"}}]}
        });
        let order = serde_json::from_value::<WixOrder>(raw).unwrap().into_order();

        assert_eq!(order.id, "ord-1");
        assert_eq!(order.status, OrderStatus::Active);
        assert_eq!(order.subscriber.as_deref(), Some("c-9"));
        assert_eq!(order.price.unwrap().display(), "19.00 USD");
    }

    #[test]
    fn test_order_mapping_with_sparse_fields() {
        let raw = serde_json::json!({
            "id": "ord-2",
            "pricing": {"prices": [{"price": {"total": 7.5}}]},
            "buyer": {"contactId": ""}
        });
        let order = serde_json::from_value::<WixOrder>(raw).unwrap().into_order();

        assert_eq!(order.status, OrderStatus::Other(String::new()));
        assert_eq!(order.plan_name, "");
        assert_eq!(order.subscriber, None);
        assert_eq!(order.price.unwrap().total, "7.5");
    }

    #[test]
    fn test_contact_mapping() {
        let raw = serde_json::json!({
            "contact": {
                "id": "c-9",
                "info": {"name": {"first": "Grace", "last": "Hopper"}},
                "primaryEmail": {"email": "grace@example.com"}
            }
        });
        let contact = serde_json::from_value::<ContactResponse>(raw)
            .unwrap()
            .contact
            .into_contact("c-9");
        assert_eq!(contact.name, "Grace Hopper");
        assert_eq!(contact.email, "grace@example.com");

        let first_only = serde_json::json!({"contact": {"info": {"name": {"first": "Cher"}}}});
        let contact = serde_json::from_value::<ContactResponse>(first_only)
            .unwrap()
            .contact
            .into_contact("c-1");
        assert_eq!(contact.id, "c-1");
        assert_eq!(contact.name, "Cher");
        assert_eq!(contact.email, "");
    }

    #[test]
    fn test_blank_next_cursor_ends_pagination() {
        let page: OrdersPage = serde_json::from_value(serde_json::json!({
            "orders": [],
            "pagingMetadata": {"count": 0, "cursors": {"next": ""}}
        }))
        .unwrap();
        assert_eq!(page.next_cursor(), None);
    }
}
