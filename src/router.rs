//! Static routing from store ids to service endpoints
//!
//! The router is built once from [`ServicesConfig`] and never changes.
//! Two store ids are recognized; purchases always go to the order service.

use reqwest::Url;

use crate::command::StoreId;
use crate::common::config::ServicesConfig;
use crate::common::{Error, Result};

/// A service base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    name: String,
    base: Url,
}

impl Endpoint {
    /// Parse and validate an endpoint base URL
    pub fn parse(name: &str, url: &str) -> Result<Self> {
        let base = Url::parse(url).map_err(|e| Error::invalid_endpoint(name, url, e))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::invalid_endpoint(
                name,
                url,
                format!("unsupported scheme '{}'", base.scheme()),
            ));
        }
        if base.host_str().is_none() {
            return Err(Error::invalid_endpoint(name, url, "missing host"));
        }
        Ok(Self {
            name: name.to_string(),
            base,
        })
    }

    /// Human readable service name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute URL for `path` on this service
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Maps command targets to endpoints
#[derive(Debug, Clone)]
pub struct ServiceRouter {
    stores: [(StoreId, Endpoint); 2],
    orders: Endpoint,
}

impl ServiceRouter {
    /// Build the router from configuration, validating every URL
    pub fn from_config(config: &ServicesConfig) -> Result<Self> {
        Ok(Self {
            stores: [
                (
                    StoreId::STORE_1,
                    Endpoint::parse("pet store 1", &config.store_1_url)?,
                ),
                (
                    StoreId::STORE_2,
                    Endpoint::parse("pet store 2", &config.store_2_url)?,
                ),
            ],
            orders: Endpoint::parse("pet order", &config.order_url)?,
        })
    }

    /// Endpoint of a store, or `None` if the id is not recognized
    pub fn store(&self, id: StoreId) -> Option<&Endpoint> {
        self.stores
            .iter()
            .find(|(store, _)| *store == id)
            .map(|(_, endpoint)| endpoint)
    }

    /// Endpoint every purchase is sent to
    pub fn orders(&self) -> &Endpoint {
        &self.orders
    }

    /// All stores in id order
    pub fn stores(&self) -> impl Iterator<Item = (StoreId, &Endpoint)> {
        self.stores.iter().map(|(id, endpoint)| (*id, endpoint))
    }
}
