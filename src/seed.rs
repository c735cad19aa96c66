//! Store population
//!
//! Seeds both stores with a fixed set of pet types and pets before any
//! command runs, so queries in the command file have data to find. A
//! failed call is logged and counted; it never stops the run.

use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::command::StoreId;
use crate::router::{Endpoint, ServiceRouter};

/// A pet type to create on one store, with the pets to add to it
#[derive(Debug)]
pub struct PetTypeSeed {
    /// Name under which the assigned id is reported
    pub key: &'static str,
    pub store: StoreId,
    pub type_name: &'static str,
    pub pets: &'static [PetSeed],
}

#[derive(Debug, Serialize)]
pub struct PetSeed {
    pub name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<&'static str>,
}

/// The data every run starts from
pub const SEED_PLAN: &[PetTypeSeed] = &[
    PetTypeSeed {
        key: "id_1",
        store: StoreId::STORE_1,
        type_name: "Golden Retriever",
        pets: &[
            PetSeed {
                name: "Lander",
                birthdate: Some("14-05-2020"),
            },
            PetSeed {
                name: "Lanky",
                birthdate: None,
            },
        ],
    },
    PetTypeSeed {
        key: "id_2",
        store: StoreId::STORE_1,
        type_name: "Australian Shepherd",
        pets: &[],
    },
    PetTypeSeed {
        key: "id_3",
        store: StoreId::STORE_1,
        type_name: "Abyssinian",
        pets: &[
            PetSeed {
                name: "Muscles",
                birthdate: None,
            },
            PetSeed {
                name: "Junior",
                birthdate: None,
            },
        ],
    },
    PetTypeSeed {
        key: "id_4",
        store: StoreId::STORE_2,
        type_name: "Golden Retriever",
        pets: &[PetSeed {
            name: "Shelly",
            birthdate: Some("07-07-2019"),
        }],
    },
    PetTypeSeed {
        key: "id_5",
        store: StoreId::STORE_2,
        type_name: "Australian Shepherd",
        pets: &[PetSeed {
            name: "Felicity",
            birthdate: Some("27-11-2011"),
        }],
    },
    PetTypeSeed {
        key: "id_6",
        store: StoreId::STORE_2,
        type_name: "bulldog",
        pets: &[
            PetSeed {
                name: "Lazy",
                birthdate: Some("07-08-2018"),
            },
            PetSeed {
                name: "Lemon",
                birthdate: Some("27-03-2020"),
            },
        ],
    },
];

/// What population achieved
#[derive(Debug, Default)]
pub struct SeedReport {
    /// `(key, id)` for every pet type created, in plan order
    pub ids: Vec<(&'static str, String)>,
    /// Number of calls that did not succeed
    pub failures: usize,
}

impl SeedReport {
    /// Id assigned to a plan entry, if it was created
    pub fn id(&self, key: &str) -> Option<&str> {
        self.ids
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, id)| id.as_str())
    }
}

/// Create every pet type of `plan`, then the pets of the types that exist
pub async fn populate(
    client: &reqwest::Client,
    router: &ServiceRouter,
    plan: &[PetTypeSeed],
    timeout: Duration,
) -> SeedReport {
    let mut report = SeedReport::default();
    let mut created = Vec::new();

    for seed in plan {
        let Some(endpoint) = router.store(seed.store) else {
            tracing::warn!("No service for store {}, skipping {}", seed.store, seed.type_name);
            report.failures += 1;
            continue;
        };

        match create_pet_type(client, endpoint, seed.type_name, timeout).await {
            Some(id) => {
                tracing::info!("{}: {} ({})", seed.key, id, seed.type_name);
                report.ids.push((seed.key, id.clone()));
                created.push((seed, endpoint, id));
            }
            None => report.failures += 1,
        }
    }

    for (seed, endpoint, id) in created {
        for pet in seed.pets {
            if !add_pet(client, endpoint, &id, pet, timeout).await {
                report.failures += 1;
            }
        }
    }

    tracing::info!(
        "Population complete: {} pet types, {} failed calls",
        report.ids.len(),
        report.failures
    );
    report
}

async fn create_pet_type(
    client: &reqwest::Client,
    endpoint: &Endpoint,
    type_name: &str,
    timeout: Duration,
) -> Option<String> {
    let response = client
        .post(endpoint.url("/pet-types"))
        .json(&json!({ "type": type_name }))
        .timeout(timeout)
        .send()
        .await;

    let response = match response {
        Ok(response) if response.status() == reqwest::StatusCode::CREATED => response,
        Ok(response) => {
            tracing::warn!(
                "Failed to create {} on {}: {}",
                type_name,
                endpoint.name(),
                response.status()
            );
            return None;
        }
        Err(e) => {
            tracing::warn!("Error creating {} on {}: {}", type_name, endpoint.name(), e);
            return None;
        }
    };

    match response.json::<Value>().await {
        Ok(body) => match &body["id"] {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => {
                tracing::warn!("Created {} but the response carried no id", type_name);
                None
            }
        },
        Err(e) => {
            tracing::warn!("Created {} but the response was unreadable: {}", type_name, e);
            None
        }
    }
}

async fn add_pet(
    client: &reqwest::Client,
    endpoint: &Endpoint,
    type_id: &str,
    pet: &PetSeed,
    timeout: Duration,
) -> bool {
    let response = client
        .post(endpoint.url(&format!("/pet-types/{type_id}/pets")))
        .json(pet)
        .timeout(timeout)
        .send()
        .await;

    match response {
        Ok(response) if response.status().is_success() => {
            tracing::debug!("Added {} to pet type {}", pet.name, type_id);
            true
        }
        Ok(response) => {
            tracing::warn!("Failed to add {}: {}", pet.name, response.status());
            false
        }
        Err(e) => {
            tracing::warn!("Error adding {}: {}", pet.name, e);
            false
        }
    }
}
