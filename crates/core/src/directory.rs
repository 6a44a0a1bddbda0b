//! Hard-coded business and client directory.
//!
//! The pairings mirror the journal data the remote service was seeded with
//! and stand in for real personalization data.

use serde::Serialize;

pub const FALLBACK_CLIENT_ID: &str = "client_001";
pub const FALLBACK_BUSINESS_ID: &str = "BARBER_SHOP_01";

/// Default client per business, consulted when the caller has none of its own.
const DEFAULT_CLIENT_BY_BUSINESS: &[(&str, &str)] = &[
    ("BARBER_SHOP_01", "client_001"),
    ("SPA_CENTER_02", "client_004"),
];

/// Clients whose journal entries belong to a business other than the fallback.
const BUSINESS_BY_CLIENT: &[(&str, &str)] = &[
    ("client_004", "SPA_CENTER_02"),
    ("client_005", "SPA_CENTER_02"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Business {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Client {
    pub id: &'static str,
    pub name: &'static str,
    pub email: &'static str,
}

pub const BUSINESSES: &[Business] = &[
    Business {
        id: "BARBER_SHOP_01",
        name: "Barber Shop",
        description: "Professional grooming and haircut services",
        category: "Barber",
    },
    Business {
        id: "SPA_CENTER_02",
        name: "Spa Center",
        description: "Wellness and relaxation services",
        category: "Spa & Wellness",
    },
];

pub const CLIENTS: &[Client] = &[
    Client { id: "client_001", name: "Client 001", email: "client001@example.com" },
    Client { id: "client_002", name: "Client 002", email: "client002@example.com" },
    Client { id: "client_003", name: "Client 003", email: "client003@example.com" },
    Client { id: "client_004", name: "Client 004", email: "client004@example.com" },
    Client { id: "client_005", name: "Client 005", email: "client005@example.com" },
];

/// Client used to query recommendations on behalf of `business_id`.
pub fn default_client_for(business_id: &str) -> &'static str {
    lookup(DEFAULT_CLIENT_BY_BUSINESS, business_id).unwrap_or(FALLBACK_CLIENT_ID)
}

pub fn business_for_client(client_id: &str) -> &'static str {
    lookup(BUSINESS_BY_CLIENT, client_id).unwrap_or(FALLBACK_BUSINESS_ID)
}

pub fn find_business(id: &str) -> Option<&'static Business> {
    BUSINESSES.iter().find(|b| b.id == id)
}

pub fn find_client(id: &str) -> Option<&'static Client> {
    CLIENTS.iter().find(|c| c.id == id)
}

fn lookup(table: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}
