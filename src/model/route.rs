use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::stop::Stop;

/// Every known route, keyed by name. This is the shape of the routes file.
pub type RouteBook = BTreeMap<String, Vec<Stop>>;

/// A named, ordered list of stops.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Route {
    pub name: String,
    pub stops: Vec<Stop>,
}

impl Route {
    pub fn new(name: impl Into<String>, stops: Vec<Stop>) -> Self {
        Self {
            name: name.into(),
            stops,
        }
    }
}

/// The route used when no routes file exists yet.
pub fn default_route_book() -> RouteBook {
    let mut book = RouteBook::new();
    book.insert(
        "Ligne Test".to_string(),
        vec![
            Stop::new("Départ", 47.6, 7.2, "08:00"),
            Stop::new("Centre", 47.61, 7.21, "08:15"),
            Stop::new("Terminus", 47.62, 7.22, "08:30"),
        ],
    );
    book
}
