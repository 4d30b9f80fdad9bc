use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;

/// A named waypoint on a route.
///
/// Route files written by the old dashboard used `nom`, `lat`, `lon` and `h`,
/// those keys are still accepted when reading.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Stop {
    #[serde(alias = "nom")]
    pub name: String,
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lon")]
    pub longitude: f64,
    /// Free form, usually `HH:MM`.
    #[serde(alias = "h")]
    pub scheduled_time: String,
}

impl Stop {
    pub fn new(
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
        scheduled_time: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
            scheduled_time: scheduled_time.into(),
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::Stop;

    #[test]
    fn test_reads_legacy_keys() -> Result<(), anyhow::Error> {
        let stop: Stop =
            serde_json::from_str(r#"{"nom": "Départ", "lat": 47.6, "lon": 7.2, "h": "08:00"}"#)?;

        assert_eq!(stop, Stop::new("Départ", 47.6, 7.2, "08:00"));

        Ok(())
    }

    #[test]
    fn test_writes_current_keys() -> Result<(), anyhow::Error> {
        let json = serde_json::to_value(Stop::new("Centre", 47.61, 7.21, "08:15"))?;

        assert_eq!(json["name"], "Centre");
        assert_eq!(json["scheduled_time"], "08:15");
        assert!(json.get("nom").is_none());

        Ok(())
    }
}
