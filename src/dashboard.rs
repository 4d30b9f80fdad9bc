//! Plain data describing what the dashboard shows, plus a text rendering of it

use std::fmt;

use itertools::Itertools;
use serde::Serialize;

use crate::geo::Distance;
use crate::model::Vehicle;
use crate::tracker::{Evaluation, RouteTracker, StopStatus};

pub const ACQUIRING_GPS: &str = "Acquiring GPS...";
pub const NO_STOPS: &str = "This route has no stops.";

/// The big card at the top: where the bus is heading next.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextStopCard {
    pub name: String,
    pub scheduled_time: String,
    pub distance: String,
}

/// One line of the road sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopRow {
    pub status: StopStatus,
    pub marker: &'static str,
    pub scheduled_time: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub route: String,
    pub vehicle: String,
    pub current_index: usize,
    pub card: Option<NextStopCard>,
    pub rows: Vec<StopRow>,
    pub notice: Option<String>,
}

impl DashboardView {
    /// `evaluation` is the outcome of the last cycle, `None` before the first one.
    pub fn build(
        route: &str,
        vehicle: Vehicle,
        tracker: &RouteTracker<'_>,
        evaluation: Option<&Evaluation>,
    ) -> Self {
        let Some(next) = tracker.current_stop() else {
            return Self {
                route: route.to_string(),
                vehicle: vehicle.to_string(),
                current_index: 0,
                card: None,
                rows: Vec::new(),
                notice: Some(NO_STOPS.to_string()),
            };
        };

        let card = NextStopCard {
            name: next.name.clone(),
            scheduled_time: next.scheduled_time.clone(),
            distance: distance_text(evaluation),
        };

        let rows = tracker
            .statuses()
            .into_iter()
            .zip(tracker.stops())
            .map(|(status, stop)| StopRow {
                status,
                marker: marker(status),
                scheduled_time: stop.scheduled_time.clone(),
                name: stop.name.clone(),
            })
            .collect_vec();

        Self {
            route: route.to_string(),
            vehicle: vehicle.to_string(),
            current_index: tracker.current_index(),
            card: Some(card),
            rows,
            notice: None,
        }
    }
}

fn distance_text(evaluation: Option<&Evaluation>) -> String {
    match evaluation {
        Some(Evaluation::Tracking {
            distance_to_current,
            ..
        }) => format_distance(distance_to_current),
        _ => ACQUIRING_GPS.to_string(),
    }
}

pub fn format_distance(distance: &Distance) -> String {
    format!("{} m", distance.meters().floor() as i64)
}

fn marker(status: StopStatus) -> &'static str {
    match status {
        StopStatus::Passed => "✔",
        StopStatus::Active => "➡",
        StopStatus::Upcoming => "⚪",
    }
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} | {}", self.route, self.vehicle)?;

        if let Some(notice) = &self.notice {
            return writeln!(f, "{notice}");
        }

        if let Some(card) = &self.card {
            writeln!(f, "NEXT STOP: {}", card.name)?;
            writeln!(
                f,
                "Scheduled: {} | GPS: {}",
                card.scheduled_time, card.distance
            )?;
        }

        writeln!(f)?;
        for row in &self.rows {
            writeln!(f, "{} {} - {}", row.marker, row.scheduled_time, row.name)?;
        }

        Ok(())
    }
}
