//! Walks a route stop by stop as GPS fixes come in.
//!
//! The tracker only ever moves forward one stop per evaluation. Once it sits
//! on the last stop it stays there until it's reset.

use serde::Serialize;
use tracing::{debug, info};

use crate::geo::{self, Coordinates, Distance};
use crate::model::Stop;

/// A fix closer than this to the target stop counts as arriving there.
pub const ARRIVAL_RADIUS_M: f64 = 50.0;

/// The only mutable runtime state of a trip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProgressState {
    pub current_index: usize,
}

impl ProgressState {
    pub fn reset(&mut self) {
        self.current_index = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopStatus {
    Passed,
    Active,
    Upcoming,
}

/// Emitted once, when the tracker moves past a stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopReached {
    pub index: usize,
    pub stop: String,
}

/// Gets told about every transition the tracker makes.
pub trait ProgressObserver {
    fn stop_reached(&mut self, event: &StopReached);
}

impl ProgressObserver for Vec<StopReached> {
    fn stop_reached(&mut self, event: &StopReached) {
        self.push(event.clone());
    }
}

/// Result of one evaluation cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Evaluation {
    /// The route has no stops, nothing to track.
    NoStops,
    /// No GPS fix this cycle.
    AcquiringPosition,
    Tracking {
        /// Index of the stop the fix was measured against.
        target: usize,
        distance: Distance,
        reached: Option<StopReached>,
        /// Distance to the stop the bus is heading to now. Differs from
        /// `distance` only after an arrival.
        distance_to_current: Distance,
    },
}

/// Borrows a route's stops together with the progress along them.
pub struct RouteTracker<'a> {
    stops: &'a [Stop],
    state: &'a mut ProgressState,
}

impl<'a> RouteTracker<'a> {
    pub fn new(stops: &'a [Stop], state: &'a mut ProgressState) -> Self {
        // the route may have been swapped or shortened underneath the state
        if let Some(last) = stops.len().checked_sub(1) {
            state.current_index = state.current_index.min(last);
        } else {
            state.current_index = 0;
        }

        Self { stops, state }
    }

    pub fn stops(&self) -> &'a [Stop] {
        self.stops
    }

    pub fn current_index(&self) -> usize {
        self.state.current_index
    }

    /// The stop the bus is heading to, `None` for an empty route.
    pub fn current_stop(&self) -> Option<&'a Stop> {
        self.stops.get(self.state.current_index)
    }

    pub fn is_at_terminus(&self) -> bool {
        self.state.current_index + 1 >= self.stops.len()
    }

    /// Runs one cycle: measure the distance to the current stop and advance
    /// by at most one stop.
    pub fn evaluate(
        &mut self,
        position: Option<Coordinates>,
        observer: &mut impl ProgressObserver,
    ) -> Evaluation {
        let Some(target_stop) = self.current_stop() else {
            return Evaluation::NoStops;
        };
        let Some(position) = position else {
            debug!("no GPS fix yet");
            return Evaluation::AcquiringPosition;
        };

        let target = self.state.current_index;
        let distance = geo::distance(position, target_stop.coordinates());

        let mut distance_to_current = distance;
        let reached = if distance.meters() < ARRIVAL_RADIUS_M && !self.is_at_terminus() {
            self.state.current_index += 1;

            let event = StopReached {
                index: target,
                stop: target_stop.name.clone(),
            };
            info!(
                "arrived at {} ({}/{})",
                event.stop,
                target + 1,
                self.stops.len()
            );
            observer.stop_reached(&event);

            if let Some(next) = self.current_stop() {
                distance_to_current = geo::distance(position, next.coordinates());
            }
            Some(event)
        } else {
            None
        };

        Evaluation::Tracking {
            target,
            distance,
            reached,
            distance_to_current,
        }
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }

    pub fn status_of(&self, index: usize) -> StopStatus {
        match index.cmp(&self.state.current_index) {
            std::cmp::Ordering::Less => StopStatus::Passed,
            std::cmp::Ordering::Equal => StopStatus::Active,
            std::cmp::Ordering::Greater => StopStatus::Upcoming,
        }
    }

    pub fn statuses(&self) -> Vec<StopStatus> {
        (0..self.stops.len()).map(|i| self.status_of(i)).collect()
    }
}
