//! Trigger events and the sinks that receive them.

use std::fmt;

use glam::DVec2;

use crate::grid::FamilyId;
use crate::points::PointId;

/// A point entered a family's touch band on this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerEvent {
    pub family: FamilyId,
    pub point: PointId,
    /// Where the point was when it fired
    pub position: DVec2,
    /// Tick number, starting at 1 for the first evaluation
    pub tick: u64,
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tick {}: family {} point {}",
            self.tick, self.family.0, self.point.0
        )
    }
}

/// Receives trigger events. How they are rendered (sound, flash, log) is up
/// to the sink.
pub trait TriggerSink {
    fn trigger(&mut self, event: &TriggerEvent);
}

impl<F> TriggerSink for F
where
    F: FnMut(&TriggerEvent),
{
    fn trigger(&mut self, event: &TriggerEvent) {
        self(event)
    }
}

/// Records every event in order.
#[derive(Clone, Debug, Default)]
pub struct TriggerLog {
    events: Vec<TriggerEvent>,
}

impl TriggerLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[TriggerEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Events for one (family, point) pair.
    pub fn for_pair(
        &self,
        family: FamilyId,
        point: PointId,
    ) -> impl Iterator<Item = &TriggerEvent> + '_ {
        self.events
            .iter()
            .filter(move |e| e.family == family && e.point == point)
    }

    /// One line per event, for snapshots and diagnostics.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for event in &self.events {
            out.push_str(&event.to_string());
            out.push('\n');
        }
        out
    }
}

impl TriggerSink for TriggerLog {
    fn trigger(&mut self, event: &TriggerEvent) {
        self.events.push(*event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    fn event(family: usize, point: u64, tick: u64) -> TriggerEvent {
        TriggerEvent {
            family: FamilyId(family),
            point: PointId(point),
            position: dvec2(0.0, 0.0),
            tick,
        }
    }

    #[test]
    fn closures_are_sinks() {
        let mut count = 0;
        let mut sink = |_: &TriggerEvent| count += 1;
        sink.trigger(&event(0, 0, 1));
        sink.trigger(&event(0, 1, 1));
        assert_eq!(count, 2);
    }

    #[test]
    fn log_filters_by_pair() {
        let mut log = TriggerLog::new();
        log.trigger(&event(0, 0, 1));
        log.trigger(&event(1, 0, 2));
        log.trigger(&event(0, 0, 5));
        let ticks: Vec<u64> = log
            .for_pair(FamilyId(0), PointId(0))
            .map(|e| e.tick)
            .collect();
        assert_eq!(ticks, vec![1, 5]);
    }

    #[test]
    fn log_text_format() {
        let mut log = TriggerLog::new();
        log.trigger(&event(1, 3, 7));
        log.trigger(&event(0, 4, 9));
        insta::assert_snapshot!(log.to_text(), @r"
        tick 7: family 1 point 3
        tick 9: family 0 point 4
        ");
    }
}
