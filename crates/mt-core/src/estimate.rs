//! Meet duration estimation.
//!
//! Computes a linear additive estimate of a meet's total running time:
//! each heat lasts as long as its slowest participant, heats within an
//! event are separated by a category-specific gap, and each event is
//! followed by a fixed transition to the next one.
//!
//! # Algorithm Summary
//!
//! Per event, in list order:
//! 1. Pick the inter-heat gap from the event's category.
//! 2. Walk heats by ascending heat number; a non-empty heat contributes
//!    its slowest time.
//! 3. Every heat except the last is followed by the gap, whether or not
//!    it had any recorded times.
//! 4. Add the transition time once, even for events with zero heats.

use serde::{Deserialize, Serialize};

use crate::types::{EventCategory, EventId, EventSchedule};

/// Configuration for meet duration estimation.
///
/// All values are in seconds and externally overridable; the defaults are
/// the tuned values the estimate model was built around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateConfig {
    /// Gap between consecutive heats of a relay event. Default: 90.
    pub relay_heat_gap_secs: f64,

    /// Gap between consecutive heats of an individual event. Default: 60.
    pub heat_gap_secs: f64,

    /// Changeover buffer added once per event. Default: 180.
    pub transition_secs: f64,
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            relay_heat_gap_secs: 90.0,
            heat_gap_secs: 60.0,
            transition_secs: 180.0,
        }
    }
}

impl EstimateConfig {
    /// Returns the inter-heat gap for an event category.
    #[must_use]
    pub const fn heat_gap(&self, category: EventCategory) -> f64 {
        match category {
            EventCategory::Relay => self.relay_heat_gap_secs,
            EventCategory::Individual => self.heat_gap_secs,
        }
    }
}

/// One heat's contribution within an event estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatEstimate {
    /// The heat number as supplied by the data source.
    pub number: u32,

    /// Slowest recorded time in the heat, or None if the heat had no
    /// usable times.
    pub slowest_secs: Option<f64>,
}

/// One event's contribution to the meet estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventEstimate {
    pub id: EventId,
    pub name: String,
    pub category: EventCategory,

    /// Heats in ascending heat-number order.
    pub heats: Vec<HeatEstimate>,

    /// This event's total contribution: heat times, inter-heat gaps, and
    /// the transition buffer.
    pub seconds: f64,
}

/// Hours/minutes/seconds view of a total, by truncating division.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HmsBreakdown {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl std::fmt::Display for HmsBreakdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}h {}m {}s", self.hours, self.minutes, self.seconds)
    }
}

/// Result of estimating a full meet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeetEstimate {
    /// Grand total over all events, in seconds.
    pub total_seconds: f64,

    /// Per-event breakdown, in input order.
    pub events: Vec<EventEstimate>,

    /// Raw time entries dropped during heat sheet materialization,
    /// summed over all events.
    pub skipped_times: usize,
}

impl MeetEstimate {
    /// Truncating hours/minutes/seconds breakdown of the total.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "total is clamped non-negative before truncating"
    )]
    pub fn breakdown(&self) -> HmsBreakdown {
        let total = self.total_seconds.max(0.0).floor() as u64;
        HmsBreakdown {
            hours: total / 3600,
            minutes: (total % 3600) / 60,
            seconds: total % 60,
        }
    }
}

/// Estimates the total meet duration for a list of scheduled events.
///
/// Events are processed in list order; an event omitted from the slice
/// (e.g. because its heat data could not be fetched) contributes nothing,
/// not even transition time. An event that is present with an empty heat
/// sheet contributes exactly the transition time.
#[must_use]
pub fn estimate_total(events: &[EventSchedule], config: &EstimateConfig) -> MeetEstimate {
    let mut total_seconds = 0.0;
    let mut event_estimates = Vec::with_capacity(events.len());
    let mut skipped_times = 0;

    for schedule in events {
        let estimate = estimate_event(schedule, config);
        tracing::debug!(
            event = %estimate.id,
            seconds = estimate.seconds,
            "estimated event"
        );
        total_seconds += estimate.seconds;
        skipped_times += schedule.skipped_times;
        event_estimates.push(estimate);
    }

    MeetEstimate {
        total_seconds,
        events: event_estimates,
        skipped_times,
    }
}

fn estimate_event(schedule: &EventSchedule, config: &EstimateConfig) -> EventEstimate {
    let gap = config.heat_gap(schedule.event.category);
    let heat_count = schedule.heats.heat_count();

    let mut seconds = 0.0;
    let mut heats = Vec::with_capacity(heat_count);

    for (position, (number, times)) in schedule.heats.heats().enumerate() {
        // Stored times are validated at insertion, so the max is usable as-is
        let slowest = times.iter().copied().reduce(f64::max);
        if let Some(slowest) = slowest {
            seconds += slowest;
        }

        // The gap follows every non-final slot, counted against the total
        // number of heats rather than heats with times. An event with
        // trailing empty heats therefore still accrues gaps for them.
        if position < heat_count - 1 {
            seconds += gap;
        }

        heats.push(HeatEstimate {
            number,
            slowest_secs: slowest,
        });
    }

    seconds += config.transition_secs;

    EventEstimate {
        id: schedule.event.id.clone(),
        name: schedule.event.name.clone(),
        category: schedule.event.category,
        heats,
        seconds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Event, EventCategory, EventId, HeatSheet};

    fn event(id: &str, name: &str, category: EventCategory) -> Event {
        Event {
            id: EventId::new(id).unwrap(),
            name: name.to_string(),
            category,
        }
    }

    fn sheet(heats: &[(u32, &[f64])]) -> HeatSheet {
        let mut sheet = HeatSheet::new();
        for (number, times) in heats {
            sheet.ensure_heat(*number);
            for time in *times {
                assert!(sheet.push_time(*number, *time));
            }
        }
        sheet
    }

    fn schedule(category: EventCategory, heats: &[(u32, &[f64])]) -> EventSchedule {
        EventSchedule::new(event("1", "Test Event", category), sheet(heats), 0)
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn individual_event_uses_normal_gap() {
        let events = vec![schedule(
            EventCategory::Individual,
            &[(1, &[30.0, 31.5]), (2, &[29.0])],
        )];
        let estimate = estimate_total(&events, &EstimateConfig::default());
        // 31.5 + 60 + 29.0 + 180
        assert_close(estimate.total_seconds, 300.5);
    }

    #[test]
    fn relay_event_uses_relay_gap() {
        let events = vec![schedule(
            EventCategory::Relay,
            &[(1, &[30.0, 31.5]), (2, &[29.0])],
        )];
        let estimate = estimate_total(&events, &EstimateConfig::default());
        // 31.5 + 90 + 29.0 + 180
        assert_close(estimate.total_seconds, 330.5);
    }

    #[test]
    fn empty_heat_still_accrues_gap() {
        let events = vec![schedule(EventCategory::Individual, &[(1, &[]), (2, &[10.0])])];
        let estimate = estimate_total(&events, &EstimateConfig::default());
        // 0 + 60 + 10.0 + 180
        assert_close(estimate.total_seconds, 250.0);
    }

    #[test]
    fn trailing_empty_heats_accrue_gaps() {
        let events = vec![schedule(
            EventCategory::Individual,
            &[(1, &[20.0]), (2, &[]), (3, &[])],
        )];
        let estimate = estimate_total(&events, &EstimateConfig::default());
        // 20.0 + 60 + 0 + 60 + 0 + 180
        assert_close(estimate.total_seconds, 320.0);
    }

    #[test]
    fn all_empty_heats_contribute_gaps_and_transition() {
        let events = vec![schedule(
            EventCategory::Individual,
            &[(1, &[]), (2, &[]), (3, &[])],
        )];
        let estimate = estimate_total(&events, &EstimateConfig::default());
        // (3 - 1) * 60 + 180
        assert_close(estimate.total_seconds, 300.0);
    }

    #[test]
    fn zero_heats_contribute_transition_only() {
        let events = vec![schedule(EventCategory::Individual, &[])];
        let estimate = estimate_total(&events, &EstimateConfig::default());
        assert_close(estimate.total_seconds, 180.0);
    }

    #[test]
    fn empty_event_list_is_zero() {
        let estimate = estimate_total(&[], &EstimateConfig::default());
        assert_close(estimate.total_seconds, 0.0);
        assert!(estimate.events.is_empty());
    }

    #[test]
    fn events_accumulate_in_list_order() {
        let events = vec![
            schedule(EventCategory::Individual, &[(1, &[30.0])]),
            schedule(EventCategory::Relay, &[(1, &[100.0]), (2, &[110.0])]),
        ];
        let estimate = estimate_total(&events, &EstimateConfig::default());
        // (30 + 180) + (100 + 90 + 110 + 180)
        assert_close(estimate.total_seconds, 690.0);
        assert_eq!(estimate.events.len(), 2);
        assert_close(estimate.events[0].seconds, 210.0);
        assert_close(estimate.events[1].seconds, 480.0);
    }

    #[test]
    fn heats_report_slowest_in_ascending_order() {
        let events = vec![schedule(
            EventCategory::Individual,
            &[(2, &[29.0]), (1, &[30.0, 31.5]), (4, &[])],
        )];
        let estimate = estimate_total(&events, &EstimateConfig::default());

        let heats = &estimate.events[0].heats;
        assert_eq!(heats.len(), 3);
        assert_eq!(heats[0].number, 1);
        assert_eq!(heats[0].slowest_secs, Some(31.5));
        assert_eq!(heats[1].number, 2);
        assert_eq!(heats[1].slowest_secs, Some(29.0));
        assert_eq!(heats[2].number, 4);
        assert_eq!(heats[2].slowest_secs, None);
    }

    #[test]
    fn increasing_a_time_never_decreases_the_total() {
        let base = vec![schedule(
            EventCategory::Individual,
            &[(1, &[30.0, 31.5]), (2, &[29.0])],
        )];
        let baseline = estimate_total(&base, &EstimateConfig::default()).total_seconds;

        // Bump each individual value and confirm the total never drops
        for (heat_idx, time_idx, bumped) in [(0usize, 0usize, 30.1), (0, 1, 31.6), (1, 0, 29.1)] {
            let mut heats: Vec<(u32, Vec<f64>)> = vec![(1, vec![30.0, 31.5]), (2, vec![29.0])];
            heats[heat_idx].1[time_idx] = bumped;
            let events = vec![schedule(
                EventCategory::Individual,
                &heats
                    .iter()
                    .map(|(number, times)| (*number, times.as_slice()))
                    .collect::<Vec<_>>(),
            )];
            let total = estimate_total(&events, &EstimateConfig::default()).total_seconds;
            assert!(total >= baseline, "total {total} dropped below {baseline}");
        }
    }

    #[test]
    fn config_overrides_are_respected() {
        let config = EstimateConfig {
            relay_heat_gap_secs: 10.0,
            heat_gap_secs: 5.0,
            transition_secs: 7.0,
        };
        let events = vec![
            schedule(EventCategory::Individual, &[(1, &[30.0]), (2, &[29.0])]),
            schedule(EventCategory::Relay, &[(1, &[100.0]), (2, &[110.0])]),
        ];
        let estimate = estimate_total(&events, &config);
        // (30 + 5 + 29 + 7) + (100 + 10 + 110 + 7)
        assert_close(estimate.total_seconds, 298.0);
    }

    #[test]
    fn skipped_times_sum_over_events() {
        let events = vec![
            EventSchedule::new(
                event("1", "A", EventCategory::Individual),
                sheet(&[(1, &[30.0])]),
                2,
            ),
            EventSchedule::new(event("2", "B", EventCategory::Relay), sheet(&[]), 1),
        ];
        let estimate = estimate_total(&events, &EstimateConfig::default());
        assert_eq!(estimate.skipped_times, 3);
    }

    #[test]
    fn breakdown_truncates() {
        let estimate = MeetEstimate {
            total_seconds: 3661.0,
            events: Vec::new(),
            skipped_times: 0,
        };
        let hms = estimate.breakdown();
        assert_eq!(
            hms,
            HmsBreakdown {
                hours: 1,
                minutes: 1,
                seconds: 1
            }
        );
        assert_eq!(hms.to_string(), "1h 1m 1s");
    }

    #[test]
    fn breakdown_floors_fractional_seconds() {
        let estimate = MeetEstimate {
            total_seconds: 3599.9,
            events: Vec::new(),
            skipped_times: 0,
        };
        let hms = estimate.breakdown();
        assert_eq!(
            hms,
            HmsBreakdown {
                hours: 0,
                minutes: 59,
                seconds: 59
            }
        );
    }
}
