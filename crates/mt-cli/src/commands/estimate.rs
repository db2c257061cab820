//! Estimate command: event list in, meet duration out.
//!
//! The event list is externally produced JSON, one record per event. A
//! record may carry inline heat data (`"heats": {"1": ["1:02.34", ...]}`),
//! in which case it is used as-is; records without it are fetched from the
//! heat data blob store. An event whose fetch fails is excluded from the
//! estimate entirely, which is not the same as an event with an empty heat
//! sheet: the latter still accrues transition time.

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;

use mt_core::{Event, EventCategory, EventId, EventSchedule, HeatSheet, MeetEstimate, estimate_total};
use mt_live::Client;

use crate::Config;

#[derive(Debug, Args)]
pub struct EstimateArgs {
    /// Path to the event list JSON, or - for stdin.
    pub events: String,

    /// Emit the estimate as JSON instead of a rendered breakdown.
    #[arg(long)]
    pub json: bool,

    /// Never fetch heat data; events without inline heats are excluded.
    #[arg(long)]
    pub offline: bool,
}

/// One record of the externally produced event list.
#[derive(Debug, Deserialize)]
struct EventInput {
    id: EventId,
    name: String,
    category: EventCategory,

    /// Optional inline heat data: heat number -> raw time strings.
    #[serde(default)]
    heats: Option<BTreeMap<u32, Vec<String>>>,
}

/// An event left out of the estimate, with the reason why.
#[derive(Debug)]
struct ExcludedEvent {
    event: Event,
    reason: String,
}

pub fn run<W: Write>(writer: &mut W, args: &EstimateArgs, config: &Config) -> Result<()> {
    let inputs = load_events(&args.events)?;
    let (schedules, excluded) = resolve_schedules(inputs, args.offline, config)?;
    let estimate = estimate_total(&schedules, &config.estimate);

    if args.json {
        render_json(writer, &estimate, &excluded)
    } else {
        render_breakdown(writer, &estimate, &excluded)
    }
}

fn load_events(source: &str) -> Result<Vec<EventInput>> {
    let text = if source == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read event list from stdin")?;
        buffer
    } else {
        let path = Path::new(source);
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?
    };
    serde_json::from_str(&text).context("failed to parse event list JSON")
}

/// Materializes heat sheets for every event, preserving event list order.
///
/// Inline heat data is used directly; everything else is fetched with
/// bounded concurrency (unless `offline`). Events without usable heat data
/// come back in the excluded list instead of the schedule.
fn resolve_schedules(
    inputs: Vec<EventInput>,
    offline: bool,
    config: &Config,
) -> Result<(Vec<EventSchedule>, Vec<ExcludedEvent>)> {
    let mut slots: Vec<Option<EventSchedule>> = Vec::new();
    slots.resize_with(inputs.len(), || None);
    let mut excluded = Vec::new();
    let mut to_fetch = Vec::new();

    for (index, input) in inputs.into_iter().enumerate() {
        let event = Event {
            id: input.id,
            name: input.name,
            category: input.category,
        };
        if let Some(heats) = input.heats {
            let (sheet, skipped_times) = sheet_from_inline(&heats);
            slots[index] = Some(EventSchedule::new(event, sheet, skipped_times));
        } else if offline {
            excluded.push(ExcludedEvent {
                event,
                reason: "no inline heat data in offline mode".to_string(),
            });
        } else {
            to_fetch.push((index, event));
        }
    }

    if !to_fetch.is_empty() {
        let client = Client::new(
            config.base_url.as_str(),
            Some(Duration::from_secs(config.fetch_timeout_secs)),
        )
        .context("failed to create heat data client")?;
        let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;

        let (indexes, events): (Vec<usize>, Vec<Event>) = to_fetch.into_iter().unzip();
        let outcomes = runtime.block_on(client.fetch_all(events, config.fetch_concurrency));

        for (index, outcome) in indexes.into_iter().zip(outcomes) {
            match outcome.result {
                Ok(data) => {
                    slots[index] =
                        Some(EventSchedule::new(outcome.event, data.sheet, data.skipped_times));
                }
                Err(error) => excluded.push(ExcludedEvent {
                    event: outcome.event,
                    reason: error.to_string(),
                }),
            }
        }
    }

    Ok((slots.into_iter().flatten().collect(), excluded))
}

/// Builds a heat sheet from inline event list data, counting dropped
/// values. An explicitly empty heat (`"2": []`) is registered so it still
/// occupies a slot in the gap count.
fn sheet_from_inline(heats: &BTreeMap<u32, Vec<String>>) -> (HeatSheet, usize) {
    let mut sheet = HeatSheet::new();
    let mut skipped_times = 0;
    for (number, times) in heats {
        if !sheet.ensure_heat(*number) {
            skipped_times += times.len();
            continue;
        }
        for text in times {
            if !sheet.push_raw(*number, text) {
                skipped_times += 1;
            }
        }
    }
    (sheet, skipped_times)
}

fn render_breakdown<W: Write>(
    writer: &mut W,
    estimate: &MeetEstimate,
    excluded: &[ExcludedEvent],
) -> Result<()> {
    writeln!(writer, "Meet breakdown:")?;

    for event in &estimate.events {
        writeln!(writer)?;
        writeln!(writer, "{} ({})", event.name, event.category.label())?;
        if event.heats.is_empty() {
            writeln!(writer, "  no heats on file")?;
        }
        for heat in &event.heats {
            match heat.slowest_secs {
                Some(secs) => {
                    writeln!(writer, "  Heat {}: slowest time {secs:.2}s", heat.number)?;
                }
                None => writeln!(writer, "  Heat {}: no recorded times", heat.number)?,
            }
        }
    }

    if !excluded.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "Excluded from estimate:")?;
        for entry in excluded {
            writeln!(writer, "- {}: {}", entry.event.name, entry.reason)?;
        }
    }

    writeln!(writer)?;
    writeln!(writer, "Estimated total meet time: {}", estimate.breakdown())?;
    if estimate.skipped_times > 0 {
        let plural = if estimate.skipped_times == 1 { "" } else { "s" };
        writeln!(
            writer,
            "Skipped {} unparseable time value{plural}",
            estimate.skipped_times
        )?;
    }

    Ok(())
}

fn render_json<W: Write>(
    writer: &mut W,
    estimate: &MeetEstimate,
    excluded: &[ExcludedEvent],
) -> Result<()> {
    let excluded: Vec<_> = excluded
        .iter()
        .map(|entry| {
            serde_json::json!({
                "id": entry.event.id,
                "name": entry.event.name,
                "reason": entry.reason,
            })
        })
        .collect();

    let output = serde_json::json!({
        "total_seconds": estimate.total_seconds,
        "breakdown": estimate.breakdown(),
        "events": estimate.events,
        "excluded": excluded,
        "skipped_times": estimate.skipped_times,
    });
    writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
    Ok(())
}
