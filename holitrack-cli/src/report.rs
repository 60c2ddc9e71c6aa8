use std::io::Write;

use anyhow::Result;
use colored::Colorize;
use holitrack_engine::{
    CalendarStatus, City, HolidayConfig, Schedule, TrackerSnapshot, UtcOffset,
    arrival_time_label, format_count,
};
use serde::Serialize;

/// Everything a tracking run produced, ready to be rendered.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackReport<'a> {
    pub holiday: &'a str,
    pub character_name: &'a str,
    pub status: &'a CalendarStatus,
    pub snapshots: &'a [TrackerSnapshot],
}

pub fn write_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

pub fn write_city_list(out: &mut dyn Write, cities: &[City]) -> Result<()> {
    writeln!(out, "Available cities ({}):", cities.len())?;
    for city in cities {
        writeln!(
            out,
            "  {:18} {:22} {:24} {}",
            city.id,
            city.name,
            city.country,
            city.utc_offset().label()
        )?;
    }
    Ok(())
}

pub fn write_schedule(
    out: &mut dyn Write,
    config: &HolidayConfig,
    schedule: &Schedule,
    display: UtcOffset,
) -> Result<()> {
    writeln!(
        out,
        "{}",
        format!(
            "🗺  {} route for {}",
            config.character_name,
            schedule.holiday().format("%Y-%m-%d")
        )
        .bright_cyan()
        .bold()
    )?;
    for (index, entry) in schedule.entries().iter().enumerate() {
        writeln!(
            out,
            "  {:>3}. {:22} {:10} {} UTC  ({} {})",
            index + 1,
            entry.city.name,
            entry.city.utc_offset().label(),
            entry.arrival.format("%Y-%m-%d %H:%M"),
            arrival_time_label(&entry.city, schedule.holiday(), display),
            display.label()
        )?;
    }
    Ok(())
}

pub fn write_console(out: &mut dyn Write, config: &HolidayConfig, report: &TrackReport<'_>) -> Result<()> {
    writeln!(out, "{}", config.messages.title.bright_cyan().bold())?;
    writeln!(out, "{}", "=".repeat(config.messages.title.chars().count()).cyan())?;

    let status = report.status;
    if let Some(label) = status.next_holiday_label.as_deref() {
        writeln!(out, "{}: {label}", config.name)?;
    }
    if let Some(arrival) = status.estimated_arrival.as_deref() {
        writeln!(out, "Estimated arrival near you: {}", arrival.green())?;
    }
    writeln!(out)?;

    for snapshot in report.snapshots {
        write_snapshot(out, config, snapshot)?;
    }
    Ok(())
}

fn write_snapshot(out: &mut dyn Write, config: &HolidayConfig, snapshot: &TrackerSnapshot) -> Result<()> {
    let stamp = snapshot.now.format("%Y-%m-%d %H:%M:%S UTC");
    let Some(position) = snapshot.position.as_ref() else {
        let message = if snapshot.is_holiday {
            "Position unavailable".to_string()
        } else {
            snapshot.next_holiday.map_or_else(
                || config.messages.sleeping_title.clone(),
                |holiday| config.come_back_message(holiday),
            )
        };
        writeln!(out, "[{stamp}] {}", message.yellow())?;
        return Ok(());
    };

    writeln!(
        out,
        "[{stamp}] {}",
        snapshot.status_message.as_deref().unwrap_or_default().bold()
    )?;
    let place = position
        .landmass_name
        .as_deref()
        .map_or_else(|| "open water".to_string(), str::to_string);
    writeln!(
        out,
        "   at {:.4}, {:.4} over {place} (nearest: {})",
        position.latitude, position.longitude, position.nearest_city.name
    )?;
    writeln!(
        out,
        "   {:.1}% complete, {}/{} cities, {} {}",
        snapshot.completion_percentage,
        position.visited_cities,
        position.total_cities,
        format_count(snapshot.items_delivered),
        config.items_delivered_name
    )?;
    if !position.is_delivering() {
        writeln!(
            out,
            "   {}",
            config.next_delivery_message(&position.next_city.name, &position.next_city.country)
        )?;
    }
    if snapshot.is_nearby {
        writeln!(out, "   {}", config.messages.nearby_notification.green().bold())?;
    }
    Ok(())
}
