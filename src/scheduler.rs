/*
    Calendar schedule for unattended posting cycles.

    Cooperative polling on a fixed tick, not a precise timer; jitter
    up to one tick is expected. Each entry fires at most once per
    matching minute, and a fire that lands while another cycle is
    mid-flight is skipped, not queued.
*/

use crate::pipeline::CycleRunner;
use chrono::{DateTime, Datelike, Local, NaiveTime, Timelike, Weekday};
use log::{info, warn};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub weekday: Weekday,
    pub time: NaiveTime,
}

impl ScheduleEntry {
    pub fn matches(&self, now: &DateTime<Local>) -> bool {
        now.weekday() == self.weekday
            && now.hour() == self.time.hour()
            && now.minute() == self.time.minute()
    }
}

fn parse_weekday(day: &str) -> Result<Weekday, String> {
    match day.to_lowercase().as_str() {
        "mon" | "monday" => Ok(Weekday::Mon),
        "tue" | "tuesday" => Ok(Weekday::Tue),
        "wed" | "wednesday" => Ok(Weekday::Wed),
        "thu" | "thursday" => Ok(Weekday::Thu),
        "fri" | "friday" => Ok(Weekday::Fri),
        "sat" | "saturday" => Ok(Weekday::Sat),
        "sun" | "sunday" => Ok(Weekday::Sun),
        other => Err(format!("unknown weekday '{}'", other)),
    }
}

/// Parse a schedule spec like "mon@10:00,thu@10:00". An empty spec is
/// a valid manual-trigger-only deployment.
pub fn parse_schedule(spec: &str) -> Result<Vec<ScheduleEntry>, String> {
    let mut entries = Vec::new();
    for part in spec.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (day, time) = part
            .split_once('@')
            .ok_or_else(|| format!("schedule entry '{}' is missing '@'", part))?;
        let weekday = parse_weekday(day.trim())?;
        let time = NaiveTime::parse_from_str(time.trim(), "%H:%M")
            .map_err(|e| format!("bad time in '{}': {}", part, e))?;
        entries.push(ScheduleEntry { weekday, time });
    }
    Ok(entries)
}

/// Poll the schedule until shutdown.
pub async fn run(
    runner: Arc<CycleRunner>,
    entries: Vec<ScheduleEntry>,
    tick_secs: u64,
    running: Arc<AtomicBool>,
) {
    info!("Scheduler running with {} entries", entries.len());

    let mut fired_minute = String::new();
    let mut fired: HashSet<usize> = HashSet::new();

    while running.load(Ordering::SeqCst) {
        let now = Local::now();
        let minute = now.format("%Y-%m-%d %H:%M").to_string();
        if minute != fired_minute {
            fired_minute = minute;
            fired.clear();
        }

        for (idx, entry) in entries.iter().enumerate() {
            if entry.matches(&now) && fired.insert(idx) {
                info!("Schedule fired: {:?} {}", entry.weekday, entry.time);
                if !runner.try_start() {
                    warn!("Scheduled cycle skipped, another cycle is still running");
                }
            }
        }

        tokio::time::sleep(Duration::from_secs(tick_secs.max(1))).await;
    }

    info!("Scheduler stopped");
}
