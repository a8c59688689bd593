//! Day unlocking is pure date arithmetic: one card per calendar day from an
//! epoch, pinned at the last card.

use crate::models::ProgressRecord;
use chrono::NaiveDate;
use std::str::FromStr;

/// Which date counts as day 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockMode {
    /// Every user shares the configured start date.
    Global,
    /// Each user starts on their own first recorded visit.
    PerUser,
}

impl FromStr for UnlockMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "global" => Ok(Self::Global),
            "per-user" | "per_user" | "peruser" => Ok(Self::PerUser),
            other => Err(format!("unknown unlock mode '{other}'")),
        }
    }
}

/// Returns 0 before `start`, otherwise the 1-based ordinal of today's card
/// clamped to `total_days`.
pub fn active_day(today: NaiveDate, start: NaiveDate, total_days: u32) -> u32 {
    if today < start || total_days == 0 {
        return 0;
    }
    let elapsed = (today - start).num_days();
    let day = elapsed.saturating_add(1).clamp(1, i64::from(total_days));
    day as u32
}

pub fn is_unlocked(day: u32, active: u32) -> bool {
    day >= 1 && day <= active
}

pub fn progress_percent(active: u32, total_days: u32) -> u32 {
    if active == 0 || total_days == 0 {
        return 0;
    }
    (100.0 * f64::from(active) / f64::from(total_days)).round() as u32
}

#[derive(Debug, Clone, Copy)]
pub struct UnlockPolicy {
    pub mode: UnlockMode,
    pub start_date: NaiveDate,
    pub total_days: u32,
}

impl UnlockPolicy {
    pub fn new(mode: UnlockMode, start_date: NaiveDate, total_days: u32) -> Self {
        Self {
            mode,
            start_date,
            total_days,
        }
    }

    /// Day 1 for this user. A per-user record without a first visit starts
    /// today.
    pub fn epoch(&self, record: &ProgressRecord, today: NaiveDate) -> NaiveDate {
        match self.mode {
            UnlockMode::Global => self.start_date,
            UnlockMode::PerUser => record.started_on.unwrap_or(today),
        }
    }

    pub fn active_day(&self, record: &ProgressRecord, today: NaiveDate) -> u32 {
        active_day(today, self.epoch(record, today), self.total_days)
    }

    pub fn is_unlocked(&self, record: &ProgressRecord, today: NaiveDate, day: u32) -> bool {
        is_unlocked(day, self.active_day(record, today))
    }

    pub fn contains(&self, day: u32) -> bool {
        (1..=self.total_days).contains(&day)
    }

    /// Stamps the first visit on records that lack one when the policy is
    /// per-user. Returns whether the record changed.
    pub fn stamp_first_visit(&self, record: &mut ProgressRecord, today: NaiveDate) -> bool {
        if self.mode == UnlockMode::PerUser && record.started_on.is_none() {
            record.started_on = Some(today);
            return true;
        }
        false
    }

    /// Default selection: today's card, or the first one before the start.
    pub fn today_selection(&self, record: &ProgressRecord, today: NaiveDate) -> u32 {
        self.active_day(record, today).max(1)
    }

    pub fn next_day(&self, day: u32) -> u32 {
        day.saturating_add(1).min(self.total_days)
    }
}
