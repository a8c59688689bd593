use crate::days::{CATALOGUE, DayDefinition, definition};
use crate::models::{DayCardResponse, DayStatus, OverviewResponse, ProgressRecord, UserId};
use crate::unlock::{UnlockPolicy, is_unlocked, progress_percent};
use chrono::NaiveDate;

pub fn build_overview_at(
    today: NaiveDate,
    policy: &UnlockPolicy,
    uid: &UserId,
    record: &ProgressRecord,
) -> OverviewResponse {
    let active = policy.active_day(record, today);

    let days = catalogue(policy)
        .map(|def| DayStatus {
            day: def.day,
            title: def.title.to_string(),
            emoji: reaction_or_default(record, def).to_string(),
            unlocked: is_unlocked(def.day, active),
            completed: record.is_completed(def.day),
            favorite: record.is_favorite(def.day),
        })
        .collect();

    OverviewResponse {
        uid: uid.to_string(),
        today: today.to_string(),
        start_date: policy.epoch(record, today).to_string(),
        active_day: active,
        total_days: policy.total_days,
        progress_percent: progress_percent(active, policy.total_days),
        completed_count: record.completed.len(),
        days,
    }
}

/// `None` when `day` is outside the configured sequence.
pub fn build_day_card_at(
    today: NaiveDate,
    policy: &UnlockPolicy,
    record: &ProgressRecord,
    day: u32,
) -> Option<DayCardResponse> {
    if !policy.contains(day) {
        return None;
    }
    let def = definition(day)?;
    let unlocked = policy.is_unlocked(record, today, day);

    Some(DayCardResponse {
        day,
        title: def.title.to_string(),
        unlocked,
        task: unlocked.then(|| def.task.to_string()),
        duration: def.duration_label(),
        reaction: reaction_or_default(record, def).to_string(),
        completed: record.is_completed(day),
        favorite: record.is_favorite(day),
        next_day: policy.next_day(day),
    })
}

fn catalogue(policy: &UnlockPolicy) -> impl Iterator<Item = &'static DayDefinition> {
    CATALOGUE.iter().take(policy.total_days as usize)
}

fn reaction_or_default<'a>(record: &'a ProgressRecord, def: &'a DayDefinition) -> &'a str {
    record.reaction(def.day).unwrap_or(def.emoji)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unlock::UnlockMode;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn policy() -> UnlockPolicy {
        UnlockPolicy::new(UnlockMode::Global, date(2026, 1, 1), 14)
    }

    #[test]
    fn overview_on_fifth_day() {
        let uid = UserId::parse("u1").unwrap();
        let mut record = ProgressRecord::empty();
        record.mark_completed(2);
        record.set_reaction(3, "🌙");

        let overview = build_overview_at(date(2026, 1, 5), &policy(), &uid, &record);
        assert_eq!(overview.active_day, 5);
        assert_eq!(overview.progress_percent, 36);
        assert_eq!(overview.completed_count, 1);
        assert_eq!(overview.days.len(), 14);
        assert!(overview.days[4].unlocked);
        assert!(!overview.days[5].unlocked);
        assert!(overview.days[1].completed);
        assert_eq!(overview.days[2].emoji, "🌙");
        assert_eq!(overview.days[0].emoji, "🔥");
    }

    #[test]
    fn overview_respects_shorter_sequences() {
        let uid = UserId::parse("u1").unwrap();
        let short = UnlockPolicy::new(UnlockMode::Global, date(2026, 1, 1), 7);
        let overview = build_overview_at(date(2026, 2, 1), &short, &uid, &ProgressRecord::empty());
        assert_eq!(overview.days.len(), 7);
        assert_eq!(overview.active_day, 7);
        assert_eq!(overview.progress_percent, 100);
    }

    #[test]
    fn locked_card_hides_task() {
        let record = ProgressRecord::empty();
        let card = build_day_card_at(date(2026, 1, 5), &policy(), &record, 6).unwrap();
        assert!(!card.unlocked);
        assert!(card.task.is_none());
        assert_eq!(card.duration, "15–20 min");

        let open = build_day_card_at(date(2026, 1, 5), &policy(), &record, 5).unwrap();
        assert!(open.task.is_some());
        assert_eq!(open.next_day, 6);
    }

    #[test]
    fn out_of_range_card_is_none() {
        let record = ProgressRecord::empty();
        assert!(build_day_card_at(date(2026, 1, 5), &policy(), &record, 0).is_none());
        assert!(build_day_card_at(date(2026, 1, 5), &policy(), &record, 15).is_none());
    }
}
