//! Calendar screen data: per-day markers, day lists, and the month grid.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, TimeZone};

use crate::models::WorkOrder;

/// Days never show more than this many dots.
pub const MAX_DOTS_PER_DAY: u8 = 3;

/// Marker drawn under one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DayMark {
    pub dots: u8,
    pub selected: bool,
}

/// Day markers for the calendar view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CalendarMarks {
    days: BTreeMap<NaiveDate, DayMark>,
}

impl CalendarMarks {
    /// One dot per scheduled order (capped), plus the selected-day highlight.
    pub fn build<Tz: TimeZone>(orders: &[WorkOrder], selected: NaiveDate, tz: &Tz) -> Self {
        let mut days: BTreeMap<NaiveDate, DayMark> = BTreeMap::new();
        for day in orders.iter().filter_map(|order| order.scheduled_day_in(tz)) {
            let mark = days.entry(day).or_default();
            mark.dots = (mark.dots + 1).min(MAX_DOTS_PER_DAY);
        }
        days.entry(selected).or_default().selected = true;
        Self { days }
    }

    #[must_use]
    pub fn get(&self, day: NaiveDate) -> DayMark {
        self.days.get(&day).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, DayMark)> + '_ {
        self.days.iter().map(|(day, mark)| (*day, *mark))
    }
}

/// Orders scheduled on `day` in `tz`, earliest first.
pub fn orders_on_day<Tz: TimeZone>(orders: &[WorkOrder], day: NaiveDate, tz: &Tz) -> Vec<WorkOrder> {
    let mut matching: Vec<WorkOrder> = orders
        .iter()
        .filter(|order| order.scheduled_day_in(tz) == Some(day))
        .cloned()
        .collect();
    matching.sort_by_key(|order| order.scheduled_date);
    matching
}

/// Weeks of `month`, Sunday first, padded with `None` outside the month.
#[must_use]
pub fn month_grid(year: i32, month: u32) -> Vec<[Option<NaiveDate>; 7]> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };

    let mut weeks = Vec::new();
    let mut week = [None; 7];
    let mut column = first.weekday().num_days_from_sunday() as usize;
    let mut day = first;
    while day.month() == month {
        week[column] = Some(day);
        column += 1;
        if column == 7 {
            weeks.push(week);
            week = [None; 7];
            column = 0;
        }
        day += Duration::days(1);
    }
    if column > 0 {
        weeks.push(week);
    }
    weeks
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::WorkOrderStatus;
    use crate::test_support::{sample_order, scheduled_order, utc};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn dots_are_capped_and_selection_always_marked() {
        let orders: Vec<WorkOrder> = (1..=5)
            .map(|id| scheduled_order(id, WorkOrderStatus::Scheduled, utc(2025, 6, 10, 8 + id as u32, 0)))
            .chain([sample_order(6)])
            .collect();

        let marks = CalendarMarks::build(&orders, day(2025, 6, 20), &Utc);
        assert_eq!(marks.get(day(2025, 6, 10)), DayMark { dots: 3, selected: false });
        assert_eq!(marks.get(day(2025, 6, 20)), DayMark { dots: 0, selected: true });
        assert_eq!(marks.iter().count(), 2);

        let same_day = CalendarMarks::build(&orders, day(2025, 6, 10), &Utc);
        assert_eq!(same_day.get(day(2025, 6, 10)), DayMark { dots: 3, selected: true });
    }

    #[test]
    fn day_list_is_sorted_by_time() {
        let orders = vec![
            scheduled_order(1, WorkOrderStatus::Scheduled, utc(2025, 6, 10, 15, 0)),
            scheduled_order(2, WorkOrderStatus::Scheduled, utc(2025, 6, 11, 7, 0)),
            scheduled_order(3, WorkOrderStatus::Scheduled, utc(2025, 6, 10, 7, 30)),
        ];
        let ids: Vec<i64> = orders_on_day(&orders, day(2025, 6, 10), &Utc)
            .iter()
            .map(|order| order.id.value())
            .collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn month_grid_starts_on_sunday() {
        // June 2025 starts on a Sunday and spans five weeks.
        let june = month_grid(2025, 6);
        assert_eq!(june.len(), 5);
        assert_eq!(june[0][0], Some(day(2025, 6, 1)));
        assert_eq!(june[4][1], Some(day(2025, 6, 30)));
        assert_eq!(june[4][2], None);

        // February 2025 starts on a Saturday.
        let february = month_grid(2025, 2);
        assert_eq!(february[0][5], None);
        assert_eq!(february[0][6], Some(day(2025, 2, 1)));

        assert!(month_grid(2025, 13).is_empty());
    }
}
