use crate::constants::{
    AM_TOKEN, CALENDAR_BODY_SELECTOR, CALENDAR_DAY_SELECTOR, CALENDAR_STATUS_BLOCK_SELECTOR,
    CALENDAR_STATUS_CONTAINER_SELECTOR, CONFIRMED_TOKEN, PM_TOKEN,
};
use crate::parser::{selector, stripped_text};
use crate::types::{ReservationRecord, ReservationStatus, TimeSlot};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

static BODY: Lazy<Selector> = Lazy::new(|| selector(CALENDAR_BODY_SELECTOR));
static CELL: Lazy<Selector> = Lazy::new(|| selector("td"));
static DAY: Lazy<Selector> = Lazy::new(|| selector(CALENDAR_DAY_SELECTOR));
static STATUS_CONTAINER: Lazy<Selector> = Lazy::new(|| selector(CALENDAR_STATUS_CONTAINER_SELECTOR));
static STATUS_BLOCK: Lazy<Selector> = Lazy::new(|| selector(CALENDAR_STATUS_BLOCK_SELECTOR));

/// Extract slot records from one venue-month calendar view.
///
/// Each day cell is evaluated on its own; cells missing the day number, the
/// status container or status blocks are skipped.
pub fn parse_calendar(
    markup: &str,
    facility_number: &str,
    year: i32,
    month: u32,
) -> Vec<ReservationRecord> {
    let document = Html::parse_document(markup);

    let Some(body) = document.select(&BODY).next() else {
        warn!("Calendar not found: {}, {}-{}", facility_number, year, month);
        return Vec::new();
    };

    let mut reservations = Vec::new();
    for cell in body.select(&CELL) {
        let Some(date) = cell_date(cell, year, month) else {
            continue;
        };
        let Some(container) = cell.select(&STATUS_CONTAINER).next() else {
            continue;
        };

        for (index, block) in container.select(&STATUS_BLOCK).enumerate() {
            let text = stripped_text(block);
            if let Some((time_slot, status)) = classify_block(&text, index) {
                reservations.push(ReservationRecord {
                    facility_number: facility_number.to_string(),
                    date,
                    time_slot,
                    status,
                });
            }
        }
    }
    reservations
}

fn cell_date(cell: ElementRef<'_>, year: i32, month: u32) -> Option<NaiveDate> {
    let day_text = stripped_text(cell.select(&DAY).next()?);
    if day_text.is_empty() || !day_text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let day: u32 = day_text.parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day);
    if date.is_none() {
        debug!("Skipping cell with out-of-range day {} for {}-{}", day, year, month);
    }
    date
}

/// Slot and status for the block at `index` within its cell.
///
/// The slot defaults by position and is overridden by an AM/PM token in the
/// text. Blocks with neither a confirmation nor an AM/PM token produce nothing.
pub fn classify_block(text: &str, index: usize) -> Option<(TimeSlot, ReservationStatus)> {
    let has_am = text.contains(AM_TOKEN);
    let has_pm = text.contains(PM_TOKEN);

    let status = if text.contains(CONFIRMED_TOKEN) {
        ReservationStatus::Confirmed
    } else if has_am || has_pm {
        ReservationStatus::Available
    } else {
        return None;
    };

    let time_slot = if has_am {
        TimeSlot::L
    } else if has_pm {
        TimeSlot::D
    } else {
        TimeSlot::from_position(index)
    };

    Some((time_slot, status))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(text: &str) -> String {
        format!(r#"<div class="inline-block text-center text-xs">{}</div>"#, text)
    }

    fn cell(day: &str, blocks: &[&str]) -> String {
        let inner: String = blocks.iter().map(|b| block(b)).collect();
        format!(
            r#"<td><span class="text-grey600 text-sm">{}</span><span class="flex flex-col gap-1">{}</span></td>"#,
            day, inner
        )
    }

    fn calendar(cells: &[String]) -> String {
        format!(
            "<html><body><table><thead><tr><th>일</th></tr></thead><tbody><tr>{}</tr></tbody></table></body></html>",
            cells.concat()
        )
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn positional_default_and_token_override() {
        let html = calendar(&[cell("15", &["오전", "예약확정"])]);
        let records = parse_calendar(&html, "4187", 2026, 4);
        assert_eq!(
            records,
            vec![
                ReservationRecord {
                    facility_number: "4187".to_string(),
                    date: date(2026, 4, 15),
                    time_slot: TimeSlot::L,
                    status: ReservationStatus::Available,
                },
                ReservationRecord {
                    facility_number: "4187".to_string(),
                    date: date(2026, 4, 15),
                    time_slot: TimeSlot::D,
                    status: ReservationStatus::Confirmed,
                },
            ]
        );
    }

    #[test]
    fn am_token_wins_over_position() {
        // Second block would default to D; the AM token moves it to L.
        let html = calendar(&[cell("3", &["오후", "오전 예약확정"])]);
        let records = parse_calendar(&html, "4187", 2026, 5);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].time_slot, TimeSlot::D);
        assert_eq!(records[0].status, ReservationStatus::Available);
        assert_eq!(records[1].time_slot, TimeSlot::L);
        assert_eq!(records[1].status, ReservationStatus::Confirmed);
    }

    #[test]
    fn classify_rules() {
        assert_eq!(
            classify_block("오전 예약확정", 1),
            Some((TimeSlot::L, ReservationStatus::Confirmed))
        );
        assert_eq!(
            classify_block("오후", 0),
            Some((TimeSlot::D, ReservationStatus::Available))
        );
        assert_eq!(classify_block("예약불가", 0), None);
        assert_eq!(classify_block("", 1), None);
        assert_eq!(
            classify_block("예약확정", 2),
            Some((TimeSlot::Slot(3), ReservationStatus::Confirmed))
        );
    }

    #[test]
    fn non_numeric_day_cells_are_skipped() {
        let html = calendar(&[cell("", &["오전"]), cell("x1", &["오후"]), cell("2", &["오후"])]);
        let records = parse_calendar(&html, "4187", 2026, 4);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, date(2026, 4, 2));
    }

    #[test]
    fn invalid_day_for_month_is_skipped() {
        let html = calendar(&[cell("31", &["오전"])]);
        assert!(parse_calendar(&html, "4187", 2026, 4).is_empty());
    }

    #[test]
    fn cells_without_status_structure_are_skipped() {
        let no_container = r#"<td><span class="text-grey600">7</span><div class="inline-block text-center">오전</div></td>"#;
        let no_blocks = r#"<td><span class="text-grey600">8</span><span class="flex flex-col"><div class="inline-block">오전</div></span></td>"#;
        let html = calendar(&[no_container.to_string(), no_blocks.to_string()]);
        assert!(parse_calendar(&html, "4187", 2026, 4).is_empty());
    }

    #[test]
    fn missing_table_body_yields_nothing() {
        assert!(parse_calendar("<html><body><p>점검 중</p></body></html>", "4187", 2026, 4).is_empty());
    }

    #[test]
    fn third_block_gets_positional_label() {
        let html = calendar(&[cell("20", &["예약확정", "예약확정", "예약확정"])]);
        let slots: Vec<String> = parse_calendar(&html, "4187", 2026, 6)
            .iter()
            .map(|r| r.time_slot.to_string())
            .collect();
        assert_eq!(slots, vec!["L", "D", "SLOT_3"]);
    }
}
