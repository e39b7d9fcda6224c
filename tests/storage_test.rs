use chrono::NaiveDate;
use tempfile::tempdir;
use wedding_crawler::app::ports::DatasetSink;
use wedding_crawler::storage::{JsonFileSink, SqliteSink};
use wedding_crawler::types::{CrawlDataset, ReservationRecord, ReservationStatus, TimeSlot, VenueRecord};

fn venue(number: &str) -> VenueRecord {
    VenueRecord {
        facility_number: number.to_string(),
        district: "종로구".to_string(),
        name: "서울시청 하늘광장".to_string(),
        location_type: "실내".to_string(),
        capacity: "100명".to_string(),
        price: "무료".to_string(),
        url: format!("https://wedding.seoulwomen.or.kr/facilities/{}", number),
    }
}

fn reservation(day: u32, slot: TimeSlot, status: ReservationStatus) -> ReservationRecord {
    ReservationRecord {
        facility_number: "4187".to_string(),
        date: NaiveDate::from_ymd_opt(2026, 4, day).unwrap(),
        time_slot: slot,
        status,
    }
}

#[tokio::test]
async fn json_sink_replaces_whole_file_without_ascii_escaping() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data.json");
    let sink = JsonFileSink::new(path.clone());

    let first = CrawlDataset::new(
        vec![venue("4187"), venue("4188")],
        vec![reservation(15, TimeSlot::L, ReservationStatus::Available)],
    );
    sink.persist(&first).await.unwrap();

    let second = CrawlDataset::new(vec![venue("4187")], vec![]);
    sink.persist(&second).await.unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("서울시청 하늘광장"));
    let doc: CrawlDataset = serde_json::from_str(&raw).unwrap();
    assert_eq!(doc.facilities.len(), 1);
    assert!(doc.reservations.is_empty());
    assert!(!dir.path().join("data.json.tmp").exists());
}

#[tokio::test]
async fn sqlite_sink_upserts_idempotently() {
    let dir = tempdir().unwrap();
    let sink = SqliteSink::open(dir.path().join("db").join("reservations.db")).unwrap();

    let dataset = CrawlDataset::new(
        vec![venue("4187")],
        vec![
            reservation(15, TimeSlot::L, ReservationStatus::Available),
            reservation(15, TimeSlot::D, ReservationStatus::Confirmed),
        ],
    );
    sink.persist(&dataset).await.unwrap();
    sink.persist(&dataset).await.unwrap();
    assert_eq!(sink.reservation_count().unwrap(), 2);

    // Same key, new status: updated in place
    let rebooked = CrawlDataset::new(
        vec![venue("4187")],
        vec![reservation(15, TimeSlot::L, ReservationStatus::Confirmed)],
    );
    sink.persist(&rebooked).await.unwrap();

    assert_eq!(sink.reservation_count().unwrap(), 2);
    assert_eq!(
        sink.slots_for("4187", "2026-04-15").unwrap(),
        vec![
            ("D".to_string(), "confirmed".to_string()),
            ("L".to_string(), "confirmed".to_string()),
        ]
    );
}
