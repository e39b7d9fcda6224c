use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;

/// Summary card for one wedding hall, as listed on the facilities pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueRecord {
    pub facility_number: String,
    pub district: String,
    #[serde(rename = "facility_name")]
    pub name: String,
    pub location_type: String,
    pub capacity: String,
    pub price: String,
    pub url: String,
}

/// Half-day booking unit shown in a calendar cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeSlot {
    /// Lunch / AM
    L,
    /// Dinner / PM
    D,
    /// Third or later block in a cell, keyed by its 1-based position
    Slot(usize),
}

impl TimeSlot {
    /// Default slot for the block at `index` (0-based) inside a cell
    pub fn from_position(index: usize) -> Self {
        match index {
            0 => TimeSlot::L,
            1 => TimeSlot::D,
            n => TimeSlot::Slot(n + 1),
        }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeSlot::L => f.write_str("L"),
            TimeSlot::D => f.write_str("D"),
            TimeSlot::Slot(n) => write!(f, "SLOT_{}", n),
        }
    }
}

impl std::str::FromStr for TimeSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "L" => Ok(TimeSlot::L),
            "D" => Ok(TimeSlot::D),
            other => other
                .strip_prefix("SLOT_")
                .and_then(|n| n.parse().ok())
                .map(TimeSlot::Slot)
                .ok_or_else(|| format!("unknown time slot '{}'", other)),
        }
    }
}

impl Serialize for TimeSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeSlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Confirmed,
    Available,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Available => "available",
        }
    }
}

/// One slot of one day for one venue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRecord {
    pub facility_number: String,
    #[serde(rename = "reservation_date")]
    pub date: NaiveDate,
    pub time_slot: TimeSlot,
    pub status: ReservationStatus,
}

/// Everything one crawl run produced, handed to the persistence sinks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlDataset {
    #[serde(rename = "lastCrawledAt")]
    pub captured_at: DateTime<Local>,
    pub facilities: Vec<VenueRecord>,
    pub reservations: Vec<ReservationRecord>,
}

impl CrawlDataset {
    pub fn new(facilities: Vec<VenueRecord>, reservations: Vec<ReservationRecord>) -> Self {
        Self {
            captured_at: Local::now(),
            facilities,
            reservations,
        }
    }

    /// Reservations whose facility_number is not among this run's facilities.
    ///
    /// These are reported, never dropped or reconciled.
    pub fn orphan_reservations(&self) -> Vec<&ReservationRecord> {
        let known: HashSet<&str> = self
            .facilities
            .iter()
            .map(|f| f.facility_number.as_str())
            .collect();
        self.reservations
            .iter()
            .filter(|r| !known.contains(r.facility_number.as_str()))
            .collect()
    }
}
