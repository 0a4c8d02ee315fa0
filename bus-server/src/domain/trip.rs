//! Trips and their stop-time sequences.
//!
//! A trip is a single scheduled bus run. Curated trips come from the
//! hand-maintained timetables; discovered trips are materialised from
//! directions-provider responses and expire after a while.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::text::normalize;

use super::day_type::DayType;
use super::error::DomainError;
use super::time::ClockTime;

/// Identifier of a trip in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TripId(pub u64);

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a trip came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripKind {
    /// Hand-entered timetable ("route"). Never expires.
    Curated,
    /// Built from a directions response. Subject to expiry.
    Discovered,
}

/// One stop on a trip and the time the bus is there.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StopTime {
    pub stop: String,
    pub time: ClockTime,
}

impl StopTime {
    pub fn new(stop: impl Into<String>, time: ClockTime) -> Self {
        Self {
            stop: stop.into(),
            time,
        }
    }
}

/// The ordered stops of a trip.
///
/// Order is travel order. A sequence has at least two stops and no stop
/// name appears twice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<StopTime>", into = "Vec<StopTime>")]
pub struct StopSequence(Vec<StopTime>);

impl StopSequence {
    /// Validate and wrap a list of stop times.
    pub fn new(entries: Vec<StopTime>) -> Result<Self, DomainError> {
        if entries.len() < 2 {
            return Err(DomainError::SequenceTooShort(entries.len()));
        }
        for (i, entry) in entries.iter().enumerate() {
            if entries[..i].iter().any(|e| e.stop == entry.stop) {
                return Err(DomainError::DuplicateStop(entry.stop.clone()));
            }
        }
        Ok(Self(entries))
    }

    /// Parse `(stop, "HHhMM")` pairs.
    ///
    /// ```
    /// use bus_server::domain::StopSequence;
    ///
    /// let seq = StopSequence::parse([("Ponta Delgada", "08h00"), ("Lagoa", "08h20")]).unwrap();
    /// assert_eq!(seq.first().time.to_string(), "08h00");
    ///
    /// assert!(StopSequence::parse([("Lagoa", "8 o'clock"), ("Furnas", "09h00")]).is_err());
    /// ```
    pub fn parse<'a, I>(pairs: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let entries = pairs
            .into_iter()
            .map(|(stop, time)| -> Result<StopTime, DomainError> {
                Ok(StopTime::new(stop, ClockTime::parse(time)?))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(entries)
    }

    /// Start building a sequence entry by entry.
    pub fn builder() -> SequenceBuilder {
        SequenceBuilder::default()
    }

    pub fn entries(&self) -> &[StopTime] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false: a valid sequence has at least two stops.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The departure stop.
    pub fn first(&self) -> &StopTime {
        &self.0[0]
    }

    /// The terminus.
    pub fn last(&self) -> &StopTime {
        &self.0[self.0.len() - 1]
    }

    /// Normalised stop names and times as one searchable string.
    ///
    /// Entries appear in travel order as "name: HHhMM", separated by ", ".
    pub fn normalized_text(&self) -> String {
        self.0
            .iter()
            .map(|e| format!("{}: {}", normalize(&e.stop), e.time))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// First entry whose normalised name contains `normalized_query`.
    pub fn find_stop(&self, normalized_query: &str) -> Option<&StopTime> {
        self.0
            .iter()
            .find(|e| normalize(&e.stop).contains(normalized_query))
    }

    /// Stop names in travel order.
    pub fn stop_names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|e| e.stop.as_str())
    }
}

impl TryFrom<Vec<StopTime>> for StopSequence {
    type Error = DomainError;

    fn try_from(entries: Vec<StopTime>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<StopSequence> for Vec<StopTime> {
    fn from(seq: StopSequence) -> Self {
        seq.0
    }
}

/// Incremental sequence construction with mapping semantics.
///
/// Pushing a stop that is already present overwrites its time but keeps its
/// original position.
#[derive(Debug, Default, Clone)]
pub struct SequenceBuilder {
    entries: Vec<StopTime>,
}

impl SequenceBuilder {
    pub fn push(&mut self, stop: impl Into<String>, time: ClockTime) -> &mut Self {
        let stop = stop.into();
        match self.entries.iter_mut().find(|e| e.stop == stop) {
            Some(existing) => existing.time = time,
            None => self.entries.push(StopTime::new(stop, time)),
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn build(self) -> Result<StopSequence, DomainError> {
        StopSequence::new(self.entries)
    }
}

/// A single rider vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vote {
    Like,
    Dislike,
}

/// Rider feedback counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Votes {
    pub likes: u32,
    pub dislikes: u32,
}

impl Votes {
    /// Share of likes, floored to a whole percentage. 0 when nobody voted.
    pub fn likes_percent(&self) -> u8 {
        percent(self.likes, self.dislikes)
    }

    /// Share of dislikes, floored to a whole percentage. 0 when nobody voted.
    pub fn dislikes_percent(&self) -> u8 {
        percent(self.dislikes, self.likes)
    }

    /// Record a vote. `switching` moves the rider's earlier opposite vote over.
    pub fn record(&mut self, vote: Vote, switching: bool) {
        match vote {
            Vote::Like => self.like(switching),
            Vote::Dislike => self.dislike(switching),
        }
    }

    /// Record a like. `switching` moves an earlier dislike over.
    pub fn like(&mut self, switching: bool) {
        if switching {
            self.dislikes = self.dislikes.saturating_sub(1);
        }
        self.likes = self.likes.saturating_add(1);
    }

    /// Record a dislike. `switching` moves an earlier like over.
    pub fn dislike(&mut self, switching: bool) {
        if switching {
            self.likes = self.likes.saturating_sub(1);
        }
        self.dislikes = self.dislikes.saturating_add(1);
    }
}

fn percent(part: u32, other: u32) -> u8 {
    let total = u64::from(part) + u64::from(other);
    if total == 0 {
        return 0;
    }
    (u64::from(part) * 100 / total) as u8
}

/// Identity used to deduplicate trips.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub route_label: String,
    pub stops: StopSequence,
    pub day_type: DayType,
}

/// A trip ready to be stored; the store assigns its id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct TripDraft {
    pub kind: TripKind,
    pub route_label: String,
    pub stops: StopSequence,
    pub day_type: DayType,
    pub disabled: bool,
    pub information: Option<String>,
}

impl TripDraft {
    /// A curated timetable entry.
    pub fn curated(route_label: impl Into<String>, stops: StopSequence, day_type: DayType) -> Self {
        Self {
            kind: TripKind::Curated,
            route_label: route_label.into(),
            stops,
            day_type,
            disabled: false,
            information: None,
        }
    }

    /// A trip built from a directions response.
    pub fn discovered(
        route_label: impl Into<String>,
        stops: StopSequence,
        day_type: DayType,
    ) -> Self {
        Self {
            kind: TripKind::Discovered,
            ..Self::curated(route_label, stops, day_type)
        }
    }

    pub fn with_information(mut self, information: impl Into<String>) -> Self {
        self.information = Some(information.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            route_label: self.route_label.clone(),
            stops: self.stops.clone(),
            day_type: self.day_type,
        }
    }

    /// Attach an id and creation time.
    pub fn into_trip(self, id: TripId, added_at: DateTime<Utc>) -> Trip {
        Trip {
            id,
            kind: self.kind,
            route_label: self.route_label,
            stops: self.stops,
            day_type: self.day_type,
            disabled: self.disabled,
            added_at,
            votes: Votes::default(),
            information: self.information,
        }
    }
}

/// A stored trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trip {
    pub id: TripId,
    pub kind: TripKind,
    pub route_label: String,
    pub stops: StopSequence,
    pub day_type: DayType,
    pub disabled: bool,
    pub added_at: DateTime<Utc>,
    pub votes: Votes,
    pub information: Option<String>,
}

impl Trip {
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            route_label: self.route_label.clone(),
            stops: self.stops.clone(),
            day_type: self.day_type,
        }
    }

    /// Whether a discovered trip has outlived `ttl`. Curated trips never expire.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.kind == TripKind::Discovered && self.added_at <= now - ttl
    }
}

/// Wire form of a trip with unparsed times.
///
/// Timetables arrive from outside as text, so a single bad time must be
/// rejected per trip rather than per batch.
#[derive(Debug, Clone, Deserialize)]
pub struct TripRecord {
    pub id: TripId,
    pub kind: TripKind,
    pub route_label: String,
    pub stops: Vec<RawStopTime>,
    pub day_type: String,
    #[serde(default)]
    pub disabled: bool,
    pub added_at: DateTime<Utc>,
    #[serde(default)]
    pub votes: Votes,
    #[serde(default)]
    pub information: Option<String>,
}

/// A stop-time entry before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStopTime {
    pub stop: String,
    pub time: String,
}

impl TryFrom<TripRecord> for Trip {
    type Error = DomainError;

    fn try_from(r: TripRecord) -> Result<Self, Self::Error> {
        let stops = StopSequence::parse(r.stops.iter().map(|e| (e.stop.as_str(), e.time.as_str())))?;
        Ok(Trip {
            id: r.id,
            kind: r.kind,
            route_label: r.route_label,
            stops,
            day_type: r.day_type.parse()?,
            disabled: r.disabled,
            added_at: r.added_at,
            votes: r.votes,
            information: r.information,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(s: &str) -> ClockTime {
        ClockTime::parse(s).unwrap()
    }

    fn route_4() -> StopSequence {
        StopSequence::parse([
            ("Ponta Delgada", "08h00"),
            ("Lagoa", "08h20"),
            ("Ribeira Grande", "08h45"),
        ])
        .unwrap()
    }

    #[test]
    fn sequence_needs_two_stops() {
        assert_eq!(
            StopSequence::new(vec![StopTime::new("Lagoa", t("08h00"))]),
            Err(DomainError::SequenceTooShort(1))
        );
        assert_eq!(StopSequence::new(vec![]), Err(DomainError::SequenceTooShort(0)));
    }

    #[test]
    fn sequence_rejects_duplicates() {
        let result = StopSequence::parse([("Lagoa", "08h00"), ("Lagoa", "08h10")]);
        assert_eq!(result, Err(DomainError::DuplicateStop("Lagoa".into())));
    }

    #[test]
    fn sequence_rejects_bad_time() {
        let result = StopSequence::parse([("Lagoa", "08h00"), ("Furnas", "08h75")]);
        assert!(matches!(result, Err(DomainError::MalformedTime(_))));
    }

    #[test]
    fn first_and_last() {
        let seq = route_4();
        assert_eq!(seq.first().stop, "Ponta Delgada");
        assert_eq!(seq.last().stop, "Ribeira Grande");
        assert_eq!(seq.len(), 3);
    }

    #[test]
    fn normalized_text_preserves_order() {
        let seq = StopSequence::parse([("São Roque", "07h05"), ("Lagoa", "07h30")]).unwrap();
        assert_eq!(seq.normalized_text(), "sao roque: 07h05, lagoa: 07h30");
    }

    #[test]
    fn find_stop_by_fragment() {
        let seq = route_4();
        assert_eq!(seq.find_stop("ribeira").unwrap().time, t("08h45"));
        assert!(seq.find_stop("furnas").is_none());
    }

    #[test]
    fn builder_overwrites_in_place() {
        let mut builder = StopSequence::builder();
        builder
            .push("Ponta Delgada", t("08h00"))
            .push("Lagoa", t("08h20"))
            .push("Ponta Delgada", t("08h05"));
        let seq = builder.build().unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.first().stop, "Ponta Delgada");
        assert_eq!(seq.first().time, t("08h05"));
    }

    #[test]
    fn sequence_serde_checks_invariants() {
        let json = serde_json::to_string(&route_4()).unwrap();
        let back: StopSequence = serde_json::from_str(&json).unwrap();
        assert_eq!(back, route_4());

        let short = r#"[{"stop":"Lagoa","time":"08h00"}]"#;
        assert!(serde_json::from_str::<StopSequence>(short).is_err());
    }

    #[test]
    fn votes_percentages() {
        let votes = Votes { likes: 2, dislikes: 1 };
        assert_eq!(votes.likes_percent(), 66);
        assert_eq!(votes.dislikes_percent(), 33);

        let none = Votes::default();
        assert_eq!(none.likes_percent(), 0);
        assert_eq!(none.dislikes_percent(), 0);
    }

    #[test]
    fn votes_switching() {
        let mut votes = Votes::default();
        votes.dislike(false);
        votes.like(true);
        assert_eq!(votes, Votes { likes: 1, dislikes: 0 });

        // Switching never underflows.
        votes.like(true);
        assert_eq!(votes, Votes { likes: 2, dislikes: 0 });
    }

    #[test]
    fn expiry_applies_to_discovered_only() {
        let added = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let now = added + Duration::days(31);
        let ttl = Duration::days(30);

        let discovered = TripDraft::discovered("4", route_4(), DayType::Weekday)
            .into_trip(TripId(1), added);
        let curated = TripDraft::curated("4", route_4(), DayType::Weekday).into_trip(TripId(2), added);

        assert!(discovered.is_expired(now, ttl));
        assert!(!discovered.is_expired(added + Duration::days(29), ttl));
        assert!(!curated.is_expired(now, ttl));
    }

    #[test]
    fn dedup_key_matches_draft() {
        let draft = TripDraft::discovered("4", route_4(), DayType::Weekday);
        let trip = draft.clone().into_trip(TripId(7), Utc::now());
        assert_eq!(draft.dedup_key(), trip.dedup_key());
    }

    #[test]
    fn record_conversion() {
        let json = r#"{
            "id": 5, "kind": "curated", "route_label": "4",
            "stops": [{"stop":"Ponta Delgada","time":"08h00"},{"stop":"Lagoa","time":"08:20"}],
            "day_type": "WEEKDAY", "added_at": "2024-05-01T00:00:00Z"
        }"#;
        let record: TripRecord = serde_json::from_str(json).unwrap();
        let trip = Trip::try_from(record).unwrap();
        assert_eq!(trip.id, TripId(5));
        assert_eq!(trip.stops.last().time, t("08h20"));
        assert_eq!(trip.votes, Votes::default());
    }

    #[test]
    fn record_with_bad_time_is_rejected() {
        let json = r#"{
            "id": 5, "kind": "curated", "route_label": "4",
            "stops": [{"stop":"Ponta Delgada","time":"8am"},{"stop":"Lagoa","time":"08h20"}],
            "day_type": "WEEKDAY", "added_at": "2024-05-01T00:00:00Z"
        }"#;
        let record: TripRecord = serde_json::from_str(json).unwrap();
        assert!(matches!(
            Trip::try_from(record),
            Err(DomainError::MalformedTime(_))
        ));
    }
}
