//! Profile directory: live babysitters from the store merged with the
//! demonstration set, filtered by a free-text term.

use std::str::FromStr;

use anyhow::Result;
use tracing::debug;

use babycare_db::Database;
use babycare_db::models::{BabysitterDetailRow, BabysitterListingRow};
use babycare_types::api::{BabysitterDetail, DirectoryEntry, DirectoryResponse};

use crate::convert::count;
use crate::fixtures::DemoBabysitter;

/// Identifier prefix reserved for demonstration records.
pub const DEMO_ID_PREFIX: &str = "mock-";

const NAME_UNAVAILABLE: &str = "Name unavailable";
const CITY_UNAVAILABLE: &str = "City unavailable";

/// How live and demonstration entries are ordered after merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectoryOrder {
    /// Live entries (best rated first) followed by demonstration entries.
    #[default]
    Merged,
    /// The merged list re-sorted by rating, best first. Stable for ties.
    Rating,
}

impl FromStr for DirectoryOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "merged" => Ok(Self::Merged),
            "rating" => Ok(Self::Rating),
            other => Err(format!("unknown directory order '{}'", other)),
        }
    }
}

/// Where live babysitter records come from.
pub trait BabysitterSource {
    /// All babysitters, best rated first.
    fn babysitters(&self) -> Result<Vec<BabysitterListingRow>>;

    fn babysitter(&self, user_id: &str) -> Result<Option<BabysitterDetailRow>>;
}

impl BabysitterSource for Database {
    fn babysitters(&self) -> Result<Vec<BabysitterListingRow>> {
        self.list_babysitters()
    }

    fn babysitter(&self, user_id: &str) -> Result<Option<BabysitterDetailRow>> {
        self.get_babysitter_detail(user_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailLookup {
    Found(BabysitterDetail),
    NotFound,
}

pub struct Directory<'a, S> {
    source: &'a S,
    demos: &'a [DemoBabysitter],
    order: DirectoryOrder,
}

impl<'a, S: BabysitterSource> Directory<'a, S> {
    pub fn new(source: &'a S, demos: &'a [DemoBabysitter], order: DirectoryOrder) -> Self {
        Self { source, demos, order }
    }

    pub fn list(&self, search: Option<&str>) -> Result<DirectoryResponse> {
        let live: Vec<DirectoryEntry> = self.source.babysitters()?.into_iter().map(live_entry).collect();
        let demo_only = live.is_empty();

        let mut entries = live;
        entries.extend(self.demos.iter().map(DemoBabysitter::entry));

        if self.order == DirectoryOrder::Rating {
            entries.sort_by(|a, b| b.average_rating.total_cmp(&a.average_rating));
        }

        if let Some(term) = search.filter(|t| !t.is_empty()) {
            let needle = term.to_lowercase();
            entries.retain(|entry| matches_search(entry, &needle));
        }

        debug!("Directory listing: {} entries (demo_only={})", entries.len(), demo_only);
        Ok(DirectoryResponse { entries, demo_only })
    }

    pub fn detail(&self, id: &str) -> Result<DetailLookup> {
        if is_demo_id(id) {
            return Ok(self
                .demos
                .iter()
                .find(|demo| demo.id == id)
                .map(|demo| DetailLookup::Found(demo.detail()))
                .unwrap_or(DetailLookup::NotFound));
        }

        Ok(match self.source.babysitter(id)? {
            Some(row) => DetailLookup::Found(live_detail(row)),
            None => DetailLookup::NotFound,
        })
    }
}

pub fn is_demo_id(id: &str) -> bool {
    id.starts_with(DEMO_ID_PREFIX)
}

/// Case-insensitive substring match on name or city. `needle` must already
/// be lowercased.
pub fn matches_search(entry: &DirectoryEntry, needle: &str) -> bool {
    entry.name.to_lowercase().contains(needle) || entry.city.to_lowercase().contains(needle)
}

/// First character of each word of `name`, or `?` when there is none.
pub fn avatar_initials(name: &str) -> String {
    let initials: String = name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .collect();
    if initials.is_empty() {
        "?".to_string()
    } else {
        initials
    }
}

fn live_entry(row: BabysitterListingRow) -> DirectoryEntry {
    let initials = avatar_initials(row.name.as_deref().unwrap_or(""));
    DirectoryEntry {
        avatar_initials: initials,
        id: row.user_id,
        name: row.name.unwrap_or_else(|| NAME_UNAVAILABLE.to_string()),
        city: row.city.unwrap_or_else(|| CITY_UNAVAILABLE.to_string()),
        age: count(row.age),
        years_experience: count(row.years_experience),
        description: row.description.unwrap_or_default(),
        hourly_rate: row.hourly_rate,
        average_rating: row.average_rating,
        total_reviews: count(Some(row.total_reviews)).unwrap_or(0),
        is_demo: false,
    }
}

fn live_detail(row: BabysitterDetailRow) -> BabysitterDetail {
    let entry = live_entry(row.listing);
    BabysitterDetail {
        id: entry.id,
        name: entry.name,
        city: entry.city,
        phone: row.phone,
        age: entry.age,
        years_experience: entry.years_experience,
        description: entry.description,
        hourly_rate: entry.hourly_rate,
        certifications: row.certifications,
        specialties: row.specialties,
        availability: row.availability,
        average_rating: entry.average_rating,
        total_reviews: entry.total_reviews,
        avatar_initials: entry.avatar_initials,
        is_demo: false,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    /// In-memory source that counts how often it is queried.
    #[derive(Default)]
    struct FakeSource {
        rows: Vec<(&'static str, &'static str, &'static str, f64)>,
        calls: Cell<usize>,
    }

    impl FakeSource {
        fn with(rows: Vec<(&'static str, &'static str, &'static str, f64)>) -> Self {
            Self { rows, calls: Cell::new(0) }
        }

        fn listing(&self, idx: usize) -> BabysitterListingRow {
            let (id, name, city, rating) = self.rows[idx];
            BabysitterListingRow {
                user_id: id.to_string(),
                name: Some(name.to_string()),
                city: Some(city.to_string()),
                age: Some(30),
                years_experience: Some(5),
                description: Some("Live babysitter".to_string()),
                hourly_rate: Some(30.0),
                average_rating: rating,
                total_reviews: 3,
            }
        }
    }

    impl BabysitterSource for FakeSource {
        fn babysitters(&self) -> Result<Vec<BabysitterListingRow>> {
            self.calls.set(self.calls.get() + 1);
            Ok((0..self.rows.len()).map(|i| self.listing(i)).collect())
        }

        fn babysitter(&self, user_id: &str) -> Result<Option<BabysitterDetailRow>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.rows.iter().position(|r| r.0 == user_id).map(|i| BabysitterDetailRow {
                listing: self.listing(i),
                phone: Some("11 90000-0000".to_string()),
                certifications: vec![],
                specialties: vec![],
                availability: vec![],
            }))
        }
    }

    struct FailingSource;

    impl BabysitterSource for FailingSource {
        fn babysitters(&self) -> Result<Vec<BabysitterListingRow>> {
            anyhow::bail!("connection refused")
        }

        fn babysitter(&self, _user_id: &str) -> Result<Option<BabysitterDetailRow>> {
            anyhow::bail!("connection refused")
        }
    }

    static ONE_DEMO: &[DemoBabysitter] = &[DemoBabysitter {
        id: "mock-1",
        name: "Demo Sitter",
        city: "Recife",
        age: 30,
        years_experience: 5,
        description: "Demo",
        hourly_rate: 30.0,
        certifications: &[],
        specialties: &[],
        availability: &[],
        average_rating: 4.8,
        total_reviews: 10,
        avatar_initials: "DS",
    }];

    fn ratings(response: &DirectoryResponse) -> Vec<f64> {
        response.entries.iter().map(|e| e.average_rating).collect()
    }

    #[test]
    fn merged_order_keeps_live_rows_before_demos() {
        let source = FakeSource::with(vec![
            ("a", "Alice Rocha", "Natal", 4.9),
            ("b", "Bruna Melo", "Natal", 4.2),
        ]);
        let directory = Directory::new(&source, ONE_DEMO, DirectoryOrder::Merged);

        let listing = directory.list(None).unwrap();
        assert_eq!(ratings(&listing), vec![4.9, 4.2, 4.8]);
        assert!(!listing.demo_only);
    }

    #[test]
    fn rating_order_resorts_after_merge() {
        let source = FakeSource::with(vec![
            ("a", "Alice Rocha", "Natal", 4.9),
            ("b", "Bruna Melo", "Natal", 4.2),
        ]);
        let directory = Directory::new(&source, ONE_DEMO, DirectoryOrder::Rating);

        assert_eq!(ratings(&directory.list(None).unwrap()), vec![4.9, 4.8, 4.2]);
    }

    #[test]
    fn empty_store_shows_only_demos_with_disclaimer() {
        let source = FakeSource::default();
        let directory = Directory::new(&source, ONE_DEMO, DirectoryOrder::Merged);

        let listing = directory.list(Some("")).unwrap();
        assert!(listing.demo_only);
        assert_eq!(listing.entries.len(), ONE_DEMO.len());
        assert!(listing.entries.iter().all(|e| e.is_demo));
    }

    #[test]
    fn merged_length_is_live_plus_demo_count() {
        let source = FakeSource::with(vec![
            ("a", "Alice Rocha", "Natal", 4.9),
            ("b", "Bruna Melo", "Fortaleza", 4.2),
            ("c", "Clara Nunes", "Manaus", 3.0),
        ]);
        let directory = Directory::new(&source, crate::fixtures::DEMO_BABYSITTERS, DirectoryOrder::Merged);

        let listing = directory.list(None).unwrap();
        assert_eq!(listing.entries.len(), 3 + crate::fixtures::DEMO_BABYSITTERS.len());
    }

    #[test]
    fn search_matches_name_or_city_case_insensitively() {
        let source = FakeSource::with(vec![
            ("a", "Alice Rocha", "Natal", 4.9),
            ("b", "Bruna Melo", "São Paulo", 4.2),
            ("c", "Clara Nunes", "Manaus", 3.0),
        ]);
        let directory = Directory::new(&source, crate::fixtures::DEMO_BABYSITTERS, DirectoryOrder::Merged);

        for term in ["SÃO", "alice", "na", "zzz", "a"] {
            let needle = term.to_lowercase();
            let all = directory.list(None).unwrap().entries;
            let filtered = directory.list(Some(term)).unwrap().entries;

            let expected: Vec<_> = all
                .iter()
                .filter(|e| e.name.to_lowercase().contains(&needle) || e.city.to_lowercase().contains(&needle))
                .cloned()
                .collect();
            assert_eq!(filtered, expected, "term {:?}", term);
        }

        let sao = directory.list(Some("são paulo")).unwrap().entries;
        assert!(sao.iter().any(|e| e.id == "b"));
        assert!(sao.iter().any(|e| e.id == "mock-1"));
        assert!(sao.iter().all(|e| e.city == "São Paulo"));
    }

    #[test]
    fn demo_detail_never_queries_store() {
        let source = FakeSource::with(vec![("a", "Alice Rocha", "Natal", 4.9)]);
        let directory = Directory::new(&source, ONE_DEMO, DirectoryOrder::Merged);

        match directory.detail("mock-1").unwrap() {
            DetailLookup::Found(detail) => assert!(detail.is_demo),
            DetailLookup::NotFound => panic!("demo record should resolve"),
        }
        assert_eq!(directory.detail("mock-999").unwrap(), DetailLookup::NotFound);
        assert_eq!(source.calls.get(), 0);
    }

    #[test]
    fn unknown_live_id_is_not_found_rather_than_error() {
        let source = FakeSource::with(vec![("a", "Alice Rocha", "Natal", 4.9)]);
        let directory = Directory::new(&source, ONE_DEMO, DirectoryOrder::Merged);

        assert_eq!(directory.detail("missing").unwrap(), DetailLookup::NotFound);
        match directory.detail("a").unwrap() {
            DetailLookup::Found(detail) => {
                assert_eq!(detail.avatar_initials, "AR");
                assert_eq!(detail.phone.as_deref(), Some("11 90000-0000"));
            }
            DetailLookup::NotFound => panic!("live record should resolve"),
        }
    }

    #[test]
    fn store_failure_is_an_error() {
        let directory = Directory::new(&FailingSource, ONE_DEMO, DirectoryOrder::Merged);
        assert!(directory.list(None).is_err());
        assert!(directory.detail("a").is_err());
        assert!(directory.detail("mock-1").is_ok());
    }

    #[test]
    fn missing_profile_fields_fall_back() {
        let entry = live_entry(BabysitterListingRow {
            user_id: "x".into(),
            name: None,
            city: None,
            age: None,
            years_experience: None,
            description: None,
            hourly_rate: None,
            average_rating: 0.0,
            total_reviews: 0,
        });
        assert_eq!(entry.name, NAME_UNAVAILABLE);
        assert_eq!(entry.city, CITY_UNAVAILABLE);
        assert_eq!(entry.avatar_initials, "?");
        assert_eq!(avatar_initials("   "), "?");
    }
}
