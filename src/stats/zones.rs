//! Per-zone shooting efficiency and league ranks.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::errors::StatsError;
use super::mapper::FromRow;
use super::models::ZoneStat;
use super::repository::Row;

/// Display label for a court zone, e.g. `Mid-Range (Left Side(L))`.
pub fn zone_label(basic: &str, area: Option<&str>) -> String {
    match area.map(str::trim) {
        Some(area) if !area.is_empty() && area != basic => format!("{basic} ({area})"),
        _ => basic.to_string(),
    }
}

/// `makes / attempts`, undefined without attempts.
pub fn pct(makes: u32, attempts: u32) -> Option<f64> {
    (attempts > 0).then(|| f64::from(makes) / f64::from(attempts))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShotEvent {
    pub zone: String,
    pub made: bool,
}

/// Groups one subject's shot events into unranked per-zone totals, ordered by zone.
pub fn tally<I>(events: I) -> Vec<ZoneStat>
where
    I: IntoIterator<Item = ShotEvent>,
{
    let mut zones: BTreeMap<String, (u32, u32)> = BTreeMap::new();
    for event in events {
        let (attempts, makes) = zones.entry(event.zone).or_default();
        *attempts += 1;
        if event.made {
            *makes += 1;
        }
    }

    zones
        .into_iter()
        .map(|(zone, (attempts, makes))| ZoneStat {
            zone,
            attempts,
            makes,
            pct: pct(makes, attempts),
            rank: None,
            population_size: None,
        })
        .collect()
}

/// Attempt and make totals for one subject in one zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneCount {
    pub subject_id: String,
    pub zone: String,
    pub attempts: u32,
    pub makes: u32,
}

impl ZoneCount {
    pub fn new(subject_id: &str, zone: &str, attempts: u32, makes: u32) -> Self {
        Self {
            subject_id: subject_id.to_string(),
            zone: zone.to_string(),
            attempts,
            makes,
        }
    }

    /// Compares efficiency exactly, without going through floating point.
    fn cmp_pct(&self, other: &Self) -> Ordering {
        let lhs = u64::from(self.makes) * u64::from(other.attempts);
        let rhs = u64::from(other.makes) * u64::from(self.attempts);
        lhs.cmp(&rhs)
    }
}

impl FromRow for ZoneCount {
    fn from_row(row: &Row) -> Result<Self, StatsError> {
        let basic: String = row.get("zone_basic")?;
        let area: Option<String> = row.get_opt("zone_area")?;
        let attempts: u32 = row.get("attempts")?;
        let makes: u32 = row.get("makes")?;
        if makes > attempts {
            return Err(StatsError::mapping("makes", format!("{makes} makes exceed {attempts} attempts")));
        }
        Ok(Self {
            subject_id: row.get("subject_id")?,
            zone: zone_label(&basic, area.as_deref()),
            attempts,
            makes,
        })
    }
}

/// Zone stats for `subject_id`, each ranked against every subject with attempts in that zone.
///
/// Rank is `1 + number of subjects with a strictly better percentage`, so ties share a rank.
/// Zones where the subject has no attempts are kept with no percentage and no rank.
pub fn rank_population(counts: &[ZoneCount], subject_id: &str) -> Vec<ZoneStat> {
    // zone -> subject -> totals; rows for the same pair are merged
    let mut by_zone: BTreeMap<&str, BTreeMap<&str, ZoneCount>> = BTreeMap::new();
    for count in counts {
        by_zone
            .entry(count.zone.as_str())
            .or_default()
            .entry(count.subject_id.as_str())
            .and_modify(|held| {
                held.attempts += count.attempts;
                held.makes += count.makes;
            })
            .or_insert_with(|| count.clone());
    }

    by_zone
        .into_values()
        .filter_map(|subjects| {
            let own = subjects.get(subject_id)?;
            let ranked: Vec<&ZoneCount> = subjects.values().filter(|c| c.attempts > 0).collect();
            let population = u32::try_from(ranked.len()).unwrap_or(u32::MAX);

            let rank = (own.attempts > 0).then(|| {
                let better = ranked
                    .iter()
                    .filter(|other| other.cmp_pct(own) == Ordering::Greater)
                    .count();
                u32::try_from(better).unwrap_or(u32::MAX).saturating_add(1)
            });

            Some(ZoneStat {
                zone: own.zone.clone(),
                attempts: own.attempts,
                makes: own.makes,
                pct: pct(own.makes, own.attempts),
                rank,
                population_size: Some(population),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn paint_rank_against_population() {
        let counts = vec![
            ZoneCount::new("BOS", "Paint", 40, 22),
            ZoneCount::new("NYK", "Paint", 50, 30),
        ];
        let zones = rank_population(&counts, "BOS");

        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].pct, Some(0.55));
        assert_eq!(zones[0].rank, Some(2));
        assert_eq!(zones[0].population_size, Some(2));

        let leader = rank_population(&counts, "NYK");
        assert_eq!(leader[0].rank, Some(1));
    }

    #[test]
    fn equal_percentages_share_rank() {
        let counts = vec![
            ZoneCount::new("a", "Corner 3", 10, 4),
            ZoneCount::new("b", "Corner 3", 20, 8),
            ZoneCount::new("c", "Corner 3", 10, 5),
        ];
        assert_eq!(rank_population(&counts, "a")[0].rank, Some(2));
        assert_eq!(rank_population(&counts, "b")[0].rank, Some(2));
        assert_eq!(rank_population(&counts, "c")[0].rank, Some(1));
    }

    #[test]
    fn zero_attempts_have_no_pct_and_no_rank() {
        let counts = vec![
            ZoneCount::new("a", "Backcourt", 0, 0),
            ZoneCount::new("b", "Backcourt", 3, 0),
        ];
        let zone = &rank_population(&counts, "a")[0];
        assert_eq!(zone.pct, None);
        assert_eq!(zone.rank, None);
        assert_eq!(zone.population_size, Some(1));

        // b shot 0% which is a real percentage, distinct from no data
        let zone = &rank_population(&counts, "b")[0];
        assert_eq!(zone.pct, Some(0.0));
        assert_eq!(zone.rank, Some(1));
    }

    #[test]
    fn unknown_subject_yields_no_zones() {
        let counts = vec![ZoneCount::new("a", "Paint", 10, 5)];
        assert!(rank_population(&counts, "z").is_empty());
    }

    #[test]
    fn tally_counts_events_per_zone() {
        let events = [("Paint", true), ("Paint", false), ("Paint", true), ("Corner 3", false)]
            .into_iter()
            .map(|(zone, made)| ShotEvent {
                zone: zone.to_string(),
                made,
            });
        let zones = tally(events);

        assert_eq!(zones.len(), 2);
        assert_eq!(zones[0].zone, "Corner 3");
        assert_eq!(zones[0].pct, Some(0.0));
        assert_eq!((zones[1].attempts, zones[1].makes), (3, 2));
        for zone in &zones {
            assert_eq!(zone.pct, Some(f64::from(zone.makes) / f64::from(zone.attempts)));
        }
    }

    #[rstest]
    #[case("Mid-Range", Some("Left Side(L)"), "Mid-Range (Left Side(L))")]
    #[case("Restricted Area", Some("Center(C)"), "Restricted Area (Center(C))")]
    #[case("Paint", None, "Paint")]
    #[case("Paint", Some(""), "Paint")]
    fn labels_combine_basic_and_area(#[case] basic: &str, #[case] area: Option<&str>, #[case] expected: &str) {
        assert_eq!(zone_label(basic, area), expected);
    }
}
