//! The query API over an observation store.
//!
//! Every operation loads the store once, drops rows that cannot be scored,
//! selects one window, and derives all of its outputs from that window.
//! Operations that add jitter take the random source as an argument.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use flu_risk_observation::ObservationStore;
use flu_risk_observation_models::{Observation, Province, city_key};
use flu_risk_scoring_models::{
    CityMetrics, ForecastSeries, MIN_RISK, RiskEstimate, RiskSnapshot, Scope, ScoringConfig,
};
use sha2::{Digest as _, Sha256};

use crate::aggregate::{national_risk, province_risk, provincial_risks};
use crate::cache::{CacheKey, SnapshotCache};
use crate::features::extract_features;
use crate::forecast::forecast_city;
use crate::jitter::{JitterSource, SeededJitter};
use crate::metrics::city_metrics;
use crate::model::{LinearScoringModel, ScoringModel};
use crate::normalize::{LogisticParams, NormalizationPolicy, ObservedRange};
use crate::window::{Window, WindowSelector};
use crate::ScoringError;

/// Where a city's current risk comes from.
#[derive(Debug, Clone)]
pub enum ScoringBackend {
    /// Closed-form base rate, density, and seasonal adjustment.
    Heuristic,
    /// Raw score from a model, normalized with the logistic policy over the
    /// batch of all known cities.
    Learned(Arc<dyn ScoringModel>),
}

impl ScoringBackend {
    /// Normalization policy matching the backend.
    #[must_use]
    pub fn policy(&self) -> NormalizationPolicy {
        match self {
            Self::Heuristic => NormalizationPolicy::Heuristic,
            Self::Learned(_) => NormalizationPolicy::Logistic(LogisticParams::default()),
        }
    }
}

/// Window plus the set of cities it must report on.
struct Prepared {
    window: Window,
    cities: BTreeSet<String>,
}

impl Prepared {
    fn require_city(&self, city: &str) -> Result<String, ScoringError> {
        let key = city_key(city);
        if self.cities.contains(&key) {
            Ok(key)
        } else {
            Err(ScoringError::UnknownLocation {
                scope: Scope::City,
                id: key,
            })
        }
    }

    fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.window.fingerprint().as_bytes());
        for city in &self.cities {
            hasher.update(city.as_bytes());
            hasher.update([0_u8]);
        }
        hex::encode(hasher.finalize())
    }
}

/// Scores cities, provinces, and the nation from an [`ObservationStore`].
pub struct ScoringEngine {
    store: Arc<dyn ObservationStore>,
    config: ScoringConfig,
    selector: WindowSelector,
    backend: ScoringBackend,
    cache: SnapshotCache,
}

impl fmt::Debug for ScoringEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoringEngine")
            .field("config", &self.config)
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}

impl ScoringEngine {
    /// Creates an engine over `store`.
    ///
    /// The backend is [`ScoringBackend::Learned`] with a
    /// [`LinearScoringModel`] when `config.learned_model` is set, and
    /// [`ScoringBackend::Heuristic`] otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError::Config`] if the configuration is unusable.
    pub fn new(
        store: Arc<dyn ObservationStore>,
        config: ScoringConfig,
    ) -> Result<Self, ScoringError> {
        if config.window_days == 0 && config.fallback_dates == 0 {
            return Err(ScoringError::Config {
                message: "window_days and fallback_dates cannot both be 0".to_string(),
            });
        }
        let backend = match &config.learned_model {
            Some(model) => {
                ScoringBackend::Learned(Arc::new(LinearScoringModel::from_config(model)?))
            }
            None => ScoringBackend::Heuristic,
        };
        Ok(Self {
            store,
            selector: WindowSelector::from_config(&config),
            config,
            backend,
            cache: SnapshotCache::new(),
        })
    }

    /// Replaces the scoring backend.
    #[must_use]
    pub fn with_backend(mut self, backend: ScoringBackend) -> Self {
        self.backend = backend;
        self.cache.clear();
        self
    }

    /// Configuration the engine was built with.
    #[must_use]
    pub const fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Backend producing city current risk.
    #[must_use]
    pub const fn backend(&self) -> &ScoringBackend {
        &self.backend
    }

    /// Jitter source configured by `jitter_seed`.
    #[must_use]
    pub fn new_jitter(&self) -> SeededJitter {
        SeededJitter::from_optional_seed(self.config.jitter_seed)
    }

    /// Current risk for one scope.
    ///
    /// `id` is a city name for [`Scope::City`], a province code for
    /// [`Scope::Province`], and ignored for [`Scope::National`].
    ///
    /// # Errors
    ///
    /// * [`ScoringError::EmptyDataset`] if the store holds no usable rows
    /// * [`ScoringError::UnknownLocation`] if the city or province is unknown
    /// * [`ScoringError::Store`] if the store cannot be read
    pub fn current_risk(
        &self,
        scope: Scope,
        id: &str,
        now: NaiveDate,
        jitter: &mut dyn JitterSource,
    ) -> Result<RiskEstimate, ScoringError> {
        let prepared = self.prepare(now)?;
        match scope {
            Scope::City => {
                let key = prepared.require_city(id)?;
                let value = self.city_current_value(&prepared, &key, now, jitter);
                Ok(RiskEstimate::bounded(Scope::City, key, now, value))
            }
            Scope::Province => {
                let unknown = || ScoringError::UnknownLocation {
                    scope: Scope::Province,
                    id: id.trim().to_uppercase(),
                };
                let province = Province::from_code(id).map_err(|_| unknown())?;
                province_risk(
                    &prepared.window,
                    province,
                    now,
                    self.config.province_multiplier,
                )
                .ok_or_else(unknown)
            }
            Scope::National => Ok(national_risk(
                &prepared.window,
                now,
                self.config.national_multiplier,
            )),
        }
    }

    /// Forecast for one city over `days` days, day zero equal to its current
    /// risk.
    ///
    /// # Errors
    ///
    /// Same as [`ScoringEngine::current_risk`] for a city.
    pub fn forecast(
        &self,
        city: &str,
        now: NaiveDate,
        days: u32,
        jitter: &mut dyn JitterSource,
    ) -> Result<ForecastSeries, ScoringError> {
        let prepared = self.prepare(now)?;
        let key = prepared.require_city(city)?;
        let current = self.city_current_value(&prepared, &key, now, jitter);
        let metrics = city_metrics(&prepared.window, &key, now, &self.config);
        Ok(forecast_city(&key, current, metrics.trend, now, days, jitter))
    }

    /// Intermediate per-city values.
    ///
    /// # Errors
    ///
    /// Same as [`ScoringEngine::current_risk`] for a city.
    pub fn metrics(&self, city: &str, now: NaiveDate) -> Result<CityMetrics, ScoringError> {
        let prepared = self.prepare(now)?;
        let key = prepared.require_city(city)?;
        Ok(city_metrics(&prepared.window, &key, now, &self.config))
    }

    /// National, provincial, city, and forecast outputs from one window.
    ///
    /// # Errors
    ///
    /// * [`ScoringError::EmptyDataset`] if the store holds no usable rows
    /// * [`ScoringError::Store`] if the store cannot be read
    pub fn full_snapshot(
        &self,
        now: NaiveDate,
        jitter: &mut dyn JitterSource,
    ) -> Result<RiskSnapshot, ScoringError> {
        let prepared = self.prepare(now)?;
        Ok(self.snapshot_from(&prepared, now, jitter))
    }

    /// [`ScoringEngine::full_snapshot`] memoized per day and window content,
    /// using the configured jitter seed.
    ///
    /// # Errors
    ///
    /// Same as [`ScoringEngine::full_snapshot`].
    pub fn cached_snapshot(&self, now: NaiveDate) -> Result<Arc<RiskSnapshot>, ScoringError> {
        let prepared = self.prepare(now)?;
        let key = CacheKey {
            day: now,
            fingerprint: prepared.fingerprint(),
        };
        Ok(self.cache.get_or_compute(key, || {
            log::debug!("Computing risk snapshot for {now}");
            self.snapshot_from(&prepared, now, &mut self.new_jitter())
        }))
    }

    /// Forecast for one city that agrees with [`ScoringEngine::cached_snapshot`].
    ///
    /// A `days` equal to `horizon_days` is read from the memoized snapshot;
    /// any other horizon is recomputed with [`ScoringEngine::new_jitter`].
    ///
    /// # Errors
    ///
    /// Same as [`ScoringEngine::current_risk`] for a city.
    pub fn cached_forecast(
        &self,
        city: &str,
        now: NaiveDate,
        days: u32,
    ) -> Result<ForecastSeries, ScoringError> {
        if days != self.config.horizon_days {
            return self.forecast(city, now, days, &mut self.new_jitter());
        }
        let key = city_key(city);
        let snapshot = self.cached_snapshot(now)?;
        snapshot
            .forecasts
            .get(&key)
            .cloned()
            .ok_or_else(|| ScoringError::UnknownLocation {
                scope: Scope::City,
                id: key,
            })
    }

    /// Known city identifiers: every city in the store plus the tracked
    /// cities, lower-cased and sorted. A city whose rows are all invalid is
    /// still known and scored from the cross-city fallback.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError::Store`] if the store cannot be read.
    pub fn locations(&self) -> Result<Vec<String>, ScoringError> {
        let rows = self.store.load()?;
        Ok(self.known_cities(&rows).into_iter().collect())
    }

    fn known_cities(&self, rows: &[Observation]) -> BTreeSet<String> {
        rows.iter()
            .map(Observation::city_key)
            .chain(
                self.config
                    .tracked_cities
                    .iter()
                    .map(|c| city_key(c))
                    .filter(|c| !c.is_empty()),
            )
            .collect()
    }

    fn prepare(&self, now: NaiveDate) -> Result<Prepared, ScoringError> {
        let rows = self.store.load()?;
        if rows.is_empty() {
            return Err(ScoringError::EmptyDataset);
        }

        let valid: Vec<Observation> = rows.iter().filter(|o| o.is_valid()).cloned().collect();
        let dropped = rows.len() - valid.len();
        if dropped > 0 {
            log::warn!("Excluded {dropped} row(s) with non-positive population or land area");
        }

        let window = self.selector.select(&valid, now)?;
        log::debug!(
            "Selected {:?} window of {} row(s) for {now}",
            window.kind(),
            window.rows().len()
        );

        Ok(Prepared {
            window,
            cities: self.known_cities(&rows),
        })
    }

    fn city_current_value(
        &self,
        prepared: &Prepared,
        key: &str,
        now: NaiveDate,
        jitter: &mut dyn JitterSource,
    ) -> f64 {
        match &self.backend {
            ScoringBackend::Heuristic => {
                city_metrics(&prepared.window, key, now, &self.config).initial_risk
            }
            ScoringBackend::Learned(model) => self
                .learned_values(prepared, model.as_ref(), jitter)
                .remove(key)
                .unwrap_or(MIN_RISK),
        }
    }

    /// Normalized model output for every known city, in sorted city order so
    /// a seeded jitter source always pairs the same sample with the same
    /// city.
    fn learned_values(
        &self,
        prepared: &Prepared,
        model: &dyn ScoringModel,
        jitter: &mut dyn JitterSource,
    ) -> BTreeMap<String, f64> {
        let raw: Vec<(&String, f64)> = prepared
            .cities
            .iter()
            .map(|city| {
                let mut rows = prepared.window.city_rows(city);
                if rows.is_empty() {
                    rows = prepared.window.rows().iter().collect();
                }
                (city, model.score(&extract_features(city, &rows)))
            })
            .collect();

        let range = ObservedRange::of(raw.iter().map(|(_, score)| *score));
        let policy = self.backend.policy();
        raw.into_iter()
            .map(|(city, score)| (city.clone(), policy.normalize(score, range, jitter)))
            .collect()
    }

    fn snapshot_from(
        &self,
        prepared: &Prepared,
        now: NaiveDate,
        jitter: &mut dyn JitterSource,
    ) -> RiskSnapshot {
        let metrics: Vec<CityMetrics> = prepared
            .cities
            .iter()
            .map(|city| city_metrics(&prepared.window, city, now, &self.config))
            .collect();

        let current: BTreeMap<String, f64> = match &self.backend {
            ScoringBackend::Heuristic => metrics
                .iter()
                .map(|m| (m.city.clone(), m.initial_risk))
                .collect(),
            ScoringBackend::Learned(model) => self.learned_values(prepared, model.as_ref(), jitter),
        };

        let mut cities = BTreeMap::new();
        let mut forecasts = BTreeMap::new();
        for m in &metrics {
            let value = current.get(&m.city).copied().unwrap_or(m.initial_risk);
            cities.insert(
                m.city.clone(),
                RiskEstimate::bounded(Scope::City, m.city.clone(), now, value),
            );
            forecasts.insert(
                m.city.clone(),
                forecast_city(&m.city, value, m.trend, now, self.config.horizon_days, jitter),
            );
        }

        RiskSnapshot {
            date: now,
            national: national_risk(&prepared.window, now, self.config.national_multiplier),
            provincial: provincial_risks(&prepared.window, now, self.config.province_multiplier),
            cities,
            forecasts,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use flu_risk_observation::InMemoryStore;
    use flu_risk_scoring_models::LinearModelConfig;

    use super::*;
    use crate::jitter::NoJitter;
    use crate::test_support::{date, obs, row};

    fn engine(rows: Vec<Observation>, config: ScoringConfig) -> ScoringEngine {
        ScoringEngine::new(Arc::new(InMemoryStore::new(rows)), config).unwrap()
    }

    fn seeded() -> ScoringConfig {
        ScoringConfig {
            jitter_seed: Some(17),
            ..ScoringConfig::default()
        }
    }

    fn winter_week() -> Vec<Observation> {
        (14_u64..=20)
            .flat_map(|day| {
                let d = format!("2024-01-{day:02}");
                let growth = day * 10;
                vec![
                    obs("Toronto", Province::On, &d, 1_000 + growth),
                    obs("Ottawa", Province::On, &d, 300 + growth),
                    obs("Montreal", Province::Qc, &d, 800 - growth),
                    obs("Halifax", Province::Ns, &d, 50),
                ]
            })
            .collect()
    }

    fn learned_config() -> ScoringConfig {
        ScoringConfig {
            jitter_seed: Some(5),
            learned_model: Some(LinearModelConfig {
                bias: 0.0,
                weights: BTreeMap::from([
                    ("avg_daily_flu_cases".to_string(), 1.0),
                    ("flu_cases_trend".to_string(), 2.0),
                ]),
            }),
            ..ScoringConfig::default()
        }
    }

    fn all_values(snapshot: &RiskSnapshot) -> Vec<f64> {
        let mut values = vec![snapshot.national.value()];
        values.extend(snapshot.provincial.values().map(RiskEstimate::value));
        values.extend(snapshot.cities.values().map(RiskEstimate::value));
        for series in snapshot.forecasts.values() {
            values.extend(series.points.iter().map(RiskEstimate::value));
        }
        values
    }

    #[test]
    fn empty_store_reports_no_data() {
        let engine = engine(Vec::new(), seeded());
        let now = date("2024-01-20");
        let err = engine.full_snapshot(now, &mut NoJitter).unwrap_err();
        assert!(matches!(err, ScoringError::EmptyDataset));
        assert_eq!(err.to_string(), "no data available");
        assert!(matches!(
            engine.current_risk(Scope::National, "", now, &mut NoJitter),
            Err(ScoringError::EmptyDataset)
        ));
    }

    #[test]
    fn every_value_is_on_the_risk_scale() {
        for config in [seeded(), learned_config()] {
            let engine = engine(winter_week(), config);
            let snapshot = engine
                .full_snapshot(date("2024-01-20"), &mut engine.new_jitter())
                .unwrap();
            assert!(all_values(&snapshot).iter().all(|v| (1.0..=10.0).contains(v)));
        }
    }

    #[test]
    fn forecast_day_zero_equals_current_risk() {
        for config in [seeded(), learned_config()] {
            let engine = engine(winter_week(), config);
            let now = date("2024-01-20");
            for city in engine.locations().unwrap() {
                let current = engine
                    .current_risk(Scope::City, &city, now, &mut engine.new_jitter())
                    .unwrap();
                let series = engine
                    .forecast(&city, now, 7, &mut engine.new_jitter())
                    .unwrap();
                assert_eq!(series.len(), 7);
                assert_eq!(
                    series.first().unwrap().value().to_bits(),
                    current.value().to_bits()
                );
            }

            let snapshot = engine
                .full_snapshot(now, &mut engine.new_jitter())
                .unwrap();
            for (city, estimate) in &snapshot.cities {
                let day_zero = snapshot.forecasts[city].first().unwrap();
                assert_eq!(day_zero.value().to_bits(), estimate.value().to_bits());
            }
        }
    }

    #[test]
    fn snapshot_is_deterministic_with_a_seed() {
        for config in [seeded(), learned_config()] {
            let engine = engine(winter_week(), config);
            let now = date("2024-01-20");
            let a = engine.full_snapshot(now, &mut engine.new_jitter()).unwrap();
            let b = engine.full_snapshot(now, &mut engine.new_jitter()).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn snapshot_outputs_share_one_window() {
        let engine = engine(winter_week(), seeded());
        let now = date("2024-01-20");
        let snapshot = engine.full_snapshot(now, &mut NoJitter).unwrap();

        assert_eq!(snapshot.date, now);
        let cities: Vec<&String> = snapshot.cities.keys().collect();
        let forecast_cities: Vec<&String> = snapshot.forecasts.keys().collect();
        assert_eq!(cities, forecast_cities);
        assert_eq!(
            snapshot.provincial.keys().copied().collect::<Vec<_>>(),
            vec![Province::Ns, Province::On, Province::Qc]
        );
        assert_eq!(
            snapshot.national,
            engine
                .current_risk(Scope::National, "national", now, &mut NoJitter)
                .unwrap()
        );
        assert_eq!(
            snapshot.provincial[&Province::On],
            engine
                .current_risk(Scope::Province, "on", now, &mut NoJitter)
                .unwrap()
        );
    }

    #[test]
    fn two_city_january_scenario() {
        let rows: Vec<Observation> = (14..=20)
            .flat_map(|day| {
                let d = format!("2024-01-{day:02}");
                vec![
                    obs("City A", Province::On, &d, 2_000),
                    obs("City B", Province::On, &d, 500),
                ]
            })
            .collect();
        let engine = engine(rows, seeded());
        let now = date("2024-01-20");
        let a = engine
            .current_risk(Scope::City, "City A", now, &mut NoJitter)
            .unwrap();
        let b = engine
            .current_risk(Scope::City, "city b", now, &mut NoJitter)
            .unwrap();
        assert!((a.value() - 8.0).abs() < 1e-9);
        assert!((b.value() - 2.0).abs() < 1e-9);
        assert!(a.value() > b.value());
        assert_eq!(a.id(), "city a");
    }

    #[test]
    fn stale_data_falls_back_to_recent_dates() {
        let rows: Vec<Observation> = (1..=10)
            .map(|day| obs("Winnipeg", Province::Mb, &format!("2024-01-{day:02}"), 100))
            .collect();
        let engine = engine(rows, seeded());
        let risk = engine
            .current_risk(Scope::City, "winnipeg", date("2024-01-25"), &mut NoJitter)
            .unwrap();
        assert!((1.0..=10.0).contains(&risk.value()));
    }

    #[test]
    fn city_outside_window_uses_cross_city_average() {
        let mut rows = winter_week();
        // Known to the store, but only long before the window.
        rows.push(obs("Victoria", Province::Bc, "2023-06-01", 5));
        let engine = engine(rows, seeded());
        let now = date("2024-01-20");
        let metrics = engine.metrics("Victoria", now).unwrap();
        assert!(metrics.fallback);
        assert!(
            engine
                .current_risk(Scope::City, "victoria", now, &mut NoJitter)
                .is_ok()
        );
    }

    #[test]
    fn tracked_cities_are_known_without_rows() {
        let config = ScoringConfig {
            tracked_cities: vec!["Yellowknife".to_string(), "  ".to_string()],
            ..seeded()
        };
        let engine = engine(winter_week(), config);
        let locations = engine.locations().unwrap();
        assert_eq!(
            locations,
            vec!["halifax", "montreal", "ottawa", "toronto", "yellowknife"]
        );

        let snapshot = engine
            .full_snapshot(date("2024-01-20"), &mut NoJitter)
            .unwrap();
        assert!(snapshot.cities.contains_key("yellowknife"));
    }

    #[test]
    fn unknown_locations_are_not_found() {
        let engine = engine(winter_week(), seeded());
        let now = date("2024-01-20");
        let err = engine
            .current_risk(Scope::City, "Atlantis", now, &mut NoJitter)
            .unwrap_err();
        assert!(matches!(
            err,
            ScoringError::UnknownLocation { scope: Scope::City, ref id } if id == "atlantis"
        ));
        assert!(engine.forecast("Atlantis", now, 7, &mut NoJitter).is_err());

        // Valid code, but no rows.
        assert!(matches!(
            engine.current_risk(Scope::Province, "PE", now, &mut NoJitter),
            Err(ScoringError::UnknownLocation { scope: Scope::Province, .. })
        ));
        assert!(matches!(
            engine.current_risk(Scope::Province, "zz", now, &mut NoJitter),
            Err(ScoringError::UnknownLocation { scope: Scope::Province, .. })
        ));
    }

    #[test]
    fn invalid_rows_are_excluded() {
        let mut rows = winter_week();
        rows.push(row("Ghost Town", Province::On, "2024-01-20", 10, 1_000, 0, 100.0));
        rows.push(row("Toronto", Province::On, "2024-01-20", 10, 1_000_000, 5, 0.0));
        let with_bad = engine(rows, seeded());
        let clean = engine(winter_week(), seeded());
        let now = date("2024-01-20");

        let a = with_bad.full_snapshot(now, &mut NoJitter).unwrap();
        let b = clean.full_snapshot(now, &mut NoJitter).unwrap();
        assert_eq!(a.national, b.national);
        assert_eq!(a.provincial, b.provincial);
        for (city, estimate) in &b.cities {
            assert_eq!(&a.cities[city], estimate, "{city}");
        }
    }

    #[test]
    fn city_with_only_invalid_rows_falls_back() {
        let mut rows = winter_week();
        rows.push(row("Ghost Town", Province::On, "2024-01-20", 10, 1_000, 0, 100.0));
        let engine = engine(rows, seeded());
        let now = date("2024-01-20");

        assert!(
            engine
                .locations()
                .unwrap()
                .contains(&"ghost town".to_string())
        );
        let metrics = engine.metrics("Ghost Town", now).unwrap();
        assert!(metrics.fallback);
        let estimate = engine
            .current_risk(Scope::City, "Ghost Town", now, &mut NoJitter)
            .unwrap();
        assert_eq!(estimate.id(), "ghost town");
        assert!((estimate.value() - metrics.initial_risk).abs() < f64::EPSILON);

        let snapshot = engine.full_snapshot(now, &mut NoJitter).unwrap();
        assert!(snapshot.cities.contains_key("ghost town"));
        assert_eq!(snapshot.forecasts["ghost town"].len(), 7);
    }

    #[test]
    fn only_invalid_rows_is_empty() {
        let rows = vec![row("Nowhere", Province::Nu, "2024-01-20", 1, 1, 0, 0.0)];
        let engine = engine(rows, seeded());
        assert!(matches!(
            engine.full_snapshot(date("2024-01-20"), &mut NoJitter),
            Err(ScoringError::EmptyDataset)
        ));
    }

    #[test]
    fn province_is_pooled_not_averaged() {
        let rows = vec![
            row("Big", Province::Bc, "2024-07-20", 0, 600, 1_000_000, 100.0),
            row("Small", Province::Bc, "2024-07-20", 0, 90, 10_000, 100.0),
        ];
        let engine = engine(rows, seeded());
        let now = date("2024-07-20");
        let bc = engine
            .current_risk(Scope::Province, "BC", now, &mut NoJitter)
            .unwrap();
        let expected = 690.0 / 1_010_000.0 * 100_000.0 / 50.0 * 1.2;
        assert!((bc.value() - expected).abs() < 1e-9);
    }

    #[test]
    fn cached_snapshot_is_shared_until_data_changes() {
        let engine = engine(winter_week(), seeded());
        let now = date("2024-01-20");
        let a = engine.cached_snapshot(now).unwrap();
        let b = engine.cached_snapshot(now).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(*a, engine.full_snapshot(now, &mut engine.new_jitter()).unwrap());

        let next_day = engine.cached_snapshot(date("2024-01-21")).unwrap();
        assert!(!Arc::ptr_eq(&a, &next_day));
        assert_eq!(next_day.date, date("2024-01-21"));
    }

    #[test]
    fn cached_forecast_matches_snapshot() {
        let engine = engine(winter_week(), seeded());
        let now = date("2024-01-20");
        let snapshot = engine.cached_snapshot(now).unwrap();

        let series = engine.cached_forecast("TORONTO", now, 7).unwrap();
        assert_eq!(series, snapshot.forecasts["toronto"]);
        assert_eq!(series.first(), Some(&snapshot.cities["toronto"]));

        let longer = engine.cached_forecast("Toronto", now, 10).unwrap();
        assert_eq!(longer.len(), 10);
        assert!(matches!(
            engine.cached_forecast("Atlantis", now, 7),
            Err(ScoringError::UnknownLocation { .. })
        ));
    }

    #[test]
    fn learned_backend_spreads_cities_across_the_scale() {
        let engine = engine(winter_week(), learned_config());
        let snapshot = engine
            .full_snapshot(date("2024-01-20"), &mut NoJitter)
            .unwrap();
        let values: Vec<f64> = snapshot.cities.values().map(RiskEstimate::value).collect();
        for v in &values {
            assert!((v * 10.0 - (v * 10.0).round()).abs() < 1e-9);
        }
        // Highest average case load gets the highest learned score.
        let toronto = snapshot.cities["toronto"].value();
        assert!(values.iter().all(|v| *v <= toronto));
        // Provincial scores stay on the pooled heuristic.
        let heuristic = engine.with_backend(ScoringBackend::Heuristic);
        let plain = heuristic
            .full_snapshot(date("2024-01-20"), &mut NoJitter)
            .unwrap();
        assert_eq!(snapshot.provincial, plain.provincial);
        assert_eq!(snapshot.national, plain.national);
    }

    #[test]
    fn invalid_model_config_is_rejected() {
        let config = ScoringConfig {
            learned_model: Some(LinearModelConfig {
                bias: 0.0,
                weights: BTreeMap::from([("weather".to_string(), 1.0)]),
            }),
            ..ScoringConfig::default()
        };
        let result = ScoringEngine::new(Arc::new(InMemoryStore::new(winter_week())), config);
        assert!(matches!(result, Err(ScoringError::Config { .. })));
    }
}
