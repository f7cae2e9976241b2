//! The visibility engine: one shared ephemeris snapshot and the pure
//! queries answered from it.

use std::sync::{Arc, PoisonError, RwLock};

use crate::ephemeris::{load, Ephemeris, EphemerisError, EphemerisSummary, LoadOptions, Source};
use crate::events::{EventError, EventFinder, LocalizedPass, Pass, SearchConfig};
use crate::frames::{
    inertial_to_sub_point, inertial_to_topocentric, Observer, SubPoint, TopocentricView,
};
use crate::propagate::Propagator;
use crate::time::{Epoch, Zone};

/// Holds the current ephemeris. Readers take an `Arc` snapshot, so a
/// refresh never changes the data under an in-flight computation.
pub struct EphemerisHandle {
    current: RwLock<Arc<Ephemeris>>,
}

impl EphemerisHandle {
    pub fn new(ephemeris: Ephemeris) -> Self {
        Self {
            current: RwLock::new(Arc::new(ephemeris)),
        }
    }

    pub fn snapshot(&self) -> Arc<Ephemeris> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swaps in `ephemeris` and returns the previous snapshot.
    pub fn replace(&self, ephemeris: Ephemeris) -> Arc<Ephemeris> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *current, Arc::new(ephemeris))
    }
}

pub struct Engine {
    ephemeris: EphemerisHandle,
    search: SearchConfig,
}

impl Engine {
    pub fn new(ephemeris: Ephemeris, search: SearchConfig) -> Self {
        Self {
            ephemeris: EphemerisHandle::new(ephemeris),
            search,
        }
    }

    /// Loads the ephemeris and builds an engine around it.
    pub fn load_ephemeris(
        source: Source<'_>,
        options: &LoadOptions,
        search: SearchConfig,
    ) -> Result<Self, EphemerisError> {
        Ok(Self::new(load(source, options)?, search))
    }

    /// Reloads the ephemeris. On failure the current snapshot stays in place.
    pub fn refresh(
        &self,
        source: Source<'_>,
        options: &LoadOptions,
    ) -> Result<EphemerisSummary, EphemerisError> {
        let ephemeris = load(source, options)?;
        let summary = ephemeris.summary();
        let previous = self.ephemeris.replace(ephemeris);
        log::info!(
            "Ephemeris refreshed: {} records ({} to {}), previously {}",
            summary.records,
            summary.start,
            summary.end,
            previous.summary().records
        );
        Ok(summary)
    }

    pub fn summary(&self) -> EphemerisSummary {
        self.ephemeris.snapshot().summary()
    }

    pub fn sub_point_now(&self, offset_seconds: i64) -> Result<SubPoint, EphemerisError> {
        self.sub_point_at(Epoch::now() + offset_seconds as f64)
    }

    pub fn sub_point_at(&self, epoch: Epoch) -> Result<SubPoint, EphemerisError> {
        let ephemeris = self.ephemeris.snapshot();
        let state = ephemeris.state_at(epoch)?;
        Ok(inertial_to_sub_point(&state, ephemeris.frame()))
    }

    pub fn look_at(
        &self,
        observer: &Observer,
        epoch: Epoch,
    ) -> Result<TopocentricView, EphemerisError> {
        let ephemeris = self.ephemeris.snapshot();
        let state = ephemeris.state_at(epoch)?;
        Ok(inertial_to_topocentric(&state, ephemeris.frame(), observer))
    }

    /// First complete pass starting from now.
    pub fn next_pass(
        &self,
        observer: &Observer,
        window_hours: f64,
        threshold_deg: f64,
    ) -> Result<Pass, EventError> {
        self.next_pass_from(Epoch::now(), observer, window_hours, threshold_deg)
    }

    pub fn next_pass_from(
        &self,
        start: Epoch,
        observer: &Observer,
        window_hours: f64,
        threshold_deg: f64,
    ) -> Result<Pass, EventError> {
        let end = window_end(start, window_hours)?;
        let ephemeris = self.ephemeris.snapshot();
        let config = self.search.with_threshold(threshold_deg);
        let finder = EventFinder::new(ephemeris.as_ref(), *observer, config);
        let result = finder.find_next_pass(start, end);
        if let Err(EventError::NoPassFound) = result {
            log::debug!(
                "No pass above {} deg for {:?} between {} and {}",
                threshold_deg,
                observer,
                start,
                end
            );
        }
        result
    }

    /// Every complete pass starting from now.
    pub fn passes(
        &self,
        observer: &Observer,
        window_hours: f64,
        threshold_deg: f64,
    ) -> Result<Vec<Pass>, EventError> {
        self.passes_from(Epoch::now(), observer, window_hours, threshold_deg)
    }

    pub fn passes_from(
        &self,
        start: Epoch,
        observer: &Observer,
        window_hours: f64,
        threshold_deg: f64,
    ) -> Result<Vec<Pass>, EventError> {
        let end = window_end(start, window_hours)?;
        let ephemeris = self.ephemeris.snapshot();
        let config = self.search.with_threshold(threshold_deg);
        EventFinder::new(ephemeris.as_ref(), *observer, config).find_passes(start, end)
    }

    pub fn localize_pass(pass: &Pass, zone: Zone) -> LocalizedPass {
        pass.localize(zone)
    }
}

fn window_end(start: Epoch, window_hours: f64) -> Result<Epoch, EventError> {
    if !window_hours.is_finite() || window_hours <= 0.0 {
        return Err(EventError::InvalidWindow(format!(
            "window of {} hours",
            window_hours
        )));
    }
    Ok(start + window_hours * 3600.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::{Format, Frame};
    use crate::testing::{
        circular_state, iss_from_tle, reference_epoch, sampled_ephemeris, ISS_TLE,
    };
    use rstest::{fixture, rstest};

    #[fixture]
    fn engine() -> Engine {
        let initial = circular_state(reference_epoch(), 420e3, 51.6, 30.0, 0.0);
        let eph = sampled_ephemeris(&initial, Frame::Eme2000, 86_400.0, 120.0);
        Engine::new(eph, SearchConfig::default())
    }

    fn london() -> Observer {
        Observer::new(51.5, 0.0, 0.0).unwrap()
    }

    #[rstest]
    fn sub_point_of_circular_orbit(engine: Engine) {
        let sub = engine.sub_point_at(reference_epoch() + 1234.0).unwrap();
        assert!(sub.latitude_deg.abs() <= 51.7);
        assert!((400.0..445.0).contains(&sub.altitude_km), "{:?}", sub);
        assert_eq!(sub.at, reference_epoch() + 1234.0);
    }

    #[rstest]
    fn sub_point_now_answers_far_outside_span(engine: Engine) {
        let sub = engine.sub_point_now(-60).unwrap();
        assert!(sub.latitude_deg.is_finite());
        assert!(sub.longitude_deg.abs() <= 180.0);
    }

    #[rstest]
    fn next_pass_and_all_passes_agree(engine: Engine) {
        let next = engine
            .next_pass_from(reference_epoch(), &london(), 24.0, 10.0)
            .unwrap();
        let all = engine
            .passes_from(reference_epoch(), &london(), 24.0, 10.0)
            .unwrap();
        assert_eq!(next, all[0]);

        let look = engine.look_at(&london(), next.culmination.time).unwrap();
        assert!((look.elevation_deg - next.culmination.elevation_deg).abs() < 1e-9);
    }

    #[rstest]
    fn overhead_threshold_finds_nothing(engine: Engine) {
        let result = engine.next_pass_from(reference_epoch(), &london(), 2.0, 89.99);
        assert!(matches!(result, Err(EventError::NoPassFound)));
    }

    #[rstest]
    #[case(0.0)]
    #[case(-3.0)]
    #[case(f64::INFINITY)]
    fn rejects_bad_window(engine: Engine, #[case] hours: f64) {
        let result = engine.next_pass_from(reference_epoch(), &london(), hours, 10.0);
        assert!(matches!(result, Err(EventError::InvalidWindow(_))));
    }

    #[rstest]
    fn refresh_swaps_snapshot_atomically(engine: Engine) {
        let before = engine.ephemeris.snapshot();
        let summary = engine
            .refresh(Source::Bytes(ISS_TLE.as_bytes()), &LoadOptions::default())
            .unwrap();
        assert_eq!(summary.format, Format::Tle);
        assert_eq!(engine.summary().format, Format::Tle);
        // An old snapshot still answers from the old data.
        assert_eq!(before.summary().format, Format::Json);
    }

    #[rstest]
    fn failed_refresh_keeps_current_snapshot(engine: Engine) {
        let result = engine.refresh(Source::Bytes(b"[]"), &LoadOptions::default());
        assert!(matches!(result, Err(EphemerisError::Empty)));
        assert_eq!(engine.summary().format, Format::Json);
    }

    #[rstest]
    fn serves_concurrent_readers(engine: Engine) {
        let epochs: Vec<_> = (0..8).map(|k| reference_epoch() + k as f64 * 600.0).collect();
        std::thread::scope(|scope| {
            for &epoch in &epochs {
                let engine = &engine;
                scope.spawn(move || {
                    let sub = engine.sub_point_at(epoch).unwrap();
                    assert_eq!(sub.at, epoch);
                });
            }
            scope.spawn(|| {
                engine
                    .refresh(Source::Bytes(ISS_TLE.as_bytes()), &LoadOptions::default())
                    .unwrap();
            });
        });
        assert_eq!(engine.summary().format, Format::Tle);
    }

    #[test]
    fn tle_engine_localizes_passes() {
        let engine = Engine::new(iss_from_tle(), SearchConfig::default());
        let start = Epoch::parse_utc("2020-07-13T00:00:00Z").unwrap();
        let passes = engine
            .passes_from(start, &Observer::new(40.7128, -74.006, 10.0).unwrap(), 24.0, 10.0)
            .unwrap();
        assert!(!passes.is_empty());
        let zone: Zone = "America/New_York".parse().unwrap();
        let local = Engine::localize_pass(&passes[0], zone);
        assert_eq!(local.rise.local.zone_abbrev, "EDT");
        assert_eq!(local.rise.utc, passes[0].rise.time);
    }
}
