use std::time::Duration;

use serde::Deserialize;

use crate::ephemeris::EphemerisError;
use crate::events::error::EventError;
use crate::events::roots::{bisect, golden_section_max};
use crate::events::types::{EventKind, Pass, PassEvent};
use crate::frames::{inertial_to_topocentric, Observer, TopocentricView};
use crate::propagate::Propagator;
use crate::time::Epoch;

const DEFAULT_THRESHOLD_DEG: f64 = 10.0;
const DEFAULT_GRID_STEP: Duration = Duration::from_secs(30);
const DEFAULT_MIN_PASS_DURATION: Duration = Duration::from_secs(60);

/// Rise and set are refined to this many seconds.
const CROSSING_TOLERANCE_S: f64 = 1e-3;
const CULMINATION_TOLERANCE_S: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_threshold")]
    pub threshold_deg: f64,
    #[serde(
        default = "default_grid_step",
        deserialize_with = "crate::config::human_duration"
    )]
    pub grid_step: Duration,
    /// Shortest pass the grid is guaranteed to catch.
    #[serde(
        default = "default_min_pass_duration",
        deserialize_with = "crate::config::human_duration"
    )]
    pub min_pass_duration: Duration,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD_DEG
}

fn default_grid_step() -> Duration {
    DEFAULT_GRID_STEP
}

fn default_min_pass_duration() -> Duration {
    DEFAULT_MIN_PASS_DURATION
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threshold_deg: DEFAULT_THRESHOLD_DEG,
            grid_step: DEFAULT_GRID_STEP,
            min_pass_duration: DEFAULT_MIN_PASS_DURATION,
        }
    }
}

impl SearchConfig {
    pub fn with_threshold(self, threshold_deg: f64) -> Self {
        Self {
            threshold_deg,
            ..self
        }
    }

    /// Grid spacing in seconds. Any pass longer than `min_pass_duration`
    /// spans at least two grid points.
    pub fn effective_step_seconds(&self) -> Result<f64, EventError> {
        let step = self.grid_step.min(self.min_pass_duration / 2).as_secs_f64();
        if step > 0.0 {
            Ok(step)
        } else {
            Err(EventError::InvalidGridStep(format!(
                "grid step {:?} with minimum pass {:?}",
                self.grid_step, self.min_pass_duration
            )))
        }
    }

    pub fn validate(&self) -> Result<(), EventError> {
        if !self.threshold_deg.is_finite() || !(-90.0..=90.0).contains(&self.threshold_deg) {
            return Err(EventError::InvalidThreshold(self.threshold_deg));
        }
        self.effective_step_seconds().map(|_| ())
    }
}

/// Scans a time window for passes of one satellite over one observer.
pub struct EventFinder<'a, P: Propagator + ?Sized> {
    propagator: &'a P,
    observer: Observer,
    config: SearchConfig,
}

#[derive(Clone, Copy)]
struct Sample {
    t: f64,
    elevation: f64,
}

struct Rising {
    rise: PassEvent,
    best: Sample,
}

impl<'a, P: Propagator + ?Sized> EventFinder<'a, P> {
    pub fn new(propagator: &'a P, observer: Observer, config: SearchConfig) -> Self {
        Self {
            propagator,
            observer,
            config,
        }
    }

    /// Every complete pass whose rise and set both fall inside `[start, end]`.
    pub fn find_passes(&self, start: Epoch, end: Epoch) -> Result<Vec<Pass>, EventError> {
        self.scan(start, end, None)
    }

    /// The first complete pass in `[start, end]`.
    pub fn find_next_pass(&self, start: Epoch, end: Epoch) -> Result<Pass, EventError> {
        self.scan(start, end, Some(1))?
            .into_iter()
            .next()
            .ok_or(EventError::NoPassFound)
    }

    pub fn view_at(&self, epoch: Epoch) -> Result<TopocentricView, EphemerisError> {
        let state = self.propagator.state_at(epoch)?;
        Ok(inertial_to_topocentric(
            &state,
            self.propagator.frame(),
            &self.observer,
        ))
    }

    fn elevation_at(&self, t: f64) -> Result<f64, EphemerisError> {
        Ok(self.view_at(Epoch::from_seconds_j2000(t))?.elevation_deg)
    }

    fn event_at(&self, kind: EventKind, t: f64) -> Result<PassEvent, EphemerisError> {
        let view = self.view_at(Epoch::from_seconds_j2000(t))?;
        Ok(PassEvent {
            kind,
            time: view.at,
            elevation_deg: view.elevation_deg,
            azimuth_deg: view.azimuth_deg,
        })
    }

    fn scan(
        &self,
        start: Epoch,
        end: Epoch,
        limit: Option<usize>,
    ) -> Result<Vec<Pass>, EventError> {
        self.config.validate()?;
        if end <= start {
            return Err(EventError::InvalidWindow(format!(
                "end {} is not after start {}",
                end, start
            )));
        }

        let threshold = self.config.threshold_deg;
        let step = self.config.effective_step_seconds()?;
        let (t0, t1) = (start.seconds_j2000(), end.seconds_j2000());

        let mut passes = Vec::new();
        let mut prev = Sample {
            t: t0,
            elevation: self.elevation_at(t0)?,
        };
        if prev.elevation >= threshold {
            log::debug!(
                "Satellite already above {} deg at {}, skipping that pass",
                threshold,
                start
            );
        }
        let mut rising: Option<Rising> = None;

        let mut k = 1u64;
        loop {
            let t = (t0 + k as f64 * step).min(t1);
            let cur = Sample {
                t,
                elevation: self.elevation_at(t)?,
            };
            let was_above = prev.elevation >= threshold;
            let is_above = cur.elevation >= threshold;

            match (was_above, is_above) {
                (false, true) => {
                    let rise = self.refine_rise(prev.t, cur.t)?;
                    rising = Some(Rising { rise, best: cur });
                }
                (true, true) => {
                    if let Some(r) = rising.as_mut() {
                        if cur.elevation > r.best.elevation {
                            r.best = cur;
                        }
                    }
                }
                (true, false) => {
                    if let Some(r) = rising.take() {
                        let set = self.refine_set(prev.t, cur.t)?;
                        if let Some(pass) = self.complete_pass(r, set, step)? {
                            passes.push(pass);
                            if limit.is_some_and(|n| passes.len() >= n) {
                                return Ok(passes);
                            }
                        }
                    }
                }
                (false, false) => {}
            }

            if t >= t1 {
                break;
            }
            prev = cur;
            k += 1;
        }

        if rising.is_some() {
            log::debug!("Pass still in progress at {}, skipping it", end);
        }
        Ok(passes)
    }

    /// `lo` is below the threshold and `hi` at or above it.
    fn refine_rise(&self, lo: f64, hi: f64) -> Result<PassEvent, EphemerisError> {
        let threshold = self.config.threshold_deg;
        let (_, hi) = bisect(lo, hi, CROSSING_TOLERANCE_S, |t| {
            Ok::<_, EphemerisError>(self.elevation_at(t)? >= threshold)
        })?;
        self.event_at(EventKind::Rise, hi)
    }

    /// `lo` is at or above the threshold and `hi` below it.
    fn refine_set(&self, lo: f64, hi: f64) -> Result<PassEvent, EphemerisError> {
        let threshold = self.config.threshold_deg;
        let (lo, _) = bisect(lo, hi, CROSSING_TOLERANCE_S, |t| {
            Ok::<_, EphemerisError>(self.elevation_at(t)? < threshold)
        })?;
        self.event_at(EventKind::Set, lo)
    }

    fn complete_pass(
        &self,
        rising: Rising,
        set: PassEvent,
        step: f64,
    ) -> Result<Option<Pass>, EphemerisError> {
        let rise = rising.rise;
        let (rise_t, set_t) = (rise.time.seconds_j2000(), set.time.seconds_j2000());
        let a = (rising.best.t - step).max(rise_t);
        let b = (rising.best.t + step).min(set_t);

        let (t, elevation) = golden_section_max(a, b, CULMINATION_TOLERANCE_S, |t| {
            self.elevation_at(t)
        })?;
        let peak_t = if elevation >= rising.best.elevation {
            t
        } else {
            rising.best.t
        };
        let culmination = self.event_at(EventKind::Culmination, peak_t)?;

        if !(rise.time < culmination.time && culmination.time < set.time) {
            log::debug!("Discarding degenerate pass at {}", rise.time);
            return Ok(None);
        }
        Ok(Some(Pass {
            rise,
            culmination,
            set,
        }))
    }
}
