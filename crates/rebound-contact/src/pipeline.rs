//! Fixed-timestep contact pipeline.
//!
//! [`ContactPipeline`] owns a [`Scene`], a [`ContactDetector`] and a
//! [`Resolver`] and runs them in a fixed order each tick:
//!
//! 1. [`Scene::begin_tick`]: last tick's laser crossings are cleared.
//! 2. The detector tags every overlapping pair BEGIN, CONTINUE or END.
//! 3. The resolver runs the handlers, in detector order.
//! 4. [`Scene::end_tick`]: current positions become the reference for next
//!    tick's motion.
//!
//! Movement happens between ticks, outside the pipeline: the caller moves
//! bodies through [`scene_mut`](ContactPipeline::scene_mut), and the next
//! tick sees that motion as each body's position delta.
//!
//! # Example
//!
//! ```
//! use rebound_contact::prelude::*;
//!
//! let mut pipeline = ContactPipeline::new(Scene::new(), PipelineConfig::default()).unwrap();
//! pipeline.run_ticks(10, &mut NullEffects);
//! assert_eq!(pipeline.tick_count(), 10);
//! ```

use std::time::{Duration, Instant};

use crate::config::PipelineConfig;
use crate::contact::Contact;
use crate::detect::ContactDetector;
use crate::effects::ContactEffects;
use crate::resolver::{ResolveReport, Resolver};
use crate::scene::Scene;
use crate::ContactError;

use rebound_body::fixture::ContactPhase;

// ---------------------------------------------------------------------------
// PipelineDiagnostics
// ---------------------------------------------------------------------------

/// Timing and counts for the last tick.
#[derive(Debug, Clone, Default)]
pub struct PipelineDiagnostics {
    /// Time spent in the overlap pass.
    pub detect_time: Duration,
    /// Time spent running handlers.
    pub resolve_time: Duration,
    /// Total time for the tick.
    pub total_time: Duration,
    /// BEGIN contacts this tick.
    pub begun: usize,
    /// CONTINUE contacts this tick.
    pub continued: usize,
    /// END contacts this tick.
    pub ended: usize,
}

impl PipelineDiagnostics {
    fn count(&mut self, contacts: &[Contact]) {
        for contact in contacts {
            match contact.phase {
                ContactPhase::Begin => self.begun += 1,
                ContactPhase::Continue => self.continued += 1,
                ContactPhase::End => self.ended += 1,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ContactPipeline
// ---------------------------------------------------------------------------

/// Scene, detector and resolver driven at a fixed timestep.
pub struct ContactPipeline {
    scene: Scene,
    detector: ContactDetector,
    resolver: Resolver,
    tick_counter: u64,
    fixed_dt: f64,
    last_diagnostics: PipelineDiagnostics,
}

impl ContactPipeline {
    /// Create a pipeline over `scene`.
    ///
    /// Fails with [`ContactError::InvalidTimestep`] unless `fixed_dt` is
    /// positive and finite.
    pub fn new(scene: Scene, config: PipelineConfig) -> Result<Self, ContactError> {
        config.validate()?;
        let resolver = Resolver::new(config.resolver);
        Ok(Self {
            scene,
            detector: ContactDetector::new(resolver.table().clone()),
            resolver,
            tick_counter: 0,
            fixed_dt: config.fixed_dt,
            last_diagnostics: PipelineDiagnostics::default(),
        })
    }

    /// Execute one tick.
    pub fn tick(&mut self, effects: &mut dyn ContactEffects) -> ResolveReport {
        let tick_start = Instant::now();
        self.scene.begin_tick();

        let detect_start = Instant::now();
        let contacts = self.detector.detect(&self.scene);
        let detect_time = detect_start.elapsed();

        let resolve_start = Instant::now();
        let report = self
            .resolver
            .resolve(&mut self.scene, &contacts, self.fixed_dt, effects);
        let resolve_time = resolve_start.elapsed();

        self.scene.end_tick();
        self.tick_counter += 1;

        let mut diagnostics = PipelineDiagnostics {
            detect_time,
            resolve_time,
            total_time: tick_start.elapsed(),
            ..Default::default()
        };
        diagnostics.count(&contacts);
        if report.failures > 0 {
            tracing::warn!(
                tick = self.tick_counter,
                failures = report.failures,
                "contact handlers failed this tick"
            );
        }
        self.last_diagnostics = diagnostics;
        report
    }

    /// Run `count` ticks and merge their reports.
    pub fn run_ticks(&mut self, count: u64, effects: &mut dyn ContactEffects) -> ResolveReport {
        let mut total = ResolveReport::default();
        for _ in 0..count {
            total.merge(self.tick(effects));
        }
        total
    }

    /// Resolve contacts from an external detector instead of the built-in
    /// overlap pass. Counts as a tick.
    pub fn resolve_external(
        &mut self,
        contacts: &[Contact],
        effects: &mut dyn ContactEffects,
    ) -> ResolveReport {
        let tick_start = Instant::now();
        self.scene.begin_tick();
        let report = self
            .resolver
            .resolve(&mut self.scene, contacts, self.fixed_dt, effects);
        let resolve_time = tick_start.elapsed();
        self.scene.end_tick();
        self.tick_counter += 1;

        let mut diagnostics = PipelineDiagnostics {
            resolve_time,
            total_time: tick_start.elapsed(),
            ..Default::default()
        };
        diagnostics.count(contacts);
        self.last_diagnostics = diagnostics;
        report
    }

    /// The scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable access to the scene, for moving bodies between ticks.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// The resolver.
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Number of ticks executed.
    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    /// Simulation time in seconds. Computed from the tick count, not
    /// accumulated.
    pub fn sim_time(&self) -> f64 {
        self.tick_counter as f64 * self.fixed_dt
    }

    /// Seconds per tick.
    pub fn fixed_dt(&self) -> f64 {
        self.fixed_dt
    }

    /// Diagnostics from the last tick.
    pub fn last_diagnostics(&self) -> &PipelineDiagnostics {
        &self.last_diagnostics
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
