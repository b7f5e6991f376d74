//! Formula evaluation engine
//!
//! Stores nothing itself: formulas live on the units, values in the state
//! store. On trigger it evaluates every stored formula against a read-only
//! scope and applies the resulting updates in batches, iterating to a fixed
//! point with a hard cap of three passes. Width updates route through the
//! width-change resolver like a user edit; other dimensions go to the unit's
//! direct setter or the store. One failing formula is logged and skipped,
//! never fatal to the pass.

pub mod ast;
pub mod error;
pub mod eval;
pub mod grammar;
pub mod lexer;

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::catalog::{DimensionRole, ProductCatalog};
use crate::engine::config::EngineConfig;
use crate::engine::propagate::{propagate, ChangeFlags};
use crate::engine::resize::resize_width;
use crate::model::{Scene, Unit, UnitId};
use crate::store::StateStore;

pub use ast::{BinaryOp, Expr, GeomField};
pub use error::FormulaError;
pub use eval::{evaluate, Scope};
pub use grammar::parse_formula;

/// Cancellable single-shot timer gating recalculation
///
/// Purely deadline-based: the host drives it by calling `due` with the
/// current instant, so there is no background thread to tear down beyond
/// cancelling the pending deadline.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Arm (or re-arm) the timer; bursts of requests collapse into one firing
    pub fn request(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }
}

/// Aggregate outcome of one recalculation, raised once per run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecalcSummary {
    pub passes: usize,
    /// Updates applied across all passes
    pub applied: usize,
    /// Width updates refused by the width-change resolver
    pub rejected: usize,
    /// Formulas that failed to parse or evaluate
    pub skipped: usize,
    /// Units that received at least one applied update
    pub touched: Vec<UnitId>,
}

struct PendingUpdate {
    unit: UnitId,
    dimension: String,
    value: f64,
}

/// Drives debounced, re-entrancy-guarded formula recalculation
#[derive(Debug)]
pub struct FormulaEngine {
    debounce: Debouncer,
    in_progress: bool,
    stamp: u64,
}

impl FormulaEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            debounce: Debouncer::new(Duration::from_millis(config.debounce_ms)),
            in_progress: false,
            stamp: 0,
        }
    }

    /// Arm the debounce window after a formula or dependency edit
    pub fn request_recalc(&mut self, now: Instant) {
        self.debounce.request(now);
    }

    /// Cancel any pending trigger, used on session teardown
    pub fn cancel_pending(&mut self) {
        self.debounce.cancel();
    }

    pub fn has_pending(&self) -> bool {
        self.debounce.is_armed()
    }

    /// Fire the debounced trigger if its window has elapsed
    pub fn tick(
        &mut self,
        now: Instant,
        scene: &mut Scene,
        catalog: &dyn ProductCatalog,
        store: &mut dyn StateStore,
        config: &EngineConfig,
    ) -> Option<RecalcSummary> {
        if !self.debounce.due(now) {
            return None;
        }
        self.debounce.cancel();
        self.recalculate(scene, catalog, store, config)
    }

    /// Run a full recalculation immediately
    ///
    /// A request arriving while one is already running is dropped, not
    /// queued; the next debounce cycle catches up.
    pub fn recalculate(
        &mut self,
        scene: &mut Scene,
        catalog: &dyn ProductCatalog,
        store: &mut dyn StateStore,
        config: &EngineConfig,
    ) -> Option<RecalcSummary> {
        if self.in_progress {
            debug!("recalculation already in progress, request dropped");
            return None;
        }
        self.in_progress = true;
        let summary = self.run_passes(scene, catalog, store, config);
        self.in_progress = false;
        Some(summary)
    }

    fn run_passes(
        &mut self,
        scene: &mut Scene,
        catalog: &dyn ProductCatalog,
        store: &mut dyn StateStore,
        config: &EngineConfig,
    ) -> RecalcSummary {
        let mut summary = RecalcSummary::default();
        let mut touched: BTreeSet<UnitId> = BTreeSet::new();

        for _ in 0..config.max_formula_passes {
            summary.passes += 1;

            let mut pending: Vec<PendingUpdate> = Vec::new();
            {
                let scope = Scope::new(scene, catalog, &*store);
                for unit in &scene.units {
                    for (dimension, source) in &unit.formulas {
                        let origin = format!("{}.{}", unit.id, dimension);
                        let expr = match grammar::parse_formula(source) {
                            Ok(expr) => expr,
                            Err(errors) => {
                                for err in &errors {
                                    warn!(
                                        formula = %origin,
                                        "formula skipped: {}",
                                        err.format(source, &origin)
                                    );
                                }
                                summary.skipped += 1;
                                continue;
                            }
                        };
                        let value = match eval::evaluate(&expr, &scope) {
                            Ok(value) => value,
                            Err(err) => {
                                warn!(formula = %origin, "formula skipped: {}", err);
                                summary.skipped += 1;
                                continue;
                            }
                        };
                        let observed = observed_value(&scope, unit, catalog, dimension);
                        if (value - observed).abs() > config.epsilon {
                            pending.push(PendingUpdate {
                                unit: unit.id.clone(),
                                dimension: dimension.clone(),
                                value,
                            });
                        }
                    }
                }
            }

            if pending.is_empty() {
                break;
            }

            let mut applied_this_pass = 0usize;
            for update in pending {
                if is_width_dimension(scene, catalog, &update.unit, &update.dimension) {
                    match resize_width(scene, catalog, &update.unit, update.value, config) {
                        Ok(_) => {
                            applied_this_pass += 1;
                            touched.insert(update.unit);
                        }
                        Err(rejection) => {
                            warn!(
                                unit = %update.unit,
                                dimension = %update.dimension,
                                "formula update rejected: {}",
                                rejection
                            );
                            summary.rejected += 1;
                        }
                    }
                } else if apply_direct(scene, catalog, store, &update, config) {
                    applied_this_pass += 1;
                    touched.insert(update.unit);
                }
            }

            summary.applied += applied_this_pass;
            if applied_this_pass == 0 {
                break;
            }
        }

        if !touched.is_empty() {
            self.stamp += 1;
            for id in &touched {
                if let Some(unit) = scene.get_mut(id) {
                    unit.last_evaluated = Some(self.stamp);
                }
            }
        }
        summary.touched = touched.into_iter().collect();
        debug!(
            passes = summary.passes,
            applied = summary.applied,
            rejected = summary.rejected,
            skipped = summary.skipped,
            "recalculation finished"
        );
        summary
    }
}

/// The live value a formula result is compared against
fn observed_value(scope: &Scope<'_>, unit: &Unit, catalog: &dyn ProductCatalog, dimension: &str) -> f64 {
    if is_width_dimension_of(unit, catalog, dimension) {
        unit.width
    } else {
        scope.dim(unit.id.as_str(), dimension)
    }
}

fn is_width_dimension(
    scene: &Scene,
    catalog: &dyn ProductCatalog,
    unit_id: &UnitId,
    dimension: &str,
) -> bool {
    scene
        .get(unit_id)
        .is_some_and(|unit| is_width_dimension_of(unit, catalog, dimension))
}

fn is_width_dimension_of(unit: &Unit, catalog: &dyn ProductCatalog, dimension: &str) -> bool {
    if dimension == "width" {
        return true;
    }
    unit.product_id
        .as_deref()
        .and_then(|p| catalog.product_meta(p))
        .is_some_and(|meta| meta.role_of(dimension) == DimensionRole::Width)
}

/// Route a non-width update to the unit's direct setter or the store
fn apply_direct(
    scene: &mut Scene,
    catalog: &dyn ProductCatalog,
    store: &mut dyn StateStore,
    update: &PendingUpdate,
    config: &EngineConfig,
) -> bool {
    let Some(unit) = scene.get_mut(&update.unit) else {
        return false;
    };

    let role = unit
        .product_id
        .as_deref()
        .and_then(|p| catalog.product_meta(p))
        .map(|meta| meta.role_of(update.dimension.as_str()))
        .unwrap_or(DimensionRole::Other);

    let flags = match (role, update.dimension.as_str()) {
        (DimensionRole::Height, _) | (DimensionRole::Other, "height") => {
            unit.height = update.value;
            ChangeFlags::height()
        }
        (DimensionRole::Depth, _) | (DimensionRole::Other, "depth") => {
            unit.depth = update.value;
            ChangeFlags::depth()
        }
        (DimensionRole::DoorOverhang, _) => {
            unit.door_overhang = update.value > 0.5;
            ChangeFlags::overhang()
        }
        _ => {
            store.set_value(&update.unit, &update.dimension, update.value);
            return true;
        }
    };
    propagate(scene, &update.unit, flags, config);
    true
}
