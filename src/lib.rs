//! wallplan - interactive parametric layout engine for modular furniture
//!
//! This library keeps a wall run of furniture units geometrically consistent
//! while the user drags units, edits widths, locks edges, pairs and
//! synchronizes groups, and attaches dimension formulas. Four cooperating
//! pieces do the work: the snap resolver corrects live drag positions, the
//! width-change resolver applies committed edits under lock/pair/sync
//! policy, the dependent-component propagator keeps accessory geometry
//! derived from owners, and the formula engine re-evaluates user expressions
//! to a bounded fixed point.
//!
//! # Example
//!
//! ```rust
//! use wallplan::{Planner, Scene, Unit, UnitId, UnitKind};
//!
//! let mut scene = Scene::new();
//! scene.add(Unit::new("b1", UnitKind::Base, 600.0, 720.0, 560.0).at(300.0, 150.0));
//!
//! let mut planner = Planner::new(scene);
//! let applied = planner.resize(&UnitId::new("b1"), 700.0).unwrap();
//! assert_eq!(applied.width, 700.0);
//! ```

pub mod catalog;
pub mod engine;
pub mod formula;
pub mod model;
pub mod store;

pub use catalog::{Catalog, CatalogError, DimensionMeta, DimensionRole, ProductCatalog, ProductMeta};
pub use engine::{
    compute_snap, propagate, resize_width, ChangeFlags, EngineConfig, Point, ResizeRejection,
    SnapKind, SnapPoint, SnapResult, WallSegment, WidthApplied,
};
pub use formula::{parse_formula, FormulaEngine, FormulaError, RecalcSummary, Scope};
pub use model::{
    AccessoryLink, AccessoryRole, Attachment, PairMembership, Position, Scene, Side, Unit, UnitId,
    UnitKind,
};
pub use store::{MemoryStore, StateStore, UnitState};

use std::time::Instant;

/// Facade tying a scene, catalog, store, and the resolvers together
///
/// Live drags go through [`Planner::drag`]; committed edits go through
/// [`Planner::resize`] and [`Planner::place`] and arm the debounced formula
/// recalculation, which [`Planner::tick`] fires once the window elapses.
pub struct Planner {
    pub scene: Scene,
    pub catalog: Catalog,
    pub store: MemoryStore,
    pub config: EngineConfig,
    formulas: FormulaEngine,
}

impl Planner {
    pub fn new(scene: Scene) -> Self {
        let config = EngineConfig::default();
        Self {
            formulas: FormulaEngine::new(&config),
            scene,
            catalog: Catalog::default(),
            store: MemoryStore::new(),
            config,
        }
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_store(mut self, store: MemoryStore) -> Self {
        self.store = store;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.formulas = FormulaEngine::new(&config);
        self.config = config;
        self
    }

    /// Compute the snapped position for a live drag; mutates nothing
    pub fn drag(&self, unit: &UnitId, x: f64, y: f64, walls: &[WallSegment]) -> SnapResult {
        compute_snap(&self.scene, unit, Point::new(x, y), walls, &self.config)
    }

    /// Commit a drag: move the unit and propagate the position change
    pub fn place(&mut self, unit: &UnitId, position: Point) {
        if let Some(u) = self.scene.get_mut(unit) {
            u.position.x = position.x.max(0.0);
            u.position.y = position.y;
            propagate(&mut self.scene, unit, ChangeFlags::position(), &self.config);
            self.formulas.request_recalc(Instant::now());
        }
    }

    /// Commit a width edit through the full lock/pair/sync resolution
    pub fn resize(&mut self, unit: &UnitId, width: f64) -> Result<WidthApplied, ResizeRejection> {
        let applied = resize_width(&mut self.scene, &self.catalog, unit, width, &self.config)?;
        self.formulas.request_recalc(Instant::now());
        Ok(applied)
    }

    /// Attach or replace a formula; evaluation is deferred to the debounce
    pub fn set_formula(&mut self, unit: &UnitId, dimension: &str, source: &str) {
        if let Some(u) = self.scene.get_mut(unit) {
            u.formulas.insert(dimension.to_string(), source.to_string());
            self.formulas.request_recalc(Instant::now());
        }
    }

    pub fn clear_formula(&mut self, unit: &UnitId, dimension: &str) {
        if let Some(u) = self.scene.get_mut(unit) {
            u.formulas.remove(dimension);
            self.formulas.request_recalc(Instant::now());
        }
    }

    /// Fire the debounced recalculation if its window has elapsed
    pub fn tick(&mut self) -> Option<RecalcSummary> {
        self.formulas.tick(
            Instant::now(),
            &mut self.scene,
            &self.catalog,
            &mut self.store,
            &self.config,
        )
    }

    /// Run a recalculation immediately, bypassing the debounce
    pub fn recalculate_now(&mut self) -> Option<RecalcSummary> {
        self.formulas.cancel_pending();
        self.formulas
            .recalculate(&mut self.scene, &self.catalog, &mut self.store, &self.config)
    }

    /// Cancel any pending recalculation trigger, used on teardown
    pub fn shutdown(&mut self) {
        self.formulas.cancel_pending();
    }
}
