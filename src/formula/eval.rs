//! Read-only evaluation scope for formulas
//!
//! Exposes the two accessors available inside expressions: `cab` for
//! geometric fields and `dim` for named dimensions. Missing units, fields,
//! and dimensions evaluate to 0 so a malformed reference degrades gracefully
//! instead of aborting the pass; only non-finite arithmetic is an error.

use crate::catalog::{DimensionRole, ProductCatalog};
use crate::model::{Scene, UnitId, UnitKind};
use crate::store::StateStore;

use super::ast::{BinaryOp, Expr, GeomField};
use super::error::FormulaError;

/// Read-only view over the geometry, catalog, and persisted state
pub struct Scope<'a> {
    scene: &'a Scene,
    catalog: &'a dyn ProductCatalog,
    store: &'a dyn StateStore,
}

impl<'a> Scope<'a> {
    pub fn new(
        scene: &'a Scene,
        catalog: &'a dyn ProductCatalog,
        store: &'a dyn StateStore,
    ) -> Self {
        Self {
            scene,
            catalog,
            store,
        }
    }

    /// `cab(unit, field)`: a geometric field, 0 when the unit is missing
    pub fn cab(&self, unit: &str, field: GeomField) -> f64 {
        let Some(u) = self.scene.get(&UnitId::new(unit)) else {
            return 0.0;
        };
        match field {
            GeomField::X => u.position.x,
            GeomField::Y => u.position.y,
            GeomField::Z => u.position.z,
            GeomField::Width => u.width,
            GeomField::Height => u.height,
            GeomField::Depth => u.depth,
            GeomField::Left => u.left_edge(),
            GeomField::Right => u.right_edge(),
            GeomField::Top => u.top(),
            GeomField::Bottom => u.bottom(),
            GeomField::LeftGap => self.appliance_gap(unit, u.kind, "left_gap"),
            GeomField::RightGap => self.appliance_gap(unit, u.kind, "right_gap"),
            GeomField::VisualWidth => {
                u.width
                    - self.appliance_gap(unit, u.kind, "left_gap")
                    - self.appliance_gap(unit, u.kind, "right_gap")
            }
        }
    }

    fn appliance_gap(&self, unit: &str, kind: UnitKind, dimension: &str) -> f64 {
        if kind == UnitKind::Appliance {
            self.dim(unit, dimension)
        } else {
            0.0
        }
    }

    /// `dim(unit, dimension)`: persisted override, then the type-computed
    /// value, then the catalog default, then 0
    pub fn dim(&self, unit: &str, dimension: &str) -> f64 {
        let id = UnitId::new(unit);
        let Some(u) = self.scene.get(&id) else {
            return 0.0;
        };

        if let Some(value) = self.store.value(&id, dimension) {
            return value;
        }

        let meta = u
            .product_id
            .as_deref()
            .and_then(|p| self.catalog.product_meta(p));

        if let Some(meta) = meta {
            match meta.role_of(dimension) {
                DimensionRole::Width => return u.width,
                DimensionRole::Height => return u.height,
                DimensionRole::Depth => return u.depth,
                DimensionRole::DoorOverhang => {
                    return if u.door_overhang { 1.0 } else { 0.0 };
                }
                _ => {}
            }
        }

        // well-known geometric names compute even without catalog metadata
        match dimension {
            "width" => return u.width,
            "height" => return u.height,
            "depth" => return u.depth,
            _ => {}
        }

        meta.and_then(|m| m.dimensions.get(dimension))
            .map(|d| d.default)
            .unwrap_or(0.0)
    }
}

/// Evaluate an expression against the scope
pub fn evaluate(expr: &Expr, scope: &Scope<'_>) -> Result<f64, FormulaError> {
    let value = eval_inner(expr, scope);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FormulaError::eval(
            "expression did not evaluate to a finite number",
        ))
    }
}

fn eval_inner(expr: &Expr, scope: &Scope<'_>) -> f64 {
    match expr {
        Expr::Number(n) => *n,
        Expr::Cab { unit, field } => scope.cab(unit, *field),
        Expr::Dim { unit, dimension } => scope.dim(unit, dimension),
        Expr::Neg(inner) => -eval_inner(inner, scope),
        Expr::Binary { op, lhs, rhs } => {
            let lhs = eval_inner(lhs, scope);
            let rhs = eval_inner(rhs, scope);
            match op {
                BinaryOp::Add => lhs + rhs,
                BinaryOp::Sub => lhs - rhs,
                BinaryOp::Mul => lhs * rhs,
                BinaryOp::Div => lhs / rhs,
            }
        }
        Expr::Min(a, b) => eval_inner(a, scope).min(eval_inner(b, scope)),
        Expr::Max(a, b) => eval_inner(a, scope).max(eval_inner(b, scope)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::formula::grammar::parse_formula;
    use crate::model::Unit;
    use crate::store::{MemoryStore, StateStore};

    fn fixture() -> (Scene, Catalog, MemoryStore) {
        let mut scene = Scene::new();
        let mut base = Unit::new("b1", UnitKind::Base, 600.0, 720.0, 560.0).at(100.0, 150.0);
        base.product_id = Some("base-600".to_string());
        scene.add(base);
        let mut appliance = Unit::new("app", UnitKind::Appliance, 600.0, 820.0, 560.0);
        appliance.product_id = Some("appliance-600".to_string());
        scene.add(appliance);
        (scene, Catalog::default(), MemoryStore::new())
    }

    fn eval_str(source: &str, scene: &Scene, catalog: &Catalog, store: &MemoryStore) -> f64 {
        let expr = parse_formula(source).expect("formula parses");
        let scope = Scope::new(scene, catalog, store);
        evaluate(&expr, &scope).expect("formula evaluates")
    }

    #[test]
    fn test_cab_geometry_fields() {
        let (scene, catalog, store) = fixture();
        assert_eq!(eval_str("cab(b1, width)", &scene, &catalog, &store), 600.0);
        assert_eq!(eval_str("cab(b1, left)", &scene, &catalog, &store), 100.0);
        assert_eq!(eval_str("cab(b1, right)", &scene, &catalog, &store), 700.0);
        assert_eq!(eval_str("cab(b1, top)", &scene, &catalog, &store), 870.0);
    }

    #[test]
    fn test_missing_unit_yields_zero() {
        let (scene, catalog, store) = fixture();
        assert_eq!(eval_str("cab(ghost, width)", &scene, &catalog, &store), 0.0);
        assert_eq!(eval_str("dim(ghost, width)", &scene, &catalog, &store), 0.0);
    }

    #[test]
    fn test_dim_override_beats_computed() {
        let (scene, catalog, mut store) = fixture();
        assert_eq!(eval_str("dim(b1, width)", &scene, &catalog, &store), 600.0);
        store.set_value(&UnitId::new("b1"), "width", 650.0);
        assert_eq!(eval_str("dim(b1, width)", &scene, &catalog, &store), 650.0);
    }

    #[test]
    fn test_dim_falls_back_to_catalog_default() {
        let (scene, catalog, store) = fixture();
        // no override, not geometric: shelf_count defaults to 1 in the catalog
        assert_eq!(
            eval_str("dim(b1, shelf_count)", &scene, &catalog, &store),
            1.0
        );
        // unknown everywhere: zero
        assert_eq!(eval_str("dim(b1, mystery)", &scene, &catalog, &store), 0.0);
    }

    #[test]
    fn test_appliance_visual_width() {
        let (scene, catalog, store) = fixture();
        // gaps default to 20 each in the catalog; shell width 600
        assert_eq!(eval_str("cab(app, left_gap)", &scene, &catalog, &store), 20.0);
        assert_eq!(
            eval_str("cab(app, visual_width)", &scene, &catalog, &store),
            560.0
        );
        // non-appliance units have no gaps
        assert_eq!(eval_str("cab(b1, left_gap)", &scene, &catalog, &store), 0.0);
        assert_eq!(
            eval_str("cab(b1, visual_width)", &scene, &catalog, &store),
            600.0
        );
    }

    #[test]
    fn test_arithmetic() {
        let (scene, catalog, store) = fixture();
        assert_eq!(
            eval_str("cab(b1, width) / 2 + 10", &scene, &catalog, &store),
            310.0
        );
        assert_eq!(
            eval_str("min(cab(b1, width), 500)", &scene, &catalog, &store),
            500.0
        );
        assert_eq!(eval_str("-(3 * 4)", &scene, &catalog, &store), -12.0);
    }

    #[test]
    fn test_division_by_zero_is_an_error() {
        let (scene, catalog, store) = fixture();
        let expr = parse_formula("600 / cab(ghost, width)").unwrap();
        let scope = Scope::new(&scene, &catalog, &store);
        assert!(evaluate(&expr, &scope).is_err());
    }
}
