//! Expression AST for dimension formulas

/// Geometric fields readable through `cab(unit, field)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeomField {
    X,
    Y,
    Z,
    Width,
    Height,
    Depth,
    Left,
    Right,
    Top,
    Bottom,
    /// Shell width minus the appliance gaps
    VisualWidth,
    LeftGap,
    RightGap,
}

impl GeomField {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "x" => Some(Self::X),
            "y" => Some(Self::Y),
            "z" => Some(Self::Z),
            "width" => Some(Self::Width),
            "height" => Some(Self::Height),
            "depth" => Some(Self::Depth),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "top" => Some(Self::Top),
            "bottom" => Some(Self::Bottom),
            "visual_width" => Some(Self::VisualWidth),
            "left_gap" => Some(Self::LeftGap),
            "right_gap" => Some(Self::RightGap),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
            Self::Width => "width",
            Self::Height => "height",
            Self::Depth => "depth",
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::VisualWidth => "visual_width",
            Self::LeftGap => "left_gap",
            Self::RightGap => "right_gap",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// A parsed formula expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    /// `cab(unit, field)` - a geometric field of another unit
    Cab { unit: String, field: GeomField },
    /// `dim(unit, dimension)` - a named dimension of another unit
    Dim { unit: String, dimension: String },
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Min(Box<Expr>, Box<Expr>),
    Max(Box<Expr>, Box<Expr>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names_roundtrip() {
        for field in [
            GeomField::X,
            GeomField::Width,
            GeomField::Left,
            GeomField::VisualWidth,
            GeomField::RightGap,
        ] {
            assert_eq!(GeomField::from_name(field.as_str()), Some(field));
        }
        assert_eq!(GeomField::from_name("diagonal"), None);
    }
}
