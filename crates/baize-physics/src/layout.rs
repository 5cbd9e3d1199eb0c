//! Table geometry: playing-area bounds, cushion extents, pockets and knuckles.
//!
//! Every dimension is a multiple of the ball radius so one layout serves any
//! ball size.

use serde::{Deserialize, Serialize};

use baize_core::math::{Vec3, fround};

use crate::knuckle::Knuckle;
use crate::pocket::Pocket;

/// Named table layouts selectable from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    #[default]
    Pool,
    Snooker,
    Carom,
}

impl LayoutKind {
    pub fn build(self, radius: f64) -> TableLayout {
        match self {
            Self::Pool => TableLayout::pool(radius),
            Self::Snooker => TableLayout::snooker(radius),
            Self::Carom => TableLayout::carom(radius),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableLayout {
    /// Half-length of the area a ball centre can reach before touching a cushion.
    pub table_x: f64,
    /// Half-width of the same area.
    pub table_y: f64,
    /// Short cushions only exist for `|y|` up to this value.
    pub cushion_y_limit: f64,
    /// Long cushions only exist for `|x|` up to this value...
    pub cushion_x_limit: f64,
    /// ...and from this value outward (the middle-pocket gap).
    pub middle_gap: f64,
    pub pockets: Vec<Pocket>,
    pub knuckles: Vec<Knuckle>,
}

impl TableLayout {
    /// Six-pocket table with the given inner half-extents and pocket radii,
    /// all in units of `r`.
    fn pocketed(r: f64, half_x: f64, half_y: f64, corner: f64, middle: f64) -> Self {
        let table_x = fround(half_x * r);
        let table_y = fround(half_y * r);
        // Cushion faces.
        let cx = table_x + r;
        let cy = table_y + r;
        let knuckle_r = 0.5 * r;

        let mut pockets = Vec::with_capacity(6);
        for (sx, sy) in [(1.0, 1.0), (-1.0, 1.0), (1.0, -1.0), (-1.0, -1.0)] {
            pockets.push(Pocket::new(
                Vec3::new(sx * (cx + 0.5 * r), sy * (cy + 0.5 * r), 0.0),
                corner * r,
            ));
        }
        for sy in [1.0, -1.0] {
            pockets.push(Pocket::new(Vec3::new(0.0, sy * (cy + 1.5 * r), 0.0), middle * r));
        }

        let mut knuckles = Vec::with_capacity(12);
        for (sx, sy) in [(1.0, 1.0), (-1.0, 1.0), (1.0, -1.0), (-1.0, -1.0)] {
            knuckles.push(Knuckle::new(
                Vec3::new(sx * (cx - 2.4 * r), sy * (cy + 0.2 * r), 0.0),
                knuckle_r,
            ));
            knuckles.push(Knuckle::new(
                Vec3::new(sx * (cx + 0.2 * r), sy * (cy - 2.4 * r), 0.0),
                knuckle_r,
            ));
            knuckles.push(Knuckle::new(
                Vec3::new(sx * 2.2 * r, sy * (cy + 0.2 * r), 0.0),
                knuckle_r,
            ));
        }

        Self {
            table_x,
            table_y,
            cushion_x_limit: fround(cx - 2.4 * r),
            cushion_y_limit: fround(cy - 2.4 * r),
            middle_gap: fround(2.2 * r),
            pockets,
            knuckles,
        }
    }

    /// Nine-foot pool table.
    pub fn pool(r: f64) -> Self {
        Self::pocketed(r, 43.0, 21.0, 2.0, 2.0)
    }

    /// Full-size snooker table, with tighter pockets.
    pub fn snooker(r: f64) -> Self {
        Self::pocketed(r, 67.0, 33.0, 1.8, 1.9)
    }

    /// Pocketless carom table: cushions run the full length of every side.
    pub fn carom(r: f64) -> Self {
        let table_x = fround(46.0 * r);
        let table_y = fround(23.0 * r);
        Self {
            table_x,
            table_y,
            cushion_x_limit: table_x,
            cushion_y_limit: table_y,
            middle_gap: 0.0,
            pockets: Vec::new(),
            knuckles: Vec::new(),
        }
    }

    pub fn has_pockets(&self) -> bool {
        !self.pockets.is_empty()
    }

    /// Strictly inside the area bounded by the cushions.
    pub fn is_inside(&self, pos: &Vec3) -> bool {
        pos.x.abs() < self.table_x && pos.y.abs() < self.table_y
    }

    /// Whether a long (±Y) cushion exists at this `x`.
    pub fn long_cushion_at(&self, x: f64) -> bool {
        !self.has_pockets() || (x.abs() <= self.cushion_x_limit && x.abs() >= self.middle_gap)
    }

    /// Whether a short (±X) cushion exists at this `y`.
    pub fn short_cushion_at(&self, y: f64) -> bool {
        !self.has_pockets() || y.abs() <= self.cushion_y_limit
    }

    /// The same layout with every length multiplied by `factor`, for a
    /// change of ball radius.
    pub fn scaled(&self, factor: f64) -> Self {
        let scale = |x: f64| fround(x * factor);
        let scale_vec = |v: Vec3| (v * factor).fround();
        Self {
            table_x: scale(self.table_x),
            table_y: scale(self.table_y),
            cushion_y_limit: scale(self.cushion_y_limit),
            cushion_x_limit: scale(self.cushion_x_limit),
            middle_gap: scale(self.middle_gap),
            pockets: self
                .pockets
                .iter()
                .map(|p| Pocket::new(scale_vec(p.centre), scale(p.radius)))
                .collect(),
            knuckles: self
                .knuckles
                .iter()
                .map(|k| Knuckle::new(scale_vec(k.centre), scale(k.radius)))
                .collect(),
        }
    }

    /// Index of the pocket whose centre is closest to `pos` (horizontally).
    pub fn nearest_pocket(&self, pos: &Vec3) -> Option<usize> {
        let flat = pos.with_z(0.0);
        self.pockets
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.centre
                    .distance_squared_to(&flat)
                    .total_cmp(&b.centre.distance_squared_to(&flat))
            })
            .map(|(i, _)| i)
    }
}
