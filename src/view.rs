use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{check_len, ProjectionError, Result};
use crate::Vec3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewAxes {
    #[default]
    Xy,
    Xz,
    Yz,
}

impl ViewAxes {
    pub const ALL: [ViewAxes; 3] = [ViewAxes::Xy, ViewAxes::Xz, ViewAxes::Yz];

    /// Snapshot axis indices feeding (x, y, depth).
    pub fn order(self) -> [usize; 3] {
        match self {
            ViewAxes::Xy => [0, 1, 2],
            ViewAxes::Xz => [0, 2, 1],
            ViewAxes::Yz => [1, 2, 0],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewAxes::Xy => "xy",
            ViewAxes::Xz => "xz",
            ViewAxes::Yz => "yz",
        }
    }

    pub fn permute(self, p: Vec3) -> Vec3 {
        let [a, b, c] = self.order();
        Vec3::new(p.axis(a), p.axis(b), p.axis(c))
    }
}

impl FromStr for ViewAxes {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "xy" => Ok(ViewAxes::Xy),
            "xz" => Ok(ViewAxes::Xz),
            "yz" => Ok(ViewAxes::Yz),
            other => Err(ProjectionError::UnknownViewAxes(other.to_string())),
        }
    }
}

impl fmt::Display for ViewAxes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Centering {
    None,
    /// A point in the snapshot frame; permuted along with the particles.
    Explicit(Vec3),
    #[default]
    DensityWeighted,
    /// An offset already expressed in the view frame.
    Supplied(Vec3),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaneCoords {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub depth: Vec<f64>,
}

impl PlaneCoords {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn point(&self, index: usize) -> Vec3 {
        Vec3::new(self.x[index], self.y[index], self.depth[index])
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewFrame {
    pub coords: PlaneCoords,
    pub markers: Vec<Vec<Vec3>>,
    /// View-frame offset subtracted from everything.
    pub center: Vec3,
}

/// `weights` feeds [`Centering::DensityWeighted`]. Markers are permuted and
/// shifted identically to the particles.
pub fn set_viewpoint(
    positions: &[Vec3],
    axes: ViewAxes,
    centering: Centering,
    weights: Option<&[f64]>,
    markers: &[&[Vec3]],
) -> Result<ViewFrame> {
    if let Some(weights) = weights {
        check_len("centering weights", positions.len(), weights.len())?;
    }
    let permuted: Vec<Vec3> = positions.iter().map(|p| axes.permute(*p)).collect();
    let center = match centering {
        Centering::None => Vec3::zero(),
        Centering::Explicit(point) => axes.permute(point),
        Centering::Supplied(offset) => offset,
        Centering::DensityWeighted => match weights {
            Some(weights) => weighted_center(&permuted, weights),
            None => Vec3::zero(),
        },
    };

    let n = permuted.len();
    let mut coords = PlaneCoords {
        x: Vec::with_capacity(n),
        y: Vec::with_capacity(n),
        depth: Vec::with_capacity(n),
    };
    for p in &permuted {
        let shifted = p.sub(center);
        coords.x.push(shifted.x);
        coords.y.push(shifted.y);
        coords.depth.push(shifted.z);
    }
    let markers = markers
        .iter()
        .map(|set| set.iter().map(|p| axes.permute(*p).sub(center)).collect())
        .collect();
    Ok(ViewFrame {
        coords,
        markers,
        center,
    })
}

fn weighted_center(points: &[Vec3], weights: &[f64]) -> Vec3 {
    let mut sum = Vec3::zero();
    let mut total = 0.0;
    for (p, w) in points.iter().zip(weights) {
        if !w.is_finite() || *w <= 0.0 {
            continue;
        }
        sum = sum.add(p.scale(*w));
        total += w;
    }
    if total > 0.0 {
        sum.scale(1.0 / total)
    } else {
        Vec3::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, tol: f64) {
        assert!(
            (a - b).abs() <= tol,
            "expected {a} to be within {tol} of {b}"
        );
    }

    fn points() -> Vec<Vec3> {
        vec![
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(-4.0, 5.0, -6.0),
            Vec3::new(7.0, -8.0, 9.0),
        ]
    }

    #[test]
    fn unknown_axes_is_a_configuration_error() {
        let err = "zx".parse::<ViewAxes>().unwrap_err();
        assert_eq!(err, ProjectionError::UnknownViewAxes("zx".to_string()));
        assert!(err.to_string().starts_with("configuration error"));
    }

    #[test]
    fn axes_round_trip_through_labels() {
        for axes in ViewAxes::ALL {
            assert_eq!(axes.label().parse::<ViewAxes>().unwrap(), axes);
        }
    }

    #[test]
    fn xz_maps_axis_two_onto_y() {
        let pos = points();
        let sinks = [Vec3::new(0.5, 1.5, 2.5)];
        let frame =
            set_viewpoint(&pos, ViewAxes::Xz, Centering::None, None, &[&sinks[..]]).unwrap();
        for (i, p) in pos.iter().enumerate() {
            assert_eq!(frame.coords.x[i], p.x);
            assert_eq!(frame.coords.y[i], p.z);
            assert_eq!(frame.coords.depth[i], p.y);
        }
        assert_eq!(frame.markers[0][0], Vec3::new(0.5, 2.5, 1.5));
    }

    #[test]
    fn yz_drops_x_into_depth() {
        let pos = points();
        let frame = set_viewpoint(&pos, ViewAxes::Yz, Centering::None, None, &[]).unwrap();
        assert_eq!(frame.coords.point(1), Vec3::new(5.0, -6.0, -4.0));
    }

    #[test]
    fn explicit_center_is_permuted_then_subtracted() {
        let pos = points();
        let center = Vec3::new(1.0, 2.0, 3.0);
        let sinks = [Vec3::new(1.0, 2.0, 3.0)];
        let frame =
            set_viewpoint(&pos, ViewAxes::Xz, Centering::Explicit(center), None, &[&sinks[..]])
                .unwrap();
        assert_eq!(frame.center, Vec3::new(1.0, 3.0, 2.0));
        assert_eq!(frame.coords.point(0), Vec3::zero());
        assert_eq!(frame.markers[0][0], Vec3::zero());
    }

    #[test]
    fn supplied_offset_is_used_as_is() {
        let pos = points();
        let offset = Vec3::new(1.0, 1.0, 1.0);
        let frame =
            set_viewpoint(&pos, ViewAxes::Yz, Centering::Supplied(offset), None, &[]).unwrap();
        assert_eq!(frame.coords.point(0), Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn density_weighted_center() {
        let pos = vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(4.0, 8.0, -4.0)];
        let weights = [1.0, 3.0];
        let frame = set_viewpoint(
            &pos,
            ViewAxes::Xy,
            Centering::DensityWeighted,
            Some(&weights[..]),
            &[],
        )
        .unwrap();
        assert_close(frame.center.x, 3.0, 1e-12);
        assert_close(frame.center.y, 6.0, 1e-12);
        assert_close(frame.center.z, -3.0, 1e-12);
        assert_close(frame.coords.x[1], 1.0, 1e-12);
    }

    #[test]
    fn density_weighted_without_mass_leaves_coords() {
        let pos = points();
        let weights = [0.0; 3];
        let frame = set_viewpoint(
            &pos,
            ViewAxes::Xy,
            Centering::DensityWeighted,
            Some(&weights[..]),
            &[],
        )
        .unwrap();
        assert_eq!(frame.center, Vec3::zero());
        assert_eq!(frame.coords.point(2), pos[2]);
    }

    #[test]
    fn weight_length_must_match() {
        let pos = points();
        let weights = [1.0; 2];
        let err = set_viewpoint(
            &pos,
            ViewAxes::Xy,
            Centering::DensityWeighted,
            Some(&weights[..]),
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, ProjectionError::LengthMismatch { .. }));
    }
}
