//! Geometry primitives over geographic coordinates.
//!
//! Distances are great-circle (haversine). Interpolation along a path is
//! linear in coordinate space between vertices, weighted by cumulative arc
//! length; the error grows with segment length but stays negligible at city
//! scale. Polygon tests run on a local equirectangular projection around the
//! polygon, so they share a single metric tolerance.

use crate::error::GeometryError;
use crate::models::Coordinate;

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Tolerance for segment crossings on projected coordinates, in meters.
const EPS_M: f64 = 1e-6;

/// Calculate distance between two points in meters using Haversine formula.
///
/// # Arguments
/// * `lat1`, `lon1` - First point coordinates in decimal degrees
/// * `lat2`, `lon2` - Second point coordinates in decimal degrees
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Great-circle distance between two coordinates in meters.
pub fn distance_m(a: Coordinate, b: Coordinate) -> f64 {
    haversine_distance(a.lat, a.lon, b.lat, b.lon)
}

/// Meters per degree of latitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lat(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_132.954 - 559.822 * (2.0 * lat_rad).cos() + 1.175 * (4.0 * lat_rad).cos()
        - 0.0023 * (6.0 * lat_rad).cos()
}

/// Meters per degree of longitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lon(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_412.84 * lat_rad.cos() - 93.5 * (3.0 * lat_rad).cos() + 0.118 * (5.0 * lat_rad).cos()
}

/// Total length of a path in kilometers.
pub fn path_length_km(path: &[Coordinate]) -> Result<f64, GeometryError> {
    let cumulative = cumulative_km(path)?;
    Ok(cumulative.last().copied().unwrap_or(0.0))
}

/// Position `distance_km` along the path, measured from its first point.
///
/// Distances below zero clamp to the start, distances past the end clamp to
/// the last point.
pub fn point_at_distance(
    path: &[Coordinate],
    distance_km: f64,
) -> Result<Coordinate, GeometryError> {
    let cumulative = cumulative_km(path)?;
    let (index, ratio) = locate(&cumulative, distance_km);
    let start = path[index];
    let Some(end) = path.get(index + 1) else {
        return Ok(start);
    };
    Ok(Coordinate {
        lat: start.lat + (end.lat - start.lat) * ratio,
        lon: start.lon + (end.lon - start.lon) * ratio,
    })
}

/// Index of the last waypoint passed once `distance_km` has been flown.
pub fn waypoint_index_at_distance(
    path: &[Coordinate],
    distance_km: f64,
) -> Result<usize, GeometryError> {
    let cumulative = cumulative_km(path)?;
    Ok(locate(&cumulative, distance_km).0)
}

/// Normalize a polygon ring to closed form (first vertex repeated at the end).
pub fn close_ring(ring: &[Coordinate]) -> Result<Vec<Coordinate>, GeometryError> {
    if ring.iter().any(|c| !c.is_finite()) {
        return Err(GeometryError::NonFiniteCoordinate);
    }

    let mut closed = ring.to_vec();
    if let (Some(first), Some(last)) = (ring.first(), ring.last()) {
        if first != last {
            closed.push(*first);
        }
    }

    let distinct = closed.len().saturating_sub(1);
    if distinct < 3 {
        return Err(GeometryError::DegenerateRing { vertices: distinct });
    }
    Ok(closed)
}

/// Check if a point lies inside a polygon ring (boundary counts as inside).
/// Uses ray casting.
pub fn point_in_polygon(point: Coordinate, ring: &[Coordinate]) -> Result<bool, GeometryError> {
    if !point.is_finite() {
        return Err(GeometryError::NonFiniteCoordinate);
    }
    let ring = close_ring(ring)?;
    let projection = LocalProjection::around(&ring);
    let p = projection.project(point);
    let projected: Vec<(f64, f64)> = ring.iter().map(|c| projection.project(*c)).collect();

    if projected
        .windows(2)
        .any(|edge| segments_intersect_2d(p, p, edge[0], edge[1]))
    {
        return Ok(true);
    }
    Ok(ray_cast(p, &projected))
}

/// Check if any part of a path touches a polygon: a segment crossing an edge,
/// or a vertex lying inside.
pub fn line_intersects_polygon(
    path: &[Coordinate],
    ring: &[Coordinate],
) -> Result<bool, GeometryError> {
    if path.len() < 2 {
        return Err(GeometryError::InsufficientPath { points: path.len() });
    }
    if path.iter().any(|c| !c.is_finite()) {
        return Err(GeometryError::NonFiniteCoordinate);
    }
    let ring = close_ring(ring)?;
    let projection = LocalProjection::around(&ring);
    let edges: Vec<(f64, f64)> = ring.iter().map(|c| projection.project(*c)).collect();
    let line: Vec<(f64, f64)> = path.iter().map(|c| projection.project(*c)).collect();

    for segment in line.windows(2) {
        for edge in edges.windows(2) {
            if segments_intersect_2d(segment[0], segment[1], edge[0], edge[1]) {
                return Ok(true);
            }
        }
    }

    // No edge crossings: either fully inside or fully outside.
    Ok(ray_cast(line[0], &edges))
}

/// Cumulative distance in kilometers at each vertex of the path.
fn cumulative_km(path: &[Coordinate]) -> Result<Vec<f64>, GeometryError> {
    if path.len() < 2 {
        return Err(GeometryError::InsufficientPath { points: path.len() });
    }
    if path.iter().any(|c| !c.is_finite()) {
        return Err(GeometryError::NonFiniteCoordinate);
    }

    let mut total = 0.0;
    let mut cumulative = Vec::with_capacity(path.len());
    cumulative.push(0.0);
    for pair in path.windows(2) {
        total += distance_m(pair[0], pair[1]) / 1000.0;
        cumulative.push(total);
    }
    Ok(cumulative)
}

/// Segment index and fractional position within it for a target distance.
/// Zero-length segments are never selected, so the ratio is always defined.
fn locate(cumulative: &[f64], distance_km: f64) -> (usize, f64) {
    let last = cumulative.len() - 1;
    if !distance_km.is_finite() || distance_km <= 0.0 {
        return (0, 0.0);
    }
    if distance_km >= cumulative[last] {
        return (last, 0.0);
    }

    for i in 0..last {
        let seg_start = cumulative[i];
        let seg_len = cumulative[i + 1] - seg_start;
        if seg_len <= f64::EPSILON {
            continue;
        }
        if distance_km < cumulative[i + 1] {
            return (i, ((distance_km - seg_start) / seg_len).clamp(0.0, 1.0));
        }
    }
    (last, 0.0)
}

/// Equirectangular projection to meters around a reference latitude/longitude.
struct LocalProjection {
    ref_lat: f64,
    ref_lon: f64,
    m_per_deg_lat: f64,
    m_per_deg_lon: f64,
}

impl LocalProjection {
    fn around(ring: &[Coordinate]) -> Self {
        let count = ring.len().max(1) as f64;
        let (sum_lat, sum_lon) = ring
            .iter()
            .fold((0.0, 0.0), |acc, c| (acc.0 + c.lat, acc.1 + c.lon));
        let ref_lat = sum_lat / count;
        let ref_lon = sum_lon / count;
        Self {
            ref_lat,
            ref_lon,
            m_per_deg_lat: meters_per_deg_lat(ref_lat),
            m_per_deg_lon: meters_per_deg_lon(ref_lat),
        }
    }

    fn project(&self, c: Coordinate) -> (f64, f64) {
        (
            (c.lon - self.ref_lon) * self.m_per_deg_lon,
            (c.lat - self.ref_lat) * self.m_per_deg_lat,
        )
    }
}

/// Even-odd ray casting against a closed, projected ring.
fn ray_cast(p: (f64, f64), ring: &[(f64, f64)]) -> bool {
    let (x, y) = p;
    let mut inside = false;
    for edge in ring.windows(2) {
        let (xi, yi) = edge[0];
        let (xj, yj) = edge[1];
        if ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
    }
    inside
}

pub(crate) fn segments_intersect_2d(
    a1: (f64, f64),
    a2: (f64, f64),
    b1: (f64, f64),
    b2: (f64, f64),
) -> bool {
    fn orient(p: (f64, f64), q: (f64, f64), r: (f64, f64)) -> f64 {
        (q.0 - p.0) * (r.1 - p.1) - (q.1 - p.1) * (r.0 - p.0)
    }

    fn within(a: f64, b: f64, value: f64) -> bool {
        let min = a.min(b) - EPS_M;
        let max = a.max(b) + EPS_M;
        value >= min && value <= max
    }

    fn on_segment(p: (f64, f64), q: (f64, f64), r: (f64, f64)) -> bool {
        within(p.0, q.0, r.0) && within(p.1, q.1, r.1)
    }

    let o1 = orient(a1, a2, b1);
    let o2 = orient(a1, a2, b2);
    let o3 = orient(b1, b2, a1);
    let o4 = orient(b1, b2, a2);

    if o1.abs() <= EPS_M && on_segment(a1, a2, b1) {
        return true;
    }
    if o2.abs() <= EPS_M && on_segment(a1, a2, b2) {
        return true;
    }
    if o3.abs() <= EPS_M && on_segment(b1, b2, a1) {
        return true;
    }
    if o4.abs() <= EPS_M && on_segment(b1, b2, a2) {
        return true;
    }

    let a_crosses = (o1 > EPS_M && o2 < -EPS_M) || (o1 < -EPS_M && o2 > EPS_M);
    let b_crosses = (o3 > EPS_M && o4 < -EPS_M) || (o3 < -EPS_M && o4 > EPS_M);
    a_crosses && b_crosses
}
