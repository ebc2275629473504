use super::types::Point;

// ── Connector geometry ──────────────────────────────────────────────
// Control points are joined with step-after segments: each hop runs
// horizontally to the next x first, then vertically to the next y.

/// Degenerate path for links that are not drawn.
pub(super) fn suppressed_points() -> Vec<Point> {
    vec![Point::new(0.0, 0.0), Point::new(0.0, 0.0)]
}

/// Child to parent elbow: straight up from the child to the turn row, across,
/// then up into the parent.
pub(super) fn elbow_points(source: Point, target: Point, elbow_ratio: f64) -> Vec<Point> {
    let mid_y = target.y + (source.y - target.y) * elbow_ratio;
    vec![target, Point::new(target.x, mid_y), source]
}

/// Row on which the connector of the `ordinal`-th marriage runs.
///
/// Each further marriage of the same person runs a fixed step higher so
/// the connectors of a remarriage never share a row.
pub fn union_row_y(source_y: f64, target_y: f64, ordinal: usize, node_height: f64, stack_ratio: f64) -> f64 {
    target_y + (source_y - target_y) * 0.5 - stack_ratio * node_height * ordinal as f64
}

pub(super) struct UnionGeometry {
    pub node_width: f64,
    pub node_height: f64,
    pub offset_ratio: f64,
    pub stack_ratio: f64,
}

/// Spouse to spouse connector that passes through the marriage union.
pub(super) fn union_points(
    source: Point,
    target: Point,
    union: Point,
    ordinal: usize,
    geometry: &UnionGeometry,
) -> Vec<Point> {
    let row_y = union_row_y(source.y, target.y, ordinal, geometry.node_height, geometry.stack_ratio);
    let side_x = source.x + geometry.offset_ratio * geometry.node_width;
    vec![
        source,
        Point::new(side_x, source.y),
        Point::new(side_x, row_y),
        Point::new(union.x, row_y),
        Point::new(union.x, union.y),
        target,
    ]
}

/// Expands control points into the orthogonal polyline a step-after curve
/// draws through them. Zero-length hops are dropped.
pub fn step_after(points: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len() * 2);
    let mut push = |point: Point| {
        if out.last() != Some(&point) {
            out.push(point);
        }
    };
    let mut iter = points.iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };
    push(*first);
    let mut prev = *first;
    for point in iter {
        push(Point::new(point.x, prev.y));
        push(*point);
        prev = *point;
    }
    out
}

/// SVG path data for the step-after curve through `points`.
pub fn to_svg_path(points: &[Point]) -> String {
    let expanded = step_after(points);
    let mut iter = expanded.iter();
    let Some(first) = iter.next() else {
        return String::new();
    };
    let mut d = format!("M {:.2} {:.2}", first.x, first.y);
    for point in iter {
        d.push_str(&format!(" L {:.2} {:.2}", point.x, point.y));
    }
    d
}
