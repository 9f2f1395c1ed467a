/// Formation patterns.
///
/// A formation expands into an ordered, finite list of spawn points.  Each
/// point carries the pause that follows it, so start offsets are cumulative
/// and never decrease.  Only the double row is random (its left edge).

use rand::Rng;

use crate::config::FormationConfig;
use crate::entities::FieldBounds;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Formation {
    /// Sixteen enemies tracing a W across most of the field.
    W,
    /// Two rows of five at a random horizontal offset.
    DoubleRow,
    /// A seven-enemy triangle closed by a forced special enemy.
    Triangle,
}

pub const ALL_FORMATIONS: [Formation; 3] = [Formation::W, Formation::DoubleRow, Formation::Triangle];

#[derive(Clone, Debug, PartialEq)]
pub struct SpawnPoint {
    pub x: f32,
    pub y: f32,
    /// Seconds to wait after this spawn before the next one.
    pub delay_after: f32,
    pub force_special: bool,
}

impl SpawnPoint {
    fn at(x: f32, y: f32, delay_after: f32) -> SpawnPoint {
        SpawnPoint { x, y, delay_after, force_special: false }
    }
}

impl Formation {
    /// Uniform choice among the three formations.
    pub fn pick(rng: &mut impl Rng) -> Formation {
        ALL_FORMATIONS[rng.gen_range(0..ALL_FORMATIONS.len())]
    }

    pub fn expand(
        self,
        bounds: &FieldBounds,
        spawn_gap: f32,
        geometry: &FormationConfig,
        rng: &mut impl Rng,
    ) -> Vec<SpawnPoint> {
        match self {
            Formation::W => w_shape(bounds, spawn_gap, geometry),
            Formation::DoubleRow => double_row(bounds, spawn_gap, geometry, rng),
            Formation::Triangle => triangle(bounds, spawn_gap, geometry),
        }
    }
}

/// Start time of every point relative to the first spawn.
pub fn start_offsets(points: &[SpawnPoint]) -> Vec<f32> {
    let mut at = 0.0;
    points
        .iter()
        .map(|p| {
            let start = at;
            at += p.delay_after;
            start
        })
        .collect()
}

// ── Patterns ──────────────────────────────────────────────────────────────────

fn lerp(a: (f32, f32), b: (f32, f32), t: f32) -> (f32, f32) {
    (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t)
}

fn w_shape(bounds: &FieldBounds, spawn_gap: f32, geometry: &FormationConfig) -> Vec<SpawnPoint> {
    let width = bounds.width() * geometry.w_width_fraction;
    let low = bounds.spawn_y + geometry.w_height;
    let high = bounds.spawn_y;
    let cx = bounds.center_x();

    let anchors = [
        (cx - width / 2.0, low),
        (cx - width / 4.0, high),
        (cx, low),
        (cx + width / 4.0, high),
        (cx + width / 2.0, low),
    ];
    // The W is busier than the other patterns, so it spawns a little slower.
    let delay = spawn_gap * 1.2;

    anchors
        .windows(2)
        .flat_map(|leg| {
            let (from, to) = (leg[0], leg[1]);
            (0..4).map(move |i| {
                let (x, y) = lerp(from, to, i as f32 / 3.0);
                SpawnPoint::at(x, y, delay)
            })
        })
        .collect()
}

fn double_row(
    bounds: &FieldBounds,
    spawn_gap: f32,
    geometry: &FormationConfig,
    rng: &mut impl Rng,
) -> Vec<SpawnPoint> {
    let spacing = geometry.column_spacing;
    let lo = bounds.min_x + 2.0;
    let hi = bounds.max_x - spacing * 5.0;
    let start_x = if hi > lo { rng.gen_range(lo..hi) } else { lo };

    let mut points = Vec::with_capacity(10);
    for row in 0..2 {
        let y = bounds.spawn_y + row as f32 * geometry.row_spacing;
        for i in 0..5 {
            points.push(SpawnPoint::at(start_x + i as f32 * spacing, y, spawn_gap));
        }
    }
    points[4].delay_after += geometry.row_pause;
    points
}

fn triangle(bounds: &FieldBounds, spawn_gap: f32, geometry: &FormationConfig) -> Vec<SpawnPoint> {
    let cx = bounds.center_x();
    let dx = geometry.triangle_spacing;
    let row = |n: f32| bounds.spawn_y + n * geometry.row_spacing;
    let d = spawn_gap;

    vec![
        SpawnPoint::at(cx, row(0.0), d * 2.0),
        SpawnPoint::at(cx - dx, row(1.0), d),
        SpawnPoint::at(cx + dx, row(1.0), d * 2.0),
        SpawnPoint::at(cx - dx * 2.0, row(2.0), d),
        SpawnPoint::at(cx + dx * 2.0, row(2.0), d * 2.0),
        SpawnPoint::at(cx - dx * 3.0, row(3.0), d),
        SpawnPoint::at(cx + dx * 3.0, row(3.0), d),
        SpawnPoint {
            x: cx,
            y: row(3.0),
            delay_after: 0.0,
            force_special: true,
        },
    ]
}
