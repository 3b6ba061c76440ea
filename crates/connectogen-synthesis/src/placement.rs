// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Spatial placement of populations into 3D regions.

Locations are sampled uniformly inside the region. With overlap avoidance each
candidate must clear every soma placed so far (in this call and in every
earlier registered placement), and sampling retries up to a bounded number of
attempts per cell before giving up with `PlacementInfeasible`.

Regions use micrometer coordinates. Cylinders stand on their base: the disk
lies in the x-z plane and the axis runs along +y, optionally restricted to a
regular polygon inscribed in the cross-section circle.
*/

use crate::context::BuildContext;
use crate::rng::NetRng;
use crate::types::{BuildError, BuildResult};
use connectogen_structures::{Point3d, Population};
use std::f64::consts::PI;
use tracing::info;

/// Per-cell retry bound used by `OverlapPolicy::avoid`.
pub const DEFAULT_MAX_PLACEMENT_ATTEMPTS: usize = 10_000;

/// How placement treats overlap between somata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapPolicy {
    /// Accept every draw
    Ignore,
    /// Reject draws that overlap any placed soma; give up after
    /// `max_attempts` tries per cell
    Avoid { max_attempts: usize },
}

impl OverlapPolicy {
    /// Overlap avoidance with the default retry bound
    pub fn avoid() -> Self {
        OverlapPolicy::Avoid {
            max_attempts: DEFAULT_MAX_PLACEMENT_ATTEMPTS,
        }
    }
}

/// Axis-aligned rectangular region.
#[derive(Debug, Clone, Copy)]
pub struct RectangularRegion {
    pub origin: Point3d,
    pub x_extent: f64,
    pub y_extent: f64,
    pub z_extent: f64,
}

impl RectangularRegion {
    /// # Errors
    ///
    /// Returns error if any extent is negative
    pub fn new(origin: Point3d, x_extent: f64, y_extent: f64, z_extent: f64) -> BuildResult<Self> {
        if x_extent < 0.0 || y_extent < 0.0 || z_extent < 0.0 {
            return Err(BuildError::BadParameters(format!(
                "region extents cannot be negative: ({}, {}, {})",
                x_extent, y_extent, z_extent
            )));
        }
        Ok(Self { origin, x_extent, y_extent, z_extent })
    }

    /// True when the point lies inside the region
    pub fn contains(&self, point: &Point3d) -> bool {
        point.x >= self.origin.x
            && point.x <= self.origin.x + self.x_extent
            && point.y >= self.origin.y
            && point.y <= self.origin.y + self.y_extent
            && point.z >= self.origin.z
            && point.z <= self.origin.z + self.z_extent
    }

    fn sample(&self, rng: &mut NetRng) -> Point3d {
        Point3d::new(
            rng.uniform_range(self.origin.x, self.origin.x + self.x_extent),
            rng.uniform_range(self.origin.y, self.origin.y + self.y_extent),
            rng.uniform_range(self.origin.z, self.origin.z + self.z_extent),
        )
    }
}

/// Regular polygon inscribed in a circle, as intersected half-planes in the
/// x-z plane.
#[derive(Debug, Clone)]
struct InscribedPolygon {
    apothem: f64,
    normals: Vec<(f64, f64)>,
}

impl InscribedPolygon {
    fn new(sides: u32, radius: f64) -> Self {
        let apothem = radius * (PI / sides as f64).cos();
        let normals = (0..sides)
            .map(|k| {
                let angle = PI * (2.0 * k as f64 + 1.0) / sides as f64;
                (angle.cos(), angle.sin())
            })
            .collect();
        Self { apothem, normals }
    }

    fn contains(&self, dx: f64, dz: f64) -> bool {
        self.normals
            .iter()
            .all(|&(nx, nz)| dx * nx + dz * nz <= self.apothem)
    }
}

/// Vertical cylinder standing on its base center, optionally restricted to an
/// inscribed regular polygon cross-section.
#[derive(Debug, Clone)]
pub struct CylindricalRegion {
    pub base_center: Point3d,
    pub radius: f64,
    pub height: f64,
    polygon: Option<InscribedPolygon>,
}

impl CylindricalRegion {
    /// Full circular cross-section
    ///
    /// # Errors
    ///
    /// Returns error if the radius is not positive or the height is negative
    pub fn new(base_center: Point3d, radius: f64, height: f64) -> BuildResult<Self> {
        if radius <= 0.0 {
            return Err(BuildError::BadParameters(format!(
                "cylinder radius must be positive, got {}",
                radius
            )));
        }
        if height < 0.0 {
            return Err(BuildError::BadParameters(format!(
                "cylinder height cannot be negative, got {}",
                height
            )));
        }
        Ok(Self { base_center, radius, height, polygon: None })
    }

    /// Cross-section restricted to a regular polygon with `sides` vertices
    /// inscribed in the circle of `radius`
    ///
    /// # Errors
    ///
    /// Returns error on invalid radius/height or fewer than 3 sides
    pub fn polygonal(
        base_center: Point3d,
        radius: f64,
        height: f64,
        sides: u32,
    ) -> BuildResult<Self> {
        if sides < 3 {
            return Err(BuildError::BadParameters(format!(
                "inscribed polygon needs at least 3 sides, got {}",
                sides
            )));
        }
        let mut region = Self::new(base_center, radius, height)?;
        region.polygon = Some(InscribedPolygon::new(sides, radius));
        Ok(region)
    }

    /// True when the point lies inside the region
    pub fn contains(&self, point: &Point3d) -> bool {
        let dx = point.x - self.base_center.x;
        let dz = point.z - self.base_center.z;
        if point.y < self.base_center.y || point.y > self.base_center.y + self.height {
            return false;
        }
        if dx * dx + dz * dz > self.radius * self.radius {
            return false;
        }
        match &self.polygon {
            Some(polygon) => polygon.contains(dx, dz),
            None => true,
        }
    }

    /// Rejection-sample from the bounding square; None when the draw fell
    /// outside the disk (or polygon).
    fn sample(&self, rng: &mut NetRng) -> Option<Point3d> {
        let dx = rng.uniform_range(-self.radius, self.radius);
        let dz = rng.uniform_range(-self.radius, self.radius);
        if dx * dx + dz * dz > self.radius * self.radius {
            return None;
        }
        if let Some(polygon) = &self.polygon {
            if !polygon.contains(dx, dz) {
                return None;
            }
        }
        let y = rng.uniform_range(self.base_center.y, self.base_center.y + self.height);
        Some(Point3d::new(self.base_center.x + dx, y, self.base_center.z + dz))
    }
}

/// Place every instance of a population uniformly inside a rectangular
/// region, writing instance locations in index order and registering each
/// soma in the context for later overlap checks.
///
/// # Errors
///
/// `PlacementInfeasible` when overlap avoidance exhausts its per-cell retry
/// bound; `BadParameters` on a negative soma diameter.
pub fn place_rectangular(
    ctx: &mut BuildContext,
    population: &mut Population,
    region: &RectangularRegion,
    soma_diameter: f64,
    policy: OverlapPolicy,
) -> BuildResult<()> {
    place_into(ctx, population, |rng| Some(region.sample(rng)), soma_diameter, policy)
}

/// Place every instance of a population uniformly inside a cylindrical
/// region. Same semantics as [`place_rectangular`]; draws landing outside the
/// disk (or inscribed polygon) count toward the per-cell retry bound.
pub fn place_cylindrical(
    ctx: &mut BuildContext,
    population: &mut Population,
    region: &CylindricalRegion,
    soma_diameter: f64,
    policy: OverlapPolicy,
) -> BuildResult<()> {
    place_into(ctx, population, |rng| region.sample(rng), soma_diameter, policy)
}

fn place_into(
    ctx: &mut BuildContext,
    population: &mut Population,
    sample: impl Fn(&mut NetRng) -> Option<Point3d>,
    soma_diameter: f64,
    policy: OverlapPolicy,
) -> BuildResult<()> {
    if soma_diameter < 0.0 {
        return Err(BuildError::BadParameters(format!(
            "soma diameter cannot be negative, got {}",
            soma_diameter
        )));
    }
    let attempt_bound = match policy {
        OverlapPolicy::Ignore => DEFAULT_MAX_PLACEMENT_ATTEMPTS,
        OverlapPolicy::Avoid { max_attempts } => {
            if max_attempts == 0 {
                return Err(BuildError::BadParameters(
                    "overlap avoidance needs at least one attempt per cell".to_string(),
                ));
            }
            max_attempts
        }
    };
    let avoid_overlap = matches!(policy, OverlapPolicy::Avoid { .. });
    let radius = soma_diameter / 2.0;
    let size = population.size();
    let mut placed_here: Vec<Point3d> = Vec::with_capacity(size);

    for index in 0..size {
        let mut attempts = 0usize;
        let location = loop {
            if attempts >= attempt_bound {
                return Err(BuildError::PlacementInfeasible {
                    population: population.id.clone(),
                    placed: index,
                    requested: size,
                    attempts: attempt_bound,
                });
            }
            attempts += 1;
            let Some(candidate) = sample(&mut ctx.rng) else {
                continue;
            };
            if avoid_overlap && collides(&candidate, radius, &placed_here, ctx) {
                continue;
            }
            break candidate;
        };
        population.place_instance(index, location)?;
        placed_here.push(location);
    }

    for (index, center) in placed_here.iter().enumerate() {
        ctx.register_placement(&population.id, index as u64, *center, radius);
    }
    info!(
        target: "connectogen-synthesis",
        "Placed {} cells of population '{}' ({} somata now registered)",
        size,
        population.id,
        ctx.placements().len()
    );
    Ok(())
}

fn collides(
    candidate: &Point3d,
    radius: f64,
    placed_here: &[Point3d],
    ctx: &BuildContext,
) -> bool {
    if placed_here
        .iter()
        .any(|center| center.distance_to(candidate) < radius + radius)
    {
        return true;
    }
    ctx.placements()
        .iter()
        .any(|cell| cell.center.distance_to(candidate) < cell.radius + radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn population(id: &str, size: usize) -> Population {
        Population::new(id.to_string(), "cell".to_string(), size).unwrap()
    }

    #[test]
    fn test_rectangular_placement_stays_inside() {
        let mut ctx = BuildContext::seeded(3);
        let mut pop = population("rect", 200);
        let region =
            RectangularRegion::new(Point3d::new(10.0, -5.0, 0.0), 100.0, 50.0, 20.0).unwrap();
        place_rectangular(&mut ctx, &mut pop, &region, 0.0, OverlapPolicy::Ignore).unwrap();
        assert!(pop.is_fully_placed());
        for instance in &pop.instances {
            let location = instance.location.as_ref().unwrap();
            assert!(region.contains(location), "Cell placed outside the region");
        }
        assert_eq!(ctx.placements().len(), 200);
    }

    #[test]
    fn test_flat_region_collapses_one_axis() {
        let mut ctx = BuildContext::seeded(3);
        let mut pop = population("sheet", 50);
        let region = RectangularRegion::new(Point3d::new(0.0, 7.0, 0.0), 100.0, 0.0, 100.0).unwrap();
        place_rectangular(&mut ctx, &mut pop, &region, 0.0, OverlapPolicy::Ignore).unwrap();
        assert!(pop.instances.iter().all(|i| i.location.unwrap().y == 7.0));
    }

    #[test]
    fn test_cylindrical_placement_stays_inside() {
        let mut ctx = BuildContext::seeded(3);
        let mut pop = population("cyl", 200);
        let region = CylindricalRegion::new(Point3d::new(0.0, 0.0, 0.0), 50.0, 30.0).unwrap();
        place_cylindrical(&mut ctx, &mut pop, &region, 0.0, OverlapPolicy::Ignore).unwrap();
        for instance in &pop.instances {
            let location = instance.location.as_ref().unwrap();
            assert!(region.contains(location), "Cell placed outside the cylinder");
        }
    }

    #[test]
    fn test_polygonal_cross_section() {
        let region =
            CylindricalRegion::polygonal(Point3d::new(0.0, 0.0, 0.0), 50.0, 10.0, 6).unwrap();
        // Hexagon apothem is radius*cos(30deg) ~ 43.3; a point at 45 along a
        // face normal is inside the circle but outside the hexagon.
        let apothem = 50.0 * (PI / 6.0).cos();
        let angle = PI / 6.0;
        let outside = Point3d::new(45.0 * angle.cos(), 5.0, 45.0 * angle.sin());
        assert!(45.0 > apothem);
        assert!(!region.contains(&outside));
        assert!(region.contains(&Point3d::new(0.0, 5.0, 0.0)));

        let mut ctx = BuildContext::seeded(9);
        let mut pop = population("hex", 300);
        place_cylindrical(&mut ctx, &mut pop, &region, 0.0, OverlapPolicy::Ignore).unwrap();
        for instance in &pop.instances {
            assert!(region.contains(instance.location.as_ref().unwrap()));
        }
        assert!(CylindricalRegion::polygonal(Point3d::new(0.0, 0.0, 0.0), 50.0, 10.0, 2).is_err());
    }

    #[test]
    fn test_overlap_avoidance_respects_diameter() {
        let mut ctx = BuildContext::seeded(3);
        let mut pop = population("spaced", 20);
        let region = RectangularRegion::new(Point3d::new(0.0, 0.0, 0.0), 200.0, 200.0, 200.0).unwrap();
        place_rectangular(&mut ctx, &mut pop, &region, 10.0, OverlapPolicy::avoid()).unwrap();
        for a in 0..pop.size() {
            for b in (a + 1)..pop.size() {
                let d = pop
                    .location_of(a)
                    .unwrap()
                    .distance_to(&pop.location_of(b).unwrap());
                assert!(d >= 10.0, "Somata {} and {} overlap: {}", a, b, d);
            }
        }
    }

    #[test]
    fn test_overlap_avoidance_across_populations() {
        let mut ctx = BuildContext::seeded(3);
        let region = RectangularRegion::new(Point3d::new(0.0, 0.0, 0.0), 60.0, 60.0, 60.0).unwrap();
        let mut first = population("first", 10);
        place_rectangular(&mut ctx, &mut first, &region, 12.0, OverlapPolicy::avoid()).unwrap();
        let mut second = population("second", 10);
        place_rectangular(&mut ctx, &mut second, &region, 12.0, OverlapPolicy::avoid()).unwrap();
        for a in &first.instances {
            for b in &second.instances {
                let d = a.location.unwrap().distance_to(&b.location.unwrap());
                assert!(d >= 12.0, "Cross-population overlap: {}", d);
            }
        }
    }

    #[test]
    fn test_infeasible_packing_errors_out() {
        let mut ctx = BuildContext::seeded(3);
        let mut pop = population("dense", 100);
        // 100 somata of diameter 20 cannot fit a 30um box.
        let region = RectangularRegion::new(Point3d::new(0.0, 0.0, 0.0), 30.0, 30.0, 30.0).unwrap();
        let result = place_rectangular(
            &mut ctx,
            &mut pop,
            &region,
            20.0,
            OverlapPolicy::Avoid { max_attempts: 200 },
        );
        match result {
            Err(BuildError::PlacementInfeasible { population, attempts, requested, .. }) => {
                assert_eq!(population, "dense");
                assert_eq!(attempts, 200);
                assert_eq!(requested, 100);
            }
            other => panic!("Expected PlacementInfeasible, got {:?}", other),
        }
    }

    #[test]
    fn test_placement_is_deterministic_under_seed() {
        let run = || {
            let mut ctx = BuildContext::seeded(77);
            let mut pop = population("det", 30);
            let region =
                RectangularRegion::new(Point3d::new(0.0, 0.0, 0.0), 100.0, 100.0, 100.0).unwrap();
            place_rectangular(&mut ctx, &mut pop, &region, 5.0, OverlapPolicy::avoid()).unwrap();
            pop.instances
                .iter()
                .map(|i| i.location.unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
