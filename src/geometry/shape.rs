use std::iter;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use itertools::{Itertools, izip};
use log::debug;
use nalgebra::Point2;
use thiserror::Error;

use super::basis::{centered_axial, sim_point_to_view, sim_to_view};
use crate::parameters::ParameterMap;

/// Relative slack allowed when checking that bodies fit inside the rocket.
const LENGTH_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum InvalidGeometry {
    #[error("{quantity} is not a finite number")]
    NotFinite { quantity: String },

    #[error("Total length must be positive (got {0} m)")]
    TotalLength(f64),

    #[error("Dry mass must be non-negative (got {0} kg)")]
    DryMass(f64),

    #[error("Nose length must be positive (got {0} m)")]
    NoseLength(f64),

    #[error("Nose needs at least 2 radius samples (got {0})")]
    NoseSamples(usize),

    #[error("Negative radius in {part} ({value} m)")]
    NegativeRadius { part: String, value: f64 },

    #[error("Body {index} has negative length ({value} m)")]
    BodyLength { index: usize, value: f64 },

    #[error("Body {index} starts before the nose tip ({value} m)")]
    BodyStart { index: usize, value: f64 },

    #[error("Body {index} ends at {end} m, past the rocket length of {length} m")]
    BodyOverrun { index: usize, end: f64, length: f64 },

    #[error("Rocket has no body tube")]
    NoBody,

    #[error("Fin set {fin} on body {body} has a fin count of {count}")]
    FinCount { body: usize, fin: usize, count: i64 },

    #[error("Body {index} starts at {start} m, ahead of the previous body at {previous} m")]
    BodyOrder { index: usize, start: f64, previous: f64 },
}

/// Rocket geometry as supplied by the flight simulation, in meters and in the
/// simulation frame (`(axial, radial)`, axial origin at the nose tip).
#[derive(Debug, Clone, PartialEq)]
pub struct RocketSpec {
    pub length_m: f64,
    pub dry_mass_kg: f64,
    pub nose: NoseSpec,
    /// Front-to-back, by `start_m`.
    pub bodies: Vec<BodySpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoseSpec {
    pub length_m: f64,
    /// Radius at equal axial subdivisions of the nose, tip first.
    pub radii_m: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BodySpec {
    pub start_m: f64,
    pub length_m: f64,
    pub radius_m: f64,
    pub fins: Vec<FinSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FinSpec {
    /// Root of the fin set, measured from the nose tip.
    pub root_m: Point2<f64>,
    /// Fin outline relative to the root.
    pub outline_m: Vec<Point2<f64>>,
    /// Must be at least 1. Kept signed so a bad value is reported as given.
    pub count: i64,
}

impl RocketSpec {
    /// Reads the `rocket` section of a rocket description.
    pub fn from_params(params: &ParameterMap) -> Result<Self> {
        let nose = params.get_map("nose")?;
        let nose = NoseSpec {
            length_m: nose.get_f64("length")?,
            radii_m: nose.get_param("radii")?.value_float_arr()?.to_vec(),
        };

        let mut bodies = params
            .get_map("bodies")?
            .maps()
            .map(|(_, body)| BodySpec::from_params(body))
            .collect::<Result<Vec<_>>>()?;
        bodies.sort_by(|a, b| a.start_m.total_cmp(&b.start_m));

        Ok(RocketSpec {
            length_m: params.get_f64("length")?,
            dry_mass_kg: params.get_f64("dry_mass")?,
            nose,
            bodies,
        })
    }
}

impl BodySpec {
    fn from_params(params: &ParameterMap) -> Result<Self> {
        let fins = if params.has("fins") {
            params
                .get_map("fins")?
                .maps()
                .map(|(_, fin)| FinSpec::from_params(fin))
                .collect::<Result<Vec<_>>>()?
        } else {
            vec![]
        };

        Ok(BodySpec {
            start_m: params.get_f64("start")?,
            length_m: params.get_f64("length")?,
            radius_m: params.get_f64("radius")?,
            fins,
        })
    }
}

impl FinSpec {
    fn from_params(params: &ParameterMap) -> Result<Self> {
        let outline_m = if params.has("outline") {
            params.get_param("outline")?.value_point_arr()?
        } else {
            vec![]
        };

        Ok(FinSpec {
            root_m: params.get_param("root")?.value_point()?,
            outline_m,
            count: params.get_param("count")?.value_int()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeId(u64);

impl ShapeId {
    fn next() -> ShapeId {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        ShapeId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Validated, immutable geometry in the view frame at unit (meter) scale.
///
/// Built once per loaded rocket and shared read-only by every frame.
#[derive(Debug, Clone)]
pub struct ShapeModel {
    id: ShapeId,
    length_m: f64,
    dry_mass_kg: f64,
    nose: NoseShape,
    bodies: Vec<BodyShape>,
}

#[derive(Debug, Clone)]
pub struct NoseShape {
    polygon: Vec<Point2<f64>>,
}

#[derive(Debug, Clone)]
pub struct BodyShape {
    corners: [Point2<f64>; 4],
    radius_m: f64,
    fins: Vec<FinShape>,
}

#[derive(Debug, Clone)]
pub struct FinShape {
    outline: Vec<Point2<f64>>,
    count: usize,
}

impl ShapeModel {
    pub fn new(spec: &RocketSpec) -> Result<ShapeModel, InvalidGeometry> {
        validate(spec)?;

        let nose = NoseShape::new(&spec.nose, spec.length_m);
        let bodies: Vec<BodyShape> = spec
            .bodies
            .iter()
            .map(|b| BodyShape::new(b, spec.length_m))
            .collect();

        let model = ShapeModel {
            id: ShapeId::next(),
            length_m: spec.length_m,
            dry_mass_kg: spec.dry_mass_kg,
            nose,
            bodies,
        };

        debug!(
            "Built shape {:?}: {} nose vertices, {} bodies, {} fin sets",
            model.id,
            model.nose.polygon.len(),
            model.bodies.len(),
            model.bodies.iter().map(|b| b.fins.len()).sum::<usize>()
        );

        Ok(model)
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn length_m(&self) -> f64 {
        self.length_m
    }

    pub fn dry_mass_kg(&self) -> f64 {
        self.dry_mass_kg
    }

    pub fn nose(&self) -> &NoseShape {
        &self.nose
    }

    pub fn bodies(&self) -> &[BodyShape] {
        &self.bodies
    }

    /// Largest body tube radius, zero if every tube is a zero-radius stub.
    pub fn max_radius_m(&self) -> f64 {
        self.bodies
            .iter()
            .map(|b| b.radius_m)
            .fold(0.0, f64::max)
    }
}

impl NoseShape {
    /// Closed outline: tip, right side front-to-back, left side back-to-front.
    /// The first radius sample is the tip and is replaced by the apex point.
    fn new(spec: &NoseSpec, total_length_m: f64) -> Self {
        let subdivisions = spec.radii_m.len() - 1;
        let axial = (1..=subdivisions).map(|k| {
            centered_axial(
                spec.length_m * k as f64 / subdivisions as f64,
                total_length_m,
            )
        });

        let side = izip!(&spec.radii_m[1..], axial)
            .map(|(&r, a)| (r, a))
            .collect_vec();

        let polygon = iter::once(Point2::new(0.0, centered_axial(0.0, total_length_m)))
            .chain(side.iter().map(|&(r, a)| Point2::new(r, a)))
            .chain(side.iter().rev().map(|&(r, a)| Point2::new(-r, a)))
            .collect();

        NoseShape { polygon }
    }

    pub fn polygon(&self) -> &[Point2<f64>] {
        &self.polygon
    }
}

impl BodyShape {
    fn new(spec: &BodySpec, total_length_m: f64) -> Self {
        let front = centered_axial(spec.start_m, total_length_m);
        let back = centered_axial(spec.start_m + spec.length_m, total_length_m);
        let r = spec.radius_m;

        BodyShape {
            corners: [
                Point2::new(r, front),
                Point2::new(r, back),
                Point2::new(-r, back),
                Point2::new(-r, front),
            ],
            radius_m: r,
            fins: spec
                .fins
                .iter()
                .map(|f| FinShape::new(f, total_length_m))
                .collect(),
        }
    }

    pub fn corners(&self) -> &[Point2<f64>; 4] {
        &self.corners
    }

    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    pub fn fins(&self) -> &[FinShape] {
        &self.fins
    }
}

impl FinShape {
    fn new(spec: &FinSpec, total_length_m: f64) -> Self {
        let offset = sim_point_to_view(&spec.root_m, total_length_m).coords;

        FinShape {
            outline: spec
                .outline_m
                .iter()
                .map(|p| Point2::from(sim_to_view(&p.coords) + offset))
                .collect(),
            // Checked positive in `validate`
            count: usize::try_from(spec.count).unwrap_or_default(),
        }
    }

    /// Outline of one fin in the view plane, root offset already applied.
    pub fn outline(&self) -> &[Point2<f64>] {
        &self.outline
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

fn check_finite(quantity: impl Fn() -> String, value: f64) -> Result<(), InvalidGeometry> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(InvalidGeometry::NotFinite {
            quantity: quantity(),
        })
    }
}

fn validate(spec: &RocketSpec) -> Result<(), InvalidGeometry> {
    check_finite(|| "Total length".to_string(), spec.length_m)?;
    check_finite(|| "Dry mass".to_string(), spec.dry_mass_kg)?;
    if spec.length_m <= 0.0 {
        return Err(InvalidGeometry::TotalLength(spec.length_m));
    }
    if spec.dry_mass_kg < 0.0 {
        return Err(InvalidGeometry::DryMass(spec.dry_mass_kg));
    }

    let nose = &spec.nose;
    check_finite(|| "Nose length".to_string(), nose.length_m)?;
    if nose.length_m <= 0.0 {
        return Err(InvalidGeometry::NoseLength(nose.length_m));
    }
    if nose.radii_m.len() < 2 {
        return Err(InvalidGeometry::NoseSamples(nose.radii_m.len()));
    }
    for (i, &r) in nose.radii_m.iter().enumerate() {
        check_finite(|| format!("Nose radius {i}"), r)?;
        if r < 0.0 {
            return Err(InvalidGeometry::NegativeRadius {
                part: "nose".to_string(),
                value: r,
            });
        }
    }

    if spec.bodies.is_empty() {
        return Err(InvalidGeometry::NoBody);
    }

    for (index, body) in spec.bodies.iter().enumerate() {
        if index > 0 && body.start_m < spec.bodies[index - 1].start_m {
            return Err(InvalidGeometry::BodyOrder {
                index,
                start: body.start_m,
                previous: spec.bodies[index - 1].start_m,
            });
        }

        check_finite(|| format!("Body {index} start"), body.start_m)?;
        check_finite(|| format!("Body {index} length"), body.length_m)?;
        check_finite(|| format!("Body {index} radius"), body.radius_m)?;

        if body.start_m < 0.0 {
            return Err(InvalidGeometry::BodyStart {
                index,
                value: body.start_m,
            });
        }
        if body.length_m < 0.0 {
            return Err(InvalidGeometry::BodyLength {
                index,
                value: body.length_m,
            });
        }
        if body.radius_m < 0.0 {
            return Err(InvalidGeometry::NegativeRadius {
                part: format!("body {index}"),
                value: body.radius_m,
            });
        }

        let end = body.start_m + body.length_m;
        if end > spec.length_m * (1.0 + LENGTH_TOLERANCE) {
            return Err(InvalidGeometry::BodyOverrun {
                index,
                end,
                length: spec.length_m,
            });
        }

        for (fin, fins) in body.fins.iter().enumerate() {
            if fins.count < 1 {
                return Err(InvalidGeometry::FinCount {
                    body: index,
                    fin,
                    count: fins.count,
                });
            }
            check_finite(|| format!("Fin set {fin} root on body {index}"), fins.root_m.x)?;
            check_finite(|| format!("Fin set {fin} root on body {index}"), fins.root_m.y)?;
            for p in &fins.outline_m {
                check_finite(|| format!("Fin set {fin} outline on body {index}"), p.x)?;
                check_finite(|| format!("Fin set {fin} outline on body {index}"), p.y)?;
            }
        }
    }

    Ok(())
}
