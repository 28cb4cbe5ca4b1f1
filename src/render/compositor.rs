//! Back-to-front ordering of the projected parts.
//!
//! There is no depth buffer. Each body tube is drawn between two passes over
//! its fins: the fins behind the tube first, the fins in front of it last.

use anyhow::{Result, anyhow};
use nalgebra::Point2;
use serde::Serialize;
use strum::{AsRefStr, Display};

use super::projector::{FinInstance, Polygon};
use super::view::ViewState;
use crate::parameters::ParameterMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, AsRefStr, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DrawPass {
    Nose,
    Body,
    FinBack,
    FinForward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const BLUE: Rgb = Rgb(0, 0, 255);

    fn from_param(path: &str, val: &[i64]) -> Result<Rgb> {
        let channel = |v: i64| {
            u8::try_from(v).map_err(|_| anyhow!("Color channel {v} out of range in '{path}'"))
        };
        match val {
            &[r, g, b] => Ok(Rgb(channel(r)?, channel(g)?, channel(b)?)),
            _ => Err(anyhow!("Color '{path}' must have 3 channels, got {}", val.len())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub nose_fill: Rgb,
    pub body_fill: Rgb,
    pub fin_fill: Rgb,
    pub stroke: Rgb,
    pub stroke_width: f64,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            nose_fill: Rgb::WHITE,
            body_fill: Rgb::WHITE,
            fin_fill: Rgb::BLUE,
            stroke: Rgb::BLACK,
            stroke_width: 1.0,
        }
    }
}

impl Palette {
    /// Reads the optional `palette` section. Colors are `int[]` RGB triplets.
    pub fn from_params(params: &ParameterMap) -> Result<Self> {
        let mut palette = Palette::default();

        for (key, slot) in [
            ("nose_fill", &mut palette.nose_fill),
            ("body_fill", &mut palette.body_fill),
            ("fin_fill", &mut palette.fin_fill),
            ("stroke", &mut palette.stroke),
        ] {
            if params.has(key) {
                let param = params.get_param(key)?;
                *slot = Rgb::from_param(param.path(), param.value_int_arr()?)?;
            }
        }

        if params.has("stroke_width") {
            palette.stroke_width = params.get_f64("stroke_width")?;
        }

        Ok(palette)
    }

    fn fill(&self, pass: DrawPass) -> Rgb {
        match pass {
            DrawPass::Nose => self.nose_fill,
            DrawPass::Body => self.body_fill,
            DrawPass::FinBack | DrawPass::FinForward => self.fin_fill,
        }
    }
}

/// One filled polygon with its outline, in pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawCommand {
    pub pass: DrawPass,
    pub vertices: Vec<Point2<f64>>,
    pub fill: Rgb,
    pub stroke: Rgb,
    pub stroke_width: f64,
}

/// Anything that can fill and outline a polygon.
pub trait Surface {
    fn draw_polygon(&mut self, command: &DrawCommand);
}

/// Keeps every command it receives, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
}

impl Surface for RecordingSurface {
    fn draw_polygon(&mut self, command: &DrawCommand) {
        self.commands.push(command.clone());
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BodyFrame {
    pub tube: Polygon,
    /// One entry per fin set, in attachment order.
    pub fins: Vec<Vec<FinInstance>>,
}

/// Every polygon of the rocket for one frame. Replaced wholesale each frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RocketFrame {
    pub view: ViewState,
    pub nose: Polygon,
    pub bodies: Vec<BodyFrame>,
}

#[derive(Debug, Clone, Default)]
pub struct LayerCompositor {
    palette: Palette,
}

impl LayerCompositor {
    pub fn new(palette: Palette) -> Self {
        LayerCompositor { palette }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Nose, then for each body: fins behind, tube, fins in front.
    pub fn compose(&self, frame: &RocketFrame) -> Vec<DrawCommand> {
        let mut commands = vec![];
        self.compose_into(frame, &mut commands);
        commands
    }

    pub fn compose_into(&self, frame: &RocketFrame, commands: &mut Vec<DrawCommand>) {
        commands.clear();

        self.push(commands, DrawPass::Nose, &frame.nose);

        for body in &frame.bodies {
            self.push_fins(commands, body, false);
            self.push(commands, DrawPass::Body, &body.tube);
            self.push_fins(commands, body, true);
        }
    }

    fn push_fins(&self, commands: &mut Vec<DrawCommand>, body: &BodyFrame, forward: bool) {
        let pass = if forward {
            DrawPass::FinForward
        } else {
            DrawPass::FinBack
        };

        body.fins
            .iter()
            .flatten()
            .filter(|fin| fin.forward == forward)
            .for_each(|fin| self.push(commands, pass, &fin.polygon));
    }

    fn push(&self, commands: &mut Vec<DrawCommand>, pass: DrawPass, polygon: &Polygon) {
        // Fewer than 3 vertices encloses nothing
        if polygon.len() < 3 {
            return;
        }

        commands.push(DrawCommand {
            pass,
            vertices: polygon.clone(),
            fill: self.palette.fill(pass),
            stroke: self.palette.stroke,
            stroke_width: self.palette.stroke_width,
        });
    }
}
