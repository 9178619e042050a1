use super::{css_color, LineStyle, Surface};
use csscolorparser::Color;
use glam::DVec2;
use itertools::Itertools;
use std::fmt::Write;

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
	Clear,
	FillCircle {
		center: DVec2,
		radius: f64,
		color: Color,
	},
	StrokeLine {
		from: DVec2,
		to: DVec2,
		style: LineStyle,
	},
	FillPolygon {
		points: Vec<DVec2>,
		color: Color,
	},
}

/// A [`Surface`] that keeps every drawing call instead of rasterizing it.
#[derive(Clone, Debug)]
pub struct RecordingSurface {
	size: DVec2,
	commands: Vec<DrawCommand>,
	last_clear: usize,
}

impl RecordingSurface {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			size: DVec2::new(width, height),
			commands: Vec::new(),
			last_clear: 0,
		}
	}

	/// Every command issued so far, including clears.
	pub fn commands(&self) -> &[DrawCommand] {
		&self.commands
	}

	/// Commands issued since the most recent clear, i.e. what is currently on the surface.
	pub fn visible(&self) -> &[DrawCommand] {
		&self.commands[self.last_clear..]
	}

	pub fn to_svg(&self) -> String {
		let mut svg = String::new();
		let DVec2 { x: width, y: height } = self.size;
		// Writing to a `String` cannot fail.
		let _ = writeln!(
			svg,
			r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
		);
		for command in self.visible() {
			let _ = match command {
				DrawCommand::Clear => Ok(()),
				DrawCommand::FillCircle {
					center,
					radius,
					color,
				} => writeln!(
					svg,
					r#"  <circle cx="{}" cy="{}" r="{radius}" fill="{}"/>"#,
					center.x,
					center.y,
					css_color(color)
				),
				DrawCommand::StrokeLine { from, to, style } => writeln!(
					svg,
					r#"  <line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}" stroke-linecap="{}" stroke-linejoin="{}"/>"#,
					from.x,
					from.y,
					to.x,
					to.y,
					css_color(&style.color),
					style.width,
					style.cap,
					style.join
				),
				DrawCommand::FillPolygon { points, color } => writeln!(
					svg,
					r#"  <polygon points="{}" fill="{}"/>"#,
					points.iter().map(|p| format!("{},{}", p.x, p.y)).join(" "),
					css_color(color)
				),
			};
		}
		svg.push_str("</svg>\n");
		svg
	}
}

impl Surface for RecordingSurface {
	fn size(&self) -> DVec2 {
		self.size
	}

	fn clear(&mut self) {
		self.commands.push(DrawCommand::Clear);
		self.last_clear = self.commands.len();
	}

	fn fill_circle(&mut self, center: DVec2, radius: f64, color: &Color) {
		self.commands.push(DrawCommand::FillCircle {
			center,
			radius,
			color: color.clone(),
		});
	}

	fn stroke_line(&mut self, from: DVec2, to: DVec2, style: &LineStyle) {
		self.commands.push(DrawCommand::StrokeLine {
			from,
			to,
			style: style.clone(),
		});
	}

	fn fill_polygon(&mut self, points: &[DVec2], color: &Color) {
		self.commands.push(DrawCommand::FillPolygon {
			points: points.to_vec(),
			color: color.clone(),
		});
	}
}
