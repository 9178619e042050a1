use glam::DVec2;
use std::f64::consts::PI;

/// A single input sample in surface-local coordinates, with a monotonic timestamp in
/// milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, derive_more::Display)]
#[display("({x}, {y}) @ {t}")]
pub struct Point {
	pub x: f64,
	pub y: f64,
	pub t: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64, t: f64) -> Self {
		Self { x, y, t }
	}

	pub fn position(&self) -> DVec2 {
		DVec2::new(self.x, self.y)
	}

	/// Re-expresses a client-space sample relative to `origin`, typically the top-left
	/// corner of the drawing surface.
	pub fn relative_to(self, origin: DVec2) -> Self {
		Self {
			x: self.x - origin.x,
			y: self.y - origin.y,
			t: self.t,
		}
	}
}

pub fn distance(a: &Point, b: &Point) -> f64 {
	(a.position() - b.position()).length()
}

/// Direction from `b` toward `a`, in `(-π, π]`.
pub fn angle(a: &Point, b: &Point) -> f64 {
	let d = a.position() - b.position();
	let theta = d.y.atan2(d.x);
	if theta == -PI {
		PI
	} else {
		theta
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AABox {
	min: DVec2,
	max: DVec2,
}

impl AABox {
	pub fn new(min: DVec2, max: DVec2) -> Self {
		Self { min, max }
	}

	pub fn empty() -> Self {
		Self::new(DVec2::MAX, DVec2::MIN)
	}

	pub fn is_empty(&self) -> bool {
		self.min.x > self.max.x && self.min.y > self.max.y
	}

	pub fn min(&self) -> DVec2 {
		self.min
	}

	pub fn max(&self) -> DVec2 {
		self.max
	}

	pub fn expanded_to_contain(self, point: DVec2) -> Self {
		Self::new(self.min.min(point), self.max.max(point))
	}

	pub fn containing(points: impl IntoIterator<Item = DVec2>) -> Self {
		points
			.into_iter()
			.fold(Self::empty(), |b, p| b.expanded_to_contain(p))
	}

	/// Inclusive on every edge, so degenerate boxes still contain their own corners.
	pub fn contains(&self, point: DVec2) -> bool {
		!(point.x < self.min.x)
			&& !(point.y < self.min.y)
			&& !(point.x > self.max.x)
			&& !(point.y > self.max.y)
	}

	pub fn union(self, other: Self) -> Self {
		Self::new(self.min.min(other.min), self.max.max(other.max))
	}

	/// An empty `other` is contained in every box.
	pub fn contains_box(&self, other: &Self) -> bool {
		other.is_empty() || other.corners().into_iter().all(|c| self.contains(c))
	}

	pub fn corners(&self) -> [DVec2; 4] {
		[
			self.min,
			DVec2::new(self.min.x, self.max.y),
			self.max,
			DVec2::new(self.max.x, self.min.y),
		]
	}
}
