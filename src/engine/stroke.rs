use super::{NodeId, NodeRef, PointChain};
use crate::geom::Point;

/// A completed stroke. Its history can be read but no longer grows.
#[derive(Debug, Clone, Default)]
pub struct Stroke {
	chain: PointChain,
}

impl Stroke {
	pub fn empty() -> Self {
		Self::default()
	}

	pub fn chain(&self) -> &PointChain {
		&self.chain
	}

	pub fn len(&self) -> usize {
		self.chain.len()
	}

	pub fn is_empty(&self) -> bool {
		self.chain.is_empty()
	}

	pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
		self.chain.points()
	}

	pub fn last(&self) -> Option<NodeRef<'_>> {
		self.chain.last()
	}
}

/// The stroke currently being drawn, grown by one node per sample.
#[derive(Debug, Default)]
pub struct ActiveStroke {
	chain: PointChain,
}

impl ActiveStroke {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_point(&mut self, point: Point) -> NodeId {
		self.chain.attach(point)
	}

	pub fn chain(&self) -> &PointChain {
		&self.chain
	}

	pub fn last(&self) -> Option<NodeRef<'_>> {
		self.chain.last()
	}

	pub fn finish(self) -> Stroke {
		Stroke { chain: self.chain }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_active_stroke_finishes_with_history() {
		let mut active = ActiveStroke::new();
		assert!(active.last().is_none());
		let first = active.add_point(Point::new(0.0, 0.0, 0.0));
		let second = active.add_point(Point::new(1.0, 1.0, 1.0));
		assert_eq!(active.last().map(|n| n.id()), Some(second));
		assert_eq!(
			active.chain().get(second).and_then(|n| n.previous()).map(|n| n.id()),
			Some(first)
		);

		let stroke = active.finish();
		assert_eq!(stroke.len(), 2);
		assert!(!stroke.is_empty());
		assert_eq!(
			stroke.points().collect::<Vec<_>>(),
			vec![Point::new(0.0, 0.0, 0.0), Point::new(1.0, 1.0, 1.0)]
		);
	}

	#[test]
	fn test_empty_stroke() {
		let stroke = Stroke::empty();
		assert!(stroke.is_empty());
		assert!(stroke.last().is_none());
		assert_eq!(stroke.points().count(), 0);
	}
}
