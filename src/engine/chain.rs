use crate::geom::{self, Point};
use glam::DVec2;
use std::f64::consts::FRAC_PI_2;

pub const DEFAULT_SCALE: f64 = 1.0;
pub const DEFAULT_UNIT: f64 = 3.0;

/// Exponent applied to the velocity before it is compared against the unit width.
const VELOCITY_EXPONENT: f64 = 0.6;

/// Position of a node within its chain. Ids are only meaningful for the chain that issued them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
#[display("#{_0}")]
pub struct NodeId(usize);

impl NodeId {
	pub fn index(self) -> usize {
		self.0
	}
}

#[derive(Clone, Debug)]
struct ChainNode {
	point: Point,
	previous: Option<NodeId>,
	next: Option<NodeId>,
}

/// Append-only, doubly-linked history of the samples in one stroke.
///
/// Nodes live in an arena in the order they were attached, and their links are stored as
/// [`NodeId`]s. Once a node has a predecessor, that link never changes.
#[derive(Clone, Debug, Default)]
pub struct PointChain {
	nodes: Vec<ChainNode>,
}

impl PointChain {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Links a new node holding `point` after the current newest node.
	pub fn attach(&mut self, point: Point) -> NodeId {
		let id = NodeId(self.nodes.len());
		let previous = self.nodes.len().checked_sub(1).map(NodeId);
		if let Some(previous) = previous {
			self.nodes[previous.0].next = Some(id);
		}
		self.nodes.push(ChainNode {
			point,
			previous,
			next: None,
		});
		id
	}

	pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
		(id.0 < self.nodes.len()).then_some(NodeRef { chain: self, id })
	}

	pub fn first(&self) -> Option<NodeRef<'_>> {
		self.get(NodeId(0))
	}

	pub fn last(&self) -> Option<NodeRef<'_>> {
		self.get(NodeId(self.nodes.len().checked_sub(1)?))
	}

	/// Walks the chain from the oldest node to the newest.
	pub fn iter(&self) -> impl DoubleEndedIterator<Item = NodeRef<'_>> + ExactSizeIterator + '_ {
		(0..self.nodes.len()).map(move |i| NodeRef {
			chain: self,
			id: NodeId(i),
		})
	}

	pub fn points(&self) -> impl DoubleEndedIterator<Item = Point> + ExactSizeIterator + '_ {
		self.nodes.iter().map(|n| n.point)
	}

	pub fn clear(&mut self) {
		self.nodes.clear();
	}

	fn node(&self, id: NodeId) -> &ChainNode {
		&self.nodes[id.0]
	}
}

/// Two points offset perpendicular to the direction of motion, forming the edges of a
/// stroke ribbon at one sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VelocityCross {
	/// Offset at `angle - π/2`.
	pub left: DVec2,
	/// Offset at `angle + π/2`.
	pub right: DVec2,
}

impl VelocityCross {
	pub fn midpoint(&self) -> DVec2 {
		(self.left + self.right) * 0.5
	}

	pub fn width(&self) -> f64 {
		self.left.distance(self.right)
	}
}

/// A borrowed view of one node together with the chain it belongs to.
#[derive(Clone, Copy, Debug)]
pub struct NodeRef<'a> {
	chain: &'a PointChain,
	id: NodeId,
}

impl<'a> NodeRef<'a> {
	pub fn id(&self) -> NodeId {
		self.id
	}

	pub fn chain(&self) -> &'a PointChain {
		self.chain
	}

	pub fn point(&self) -> Point {
		self.chain.node(self.id).point
	}

	pub fn previous(&self) -> Option<NodeRef<'a>> {
		let id = self.chain.node(self.id).previous?;
		Some(NodeRef {
			chain: self.chain,
			id,
		})
	}

	pub fn next(&self) -> Option<NodeRef<'a>> {
		let id = self.chain.node(self.id).next?;
		Some(NodeRef {
			chain: self.chain,
			id,
		})
	}

	/// Distance per millisecond from the predecessor.
	///
	/// Samples whose timestamp does not advance past their predecessor's carry the
	/// predecessor's velocity forward instead of dividing by zero. A chain with no usable
	/// interval reports `0`.
	pub fn velocity(&self) -> f64 {
		let mut current = *self;
		while let Some(previous) = current.previous() {
			let (a, b) = (current.point(), previous.point());
			let duration = a.t - b.t;
			if duration > 0.0 && duration.is_finite() {
				return geom::distance(&a, &b) / duration;
			}
			current = previous;
		}
		0.0
	}

	/// Direction of motion from the predecessor, `0` for the first node.
	pub fn angle(&self) -> f64 {
		match self.previous() {
			Some(previous) => geom::angle(&self.point(), &previous.point()),
			None => 0.0,
		}
	}

	/// Half-width multiplier derived from velocity. A stationary node maps to `1`; moving
	/// nodes shrink from `scale` toward a floor of `1` as `velocity^0.6` approaches `unit`.
	pub fn velo_size(&self, scale: f64, unit: f64) -> f64 {
		velo_size(self.velocity(), scale, unit)
	}

	pub fn velo_cross(&self, scale: f64, unit: f64) -> VelocityCross {
		let size = self.velo_size(scale, unit);
		let center = self.point().position();
		let angle = self.angle();
		VelocityCross {
			left: center + size * DVec2::from_angle(angle - FRAC_PI_2),
			right: center + size * DVec2::from_angle(angle + FRAC_PI_2),
		}
	}
}

pub fn velo_size(velocity: f64, scale: f64, unit: f64) -> f64 {
	if velocity == 0.0 {
		return 1.0;
	}
	let damped = unit.min(velocity.powf(VELOCITY_EXPONENT));
	unit.max(scale * unit - scale * damped) / unit
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::{assert_abs_diff_eq, assert_relative_eq};

	fn chain_of(points: &[(f64, f64, f64)]) -> PointChain {
		let mut chain = PointChain::new();
		for &(x, y, t) in points {
			chain.attach(Point::new(x, y, t));
		}
		chain
	}

	#[test]
	fn test_attach_to_empty_chain() {
		let mut chain = PointChain::new();
		assert!(chain.first().is_none());
		assert!(chain.last().is_none());

		let id = chain.attach(Point::new(4.0, 5.0, 6.0));
		let node = chain.get(id).unwrap();
		assert!(node.previous().is_none());
		assert!(node.next().is_none());
		assert_eq!(node.velocity(), 0.0);
		assert_eq!(node.angle(), 0.0);
		assert_eq!(node.velo_size(DEFAULT_SCALE, DEFAULT_UNIT), 1.0);
	}

	#[test]
	fn test_attach_links_both_ways() {
		let mut chain = PointChain::new();
		let first = chain.attach(Point::new(0.0, 0.0, 0.0));
		let second = chain.attach(Point::new(3.0, 4.0, 10.0));

		let node = chain.get(second).unwrap();
		assert_eq!(node.previous().map(|n| n.id()), Some(first));
		assert_eq!(chain.get(first).unwrap().next().map(|n| n.id()), Some(second));
		assert_eq!(chain.first().unwrap().id(), first);
		assert_eq!(chain.last().unwrap().id(), second);
		assert_relative_eq!(node.velocity(), 0.5);
	}

	#[test]
	fn test_single_head_and_tail() {
		let chain = chain_of(&[(0.0, 0.0, 0.0), (1.0, 0.0, 1.0), (2.0, 1.0, 2.0), (3.0, 3.0, 3.0)]);
		assert_eq!(chain.iter().filter(|n| n.previous().is_none()).count(), 1);
		assert_eq!(chain.iter().filter(|n| n.next().is_none()).count(), 1);
		let forward: Vec<_> = std::iter::successors(chain.first(), |n| n.next())
			.map(|n| n.id())
			.collect();
		let backward: Vec<_> = std::iter::successors(chain.last(), |n| n.previous())
			.map(|n| n.id())
			.collect();
		assert_eq!(forward.len(), 4);
		assert_eq!(forward, backward.into_iter().rev().collect::<Vec<_>>());
	}

	#[test]
	fn test_zero_duration_carries_velocity_forward() {
		let chain = chain_of(&[(0.0, 0.0, 0.0), (10.0, 0.0, 10.0), (20.0, 0.0, 10.0)]);
		let last = chain.last().unwrap();
		assert_relative_eq!(last.velocity(), 1.0);
		assert!(last.velo_size(30.0, 3.0).is_finite());
	}

	#[test]
	fn test_zero_duration_without_history() {
		let chain = chain_of(&[(0.0, 0.0, 5.0), (10.0, 0.0, 5.0), (10.0, 0.0, 4.0)]);
		for node in chain.iter() {
			assert_eq!(node.velocity(), 0.0);
		}
	}

	#[test]
	fn test_angle_follows_motion() {
		let chain = chain_of(&[(0.0, 0.0, 0.0), (0.0, 5.0, 1.0), (-5.0, 5.0, 2.0)]);
		let angles: Vec<_> = chain.iter().map(|n| n.angle()).collect();
		assert_eq!(angles[0], 0.0);
		assert_abs_diff_eq!(angles[1], FRAC_PI_2);
		assert_abs_diff_eq!(angles[2], std::f64::consts::PI);
	}

	#[test]
	fn test_velo_size_with_unit_scale_is_constant() {
		for velocity in [0.0, 0.01, 0.5, 1.0, 10.0, 1e6] {
			assert_eq!(velo_size(velocity, 1.0, 3.0), 1.0);
		}
	}

	#[test]
	fn test_velo_size_non_increasing_while_moving() {
		let mut last = f64::INFINITY;
		for i in 1..400 {
			let size = velo_size(i as f64 * 0.05, 30.0, 3.0);
			assert!(size <= last);
			assert!(size >= 1.0);
			assert!(size <= 30.0);
			last = size;
		}
		// Saturates once `velocity^0.6 >= unit`.
		assert_eq!(velo_size(100.0, 30.0, 3.0), 1.0);
		assert_eq!(velo_size(0.0, 30.0, 3.0), 1.0);
	}

	#[test]
	fn test_velo_size_formula() {
		let velocity: f64 = 0.1;
		let expected = (90.0 - 30.0 * velocity.powf(0.6)) / 3.0;
		assert_relative_eq!(velo_size(velocity, 30.0, 3.0), expected);
	}

	#[test]
	fn test_velo_cross_symmetric() {
		fastrand::seed(0x13371337);
		let mut chain = PointChain::new();
		let mut t = 0.0;
		for _ in 0..100 {
			t += 1.0 + 20.0 * fastrand::f64();
			let id = chain.attach(Point::new(
				500.0 * fastrand::f64(),
				500.0 * fastrand::f64(),
				t,
			));
			let node = chain.get(id).unwrap();
			let cross = node.velo_cross(30.0, 3.0);
			let midpoint = cross.midpoint();
			assert_abs_diff_eq!(midpoint.x, node.point().x, epsilon = 1e-9);
			assert_abs_diff_eq!(midpoint.y, node.point().y, epsilon = 1e-9);
			assert_relative_eq!(cross.width(), 2.0 * node.velo_size(30.0, 3.0), epsilon = 1e-9);
		}
	}

	#[test]
	fn test_velo_cross_without_predecessor_is_vertical() {
		let chain = chain_of(&[(10.0, 20.0, 0.0)]);
		let cross = chain.first().unwrap().velo_cross(30.0, 3.0);
		assert_abs_diff_eq!(cross.left.x, 10.0, epsilon = 1e-12);
		assert_abs_diff_eq!(cross.left.y, 19.0, epsilon = 1e-12);
		assert_abs_diff_eq!(cross.right.x, 10.0, epsilon = 1e-12);
		assert_abs_diff_eq!(cross.right.y, 21.0, epsilon = 1e-12);
	}

	#[test]
	fn test_points_and_clear() {
		let mut chain = chain_of(&[(1.0, 2.0, 3.0), (4.0, 5.0, 6.0)]);
		assert_eq!(
			chain.points().collect::<Vec<_>>(),
			vec![Point::new(1.0, 2.0, 3.0), Point::new(4.0, 5.0, 6.0)]
		);
		chain.clear();
		assert!(chain.is_empty());
		assert_eq!(chain.len(), 0);
	}
}
