//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Nodes live in a flat arena and refer to their children by index, either
//! another node or an entry of the shared object array. A node over a single
//! object points both children at it.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::hittable::{HitRecord, Hittable, HittableList};
use crate::Ray;
use raggio_math::{Aabb, Interval};
use rand::{Rng, RngCore};
use thiserror::Error;

/// Errors raised while building a BVH.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BvhError {
    #[error("cannot build a BVH over zero objects")]
    Empty,

    #[error("object {index} has no bounding box")]
    MissingBoundingBox { index: usize },
}

/// Either an interior node or a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Child {
    Node(usize),
    Object(usize),
}

#[derive(Debug, Clone, Copy)]
struct BvhNode {
    bbox: Aabb,
    left: Child,
    right: Child,
}

/// A binary BVH over a fixed set of hittables.
pub struct Bvh {
    objects: Vec<Arc<dyn Hittable>>,
    nodes: Vec<BvhNode>,
    root: usize,
}

impl Bvh {
    /// Build a hierarchy over `objects`.
    ///
    /// At every node a split axis is drawn uniformly from `rng` and the
    /// objects are ordered by the minimum of their boxes along it.
    pub fn new(objects: Vec<Arc<dyn Hittable>>, rng: &mut dyn RngCore) -> Result<Self, BvhError> {
        if objects.is_empty() {
            return Err(BvhError::Empty);
        }

        let boxes = objects
            .iter()
            .enumerate()
            .map(|(index, object)| {
                object
                    .bounding_box()
                    .ok_or(BvhError::MissingBoundingBox { index })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut order: Vec<usize> = (0..objects.len()).collect();
        let mut nodes = Vec::with_capacity(objects.len());
        let root = Self::build(&boxes, &mut order, &mut nodes, rng);

        log::debug!(
            "Built BVH: {} objects, {} nodes",
            objects.len(),
            nodes.len()
        );

        Ok(Self {
            objects,
            nodes,
            root,
        })
    }

    /// Build a hierarchy over the children of a list.
    pub fn from_list(list: &HittableList, rng: &mut dyn RngCore) -> Result<Self, BvhError> {
        Self::new(list.objects().to_vec(), rng)
    }

    /// Recursive construction over `order`, which is sorted in place.
    ///
    /// Returns the index of the node covering the whole slice. Children are
    /// pushed before their parent.
    fn build(
        boxes: &[Aabb],
        order: &mut [usize],
        nodes: &mut Vec<BvhNode>,
        rng: &mut dyn RngCore,
    ) -> usize {
        let axis: usize = rng.gen_range(0..3);
        let compare = |a: &usize, b: &usize| -> Ordering {
            let a_min = boxes[*a].axis_interval(axis).min;
            let b_min = boxes[*b].axis_interval(axis).min;
            a_min.total_cmp(&b_min)
        };

        let (left, right) = match order.len() {
            1 => (Child::Object(order[0]), Child::Object(order[0])),
            2 => {
                if compare(&order[0], &order[1]) == Ordering::Less {
                    (Child::Object(order[0]), Child::Object(order[1]))
                } else {
                    (Child::Object(order[1]), Child::Object(order[0]))
                }
            }
            n => {
                order.sort_by(compare);
                let (lo, hi) = order.split_at_mut(n / 2);
                let left = Self::build(boxes, lo, nodes, rng);
                let right = Self::build(boxes, hi, nodes, rng);
                (Child::Node(left), Child::Node(right))
            }
        };

        let child_box = |child: Child, nodes: &[BvhNode]| match child {
            Child::Node(i) => nodes[i].bbox,
            Child::Object(i) => boxes[i],
        };
        let bbox = Aabb::including(&child_box(left, nodes), &child_box(right, nodes));

        nodes.push(BvhNode { bbox, left, right });
        nodes.len() - 1
    }

    /// Number of interior nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn hit_child<'a>(
        &'a self,
        child: Child,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        match child {
            Child::Node(i) => self.hit_node(i, ray, ray_t, rng),
            Child::Object(i) => self.objects[i].hit(ray, ray_t, rng),
        }
    }

    fn hit_node<'a>(
        &'a self,
        index: usize,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let node = &self.nodes[index];
        if !node.bbox.hit(ray, ray_t) {
            return None;
        }

        let hit_left = self.hit_child(node.left, ray, ray_t, rng);
        if node.right == node.left {
            return hit_left;
        }

        // Only accept right-side hits closer than the left one.
        let right_t = hit_left.as_ref().map_or(ray_t, |rec| ray_t.with_max(rec.t));
        match self.hit_child(node.right, ray, right_t, rng) {
            Some(rec) => Some(rec),
            None => hit_left,
        }
    }
}

impl Hittable for Bvh {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        self.hit_node(self.root, ray, ray_t, rng)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.nodes[self.root].bbox)
    }
}
