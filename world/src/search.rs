//! Turn-budgeted path search over the grid.

use hexmap_core::{EdgeType, HexCoordinates, HexDirection};
use log::debug;

use crate::{
    cell::Cell,
    queue::{BucketLinks, BucketQueue},
};

const ROAD_MOVE_COST: i32 = 1;
const FLAT_MOVE_COST: i32 = 5;
const SLOPE_MOVE_COST: i32 = 10;

/// Per-cell scratch written during a search.
///
/// The fields are only meaningful while `phase` equals the current search
/// phase (reached) or the phase plus one (finalized).
#[derive(Clone, Copy, Debug, Default)]
struct SearchNode {
    distance: i32,
    heuristic: i32,
    phase: u32,
    came_from: Option<usize>,
    next_with_same_priority: Option<usize>,
}

impl SearchNode {
    fn priority(&self) -> usize {
        (self.distance + self.heuristic).max(0) as usize
    }
}

impl BucketLinks for [SearchNode] {
    fn priority(&self, item: usize) -> usize {
        self[item].priority()
    }

    fn next_in_bucket(&self, item: usize) -> Option<usize> {
        self[item].next_with_same_priority
    }

    fn set_next_in_bucket(&mut self, item: usize, next: Option<usize>) {
        self[item].next_with_same_priority = next;
    }
}

/// Long-lived search state owned by a single grid.
///
/// Each search advances the phase counter by two instead of clearing the
/// scratch of every cell.
#[derive(Debug)]
pub(crate) struct Pathfinder {
    phase: u32,
    frontier: BucketQueue,
    nodes: Vec<SearchNode>,
}

impl Pathfinder {
    pub(crate) fn new() -> Self {
        Self {
            phase: 0,
            frontier: BucketQueue::new(),
            nodes: Vec::new(),
        }
    }

    /// Resizes the scratch for a rebuilt grid, forgetting every earlier search.
    pub(crate) fn reset(&mut self, cell_count: usize) {
        self.phase = 0;
        self.frontier.clear();
        self.nodes.clear();
        self.nodes.resize(cell_count, SearchNode::default());
    }

    fn begin_phase(&mut self) -> u32 {
        if self.phase >= u32::MAX - 3 {
            let cell_count = self.nodes.len();
            self.reset(cell_count);
        }
        self.phase += 2;
        self.frontier.clear();
        self.phase
    }

    pub(crate) fn find_path(
        &mut self,
        cells: &[Cell],
        from: usize,
        to: usize,
        speed: i32,
    ) -> Option<PathResult> {
        if self.search(cells, from, to, speed) {
            let path = self.trace(cells, from, to, speed);
            debug!(
                "found path from {} to {} costing {}",
                cells[from].coordinates(),
                cells[to].coordinates(),
                path.total_cost()
            );
            Some(path)
        } else {
            debug!(
                "no path from {} to {}",
                cells[from].coordinates(),
                cells[to].coordinates()
            );
            None
        }
    }

    fn search(&mut self, cells: &[Cell], from: usize, to: usize, speed: i32) -> bool {
        let phase = self.begin_phase();
        let target = cells[to].coordinates();

        self.nodes[from] = SearchNode {
            distance: 0,
            heuristic: heuristic(cells[from].coordinates(), target),
            phase,
            came_from: None,
            next_with_same_priority: None,
        };
        self.frontier.enqueue(self.nodes.as_mut_slice(), from);

        while let Some(current) = self.frontier.dequeue(self.nodes.as_mut_slice()) {
            self.nodes[current].phase += 1;
            if current == to {
                return true;
            }

            let current_distance = self.nodes[current].distance;
            let current_turn = (current_distance - 1) / speed;

            for direction in HexDirection::ALL {
                let Some((neighbor, move_cost)) = step_cost(cells, current, direction) else {
                    continue;
                };
                let node = self.nodes[neighbor];
                if node.phase > phase {
                    continue;
                }

                let mut distance = current_distance + move_cost;
                let turn = distance / speed;
                if turn > current_turn {
                    distance = turn * speed + move_cost;
                }

                if node.phase < phase {
                    self.nodes[neighbor] = SearchNode {
                        distance,
                        heuristic: heuristic(cells[neighbor].coordinates(), target),
                        phase,
                        came_from: Some(current),
                        next_with_same_priority: None,
                    };
                    self.frontier.enqueue(self.nodes.as_mut_slice(), neighbor);
                } else if distance < node.distance {
                    let old_priority = node.priority();
                    self.nodes[neighbor].distance = distance;
                    self.nodes[neighbor].came_from = Some(current);
                    self.frontier
                        .change(self.nodes.as_mut_slice(), neighbor, old_priority);
                }
            }
        }
        false
    }

    fn trace(&self, cells: &[Cell], from: usize, to: usize, speed: i32) -> PathResult {
        let mut steps = Vec::new();
        let mut current = to;
        loop {
            let node = self.nodes[current];
            let turn = if current == from {
                0
            } else {
                (node.distance - 1) / speed
            };
            steps.push(PathStep {
                coordinates: cells[current].coordinates(),
                index: current,
                distance: node.distance.max(0) as u32,
                turn: turn.max(0) as u32,
            });
            match node.came_from {
                Some(previous) if current != from => current = previous,
                _ => break,
            }
        }
        steps.reverse();
        PathResult { steps }
    }

    /// Cost of reaching every cell from `from`, ignoring turn boundaries.
    pub(crate) fn movement_costs(&mut self, cells: &[Cell], from: usize) -> Vec<Option<u32>> {
        let phase = self.begin_phase();
        self.nodes[from] = SearchNode {
            phase,
            ..SearchNode::default()
        };
        self.frontier.enqueue(self.nodes.as_mut_slice(), from);

        while let Some(current) = self.frontier.dequeue(self.nodes.as_mut_slice()) {
            self.nodes[current].phase += 1;
            let current_distance = self.nodes[current].distance;

            for direction in HexDirection::ALL {
                let Some((neighbor, move_cost)) = step_cost(cells, current, direction) else {
                    continue;
                };
                let node = self.nodes[neighbor];
                if node.phase > phase {
                    continue;
                }

                let distance = current_distance + move_cost;
                if node.phase < phase {
                    self.nodes[neighbor] = SearchNode {
                        distance,
                        heuristic: 0,
                        phase,
                        came_from: Some(current),
                        next_with_same_priority: None,
                    };
                    self.frontier.enqueue(self.nodes.as_mut_slice(), neighbor);
                } else if distance < node.distance {
                    let old_priority = node.priority();
                    self.nodes[neighbor].distance = distance;
                    self.nodes[neighbor].came_from = Some(current);
                    self.frontier
                        .change(self.nodes.as_mut_slice(), neighbor, old_priority);
                }
            }
        }

        self.nodes
            .iter()
            .map(|node| (node.phase == phase + 1).then_some(node.distance.max(0) as u32))
            .collect()
    }
}

fn heuristic(from: HexCoordinates, to: HexCoordinates) -> i32 {
    i32::try_from(from.distance_to(to)).unwrap_or(i32::MAX)
}

/// Neighbor reached through `direction` and the cost of the step, or `None`
/// when the edge cannot be crossed.
fn step_cost(cells: &[Cell], current: usize, direction: HexDirection) -> Option<(usize, i32)> {
    let from = &cells[current];
    let neighbor_index = from.neighbor(direction)?;
    let neighbor = &cells[neighbor_index];

    if neighbor.is_underwater() || neighbor.unit().is_some() {
        return None;
    }

    let edge = EdgeType::between(from.elevation(), neighbor.elevation());
    if edge == EdgeType::Cliff {
        return None;
    }

    if from.has_road(direction) {
        return Some((neighbor_index, ROAD_MOVE_COST));
    }
    if from.walled() != neighbor.walled() {
        return None;
    }

    let base = if edge == EdgeType::Flat {
        FLAT_MOVE_COST
    } else {
        SLOPE_MOVE_COST
    };
    Some((neighbor_index, base + neighbor.cover_cost()))
}

/// One cell along a found path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathStep {
    /// Coordinates of the cell.
    pub coordinates: HexCoordinates,
    /// Row-major index of the cell in the grid.
    pub index: usize,
    /// Turn-quantized movement cost accumulated on arrival.
    pub distance: u32,
    /// Turn during which the mover arrives; the origin is turn zero.
    pub turn: u32,
}

/// Route returned by a successful path search, ordered from origin to
/// destination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathResult {
    steps: Vec<PathStep>,
}

impl PathResult {
    /// Every step including the origin and the destination.
    #[must_use]
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Coordinates of every cell along the route.
    pub fn cells(&self) -> impl Iterator<Item = HexCoordinates> + '_ {
        self.steps.iter().map(|step| step.coordinates)
    }

    /// Number of cells on the route, origin included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Reports whether the route holds no cells. Found routes never are.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Turn-quantized cost of reaching the destination.
    #[must_use]
    pub fn total_cost(&self) -> u32 {
        self.steps.last().map_or(0, |step| step.distance)
    }

    /// Turn during which the destination is reached.
    #[must_use]
    pub fn turns(&self) -> u32 {
        self.steps.last().map_or(0, |step| step.turn)
    }
}
