//! Flow-dependent ordering of pipes into layers.
//!
//! A pipe may only be advanced once every pipe feeding its inlet junction has
//! been advanced. Layers make that order explicit: every pipe feeding another
//! pipe's inlet carries a strictly smaller layer, and pipes sharing a layer
//! are independent of each other.

use std::collections::VecDeque;

use hn_core::{PipeId, Tolerances};
use hn_network::{HydraulicNetwork, Side};
use tracing::{debug, warn};

use crate::error::TopologyError;

/// Layer of pipes that are not (or cannot be) ordered from the boundary.
pub const UNREACHED: u32 = 0;

/// Direction of the walk from the boundary junctions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Start at pipes leaving the boundary and follow the flow.
    Downstream,
    /// Start at pipes entering the boundary and walk against the flow.
    Upstream,
}

/// Layer assignment of the pipes on one side.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerMap {
    side: Side,
    /// Indexed by pipe arena index; pipes of the other side stay `UNREACHED`.
    layers: Vec<u32>,
    /// `by_layer[n - 1]` holds the pipes of layer `n`.
    by_layer: Vec<Vec<PipeId>>,
    unreached: Vec<PipeId>,
}

impl LayerMap {
    /// Map without any layer, used before the first resolution.
    pub fn empty(side: Side) -> Self {
        Self {
            side,
            layers: Vec::new(),
            by_layer: Vec::new(),
            unreached: Vec::new(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn layer(&self, pipe: PipeId) -> u32 {
        self.layers.get(pipe.index()).copied().unwrap_or(UNREACHED)
    }

    pub fn max_layer(&self) -> u32 {
        self.by_layer.len() as u32
    }

    /// Pipes of layer `n` (1-based); empty outside `1..=max_layer()`.
    pub fn pipes_in_layer(&self, n: u32) -> &[PipeId] {
        match n.checked_sub(1) {
            Some(i) => self.by_layer.get(i as usize).map(Vec::as_slice).unwrap_or(&[]),
            None => &[],
        }
    }

    /// Pipes of this side without a layer (disconnected or on a circular flow).
    pub fn unreached(&self) -> &[PipeId] {
        &self.unreached
    }

    pub fn reached_count(&self) -> usize {
        self.by_layer.iter().map(Vec::len).sum()
    }
}

/// Whether any pipe on `side` carries flow against its stored orientation.
pub fn needs_reorientation(network: &HydraulicNetwork, side: Side, tol: &Tolerances) -> bool {
    network
        .pipes
        .iter()
        .any(|p| p.side == side && p.orientation_stale(tol))
}

/// Re-orient the pipes on `side` from their flow signs and order them into
/// layers.
///
/// `Downstream` seeds layer 1 with pipes whose inlet is a pump outlet and
/// follows the flow. `Upstream` seeds with pipes ending in a pump inlet, walks
/// against the flow and renumbers so that layers still ascend along the flow.
/// Both use longest-path relaxation. A pipe pushed beyond the pipe count sits
/// on a circular flow and is left out together with unreachable pipes.
pub fn resolve_layers(
    network: &mut HydraulicNetwork,
    side: Side,
    direction: Direction,
    tol: &Tolerances,
) -> Result<LayerMap, TopologyError> {
    let pipes = network.pipes_on(side);
    let mut flipped = 0;
    for &id in &pipes {
        if network.pipe_mut(id).orient_by_flow(tol) {
            flipped += 1;
        }
    }

    let n_junctions = network.junctions.len();
    let mut is_boundary = vec![false; n_junctions];
    for j in network.boundary_junctions(side) {
        is_boundary[j.index()] = true;
    }

    // Pipes grouped by the junction the walk continues from.
    let mut next_of = vec![Vec::new(); n_junctions];
    let mut seeds = Vec::new();
    for &id in &pipes {
        let pipe = network.pipe(id);
        let near = match direction {
            Direction::Downstream => pipe.inlet(),
            Direction::Upstream => pipe.outlet(),
        };
        next_of[near.index()].push(id);
        if is_boundary[near.index()] {
            seeds.push(id);
        }
    }

    let limit = pipes.len() as u32;
    let mut depth = vec![UNREACHED; network.pipes.len()];
    let mut queue = VecDeque::new();
    for &id in &seeds {
        depth[id.index()] = 1;
        queue.push_back(id);
    }
    while let Some(id) = queue.pop_front() {
        let d = depth[id.index()];
        if d > limit {
            continue;
        }
        let pipe = network.pipe(id);
        let far = match direction {
            Direction::Downstream => pipe.outlet(),
            Direction::Upstream => pipe.inlet(),
        };
        for &next in &next_of[far.index()] {
            if depth[next.index()] < d + 1 {
                depth[next.index()] = d + 1;
                queue.push_back(next);
            }
        }
    }

    let mut unreached = Vec::new();
    let mut circular = 0;
    let mut max_depth = 0;
    for &id in &pipes {
        match depth[id.index()] {
            UNREACHED => unreached.push(id),
            d if d > limit => {
                circular += 1;
                unreached.push(id);
            }
            d => max_depth = max_depth.max(d),
        }
    }

    let reached = pipes.len() - unreached.len();
    if !pipes.is_empty() && reached == 0 {
        return Err(TopologyError {
            side,
            reason: format!(
                "none of {} pipes can be reached from a plant ({circular} on circular flows)",
                pipes.len()
            ),
        });
    }
    if !unreached.is_empty() {
        warn!(
            side = %side,
            unreached = unreached.len() - circular,
            circular,
            "pipes excluded from thermal propagation"
        );
    }

    let mut layers = vec![UNREACHED; network.pipes.len()];
    let mut by_layer = vec![Vec::new(); max_depth as usize];
    for &id in &pipes {
        let d = depth[id.index()];
        if d == UNREACHED || d > limit {
            continue;
        }
        let layer = match direction {
            Direction::Downstream => d,
            Direction::Upstream => max_depth - d + 1,
        };
        layers[id.index()] = layer;
        by_layer[layer as usize - 1].push(id);
    }

    debug!(
        side = %side,
        layers = max_depth,
        reached,
        flipped,
        "resolved layers"
    );
    Ok(LayerMap {
        side,
        layers,
        by_layer,
        unreached,
    })
}
