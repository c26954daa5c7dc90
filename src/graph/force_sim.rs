//! Force layout strategy
//!
//! Particle relaxation over the current graph: pairwise charge repulsion,
//! spring attraction along edges, a centering pull, and collision
//! separation. Runs a tick per frame until kinetic energy falls under a
//! threshold or the tick cap is hit.
//!
//! Parameters scale with node count:
//! - charge `min(-300, -30 * ln n)` (stronger repulsion on big graphs),
//! - spring rest length 100 / 120 / 150 at n < 50 / n < 100 / n >= 100.
//!
//! Convergence is promised; exact positions are not. Dragging pins a body;
//! release starts a short cool-down before the body rejoins the simulation,
//! so a just-dropped node is not flung by accumulated spring tension.

use std::collections::HashMap;

use egui::{Pos2, Vec2};
use tracing::debug;

use super::types::GraphData;

// Golden angle, for the deterministic initial spiral
const SEED_ANGLE: f32 = 2.39996;

/// Tunables for the relaxation loop
#[derive(Debug, Clone)]
pub struct ForceConfig {
    /// Pull toward the viewport center
    pub center_strength: f32,
    /// Spring stiffness along edges
    pub spring_strength: f32,
    /// Extra separation beyond summed radii
    pub collision_padding: f32,
    /// Velocity retained per tick
    pub damping: f32,
    /// Velocity cap, model units per second
    pub max_velocity: f32,
    /// Kinetic energy under which the layout counts as settled
    pub energy_threshold: f32,
    /// Hard stop after this many ticks
    pub max_ticks: u32,
    /// Ticks a released body stays frozen before rejoining
    pub release_cooldown: u32,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            center_strength: 0.05,
            spring_strength: 0.08,
            collision_padding: 4.0,
            damping: 0.85,
            max_velocity: 400.0,
            energy_threshold: 1.0,
            max_ticks: 600,
            release_cooldown: 30,
        }
    }
}

/// Charge per node, scaled by graph size
pub fn charge_for(node_count: usize) -> f32 {
    let n = node_count.max(1) as f32;
    (-30.0 * n.ln()).min(-300.0)
}

/// Spring rest length, stepped by graph size
pub fn rest_length_for(node_count: usize) -> f32 {
    match node_count {
        0..=49 => 100.0,
        50..=99 => 120.0,
        _ => 150.0,
    }
}

#[derive(Debug, Clone)]
struct Body {
    id: String,
    position: Pos2,
    velocity: Vec2,
    radius: f32,
    pinned: bool,
    cooldown: u32,
}

/// The layout arena. Sole writer of node positions.
#[derive(Debug, Clone)]
pub struct ForceLayout {
    bodies: Vec<Body>,
    index: HashMap<String, usize>,
    /// Edge endpoints as body indices
    links: Vec<(usize, usize)>,
    pub config: ForceConfig,
    center: Pos2,
    charge: f32,
    rest_length: f32,
    running: bool,
    ticks: u32,
    energy: f32,
}

impl ForceLayout {
    /// Seed a layout for `graph`. Initial positions spiral out from the
    /// viewport center by insertion index, so a rebuild from the same graph
    /// starts from the same state.
    pub fn new(graph: &GraphData, viewport: Vec2) -> Self {
        Self::with_config(graph, viewport, ForceConfig::default())
    }

    pub fn with_config(graph: &GraphData, viewport: Vec2, config: ForceConfig) -> Self {
        let center = (viewport / 2.0).to_pos2();
        let mut bodies = Vec::with_capacity(graph.nodes.len());
        let mut index = HashMap::with_capacity(graph.nodes.len());

        for (i, node) in graph.nodes.iter().enumerate() {
            let angle = i as f32 * SEED_ANGLE;
            let radius = 40.0 + (i as f32).sqrt() * 24.0;
            index.insert(node.id.clone(), i);
            bodies.push(Body {
                id: node.id.clone(),
                position: center + Vec2::angled(angle) * radius,
                velocity: Vec2::ZERO,
                radius: node.size,
                pinned: false,
                cooldown: 0,
            });
        }

        let links = graph
            .edges
            .iter()
            .filter_map(|e| Some((*index.get(&e.source)?, *index.get(&e.target)?)))
            .collect();

        let n = graph.nodes.len();
        debug!(
            nodes = n,
            charge = charge_for(n),
            rest_length = rest_length_for(n),
            "force layout seeded"
        );

        Self {
            bodies,
            index,
            links,
            config,
            center,
            charge: charge_for(n),
            rest_length: rest_length_for(n),
            running: n > 0,
            ticks: 0,
            energy: f32::MAX,
        }
    }

    // =========================================================================
    // SIMULATION
    // =========================================================================

    /// One relaxation step. No-op once settled or stopped.
    pub fn tick(&mut self, dt: f32) {
        if !self.running || self.bodies.is_empty() {
            return;
        }
        let dt = dt.min(0.05);
        let forces = self.accumulate_forces();

        let mut total_energy = 0.0;
        for (i, body) in self.bodies.iter_mut().enumerate() {
            if body.pinned {
                body.velocity = Vec2::ZERO;
                continue;
            }
            if body.cooldown > 0 {
                body.cooldown -= 1;
                continue;
            }
            body.velocity = (body.velocity + forces[i] * dt) * self.config.damping;
            let speed = body.velocity.length();
            if speed > self.config.max_velocity {
                body.velocity = body.velocity.normalized() * self.config.max_velocity;
            }
            body.position += body.velocity * dt;
            total_energy += speed * speed;
        }

        self.energy = total_energy;
        self.ticks += 1;
        if total_energy < self.config.energy_threshold || self.ticks >= self.config.max_ticks {
            self.running = false;
        }
    }

    fn accumulate_forces(&self) -> Vec<Vec2> {
        let n = self.bodies.len();
        let mut forces = vec![Vec2::ZERO; n];

        // Charge repulsion between all pairs, inverse-distance scaled
        for i in 0..n {
            for j in (i + 1)..n {
                let delta = self.bodies[i].position - self.bodies[j].position;
                let dist = delta.length().max(1.0);
                let push = delta / dist * (-self.charge / dist);
                forces[i] += push;
                forces[j] -= push;

                // Collision: hard separation inside summed radii
                let min_sep =
                    self.bodies[i].radius + self.bodies[j].radius + self.config.collision_padding;
                if dist < min_sep {
                    let overlap = (min_sep - dist) * 2.0;
                    forces[i] += delta / dist * overlap;
                    forces[j] -= delta / dist * overlap;
                }
            }
        }

        // Springs along edges toward the rest length
        for &(a, b) in &self.links {
            let delta = self.bodies[b].position - self.bodies[a].position;
            let dist = delta.length().max(1.0);
            let stretch = dist - self.rest_length;
            let pull = delta / dist * stretch * self.config.spring_strength * 60.0;
            forces[a] += pull;
            forces[b] -= pull;
        }

        // Centering pull. Kept weak relative to charge repulsion so it
        // anchors the cloud without squeezing unlinked nodes together.
        for (i, body) in self.bodies.iter().enumerate() {
            forces[i] += (self.center - body.position) * self.config.center_strength;
        }

        forces
    }

    /// Halt permanently. Called before any rebuild so stale ticks never
    /// touch a new graph's arena.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Restart the relaxation loop (tick counter resets)
    pub fn reheat(&mut self) {
        if !self.bodies.is_empty() {
            self.running = true;
            self.ticks = 0;
            self.energy = f32::MAX;
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn energy(&self) -> f32 {
        self.energy
    }

    // =========================================================================
    // PINNING
    // =========================================================================

    /// Pin a body to a fixed position (drag in progress)
    pub fn pin(&mut self, id: &str, pos: Pos2) {
        if let Some(&i) = self.index.get(id) {
            let body = &mut self.bodies[i];
            body.pinned = true;
            body.position = pos;
            body.velocity = Vec2::ZERO;
        }
    }

    /// Release a pinned body; it rejoins the simulation after a cool-down
    pub fn release(&mut self, id: &str) {
        let cooldown = self.config.release_cooldown;
        if let Some(&i) = self.index.get(id) {
            let body = &mut self.bodies[i];
            body.pinned = false;
            body.cooldown = cooldown;
        }
        self.reheat();
    }

    // =========================================================================
    // POSITIONS
    // =========================================================================

    /// Carry positions over from a previous layout. Ids absent from this
    /// layout are ignored; bodies not named keep their seed position.
    pub fn seed_positions(&mut self, positions: &HashMap<String, Pos2>) {
        for body in &mut self.bodies {
            if let Some(&pos) = positions.get(&body.id) {
                body.position = pos;
                body.velocity = Vec2::ZERO;
            }
        }
    }

    pub fn position_of(&self, id: &str) -> Option<Pos2> {
        self.index.get(id).map(|&i| self.bodies[i].position)
    }

    /// Snapshot of all positions, keyed by node id
    pub fn positions(&self) -> HashMap<String, Pos2> {
        self.bodies
            .iter()
            .map(|b| (b.id.clone(), b.position))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}
