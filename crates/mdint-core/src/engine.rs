//! Contract between integrators and the dynamics engine that owns DOF state.

/// Describes the dynamics engine an integrator drives.
///
/// The engine owns the per-DOF vector registers (position, velocity, mass,
/// force), evaluates energies and forces, solves constraints and serves random
/// draws. Integrators never allocate or own this storage; they read and write
/// it exclusively through this trait, always from a single thread and
/// synchronously.
pub trait DynamicsEngine {
    /// Number of scalar degrees of freedom.
    fn dof_count(&self) -> usize;

    /// Current positions, one entry per DOF.
    fn positions(&self) -> &[f64];

    /// Mutable positions. Implementations must treat cached forces and
    /// potential energy as stale after this call.
    fn positions_mut(&mut self) -> &mut [f64];

    /// Current velocities, one entry per DOF.
    fn velocities(&self) -> &[f64];

    /// Mutable velocities.
    fn velocities_mut(&mut self) -> &mut [f64];

    /// Per-DOF masses. A zero mass marks an immobile DOF.
    fn masses(&self) -> &[f64];

    /// Forces at the current positions, recomputed if stale.
    fn forces(&mut self) -> &[f64];

    /// Potential energy at the current positions.
    fn potential_energy(&mut self) -> f64;

    /// Kinetic energy `sum(0.5 * m * v^2)`.
    fn kinetic_energy(&self) -> f64 {
        self.masses()
            .iter()
            .zip(self.velocities())
            .map(|(m, v)| 0.5 * m * v * v)
            .sum()
    }

    /// Projects positions onto the constraint manifold. Must be idempotent.
    fn project_positions(&mut self);

    /// Removes velocity components along constraints. Must be idempotent.
    fn project_velocities(&mut self);

    /// Fills `out` with independent standard normal draws, one per DOF.
    fn draw_gaussians(&mut self, out: &mut [f64]);

    /// Single uniform draw on `[0, 1)`.
    fn draw_uniform(&mut self) -> f64;

    /// Fills `out` with independent uniform draws on `[0, 1)`.
    fn draw_uniforms(&mut self, out: &mut [f64]) {
        for value in out.iter_mut() {
            *value = self.draw_uniform();
        }
    }

    /// Pre-step hook invoked once per outer step before the first instruction.
    fn update_context_state(&mut self) {}

    /// Current simulated time.
    fn time(&self) -> f64;

    /// Advances the simulated clock by `dt`.
    fn advance_time(&mut self, dt: f64);
}
