//! Cart-pole swing-up dynamics.
//!
//! The environment is composed from an injected [`DynamicsModel`], so
//! alternative physics (learned models, perturbed parameters for domain
//! randomization) can be swapped in without touching the stepping loop.
//!
//! [`CartpoleDynamics`] implements the standard swing-up formulation: the
//! pole hangs down at θ = 0 and is upright at θ = ±π. The cart is driven by
//! a horizontal force `u` and damped by viscous friction `b·ẋ`.

/// State layout used throughout this crate: `[x, dx, theta, dtheta]`.
pub const STATE_SIZE: usize = 4;

/// Single scalar force on the cart.
pub const ACTION_SIZE: usize = 1;

/// Index of the (single) angular state dimension.
pub const ANGLE_DIMS: [usize; 1] = [2];

/// Continuous-time dynamics: maps (state, action) to the state derivative.
pub trait DynamicsModel: Send + Sync {
    /// Size of the state vector.
    fn state_size(&self) -> usize;

    /// Size of the action vector.
    fn action_size(&self) -> usize;

    /// Write `dstate/dt` at `(state, action)` into `out`.
    fn derivatives(&self, state: &[f32], action: &[f32], out: &mut [f32]);
}

/// Swing-up cart-pole physics.
#[derive(Clone, Debug)]
pub struct CartpoleDynamics {
    /// Cart mass (kg).
    pub cart_mass: f32,
    /// Pole mass (kg).
    pub pole_mass: f32,
    /// Pole length (m).
    pub pole_length: f32,
    /// Viscous friction coefficient on the cart (N·s/m).
    pub friction: f32,
    /// Gravitational acceleration (m/s²).
    pub gravity: f32,
}

impl Default for CartpoleDynamics {
    fn default() -> Self {
        Self {
            cart_mass: 0.5,
            pole_mass: 0.5,
            pole_length: 0.5,
            friction: 0.1,
            gravity: 9.82,
        }
    }
}

impl CartpoleDynamics {
    /// Create dynamics with the default physical parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cart mass.
    pub fn with_cart_mass(mut self, mc: f32) -> Self {
        self.cart_mass = mc;
        self
    }

    /// Set the pole mass.
    pub fn with_pole_mass(mut self, mp: f32) -> Self {
        self.pole_mass = mp;
        self
    }

    /// Set the pole length.
    pub fn with_pole_length(mut self, lp: f32) -> Self {
        self.pole_length = lp;
        self
    }

    /// Set the cart friction coefficient.
    pub fn with_friction(mut self, b: f32) -> Self {
        self.friction = b;
        self
    }
}

impl DynamicsModel for CartpoleDynamics {
    fn state_size(&self) -> usize {
        STATE_SIZE
    }

    fn action_size(&self) -> usize {
        ACTION_SIZE
    }

    fn derivatives(&self, state: &[f32], action: &[f32], out: &mut [f32]) {
        debug_assert_eq!(state.len(), STATE_SIZE);
        debug_assert_eq!(action.len(), ACTION_SIZE);
        debug_assert_eq!(out.len(), STATE_SIZE);

        let (mc, mp, lp, b, g) = (
            self.cart_mass,
            self.pole_mass,
            self.pole_length,
            self.friction,
            self.gravity,
        );

        let dx = state[1];
        let theta = state[2];
        let dtheta = state[3];
        let u = action[0];

        let sin = theta.sin();
        let cos = theta.cos();

        let denom = 4.0 * (mc + mp) - 3.0 * mp * cos * cos;

        let ddx = (2.0 * mp * lp * dtheta * dtheta * sin + 3.0 * mp * g * sin * cos
            + 4.0 * u
            - 4.0 * b * dx)
            / denom;

        let ddtheta = (-3.0 * mp * lp * dtheta * dtheta * sin * cos
            - 6.0 * (mc + mp) * g * sin
            - 6.0 * (u - b * dx) * cos)
            / (lp * denom);

        out[0] = dx;
        out[1] = ddx;
        out[2] = dtheta;
        out[3] = ddtheta;
    }
}

/// Advance `state` in place by `dt` using one classic RK4 step.
pub fn rk4_step<D: DynamicsModel + ?Sized>(model: &D, state: &mut [f32], action: &[f32], dt: f32) {
    let n = state.len();
    let mut k1 = vec![0.0f32; n];
    let mut k2 = vec![0.0f32; n];
    let mut k3 = vec![0.0f32; n];
    let mut k4 = vec![0.0f32; n];
    let mut tmp = vec![0.0f32; n];

    model.derivatives(state, action, &mut k1);

    for i in 0..n {
        tmp[i] = state[i] + 0.5 * dt * k1[i];
    }
    model.derivatives(&tmp, action, &mut k2);

    for i in 0..n {
        tmp[i] = state[i] + 0.5 * dt * k2[i];
    }
    model.derivatives(&tmp, action, &mut k3);

    for i in 0..n {
        tmp[i] = state[i] + dt * k3[i];
    }
    model.derivatives(&tmp, action, &mut k4);

    for i in 0..n {
        state[i] += dt / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]);
    }
}
