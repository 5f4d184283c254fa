//! # sr-processes
//!
//! One-factor mean-reverting short-rate processes.
//!
//! Both processes share the drift `k(θ − r)` and differ only in their
//! diffusion coefficient: constant for Vasicek, proportional to `√r` for CIR.
//! Each exposes its Euler discretization (used by the simulator) alongside the
//! exact conditional mean and variance (used by the forecaster).

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod ornstein_uhlenbeck_process;
pub mod square_root_process;
pub mod stochastic_process;

pub use ornstein_uhlenbeck_process::OrnsteinUhlenbeckProcess;
pub use square_root_process::SquareRootProcess;
pub use stochastic_process::StochasticProcess1D;
