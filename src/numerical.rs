/// left, right, midpoint and trapezoidal approximations of the integral of x^2 + 4x
pub mod RAM;
/// convergence under doubling of n, comparison of all rules
pub mod RAM_study;
/// task files: request + postprocessing
pub mod RAM_task;
