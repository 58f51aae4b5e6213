//! Statistical distributions used by the regression routines

pub mod t;

pub use t::{t_cdf, t_inv, t_pdf, two_sided_p_value};
