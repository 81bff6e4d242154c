mod estimator;

pub use estimator::ProgressEstimator;
