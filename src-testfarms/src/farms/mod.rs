pub mod concave;
pub mod failing;
pub mod gaussian_wake;
pub mod isolated;

pub use concave::SeparableConcaveFarm;
pub use failing::{AlwaysFailing, FailAfter, FailWhere, ZeroPowerFarm};
pub use gaussian_wake::GaussianWakeFarm;
pub use isolated::IsolatedTurbineFarm;
