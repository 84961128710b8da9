// Domain layer: models and ports. Concrete adapters live under config/ and webdriver/.

pub mod model;
pub mod ports;
