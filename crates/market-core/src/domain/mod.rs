//! 시장 데이터 처리를 위한 도메인 모델.

mod dataset;
mod metrics;
mod session;

pub use dataset::*;
pub use metrics::*;
pub use session::*;
