pub mod pagination;
pub mod response;
pub mod totals;

pub use pagination::{PaginatedResponse, PaginationInfo, PaginationQuery};
pub use response::ApiResponse;
pub use totals::{PeriodWindow, PointTotals};
