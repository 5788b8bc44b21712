pub mod aggregate;
pub mod course;
pub mod eager;
pub mod enrollment;
pub mod error;
pub mod join;
pub mod lesson;
pub mod page;
pub mod review;
pub mod schema;
pub mod store;
pub mod student;
pub mod util;
pub mod video_submission;

mod validate;

pub use error::{AccessError, ErrorKind, ResponseClass};
pub use page::{Page, SortOrder};
pub use sea_orm;
