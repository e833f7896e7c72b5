mod links;
mod product;
mod reviews;

pub use links::LinkCollector;
pub use product::{ProductExtractor, RATING_BUTTON, RATING_VALUE, REVIEW_TOTAL};
pub use reviews::{
    PaginatorState, ReviewPaginator, NEXT_BUTTON, NEXT_DISABLED_CLASS, REVIEW_CONTAINER,
};
