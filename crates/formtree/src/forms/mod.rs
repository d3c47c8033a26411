//! Built-in rule tables for the admin entity forms. Each entity is rows,
//! not imperative logic: adding a form means adding a table like these.

mod blog;
mod industry;
mod project;
mod service;
mod tag;

pub use blog::BLOG_FORM;
pub use industry::INDUSTRY_FORM;
pub use project::PROJECT_FORM;
pub use service::SERVICE_FORM;
pub use tag::TAG_FORM;

use crate::core::schema::FormSchema;

/// Every shipped form, in navigation order.
pub static ALL_FORMS: [&FormSchema; 5] = [
    &BLOG_FORM,
    &INDUSTRY_FORM,
    &PROJECT_FORM,
    &SERVICE_FORM,
    &TAG_FORM,
];

///
/// TESTS
///
