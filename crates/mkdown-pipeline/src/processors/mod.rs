//! Built-in stages.

mod prettify;
mod sanitize;
mod title;

pub use prettify::Prettify;
pub use sanitize::SanitizeHtml;
pub use title::ExtractTitle;
