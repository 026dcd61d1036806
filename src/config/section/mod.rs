//! Configuration section definitions.
//!
//! Each module corresponds to a section in `assetry.toml`:
//!
//! | Module    | TOML Section   | Purpose                               |
//! |-----------|----------------|---------------------------------------|
//! | `assetic` | `[assetic]`    | Asset roots, debug mode, cache dir    |
//! | `twig`    | `[twig]`       | Template directories to scan          |
//! | `serve`   | `[serve]`      | HTTP server                           |
//! | `filters` | `[[filters]]`  | Named filter declarations             |
//! | `assets`  | `[[assets]]`   | Named asset declarations              |

mod assetic;
mod assets;
mod filters;
mod serve;
mod twig;

pub use assetic::AsseticConfig;
pub use assets::{AssetDecl, validate_assets};
pub use filters::{FilterDecl, FilterKind, validate_filters};
pub use serve::ServeConfig;
pub use twig::TwigConfig;
