//! CLI command implementations.
//!
//! | Module    | Commands handled                   |
//! |-----------|------------------------------------|
//! | `filters` | `Filters Show`, `Filters Set`, `Params` |
//! | `group`   | `Group`                            |
//! | `config`  | `Config`                           |

pub mod config;
pub mod filters;
pub mod group;

pub use config::cmd_config;
pub use filters::{cmd_filters_set, cmd_filters_show, cmd_params};
pub use group::cmd_group;
