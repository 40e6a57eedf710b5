//! Configuration section definitions.
//!
//! Each module corresponds to a section in `lab.toml`:
//!
//! | Module    | TOML Section  | Purpose                               |
//! |-----------|---------------|---------------------------------------|
//! | `content` | `[content]`   | Content root, curriculum, guide files |
//! | `sandbox` | `[sandbox]`   | Sandbox flags, TS target, log cap     |
//! | `serve`   | `[serve]`     | HTTP and relay ports                  |

mod content;
mod sandbox;
mod serve;

pub use content::ContentConfig;
pub use sandbox::SandboxConfig;
pub use serve::ServeConfig;
