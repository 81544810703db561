//! Vietnamese input method engine.
//!
//! Keys go into an [`EngineController`], which keeps the word being typed,
//! applies Telex/VNI tone and diacritic rules to it and tells the host what
//! to replace before the caret. Output can be re-encoded for the legacy
//! TCVN3 and VNI-Windows fonts.
//!
//! ```
//! use vikey::{EngineController, EngineConfig};
//!
//! let mut engine = EngineController::new(EngineConfig::default());
//! let mut text = String::new();
//! for c in "vieetj".chars() {
//!     engine.type_char(c).apply_to(&mut text, c);
//! }
//! assert_eq!(text, "việt");
//! ```

pub mod buffers;
pub mod codetable;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod keys;
pub mod macros;
pub mod modes;
pub mod spelling;
pub mod syllable;
pub mod tone;

pub use codetable::CodeTable;
pub use config::{EngineConfig, Language};
pub use controller::{EngineController, EngineState, SharedEngine};
pub use engine::TransformResult;
pub use error::{ConfigError, ConfigResult};
pub use keys::{Key, KeyEvent, Modifiers};
pub use macros::MacroTable;
pub use modes::InputMethod;
pub use syllable::{CharSlot, SyllableBuffer};
pub use tone::{Mark, Tone};
