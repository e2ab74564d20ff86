//! rfscript-core: expression engine and network algebra for S-parameter scripts
//!
//! Lets a host application evaluate short line-oriented scripts that select
//! loaded networks by name pattern, transform them (cascade, invert, flip,
//! crop, lumped/distributed element attachment), derive scalar metrics
//! (stability factors, Bode-Fano return-loss bounds) and request plots
//! through a caller-supplied callback.
//!
//! ## Modules
//!
//! - `frequency` - Frequency axis representation
//! - `network` - Single multi-port network and its operations
//! - `networks` - Collection type the scripting surface manipulates
//! - `sparams` - Scalar-per-frequency trace algebra
//! - `stability` - Two-port stability circles
//! - `bodefano` - Bode-Fano integral bound
//! - `select` - Glob-pattern network selection
//! - `expr` - The constrained expression language and evaluator

pub mod bodefano;
pub mod constants;
pub mod error;
pub mod expr;
pub mod files;
pub mod frequency;
pub mod network;
pub mod networks;
pub mod plot;
pub mod select;
pub mod sparams;
pub mod stability;

pub use error::ExprError;
pub use expr::ExpressionEvaluator;
pub use files::LoadedSParamFile;
pub use frequency::Frequency;
pub use network::Network;
pub use networks::Networks;
pub use plot::{PlotFn, PlotRequest};
pub use sparams::{SParam, SParams};
